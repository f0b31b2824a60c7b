use crate::const_array::ConstArray;
use crate::error::Result;
use crate::link::Link;
use crate::parameter::Parameter;
use crate::record::{ImportRecord, Record};
use std::fmt;
use std::sync::Arc;

/// A field value that knows how to validate and format itself.
///
/// Values implementing this bypass the schema value check: `validate` is
/// called instead, and `format_db` produces the text written after the field
/// name. Everything else is stringified, checked against the schema, and
/// quoted.
pub trait DbValue: fmt::Debug + Send + Sync {
    fn validate(&self, record: &Record, field: &str) -> Result<()>;

    fn format_db(&self, record: &Record, field: &str) -> String;

    /// If true the value is only validated when the record is rendered.
    fn validate_later(&self) -> bool {
        false
    }
}

/// Any value that can be assigned to a record field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Link(Link),
    Parameter(Parameter),
    ConstArray(ConstArray),
    /// A JSON link, written out as compact JSON
    Json(serde_json::Value),
    Custom(Arc<dyn DbValue>),
    /// Validation is postponed until the record is rendered
    Later(Box<FieldValue>),
}

impl FieldValue {
    /// Wrap a value so that its validation is postponed until rendering.
    pub fn later(value: impl Into<FieldValue>) -> FieldValue {
        FieldValue::Later(Box::new(value.into()))
    }

    pub fn custom(value: impl DbValue + 'static) -> FieldValue {
        FieldValue::Custom(Arc::new(value))
    }

    pub fn validate_later(&self) -> bool {
        match self {
            FieldValue::Later(_) => true,
            FieldValue::Custom(value) => value.validate_later(),
            _ => false,
        }
    }

    /// The value with any deferral wrapper removed.
    pub fn inner(&self) -> &FieldValue {
        match self {
            FieldValue::Later(inner) => inner.inner(),
            other => other,
        }
    }

    /// The self-validating view of this value, if it has one.
    pub fn as_db_value(&self) -> Option<&dyn DbValue> {
        match self.inner() {
            FieldValue::Parameter(parameter) => Some(parameter),
            FieldValue::ConstArray(array) => Some(array),
            FieldValue::Custom(value) => Some(value.as_ref()),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&Link> {
        match self.inner() {
            FieldValue::Link(link) => Some(link),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::Float(x) => f.write_str(&format_float(*x)),
            FieldValue::Link(link) => write!(f, "{link}"),
            FieldValue::Parameter(parameter) => write!(f, "{parameter}"),
            FieldValue::ConstArray(array) => write!(f, "{array}"),
            FieldValue::Json(value) => write!(f, "{value}"),
            // Custom values display their Debug form
            FieldValue::Custom(value) => write!(f, "{value:?}"),
            FieldValue::Later(inner) => write!(f, "{inner}"),
        }
    }
}

/// Floats keep a fractional part so that `1.0` does not read back as an
/// integer. Exponents below -4 or from 16 up switch to scientific notation
/// with a signed, two-digit minimum exponent (`1e+16`, `2.5e-07`).
pub(crate) fn format_float(x: f64) -> String {
    if x.is_finite() && x != 0.0 {
        let scientific = format!("{x:e}");
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                if !(-4..16).contains(&exponent) {
                    let sign = if exponent < 0 { '-' } else { '+' };
                    return format!("{mantissa}e{sign}{:02}", exponent.abs());
                }
            }
        }
    }
    format!("{x:?}")
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FieldValue::Str(a), FieldValue::Str(b)) => a == b,
            (FieldValue::Int(a), FieldValue::Int(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Link(a), FieldValue::Link(b)) => a == b,
            (FieldValue::Parameter(a), FieldValue::Parameter(b)) => a == b,
            (FieldValue::ConstArray(a), FieldValue::ConstArray(b)) => a == b,
            (FieldValue::Json(a), FieldValue::Json(b)) => a == b,
            (FieldValue::Custom(a), FieldValue::Custom(b)) => Arc::ptr_eq(a, b),
            (FieldValue::Later(a), FieldValue::Later(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Int(value.into())
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<Link> for FieldValue {
    fn from(value: Link) -> Self {
        FieldValue::Link(value)
    }
}

impl From<&Link> for FieldValue {
    fn from(value: &Link) -> Self {
        FieldValue::Link(value.clone())
    }
}

/// A record used as a value becomes a link to that record.
impl From<&Record> for FieldValue {
    fn from(record: &Record) -> Self {
        FieldValue::Link(Link::from(record))
    }
}

impl From<&ImportRecord> for FieldValue {
    fn from(record: &ImportRecord) -> Self {
        FieldValue::Link(Link::from(record))
    }
}

impl From<Parameter> for FieldValue {
    fn from(value: Parameter) -> Self {
        FieldValue::Parameter(value)
    }
}

impl From<&Parameter> for FieldValue {
    fn from(value: &Parameter) -> Self {
        FieldValue::Parameter(value.clone())
    }
}

impl From<ConstArray> for FieldValue {
    fn from(value: ConstArray) -> Self {
        FieldValue::ConstArray(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        FieldValue::Json(value)
    }
}

/// Build a list of `(field, value)` pairs for record construction.
///
/// ```
/// let fields = epicsdb::fields! { "SCAN" => "1 second", "PREC" => 3 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<(&str, $crate::FieldValue)>::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$(($name, $crate::FieldValue::from($value))),+]
    };
}
