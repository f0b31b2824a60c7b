use crate::error::{EpicsDbError, Result};
use crate::parameter::Parameter;
use crate::quote::quote_string;
use crate::record::Record;
use crate::value::{format_float, DbValue};
use rust_decimal::Decimal;
use std::fmt;

/// One element of a [`ConstArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayElement {
    Str(String),
    Parameter(Parameter),
    Int(i64),
    /// Integers above `i64::MAX`, kept exact
    Unsigned(u64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ElementKind {
    StringLike,
    NumericLike,
}

impl ArrayElement {
    fn kind(&self) -> ElementKind {
        match self {
            ArrayElement::Str(_) | ArrayElement::Parameter(_) => ElementKind::StringLike,
            _ => ElementKind::NumericLike,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            ArrayElement::Str(_) => "string",
            ArrayElement::Parameter(_) => "parameter",
            ArrayElement::Int(_) | ArrayElement::Unsigned(_) => "integer",
            ArrayElement::Float(_) => "float",
            ArrayElement::Decimal(_) => "decimal",
            ArrayElement::Bool(_) => "boolean",
        }
    }

    fn format(&self) -> String {
        match self {
            ArrayElement::Str(s) => quote_string(s),
            ArrayElement::Parameter(p) => format!("\"{p}\""),
            ArrayElement::Int(n) => n.to_string(),
            ArrayElement::Unsigned(n) => n.to_string(),
            ArrayElement::Float(x) => format_float(*x),
            ArrayElement::Decimal(d) => d.to_string(),
            ArrayElement::Bool(b) => String::from(if *b { "1" } else { "0" }),
        }
    }
}

impl From<&str> for ArrayElement {
    fn from(value: &str) -> Self {
        ArrayElement::Str(value.to_string())
    }
}

impl From<String> for ArrayElement {
    fn from(value: String) -> Self {
        ArrayElement::Str(value)
    }
}

impl From<Parameter> for ArrayElement {
    fn from(value: Parameter) -> Self {
        ArrayElement::Parameter(value)
    }
}

impl From<&Parameter> for ArrayElement {
    fn from(value: &Parameter) -> Self {
        ArrayElement::Parameter(value.clone())
    }
}

impl From<i64> for ArrayElement {
    fn from(value: i64) -> Self {
        ArrayElement::Int(value)
    }
}

impl From<i32> for ArrayElement {
    fn from(value: i32) -> Self {
        ArrayElement::Int(value.into())
    }
}

impl From<u64> for ArrayElement {
    fn from(value: u64) -> Self {
        ArrayElement::Unsigned(value)
    }
}

impl From<f64> for ArrayElement {
    fn from(value: f64) -> Self {
        ArrayElement::Float(value)
    }
}

impl From<Decimal> for ArrayElement {
    fn from(value: Decimal) -> Self {
        ArrayElement::Decimal(value)
    }
}

impl From<bool> for ArrayElement {
    fn from(value: bool) -> Self {
        ArrayElement::Bool(value)
    }
}

/// Constant link value, written as `[e1,e2,...]` (EPICS Base 3.16.1 and
/// above).
///
/// The array must be non-empty and homogeneous: either all strings and
/// parameters, or all numbers and booleans. IOCs reject mixed arrays and do
/// not treat `[]` as a constant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstArray {
    elements: Vec<ArrayElement>,
}

impl ConstArray {
    pub fn new<I, E>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<ArrayElement>,
    {
        let elements: Vec<ArrayElement> = elements.into_iter().map(Into::into).collect();
        check_elements(&elements)?;
        Ok(ConstArray { elements })
    }

    /// Build an array from a JSON sequence, as found in build manifests.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| EpicsDbError::NotASequence(json_type_name(value).into()))?;

        let mut elements = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let element = match item {
                serde_json::Value::String(s) => ArrayElement::Str(s.clone()),
                serde_json::Value::Bool(b) => ArrayElement::Bool(*b),
                serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                    (Some(i), _) => ArrayElement::Int(i),
                    (None, Some(u)) => ArrayElement::Unsigned(u),
                    (None, None) => ArrayElement::Float(n.as_f64().unwrap_or(f64::NAN)),
                },
                other => {
                    return Err(EpicsDbError::Homogeneity(format!(
                        "expects a string or parameter as element but an element at the index {index} is {}.",
                        json_type_name(other)
                    )))
                }
            };
            elements.push(element);
        }
        Self::new(elements)
    }

    pub fn elements(&self) -> &[ArrayElement] {
        &self.elements
    }
}

fn check_elements(elements: &[ArrayElement]) -> Result<()> {
    let first = elements.first().ok_or(EpicsDbError::EmptyArray)?;
    let expected = first.kind();
    for (index, element) in elements.iter().enumerate() {
        if element.kind() == expected {
            continue;
        }
        let what = match expected {
            ElementKind::StringLike => "strings",
            ElementKind::NumericLike => "numbers",
        };
        return Err(EpicsDbError::Homogeneity(format!(
            "cannot mix {what} with an element at index {index} which is {}.",
            element.type_name()
        )));
    }
    Ok(())
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}

impl DbValue for ConstArray {
    // Link fields accept any text, so the schema has nothing to add here;
    // only the array's own rules apply.
    fn validate(&self, _record: &Record, _field: &str) -> Result<()> {
        check_elements(&self.elements)
    }

    fn format_db(&self, _record: &Record, _field: &str) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConstArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted: Vec<String> = self.elements.iter().map(ArrayElement::format).collect();
        write!(f, "[{}]", formatted.join(","))
    }
}
