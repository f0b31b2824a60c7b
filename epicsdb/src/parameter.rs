use crate::error::Result;
use crate::quote::quote_string;
use crate::record::Record;
use crate::value::DbValue;
use std::fmt;

/// A template parameter: rendered as a `$(NAME)` macro reference that the
/// IOC substitutes when it loads the database.
///
/// Parameters are created through [`crate::Database::parameter`], which keeps
/// names unique and records the description in the file header.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    name: String,
    default: Option<String>,
}

impl Parameter {
    pub(crate) fn new(name: impl Into<String>, default: Option<String>) -> Self {
        Parameter {
            name: name.into(),
            default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "$({}={})", self.name, default),
            None => write!(f, "$({})", self.name),
        }
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_string();
        write!(f, "Parameter{}", &text[1..])
    }
}

// The real value is only known when the IOC loads the file, so there is
// nothing to check here.
impl DbValue for Parameter {
    fn validate(&self, _record: &Record, _field: &str) -> Result<()> {
        Ok(())
    }

    fn format_db(&self, _record: &Record, _field: &str) -> String {
        quote_string(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Parameter::new("P", None).to_string(), "$(P)");
        assert_eq!(
            Parameter::new("Q", Some("1.5".into())).to_string(),
            "$(Q=1.5)"
        );
    }

    #[test]
    fn test_debug() {
        assert_eq!(format!("{:?}", Parameter::new("P", None)), "Parameter(P)");
        assert_eq!(
            format!("{:?}", Parameter::new("P", Some("x".into()))),
            "Parameter(P=x)"
        );
    }
}
