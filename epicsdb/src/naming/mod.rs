use crate::error::{EpicsDbError, Result};
use crate::parameter::Parameter;

/// Maximum record name length for EPICS 3.14
pub const MAX_NAME_LENGTH: usize = 61;

/// Record naming policy: a stack of prefixes joined to the given name with a
/// separator, optionally checked against a maximum length.
///
/// The default policy leaves names untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNames {
    prefix: Vec<String>,
    separator: String,
    check: bool,
    max_length: usize,
}

impl Default for RecordNames {
    fn default() -> Self {
        Self::identity()
    }
}

impl RecordNames {
    /// Names are used exactly as given.
    pub fn identity() -> Self {
        RecordNames {
            prefix: Vec::new(),
            separator: ":".into(),
            check: false,
            max_length: MAX_NAME_LENGTH,
        }
    }

    /// `prefix<separator>name`, with the length checked.
    pub fn simple(prefix: &str, separator: &str) -> Self {
        RecordNames {
            prefix: if prefix.is_empty() {
                Vec::new()
            } else {
                vec![prefix.to_string()]
            },
            separator: separator.to_string(),
            check: true,
            max_length: MAX_NAME_LENGTH,
        }
    }

    /// Names for a template: prefixed with the device parameter, which is
    /// only substituted at load time, so the length can't be checked here.
    pub fn template(device: &Parameter, separator: &str) -> Self {
        RecordNames {
            prefix: vec![device.to_string()],
            separator: separator.to_string(),
            check: false,
            max_length: MAX_NAME_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Compute the full record name for `name`.
    pub fn record_name(&self, name: &str) -> Result<String> {
        let mut parts: Vec<&str> = self.prefix.iter().map(String::as_str).collect();
        parts.push(name);
        let full = parts.join(&self.separator);

        if self.check {
            if full.is_empty() {
                return Err(EpicsDbError::InvalidName("record name is empty".into()));
            }
            if full.len() > self.max_length {
                return Err(EpicsDbError::NameTooLong {
                    name: full,
                    max: self.max_length,
                });
            }
        }
        Ok(full)
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefix
    }

    pub fn push_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix.push(prefix.into());
    }

    pub fn pop_prefix(&mut self) -> Result<String> {
        self.prefix.pop().ok_or(EpicsDbError::EmptyPrefixStack)
    }

    /// Replace the innermost prefix, or pop it when `prefix` is empty.
    pub fn set_prefix(&mut self, prefix: Option<&str>) -> Result<()> {
        match prefix {
            Some(prefix) if !prefix.is_empty() => {
                self.prefix.pop();
                self.push_prefix(prefix);
                Ok(())
            }
            _ => self.pop_prefix().map(|_| ()),
        }
    }

    pub fn set_separator(&mut self, separator: impl Into<String>) {
        self.separator = separator.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let names = RecordNames::identity();
        assert_eq!(names.record_name("TEST").unwrap(), "TEST");
        // unchecked
        assert!(names.record_name(&"X".repeat(100)).is_ok());
    }

    #[test]
    fn test_simple_prefix() {
        let names = RecordNames::simple("XX-YY-ZZ-01", ":");
        assert_eq!(names.record_name("TRIG").unwrap(), "XX-YY-ZZ-01:TRIG");

        let bare = RecordNames::simple("", ":");
        assert_eq!(bare.record_name("TRIG").unwrap(), "TRIG");
    }

    #[test]
    fn test_name_length_limit() {
        let names = RecordNames::simple("", ":");
        assert!(names.record_name(&"A".repeat(MAX_NAME_LENGTH)).is_ok());
        let err = names.record_name(&"A".repeat(MAX_NAME_LENGTH + 1)).unwrap_err();
        assert!(matches!(err, EpicsDbError::NameTooLong { max: 61, .. }));
        assert!(names.record_name("").is_err());
    }

    #[test]
    fn test_custom_max_length() {
        let names = RecordNames::simple("AB", ":").with_max_length(6);
        assert!(names.record_name("CDE").is_ok());
        assert!(names.record_name("CDEF").is_err());
    }

    #[test]
    fn test_template() {
        let device = Parameter::new("DEVICE", None);
        let names = RecordNames::template(&device, ":");
        assert_eq!(names.record_name("TEST").unwrap(), "$(DEVICE):TEST");
        assert!(names.record_name(&"X".repeat(100)).is_ok());
    }

    #[test]
    fn test_prefix_stack() {
        let mut names = RecordNames::simple("XX", ":");
        names.push_prefix("ABC");
        assert_eq!(names.record_name("TEST").unwrap(), "XX:ABC:TEST");
        assert_eq!(names.pop_prefix().unwrap(), "ABC");
        assert_eq!(names.record_name("TEST").unwrap(), "XX:TEST");

        names.set_prefix(Some("YY")).unwrap();
        assert_eq!(names.record_name("TEST").unwrap(), "YY:TEST");
        names.set_prefix(None).unwrap();
        assert_eq!(names.record_name("TEST").unwrap(), "TEST");
        assert!(matches!(names.pop_prefix(), Err(EpicsDbError::EmptyPrefixStack)));
    }

    #[test]
    fn test_separator() {
        let mut names = RecordNames::simple("XX", ":");
        names.set_separator("-");
        assert_eq!(names.record_name("TEST").unwrap(), "XX-TEST");
    }
}
