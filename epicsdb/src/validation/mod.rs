use crate::schema::{FieldDefinition, FieldType, SchemaDefinition, SchemaProvider};

/// The record name is given by the `record(...)` header, never as a field.
const NAME_FIELD: &str = "NAME";

impl SchemaProvider for SchemaDefinition {
    fn has_record_type(&self, record_type: &str) -> bool {
        self.record_types.contains_key(record_type)
    }

    fn record_types(&self) -> Vec<String> {
        // BTreeMap keys are already sorted
        self.record_types.keys().cloned().collect()
    }

    fn is_valid_field(&self, record_type: &str, field: &str) -> bool {
        field != NAME_FIELD && self.field(record_type, field).is_some()
    }

    fn check_value(&self, record_type: &str, field: &str, value: &str) -> Option<String> {
        if field == NAME_FIELD {
            return Some(format!("Invalid field name {field}"));
        }
        let Some(field_def) = self.field(record_type, field) else {
            return Some(format!("Invalid field name {field}"));
        };
        verify_value(self, record_type, field_def, value)
    }
}

/// Check a value the way the static database's dbVerify does: strings by
/// length, numbers by parse and range, menus and devices by choice.
fn verify_value(
    schema: &SchemaDefinition,
    record_type: &str,
    field_def: &FieldDefinition,
    value: &str,
) -> Option<String> {
    match field_def.field_type {
        FieldType::String => match field_def.size {
            Some(size) if value.len() >= size => {
                Some(format!("String too long, maximum length {}", size - 1))
            }
            _ => None,
        },
        FieldType::Float | FieldType::Double => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.parse::<f64>().is_ok() {
                None
            } else {
                Some("Not a valid number".into())
            }
        }
        FieldType::Menu => {
            let menu = field_def.menu.as_deref().unwrap_or_default();
            match schema.menus.get(menu) {
                Some(choices) => check_choice(choices, value, "menu"),
                None => Some(format!("Menu '{menu}' not defined")),
            }
        }
        FieldType::Device => {
            let devices = schema
                .record_type(record_type)
                .map(|r| r.devices.as_slice())
                .unwrap_or_default();
            if value.is_empty() || devices.iter().any(|d| d == value) {
                None
            } else {
                Some(format!("Not a valid device type for {record_type}"))
            }
        }
        // Link text is only parsed by the IOC
        link if link.is_link() => None,
        FieldType::Enum => None,
        FieldType::Noaccess => Some("Field is not accessible".into()),
        integer => {
            let (min, max) = integer.integer_range()?;
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            match parse_integer(trimmed) {
                Some(n) if n >= min && n <= max => None,
                Some(_) => Some("Number out of range for field type".into()),
                None => Some("Not a valid integer".into()),
            }
        }
    }
}

fn check_choice(choices: &[String], value: &str, kind: &str) -> Option<String> {
    if choices.iter().any(|c| c == value) {
        return None;
    }
    // A menu can also be set by its index
    match value.trim().parse::<usize>() {
        Ok(index) if index < choices.len() => None,
        _ => Some(format!("Not a valid {kind} choice")),
    }
}

/// Parse an integer accepting an optional sign and a `0x` hex prefix.
fn parse_integer(text: &str) -> Option<i128> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, body) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    // Only one sign, and only before any radix prefix
    if body.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = i128::from_str_radix(body, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_schema;

    #[test]
    fn test_valid_field_names() {
        let schema = test_schema();
        assert!(schema.is_valid_field("ai", "INP"));
        assert!(schema.is_valid_field("ai", "DESC"));
        assert!(!schema.is_valid_field("ai", "OUT"));
        assert!(!schema.is_valid_field("nosuchtype", "DESC"));
    }

    #[test]
    fn test_name_is_not_a_field() {
        let schema = test_schema();
        assert!(!schema.is_valid_field("ai", "NAME"));
        assert!(schema.check_value("ai", "NAME", "x").is_some());
    }

    #[test]
    fn test_record_types_sorted() {
        let schema = test_schema();
        let types = schema.record_types();
        let mut sorted = types.clone();
        sorted.sort();
        assert_eq!(types, sorted);
        assert!(schema.has_record_type("dfanout"));
        assert!(!schema.has_record_type("DFANOUT"));
    }

    #[test]
    fn test_string_length() {
        let schema = test_schema();
        assert_eq!(schema.check_value("ai", "DESC", &"x".repeat(40)), None);
        let message = schema.check_value("ai", "DESC", &"x".repeat(41)).unwrap();
        assert!(message.contains("40"), "{message}");
    }

    #[test]
    fn test_numeric_fields() {
        let schema = test_schema();
        assert_eq!(schema.check_value("ai", "VAL", "2.5"), None);
        assert_eq!(schema.check_value("ai", "VAL", "-1e3"), None);
        assert_eq!(schema.check_value("ai", "VAL", ""), None);
        assert!(schema.check_value("ai", "VAL", "abc").is_some());

        assert_eq!(schema.check_value("ai", "PREC", "3"), None);
        assert_eq!(schema.check_value("ai", "PREC", "0x10"), None);
        assert!(schema.check_value("ai", "PREC", "1.5").is_some());
        assert!(schema.check_value("ai", "PREC", "40000").is_some());
        assert!(schema.check_value("ai", "TPRO", "-1").is_some());
        assert!(schema.check_value("ai", "PREC", "--1").is_some());
        assert!(schema.check_value("ai", "PREC", "0x-5").is_some());
        assert!(schema.check_value("ai", "PREC", "-0x-5").is_some());
        assert!(schema.check_value("ai", "TPRO", "0x+5").is_some());
        assert_eq!(schema.check_value("ai", "PREC", "-0x10"), None);
    }

    #[test]
    fn test_menu_choices() {
        let schema = test_schema();
        assert_eq!(schema.check_value("ai", "SCAN", "1 second"), None);
        assert_eq!(schema.check_value("ai", "SCAN", "0"), None);
        assert!(schema.check_value("ai", "SCAN", "3 second").is_some());
        assert!(schema.check_value("ai", "SCAN", "99").is_some());
    }

    #[test]
    fn test_device_choices() {
        let schema = test_schema();
        assert_eq!(schema.check_value("ai", "DTYP", "Soft Channel"), None);
        assert_eq!(schema.check_value("ai", "DTYP", ""), None);
        assert!(schema.check_value("ai", "DTYP", "asyn").is_some());
    }

    #[test]
    fn test_links_accept_anything() {
        let schema = test_schema();
        assert_eq!(schema.check_value("ai", "INP", "OTHER.VAL CP MS"), None);
        assert_eq!(schema.check_value("ai", "INP", "@$(P)"), None);
    }

    #[test]
    fn test_noaccess_rejected() {
        let schema = test_schema();
        assert!(schema.check_value("ai", "PACT", "1").is_some());
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("-42"), Some(-42));
        assert_eq!(parse_integer("0xff"), Some(255));
        assert_eq!(parse_integer("x"), None);
        assert_eq!(parse_integer(""), None);
        assert_eq!(parse_integer("-0x10"), Some(-16));
        assert_eq!(parse_integer("0x-5"), None);
        assert_eq!(parse_integer("0x+5"), None);
        assert_eq!(parse_integer("-0x-5"), None);
        assert_eq!(parse_integer("+-5"), None);
        assert_eq!(parse_integer("0x"), None);
    }
}
