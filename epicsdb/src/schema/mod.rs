mod parser;
mod types;

pub use parser::{parse_schema, parse_schema_files, parse_schema_str};
pub use types::{FieldDefinition, FieldType, RecordTypeDefinition, SchemaDefinition};

/// Answers field-name and field-value questions for record types.
///
/// This is the only seam between the record model and whatever knows the
/// record type definitions. [`SchemaDefinition`] is the bundled
/// implementation, loaded from a YAML description of the record types.
pub trait SchemaProvider: Send + Sync {
    /// Whether the record type is known at all.
    fn has_record_type(&self, record_type: &str) -> bool;

    /// All known record types, sorted.
    fn record_types(&self) -> Vec<String>;

    /// Whether `field` can be assigned on records of `record_type`.
    fn is_valid_field(&self, record_type: &str, field: &str) -> bool;

    /// Checks whether `value` may be written to `field`.
    /// Returns the rejection message, or `None` if the value is acceptable.
    fn check_value(&self, record_type: &str, field: &str, value: &str) -> Option<String>;
}
