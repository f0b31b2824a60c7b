use super::types::{FieldType, SchemaDefinition};
use crate::error::{EpicsDbError, Result};
use std::path::Path;

/// Parse a schema YAML file into a SchemaDefinition
pub fn parse_schema(path: &Path) -> Result<SchemaDefinition> {
    let content = std::fs::read_to_string(path)?;
    parse_schema_str(&content)
}

/// Parse several schema files, accumulating their record types into one
/// definition. Earlier files take precedence for duplicated names.
pub fn parse_schema_files<P: AsRef<Path>>(paths: &[P]) -> Result<SchemaDefinition> {
    let mut schema = SchemaDefinition::default();
    for path in paths {
        let content = std::fs::read_to_string(path.as_ref())?;
        let loaded: SchemaDefinition = serde_yaml::from_str(&content)?;
        log::debug!(
            "Loaded {} record types from {}",
            loaded.record_types.len(),
            path.as_ref().display()
        );
        schema.merge(loaded);
    }
    check_menus(&schema)?;
    Ok(schema)
}

/// Parse a schema YAML string into a SchemaDefinition
pub fn parse_schema_str(content: &str) -> Result<SchemaDefinition> {
    let schema: SchemaDefinition = serde_yaml::from_str(content)?;
    check_menus(&schema)?;
    Ok(schema)
}

// Menu fields must name a menu, and the menu must exist.
fn check_menus(schema: &SchemaDefinition) -> Result<()> {
    for (type_name, record_type) in &schema.record_types {
        for (field_name, field) in &record_type.fields {
            if field.field_type != FieldType::Menu {
                continue;
            }
            match &field.menu {
                Some(menu) if schema.menus.contains_key(menu) => {}
                Some(menu) => {
                    return Err(EpicsDbError::Schema(format!(
                        "Field {type_name}.{field_name} refers to undefined menu '{menu}'"
                    )))
                }
                None => {
                    return Err(EpicsDbError::Schema(format!(
                        "Menu field {type_name}.{field_name} does not name a menu"
                    )))
                }
            }
        }
    }
    Ok(())
}
