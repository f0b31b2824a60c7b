use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level schema definition parsed from a schema YAML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Menu name -> ordered choices
    #[serde(default)]
    pub menus: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub record_types: BTreeMap<String, RecordTypeDefinition>,
}

/// Definition of a single record type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordTypeDefinition {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
    /// Device support choices accepted by the DTYP field
    #[serde(default)]
    pub devices: Vec<String>,
}

/// Definition of a single field in a record type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Buffer size for string fields, including the terminator
    #[serde(default)]
    pub size: Option<usize>,
    /// Menu name for menu fields
    #[serde(default)]
    pub menu: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Field type enumeration, mirroring the DBF_* field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Char,
    Uchar,
    Short,
    Ushort,
    Long,
    Ulong,
    Int64,
    Uint64,
    Float,
    Double,
    Enum,
    Menu,
    Device,
    Inlink,
    Outlink,
    Fwdlink,
    Noaccess,
}

impl FieldType {
    /// Inclusive integer range for the integer field types.
    pub fn integer_range(&self) -> Option<(i128, i128)> {
        match self {
            FieldType::Char => Some((i8::MIN as i128, i8::MAX as i128)),
            FieldType::Uchar => Some((0, u8::MAX as i128)),
            FieldType::Short => Some((i16::MIN as i128, i16::MAX as i128)),
            FieldType::Ushort => Some((0, u16::MAX as i128)),
            FieldType::Long => Some((i32::MIN as i128, i32::MAX as i128)),
            FieldType::Ulong => Some((0, u32::MAX as i128)),
            FieldType::Int64 => Some((i64::MIN as i128, i64::MAX as i128)),
            FieldType::Uint64 => Some((0, u64::MAX as i128)),
            _ => None,
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(
            self,
            FieldType::Inlink | FieldType::Outlink | FieldType::Fwdlink
        )
    }
}

impl SchemaDefinition {
    pub fn record_type(&self, name: &str) -> Option<&RecordTypeDefinition> {
        self.record_types.get(name)
    }

    pub fn field(&self, record_type: &str, field: &str) -> Option<&FieldDefinition> {
        self.record_types
            .get(record_type)
            .and_then(|r| r.fields.get(field))
    }

    /// Merge another schema into this one. Record types and menus already
    /// present are kept, so the first definition loaded wins.
    pub fn merge(&mut self, other: SchemaDefinition) {
        for (name, choices) in other.menus {
            self.menus.entry(name).or_insert(choices);
        }
        for (name, record_type) in other.record_types {
            self.record_types.entry(name).or_insert(record_type);
        }
    }
}
