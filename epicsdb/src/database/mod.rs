use crate::error::{EpicsDbError, Result};
use crate::link::{Link, LinkTarget};
use crate::naming::RecordNames;
use crate::parameter::Parameter;
use crate::record::{ImportRecord, Record};
use crate::recordset::{RecordId, RecordSet};
use crate::schema::SchemaProvider;
use crate::value::FieldValue;
use std::collections::BTreeSet;
use std::ops::{Index, IndexMut};
use std::path::Path;
use std::sync::Arc;

/// One generation run: the schema, the active naming policy, the records
/// created so far and the parameter names in use.
pub struct Database {
    schema: Arc<dyn SchemaProvider>,
    names: RecordNames,
    records: RecordSet,
    parameters: BTreeSet<String>,
}

impl Database {
    pub fn new(schema: Arc<dyn SchemaProvider>) -> Self {
        Database {
            schema,
            names: RecordNames::default(),
            records: RecordSet::new(),
            parameters: BTreeSet::new(),
        }
    }

    pub fn schema(&self) -> &Arc<dyn SchemaProvider> {
        &self.schema
    }

    pub fn names(&self) -> &RecordNames {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut RecordNames {
        &mut self.names
    }

    /// Install a naming policy, returning the previous one.
    pub fn set_record_names(&mut self, names: RecordNames) -> RecordNames {
        std::mem::replace(&mut self.names, names)
    }

    /// Switch to template naming: every name is prefixed with a new
    /// `$(DEVICE)` parameter.
    pub fn use_template_names(&mut self, separator: &str) -> Result<Parameter> {
        let device = self.parameter("DEVICE", "Device name", None)?;
        self.names = RecordNames::template(&device, separator);
        Ok(device)
    }

    /// The full name a record created as `name` would get.
    pub fn record_name(&self, name: &str) -> Result<String> {
        self.names.record_name(name)
    }

    /// Create and register a record, assigning the given fields in order.
    pub fn create_record<K, I>(
        &mut self,
        record_type: &str,
        name: &str,
        fields: I,
    ) -> Result<RecordId>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, FieldValue)>,
    {
        let full_name = self.names.record_name(name)?;
        let mut record = Record::new(record_type, full_name, Arc::clone(&self.schema))?;
        for (field, value) in fields {
            record.set_field(field.as_ref(), value)?;
        }
        self.records.publish(record)
    }

    /// Create a record with no fields set.
    pub fn create(&mut self, record_type: &str, name: &str) -> Result<RecordId> {
        self.create_record(record_type, name, crate::fields! {})
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn record_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.get_mut(id)
    }

    /// Look up a record by its full name.
    pub fn find(&self, name: &str) -> Option<RecordId> {
        self.records.find(name)
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    /// Declare a template parameter. Each name may be declared once per run;
    /// the description is written to the file header.
    pub fn parameter(
        &mut self,
        name: &str,
        description: &str,
        default: Option<&str>,
    ) -> Result<Parameter> {
        if !self.parameters.insert(name.to_string()) {
            return Err(EpicsDbError::DuplicateParameter(name.to_string()));
        }
        log::debug!("Declaring parameter {name}");

        let mut lines = description.split('\n');
        self.records
            .add_header_line(format!("#% macro, {name}, {}", lines.next().unwrap_or_default()));
        for line in lines {
            self.records.add_header_line(format!("#  {line}"));
        }
        Ok(Parameter::new(name, default.map(str::to_string)))
    }

    /// The value currently stored in the field a link points at.
    pub fn link_value(&self, link: &Link) -> Result<&FieldValue> {
        let name = match link.target() {
            LinkTarget::Record(name) => name,
            LinkTarget::Import(name) => {
                return Err(EpicsDbError::Link(format!(
                    "{name} is an imported record, its fields are unknown"
                )))
            }
        };
        let field = link
            .field()
            .ok_or_else(|| EpicsDbError::Link(format!("link to {name} has no field")))?;
        let record = self
            .find(name)
            .and_then(|id| self.record(id))
            .ok_or_else(|| EpicsDbError::RecordNotFound(name.clone()))?;
        record.value(field).ok_or_else(|| EpicsDbError::FieldNotSet {
            record: name.clone(),
            field: field.to_string(),
        })
    }

    pub fn add_header_line(&mut self, line: impl Into<String>) {
        self.records.add_header_line(line);
    }

    pub fn add_body_line(&mut self, line: impl Into<String>) {
        self.records.add_body_line(line);
    }

    /// Alias an imported record; written after all records.
    pub fn add_import_alias(&mut self, record: &ImportRecord, alias: &str) {
        self.records
            .add_body_line(format!("alias(\"{}\", \"{alias}\")", record.name()));
    }

    /// Forget all records, lines and parameter names, and restore identity
    /// naming. Record ids issued before the reset no longer resolve.
    pub fn reset(&mut self) {
        self.records.reset();
        self.parameters.clear();
        self.names = RecordNames::default();
    }

    /// Render the whole database file.
    pub fn render(&self, alphabetical: bool) -> Result<String> {
        let generated_at = chrono::Local::now().format("%a %d %b %Y %H:%M:%S").to_string();
        self.records.render(alphabetical, &generated_at)
    }

    /// Write the database file to `path`.
    pub fn write_records(&self, path: impl AsRef<Path>, alphabetical: bool) -> Result<()> {
        let path = path.as_ref();
        let text = self.render(alphabetical)?;
        std::fs::write(path, text)?;
        log::info!("Wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }
}

impl Index<RecordId> for Database {
    type Output = Record;

    fn index(&self, id: RecordId) -> &Record {
        self.records
            .get(id)
            .expect("record id from another database or from before a reset")
    }
}

impl IndexMut<RecordId> for Database {
    fn index_mut(&mut self, id: RecordId) -> &mut Record {
        self.records
            .get_mut(id)
            .expect("record id from another database or from before a reset")
    }
}
