use crate::error::{EpicsDbError, Result};
use crate::link::{Link, LinkTarget};
use crate::quote::quote_string;
use crate::schema::SchemaProvider;
use crate::value::FieldValue;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Synthetic field name standing for whichever of INP or OUT the record
/// type has.
pub const ADDRESS_FIELD: &str = "address";

/// Comment lines written above a record block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Written as `#% text`, continuation lines as `# text`
    Metadata(String),
    /// Written as `# text`
    Comment(String),
}

/// A single EPICS record: a record type, a resolved name, and validated
/// field values.
///
/// Records are created and owned by a [`crate::Database`]; field names are
/// checked against the schema on assignment.
pub struct Record {
    record_type: String,
    name: String,
    fields: BTreeMap<String, FieldValue>,
    aliases: BTreeSet<String>,
    annotations: Vec<Annotation>,
    infos: Vec<(String, serde_json::Value)>,
    address: Option<&'static str>,
    schema: Arc<dyn SchemaProvider>,
}

impl Record {
    pub(crate) fn new(
        record_type: &str,
        name: String,
        schema: Arc<dyn SchemaProvider>,
    ) -> Result<Self> {
        if !schema.has_record_type(record_type) {
            return Err(EpicsDbError::UnknownRecordType(record_type.to_string()));
        }

        // `address` is only available when exactly one of INP and OUT exists
        let candidates: Vec<&'static str> = ["INP", "OUT"]
            .into_iter()
            .filter(|f| schema.is_valid_field(record_type, f))
            .collect();
        let address = match candidates.as_slice() {
            [only] => Some(*only),
            _ => None,
        };

        Ok(Record {
            record_type: record_type.to_string(),
            name,
            fields: BTreeMap::new(),
            aliases: BTreeSet::new(),
            annotations: Vec::new(),
            infos: Vec::new(),
            address,
            schema,
        })
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this record type supports the given field name.
    pub fn valid_field_name(&self, field: &str) -> bool {
        self.schema.is_valid_field(&self.record_type, field)
    }

    fn resolve_field<'a>(&self, field: &'a str) -> Result<&'a str> {
        if field != ADDRESS_FIELD {
            return Ok(field);
        }
        self.address
            .ok_or_else(|| EpicsDbError::NoAddressField(self.record_type.clone()))
    }

    fn check_field_name(&self, field: &str) -> Result<()> {
        if self.valid_field_name(field) {
            Ok(())
        } else {
            Err(EpicsDbError::UnknownField {
                record_type: self.record_type.clone(),
                field: field.to_string(),
            })
        }
    }

    /// Assign a field value, validating it unless it asks to be validated
    /// later.
    pub fn set_field(&mut self, field: &str, value: impl Into<FieldValue>) -> Result<()> {
        let field = self.resolve_field(field)?;
        let value = value.into();
        if !value.validate_later() {
            self.validate_field(field, &value)?;
        }
        self.fields.insert(field.to_string(), value);
        Ok(())
    }

    /// Assign a field, or remove it when `value` is `None`.
    pub fn set_field_opt<V: Into<FieldValue>>(
        &mut self,
        field: &str,
        value: Option<V>,
    ) -> Result<()> {
        match value {
            Some(value) => self.set_field(field, value),
            None => self.remove_field(field).map(|_| ()),
        }
    }

    /// Remove a field, returning its previous value if it was set.
    pub fn remove_field(&mut self, field: &str) -> Result<Option<FieldValue>> {
        let field = self.resolve_field(field)?;
        Ok(self.fields.remove(field))
    }

    /// A link to one of this record's fields.
    pub fn field(&self, field: &str) -> Result<Link> {
        let field = self.resolve_field(field)?;
        self.check_field_name(field)?;
        Ok(Link::new(
            LinkTarget::Record(self.name.clone()),
            Some(field.to_string()),
        ))
    }

    /// A link to this record with the given specifiers.
    pub fn link<I, S>(&self, specifiers: I) -> Link
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Link::from(self).append(specifiers)
    }

    /// The value currently assigned to a field.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        let field = self.resolve_field(field).ok()?;
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(String::as_str)
    }

    pub fn add_alias(&mut self, alias: impl Into<String>) {
        self.aliases.insert(alias.into());
    }

    pub fn add_metadata(&mut self, metadata: impl Into<String>) {
        self.annotations.push(Annotation::Metadata(metadata.into()));
    }

    pub fn add_comment(&mut self, comment: impl Into<String>) {
        self.annotations.push(Annotation::Comment(comment.into()));
    }

    /// Attach an `info(name, value)` tag. Strings are quoted, structured
    /// values are written as JSON.
    pub fn add_info(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.infos.push((name.into(), value.into()));
    }

    /// Freeze this record into a name-only reference.
    pub fn to_import_handle(&self) -> ImportRecord {
        ImportRecord::new(self.name.clone())
    }

    fn validate_field(&self, field: &str, value: &FieldValue) -> Result<()> {
        self.check_field_name(field)?;
        if let Some(db_value) = value.as_db_value() {
            return db_value.validate(self, field);
        }
        if let FieldValue::Json(_) = value.inner() {
            return Ok(());
        }
        let text = value.to_string();
        match self.schema.check_value(&self.record_type, field, &text) {
            Some(message) => Err(EpicsDbError::InvalidFieldValue {
                field: field.to_string(),
                value: text,
                message,
            }),
            None => Ok(()),
        }
    }

    /// Run the validation postponed at assignment time.
    pub fn validate_deferred(&self) -> Result<()> {
        for (field, value) in &self.fields {
            if value.validate_later() {
                self.validate_field(field, value)?;
            }
        }
        Ok(())
    }

    fn format_field(&self, field: &str, value: &FieldValue) -> String {
        if let Some(db_value) = value.as_db_value() {
            return db_value.format_db(self, field);
        }
        match value.inner() {
            FieldValue::Json(json) => json.to_string(),
            other => quote_string(&other.to_string()),
        }
    }

    /// Render the record in .db file format, preceded by a blank line.
    pub fn render(&self) -> Result<String> {
        self.validate_deferred()?;

        let mut out = String::from("\n");
        for annotation in &self.annotations {
            match annotation {
                Annotation::Metadata(text) => {
                    let mut lines = text.lines();
                    out.push_str(&format!("#% {}\n", lines.next().unwrap_or_default()));
                    for line in lines {
                        out.push_str(&format!("# {line}\n"));
                    }
                }
                Annotation::Comment(text) => {
                    for line in text.lines() {
                        out.push_str(&format!("# {line}\n"));
                    }
                }
            }
        }

        out.push_str(&format!("record({}, \"{}\")\n{{\n", self.record_type, self.name));
        // Sorted by field name: stable diffs, and DTYP is not required to
        // come before INP/OUT.
        for (field, value) in &self.fields {
            let value = self.format_field(field, value);
            let pad = 4usize.saturating_sub(field.len());
            out.push_str(&format!("    field({field}, {:pad$}{value})\n", ""));
        }
        for alias in &self.aliases {
            out.push_str(&format!("    alias(\"{alias}\")\n"));
        }
        for (name, value) in &self.infos {
            let value = match value {
                serde_json::Value::String(s) => quote_string(s),
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => value.to_string(),
                other => quote_string(&other.to_string()),
            };
            out.push_str(&format!("    info({name}, {value})\n"));
        }
        out.push_str("}\n");
        Ok(out)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<record {} \"{}\">", self.record_type, self.name)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&Record> for Link {
    fn from(record: &Record) -> Self {
        Link::new(LinkTarget::Record(record.name.clone()), None)
    }
}

/// A record defined elsewhere, known only by its name.
///
/// No schema is available, so the only check on field names is that they
/// look like field names: uppercase letters and digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportRecord {
    name: String,
}

fn field_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9]+$").expect("valid field name regex"))
}

impl ImportRecord {
    pub fn new(name: impl Into<String>) -> Self {
        ImportRecord { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self, field: &str) -> Result<Link> {
        if !field_name_pattern().is_match(field) {
            return Err(EpicsDbError::UnknownField {
                record_type: "imported record".into(),
                field: field.to_string(),
            });
        }
        Ok(Link::new(
            LinkTarget::Import(self.name.clone()),
            Some(field.to_string()),
        ))
    }

    pub fn link<I, S>(&self, specifiers: I) -> Link
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Link::from(self).append(specifiers)
    }
}

impl fmt::Display for ImportRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&ImportRecord> for Link {
    fn from(record: &ImportRecord) -> Self {
        Link::new(LinkTarget::Import(record.name.clone()), None)
    }
}
