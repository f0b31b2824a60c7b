use crate::const_array::ConstArray;
use crate::database::Database;
use crate::error::{EpicsDbError, Result};
use crate::fanout::{create_chain, FanoutKind};
use crate::link::Link;
use crate::naming::RecordNames;
use crate::parameter::Parameter;
use crate::record::ImportRecord;
use crate::recordset::RecordId;
use crate::value::FieldValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A build manifest: the records of one database file, described in YAML.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Manifest {
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub imports: Vec<ImportDefinition>,
    #[serde(default)]
    pub records: Vec<RecordDefinition>,
    #[serde(default)]
    pub fanouts: Vec<FanoutDefinition>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamingConfig {
    #[default]
    Identity,
    Simple {
        #[serde(default)]
        prefix: String,
        #[serde(default = "default_separator")]
        separator: String,
        #[serde(default)]
        max_length: Option<usize>,
    },
    /// Names prefixed with a `$(DEVICE)` parameter
    Template {
        #[serde(default = "default_separator")]
        separator: String,
    },
}

fn default_separator() -> String {
    ":".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: Option<String>,
}

/// A record defined in another file, referenced by its full name.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportDefinition {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecordDefinition {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub comments: Vec<String>,
    #[serde(default)]
    pub metadata: Vec<String>,
    #[serde(default)]
    pub info: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanoutType {
    #[default]
    Fanout,
    Dfanout,
}

impl From<FanoutType> for FanoutKind {
    fn from(value: FanoutType) -> Self {
        match value {
            FanoutType::Fanout => FanoutKind::Fanout,
            FanoutType::Dfanout => FanoutKind::Dfanout,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanoutDefinition {
    #[serde(default, rename = "type")]
    pub fanout_type: FanoutType,
    pub name: String,
    #[serde(default)]
    pub targets: Vec<LinkRef>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// A link to a manifest record, fanout or import: either just its name, or
/// a mapping with a field and specifiers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LinkRef {
    Name(String),
    Detailed(LinkSpec),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkSpec {
    pub link: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub specifiers: Vec<String>,
}

impl LinkRef {
    fn spec(&self) -> LinkSpec {
        match self {
            LinkRef::Name(name) => LinkSpec {
                link: name.clone(),
                field: None,
                specifiers: Vec::new(),
            },
            LinkRef::Detailed(spec) => spec.clone(),
        }
    }
}

/// Read a build manifest from a YAML file.
pub fn parse_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let content = std::fs::read_to_string(path.as_ref())?;
    parse_manifest_str(&content)
}

/// Parse a build manifest from a YAML string.
pub fn parse_manifest_str(yaml: &str) -> Result<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(yaml)?;
    Ok(manifest)
}

enum Target {
    Record(RecordId),
    Import(ImportRecord),
}

/// Resolves names used inside the manifest to records and parameters.
#[derive(Default)]
struct Resolver {
    targets: HashMap<String, Target>,
    parameters: HashMap<String, Parameter>,
}

impl Resolver {
    fn declare(&mut self, name: &str, target: Target) -> Result<()> {
        if self.targets.insert(name.to_string(), target).is_some() {
            return Err(EpicsDbError::Manifest(format!("{name} is defined twice")));
        }
        Ok(())
    }

    fn link(&self, db: &Database, spec: &LinkSpec) -> Result<Link> {
        let target = self.targets.get(&spec.link).ok_or_else(|| {
            EpicsDbError::Manifest(format!("link to undefined record {}", spec.link))
        })?;
        let link = match (target, spec.field.as_deref()) {
            (Target::Record(id), Some(field)) => db[*id].field(field)?,
            (Target::Record(id), None) => Link::from(&db[*id]),
            (Target::Import(record), Some(field)) => record.field(field)?,
            (Target::Import(record), None) => Link::from(record),
        };
        Ok(link.append(spec.specifiers.iter().cloned()))
    }

    /// Map a manifest value onto a field value; `None` means leave the field
    /// unset.
    fn value(&self, db: &Database, value: &serde_json::Value) -> Result<Option<FieldValue>> {
        use serde_json::Value;

        let mapped = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => FieldValue::Int(i64::from(*b)),
            Value::Number(n) => match (n.as_i64(), n.is_u64()) {
                (Some(i), _) => FieldValue::Int(i),
                (None, true) => FieldValue::Str(n.to_string()),
                (None, false) => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Str(s.clone()),
            Value::Array(_) => FieldValue::ConstArray(ConstArray::from_json(value)?),
            Value::Object(map) => {
                if map.contains_key("link") {
                    let spec: LinkSpec = serde_json::from_value(value.clone())?;
                    FieldValue::Link(self.link(db, &spec)?)
                } else if let Some(name) = map.get("parameter") {
                    let name = name.as_str().unwrap_or_default();
                    let parameter = self.parameters.get(name).ok_or_else(|| {
                        EpicsDbError::Manifest(format!("undeclared parameter {name}"))
                    })?;
                    FieldValue::Parameter(parameter.clone())
                } else if let Some(inner) = map.get("later") {
                    match self.value(db, inner)? {
                        Some(inner) => FieldValue::later(inner),
                        None => return Ok(None),
                    }
                } else {
                    FieldValue::Json(value.clone())
                }
            }
        };
        Ok(Some(mapped))
    }

    fn fields(
        &self,
        db: &Database,
        fields: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Vec<(String, FieldValue)>> {
        let mut mapped = Vec::with_capacity(fields.len());
        for (field, value) in fields {
            if let Some(value) = self.value(db, value)? {
                mapped.push((field.clone(), value));
            }
        }
        Ok(mapped)
    }
}

/// Create everything a manifest describes in `db`.
///
/// Records are created before any field is assigned, so links may refer to
/// records defined further down the manifest.
pub fn build(db: &mut Database, manifest: &Manifest) -> Result<()> {
    match &manifest.naming {
        NamingConfig::Identity => {
            db.set_record_names(RecordNames::identity());
        }
        NamingConfig::Simple {
            prefix,
            separator,
            max_length,
        } => {
            let mut names = RecordNames::simple(prefix, separator);
            if let Some(max_length) = max_length {
                names = names.with_max_length(*max_length);
            }
            db.set_record_names(names);
        }
        NamingConfig::Template { separator } => {
            db.use_template_names(separator)?;
        }
    }

    let mut resolver = Resolver::default();
    for definition in &manifest.parameters {
        let parameter = db.parameter(
            &definition.name,
            &definition.description,
            definition.default.as_deref(),
        )?;
        resolver
            .parameters
            .insert(definition.name.clone(), parameter);
    }

    for definition in &manifest.imports {
        let record = ImportRecord::new(definition.name.clone());
        for alias in &definition.aliases {
            db.add_import_alias(&record, alias);
        }
        resolver.declare(&definition.name, Target::Import(record))?;
    }

    let mut created = Vec::with_capacity(manifest.records.len());
    for definition in &manifest.records {
        let id = db.create(&definition.record_type, &definition.name)?;
        let record = &mut db[id];
        for comment in &definition.comments {
            record.add_comment(comment.as_str());
        }
        for metadata in &definition.metadata {
            record.add_metadata(metadata.as_str());
        }
        for alias in &definition.aliases {
            record.add_alias(alias.as_str());
        }
        for (name, value) in &definition.info {
            record.add_info(name.as_str(), value.clone());
        }
        resolver.declare(&definition.name, Target::Record(id))?;
        created.push((id, definition));
    }

    for definition in &manifest.fanouts {
        let targets = definition
            .targets
            .iter()
            .map(|target| resolver.link(db, &target.spec()))
            .collect::<Result<Vec<_>>>()?;
        let fields = resolver.fields(db, &definition.fields)?;
        let id = create_chain(
            db,
            definition.fanout_type.into(),
            &definition.name,
            targets,
            fields,
        )?;
        resolver.declare(&definition.name, Target::Record(id))?;
    }

    for (id, definition) in created {
        let fields = resolver.fields(db, &definition.fields)?;
        for (field, value) in fields {
            db[id].set_field(&field, value)?;
        }
    }

    log::debug!("Built {} records from manifest", db.records().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_database;
    use pretty_assertions::assert_eq;

    const MANIFEST: &str = r#"
naming:
  kind: simple
  prefix: XX-YY-ZZ-01
parameters:
  - name: P
    description: A parameter
  - name: Q
    description: |-
      A number
      with two lines
    default: "5"
imports:
  - name: SR-DI-DCCT-01:SIGNAL
    aliases: [DCCT]
records:
  - type: bi
    name: TRIG
    fields:
      SCAN: 1 second
      FLNK: { link: FAN }
  - type: longin
    name: A
    fields:
      DESC: blah
  - type: ai
    name: B
    comments: [Reads the beam current]
    aliases: [XX:CURRENT]
    fields:
      INP: { link: SR-DI-DCCT-01:SIGNAL, specifiers: [CP, MS] }
      PREC: 3
      VAL: { parameter: Q }
      EGU: ~
  - type: waveform
    name: WF
    info:
      autosaveFields: NELM
    fields:
      INP: [1, 2, 3]
  - type: ai
    name: JSON
    fields:
      INP: { const: 2.5 }
      SCAN: { later: 2 second }
fanouts:
  - name: FAN
    targets:
      - A
      - { link: B, field: PROC }
"#;

    fn value(db: &Database, name: &str, field: &str) -> Option<String> {
        let id = db.find(name)?;
        db[id].value(field).map(ToString::to_string)
    }

    #[test]
    fn test_parse() {
        let manifest = parse_manifest_str(MANIFEST).unwrap();
        assert!(matches!(
            manifest.naming,
            NamingConfig::Simple { ref separator, .. } if separator == ":"
        ));
        assert_eq!(manifest.records.len(), 5);
        assert_eq!(manifest.fanouts[0].fanout_type, FanoutType::Fanout);
        assert_eq!(manifest.fanouts[0].targets[0], LinkRef::Name("A".into()));
    }

    #[test]
    fn test_defaults() {
        let manifest = parse_manifest_str("records: []").unwrap();
        assert!(matches!(manifest.naming, NamingConfig::Identity));
        assert!(manifest.parameters.is_empty());
    }

    #[test]
    fn test_build() {
        let manifest = parse_manifest_str(MANIFEST).unwrap();
        let mut db = test_database();
        // PROC is not in the test schema for ai
        let err = build(&mut db, &manifest).unwrap_err();
        assert!(matches!(err, EpicsDbError::UnknownField { .. }), "{err}");
    }

    #[test]
    fn test_build_records() {
        let manifest = parse_manifest_str(&MANIFEST.replace("field: PROC", "field: VAL")).unwrap();
        let mut db = test_database();
        build(&mut db, &manifest).unwrap();

        assert_eq!(value(&db, "XX-YY-ZZ-01:TRIG", "FLNK").as_deref(), Some("XX-YY-ZZ-01:FAN"));
        assert_eq!(value(&db, "XX-YY-ZZ-01:TRIG", "SCAN").as_deref(), Some("1 second"));
        assert_eq!(
            value(&db, "XX-YY-ZZ-01:B", "INP").as_deref(),
            Some("SR-DI-DCCT-01:SIGNAL CP MS")
        );
        assert_eq!(value(&db, "XX-YY-ZZ-01:B", "PREC").as_deref(), Some("3"));
        assert_eq!(value(&db, "XX-YY-ZZ-01:B", "VAL").as_deref(), Some("$(Q=5)"));
        assert_eq!(value(&db, "XX-YY-ZZ-01:B", "EGU"), None);
        assert_eq!(value(&db, "XX-YY-ZZ-01:FAN", "LNK1").as_deref(), Some("XX-YY-ZZ-01:A"));
        assert_eq!(value(&db, "XX-YY-ZZ-01:FAN", "LNK2").as_deref(), Some("XX-YY-ZZ-01:B.VAL"));

        let text = db.render(false).unwrap();
        assert!(text.contains("#% macro, Q, A number\n#  with two lines\n"), "{text}");
        assert!(text.contains("field(INP,  [1,2,3])"), "{text}");
        assert!(text.contains("info(autosaveFields, \"NELM\")"), "{text}");
        assert!(text.contains("field(INP,  {\"const\":2.5})"), "{text}");
        assert!(text.contains("field(SCAN, \"2 second\")"), "{text}");
        assert!(text.contains("# Reads the beam current\nrecord(ai, \"XX-YY-ZZ-01:B\")"), "{text}");
        assert!(text.contains("    alias(\"XX:CURRENT\")"), "{text}");
        assert!(text.ends_with("alias(\"SR-DI-DCCT-01:SIGNAL\", \"DCCT\")\n"), "{text}");
    }

    #[test]
    fn test_template_naming() {
        let manifest = parse_manifest_str(
            r#"
naming: { kind: template }
records:
  - { type: ai, name: TEST }
"#,
        )
        .unwrap();
        let mut db = test_database();
        build(&mut db, &manifest).unwrap();
        assert!(db.find("$(DEVICE):TEST").is_some());
        assert_eq!(db.records().header_lines(), ["#% macro, DEVICE, Device name"]);
    }

    #[test]
    fn test_undefined_link() {
        let manifest = parse_manifest_str(
            r#"
records:
  - type: ai
    name: X
    fields:
      INP: { link: NOWHERE }
"#,
        )
        .unwrap();
        let mut db = test_database();
        let err = build(&mut db, &manifest).unwrap_err();
        assert!(matches!(err, EpicsDbError::Manifest(_)));
    }

    #[test]
    fn test_undeclared_parameter() {
        let manifest = parse_manifest_str(
            r#"
records:
  - type: ai
    name: X
    fields:
      VAL: { parameter: NOPE }
"#,
        )
        .unwrap();
        let mut db = test_database();
        assert!(matches!(
            build(&mut db, &manifest),
            Err(EpicsDbError::Manifest(_))
        ));
    }

    #[test]
    fn test_duplicate_manifest_names() {
        let manifest = parse_manifest_str(
            r#"
imports: [{ name: X }]
records:
  - { type: ai, name: X }
"#,
        )
        .unwrap();
        let mut db = test_database();
        assert!(matches!(
            build(&mut db, &manifest),
            Err(EpicsDbError::Manifest(_))
        ));
    }

    #[test]
    fn test_mixed_array_rejected() {
        let manifest = parse_manifest_str(
            r#"
records:
  - type: waveform
    name: WF
    fields:
      INP: [1, "two"]
"#,
        )
        .unwrap();
        let mut db = test_database();
        assert!(matches!(
            build(&mut db, &manifest),
            Err(EpicsDbError::Homogeneity(_))
        ));
    }

    #[test]
    fn test_demo_manifest() {
        let schema =
            crate::schema::parse_schema_str(include_str!("../../../demos/schema.yaml")).unwrap();
        let manifest = parse_manifest_str(include_str!("../../../demos/manifest.yaml")).unwrap();
        let mut db = Database::new(std::sync::Arc::new(schema));
        build(&mut db, &manifest).unwrap();

        let text = db.render(true).unwrap();
        assert!(text.contains("field(LNK3, \"XX-YY-ZZ-01:LIMITS\")"), "{text}");
        assert!(text.contains("field(VAL,  \"$(SCALE=1.0)\")"), "{text}");
        assert!(text.contains("field(INP,  [0,100,250])"), "{text}");
    }

    #[test]
    fn test_dfanout() {
        let manifest = parse_manifest_str(
            r#"
records:
  - { type: ao, name: A }
  - { type: ao, name: B }
fanouts:
  - type: dfanout
    name: DF
    fields: { OMSL: closed_loop }
    targets:
      - { link: A, field: VAL, specifiers: [PP] }
      - { link: B, field: VAL, specifiers: [PP] }
"#,
        )
        .unwrap();
        let mut db = test_database();
        build(&mut db, &manifest).unwrap();
        assert_eq!(value(&db, "DF", "OUTA").as_deref(), Some("A.VAL PP"));
        assert_eq!(value(&db, "DF", "OMSL").as_deref(), Some("closed_loop"));
    }
}
