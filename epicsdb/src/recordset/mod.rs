use crate::error::{EpicsDbError, Result};
use crate::record::Record;
use std::collections::HashMap;

/// Handle to a record owned by a [`RecordSet`]. Handles issued before a
/// [`RecordSet::reset`] no longer resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    generation: u64,
    index: usize,
}

/// Every record of a generation run, in creation order, together with the
/// free-form lines written before and after them.
#[derive(Debug, Default)]
pub struct RecordSet {
    records: Vec<Record>,
    by_name: HashMap<String, RecordId>,
    header: Vec<String>,
    body: Vec<String>,
    generation: u64,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a record under its name. Names must be unique.
    pub fn publish(&mut self, record: Record) -> Result<RecordId> {
        if self.by_name.contains_key(record.name()) {
            return Err(EpicsDbError::DuplicateRecord(record.name().to_string()));
        }
        let id = self.id(self.records.len());
        log::debug!("Publishing record {} ({})", record.name(), record.record_type());
        self.by_name.insert(record.name().to_string(), id);
        self.records.push(record);
        Ok(id)
    }

    fn id(&self, index: usize) -> RecordId {
        RecordId {
            generation: self.generation,
            index,
        }
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        if id.generation != self.generation {
            return None;
        }
        self.records.get(id.index)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        if id.generation != self.generation {
            return None;
        }
        self.records.get_mut(id.index)
    }

    /// Look a record up by its full name.
    pub fn find(&self, name: &str) -> Option<RecordId> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &Record)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (self.id(i), record))
    }

    pub fn add_header_line(&mut self, line: impl Into<String>) {
        self.header.push(line.into());
    }

    pub fn add_body_line(&mut self, line: impl Into<String>) {
        self.body.push(line.into());
    }

    pub fn header_lines(&self) -> &[String] {
        &self.header
    }

    pub fn body_lines(&self) -> &[String] {
        &self.body
    }

    /// Drop all records and lines. Existing [`RecordId`]s are invalidated.
    pub fn reset(&mut self) {
        if !self.records.is_empty() {
            log::warn!("Discarding {} records", self.records.len());
        }
        self.records.clear();
        self.by_name.clear();
        self.header.clear();
        self.body.clear();
        self.generation += 1;
    }

    /// Records in output order: creation order, or sorted by name.
    pub fn ordered(&self, alphabetical: bool) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.records.iter().collect();
        if alphabetical {
            records.sort_by(|a, b| a.name().cmp(b.name()));
        }
        records
    }

    /// Render the complete database file.
    pub fn render(&self, alphabetical: bool, generated_at: &str) -> Result<String> {
        let mut out = format!("# This file was automatically generated on {generated_at}.\n");
        out.push_str(
            "#\n# *** Please do not edit this file: edit the source file instead. ***\n#\n",
        );
        for line in &self.header {
            out.push_str(line);
            out.push('\n');
        }

        for record in self.ordered(alphabetical) {
            out.push_str(&record.render()?);
        }

        if !self.body.is_empty() {
            out.push('\n');
            for line in &self.body {
                out.push_str(line);
                out.push('\n');
            }
        }
        Ok(out)
    }
}
