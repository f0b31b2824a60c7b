use crate::database::Database;
use crate::error::Result;
use crate::link::{pp, Link};
use crate::recordset::RecordId;
use crate::value::FieldValue;

/// The two record types a fanout chain can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanoutKind {
    /// Forward links `LNK1..LNK6`
    Fanout,
    /// Output links `OUTA..OUTH`, processed with `PP`
    Dfanout,
}

impl FanoutKind {
    pub fn record_type(self) -> &'static str {
        match self {
            FanoutKind::Fanout => "fanout",
            FanoutKind::Dfanout => "dfanout",
        }
    }

    /// Number of outbound link fields on one record.
    pub fn capacity(self) -> usize {
        match self {
            FanoutKind::Fanout => 6,
            FanoutKind::Dfanout => 8,
        }
    }

    /// Name of the `index`th (zero based) outbound link field.
    pub fn link_field(self, index: usize) -> String {
        match self {
            FanoutKind::Fanout => format!("LNK{}", index + 1),
            FanoutKind::Dfanout => format!("OUT{}", char::from(b'A' + index as u8)),
        }
    }

    fn chain_link(self, next: Link) -> Link {
        match self {
            FanoutKind::Fanout => next,
            FanoutKind::Dfanout => pp(next),
        }
    }

    /// Fields for the head of the chain.
    fn first_fields(self, mut fields: Vec<(String, FieldValue)>) -> Vec<(String, FieldValue)> {
        // Masked or selected fanouts would need supporting calc records
        if self == FanoutKind::Fanout {
            put(&mut fields, "SELM", "All");
        }
        fields
    }

    /// Records after the first only mirror it, so they must be passive.
    fn next_fields(self, first: &[(String, FieldValue)]) -> Vec<(String, FieldValue)> {
        let mut fields = first.to_vec();
        put(&mut fields, "SCAN", "Passive");
        fields.retain(|(name, _)| name != "PINI");
        if self == FanoutKind::Dfanout {
            put(&mut fields, "OMSL", "supervisory");
            fields.retain(|(name, _)| name != "DOL");
        }
        fields
    }
}

fn put(fields: &mut Vec<(String, FieldValue)>, name: &str, value: &str) {
    match fields.iter_mut().find(|(field, _)| field == name) {
        Some((_, existing)) => *existing = FieldValue::from(value),
        None => fields.push((name.to_string(), FieldValue::from(value))),
    }
}

/// Split `items` into chunks for records with `capacity` link fields.
///
/// Every chunk holds at most `capacity - 1` items, leaving one link free to
/// chain to the next record. The last record needs no chain link, so a
/// trailing single item joins the chunk before it. An empty input gives
/// one empty chunk.
pub fn partition<T>(items: Vec<T>, capacity: usize) -> Vec<Vec<T>> {
    let size = capacity.saturating_sub(1).max(1);
    let mut chunks: Vec<Vec<T>> = Vec::new();
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        chunks.push(items.by_ref().take(size).collect());
    }

    if chunks.len() > 1 && chunks.last().map_or(false, |last| last.len() == 1) {
        if let Some(last) = chunks.pop() {
            if let Some(previous) = chunks.last_mut() {
                previous.extend(last);
            }
        }
    }
    if chunks.is_empty() {
        chunks.push(Vec::new());
    }
    chunks
}

/// Build a chain of `kind` records linking to every target, returning the
/// first record of the chain.
///
/// The first record is called `name` and gets `fields`; record `i` of the
/// chain is called `name` followed by `i`.
pub fn create_chain<T, L, K, F>(
    db: &mut Database,
    kind: FanoutKind,
    name: &str,
    targets: T,
    fields: F,
) -> Result<RecordId>
where
    T: IntoIterator<Item = L>,
    L: Into<Link>,
    K: AsRef<str>,
    F: IntoIterator<Item = (K, FieldValue)>,
{
    let targets: Vec<Link> = targets.into_iter().map(Into::into).collect();
    let fields: Vec<(String, FieldValue)> = fields
        .into_iter()
        .map(|(field, value)| (field.as_ref().to_string(), value))
        .collect();
    let first_fields = kind.first_fields(fields);
    let next_fields = kind.next_fields(&first_fields);

    let chunks = partition(targets, kind.capacity());
    log::debug!(
        "Building {} chain {name}: {} records",
        kind.record_type(),
        chunks.len()
    );

    let mut chain = Vec::with_capacity(chunks.len());
    for (i, links) in chunks.into_iter().enumerate() {
        let (record_name, fields) = if i == 0 {
            (name.to_string(), first_fields.clone())
        } else {
            (format!("{name}{i}"), next_fields.clone())
        };
        let id = db.create_record(kind.record_type(), &record_name, fields)?;
        for (index, link) in links.into_iter().enumerate() {
            db[id].set_field(&kind.link_field(index), link)?;
        }
        chain.push(id);
    }

    // The last link field was kept free in every chunk but the final one
    let chain_field = kind.link_field(kind.capacity() - 1);
    for pair in chain.windows(2) {
        let next = kind.chain_link(Link::from(&db[pair[1]]));
        db[pair[0]].set_field(&chain_field, next)?;
    }
    Ok(chain[0])
}

/// Fan forward processing out to `targets` through a chain of `fanout`
/// records. `SELM` is always `All`.
pub fn create_fanout<T, L, K, F>(
    db: &mut Database,
    name: &str,
    targets: T,
    fields: F,
) -> Result<RecordId>
where
    T: IntoIterator<Item = L>,
    L: Into<Link>,
    K: AsRef<str>,
    F: IntoIterator<Item = (K, FieldValue)>,
{
    create_chain(db, FanoutKind::Fanout, name, targets, fields)
}

/// Copy a value out to `targets` through a chain of `dfanout` records.
pub fn create_dfanout<T, L, K, F>(
    db: &mut Database,
    name: &str,
    targets: T,
    fields: F,
) -> Result<RecordId>
where
    T: IntoIterator<Item = L>,
    L: Into<Link>,
    K: AsRef<str>,
    F: IntoIterator<Item = (K, FieldValue)>,
{
    create_chain(db, FanoutKind::Dfanout, name, targets, fields)
}
