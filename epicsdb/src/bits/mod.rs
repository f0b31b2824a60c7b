use crate::database::Database;
use crate::error::{EpicsDbError, Result};
use crate::link::{Link, LinkTarget};
use crate::record::Record;
use crate::recordset::RecordId;
use crate::value::FieldValue;

/// Number of bit fields (`B0..BF`) on an mbbiDirect or mbboDirect record.
pub const BIT_COUNT: usize = 16;

/// Whether bits are read from or written to the parent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDirection {
    /// `bi` records reading the parent with `CP`
    Input,
    /// `bo` records writing the parent with `PP`
    Output,
}

impl BitDirection {
    /// Record types that expose bit fields.
    pub fn for_record_type(record_type: &str) -> Option<BitDirection> {
        match record_type {
            "mbbiDirect" => Some(BitDirection::Input),
            "mbboDirect" => Some(BitDirection::Output),
            _ => None,
        }
    }

    fn record_type(self) -> &'static str {
        match self {
            BitDirection::Input => "bi",
            BitDirection::Output => "bo",
        }
    }

    fn link_field(self) -> &'static str {
        match self {
            BitDirection::Input => "INP",
            BitDirection::Output => "OUT",
        }
    }

    fn specifier(self) -> &'static str {
        match self {
            BitDirection::Input => "CP",
            BitDirection::Output => "PP",
        }
    }
}

/// A contiguous range of bits on an mbbiDirect/mbboDirect record, from which
/// single-bit `bi`/`bo` records can be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bits {
    parent: String,
    direction: BitDirection,
    offset: usize,
    length: usize,
}

impl Bits {
    fn new(parent: &Record, offset: usize, length: usize) -> Result<Bits> {
        let direction = BitDirection::for_record_type(parent.record_type()).ok_or_else(|| {
            EpicsDbError::Range(format!(
                "{} records have no bit fields",
                parent.record_type()
            ))
        })?;
        check_range(offset, length, BIT_COUNT)?;
        // The schema may define fewer bit fields than the record type allows
        for bit in offset..offset + length {
            let field = bit_field(bit);
            if !parent.valid_field_name(&field) {
                return Err(EpicsDbError::UnknownField {
                    record_type: parent.record_type().to_string(),
                    field,
                });
            }
        }
        Ok(Bits {
            parent: parent.name().to_string(),
            direction,
            offset,
            length,
        })
    }

    pub fn direction(&self) -> BitDirection {
        self.direction
    }

    /// First bit of the range, counted on the parent.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// A single bit of this range.
    pub fn bit(&self, bit: usize) -> Result<Bits> {
        self.register(bit, 1)
    }

    /// A sub-range of this range.
    pub fn register(&self, offset: usize, length: usize) -> Result<Bits> {
        check_range(offset, length, self.length)?;
        Ok(Bits {
            parent: self.parent.clone(),
            direction: self.direction,
            offset: self.offset + offset,
            length,
        })
    }

    /// Link to the parent's field for bit `bit` of this range.
    pub fn bit_link(&self, bit: usize) -> Result<Link> {
        if bit >= self.length {
            return Err(EpicsDbError::Range(format!(
                "bit {bit} out of range for a {} bit field",
                self.length
            )));
        }
        let field = bit_field(self.offset + bit);
        Ok(Link::new(LinkTarget::Record(self.parent.clone()), Some(field))
            .append([self.direction.specifier()]))
    }

    /// Create a `bi` (input) or `bo` (output) record connected to bit `bit`
    /// of this range.
    pub fn create<K, F>(
        &self,
        db: &mut Database,
        name: &str,
        bit: usize,
        fields: F,
    ) -> Result<RecordId>
    where
        K: AsRef<str>,
        F: IntoIterator<Item = (K, FieldValue)>,
    {
        let link = self.bit_link(bit)?;
        let id = db.create_record(self.direction.record_type(), name, fields)?;
        db[id].set_field(self.direction.link_field(), link)?;
        Ok(id)
    }
}

fn bit_field(bit: usize) -> String {
    format!("B{bit:X}")
}

fn check_range(offset: usize, length: usize, available: usize) -> Result<()> {
    if length == 0 || offset + length > available {
        return Err(EpicsDbError::Range(format!(
            "bit field {offset}+{length} out of range 0..{available}"
        )));
    }
    Ok(())
}

impl Record {
    /// A single bit of an mbbiDirect or mbboDirect record.
    pub fn bit(&self, offset: usize) -> Result<Bits> {
        Bits::new(self, offset, 1)
    }

    /// `length` bits of an mbbiDirect or mbboDirect record starting at
    /// `offset`.
    pub fn register(&self, offset: usize, length: usize) -> Result<Bits> {
        Bits::new(self, offset, length)
    }
}
