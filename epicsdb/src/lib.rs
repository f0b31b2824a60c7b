pub mod bits;
pub mod const_array;
pub mod database;
pub mod error;
pub mod fanout;
pub mod link;
pub mod manifest;
pub mod naming;
pub mod parameter;
pub mod quote;
pub mod record;
pub mod recordset;
pub mod schema;
pub mod validation;
pub mod value;

#[cfg(test)]
mod test_support;

pub use bits::{BitDirection, Bits};
pub use const_array::{ArrayElement, ConstArray};
pub use database::Database;
pub use error::{EpicsDbError, Result};
pub use fanout::{create_dfanout, create_fanout, FanoutKind};
pub use link::{ca, cp, cpp, ms, msi, mss, nms, np, pp, Link, LinkTarget};
pub use manifest::Manifest;
pub use naming::RecordNames;
pub use parameter::Parameter;
pub use quote::quote_string;
pub use record::{ImportRecord, Record, ADDRESS_FIELD};
pub use recordset::{RecordId, RecordSet};
pub use schema::{SchemaDefinition, SchemaProvider};
pub use value::{DbValue, FieldValue};
