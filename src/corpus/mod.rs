/*!
# Corpus

Source catalog of tagged protocol documents, and reading of said documents.
!*/
pub mod catalog;
pub mod protocol;
mod source;

pub use catalog::{Catalog, YearFilter, DEFAULT_PATTERN};
pub use protocol::{Protocol, Utterance};
pub use source::{protocol_name, protocol_year, SourceItem};
