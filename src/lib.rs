/*!
# riksprot

Extraction of speeches from tagged parliamentary protocols.

Protocols are enumerated by a [corpus::Catalog], segmented in parallel by a [segment::SegmentStream],
grouped back into per-protocol [processing::SpeechSet]s and dispatched to a target by an [io::Dispatch]er.
The whole chain is wired by [pipelines::extract].
!*/
pub mod corpus;
pub mod error;
pub mod io;
pub mod metadata;
pub mod pipelines;
pub mod processing;
pub mod segment;
