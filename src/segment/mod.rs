/*! Segments

A segment is a fragment of text (or tagged frame) of a single protocol.
Segments are produced in parallel from a [crate::corpus::Catalog] by a [SegmentStream],
optionally enriched on the fly by an [Enrich] hook.
!*/
mod enrich;
mod merge;
pub mod producer;
mod types;

pub use enrich::{Enrich, Enricher};
pub use merge::MergeStrategy;
pub use producer::{OrderMode, ProducerOpts, SegmentStream};
pub use types::{ContentType, Segment, SegmentLevel};
