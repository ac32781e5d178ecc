/*! Content processing

Contains structures and functions to group segments into speeches, and to merge their content.
!*/
pub mod grouping;
pub mod speech;
pub mod tagged_frame;

pub use grouping::{
    check_segment_level, group_speeches, BufferedSpeechGrouper, GroupingMode, SpeechGrouper,
};
pub use speech::{DispatchItem, DocumentIndexRecord, SegmentSpeaker, SpeechSet, SpeechSetMetadata};
