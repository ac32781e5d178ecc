/*! Speech sets

A [SpeechSet] holds every segment of a protocol, in arrival order,
and computes the merged, dispatch-ready [DispatchItem] on demand.
!*/
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::segment::{ContentType, Segment};

use super::tagged_frame;

/// Metadata of a speech set, for downstream indexing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeechSetMetadata {
    pub year: i32,
    pub protocol_name: String,
    pub filename: String,
    pub n_tokens: usize,
}

/// Speaker of a segment, as recorded in a [DispatchItem].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SegmentSpeaker {
    pub u_id: String,
    pub who: String,
    pub name: Option<String>,
    pub party: Option<String>,
}

impl From<&Segment> for SegmentSpeaker {
    fn from(segment: &Segment) -> Self {
        let speaker = segment.speaker();
        Self {
            u_id: segment.u_id().to_string(),
            who: segment.who().to_string(),
            name: speaker.map(|s| s.name.clone()),
            party: speaker.and_then(|s| s.party.clone()),
        }
    }
}

/// Merged speech set, ready to be dispatched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DispatchItem {
    pub document_name: String,
    pub filename: String,
    pub group_name: String,
    pub year: i32,
    pub content_type: ContentType,
    pub n_tokens: usize,
    pub n_chars: usize,
    pub n_segments: usize,
    pub speakers: Vec<SegmentSpeaker>,
    pub text: String,
}

impl DispatchItem {
    pub fn index_record(&self, document_id: usize) -> DocumentIndexRecord {
        DocumentIndexRecord {
            document_id,
            document_name: self.document_name.clone(),
            filename: self.filename.clone(),
            year: self.year,
            n_tokens: self.n_tokens,
            n_chars: self.n_chars,
            n_segments: self.n_segments,
        }
    }
}

/// Row of the document index written alongside dispatched documents.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentIndexRecord {
    pub document_id: usize,
    pub document_name: String,
    pub filename: String,
    pub year: i32,
    pub n_tokens: usize,
    pub n_chars: usize,
    pub n_segments: usize,
}

/// Segments of a single protocol, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechSet {
    content_type: ContentType,
    year: i32,
    protocol_name: String,
    segments: Vec<Segment>,
    n_tokens: usize,
}

impl SpeechSet {
    pub fn new(content_type: ContentType, protocol_name: &str, year: i32) -> Self {
        Self {
            content_type,
            year,
            protocol_name: protocol_name.to_string(),
            segments: Vec::new(),
            n_tokens: 0,
        }
    }

    /// Append a segment.
    ///
    /// Fails if the segment does not share the set's protocol name and content type.
    pub fn add(&mut self, segment: Segment) -> Result<(), Error> {
        if segment.protocol_name() != self.protocol_name {
            return Err(Error::Custom(format!(
                "segment {} of protocol {} added to speech set {}",
                segment.u_id(),
                segment.protocol_name(),
                self.protocol_name
            )));
        }
        if segment.content_type() != self.content_type {
            return Err(Error::Custom(format!(
                "{}: segment {} is {}, speech set is {}",
                self.protocol_name,
                segment.u_id(),
                segment.content_type(),
                self.content_type
            )));
        }

        self.n_tokens += segment.n_tokens();
        self.segments.push(segment);
        Ok(())
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    pub fn document_name(&self) -> &str {
        &self.protocol_name
    }

    pub fn group_name(&self) -> &str {
        &self.protocol_name
    }

    pub fn filename(&self) -> String {
        format!("{}.{}", self.document_name(), self.content_type.extension())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn n_tokens(&self) -> usize {
        self.n_tokens
    }

    /// Sum of the payload lengths (in chars) of the segments.
    pub fn n_chars(&self) -> usize {
        self.segments.iter().map(Segment::n_chars).sum()
    }

    /// Merge segment payloads.
    ///
    /// Text payloads are newline-joined. Tagged frames are merged keeping a single header.
    pub fn merged_text(&self) -> String {
        let payloads = self.segments.iter().map(Segment::data);
        match self.content_type {
            ContentType::Text => payloads.collect::<Vec<_>>().join("\n"),
            ContentType::TaggedFrame => tagged_frame::merge(payloads),
        }
    }

    pub fn metadata(&self) -> SpeechSetMetadata {
        SpeechSetMetadata {
            year: self.year,
            protocol_name: self.protocol_name.clone(),
            filename: self.filename(),
            n_tokens: self.n_tokens,
        }
    }

    /// Build the dispatch-ready item. Returns [None] if there's nothing to dispatch:
    /// no segments, blank text, or tagged frames without any row.
    pub fn to_item(&self) -> Option<DispatchItem> {
        if self.is_empty() {
            return None;
        }
        if self.content_type == ContentType::TaggedFrame && self.n_tokens == 0 {
            return None;
        }
        let text = self.merged_text();
        if text.trim().is_empty() {
            return None;
        }

        Some(DispatchItem {
            document_name: self.document_name().to_string(),
            filename: self.filename(),
            group_name: self.group_name().to_string(),
            year: self.year,
            content_type: self.content_type,
            n_tokens: self.n_tokens,
            n_chars: self.n_chars(),
            n_segments: self.len(),
            speakers: self.segments.iter().map(SegmentSpeaker::from).collect(),
            text,
        })
    }
}
