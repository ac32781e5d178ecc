//! Segment and its selectors.
use std::fmt;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::metadata::SpeakerInfo;
use crate::processing::tagged_frame;

/// Kind of payload carried by a segment.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ContentType {
    #[default]
    Text,
    TaggedFrame,
}

impl ContentType {
    /// File extension (without dot) of a dispatched document.
    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Text => "txt",
            ContentType::TaggedFrame => "csv",
        }
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "plain" => Ok(ContentType::Text),
            "tagged-frame" => Ok(ContentType::TaggedFrame),
            other => Err(Error::Config(format!("unknown content type: {}", other))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Text => write!(f, "text"),
            ContentType::TaggedFrame => write!(f, "tagged-frame"),
        }
    }
}

/// Granularity of the produced segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SegmentLevel {
    /// A whole protocol is a single segment.
    Protocol,
    /// Utterances are merged into speeches using a [super::MergeStrategy].
    #[default]
    Speech,
    /// Consecutive utterances of the same person.
    Who,
    Utterance,
}

impl FromStr for SegmentLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "protocol" => Ok(SegmentLevel::Protocol),
            "speech" => Ok(SegmentLevel::Speech),
            "who" => Ok(SegmentLevel::Who),
            "utterance" => Ok(SegmentLevel::Utterance),
            other => Err(Error::Config(format!("unknown segment level: {}", other))),
        }
    }
}

impl fmt::Display for SegmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SegmentLevel::Protocol => "protocol",
            SegmentLevel::Speech => "speech",
            SegmentLevel::Who => "who",
            SegmentLevel::Utterance => "utterance",
        };
        write!(f, "{}", s)
    }
}

/// A fragment of text or tagged frame belonging to exactly one protocol.
///
/// Apart from the speaker information, which is set at most once by an enrichment hook,
/// a segment is not modified after its creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    protocol_name: String,
    year: i32,
    ordinal: usize,
    u_id: String,
    who: String,
    speaker_note_id: Option<String>,
    content_type: ContentType,
    data: String,
    n_tokens: usize,
    speaker: Option<SpeakerInfo>,
}

impl Segment {
    /// Create a new segment. The token count is computed from `data`:
    /// whitespace separated words for text, rows for tagged frames.
    pub fn new(protocol_name: String, year: i32, content_type: ContentType, data: String) -> Self {
        let n_tokens = match content_type {
            ContentType::Text => data.split_whitespace().count(),
            ContentType::TaggedFrame => tagged_frame::count_rows(&data),
        };

        Self {
            protocol_name,
            year,
            ordinal: 0,
            u_id: String::new(),
            who: "unknown".to_string(),
            speaker_note_id: None,
            content_type,
            data,
            n_tokens,
            speaker: None,
        }
    }

    /// Set speaker turn identifiers.
    pub fn with_turn(mut self, u_id: &str, who: &str, speaker_note_id: Option<&str>) -> Self {
        self.u_id = u_id.to_string();
        self.who = who.to_string();
        self.speaker_note_id = speaker_note_id.map(String::from);
        self
    }

    /// Set position of the segment in its protocol.
    pub fn with_ordinal(mut self, ordinal: usize) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn protocol_name(&self) -> &str {
        &self.protocol_name
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn u_id(&self) -> &str {
        &self.u_id
    }

    pub fn who(&self) -> &str {
        &self.who
    }

    pub fn speaker_note_id(&self) -> Option<&str> {
        self.speaker_note_id.as_deref()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn n_tokens(&self) -> usize {
        self.n_tokens
    }

    /// Length of the payload, in chars.
    pub fn n_chars(&self) -> usize {
        self.data.chars().count()
    }

    pub fn speaker(&self) -> Option<&SpeakerInfo> {
        self.speaker.as_ref()
    }

    /// Attach speaker information.
    ///
    /// Speaker information can only be set once: returns `false` (and keeps the existing one) otherwise.
    pub fn set_speaker(&mut self, speaker: SpeakerInfo) -> bool {
        if self.speaker.is_some() {
            warn!(
                "{}/{}: speaker already set, ignoring {}",
                self.protocol_name, self.u_id, speaker.person_id
            );
            return false;
        }
        self.speaker = Some(speaker);
        true
    }
}
