/*! Speech grouping

Groups a stream of [Segment]s into [SpeechSet]s, one per run of same-protocol segments.

The streaming grouper keeps at most one open [SpeechSet], and relies on the producer
emitting every segment of a given protocol contiguously. If a protocol reappears after another one,
it is grouped again, separately: this is not checked.

The buffered grouper does not rely on contiguity, but keeps every group in memory until the input is exhausted.
!*/
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use log::{debug, error, info, warn};

use crate::corpus::Catalog;
use crate::error::Error;
use crate::segment::{Segment, SegmentLevel};

use super::SpeechSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingMode {
    /// Single pass, one open group at a time. Requires contiguous protocols.
    #[default]
    Streaming,
    /// Collects every group before yielding them, in first-appearance order.
    Buffered,
}

impl FromStr for GroupingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streaming" => Ok(GroupingMode::Streaming),
            "buffered" => Ok(GroupingMode::Buffered),
            other => Err(Error::Config(format!("unknown grouping mode: {}", other))),
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingMode::Streaming => write!(f, "streaming"),
            GroupingMode::Buffered => write!(f, "buffered"),
        }
    }
}

pub fn check_segment_level(segment_level: SegmentLevel) -> Result<(), Error> {
    if segment_level != SegmentLevel::Speech {
        return Err(Error::Config(format!(
            "speech grouping needs speech-level segments, got {}-level segments",
            segment_level
        )));
    }
    Ok(())
}

/// Streaming group-by on protocol name.
///
/// Segments of protocols that are not in the catalog are logged and skipped.
/// An error coming from the segment stream is logged and yielded,
/// the group being built is discarded and the iterator ends.
pub struct SpeechGrouper<'a, I> {
    segments: I,
    catalog: &'a Catalog,
    current: Option<SpeechSet>,
    done: bool,
    skipped: usize,
}

impl<'a, I> SpeechGrouper<'a, I>
where
    I: Iterator<Item = Result<Segment, Error>>,
{
    /// Create a new grouper. Fails if `segment_level` is not [SegmentLevel::Speech].
    pub fn new(segments: I, segment_level: SegmentLevel, catalog: &'a Catalog) -> Result<Self, Error> {
        check_segment_level(segment_level)?;
        Ok(Self {
            segments,
            catalog,
            current: None,
            done: false,
            skipped: 0,
        })
    }

    /// Number of segments skipped so far because their protocol is not in the catalog.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn abort(&mut self, e: Error) -> Option<Result<SpeechSet, Error>> {
        match &self.current {
            Some(current) => error!(
                "grouping aborted while on protocol {} ({} segments): {:?}",
                current.protocol_name(),
                current.len(),
                e
            ),
            None => error!("grouping aborted: {:?}", e),
        }
        self.current = None;
        self.done = true;
        Some(Err(e))
    }

    fn finish(&mut self) -> Option<Result<SpeechSet, Error>> {
        self.done = true;
        if self.skipped > 0 {
            info!("{} segments skipped (unknown protocol)", self.skipped);
        }
        self.current.take().map(Ok)
    }
}

impl<'a, I> Iterator for SpeechGrouper<'a, I>
where
    I: Iterator<Item = Result<Segment, Error>>,
{
    type Item = Result<SpeechSet, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let segment = match self.segments.next() {
                None => return self.finish(),
                Some(Err(e)) => return self.abort(e),
                Some(Ok(segment)) => segment,
            };

            let year = match self.catalog.get(segment.protocol_name()) {
                Some(item) => item.year(),
                None => {
                    warn!(
                        "{}, skipping segment {}",
                        Error::UnknownProtocol(segment.protocol_name().to_string()),
                        segment.u_id()
                    );
                    self.skipped += 1;
                    continue;
                }
            };

            match &mut self.current {
                Some(current) if current.protocol_name() == segment.protocol_name() => {
                    if let Err(e) = current.add(segment) {
                        return self.abort(e);
                    }
                }
                _ => {
                    let mut set = SpeechSet::new(segment.content_type(), segment.protocol_name(), year);
                    if let Err(e) = set.add(segment) {
                        return self.abort(e);
                    }
                    if let Some(finished) = self.current.replace(set) {
                        debug!("{}: {} segments", finished.protocol_name(), finished.len());
                        return Some(Ok(finished));
                    }
                }
            }
        }
    }
}

/// Group-by on protocol name that does not require contiguous protocols.
///
/// The whole input is consumed on the first call to `next`.
pub struct BufferedSpeechGrouper<'a, I> {
    segments: Option<I>,
    catalog: &'a Catalog,
    groups: VecDeque<SpeechSet>,
}

impl<'a, I> BufferedSpeechGrouper<'a, I>
where
    I: Iterator<Item = Result<Segment, Error>>,
{
    /// Create a new grouper. Fails if `segment_level` is not [SegmentLevel::Speech].
    pub fn new(segments: I, segment_level: SegmentLevel, catalog: &'a Catalog) -> Result<Self, Error> {
        check_segment_level(segment_level)?;
        Ok(Self {
            segments: Some(segments),
            catalog,
            groups: VecDeque::new(),
        })
    }

    fn collect_groups(&self, segments: I) -> Result<VecDeque<SpeechSet>, Error> {
        let mut groups: Vec<SpeechSet> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0;

        for segment in segments {
            let segment = segment?;
            let item = match self.catalog.get(segment.protocol_name()) {
                Some(item) => item,
                None => {
                    warn!(
                        "{}, skipping segment {}",
                        Error::UnknownProtocol(segment.protocol_name().to_string()),
                        segment.u_id()
                    );
                    skipped += 1;
                    continue;
                }
            };

            let position = *positions
                .entry(segment.protocol_name().to_string())
                .or_insert_with(|| {
                    groups.push(SpeechSet::new(segment.content_type(), item.name(), item.year()));
                    groups.len() - 1
                });
            groups[position].add(segment)?;
        }

        if skipped > 0 {
            info!("{} segments skipped (unknown protocol)", skipped);
        }
        Ok(groups.into())
    }
}

impl<'a, I> Iterator for BufferedSpeechGrouper<'a, I>
where
    I: Iterator<Item = Result<Segment, Error>>,
{
    type Item = Result<SpeechSet, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(segments) = self.segments.take() {
            match self.collect_groups(segments) {
                Ok(groups) => self.groups = groups,
                Err(e) => {
                    error!("grouping aborted: {:?}", e);
                    return Some(Err(e));
                }
            }
        }
        self.groups.pop_front().map(Ok)
    }
}

/// Build a grouper of the requested mode over `segments`.
pub fn group_speeches<'a, I>(
    segments: I,
    segment_level: SegmentLevel,
    catalog: &'a Catalog,
    mode: GroupingMode,
) -> Result<Box<dyn Iterator<Item = Result<SpeechSet, Error>> + 'a>, Error>
where
    I: Iterator<Item = Result<Segment, Error>> + 'a,
{
    Ok(match mode {
        GroupingMode::Streaming => Box::new(SpeechGrouper::new(segments, segment_level, catalog)?),
        GroupingMode::Buffered => {
            Box::new(BufferedSpeechGrouper::new(segments, segment_level, catalog)?)
        }
    })
}
