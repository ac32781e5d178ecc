/*! Segment stream producer

Reads the protocols listed in a [Catalog] on a rayon thread pool, and splits them into [Segment]s.

Protocols are processed by chunks of `chunk_size` source items, the next chunk being processed
only when the segments of the previous one have all been consumed.

# Ordering

- [OrderMode::Ordered]: segments are emitted in catalog order, protocol by protocol.
  All segments of a given protocol are contiguous, which is what [crate::processing::SpeechGrouper] expects.
- [OrderMode::Unordered]: segments are emitted as soon as they're ready.
  Segments of different protocols of a same chunk may be interleaved.
!*/
use std::collections::VecDeque;

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::corpus::{Catalog, Protocol, SourceItem, Utterance};
use crate::error::Error;
use crate::processing::tagged_frame;

use super::{ContentType, Enrich, MergeStrategy, Segment, SegmentLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderMode {
    #[default]
    Ordered,
    Unordered,
}

/// Producer parameters.
#[derive(Debug, Clone)]
pub struct ProducerOpts {
    pub content_type: ContentType,
    pub segment_level: SegmentLevel,
    /// Segments whose payload is shorter (in chars) are dropped.
    pub skip_size: usize,
    pub order_mode: OrderMode,
    /// Number of worker threads. 0 lets rayon decide.
    pub worker_count: usize,
    /// Number of source items processed at once.
    pub chunk_size: usize,
    pub merge_strategy: MergeStrategy,
}

impl Default for ProducerOpts {
    fn default() -> Self {
        Self {
            content_type: ContentType::Text,
            segment_level: SegmentLevel::Speech,
            skip_size: 1,
            order_mode: OrderMode::Ordered,
            worker_count: 4,
            chunk_size: 10,
            merge_strategy: MergeStrategy::WhoSequence,
        }
    }
}

/// Build a segment from consecutive utterances of the same protocol.
fn to_segment(
    item: &SourceItem,
    content_type: ContentType,
    ordinal: usize,
    utterances: &[&Utterance],
) -> Option<Segment> {
    let first = utterances.first()?;
    let data = match content_type {
        ContentType::Text => utterances
            .iter()
            .map(|u| u.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        ContentType::TaggedFrame => tagged_frame::merge(utterances.iter().map(|u| u.tagged_frame())),
    };

    let segment = Segment::new(item.name().to_string(), item.year(), content_type, data)
        .with_turn(&first.u_id, &first.who, first.speaker_note_id.as_deref())
        .with_ordinal(ordinal);
    Some(segment)
}

/// Split a protocol into segments of the requested level.
pub fn segment_protocol(
    item: &SourceItem,
    protocol: &Protocol,
    opts: &ProducerOpts,
) -> Vec<Segment> {
    let utterances = &protocol.utterances;
    let groups: Vec<Vec<&Utterance>> = match opts.segment_level {
        SegmentLevel::Protocol => vec![utterances.iter().collect()],
        SegmentLevel::Speech => opts.merge_strategy.group(utterances),
        SegmentLevel::Who => MergeStrategy::WhoSequence.group(utterances),
        SegmentLevel::Utterance => MergeStrategy::Undefined.group(utterances),
    };

    groups
        .iter()
        .enumerate()
        .filter_map(|(ordinal, group)| to_segment(item, opts.content_type, ordinal, group))
        .filter(|segment| {
            let keep = segment.n_chars() >= opts.skip_size;
            if !keep {
                debug!(
                    "{}: skipping segment {} ({} chars)",
                    segment.protocol_name(),
                    segment.u_id(),
                    segment.n_chars()
                );
            }
            keep
        })
        .collect()
}

/// Read and segment a single source item, running the enrichment hook on each segment.
fn process_item(
    item: &SourceItem,
    opts: &ProducerOpts,
    hook: Option<&dyn Enrich>,
) -> Result<Vec<Segment>, Error> {
    debug!("working on protocol {:?}", item.path());
    let protocol = Protocol::from_path(item.path())?;
    if protocol.name != item.name() {
        warn!(
            "protocol name mismatch: {} in file {:?}, using {}",
            protocol.name,
            item.path(),
            item.name()
        );
    }

    let mut segments = segment_protocol(item, &protocol, opts);
    if let Some(hook) = hook {
        segments.iter_mut().for_each(|segment| hook.enrich(segment));
    }
    Ok(segments)
}

/// Iterator over the segments of a [Catalog].
///
/// Errors when reading a protocol are yielded in place of its segments.
pub struct SegmentStream<'a> {
    catalog: &'a Catalog,
    opts: ProducerOpts,
    hook: Option<&'a dyn Enrich>,
    pool: ThreadPool,
    position: usize,
    buffer: VecDeque<Result<Segment, Error>>,
}

impl<'a> SegmentStream<'a> {
    pub fn new(
        catalog: &'a Catalog,
        opts: ProducerOpts,
        hook: Option<&'a dyn Enrich>,
    ) -> Result<Self, Error> {
        if opts.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1".to_string()));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.worker_count)
            .build()
            .map_err(|e| Error::Custom(format!("couldn't build worker pool: {}", e)))?;

        info!(
            "producing {} segments from {} protocols ({} workers, chunks of {}, {:?})",
            opts.segment_level,
            catalog.len(),
            pool.current_num_threads(),
            opts.chunk_size,
            opts.order_mode
        );

        Ok(Self {
            catalog,
            opts,
            hook,
            pool,
            position: 0,
            buffer: VecDeque::new(),
        })
    }

    /// Level of the produced segments, as checked by [crate::processing::group_speeches].
    pub fn segment_level(&self) -> SegmentLevel {
        self.opts.segment_level
    }

    /// Process the next chunk of source items, filling the buffer.
    fn fill(&mut self) {
        let end = (self.position + self.opts.chunk_size).min(self.catalog.len());
        let chunk = &self.catalog.items()[self.position..end];
        self.position = end;

        let opts = &self.opts;
        let hook = self.hook;

        match opts.order_mode {
            OrderMode::Ordered => {
                let results: Vec<Result<Vec<Segment>, Error>> = self.pool.install(|| {
                    chunk
                        .par_iter()
                        .map(|item| process_item(item, opts, hook))
                        .collect()
                });

                for result in results {
                    match result {
                        Ok(segments) => self.buffer.extend(segments.into_iter().map(Ok)),
                        Err(e) => self.buffer.push_back(Err(e)),
                    }
                }
            }
            OrderMode::Unordered => {
                let results: Vec<Result<Segment, Error>> = self.pool.install(|| {
                    chunk
                        .iter()
                        .par_bridge()
                        .flat_map_iter(|item| match process_item(item, opts, hook) {
                            Ok(segments) => segments.into_iter().map(Ok).collect::<Vec<_>>(),
                            Err(e) => vec![Err(e)],
                        })
                        .collect()
                });
                self.buffer.extend(results);
            }
        }
    }
}

impl<'a> Iterator for SegmentStream<'a> {
    type Item = Result<Segment, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.buffer.is_empty() && self.position < self.catalog.len() {
            self.fill();
        }
        self.buffer.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use itertools::Itertools;

    use super::*;

    fn write_protocol(dir: &Path, name: &str, speakers: &[&str]) -> PathBuf {
        let utterances: Vec<Utterance> = speakers
            .iter()
            .enumerate()
            .map(|(idx, who)| Utterance {
                u_id: format!("{}-u{}", name, idx),
                who: who.to_string(),
                paragraphs: vec![format!("{} says {}", who, idx)],
                annotation: Some(format!("{}\n{}\t{}\tPM\tPM", tagged_frame::HEADER, who, who)),
                ..Default::default()
            })
            .collect();
        let protocol = Protocol {
            name: name.to_string(),
            date: None,
            utterances,
        };
        let path = dir.join(format!("{}.json", name));
        std::fs::write(&path, serde_json::to_string(&protocol).unwrap()).unwrap();
        path
    }

    fn catalog(dir: &Path, n: usize) -> Catalog {
        let items = (0..n)
            .map(|i| {
                let name = format!("prot-19{:02}--ak--{}", 20 + i, i);
                let path = write_protocol(dir, &name, &["p-1", "p-1", "p-2", "p-3"]);
                SourceItem::from_path(&path).unwrap()
            })
            .collect();
        Catalog::from_items(items)
    }

    #[test]
    fn ordered_stream_is_contiguous() {
        let dst = tempfile::tempdir().unwrap();
        let catalog = catalog(dst.path(), 7);
        let opts = ProducerOpts {
            chunk_size: 3,
            ..Default::default()
        };

        let segments: Vec<Segment> = SegmentStream::new(&catalog, opts, None)
            .unwrap()
            .map(|s| s.unwrap())
            .collect();

        // 3 speeches per protocol (p-1 twice in a row)
        assert_eq!(segments.len(), 21);

        let runs: Vec<&str> = segments
            .iter()
            .map(|s| s.protocol_name())
            .dedup()
            .collect();
        let expected: Vec<&str> = catalog.iter().map(|i| i.name()).collect();
        assert_eq!(runs, expected);

        assert_eq!(segments[0].data(), "p-1 says 0\np-1 says 1");
        assert_eq!(segments[0].ordinal(), 0);
        assert_eq!(segments[2].ordinal(), 2);
    }

    #[test]
    fn unordered_stream_holds_every_segment() {
        let dst = tempfile::tempdir().unwrap();
        let catalog = catalog(dst.path(), 5);
        let opts = ProducerOpts {
            order_mode: OrderMode::Unordered,
            chunk_size: 2,
            ..Default::default()
        };

        let segments: Vec<Segment> = SegmentStream::new(&catalog, opts, None)
            .unwrap()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(segments.len(), 15);
    }

    #[test]
    fn segment_levels() {
        let dst = tempfile::tempdir().unwrap();
        let catalog = catalog(dst.path(), 1);
        let item = &catalog.items()[0];
        let protocol = Protocol::from_path(item.path()).unwrap();

        let count = |segment_level| {
            let opts = ProducerOpts {
                segment_level,
                ..Default::default()
            };
            segment_protocol(item, &protocol, &opts).len()
        };

        assert_eq!(count(SegmentLevel::Protocol), 1);
        assert_eq!(count(SegmentLevel::Speech), 3);
        assert_eq!(count(SegmentLevel::Who), 3);
        assert_eq!(count(SegmentLevel::Utterance), 4);
    }

    #[test]
    fn tagged_frames_and_skip_size() {
        let dst = tempfile::tempdir().unwrap();
        let catalog = catalog(dst.path(), 1);
        let item = &catalog.items()[0];
        let protocol = Protocol::from_path(item.path()).unwrap();

        let opts = ProducerOpts {
            content_type: ContentType::TaggedFrame,
            ..Default::default()
        };
        let segments = segment_protocol(item, &protocol, &opts);
        assert_eq!(
            segments[0].data(),
            format!("{}\np-1\tp-1\tPM\tPM\np-1\tp-1\tPM\tPM", tagged_frame::HEADER)
        );
        assert_eq!(segments[0].n_tokens(), 2);

        let opts = ProducerOpts {
            skip_size: 1000,
            ..Default::default()
        };
        assert!(segment_protocol(item, &protocol, &opts).is_empty());
    }

    #[test]
    fn unreadable_protocol_yields_error() {
        let dst = tempfile::tempdir().unwrap();
        let path = dst.path().join("prot-1921--ak--1.json");
        std::fs::write(&path, "not json").unwrap();
        let catalog = Catalog::from_items(vec![SourceItem::from_path(&path).unwrap()]);

        let results: Vec<_> = SegmentStream::new(&catalog, ProducerOpts::default(), None)
            .unwrap()
            .collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[test]
    fn zero_chunk_size() {
        let catalog = Catalog::default();
        let opts = ProducerOpts {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            SegmentStream::new(&catalog, opts, None),
            Err(Error::Config(_))
        ));
    }
}
