/*! Speech extraction pipeline

Reads a folder of tagged protocols, rebuilds speeches and dispatches them to a target.

# Processing
1. The target is validated: it must accept the requested content type and must not exist,
   unless overwriting has been requested.
1. Protocols are segmented by a worker pool, optionally enriching each segment with speaker metadata.
1. Segments are grouped by protocol into speech sets.
1. Each speech set is merged and handed to the dispatcher as soon as it is complete.
1. The dispatcher is closed, and the location of the output is returned.
!*/
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};

use crate::corpus::{Catalog, YearFilter, DEFAULT_PATTERN};
use crate::error::Error;
use crate::io::dispatch::{table_index_path, TargetType};
use crate::io::CompressType;
use crate::metadata::{SpeakerEnricher, SpeakerIndex};
use crate::processing::{check_segment_level, group_speeches, GroupingMode};
use crate::segment::{
    ContentType, Enrich, Enricher, MergeStrategy, OrderMode, ProducerOpts, SegmentLevel,
    SegmentStream,
};

use super::Pipeline;

/// Arguments of an extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOpts {
    pub source_folder: PathBuf,
    /// Folder holding speaker metadata. No enrichment is done if unset.
    pub metadata_source: Option<PathBuf>,
    pub target_name: PathBuf,
    pub content_type: ContentType,
    pub target_type: TargetType,
    pub compress_type: CompressType,
    pub segment_level: SegmentLevel,
    pub segment_skip_size: usize,
    pub year_filter: Option<YearFilter>,
    pub worker_count: usize,
    pub chunk_size: usize,
    pub merge_strategy: MergeStrategy,
    pub force_overwrite: bool,
    pub progress_enabled: bool,
    pub order_mode: OrderMode,
    pub grouping_mode: GroupingMode,
    /// Glob pattern of protocol files, relative to `source_folder`.
    pub pattern: String,
}

impl Default for ExtractOpts {
    fn default() -> Self {
        let producer = ProducerOpts::default();
        Self {
            source_folder: PathBuf::from("."),
            metadata_source: None,
            target_name: PathBuf::from("speeches.zip"),
            content_type: producer.content_type,
            target_type: TargetType::default(),
            compress_type: CompressType::default(),
            segment_level: producer.segment_level,
            segment_skip_size: producer.skip_size,
            year_filter: None,
            worker_count: producer.worker_count,
            chunk_size: producer.chunk_size,
            merge_strategy: producer.merge_strategy,
            force_overwrite: false,
            progress_enabled: false,
            order_mode: producer.order_mode,
            grouping_mode: GroupingMode::default(),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }
}

impl ExtractOpts {
    fn producer_opts(&self) -> ProducerOpts {
        ProducerOpts {
            content_type: self.content_type,
            segment_level: self.segment_level,
            skip_size: self.segment_skip_size,
            order_mode: self.order_mode,
            worker_count: self.worker_count,
            chunk_size: self.chunk_size,
            merge_strategy: self.merge_strategy,
        }
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractStats {
    /// Number of dispatched speech sets.
    pub groups: usize,
    /// Number of segments in the dispatched and skipped speech sets.
    pub segments: usize,
    /// Number of speech sets skipped because they had no content.
    pub skipped: usize,
    /// Location of the written output.
    pub target: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Validating,
    Streaming,
    Dispatching,
    Closed,
    Failed,
}

struct StageTracker(Stage);

impl StageTracker {
    fn new() -> Self {
        debug!("extract: entering {:?}", Stage::Validating);
        Self(Stage::Validating)
    }

    fn enter(&mut self, stage: Stage) {
        if self.0 != stage {
            debug!("extract: {:?} -> {:?}", self.0, stage);
            self.0 = stage;
        }
    }
}

/// Run an extraction.
///
/// Fails with [Error::Config] without touching anything if the target exists and
/// `force_overwrite` is not set.
pub fn extract(opts: &ExtractOpts) -> Result<ExtractStats, Error> {
    let mut stage = StageTracker::new();
    let result = validate(opts).and_then(|_| run(opts, &mut stage));

    match &result {
        Ok(stats) => {
            stage.enter(Stage::Closed);
            info!(
                "{} speeches ({} segments) written to {:?}, {} skipped",
                stats.groups, stats.segments, stats.target, stats.skipped
            );
        }
        Err(e) => {
            stage.enter(Stage::Failed);
            error!("extraction failed: {}", e);
        }
    }
    result
}

fn validate(opts: &ExtractOpts) -> Result<(), Error> {
    check_segment_level(opts.segment_level)?;

    if !opts.target_type.supports(opts.content_type) {
        return Err(Error::Config(format!(
            "target type {} does not support {} content",
            opts.target_type, opts.content_type
        )));
    }
    if opts.chunk_size == 0 {
        return Err(Error::Config("chunk size must be at least 1".to_string()));
    }

    let target = opts.target_name.as_path();
    if target.exists() {
        if !opts.force_overwrite {
            return Err(Error::Config(format!(
                "target {:?} already exists, use force overwrite to replace it",
                target
            )));
        }
        info!("removing existing target {:?}", target);
        remove(target)?;
    }

    if opts.target_type == TargetType::SingleTaggedFrame {
        let index = table_index_path(target);
        if index.exists() && opts.force_overwrite {
            remove(&index)?;
        }
    }

    Ok(())
}

fn remove(path: &Path) -> Result<(), Error> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

fn progress_bar(enabled: bool, len: usize) -> Result<ProgressBar, Error> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} protocols ({eta})")
            .map_err(|e| Error::Custom(format!("invalid progress bar template: {}", e)))?,
    );
    Ok(pb)
}

fn run(opts: &ExtractOpts, stage: &mut StageTracker) -> Result<ExtractStats, Error> {
    let catalog = Catalog::load(&opts.source_folder, &opts.pattern, opts.year_filter.as_ref())?;
    info!("{} protocols found in {:?}", catalog.len(), opts.source_folder);

    let mut enricher = Enricher::default();
    if let Some(folder) = &opts.metadata_source {
        enricher.add(Box::new(SpeakerEnricher::new(SpeakerIndex::from_folder(
            folder,
        )?)));
    }
    let hook = if enricher.is_empty() {
        None
    } else {
        Some(&enricher as &dyn Enrich)
    };

    let segments = SegmentStream::new(&catalog, opts.producer_opts(), hook)?;
    let segment_level = segments.segment_level();
    let speech_sets = group_speeches(segments, segment_level, &catalog, opts.grouping_mode)?;

    let mut handle = opts
        .target_type
        .open(&opts.target_name, opts.compress_type)?;
    let pb = progress_bar(opts.progress_enabled, catalog.len())?;

    let mut groups = 0;
    let mut nb_segments = 0;
    let mut skipped = 0;

    stage.enter(Stage::Streaming);
    for speech_set in speech_sets {
        let speech_set = speech_set?;
        nb_segments += speech_set.len();

        match speech_set.to_item() {
            Some(item) => {
                stage.enter(Stage::Dispatching);
                handle.dispatch(vec![item])?;
                groups += 1;
                stage.enter(Stage::Streaming);
            }
            None => {
                error!("{}", Error::EmptyGroup(speech_set.group_name().to_string()));
                skipped += 1;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let target = handle.close()?;
    Ok(ExtractStats {
        groups,
        segments: nb_segments,
        skipped,
        target,
    })
}

/// [extract] as a [Pipeline].
pub struct Extract {
    opts: ExtractOpts,
}

impl Extract {
    pub fn new(opts: ExtractOpts) -> Self {
        Self { opts }
    }
}

impl Pipeline<ExtractStats> for Extract {
    fn run(&self) -> Result<ExtractStats, Error> {
        extract(&self.opts)
    }
}
