//! Command line arguments and parameters management/parsing.
use std::path::PathBuf;

use riksprot::corpus::YearFilter;
use riksprot::io::{CompressType, TargetType};
use riksprot::pipelines::ExtractOpts;
use riksprot::processing::GroupingMode;
use riksprot::segment::{ContentType, MergeStrategy, OrderMode, SegmentLevel};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "riksprot", about = "parliamentary protocol speech extraction.")]
/// Holds every command that is callable by the `riksprot` command.
pub enum Riksprot {
    #[structopt(about = "Extract speeches from tagged protocols")]
    Extract(Extract),
    #[structopt(about = "List the protocols of a source folder")]
    List(List),
}

#[derive(Debug, StructOpt)]
/// Extract command and parameters.
///
/// ```sh
/// riksprot-extract 0.1.0
/// Extract speeches from tagged protocols
///
/// USAGE:
///     riksprot extract [FLAGS] [OPTIONS] <source-folder> <target-name>
/// ```
pub struct Extract {
    #[structopt(parse(from_os_str), help = "folder of tagged protocols")]
    pub source_folder: PathBuf,
    #[structopt(parse(from_os_str), help = "output location")]
    pub target_name: PathBuf,
    #[structopt(
        parse(from_os_str),
        long = "metadata",
        help = "folder holding persons.csv and party_affiliation.csv"
    )]
    pub metadata_source: Option<PathBuf>,
    #[structopt(long = "content-type", default_value = "text", help = "text or tagged-frame")]
    pub content_type: ContentType,
    #[structopt(
        long = "target-type",
        default_value = "files-in-zip",
        help = "files-in-folder, files-in-zip, single-tagged-frame or jsonl"
    )]
    pub target_type: TargetType,
    #[structopt(long = "compress-type", default_value = "plain", help = "plain, gzip or zstd")]
    pub compress_type: CompressType,
    #[structopt(
        long = "skip-size",
        default_value = "1",
        help = "drop segments shorter than this (in chars)"
    )]
    pub segment_skip_size: usize,
    #[structopt(long = "years", help = "year (1921) or year range (1920-1925)")]
    pub year_filter: Option<YearFilter>,
    #[structopt(long = "workers", short = "w", default_value = "4", help = "number of workers")]
    pub worker_count: usize,
    #[structopt(
        long = "chunk-size",
        default_value = "10",
        help = "number of protocols processed at once"
    )]
    pub chunk_size: usize,
    #[structopt(
        long = "merge-strategy",
        default_value = "who-sequence",
        help = "who-sequence, speaker-note-id-sequence, chain or undefined"
    )]
    pub merge_strategy: MergeStrategy,
    #[structopt(long = "unordered", help = "do not keep protocol order between workers")]
    pub unordered: bool,
    #[structopt(long = "buffered", help = "buffer segments and group them by protocol")]
    pub buffered: bool,
    #[structopt(long = "pattern", default_value = "**/prot-*.json*", help = "glob pattern of protocol files")]
    pub pattern: String,
    #[structopt(long = "force", short = "f", help = "overwrite an existing target")]
    pub force_overwrite: bool,
    #[structopt(long = "progress", help = "show a progress bar")]
    pub progress_enabled: bool,
}

impl From<Extract> for ExtractOpts {
    fn from(e: Extract) -> Self {
        Self {
            source_folder: e.source_folder,
            metadata_source: e.metadata_source,
            target_name: e.target_name,
            content_type: e.content_type,
            target_type: e.target_type,
            compress_type: e.compress_type,
            segment_level: SegmentLevel::Speech,
            segment_skip_size: e.segment_skip_size,
            year_filter: e.year_filter,
            worker_count: e.worker_count,
            chunk_size: e.chunk_size,
            merge_strategy: e.merge_strategy,
            force_overwrite: e.force_overwrite,
            progress_enabled: e.progress_enabled,
            order_mode: if e.unordered {
                OrderMode::Unordered
            } else {
                OrderMode::Ordered
            },
            grouping_mode: if e.buffered {
                GroupingMode::Buffered
            } else {
                GroupingMode::Streaming
            },
            pattern: e.pattern,
        }
    }
}

#[derive(Debug, StructOpt)]
/// List command and parameters.
pub struct List {
    #[structopt(parse(from_os_str), help = "folder of tagged protocols")]
    pub source_folder: PathBuf,
    #[structopt(long = "years", help = "year (1921) or year range (1920-1925)")]
    pub year_filter: Option<YearFilter>,
    #[structopt(long = "pattern", default_value = "**/prot-*.json*", help = "glob pattern of protocol files")]
    pub pattern: String,
}
