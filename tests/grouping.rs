use std::collections::HashMap;
use std::path::Path;

use riksprot::corpus::{Catalog, Protocol, Utterance, DEFAULT_PATTERN};
use riksprot::error::Error;
use riksprot::metadata::SpeakerInfo;
use riksprot::processing::{group_speeches, GroupingMode, SpeechSet};
use riksprot::segment::{
    ContentType, Enrich, OrderMode, ProducerOpts, Segment, SegmentLevel, SegmentStream,
};

const NB_PROTOCOLS: usize = 12;

fn write_corpus(folder: &Path) {
    for i in 0..NB_PROTOCOLS {
        let name = format!("prot-19{:02}--ak--{}", 20 + i, i);
        let utterances = (0..=i % 4)
            .map(|j| Utterance {
                u_id: format!("{}-i{}", name, j),
                who: format!("p-{}", j),
                paragraphs: vec![format!("anförande {} i {}", j, name)],
                ..Default::default()
            })
            .collect();
        let protocol = Protocol {
            name: name.clone(),
            date: None,
            utterances,
        };
        let path = folder.join(format!("{}.json", name));
        std::fs::write(path, serde_json::to_string(&protocol).unwrap()).unwrap();
    }
}

fn collect(
    catalog: &Catalog,
    opts: ProducerOpts,
    mode: GroupingMode,
) -> Result<Vec<SpeechSet>, Error> {
    let stream = SegmentStream::new(catalog, opts, None)?;
    group_speeches(stream, SegmentLevel::Speech, catalog, mode)?.collect()
}

#[test]
fn ordered_streaming() {
    let src = tempfile::tempdir().unwrap();
    write_corpus(src.path());
    let catalog = Catalog::load(src.path(), DEFAULT_PATTERN, None).unwrap();

    let opts = ProducerOpts {
        worker_count: 4,
        chunk_size: 5,
        ..Default::default()
    };
    let sets = collect(&catalog, opts, GroupingMode::Streaming).unwrap();

    // one set per protocol, in catalog order
    let names: Vec<&str> = sets.iter().map(SpeechSet::protocol_name).collect();
    let expected: Vec<&str> = catalog.iter().map(|item| item.name()).collect();
    assert_eq!(names, expected);

    for (i, set) in sets.iter().enumerate() {
        assert_eq!(set.len(), i % 4 + 1);
        assert_eq!(set.year(), 1920 + i as i32);
        let ordinals: Vec<usize> = set.segments().iter().map(Segment::ordinal).collect();
        assert_eq!(ordinals, (0..set.len()).collect::<Vec<_>>());
    }
}

#[test]
fn unordered_buffered() {
    let src = tempfile::tempdir().unwrap();
    write_corpus(src.path());
    let catalog = Catalog::load(src.path(), DEFAULT_PATTERN, None).unwrap();

    let opts = ProducerOpts {
        order_mode: OrderMode::Unordered,
        worker_count: 4,
        chunk_size: 6,
        ..Default::default()
    };
    let sets = collect(&catalog, opts, GroupingMode::Buffered).unwrap();

    // buffering merges every fragment of a protocol back into a single set
    assert_eq!(sets.len(), NB_PROTOCOLS);
    let sizes: HashMap<&str, usize> = sets
        .iter()
        .map(|set| (set.protocol_name(), set.len()))
        .collect();
    for (i, item) in catalog.iter().enumerate() {
        assert_eq!(sizes[item.name()], i % 4 + 1);
    }
}

#[test]
fn unordered_streaming_keeps_every_segment() {
    let src = tempfile::tempdir().unwrap();
    write_corpus(src.path());
    let catalog = Catalog::load(src.path(), DEFAULT_PATTERN, None).unwrap();

    let opts = ProducerOpts {
        order_mode: OrderMode::Unordered,
        ..Default::default()
    };
    let sets = collect(&catalog, opts, GroupingMode::Streaming).unwrap();

    // protocols may be fragmented, segments are never lost
    assert!(sets.len() >= NB_PROTOCOLS);
    let total: usize = sets.iter().map(SpeechSet::len).sum();
    let expected: usize = (0..NB_PROTOCOLS).map(|i| i % 4 + 1).sum();
    assert_eq!(total, expected);
    assert!(sets
        .iter()
        .all(|set| set.segments().iter().all(|s| s.protocol_name() == set.protocol_name())));
}

struct Speaker;

impl Enrich for Speaker {
    fn enrich(&self, segment: &mut Segment) {
        segment.set_speaker(SpeakerInfo {
            speech_id: segment.u_id().to_string(),
            person_id: segment.who().to_string(),
            name: format!("Ledamot {}", segment.who()),
            gender: None,
            party: None,
        });
    }
}

#[test]
fn hook_does_not_change_grouping() {
    let src = tempfile::tempdir().unwrap();
    write_corpus(src.path());
    let catalog = Catalog::load(src.path(), DEFAULT_PATTERN, None).unwrap();

    let hook = Speaker;
    let stream = SegmentStream::new(&catalog, ProducerOpts::default(), Some(&hook)).unwrap();
    let sets: Vec<SpeechSet> = group_speeches(
        stream,
        SegmentLevel::Speech,
        &catalog,
        GroupingMode::Streaming,
    )
    .unwrap()
    .collect::<Result<_, _>>()
    .unwrap();

    assert_eq!(sets.len(), NB_PROTOCOLS);
    for set in &sets {
        for segment in set.segments() {
            let speaker = segment.speaker().unwrap();
            assert_eq!(speaker.name, format!("Ledamot {}", segment.who()));
            assert_eq!(segment.protocol_name(), set.protocol_name());
        }
    }
}

#[test]
fn wrong_segment_level() {
    let catalog = Catalog::from_items(Vec::new());
    let stream = SegmentStream::new(&catalog, ProducerOpts::default(), None).unwrap();
    let result = group_speeches(
        stream,
        SegmentLevel::Utterance,
        &catalog,
        GroupingMode::Streaming,
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn empty_catalog() {
    let catalog = Catalog::from_items(Vec::new());
    let sets = collect(&catalog, ProducerOpts::default(), GroupingMode::Streaming).unwrap();
    assert!(sets.is_empty());
}

#[test]
fn tagged_frames() {
    let src = tempfile::tempdir().unwrap();
    let protocol = Protocol {
        name: "prot-1921--ak--1".to_string(),
        date: None,
        utterances: vec![
            Utterance {
                u_id: "i-1".to_string(),
                who: "p-1".to_string(),
                annotation: Some("token\tlemma\tpos\txpos\nHerr\therr\tNN\tNN".to_string()),
                ..Default::default()
            },
            Utterance {
                u_id: "i-2".to_string(),
                who: "p-2".to_string(),
                annotation: Some("token\tlemma\tpos\txpos\nJa\tja\tIN\tIN".to_string()),
                ..Default::default()
            },
        ],
    };
    std::fs::write(
        src.path().join("prot-1921--ak--1.json"),
        serde_json::to_string(&protocol).unwrap(),
    )
    .unwrap();
    let catalog = Catalog::load(src.path(), DEFAULT_PATTERN, None).unwrap();

    let opts = ProducerOpts {
        content_type: ContentType::TaggedFrame,
        ..Default::default()
    };
    let sets = collect(&catalog, opts, GroupingMode::Streaming).unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(
        sets[0].merged_text(),
        "token\tlemma\tpos\txpos\nHerr\therr\tNN\tNN\nJa\tja\tIN\tIN"
    );
    assert_eq!(sets[0].n_tokens(), 2);
}
