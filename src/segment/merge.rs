//! Merging of utterances into speeches.
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

use crate::corpus::Utterance;
use crate::error::Error;

/// How consecutive utterances are merged into a speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeStrategy {
    /// Consecutive utterances of the same person.
    #[default]
    WhoSequence,
    /// Consecutive utterances introduced by the same speaker note.
    SpeakerNoteIdSequence,
    /// Utterances linked together by their `next_id`.
    Chain,
    /// Every utterance is a speech.
    Undefined,
}

impl MergeStrategy {
    /// Partition `utterances` into speeches, keeping document order.
    pub fn group<'a>(&self, utterances: &'a [Utterance]) -> Vec<Vec<&'a Utterance>> {
        match self {
            MergeStrategy::WhoSequence => {
                group_consecutive(utterances, |u: &'a Utterance| u.who.as_str())
            }
            MergeStrategy::SpeakerNoteIdSequence => {
                group_consecutive(utterances, |u: &'a Utterance| u.speaker_note_id.as_deref())
            }
            MergeStrategy::Chain => group_chain(utterances),
            MergeStrategy::Undefined => utterances.iter().map(|u| vec![u]).collect(),
        }
    }
}

fn group_consecutive<'a, K, F>(utterances: &'a [Utterance], key: F) -> Vec<Vec<&'a Utterance>>
where
    K: PartialEq,
    F: Fn(&'a Utterance) -> K,
{
    let groups = utterances.iter().group_by(|u| key(*u));
    let speeches: Vec<Vec<&'a Utterance>> = groups
        .into_iter()
        .map(|(_, group)| group.collect())
        .collect();
    speeches
}

/// a new speech is started each time the previous utterance does not point to the current one.
fn group_chain(utterances: &[Utterance]) -> Vec<Vec<&Utterance>> {
    let mut groups: Vec<Vec<&Utterance>> = Vec::new();
    let mut prev: Option<&Utterance> = None;

    for u in utterances {
        let linked = prev.map_or(false, |p| p.next_id.as_deref() == Some(u.u_id.as_str()));
        match groups.last_mut() {
            Some(group) if linked => group.push(u),
            _ => groups.push(vec![u]),
        }
        prev = Some(u);
    }

    groups
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "who-sequence" => Ok(MergeStrategy::WhoSequence),
            "speaker-note-id-sequence" => Ok(MergeStrategy::SpeakerNoteIdSequence),
            "chain" => Ok(MergeStrategy::Chain),
            "undefined" => Ok(MergeStrategy::Undefined),
            other => Err(Error::Config(format!("unknown merge strategy: {}", other))),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MergeStrategy::WhoSequence => "who-sequence",
            MergeStrategy::SpeakerNoteIdSequence => "speaker-note-id-sequence",
            MergeStrategy::Chain => "chain",
            MergeStrategy::Undefined => "undefined",
        };
        write!(f, "{}", s)
    }
}
