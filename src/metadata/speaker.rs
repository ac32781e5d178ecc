/*! Speaker index

Speaker information is resolved from two CSV files found in the metadata folder:

- `persons.csv`: `person_id,name,gender,born`
- `party_affiliation.csv` (optional): `person_id,party,start_year,end_year`, empty years meaning open-ended.

Lookups are done on a `(u_id, person_id, year)` key, the year being used to pick the party affiliation.
!*/
use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::segment::{Enrich, Segment};

pub const PERSONS_FILE: &str = "persons.csv";
pub const PARTY_AFFILIATION_FILE: &str = "party_affiliation.csv";

/// Person id used upstream when the speaker couldn't be identified.
pub const UNKNOWN_PERSON: &str = "unknown";

/// Resolved identity of the speaker of a segment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SpeakerInfo {
    pub speech_id: String,
    pub person_id: String,
    pub name: String,
    pub gender: Option<String>,
    pub party: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub person_id: String,
    pub name: String,
    pub gender: Option<String>,
    pub born: Option<i32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PartyAffiliation {
    pub person_id: String,
    pub party: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl PartyAffiliation {
    fn covers(&self, year: i32) -> bool {
        self.start_year.map_or(true, |start| start <= year)
            && self.end_year.map_or(true, |end| year <= end)
    }
}

#[derive(Debug, Default)]
pub struct SpeakerIndex {
    persons: HashMap<String, Person>,
    affiliations: HashMap<String, Vec<PartyAffiliation>>,
}

impl SpeakerIndex {
    pub fn new(persons: Vec<Person>, affiliations: Vec<PartyAffiliation>) -> Self {
        let persons = persons
            .into_iter()
            .map(|p| (p.person_id.clone(), p))
            .collect();

        let mut by_person: HashMap<String, Vec<PartyAffiliation>> = HashMap::new();
        for a in affiliations {
            by_person.entry(a.person_id.clone()).or_default().push(a);
        }

        Self {
            persons,
            affiliations: by_person,
        }
    }

    /// Load the index from a metadata folder.
    pub fn from_folder(folder: &Path) -> Result<Self, Error> {
        let persons_path = folder.join(PERSONS_FILE);
        if !persons_path.is_file() {
            return Err(Error::Config(format!(
                "no {} in metadata folder {:?}",
                PERSONS_FILE, folder
            )));
        }

        let persons: Vec<Person> = csv::Reader::from_path(&persons_path)?
            .deserialize()
            .collect::<Result<_, csv::Error>>()?;

        let affiliations_path = folder.join(PARTY_AFFILIATION_FILE);
        let affiliations: Vec<PartyAffiliation> = if affiliations_path.is_file() {
            csv::Reader::from_path(&affiliations_path)?
                .deserialize()
                .collect::<Result<_, csv::Error>>()?
        } else {
            warn!(
                "no {} in {:?}: no party information will be added",
                PARTY_AFFILIATION_FILE, folder
            );
            Vec::new()
        };

        info!(
            "loaded {} persons and {} party affiliations from {:?}",
            persons.len(),
            affiliations.len(),
            folder
        );
        Ok(Self::new(persons, affiliations))
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Party of `person_id` during `year`.
    ///
    /// If several affiliations cover the year, the one that started last is picked.
    pub fn party(&self, person_id: &str, year: i32) -> Option<&str> {
        self.affiliations
            .get(person_id)?
            .iter()
            .filter(|a| a.covers(year))
            .max_by_key(|a| a.start_year)
            .map(|a| a.party.as_str())
    }

    /// Resolve speaker information. Returns [None] for unknown persons.
    pub fn get_speaker_info(&self, u_id: &str, person_id: &str, year: i32) -> Option<SpeakerInfo> {
        if person_id == UNKNOWN_PERSON {
            return None;
        }
        let person = self.persons.get(person_id)?;
        Some(SpeakerInfo {
            speech_id: u_id.to_string(),
            person_id: person.person_id.clone(),
            name: person.name.clone(),
            gender: person.gender.clone(),
            party: self.party(person_id, year).map(String::from),
        })
    }
}

/// Attaches [SpeakerInfo] to segments. Lookup failures leave the segment untouched.
pub struct SpeakerEnricher {
    index: SpeakerIndex,
}

impl SpeakerEnricher {
    pub fn new(index: SpeakerIndex) -> Self {
        Self { index }
    }
}

impl Enrich for SpeakerEnricher {
    fn enrich(&self, segment: &mut Segment) {
        match self
            .index
            .get_speaker_info(segment.u_id(), segment.who(), segment.year())
        {
            Some(info) => {
                segment.set_speaker(info);
            }
            None => debug!(
                "{}/{}: no speaker found for {}",
                segment.protocol_name(),
                segment.u_id(),
                segment.who()
            ),
        }
    }
}
