/*! Speaker metadata

Resolution of speaker identities, used to enrich segments while they are produced.
!*/
mod speaker;

pub use speaker::{
    PartyAffiliation, Person, SpeakerEnricher, SpeakerIndex, SpeakerInfo, PARTY_AFFILIATION_FILE,
    PERSONS_FILE, UNKNOWN_PERSON,
};
