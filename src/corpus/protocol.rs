/*! Tagged protocol documents

A protocol is a JSON object holding a list of utterances, each one carrying its plain text (`paragraphs`)
and its tagged frame (`annotation`, tab-separated with a header line).
Files ending in `.gz` or `.zst` are transparently decompressed.
!*/
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::io::CompressType;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Utterance {
    pub u_id: String,
    #[serde(default = "unknown_who")]
    pub who: String,
    #[serde(default)]
    pub speaker_note_id: Option<String>,
    #[serde(default)]
    pub prev_id: Option<String>,
    #[serde(default)]
    pub next_id: Option<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub annotation: Option<String>,
}

fn unknown_who() -> String {
    "unknown".to_string()
}

impl Utterance {
    /// Plain text of the utterance, paragraphs being newline-separated.
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    /// Tagged frame of the utterance, or an empty string if there's none.
    pub fn tagged_frame(&self) -> &str {
        self.annotation.as_deref().unwrap_or("")
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Protocol {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub utterances: Vec<Utterance>,
}

impl Protocol {
    /// Read a protocol from a reader containing JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read a protocol from a path, decompressing it if it ends in `.gz` or `.zst`.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let f = File::open(path)?;
        let protocol = CompressType::from_path(path)
            .decoder(f)
            .and_then(|reader| Self::from_reader(BufReader::new(reader)));

        protocol.map_err(|e| Error::Custom(format!("couldn't read protocol {:?}: {}", path, e)))
    }

    pub fn is_empty(&self) -> bool {
        self.utterances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};

    use super::*;

    const PROTOCOL: &str = r#"{"name":"prot-1921--ak--1","date":"1921-01-10","utterances":[
        {"u_id":"i-1","who":"p-1","speaker_note_id":"n-1","paragraphs":["Herr talman!","Jag yrkar bifall."],
         "annotation":"token\tlemma\tpos\txpos\nHerr\therr\tNN\tNN"},
        {"u_id":"i-2","paragraphs":["Ja."]}]}"#;

    #[test]
    fn deserialize() {
        let p = Protocol::from_reader(PROTOCOL.as_bytes()).unwrap();
        assert_eq!(p.name, "prot-1921--ak--1");
        assert_eq!(p.utterances.len(), 2);
        assert_eq!(p.utterances[0].text(), "Herr talman!\nJag yrkar bifall.");
        assert_eq!(p.utterances[1].who, "unknown");
        assert_eq!(p.utterances[1].tagged_frame(), "");
    }

    #[test]
    fn from_gzip_path() {
        let dst = tempfile::tempdir().unwrap();
        let path = dst.path().join("prot-1921--ak--1.json.gz");
        let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        enc.write_all(PROTOCOL.as_bytes()).unwrap();
        enc.finish().unwrap();

        let p = Protocol::from_path(&path).unwrap();
        assert_eq!(p.utterances[0].u_id, "i-1");
    }

    #[test]
    fn from_zstd_path() {
        let dst = tempfile::tempdir().unwrap();
        let path = dst.path().join("prot-1921--ak--1.json.zst");
        let bytes = zstd::encode_all(PROTOCOL.as_bytes(), 3).unwrap();
        std::fs::write(&path, bytes).unwrap();

        let p = Protocol::from_path(&path).unwrap();
        assert_eq!(p.utterances[1].text(), "Ja.");
    }

    #[test]
    fn from_invalid_path() {
        let dst = tempfile::tempdir().unwrap();
        let path = dst.path().join("prot-1921--ak--1.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Protocol::from_path(&path).is_err());
    }
}
