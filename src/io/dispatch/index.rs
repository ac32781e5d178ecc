//! Document index, written by dispatchers when they're closed.
use std::io::Write;

use crate::error::Error;
use crate::processing::{DispatchItem, DocumentIndexRecord};

pub const DOCUMENT_INDEX_FILENAME: &str = "document_index.csv";

/// Accumulates [DocumentIndexRecord]s, assigning sequential document ids.
#[derive(Debug, Default)]
pub struct DocumentIndex {
    records: Vec<DocumentIndexRecord>,
}

impl DocumentIndex {
    /// Register an item, returning its document id.
    pub fn push(&mut self, item: &DispatchItem) -> usize {
        let document_id = self.records.len();
        self.records.push(item.index_record(document_id));
        document_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DocumentIndexRecord] {
        &self.records
    }

    /// Write the index as CSV.
    pub fn write<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::segment::ContentType;

    use super::*;

    fn item(name: &str) -> DispatchItem {
        DispatchItem {
            document_name: name.to_string(),
            filename: format!("{}.txt", name),
            group_name: name.to_string(),
            year: 1921,
            content_type: ContentType::Text,
            n_tokens: 2,
            n_chars: 10,
            n_segments: 1,
            speakers: Vec::new(),
            text: "hello you".to_string(),
        }
    }

    #[test]
    fn write_index() {
        let mut index = DocumentIndex::default();
        assert_eq!(index.push(&item("prot-1921--1")), 0);
        assert_eq!(index.push(&item("prot-1921--2")), 1);

        let mut out = Vec::new();
        index.write(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "document_id,document_name,filename,year,n_tokens,n_chars,n_segments",
                "0,prot-1921--1,prot-1921--1.txt,1921,2,10,1",
                "1,prot-1921--2,prot-1921--2.txt,1921,2,10,1",
            ]
        );
    }
}
