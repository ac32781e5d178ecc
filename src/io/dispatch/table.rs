/*! Single tagged frame

Every speech set is appended to one tab-separated table, prefixed by a `document_id` column
that refers to the document index, written next to the table as `<stem>_document_index.csv`.
!*/
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Error;
use crate::io::{CompressType, Encoder};
use crate::processing::{tagged_frame, DispatchItem};

use super::index::DocumentIndex;
use super::Dispatch;

type TableWriter = csv::Writer<Encoder<BufWriter<File>>>;

pub struct SingleTaggedFrame {
    dst: PathBuf,
    writer: Option<TableWriter>,
    header: Option<String>,
    index: DocumentIndex,
}

/// `out/speeches.csv.gz` -> `out/speeches_document_index.csv`
pub fn index_path(dst: &Path) -> PathBuf {
    let stem = dst
        .file_name()
        .and_then(|f| f.to_str())
        .and_then(|f| f.split('.').next())
        .unwrap_or("tagged_frame");
    dst.with_file_name(format!("{}_document_index.csv", stem))
}

impl SingleTaggedFrame {
    pub fn new(dst: &Path, compress: CompressType) -> Result<Self, Error> {
        if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let enc = compress.encoder(BufWriter::new(File::create(dst)?))?;
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_writer(enc);

        Ok(Self {
            dst: dst.to_path_buf(),
            writer: Some(writer),
            header: None,
            index: DocumentIndex::default(),
        })
    }

    fn write_item(&mut self, document_id: usize, item: &DispatchItem) -> Result<(), Error> {
        let (header, rows) = tagged_frame::split_header(&item.text);
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::Custom(format!("table {:?} is already closed", self.dst)))?;

        if let Some(header) = header {
            if self.header.is_none() {
                writer.write_record(std::iter::once("document_id").chain(header.split('\t')))?;
                self.header = Some(header.to_string());
            } else if self.header.as_deref() != Some(header) {
                warn!(
                    "{}: header {:?} differs from table header {:?}",
                    item.document_name, header, self.header
                );
            }
        }

        let document_id = document_id.to_string();
        for row in rows {
            writer.write_record(std::iter::once(document_id.as_str()).chain(row.split('\t')))?;
        }
        Ok(())
    }
}

impl Dispatch for SingleTaggedFrame {
    fn dispatch(&mut self, items: Vec<DispatchItem>) -> Result<(), Error> {
        for item in items {
            let document_id = self.index.push(&item);
            self.write_item(document_id, &item)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.writer.take() {
            Some(writer) => {
                let enc = writer
                    .into_inner()
                    .map_err(|e| Error::Io(e.into_error()))?;
                enc.finish()?;
            }
            None => warn!("{:?}: trying to close an already closed table.", self.dst),
        }

        let mut index_file = BufWriter::new(File::create(index_path(&self.dst))?);
        self.index.write(&mut index_file)?;
        index_file.flush()?;

        info!("{} documents written in {:?}", self.index.len(), self.dst);
        Ok(())
    }

    fn target(&self) -> &Path {
        &self.dst
    }
}
