//! Files in a zip archive: one member per speech set, plus the document index.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Error;
use crate::io::CompressType;
use crate::processing::DispatchItem;

use super::index::{DocumentIndex, DOCUMENT_INDEX_FILENAME};
use super::Dispatch;

pub struct FilesInZip {
    dst: PathBuf,
    writer: Option<ZipWriter<BufWriter<File>>>,
    options: FileOptions,
    index: DocumentIndex,
}

impl FilesInZip {
    /// Create the archive. [CompressType::Plain] stores members, any other type deflates them.
    pub fn new(dst: &Path, compress: CompressType) -> Result<Self, Error> {
        if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let method = match compress {
            CompressType::Plain => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let writer = ZipWriter::new(BufWriter::new(File::create(dst)?));

        Ok(Self {
            dst: dst.to_path_buf(),
            writer: Some(writer),
            options: FileOptions::default().compression_method(method),
            index: DocumentIndex::default(),
        })
    }

    fn writer(&mut self) -> Result<&mut ZipWriter<BufWriter<File>>, Error> {
        self.writer
            .as_mut()
            .ok_or_else(|| Error::Custom(format!("archive {:?} is already closed", self.dst)))
    }
}

impl Dispatch for FilesInZip {
    fn dispatch(&mut self, items: Vec<DispatchItem>) -> Result<(), Error> {
        let options = self.options;
        for item in items {
            debug!("adding {} to {:?}", item.filename, self.dst);
            let writer = self.writer()?;
            writer.start_file(item.filename.as_str(), options)?;
            writer.write_all(item.text.as_bytes())?;
            self.index.push(&item);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        let options = self.options;
        let mut index = Vec::new();
        self.index.write(&mut index)?;

        match self.writer.take() {
            Some(mut writer) => {
                writer.start_file(DOCUMENT_INDEX_FILENAME, options)?;
                writer.write_all(&index)?;
                writer.finish()?.flush()?;
                info!("{} documents written in {:?}", self.index.len(), self.dst);
            }
            None => warn!("{:?}: trying to close an already closed archive.", self.dst),
        }
        Ok(())
    }

    fn target(&self) -> &Path {
        &self.dst
    }
}
