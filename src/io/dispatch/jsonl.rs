/*! JSON lines

Writes each [DispatchItem] as a JSON document on its own line.
!*/
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::Error;
use crate::io::{CompressType, Encoder};
use crate::processing::DispatchItem;

use super::Dispatch;

pub struct JsonLines {
    dst: PathBuf,
    handle: Option<Encoder<BufWriter<File>>>,
    nb_documents: usize,
}

impl JsonLines {
    pub fn new(dst: &Path, compress: CompressType) -> Result<Self, Error> {
        if let Some(parent) = dst.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let handle = compress.encoder(BufWriter::new(File::create(dst)?))?;
        Ok(Self {
            dst: dst.to_path_buf(),
            handle: Some(handle),
            nb_documents: 0,
        })
    }
}

impl Dispatch for JsonLines {
    /// writes the provided items, one per line.
    fn dispatch(&mut self, items: Vec<DispatchItem>) -> Result<(), Error> {
        let handle = self
            .handle
            .as_mut()
            .ok_or_else(|| Error::Custom(format!("{:?} is already closed", self.dst)))?;

        let mut piece_str = String::new();
        for item in &items {
            piece_str += &serde_json::to_string(item)?;
            piece_str.push('\n');
        }
        handle.write_all(piece_str.as_bytes())?;
        self.nb_documents += items.len();

        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        match self.handle.take() {
            Some(handle) => {
                handle.finish()?;
                info!("{} documents written in {:?}", self.nb_documents, self.dst);
            }
            None => warn!("{:?}: trying to close an already closed file.", self.dst),
        }
        Ok(())
    }

    fn target(&self) -> &Path {
        &self.dst
    }
}
