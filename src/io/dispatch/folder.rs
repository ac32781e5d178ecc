/*! Files in folder

One (maybe compressed) file per speech set, a document index and a `sha384sum -c` compatible checksum file.
!*/
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use sha2::{Digest, Sha384};

use crate::error::Error;
use crate::io::CompressType;
use crate::processing::DispatchItem;

use super::index::{DocumentIndex, DOCUMENT_INDEX_FILENAME};
use super::Dispatch;

pub const CHECKSUM_FILENAME: &str = "sha384sums.txt";

pub struct FilesInFolder {
    dst: PathBuf,
    compress: CompressType,
    index: DocumentIndex,
    filenames: Vec<String>,
}

impl FilesInFolder {
    pub fn new(dst: &Path, compress: CompressType) -> Result<Self, Error> {
        std::fs::create_dir_all(dst)?;
        Ok(Self {
            dst: dst.to_path_buf(),
            compress,
            index: DocumentIndex::default(),
            filenames: Vec::new(),
        })
    }

    fn write_item(&self, filename: &str, item: &DispatchItem) -> Result<(), Error> {
        let path = self.dst.join(filename);
        let mut enc = self.compress.encoder(BufWriter::new(File::create(&path)?))?;
        enc.write_all(item.text.as_bytes())?;
        enc.finish()?;
        Ok(())
    }

    /// write hashes of every written file in sha384sum -c compatible format.
    fn write_checksums(&self) -> Result<(), Error> {
        let mut hasher = Sha384::new();
        let mut checksum_file = BufWriter::new(File::create(self.dst.join(CHECKSUM_FILENAME))?);

        let filenames = self
            .filenames
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(DOCUMENT_INDEX_FILENAME));

        for filename in filenames {
            let hash = get_hash(&self.dst.join(filename), &mut hasher)?;
            writeln!(&mut checksum_file, "{} {}", hash, filename)?;
        }
        checksum_file.flush()?;
        Ok(())
    }
}

/// compute the hash of the file pointed by the filepath by using [io::copy] between a file handler and the hasher.
#[inline]
fn get_hash(filepath: &Path, hasher: &mut Sha384) -> Result<String, Error> {
    let mut f = File::open(filepath)?;
    io::copy(&mut f, hasher)?;
    let result = format!("{:x}", hasher.finalize_reset());
    Ok(result)
}

impl Dispatch for FilesInFolder {
    fn dispatch(&mut self, items: Vec<DispatchItem>) -> Result<(), Error> {
        for item in items {
            let filename = format!("{}{}", item.filename, self.compress.suffix());
            debug!("writing {:?}", self.dst.join(&filename));
            self.write_item(&filename, &item)?;
            self.index.push(&item);
            self.filenames.push(filename);
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        let mut index_file = BufWriter::new(File::create(self.dst.join(DOCUMENT_INDEX_FILENAME))?);
        self.index.write(&mut index_file)?;
        index_file.flush()?;

        self.write_checksums()?;
        info!("{} documents written in {:?}", self.index.len(), self.dst);
        Ok(())
    }

    fn target(&self) -> &Path {
        &self.dst
    }
}
