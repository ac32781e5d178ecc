//! Compression of dispatched content.
use std::fmt;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;
use flate2::{write::GzEncoder, Compression};

use crate::error::Error;

const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressType {
    #[default]
    Plain,
    Gzip,
    Zstd,
}

impl CompressType {
    /// Suffix appended to compressed file names.
    pub fn suffix(&self) -> &'static str {
        match self {
            CompressType::Plain => "",
            CompressType::Gzip => ".gz",
            CompressType::Zstd => ".zst",
        }
    }

    /// Wrap `writer` into an encoder. Use [Encoder::finish] once done writing.
    pub fn encoder<W: Write>(&self, writer: W) -> Result<Encoder<W>, Error> {
        Ok(match self {
            CompressType::Plain => Encoder::Plain(writer),
            CompressType::Gzip => Encoder::Gzip(GzEncoder::new(writer, Compression::default())),
            CompressType::Zstd => Encoder::Zstd(zstd::Encoder::new(writer, ZSTD_LEVEL)?),
        })
    }

    /// Compression of a file, guessed from its extension (`.gz`, `.zst`).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("gz") => CompressType::Gzip,
            Some("zst") => CompressType::Zstd,
            _ => CompressType::Plain,
        }
    }

    /// Wrap `reader` into the matching decoder.
    pub fn decoder<'a, R: Read + 'a>(&self, reader: R) -> Result<Box<dyn Read + 'a>, Error> {
        Ok(match self {
            CompressType::Plain => Box::new(reader),
            CompressType::Gzip => Box::new(MultiGzDecoder::new(BufReader::new(reader))),
            CompressType::Zstd => Box::new(zstd::Decoder::new(reader)?),
        })
    }
}

impl FromStr for CompressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plain" | "none" => Ok(CompressType::Plain),
            "gzip" | "gz" => Ok(CompressType::Gzip),
            "zstd" => Ok(CompressType::Zstd),
            other => Err(Error::Config(format!("unknown compression type: {}", other))),
        }
    }
}

impl fmt::Display for CompressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressType::Plain => write!(f, "plain"),
            CompressType::Gzip => write!(f, "gzip"),
            CompressType::Zstd => write!(f, "zstd"),
        }
    }
}

/// Writer that (maybe) compresses its content.
///
/// Compressed streams are only complete after [Encoder::finish] has been called.
pub enum Encoder<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
    Zstd(zstd::Encoder<'static, W>),
}

impl<W: Write> Encoder<W> {
    /// Finish the compressed stream, flush and return the inner writer.
    pub fn finish(self) -> Result<W, Error> {
        let mut inner = match self {
            Encoder::Plain(w) => w,
            Encoder::Gzip(enc) => enc.finish()?,
            Encoder::Zstd(enc) => enc.finish()?,
        };
        inner.flush()?;
        Ok(inner)
    }
}

impl<W: Write> Write for Encoder<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Encoder::Plain(w) => w.write(buf),
            Encoder::Gzip(enc) => enc.write(buf),
            Encoder::Zstd(enc) => enc.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Encoder::Plain(w) => w.flush(),
            Encoder::Gzip(enc) => enc.flush(),
            Encoder::Zstd(enc) => enc.flush(),
        }
    }
}
