//! Source items: one per protocol document.
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A protocol document on disk.
///
/// The protocol name is the file name stripped of every extension,
/// and the year is parsed from the name (see [protocol_year]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    name: String,
    year: i32,
    path: PathBuf,
}

impl SourceItem {
    pub fn new(name: String, year: i32, path: PathBuf) -> Self {
        Self { name, year, path }
    }

    /// Build a [SourceItem] from a path, deriving name and year.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let name = protocol_name(path)?;
        let year = protocol_year(&name)?;
        Ok(Self::new(name, year, path.to_path_buf()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `prot-1921--ak--1.json.gz` -> `prot-1921--ak--1`
pub fn protocol_name(path: &Path) -> Result<String, Error> {
    let filename = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| Error::Custom(format!("invalid source file name: {:?}", path)))?;

    match filename.split('.').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::Custom(format!(
            "couldn't extract protocol name from {:?}",
            path
        ))),
    }
}

/// Extract the year from a protocol name.
///
/// The year is the first four digits of the second dash-separated field:
/// `prot-1921--ak--1` is 1921, and `prot-199697--12` (a session spanning two years) is 1996.
pub fn protocol_year(name: &str) -> Result<i32, Error> {
    let field = name
        .split('-')
        .nth(1)
        .ok_or_else(|| Error::Custom(format!("no year field in protocol name {}", name)))?;

    field
        .get(..4)
        .and_then(|digits| digits.parse::<i32>().ok())
        .ok_or_else(|| Error::Custom(format!("couldn't parse year from protocol name {}", name)))
}
