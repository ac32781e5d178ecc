/*! Dispatchers

A dispatcher receives merged speech sets ([DispatchItem]) and persists them to a target.

Dispatchers are picked from a closed registry ([TargetType]) and opened into a [DispatchHandle],
which guarantees that the dispatcher is closed exactly once, even on early exit.

```no_run
use std::path::Path;
use riksprot::io::dispatch::TargetType;
use riksprot::io::CompressType;

let target: TargetType = "files-in-zip".parse().unwrap();
let handle = target.open(Path::new("out/speeches.zip"), CompressType::Plain).unwrap();
// handle.dispatch(items)?;
let location = handle.close().unwrap();
```
!*/
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, error};

use crate::error::Error;
use crate::io::CompressType;
use crate::processing::DispatchItem;
use crate::segment::ContentType;

mod archive;
mod folder;
mod index;
mod jsonl;
mod table;

pub use archive::FilesInZip;
pub use folder::{FilesInFolder, CHECKSUM_FILENAME};
pub use index::{DocumentIndex, DOCUMENT_INDEX_FILENAME};
pub use jsonl::JsonLines;
pub use table::{index_path as table_index_path, SingleTaggedFrame};

/// Persists speech sets to a target.
///
/// `close` is called once, after the last `dispatch`.
pub trait Dispatch {
    fn dispatch(&mut self, items: Vec<DispatchItem>) -> Result<(), Error>;
    fn close(&mut self) -> Result<(), Error>;
    fn target(&self) -> &Path;
}

/// Registry of available dispatchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetType {
    FilesInFolder,
    #[default]
    FilesInZip,
    SingleTaggedFrame,
    Jsonl,
}

impl TargetType {
    pub const ALL: [TargetType; 4] = [
        TargetType::FilesInFolder,
        TargetType::FilesInZip,
        TargetType::SingleTaggedFrame,
        TargetType::Jsonl,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TargetType::FilesInFolder => "files-in-folder",
            TargetType::FilesInZip => "files-in-zip",
            TargetType::SingleTaggedFrame => "single-tagged-frame",
            TargetType::Jsonl => "jsonl",
        }
    }

    /// Whether this target can hold content of type `content_type`.
    pub fn supports(&self, content_type: ContentType) -> bool {
        match self {
            TargetType::SingleTaggedFrame => content_type == ContentType::TaggedFrame,
            _ => true,
        }
    }

    /// Instantiate the dispatcher.
    pub fn open(&self, target: &Path, compress: CompressType) -> Result<DispatchHandle, Error> {
        debug!("opening {} dispatcher on {:?} ({})", self, target, compress);
        let inner: Box<dyn Dispatch> = match self {
            TargetType::FilesInFolder => Box::new(FilesInFolder::new(target, compress)?),
            TargetType::FilesInZip => Box::new(FilesInZip::new(target, compress)?),
            TargetType::SingleTaggedFrame => Box::new(SingleTaggedFrame::new(target, compress)?),
            TargetType::Jsonl => Box::new(JsonLines::new(target, compress)?),
        };
        Ok(DispatchHandle::new(inner))
    }
}

impl FromStr for TargetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetType::ALL
            .into_iter()
            .find(|t| t.key() == s)
            .ok_or_else(|| {
                let keys: Vec<&str> = TargetType::ALL.iter().map(TargetType::key).collect();
                Error::Config(format!(
                    "unknown target type: {} (available: {})",
                    s,
                    keys.join(", ")
                ))
            })
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Open dispatcher.
///
/// Closes the inner dispatcher on drop if [DispatchHandle::close] has not been called.
pub struct DispatchHandle {
    inner: Box<dyn Dispatch>,
    closed: bool,
}

impl DispatchHandle {
    pub fn new(inner: Box<dyn Dispatch>) -> Self {
        Self {
            inner,
            closed: false,
        }
    }

    pub fn dispatch(&mut self, items: Vec<DispatchItem>) -> Result<(), Error> {
        self.inner.dispatch(items)
    }

    pub fn target(&self) -> &Path {
        self.inner.target()
    }

    /// Close the dispatcher, returning the location of the written output.
    pub fn close(mut self) -> Result<PathBuf, Error> {
        self.closed = true;
        self.inner.close()?;
        Ok(self.inner.target().to_path_buf())
    }
}

impl Drop for DispatchHandle {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.inner.close() {
                error!("could not close dispatcher on {:?}: {}", self.inner.target(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Recorder {
        dst: PathBuf,
        closes: Rc<RefCell<usize>>,
        fail: bool,
    }

    impl Dispatch for Recorder {
        fn dispatch(&mut self, _items: Vec<DispatchItem>) -> Result<(), Error> {
            if self.fail {
                return Err(Error::Custom("disk full".to_string()));
            }
            Ok(())
        }
        fn close(&mut self) -> Result<(), Error> {
            *self.closes.borrow_mut() += 1;
            Ok(())
        }
        fn target(&self) -> &Path {
            &self.dst
        }
    }

    fn recorder(fail: bool) -> (DispatchHandle, Rc<RefCell<usize>>) {
        let closes = Rc::new(RefCell::new(0));
        let handle = DispatchHandle::new(Box::new(Recorder {
            dst: PathBuf::from("out"),
            closes: closes.clone(),
            fail,
        }));
        (handle, closes)
    }

    #[test]
    fn registry_keys() {
        for t in TargetType::ALL {
            assert_eq!(t.key().parse::<TargetType>().unwrap(), t);
        }
        assert!(matches!(
            "files-in-cloud".parse::<TargetType>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn supports() {
        assert!(!TargetType::SingleTaggedFrame.supports(ContentType::Text));
        assert!(TargetType::SingleTaggedFrame.supports(ContentType::TaggedFrame));
        assert!(TargetType::FilesInZip.supports(ContentType::Text));
    }

    #[test]
    fn close_once() {
        let (handle, closes) = recorder(false);
        assert_eq!(handle.close().unwrap(), PathBuf::from("out"));
        assert_eq!(*closes.borrow(), 1);
    }

    #[test]
    fn close_on_drop() {
        let (mut handle, closes) = recorder(false);
        handle.dispatch(Vec::new()).unwrap();
        drop(handle);
        assert_eq!(*closes.borrow(), 1);
    }

    #[test]
    fn failed_dispatch_still_closes() {
        let (mut handle, closes) = recorder(true);
        let result = handle.dispatch(Vec::new());
        assert!(matches!(result, Err(Error::Custom(_))));
        assert_eq!(*closes.borrow(), 0);

        drop(handle);
        assert_eq!(*closes.borrow(), 1);
    }
}
