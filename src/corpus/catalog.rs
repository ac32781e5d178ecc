/*! Source catalog

Enumerates the protocol documents of a corpus folder, and allows lookups by protocol name.
!*/
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::slice::Iter;

use log::{debug, error, warn};

use crate::error::Error;

use super::SourceItem;

/// Default glob pattern, relative to the source folder.
pub const DEFAULT_PATTERN: &str = "**/prot-*.json*";

/// Inclusive year range used to restrict a catalog.
///
/// Parses from either a single year (`1921`) or a range (`1920-1925`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearFilter(RangeInclusive<i32>);

impl YearFilter {
    pub fn new(start: i32, end: i32) -> Self {
        Self(start..=end)
    }

    pub fn contains(&self, year: i32) -> bool {
        self.0.contains(&year)
    }
}

impl FromStr for YearFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |v: &str| {
            v.trim()
                .parse::<i32>()
                .map_err(|e| Error::Config(format!("invalid year {:?} in filter {:?}: {}", v, s, e)))
        };

        let filter = match s.split_once('-') {
            Some((start, end)) => Self::new(parse(start)?, parse(end)?),
            None => {
                let year = parse(s)?;
                Self::new(year, year)
            }
        };

        if filter.0.is_empty() {
            return Err(Error::Config(format!("empty year range {:?}", s)));
        }

        Ok(filter)
    }
}

/// Collection of [SourceItem], sorted by protocol name.
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<SourceItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from already constructed items.
    ///
    /// Items are sorted by name. If two items share a name, the first one (after sorting) is kept.
    pub fn from_items(mut items: Vec<SourceItem>) -> Self {
        items.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.path().cmp(b.path())));

        let mut kept = Vec::with_capacity(items.len());
        let mut index = HashMap::with_capacity(items.len());
        for item in items {
            if index.contains_key(item.name()) {
                warn!("duplicate protocol {} at {:?}, ignoring", item.name(), item.path());
                continue;
            }
            index.insert(item.name().to_string(), kept.len());
            kept.push(item);
        }

        Self { items: kept, index }
    }

    /// Load every file of `source_folder` matching `pattern`, keeping only years in `year_filter`.
    ///
    /// Files whose name/year can't be parsed are logged and skipped.
    pub fn load(
        source_folder: &Path,
        pattern: &str,
        year_filter: Option<&YearFilter>,
    ) -> Result<Self, Error> {
        if !source_folder.is_dir() {
            return Err(Error::Config(format!(
                "source folder {:?} does not exist or is not a directory",
                source_folder
            )));
        }

        // the folder itself may hold glob metacharacters
        let folder = source_folder
            .to_str()
            .ok_or_else(|| Error::Config(format!("invalid source folder: {:?}", source_folder)))?;
        let full_pattern: PathBuf = [Path::new(&glob::Pattern::escape(folder)), Path::new(pattern)]
            .iter()
            .collect();
        let full_pattern = full_pattern
            .to_str()
            .ok_or_else(|| Error::Config(format!("invalid pattern: {:?}", pattern)))?
            .to_string();

        debug!("loading catalog using pattern {}", full_pattern);

        let mut items = Vec::new();
        for path in glob::glob(&full_pattern)? {
            let path = path?;
            if !path.is_file() {
                continue;
            }
            match SourceItem::from_path(&path) {
                Ok(item) => items.push(item),
                Err(e) => error!("skipping {:?}: {}", path, e),
            }
        }

        let catalog = match year_filter {
            Some(year_filter) => Self::from_items(items).filter_years(year_filter),
            None => Self::from_items(items),
        };
        debug!("catalog holds {} protocols", catalog.len());
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&SourceItem> {
        self.index.get(name).map(|idx| &self.items[*idx])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, SourceItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[SourceItem] {
        &self.items
    }

    /// Keep only the items within `year_filter`.
    pub fn filter_years(self, year_filter: &YearFilter) -> Self {
        let before = self.items.len();
        let catalog = Self::from_items(
            self.items
                .into_iter()
                .filter(|item| year_filter.contains(item.year()))
                .collect(),
        );
        debug!(
            "year filter {:?} kept {}/{} protocols",
            year_filter,
            catalog.len(),
            before
        );
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a SourceItem;
    type IntoIter = Iter<'a, SourceItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn year_filter_from_str() {
        assert_eq!("1921".parse::<YearFilter>().unwrap(), YearFilter::new(1921, 1921));
        assert_eq!(
            "1920-1925".parse::<YearFilter>().unwrap(),
            YearFilter::new(1920, 1925)
        );
        assert!("1925-1920".parse::<YearFilter>().is_err());
        assert!("abc".parse::<YearFilter>().is_err());
    }

    #[test]
    fn load_and_lookup() {
        let dst = tempfile::tempdir().unwrap();
        std::fs::create_dir(dst.path().join("1922")).unwrap();
        touch(dst.path(), "prot-1921--ak--2.json");
        touch(dst.path(), "prot-1921--ak--1.json.gz");
        touch(&dst.path().join("1922"), "prot-1922--fk--1.json");
        touch(dst.path(), "README.md");

        let catalog = Catalog::load(dst.path(), DEFAULT_PATTERN, None).unwrap();
        assert_eq!(catalog.len(), 3);

        let names: Vec<&str> = catalog.iter().map(|i| i.name()).collect();
        assert_eq!(
            names,
            vec!["prot-1921--ak--1", "prot-1921--ak--2", "prot-1922--fk--1"]
        );
        assert_eq!(catalog.get("prot-1922--fk--1").unwrap().year(), 1922);
        assert!(catalog.get("prot-1923--fk--1").is_none());
    }

    #[test]
    fn load_with_year_filter() {
        let dst = tempfile::tempdir().unwrap();
        touch(dst.path(), "prot-1921--ak--1.json");
        touch(dst.path(), "prot-1922--ak--1.json");
        touch(dst.path(), "prot-1930--ak--1.json");

        let filter = YearFilter::new(1921, 1922);
        let catalog = Catalog::load(dst.path(), DEFAULT_PATTERN, Some(&filter)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("prot-1930--ak--1").is_none());

        let catalog = Catalog::load(dst.path(), DEFAULT_PATTERN, None).unwrap();
        let filtered = catalog.filter_years(&YearFilter::new(1930, 1930));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn load_from_folder_with_glob_metacharacters() {
        let dst = tempfile::tempdir().unwrap();
        let folder = dst.path().join("riksdag [1921]*");
        std::fs::create_dir(&folder).unwrap();
        touch(&folder, "prot-1921--ak--1.json");
        // would be matched by an unescaped `*`
        std::fs::create_dir(dst.path().join("riksdag [1921]x")).unwrap();
        touch(&dst.path().join("riksdag [1921]x"), "prot-1922--ak--1.json");

        let catalog = Catalog::load(&folder, DEFAULT_PATTERN, None).unwrap();
        let names: Vec<&str> = catalog.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["prot-1921--ak--1"]);
    }

    #[test]
    fn load_skips_unparsable_names() {
        let dst = tempfile::tempdir().unwrap();
        touch(dst.path(), "prot-19xx--ak--1.json");
        touch(dst.path(), "prot-1921--ak--1.json");

        let catalog = Catalog::load(dst.path(), DEFAULT_PATTERN, None).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn load_missing_folder() {
        let dst = tempfile::tempdir().unwrap();
        let missing = dst.path().join("nope");
        assert!(matches!(
            Catalog::load(&missing, DEFAULT_PATTERN, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn duplicates_are_dropped() {
        let items = vec![
            SourceItem::new("prot-1921--1".to_string(), 1921, PathBuf::from("b/prot-1921--1.json")),
            SourceItem::new("prot-1921--1".to_string(), 1921, PathBuf::from("a/prot-1921--1.json")),
        ];
        let catalog = Catalog::from_items(items);
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.get("prot-1921--1").unwrap().path(),
            Path::new("a/prot-1921--1.json")
        );
    }
}
