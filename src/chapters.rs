use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::Context as _;
use serde::ser::{Serialize, Serializer};

use crate::page::{parse_ascii_digits, parse_page_file_name};

/// A `c<digits>` chapter directory. Orders by number, then by directory name
/// so `c1` and `c01` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChapterId {
    number: u32,
    name: String,
}

impl ChapterId {
    pub fn parse(name: &str) -> Option<Self> {
        let digits = name.strip_prefix('c')?;
        let number = parse_ascii_digits(digits)?;
        Some(Self {
            number,
            name: name.to_owned(),
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

/// Fixed suffix → label table. Anything not listed renders as `Chapter {n}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterLabels {
    labels: BTreeMap<u32, String>,
}

impl Default for ChapterLabels {
    fn default() -> Self {
        Self::empty()
            .with_label(0, "Preface")
            .with_label(21, "Appendix")
            .with_label(22, "Bib & Index")
    }
}

impl ChapterLabels {
    pub fn empty() -> Self {
        Self {
            labels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, number: u32, label: impl Into<String>) -> Self {
        self.labels.insert(number, label.into());
        self
    }

    pub fn label_for(&self, chapter: &ChapterId) -> String {
        match self.labels.get(&chapter.number()) {
            Some(label) => label.clone(),
            None => format!("Chapter {}", chapter.number()),
        }
    }
}

/// Chapter → ascending page numbers. Chapters without pages are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChapterMap {
    chapters: BTreeMap<ChapterId, Vec<u32>>,
}

impl ChapterMap {
    pub fn insert(&mut self, chapter: ChapterId, pages: BTreeSet<u32>) {
        if pages.is_empty() {
            return;
        }
        self.chapters.insert(chapter, pages.into_iter().collect());
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn first(&self) -> Option<&ChapterId> {
        self.chapters.keys().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChapterId, &[u32])> {
        self.chapters
            .iter()
            .map(|(chapter, pages)| (chapter, pages.as_slice()))
    }

    #[cfg(test)]
    fn pages(&self, chapter: &str) -> Option<&[u32]> {
        self.iter()
            .find(|(id, _)| id.as_str() == chapter)
            .map(|(_, pages)| pages)
    }
}

// Serialized as a JSON object whose keys follow chapter order.
impl Serialize for ChapterMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter().map(|(chapter, pages)| (chapter.as_str(), pages)))
    }
}

/// Scans the immediate subdirectories of `svg_dir` for chapter directories.
pub fn scan_chapters(svg_dir: &Path) -> anyhow::Result<ChapterMap> {
    let mut map = ChapterMap::default();

    for entry in std::fs::read_dir(svg_dir)
        .with_context(|| format!("read svg dir: {}", svg_dir.display()))?
    {
        let entry = entry.with_context(|| format!("read svg dir entry: {}", svg_dir.display()))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(chapter) = entry.file_name().to_str().and_then(ChapterId::parse) else {
            tracing::debug!(path = %path.display(), "ignoring non-chapter directory");
            continue;
        };

        let pages = scan_page_numbers(&path)?;
        if pages.is_empty() {
            tracing::debug!(chapter = chapter.as_str(), "chapter has no pages; excluded");
        }
        map.insert(chapter, pages);
    }

    Ok(map)
}

/// Collects `page_<n>.svg` numbers from the files directly inside `dir`.
pub fn scan_page_numbers(dir: &Path) -> anyhow::Result<BTreeSet<u32>> {
    let mut pages = BTreeSet::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("read page dir: {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("read page dir entry: {}", dir.display()))?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(page) = entry.file_name().to_str().and_then(parse_page_file_name) {
            pages.insert(page);
        }
    }
    Ok(pages)
}
