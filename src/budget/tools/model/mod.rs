use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Typed value of a single worksheet cell as seen by the scanner.
///
/// Only [`CellValue::Text`] can ever become a category or subcategory; the
/// remaining variants exist so that numeric placeholders and formula results
/// are recognised and skipped instead of being stringified.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// No value stored in the cell.
    #[default]
    Empty,
    /// Plain string value.
    Text(String),
    /// Numeric value, including integers.
    Number(f64),
    /// Boolean value.
    Bool(bool),
    /// Dates, durations, and error values, kept in their display form.
    Other(String),
}

impl CellValue {
    /// Returns the trimmed text when the cell holds a non-blank string.
    pub fn as_label(&self) -> Option<&str> {
        match self {
            CellValue::Text(value) => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then_some(trimmed)
            }
            _ => None,
        }
    }

    /// Whether the cell carries no visible content.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

/// A single scanned worksheet row reduced to the two columns the reconciler
/// cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 1-based row number in the originating sheet.
    pub row: u32,
    /// Value of the category column.
    pub category: CellValue,
    /// Value of the leaf (subcategory) column.
    pub leaf: CellValue,
    /// True when every cell of the row is empty, not only the two above.
    pub blank: bool,
}

impl SourceRow {
    /// Builds a row. `blank` covers the whole row, so the reader has to
    /// compute it from every used column.
    pub fn new(row: u32, category: CellValue, leaf: CellValue, blank: bool) -> Self {
        Self {
            row,
            category,
            leaf,
            blank,
        }
    }
}

/// Labeled rows of one expense sheet. The name doubles as the group name of
/// every entry discovered in it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub name: String,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn new(name: impl Into<String>, rows: Vec<SourceRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Composite identity of a [`CategoryEntry`].
pub type CategoryKey = (String, String, String);

/// One line of the category reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    /// Top-level group, usually the sheet the entry was found in.
    pub group_name: String,
    /// Mid-level category; empty when the group has none.
    pub category: String,
    /// Leaf label.
    pub subcategory: String,
    /// Row the entry was first seen at, `0` when unknown.
    pub source_row: u32,
}

impl CategoryEntry {
    pub fn new(
        group_name: impl Into<String>,
        category: impl Into<String>,
        subcategory: impl Into<String>,
        source_row: u32,
    ) -> Self {
        Self {
            group_name: group_name.into(),
            category: category.into(),
            subcategory: subcategory.into(),
            source_row,
        }
    }

    /// Returns the deduplication key. `source_row` is not part of it.
    pub fn key(&self) -> CategoryKey {
        (
            self.group_name.clone(),
            self.category.clone(),
            self.subcategory.clone(),
        )
    }
}

/// Leaves appended for a group that has no scannable sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementGroup {
    pub group: String,
    pub leaves: Vec<String>,
}

impl SupplementGroup {
    pub fn new<I, S>(group: impl Into<String>, leaves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            group: group.into(),
            leaves: leaves.into_iter().map(Into::into).collect(),
        }
    }

    /// Expands the group into reference entries with an empty category.
    pub fn entries(&self) -> impl Iterator<Item = CategoryEntry> + '_ {
        self.leaves
            .iter()
            .map(|leaf| CategoryEntry::new(self.group.clone(), "", leaf.trim(), 0))
    }
}

/// Insertion-ordered set of reference entries where the first occurrence of a
/// key wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    entries: Vec<CategoryEntry>,
    keys: HashSet<CategoryKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the entry unless its key is already present. Returns whether the
    /// entry was added.
    pub fn insert(&mut self, entry: CategoryEntry) -> bool {
        if !self.keys.insert(entry.key()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entries(&self) -> &[CategoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries per group, in the order groups were first seen.
    pub fn group_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for entry in &self.entries {
            match counts
                .iter_mut()
                .find(|(group, _)| *group == entry.group_name)
            {
                Some((_, count)) => *count += 1,
                None => counts.push((entry.group_name.clone(), 1)),
            }
        }
        counts
    }
}
