use std::collections::HashMap;

use crate::budget::tools::error::{Result, ToolError};
use crate::budget::tools::model::CategoryEntry;

/// Separator between a subcategory and its detail, as in `"Orion - Consultas"`.
const DETAIL_SEPARATOR: &str = " - ";

/// Result of looking a subcategory up in the reference table.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exactly one reference row matches.
    Unique(CategoryEntry),
    /// Several rows match; the caller has to pick one.
    Ambiguous(Vec<CategoryEntry>),
}

/// Subcategory name -> every reference row carrying it, in sheet order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    by_subcategory: HashMap<String, Vec<CategoryEntry>>,
}

impl ReferenceIndex {
    pub fn new(entries: impl IntoIterator<Item = CategoryEntry>) -> Self {
        let mut by_subcategory: HashMap<String, Vec<CategoryEntry>> = HashMap::new();
        for entry in entries {
            by_subcategory
                .entry(entry.subcategory.clone())
                .or_default()
                .push(entry);
        }
        Self { by_subcategory }
    }

    pub fn len(&self) -> usize {
        self.by_subcategory.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_subcategory.is_empty()
    }

    /// Resolves `name`, retrying with its parent when `name` has the
    /// `"<parent> - <detail>"` form and is not listed itself. `group`, when
    /// given, restricts the candidates to one group.
    pub fn resolve(&self, name: &str, group: Option<&str>) -> Result<Resolution> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ToolError::EmptySubcategory);
        }

        if let Some(resolution) = self.lookup(name, group) {
            return Ok(resolution);
        }
        let parent = parent_subcategory(name);
        if parent != name {
            if let Some(resolution) = self.lookup(parent, group) {
                return Ok(resolution);
            }
        }
        Err(ToolError::SubcategoryNotFound(name.to_string()))
    }

    fn lookup(&self, name: &str, group: Option<&str>) -> Option<Resolution> {
        let mut options: Vec<CategoryEntry> = self
            .by_subcategory
            .get(name)?
            .iter()
            .filter(|entry| group.is_none_or(|group| entry.group_name == group))
            .cloned()
            .collect();
        match options.len() {
            0 => None,
            1 => options.pop().map(Resolution::Unique),
            _ => Some(Resolution::Ambiguous(options)),
        }
    }
}

/// `"Orion - Consultas"` -> `"Orion"`; names without a detail are returned
/// unchanged.
pub fn parent_subcategory(name: &str) -> &str {
    match name.split_once(DETAIL_SEPARATOR) {
        Some((parent, _)) => parent.trim(),
        None => name,
    }
}
