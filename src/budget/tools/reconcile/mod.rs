use tracing::{debug, trace};

use crate::budget::tools::layout::EndOfData;
use crate::budget::tools::model::{CategoryEntry, Registry, SourceTable, SupplementGroup};

/// Scans the source tables in order, then appends the supplement groups, and
/// returns the deduplicated reference registry.
pub fn reconcile(
    tables: &[SourceTable],
    supplement: &[SupplementGroup],
    end_of_data: EndOfData,
) -> Registry {
    let mut registry = Registry::new();

    for table in tables {
        let mut added = 0usize;
        for entry in scan_table(table, end_of_data) {
            if registry.insert(entry) {
                added += 1;
            }
        }
        debug!(sheet = %table.name, added, "scanned source table");
    }

    for group in supplement {
        let added = group
            .entries()
            .filter(|entry| !entry.subcategory.is_empty())
            .filter(|entry| registry.insert(entry.clone()))
            .count();
        debug!(group = %group.group, added, "merged supplement group");
    }

    registry
}

/// Emits one candidate entry per row with a text leaf, tagging it with the
/// category most recently seen above it.
///
/// Rows are expected in sheet order, already starting at the first data row.
/// Duplicates are not removed here.
pub fn scan_table(table: &SourceTable, end_of_data: EndOfData) -> Vec<CategoryEntry> {
    let mut current_category: Option<&str> = None;
    let mut candidates = Vec::new();

    for row in &table.rows {
        if end_of_data == EndOfData::FirstBlankRow && row.blank {
            trace!(sheet = %table.name, row = row.row, "blank row ends scan");
            break;
        }

        if let Some(category) = row.category.as_label() {
            current_category = Some(category);
        }

        let Some(leaf) = row.leaf.as_label() else {
            continue;
        };

        trace!(
            sheet = %table.name,
            row = row.row,
            category = current_category.unwrap_or("(no category)"),
            leaf,
            "found subcategory"
        );
        candidates.push(CategoryEntry::new(
            table.name.clone(),
            current_category.unwrap_or_default(),
            leaf,
            row.row,
        ));
    }

    candidates
}
