use std::path::Path;

use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::budget::tools::error::{Result, ToolError};
use crate::budget::tools::layout::WorkbookLayout;
use crate::budget::tools::model::{CategoryEntry, CellValue, SourceRow, SourceTable};

/// First row of entries in the reference sheet (title, description, blank
/// spacer, and header rows precede it).
pub const REFERENCE_FIRST_ROW: u32 = 5;

/// Reads every expense sheet named by the layout as a source table.
///
/// All sheets are checked before any is read so that a missing one fails the
/// whole run up front.
pub fn read_source_tables(path: &Path, layout: &WorkbookLayout) -> Result<Vec<SourceTable>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    ensure_sheets_exist(&workbook, &layout.expense_sheets)?;

    let mut tables = Vec::with_capacity(layout.expense_sheets.len());
    for sheet_name in &layout.expense_sheets {
        let range = read_required_sheet(&mut workbook, sheet_name)?;
        let rows = extract_rows(&range, layout);
        debug!(sheet = %sheet_name, rows = rows.len(), "read source sheet");
        tables.push(SourceTable::new(sheet_name.clone(), rows));
    }
    Ok(tables)
}

/// Reads the reference sheet back into entries. Rows without a group or a
/// subcategory are skipped.
pub fn read_reference_entries(path: &Path, sheet_name: &str) -> Result<Vec<CategoryEntry>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = read_required_sheet(&mut workbook, sheet_name)?;
    let Some((_, last_row)) = used_rows(&range) else {
        return Ok(Vec::new());
    };

    let mut entries = Vec::new();
    for row in (REFERENCE_FIRST_ROW - 1)..=last_row {
        let group = cell_to_string(range.get_value((row, 0)));
        let category = cell_to_string(range.get_value((row, 1)));
        let subcategory = cell_to_string(range.get_value((row, 2)));
        if group.is_empty() || subcategory.is_empty() {
            continue;
        }
        let source_row = cell_to_string(range.get_value((row, 3)))
            .parse::<f64>()
            .map(|value| value as u32)
            .unwrap_or(0);
        entries.push(CategoryEntry::new(group, category, subcategory, source_row));
    }

    debug!(sheet = %sheet_name, entries = entries.len(), "read reference sheet");
    Ok(entries)
}

fn ensure_sheets_exist<R: std::io::Read + std::io::Seek>(
    workbook: &Xlsx<R>,
    required: &[String],
) -> Result<()> {
    let available = workbook.sheet_names();
    match required.iter().find(|name| !available.contains(name)) {
        Some(missing) => Err(ToolError::MissingSheet(missing.clone())),
        None => Ok(()),
    }
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Rows from the layout's first data row through the last used row, in
/// absolute (0-based) coordinates.
fn extract_rows(range: &Range<DataType>, layout: &WorkbookLayout) -> Vec<SourceRow> {
    let Some((first_col, last_row)) = used_rows(range) else {
        return Vec::new();
    };
    let last_col = range.end().map(|(_, col)| col).unwrap_or(first_col);
    let category_col = layout.category_column - 1;
    let leaf_col = layout.leaf_column - 1;

    ((layout.first_data_row - 1)..=last_row)
        .map(|row| {
            let blank = (first_col..=last_col)
                .all(|col| to_cell_value(range.get_value((row, col))).is_blank());
            SourceRow::new(
                row + 1,
                to_cell_value(range.get_value((row, category_col))),
                to_cell_value(range.get_value((row, leaf_col))),
                blank,
            )
        })
        .collect()
}

/// First used column and last used row, or `None` for an empty sheet.
fn used_rows(range: &Range<DataType>) -> Option<(u32, u32)> {
    let (_, first_col) = range.start()?;
    let (last_row, _) = range.end()?;
    Some((first_col, last_row))
}

fn to_cell_value(cell: Option<&DataType>) -> CellValue {
    match cell {
        Some(DataType::String(value)) => CellValue::Text(value.clone()),
        Some(DataType::Float(value)) => CellValue::Number(*value),
        Some(DataType::Int(value)) => CellValue::Number(*value as f64),
        Some(DataType::Bool(value)) => CellValue::Bool(*value),
        Some(DataType::Empty) | None => CellValue::Empty,
        Some(other) => CellValue::Other(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.trim().to_string(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
