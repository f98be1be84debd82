//! Load-mutate-save access to the budget workbook.
//!
//! The read-only scan goes through calamine; everything that has to rewrite
//! the workbook while keeping the other sheets intact goes through
//! umya-spreadsheet, which loads the whole package and writes it back.

use std::path::Path;

use tracing::{debug, info};
use umya_spreadsheet::helper::coordinate::string_from_column_index;
use umya_spreadsheet::{
    Border, HorizontalAlignmentValues, Range, Spreadsheet, VerticalAlignmentValues, Worksheet,
};

use crate::budget::tools::error::{Result, ToolError};
use crate::budget::tools::io::REFERENCE_HEADERS;
use crate::budget::tools::io::excel_read::REFERENCE_FIRST_ROW;
use crate::budget::tools::model::Registry;

const TITLE: &str = "REFERÊNCIA DE CATEGORIAS E SUB-CATEGORIAS";
const DESCRIPTION: &str =
    "Esta planilha lista todas as categorias e sub-categorias encontradas nas planilhas de despesas";
const HEADER_ROW: u32 = 4;
const HEADER_FILL: &str = "FF366092";
const GROUP_FILL: &str = "FFD9E1F2";
const CATEGORY_FILL: &str = "FFE7E6E6";
const WHITE: &str = "FFFFFFFF";
const COLUMN_WIDTHS: [(&str, f64); 4] = [("A", 20.0), ("B", 25.0), ("C", 30.0), ("D", 15.0)];
/// Header columns echoed back after a column shift (A..I).
const VERIFY_COLUMNS: u32 = 9;

/// Outcome of unmerging one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmergeReport {
    pub sheet: String,
    pub merged_before: usize,
    pub unmerged: Vec<String>,
    pub remaining: usize,
}

/// Outcome of the spacer-column insertion on one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnShiftReport {
    pub sheet: String,
    /// False when the sheet already had a blank spacer column.
    pub shifted: bool,
    /// Non-empty header labels of columns A..I after the operation.
    pub header_labels: Vec<(String, String)>,
}

pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    umya_spreadsheet::reader::xlsx::read(path).map_err(ToolError::edit)
}

pub fn save_workbook(book: &Spreadsheet, path: &Path) -> Result<()> {
    umya_spreadsheet::writer::xlsx::write(book, path).map_err(ToolError::edit)?;
    info!(path = %path.display(), "workbook saved");
    Ok(())
}

/// Fails with the first sheet name absent from the workbook.
pub fn require_sheets(book: &Spreadsheet, names: &[String]) -> Result<()> {
    match names
        .iter()
        .find(|name| book.get_sheet_by_name(name).is_none())
    {
        Some(missing) => Err(ToolError::MissingSheet(missing.clone())),
        None => Ok(()),
    }
}

/// Drops the reference sheet (when present) and renders the registry into a
/// freshly created one. Returns the number of entry rows written.
pub fn replace_reference_sheet(
    book: &mut Spreadsheet,
    sheet_name: &str,
    registry: &Registry,
) -> Result<usize> {
    if book.get_sheet_by_name(sheet_name).is_some() {
        book.remove_sheet_by_name(sheet_name)
            .map_err(ToolError::edit)?;
        debug!(sheet = %sheet_name, "removed previous reference sheet");
    }
    let sheet = book.new_sheet(sheet_name).map_err(ToolError::edit)?;

    write_preamble(sheet);

    let mut row = REFERENCE_FIRST_ROW;
    let mut current_group: Option<&str> = None;
    for entry in registry.entries() {
        sheet
            .get_cell_mut((1, row))
            .set_value(entry.group_name.as_str());
        sheet.get_cell_mut((2, row)).set_value(entry.category.as_str());
        sheet
            .get_cell_mut((3, row))
            .set_value(entry.subcategory.as_str());
        if entry.source_row > 0 {
            sheet.get_cell_mut((4, row)).set_value_number(entry.source_row);
        }

        if current_group != Some(entry.group_name.as_str()) {
            current_group = Some(entry.group_name.as_str());
            let style = sheet.get_style_mut((1, row));
            style.set_background_color(GROUP_FILL);
            style.get_font_mut().set_bold(true).set_size(10.0);
        }
        if !entry.category.is_empty() {
            sheet
                .get_style_mut((2, row))
                .set_background_color(CATEGORY_FILL);
        }
        for col in 1..=4 {
            set_thin_border(sheet, col, row);
        }
        let alignment = sheet.get_style_mut((3, row)).get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Left);
        alignment.set_vertical(VerticalAlignmentValues::Center);

        row += 1;
    }

    for (column, width) in COLUMN_WIDTHS {
        sheet.get_column_dimension_mut(column).set_width(width);
    }

    Ok(registry.len())
}

/// Removes every merged range that reaches `first_data_column` or beyond on
/// the given sheets. Merges confined to the label columns are kept. Cell
/// values and styles are left as they are, so the top-left cell keeps both.
pub fn unmerge_data_columns(
    book: &mut Spreadsheet,
    sheets: &[String],
    first_data_column: u32,
) -> Result<Vec<UnmergeReport>> {
    require_sheets(book, sheets)?;

    let mut reports = Vec::with_capacity(sheets.len());
    for sheet_name in sheets {
        let sheet = sheet_mut(book, sheet_name)?;

        let merged_before = sheet.get_merge_cells().len();
        let unmerged: Vec<String> = sheet
            .get_merge_cells()
            .iter()
            .filter(|range| last_column(range) >= first_data_column)
            .map(Range::get_range)
            .collect();

        sheet
            .get_merge_cells_mut()
            .retain(|range| last_column(range) < first_data_column);
        let remaining = sheet.get_merge_cells().len();

        for reference in &unmerged {
            debug!(sheet = %sheet_name, range = %reference, "unmerged range");
        }
        info!(
            sheet = %sheet_name,
            before = merged_before,
            unmerged = unmerged.len(),
            remaining,
            "unmerged data columns"
        );

        reports.push(UnmergeReport {
            sheet: sheet_name.clone(),
            merged_before,
            unmerged,
            remaining,
        });
    }
    Ok(reports)
}

/// Inserts one blank column at `spacer_column` on each sheet whose header
/// cell at that position still holds a label, shifting everything from that
/// column to the right.
pub fn insert_spacer_column(
    book: &mut Spreadsheet,
    sheets: &[String],
    spacer_column: u32,
    header_row: u32,
) -> Result<Vec<ColumnShiftReport>> {
    require_sheets(book, sheets)?;

    let mut reports = Vec::with_capacity(sheets.len());
    for sheet_name in sheets {
        let sheet = sheet_mut(book, sheet_name)?;
        let needs_shift = !sheet
            .get_value((spacer_column, header_row))
            .trim()
            .is_empty();

        if needs_shift {
            sheet.insert_new_column_by_index(&spacer_column, &1);
            info!(
                sheet = %sheet_name,
                column = %string_from_column_index(&spacer_column),
                "inserted spacer column"
            );
        } else {
            info!(sheet = %sheet_name, "spacer column already present");
        }

        let header_labels = (1..=VERIFY_COLUMNS)
            .filter_map(|col| {
                let value = sheet.get_value((col, header_row));
                let value = value.trim();
                (!value.is_empty()).then(|| (string_from_column_index(&col), value.to_string()))
            })
            .collect();

        reports.push(ColumnShiftReport {
            sheet: sheet_name.clone(),
            shifted: needs_shift,
            header_labels,
        });
    }
    Ok(reports)
}

/// Rightmost column a merged range covers. Whole-row ranges carry no column
/// and span every column.
fn last_column(range: &Range) -> u32 {
    range
        .get_coordinate_end_col()
        .or_else(|| range.get_coordinate_start_col())
        .map_or(u32::MAX, |column| *column.get_num())
}

fn sheet_mut<'a>(book: &'a mut Spreadsheet, name: &str) -> Result<&'a mut Worksheet> {
    book.get_sheet_by_name_mut(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))
}

fn write_preamble(sheet: &mut Worksheet) {
    sheet.get_cell_mut((1, 1)).set_value(TITLE);
    let title = sheet.get_style_mut((1, 1));
    title.get_font_mut().set_bold(true).set_size(14.0);
    title
        .get_alignment_mut()
        .set_horizontal(HorizontalAlignmentValues::Center);
    sheet.add_merge_cells("A1:D1");

    sheet.get_cell_mut((1, 2)).set_value(DESCRIPTION);
    sheet
        .get_style_mut((1, 2))
        .get_font_mut()
        .set_italic(true)
        .set_size(10.0);
    sheet.add_merge_cells("A2:D2");

    for (idx, header) in REFERENCE_HEADERS.iter().enumerate() {
        let col = idx as u32 + 1;
        sheet.get_cell_mut((col, HEADER_ROW)).set_value(*header);
        let style = sheet.get_style_mut((col, HEADER_ROW));
        style.set_background_color(HEADER_FILL);
        let font = style.get_font_mut();
        font.set_bold(true).set_size(12.0);
        font.get_color_mut().set_argb(WHITE);
        let alignment = style.get_alignment_mut();
        alignment.set_horizontal(HorizontalAlignmentValues::Center);
        alignment.set_vertical(VerticalAlignmentValues::Center);
    }
}

fn set_thin_border(sheet: &mut Worksheet, col: u32, row: u32) {
    let borders = sheet.get_style_mut((col, row)).get_borders_mut();
    borders.get_left_mut().set_border_style(Border::BORDER_THIN);
    borders.get_right_mut().set_border_style(Border::BORDER_THIN);
    borders.get_top_mut().set_border_style(Border::BORDER_THIN);
    borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
}
