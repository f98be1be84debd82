use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Table, Workbook};

use crate::budget::tools::error::Result;
use crate::budget::tools::io::REFERENCE_HEADERS;
use crate::budget::tools::model::Registry;

/// Writes the registry as a standalone workbook with a single filterable
/// table. The budget workbook itself is never touched.
pub fn write_registry(path: &Path, sheet_name: &str, registry: &Registry) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x366092))
        .set_align(FormatAlign::Center);
    let group_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xD9E1F2))
        .set_border(FormatBorder::Thin);
    let body_format = Format::new().set_border(FormatBorder::Thin);

    for (col_idx, header) in REFERENCE_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, *header, &header_format)?;
    }

    let mut previous_group: Option<&str> = None;
    for (row_idx, entry) in registry.entries().iter().enumerate() {
        let row = (row_idx + 1) as u32;
        let lead_format = if previous_group != Some(entry.group_name.as_str()) {
            previous_group = Some(entry.group_name.as_str());
            &group_format
        } else {
            &body_format
        };

        worksheet.write_string_with_format(row, 0, &entry.group_name, lead_format)?;
        worksheet.write_string_with_format(row, 1, &entry.category, &body_format)?;
        worksheet.write_string_with_format(row, 2, &entry.subcategory, &body_format)?;
        if entry.source_row > 0 {
            worksheet.write_number_with_format(row, 3, entry.source_row, &body_format)?;
        } else {
            worksheet.write_blank(row, 3, &body_format)?;
        }
    }

    for (col_idx, width) in [20.0, 25.0, 30.0, 15.0].into_iter().enumerate() {
        worksheet.set_column_width(col_idx as u16, width)?;
    }

    let mut table = Table::new();
    table.set_autofilter(true);
    let col_end = (REFERENCE_HEADERS.len() as u16).saturating_sub(1);
    let row_end = registry.len().max(1) as u32;
    worksheet.add_table(0, 0, row_end, col_end, &table)?;

    workbook.save(path)?;
    Ok(())
}

/// Writes the registry as pretty-printed JSON.
pub fn write_registry_json(path: &Path, registry: &Registry) -> Result<()> {
    let json = serde_json::to_string_pretty(registry.entries())?;
    std::fs::write(path, json)?;
    Ok(())
}
