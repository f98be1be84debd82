use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::budget::tools::backup::create_backup;
use crate::budget::tools::error::{Result, ToolError};
use crate::budget::tools::io::excel_read;
use crate::budget::tools::io::excel_write;
use crate::budget::tools::io::workbook_edit::{self, ColumnShiftReport, UnmergeReport};
use crate::budget::tools::layout::WorkbookLayout;
use crate::budget::tools::model::Registry;
use crate::budget::tools::reconcile::reconcile;
use crate::budget::tools::resolve::{ReferenceIndex, Resolution};

/// Options shared by the operations that rewrite the workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Copy the workbook aside before saving.
    pub backup: bool,
    /// Compute everything but leave the file untouched.
    pub dry_run: bool,
}

/// What a reference rebuild produced.
#[derive(Debug, Clone)]
pub struct RebuildReport {
    pub registry: Registry,
    /// False on dry runs.
    pub saved: bool,
    pub backup: Option<PathBuf>,
}

impl RebuildReport {
    pub fn group_counts(&self) -> Vec<(String, usize)> {
        self.registry.group_counts()
    }
}

/// Output of a workbook rewrite that reports per sheet.
#[derive(Debug, Clone)]
pub struct SheetReports<T> {
    pub sheets: Vec<T>,
    pub backup: Option<PathBuf>,
}

/// Format of an exported reference table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Json,
}

/// Scans the expense sheets and merges the supplement list, without touching
/// the workbook.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display()))]
pub fn collect_registry(workbook: &Path, layout: &WorkbookLayout) -> Result<Registry> {
    ensure_exists(workbook)?;
    let tables = excel_read::read_source_tables(workbook, layout)?;
    let registry = reconcile(&tables, &layout.supplement, layout.end_of_data);
    info!(
        sheet_count = tables.len(),
        entry_count = registry.len(),
        "reconciled category registry"
    );
    Ok(registry)
}

/// Rebuilds the category reference sheet from the expense sheets.
///
/// Every source sheet is read and validated before the workbook is opened for
/// writing, so a missing sheet leaves the file untouched.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display(), dry_run = options.dry_run))]
pub fn rebuild_reference(
    workbook: &Path,
    layout: &WorkbookLayout,
    options: SaveOptions,
) -> Result<RebuildReport> {
    let registry = collect_registry(workbook, layout)?;
    if options.dry_run {
        return Ok(RebuildReport {
            registry,
            saved: false,
            backup: None,
        });
    }

    let mut book = workbook_edit::open_workbook(workbook)?;
    let rows = workbook_edit::replace_reference_sheet(&mut book, &layout.reference_sheet, &registry)?;
    debug!(rows, sheet = %layout.reference_sheet, "reference sheet rendered");
    let backup = save(&book, workbook, options)?;

    Ok(RebuildReport {
        registry,
        saved: true,
        backup,
    })
}

/// Unmerges every range reaching the month columns of the expense sheets.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display()))]
pub fn unmerge_data_columns(
    workbook: &Path,
    layout: &WorkbookLayout,
    options: SaveOptions,
) -> Result<SheetReports<UnmergeReport>> {
    let mut book = workbook_edit::open_workbook(workbook)?;
    let sheets = workbook_edit::unmerge_data_columns(
        &mut book,
        &layout.expense_sheets,
        layout.first_data_column,
    )?;
    let total: usize = sheets.iter().map(|report| report.unmerged.len()).sum();
    info!(total, "unmerged ranges across sheets");

    let backup = if options.dry_run {
        None
    } else {
        save(&book, workbook, options)?
    };
    Ok(SheetReports { sheets, backup })
}

/// Inserts the spacer column so every expense sheet starts its month blocks
/// at the same column.
#[instrument(level = "info", skip_all, fields(workbook = %workbook.display()))]
pub fn standardize_columns(
    workbook: &Path,
    layout: &WorkbookLayout,
    options: SaveOptions,
) -> Result<SheetReports<ColumnShiftReport>> {
    let mut book = workbook_edit::open_workbook(workbook)?;
    let sheets = workbook_edit::insert_spacer_column(
        &mut book,
        &layout.sheets_to_standardize,
        layout.spacer_column,
        layout.header_row,
    )?;

    let changed = sheets.iter().any(|report| report.shifted);
    let backup = if options.dry_run || !changed {
        None
    } else {
        save(&book, workbook, options)?
    };
    Ok(SheetReports { sheets, backup })
}

/// Looks a subcategory up in the reference sheet.
#[instrument(level = "info", skip(workbook, layout), fields(workbook = %workbook.display()))]
pub fn lookup_subcategory(
    workbook: &Path,
    layout: &WorkbookLayout,
    subcategory: &str,
    group: Option<&str>,
) -> Result<Resolution> {
    ensure_exists(workbook)?;
    let entries = excel_read::read_reference_entries(workbook, &layout.reference_sheet)?;
    let index = ReferenceIndex::new(entries);
    if index.is_empty() {
        warn!(
            sheet = %layout.reference_sheet,
            "reference sheet has no entries, run rebuild-reference first"
        );
    }
    debug!(entry_count = index.len(), "reference index built");
    index.resolve(subcategory, group)
}

/// Writes the reconciled registry to a separate file.
#[instrument(
    level = "info",
    skip_all,
    fields(workbook = %workbook.display(), output = %output.display(), ?format)
)]
pub fn export_reference(
    workbook: &Path,
    layout: &WorkbookLayout,
    output: &Path,
    format: ExportFormat,
) -> Result<Registry> {
    let registry = collect_registry(workbook, layout)?;
    match format {
        ExportFormat::Xlsx => {
            excel_write::write_registry(output, &layout.reference_sheet, &registry)?
        }
        ExportFormat::Json => excel_write::write_registry_json(output, &registry)?,
    }
    Ok(registry)
}

fn save(
    book: &umya_spreadsheet::Spreadsheet,
    workbook: &Path,
    options: SaveOptions,
) -> Result<Option<PathBuf>> {
    let backup = if options.backup {
        Some(create_backup(workbook)?)
    } else {
        None
    };
    workbook_edit::save_workbook(book, workbook)?;
    Ok(backup)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(ToolError::MissingInput(path.to_path_buf()))
    }
}
