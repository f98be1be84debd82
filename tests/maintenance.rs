mod common;

use std::fs;

use budget_tools::io::excel_read;
use budget_tools::io::workbook_edit;
use budget_tools::layout::{REFERENCE_SHEET, WorkbookLayout};
use budget_tools::maintenance::{self, ExportFormat, SaveOptions};
use budget_tools::model::CategoryEntry;
use budget_tools::resolve::Resolution;
use budget_tools::ToolError;
use common::{EXPECTED_SCANNED, SUPPLEMENT_COUNT, cell_text, sheet_names, write_budget_fixture};
use tempfile::tempdir;

fn save_options() -> SaveOptions {
    SaveOptions {
        backup: false,
        dry_run: false,
    }
}

#[test]
fn rebuild_reference_renders_scanned_and_supplement_entries() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let layout = WorkbookLayout::default();

    let report =
        maintenance::rebuild_reference(&path, &layout, save_options()).expect("reference rebuilt");
    assert!(report.saved);
    assert_eq!(report.registry.len(), EXPECTED_SCANNED.len() + SUPPLEMENT_COUNT);

    let entries =
        excel_read::read_reference_entries(&path, REFERENCE_SHEET).expect("reference read");
    let scanned: Vec<(&str, &str, &str, u32)> = entries
        .iter()
        .take(EXPECTED_SCANNED.len())
        .map(|entry| {
            (
                entry.group_name.as_str(),
                entry.category.as_str(),
                entry.subcategory.as_str(),
                entry.source_row,
            )
        })
        .collect();
    assert_eq!(scanned, EXPECTED_SCANNED.to_vec());

    let supplement = &entries[EXPECTED_SCANNED.len()..];
    assert_eq!(supplement.len(), SUPPLEMENT_COUNT);
    assert_eq!(supplement[0], CategoryEntry::new("Receitas", "", "Salário", 0));
    assert!(supplement.iter().all(|entry| entry.source_row == 0));

    assert_eq!(
        cell_text(&path, REFERENCE_SHEET, 1, 1),
        "REFERÊNCIA DE CATEGORIAS E SUB-CATEGORIAS"
    );
    assert_eq!(cell_text(&path, REFERENCE_SHEET, 4, 3), "Sub-categoria");

    let counts = report.group_counts();
    assert_eq!(counts[0], ("Fixas".to_string(), 5));
    assert_eq!(counts[4], ("Receitas".to_string(), 8));
    assert_eq!(counts[5], ("Investimentos".to_string(), 5));
}

#[test]
fn rebuild_keeps_other_sheets_and_is_repeatable() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let layout = WorkbookLayout::default();

    let first = maintenance::rebuild_reference(&path, &layout, save_options()).expect("first run");
    let second =
        maintenance::rebuild_reference(&path, &layout, save_options()).expect("second run");
    assert_eq!(first.registry, second.registry);

    let names = sheet_names(&path);
    for expected in ["Fixas", "Variáveis", "Extras", "Adicionais", "Receitas", "Listas de itens"] {
        assert!(names.iter().any(|name| name == expected), "{expected} kept");
    }
    assert_eq!(
        names.iter().filter(|name| *name == REFERENCE_SHEET).count(),
        1
    );
    assert_eq!(cell_text(&path, "Fixas", 3, 2), "Aluguel");
}

#[test]
fn missing_source_sheet_aborts_before_writing() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let before = fs::read(&path).expect("fixture bytes");
    let layout = WorkbookLayout {
        expense_sheets: vec!["Fixas".to_string(), "Investimentos".to_string()],
        ..WorkbookLayout::default()
    };

    let err = maintenance::rebuild_reference(&path, &layout, save_options()).unwrap_err();

    assert!(matches!(err, ToolError::MissingSheet(name) if name == "Investimentos"));
    assert_eq!(fs::read(&path).expect("fixture bytes"), before);
}

#[test]
fn missing_workbook_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("absent.xlsx");

    let err = maintenance::rebuild_reference(&path, &WorkbookLayout::default(), save_options())
        .unwrap_err();
    assert!(matches!(err, ToolError::MissingInput(_)));
}

#[test]
fn dry_run_leaves_workbook_untouched() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let before = fs::read(&path).expect("fixture bytes");

    let report = maintenance::rebuild_reference(
        &path,
        &WorkbookLayout::default(),
        SaveOptions {
            backup: true,
            dry_run: true,
        },
    )
    .expect("dry run");

    assert!(!report.saved);
    assert!(report.backup.is_none());
    assert_eq!(report.registry.len(), EXPECTED_SCANNED.len() + SUPPLEMENT_COUNT);
    assert_eq!(fs::read(&path).expect("fixture bytes"), before);
}

#[test]
fn backup_is_taken_before_saving() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);

    let report = maintenance::rebuild_reference(
        &path,
        &WorkbookLayout::default(),
        SaveOptions {
            backup: true,
            dry_run: false,
        },
    )
    .expect("reference rebuilt");

    let backup = report.backup.expect("backup path");
    assert!(backup.exists());
    let backup_sheets = sheet_names(&backup);
    assert!(!backup_sheets.iter().any(|name| name == REFERENCE_SHEET));
    let sheets = sheet_names(&path);
    assert!(sheets.iter().any(|name| name == REFERENCE_SHEET));
}

#[test]
fn first_blank_row_layout_stops_at_gap() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let layout = WorkbookLayout {
        expense_sheets: vec!["Adicionais".to_string()],
        supplement: Vec::new(),
        end_of_data: budget_tools::layout::EndOfData::FirstBlankRow,
        ..WorkbookLayout::default()
    };

    let registry = maintenance::collect_registry(&path, &layout).expect("registry collected");

    assert_eq!(
        registry.entries(),
        &[CategoryEntry::new("Adicionais", "Lazer", "Viagens", 3)]
    );
}

#[test]
fn unmerge_keeps_label_merges_only() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);

    let reports =
        maintenance::unmerge_data_columns(&path, &WorkbookLayout::default(), save_options())
            .expect("unmerged");

    let fixas = &reports.sheets[0];
    assert_eq!(fixas.sheet, "Fixas");
    assert_eq!(fixas.merged_before, 3);
    assert_eq!(fixas.unmerged.len(), 2);
    assert_eq!(fixas.remaining, 1);
    let total: usize = reports.sheets.iter().map(|sheet| sheet.unmerged.len()).sum();
    assert_eq!(total, 8);

    let book = workbook_edit::open_workbook(&path).expect("workbook reopened");
    let sheet = book.get_sheet_by_name("Fixas").expect("Fixas present");
    let kept: Vec<String> = sheet
        .get_merge_cells()
        .iter()
        .map(|range| range.get_range())
        .collect();
    assert_eq!(kept, vec!["A3:A5".to_string()]);
    assert_eq!(cell_text(&path, "Fixas", 1, 3), "Janeiro");
    assert_eq!(cell_text(&path, "Fixas", 3, 1), "Habitação");
}

#[test]
fn standardize_moves_month_blocks_once() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let layout = WorkbookLayout::default();

    let first = maintenance::standardize_columns(&path, &layout, save_options())
        .expect("columns standardized");
    assert!(first.sheets.iter().all(|sheet| sheet.shifted));
    assert!(
        first.sheets[0]
            .header_labels
            .contains(&("D".to_string(), "Janeiro".to_string()))
    );
    assert_eq!(cell_text(&path, "Fixas", 1, 3), "");
    assert_eq!(cell_text(&path, "Fixas", 1, 4), "Janeiro");
    assert_eq!(cell_text(&path, "Extras", 1, 4), "Janeiro");
    assert_eq!(cell_text(&path, "Variáveis", 1, 4), "Janeiro");
    assert_eq!(cell_text(&path, "Fixas", 3, 2), "Aluguel");

    let before_second = fs::read(&path).expect("workbook bytes");
    let second = maintenance::standardize_columns(&path, &layout, save_options())
        .expect("second standardization");
    assert!(second.sheets.iter().all(|sheet| !sheet.shifted));
    assert_eq!(fs::read(&path).expect("workbook bytes"), before_second);
}

#[test]
fn standardize_shifts_each_listed_sheet_on_its_own() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let layout = WorkbookLayout::default();

    let reports = maintenance::standardize_columns(&path, &layout, save_options())
        .expect("columns standardized");

    let shifted: Vec<(&str, bool)> = reports
        .sheets
        .iter()
        .map(|sheet| (sheet.sheet.as_str(), sheet.shifted))
        .collect();
    assert_eq!(
        shifted,
        vec![("Fixas", true), ("Extras", true), ("Adicionais", true)]
    );
    for sheet in ["Fixas", "Extras", "Adicionais"] {
        assert_eq!(cell_text(&path, sheet, 1, 3), "", "{sheet} spacer");
        assert_eq!(cell_text(&path, sheet, 1, 4), "Janeiro", "{sheet} months");
    }
    assert_eq!(cell_text(&path, "Variáveis", 1, 4), "Janeiro");
    assert_eq!(cell_text(&path, "Variáveis", 1, 5), "");
    assert_eq!(cell_text(&path, "Adicionais", 3, 2), "Viagens");
}

#[test]
fn lookup_resolves_against_rebuilt_reference() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let layout = WorkbookLayout::default();
    maintenance::rebuild_reference(&path, &layout, save_options()).expect("reference rebuilt");

    let unique = maintenance::lookup_subcategory(&path, &layout, "Netflix - Família", None)
        .expect("parent resolved");
    assert_eq!(
        unique,
        Resolution::Unique(CategoryEntry::new("Fixas", "Lazer", "Netflix", 6))
    );

    let ambiguous =
        maintenance::lookup_subcategory(&path, &layout, "Dentista", None).expect("resolved");
    assert!(matches!(ambiguous, Resolution::Ambiguous(options) if options.len() == 2));

    let err = maintenance::lookup_subcategory(&path, &layout, "Padaria", None).unwrap_err();
    assert!(matches!(err, ToolError::SubcategoryNotFound(_)));
}

#[test]
fn lookup_without_reference_sheet_fails() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);

    let err = maintenance::lookup_subcategory(&path, &WorkbookLayout::default(), "Luz", None)
        .unwrap_err();
    assert!(matches!(err, ToolError::MissingSheet(name) if name == REFERENCE_SHEET));
}

#[test]
fn lookup_in_empty_reference_finds_nothing() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(REFERENCE_SHEET).expect("sheet named");
    for (col, header) in ["Tipo Principal", "Categoria", "Sub-categoria", "Linha na Planilha"]
        .into_iter()
        .enumerate()
    {
        worksheet
            .write_string(3, col as u16, header)
            .expect("header written");
    }
    workbook.save(&path).expect("workbook saved");

    let err = maintenance::lookup_subcategory(&path, &WorkbookLayout::default(), "Luz", None)
        .unwrap_err();
    assert!(matches!(err, ToolError::SubcategoryNotFound(name) if name == "Luz"));
}

#[test]
fn export_writes_json_and_xlsx_without_touching_workbook() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("budget.xlsx");
    write_budget_fixture(&path);
    let before = fs::read(&path).expect("fixture bytes");
    let layout = WorkbookLayout::default();

    let json_path = temp_dir.path().join("reference.json");
    let registry =
        maintenance::export_reference(&path, &layout, &json_path, ExportFormat::Json)
            .expect("JSON exported");
    let written = fs::read_to_string(&json_path).expect("JSON read");
    let parsed: Vec<CategoryEntry> = serde_json::from_str(&written).expect("JSON parsed");
    assert_eq!(parsed.as_slice(), registry.entries());

    let xlsx_path = temp_dir.path().join("reference.xlsx");
    maintenance::export_reference(&path, &layout, &xlsx_path, ExportFormat::Xlsx)
        .expect("xlsx exported");
    assert_eq!(cell_text(&xlsx_path, REFERENCE_SHEET, 1, 1), "Tipo Principal");
    assert_eq!(cell_text(&xlsx_path, REFERENCE_SHEET, 2, 3), "Aluguel");
    assert_eq!(cell_text(&xlsx_path, REFERENCE_SHEET, 2, 4), "3");

    assert_eq!(fs::read(&path).expect("fixture bytes"), before);
}
