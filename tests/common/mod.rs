#![allow(dead_code)]

use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

/// (category column, subcategory column, January amount) for one sheet row.
type FixtureRow<'a> = (Option<&'a str>, Option<&'a str>, Option<f64>);

/// Writes a small copy of the household budget workbook:
///
/// * `Fixas`, `Extras`, `Adicionais` start their month blocks at column C,
///   `Variáveis` at column D.
/// * Month labels in row 1 are merged across three columns.
/// * `Fixas` merges its first category label over A3:A5, repeats `Netflix`,
///   and stores a numeric placeholder in the subcategory column.
pub fn write_budget_fixture(path: &Path) {
    let mut workbook = Workbook::new();

    let fixas = named_sheet(&mut workbook, "Fixas");
    write_month_headers(fixas, 2);
    fixas
        .merge_range(2, 0, 4, 0, "Habitação", &Format::new())
        .expect("label merged");
    write_rows(
        fixas,
        2,
        &[
            (None, Some("Aluguel"), Some(1500.0)),
            (None, Some("Condomínio"), Some(420.0)),
            (None, Some("Internet"), None),
            (Some("Lazer"), Some("Netflix"), Some(55.9)),
            (None, Some("Netflix"), None),
            (None, None, Some(0.0)),
            (Some("Saúde"), None, None),
            (Some("Impostos"), Some("IPTU"), Some(230.0)),
        ],
    );
    fixas.write_number(7, 1, 0.0).expect("placeholder written");

    let variaveis = named_sheet(&mut workbook, "Variáveis");
    write_month_headers(variaveis, 3);
    write_rows(
        variaveis,
        3,
        &[
            (Some("Transporte"), Some("Uber/Taxi"), Some(32.5)),
            (None, Some("Metrô"), None),
            (Some("Saúde"), Some("Dentista"), None),
        ],
    );

    let extras = named_sheet(&mut workbook, "Extras");
    write_month_headers(extras, 2);
    write_rows(
        extras,
        2,
        &[
            (Some("Saúde"), Some("Dentista"), Some(300.0)),
            (None, Some("Médico"), None),
        ],
    );

    let adicionais = named_sheet(&mut workbook, "Adicionais");
    write_month_headers(adicionais, 2);
    write_rows(
        adicionais,
        2,
        &[
            (Some("Lazer"), Some("Viagens"), None),
            (None, None, None),
            (None, Some("Cinema/teatro"), Some(80.0)),
        ],
    );

    let receitas = named_sheet(&mut workbook, "Receitas");
    receitas.write_string(0, 0, "Receitas").expect("cell written");

    let listas = named_sheet(&mut workbook, "Listas de itens");
    listas.write_string(0, 0, "Salário").expect("cell written");

    workbook.save(path).expect("fixture saved");
}

/// Entries the default layout derives from [`write_budget_fixture`]: scanned
/// rows first, then the built-in `Receitas` and `Investimentos` supplement.
pub const EXPECTED_SCANNED: [(&str, &str, &str, u32); 12] = [
    ("Fixas", "Habitação", "Aluguel", 3),
    ("Fixas", "Habitação", "Condomínio", 4),
    ("Fixas", "Habitação", "Internet", 5),
    ("Fixas", "Lazer", "Netflix", 6),
    ("Fixas", "Impostos", "IPTU", 10),
    ("Variáveis", "Transporte", "Uber/Taxi", 3),
    ("Variáveis", "Transporte", "Metrô", 4),
    ("Variáveis", "Saúde", "Dentista", 5),
    ("Extras", "Saúde", "Dentista", 3),
    ("Extras", "Saúde", "Médico", 4),
    ("Adicionais", "Lazer", "Viagens", 3),
    ("Adicionais", "Lazer", "Cinema/teatro", 5),
];

pub const SUPPLEMENT_COUNT: usize = 13;

/// Reads a single cell (1-based coordinates) as a string; empty when absent.
pub fn cell_text(path: &Path, sheet: &str, row: u32, col: u32) -> String {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("workbook opened");
    let range = workbook
        .worksheet_range(sheet)
        .expect("sheet present")
        .expect("sheet read");
    match range.get_value((row - 1, col - 1)) {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("workbook opened");
    workbook.sheet_names().to_vec()
}

fn named_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> &'a mut Worksheet {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(name).expect("sheet named");
    worksheet
}

fn write_month_headers(worksheet: &mut Worksheet, first_col: u16) {
    for (idx, month) in ["Janeiro", "Fevereiro"].into_iter().enumerate() {
        let col = first_col + (idx as u16) * 3;
        worksheet
            .merge_range(0, col, 0, col + 2, month, &Format::new())
            .expect("month merged");
        worksheet.write_string(1, col, "Item").expect("cell written");
        worksheet.write_string(1, col + 1, "Data").expect("cell written");
        worksheet.write_string(1, col + 2, "Valor").expect("cell written");
    }
}

fn write_rows(worksheet: &mut Worksheet, first_month_col: u16, rows: &[FixtureRow<'_>]) {
    for (idx, (category, leaf, amount)) in rows.iter().enumerate() {
        let row = 2 + idx as u32;
        if let Some(category) = category {
            worksheet.write_string(row, 0, *category).expect("cell written");
        }
        if let Some(leaf) = leaf {
            worksheet.write_string(row, 1, *leaf).expect("cell written");
        }
        if let Some(amount) = amount {
            worksheet
                .write_number(row, first_month_col + 2, *amount)
                .expect("cell written");
        }
    }
}
