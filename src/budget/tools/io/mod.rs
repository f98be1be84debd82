pub mod excel_read;
pub mod excel_write;
pub mod workbook_edit;

/// Column headers of the category reference table.
pub const REFERENCE_HEADERS: [&str; 4] = [
    "Tipo Principal",
    "Categoria",
    "Sub-categoria",
    "Linha na Planilha",
];
