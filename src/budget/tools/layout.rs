//! Describes where things live inside the budget workbook.
//!
//! Every sheet name, column position, and header offset used by the
//! maintenance operations is read from a [`WorkbookLayout`]. The default
//! layout matches the household budget workbook; a JSON file with the same
//! shape can override any field.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::budget::tools::error::{Result, ToolError};
use crate::budget::tools::model::SupplementGroup;

/// Sheet rebuilt by the reconciler and read back by the resolver.
pub const REFERENCE_SHEET: &str = "Referência de Categorias";

/// How the scanner decides where a source sheet's data ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndOfData {
    /// Scan through the last used row of the sheet.
    #[default]
    UsedRange,
    /// Stop at the first fully blank row at or after the first data row.
    FirstBlankRow,
}

/// Layout of the workbook. Rows and columns are 1-based, as shown in Excel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookLayout {
    /// Output sheet of the reconciler.
    pub reference_sheet: String,
    /// Expense sheets scanned for categories, in scan order.
    pub expense_sheets: Vec<String>,
    /// First row holding data in the expense sheets.
    pub first_data_row: u32,
    /// Column carrying the sticky category label.
    pub category_column: u32,
    /// Column carrying the subcategory.
    pub leaf_column: u32,
    pub end_of_data: EndOfData,
    /// Groups with no scannable sheet, appended after the scan.
    pub supplement: Vec<SupplementGroup>,
    /// First month column; merges reaching it are removed.
    pub first_data_column: u32,
    /// Column inserted by the standardization step.
    pub spacer_column: u32,
    /// Sheets whose month blocks start one column early.
    pub sheets_to_standardize: Vec<String>,
    /// Row holding the month labels.
    pub header_row: u32,
}

impl Default for WorkbookLayout {
    fn default() -> Self {
        Self {
            reference_sheet: REFERENCE_SHEET.to_string(),
            expense_sheets: ["Fixas", "Variáveis", "Extras", "Adicionais"]
                .into_iter()
                .map(String::from)
                .collect(),
            first_data_row: 3,
            category_column: 1,
            leaf_column: 2,
            end_of_data: EndOfData::UsedRange,
            supplement: vec![
                SupplementGroup::new(
                    "Receitas",
                    [
                        "Salário",
                        "Ajuda de custo",
                        "Aluguel",
                        "Pensão",
                        "Horas extras",
                        "13º salário",
                        "Férias",
                        "Outros",
                    ],
                ),
                SupplementGroup::new(
                    "Investimentos",
                    [
                        "Ações",
                        "Tesouro Direto",
                        "Renda fixa",
                        "Previdência privada",
                        "Outros",
                    ],
                ),
            ],
            first_data_column: 4,
            spacer_column: 3,
            sheets_to_standardize: ["Fixas", "Extras", "Adicionais"]
                .into_iter()
                .map(String::from)
                .collect(),
            header_row: 1,
        }
    }
}

impl WorkbookLayout {
    /// Loads a layout from a JSON file. Missing fields fall back to the
    /// defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let layout: WorkbookLayout = serde_json::from_str(&source)?;
        layout.validate()?;
        debug!(path = %path.display(), "loaded workbook layout");
        Ok(layout)
    }

    /// Returns the layout from `path` when given, the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positions = [
            ("first_data_row", self.first_data_row),
            ("category_column", self.category_column),
            ("leaf_column", self.leaf_column),
            ("first_data_column", self.first_data_column),
            ("spacer_column", self.spacer_column),
            ("header_row", self.header_row),
        ];
        if let Some((field, _)) = positions.iter().find(|(_, value)| *value == 0) {
            return Err(ToolError::InvalidLayout(format!(
                "{field} is 1-based and cannot be 0"
            )));
        }
        if self.category_column == self.leaf_column {
            return Err(ToolError::InvalidLayout(
                "category_column and leaf_column must differ".into(),
            ));
        }
        if self.expense_sheets.is_empty() {
            return Err(ToolError::InvalidLayout(
                "at least one expense sheet is required".into(),
            ));
        }
        if self.reference_sheet.trim().is_empty() {
            return Err(ToolError::InvalidLayout(
                "reference_sheet cannot be blank".into(),
            ));
        }
        if self.expense_sheets.contains(&self.reference_sheet) {
            return Err(ToolError::InvalidLayout(format!(
                "reference sheet '{}' cannot also be scanned",
                self.reference_sheet
            )));
        }
        Ok(())
    }
}
