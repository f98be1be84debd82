//! Core library for the budget-tools command line application.
//!
//! The library exposes the maintenance operations that keep the household
//! budget workbook consistent, both for the command-line interface and for the
//! tests. Spreadsheet adapters live under [`budget::tools::io`], data
//! representations inside [`budget::tools::model`], the category scan and
//! deduplication in [`budget::tools::reconcile`], and the per-command
//! orchestration under [`budget::tools::maintenance`].

pub mod budget;

pub use budget::tools::{
    Result, ToolError, backup, error, io, layout, maintenance, model, reconcile, resolve,
};
