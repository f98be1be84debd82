use std::path::{Path, PathBuf};

use budget_tools::layout::WorkbookLayout;
use budget_tools::maintenance::{self, ExportFormat, SaveOptions};
use budget_tools::model::CategoryEntry;
use budget_tools::resolve::Resolution;
use budget_tools::{Result, ToolError};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose).and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|err| ToolError::Logging(err.to_string()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    let layout = WorkbookLayout::load(cli.layout.as_deref())?;
    let workbook = cli.workbook.as_path();

    match cli.command {
        Command::RebuildReference(args) => execute_rebuild(workbook, &layout, args),
        Command::UnmergeDataColumns(args) => execute_unmerge(workbook, &layout, args),
        Command::StandardizeColumns(args) => execute_standardize(workbook, &layout, args),
        Command::Lookup(args) => execute_lookup(workbook, &layout, args),
        Command::ExportReference(args) => execute_export(workbook, &layout, args),
    }
}

fn execute_rebuild(workbook: &Path, layout: &WorkbookLayout, args: WriteArgs) -> Result<()> {
    let report = maintenance::rebuild_reference(workbook, layout, args.into())?;

    if report.saved {
        println!(
            "Reference sheet '{}' rebuilt with {} subcategories",
            layout.reference_sheet,
            report.registry.len()
        );
    } else {
        println!(
            "Dry run: '{}' would hold {} subcategories",
            layout.reference_sheet,
            report.registry.len()
        );
    }
    println!("Breakdown by type:");
    for (group, count) in report.group_counts() {
        println!("  {group}: {count} subcategories");
    }
    print_backup(report.backup.as_deref());
    Ok(())
}

fn execute_unmerge(workbook: &Path, layout: &WorkbookLayout, args: WriteArgs) -> Result<()> {
    let reports = maintenance::unmerge_data_columns(workbook, layout, args.into())?;

    let mut total = 0;
    for sheet in &reports.sheets {
        println!("{}:", sheet.sheet);
        println!("  Merged ranges before: {}", sheet.merged_before);
        for range in &sheet.unmerged {
            println!("  Unmerged: {range}");
        }
        println!("  Merged ranges remaining: {}", sheet.remaining);
        total += sheet.unmerged.len();
    }
    println!("Total unmerged across all sheets: {total}");
    print_backup(reports.backup.as_deref());
    Ok(())
}

fn execute_standardize(workbook: &Path, layout: &WorkbookLayout, args: WriteArgs) -> Result<()> {
    let reports = maintenance::standardize_columns(workbook, layout, args.into())?;

    for sheet in &reports.sheets {
        let action = if sheet.shifted {
            "spacer column inserted"
        } else {
            "already standardized"
        };
        println!("{}: {action}", sheet.sheet);
        for (column, label) in &sheet.header_labels {
            println!("    Column {column}: {label}");
        }
    }
    print_backup(reports.backup.as_deref());
    Ok(())
}

fn execute_lookup(workbook: &Path, layout: &WorkbookLayout, args: LookupArgs) -> Result<()> {
    match maintenance::lookup_subcategory(
        workbook,
        layout,
        &args.subcategory,
        args.group.as_deref(),
    )? {
        Resolution::Unique(entry) => println!("{}", describe(&entry)),
        Resolution::Ambiguous(options) => {
            println!("'{}' is ambiguous:", args.subcategory);
            for (idx, entry) in options.iter().enumerate() {
                println!("  {}. {}", idx + 1, describe(entry));
            }
        }
    }
    Ok(())
}

fn execute_export(workbook: &Path, layout: &WorkbookLayout, args: ExportArgs) -> Result<()> {
    let format = args
        .format
        .map(ExportFormat::from)
        .unwrap_or_else(|| guess_export_format(&args.output));
    let registry = maintenance::export_reference(workbook, layout, &args.output, format)?;
    println!(
        "Exported {} subcategories to {}",
        registry.len(),
        args.output.display()
    );
    Ok(())
}

fn guess_export_format(path: &Path) -> ExportFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
        _ => ExportFormat::Xlsx,
    }
}

fn describe(entry: &CategoryEntry) -> String {
    let category = if entry.category.is_empty() {
        "(no category)"
    } else {
        entry.category.as_str()
    };
    let mut line = format!("{} > {} > {}", entry.group_name, category, entry.subcategory);
    if entry.source_row > 0 {
        line.push_str(&format!(" (row {})", entry.source_row));
    }
    line
}

fn print_backup(backup: Option<&Path>) {
    if let Some(path) = backup {
        println!("Backup written to {}", path.display());
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Maintenance operations for the household budget workbook."
)]
struct Cli {
    /// Workbook to operate on.
    #[arg(long, env = "BUDGET_WORKBOOK")]
    workbook: PathBuf,

    /// JSON layout overriding the built-in sheet names and column positions.
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the category reference sheet from the expense sheets.
    RebuildReference(WriteArgs),
    /// Unmerge ranges that reach the month columns of the expense sheets.
    UnmergeDataColumns(WriteArgs),
    /// Insert the spacer column so month blocks start at the same column.
    StandardizeColumns(WriteArgs),
    /// Find where a subcategory lives according to the reference sheet.
    Lookup(LookupArgs),
    /// Write the reconciled reference table to a separate file.
    ExportReference(ExportArgs),
}

#[derive(clap::Args)]
struct WriteArgs {
    /// Copy the workbook aside before saving it.
    #[arg(long)]
    backup: bool,

    /// Report what would change without saving.
    #[arg(long)]
    dry_run: bool,
}

impl From<WriteArgs> for SaveOptions {
    fn from(args: WriteArgs) -> Self {
        SaveOptions {
            backup: args.backup,
            dry_run: args.dry_run,
        }
    }
}

#[derive(clap::Args)]
struct LookupArgs {
    /// Subcategory name, optionally with a detail (`"Orion - Consultas"`).
    subcategory: String,

    /// Only consider entries of this group.
    #[arg(long)]
    group: Option<String>,
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Output file path.
    #[arg(long)]
    output: PathBuf,

    /// Output format; guessed from the extension when omitted.
    #[arg(long, value_enum)]
    format: Option<ExportFormatKind>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormatKind {
    Xlsx,
    Json,
}

impl From<ExportFormatKind> for ExportFormat {
    fn from(kind: ExportFormatKind) -> Self {
        match kind {
            ExportFormatKind::Xlsx => ExportFormat::Xlsx,
            ExportFormatKind::Json => ExportFormat::Json,
        }
    }
}
