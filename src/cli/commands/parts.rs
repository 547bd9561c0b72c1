//! `filmtk parts` command - Reference catalog browsing

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::open_session;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::CatalogEntry;

#[derive(Subcommand, Debug)]
pub enum PartsCommands {
    /// List catalog part numbers (sorted)
    List(ListArgs),

    /// Show one catalog entry with its saved parameters and measurements
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search in part number and name
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part number
    pub part_number: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("part_number", "PART NO", 24),
    ColumnDef::new("part_name", "PART NAME", 48),
    ColumnDef::new("film_config", "CFG", 3),
    ColumnDef::new("thickness", "THK", 3),
];

pub fn run(cmd: PartsCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartsCommands::List(args) => run_list(args, global),
        PartsCommands::Show(args) => run_show(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, session) = open_session(global)?;
    let catalog = session.require_catalog()?;

    let mut entries: Vec<&CatalogEntry> = catalog.search(args.search.as_deref().unwrap_or(""));
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    let rows: Vec<TableRow> = entries
        .iter()
        .map(|e| {
            let mark = |saved: bool| CellValue::Text(if saved { "✓" } else { "" }.to_string());
            TableRow::new()
                .cell("part_number", CellValue::Key(e.part_number.clone()))
                .cell("part_name", CellValue::Text(e.part_name.clone()))
                .cell("film_config", mark(session.film_configs().contains(&e.part_number)))
                .cell("thickness", mark(session.thickness().contains(&e.part_number)))
        })
        .collect();

    TableFormatter::new(COLUMNS, "part")
        .quiet(global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, session) = open_session(global)?;
    let entry = session.require_part(&args.part_number)?;
    let film_config = session.film_configs().get(&entry.part_number);
    let thickness = session.thickness().get(&entry.part_number);

    if global.format == OutputFormat::Json {
        let value = serde_json::json!({
            "part_number": entry.part_number,
            "part_name": entry.part_name,
            "film_config": film_config,
            "thickness": thickness,
        });
        println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
        return Ok(());
    }

    println!("{}", style("─".repeat(50)).dim());
    println!("{}: {}", style("Part No").bold(), style(&entry.part_number).cyan());
    println!("{}: {}", style("Part Name").bold(), entry.part_name);
    println!("{}", style("─".repeat(50)).dim());

    match film_config {
        Some(cfg) => println!(
            "{}: {} mm / core {} cm / set {} cm / {} labels per set",
            style("Film").bold(),
            cfg.film_thickness_mm,
            cfg.core_outer_diameter_cm,
            cfg.eye_mark_set_length_cm,
            cfg.labels_per_set
        ),
        None => println!("{}: {}", style("Film").bold(), style("(not saved)").dim()),
    }
    match thickness {
        Some(t) => println!(
            "{}: mean {:.3} mm, stdev {:.6} mm ({} of 9 measured, vendor {})",
            style("Thickness").bold(),
            t.mean,
            t.stdev,
            t.measured_count(),
            if t.vendor.is_empty() { "-" } else { &t.vendor }
        ),
        None => println!("{}: {}", style("Thickness").bold(), style("(not measured)").dim()),
    }
    Ok(())
}
