//! `filmtk thk` command - Thickness measurements per part number

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, prompt_number, select_part, success};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Upsert;
use crate::entities::fields::{FieldSpec, MEASUREMENT};
use crate::entities::thickness::{
    overwrite_leading, set_measurement, Measurements, MEASUREMENT_COUNT,
};
use crate::entities::{ThicknessEntry, ThicknessRecord};

#[derive(Subcommand, Debug)]
pub enum ThkCommands {
    /// List saved thickness measurements
    List,

    /// Show measurements and statistics for a part number
    Show(ShowArgs),

    /// Record thickness measurements for a part number
    Set(SetArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Part number
    pub part_number: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Part number (must exist in the catalog; with -i it can be picked from a list)
    pub part_number: Option<String>,

    /// Film vendor (blank keeps the vendor on file)
    #[arg(long)]
    pub vendor: Option<String>,

    /// Comma-separated samples written to positions 1..n
    #[arg(long, value_delimiter = ',')]
    pub values: Vec<String>,

    /// Set one sample by position, e.g. --set 4=0.137 (repeatable)
    #[arg(long = "set", value_name = "N=VALUE")]
    pub set: Vec<String>,

    /// Prompt for the vendor and each sample
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("part_number", "PART NO", 20),
    ColumnDef::new("part_name", "PART NAME", 24),
    ColumnDef::new("vendor", "VENDOR", 12),
    ColumnDef::new("m1", "#1", 6),
    ColumnDef::new("m2", "#2", 6),
    ColumnDef::new("m3", "#3", 6),
    ColumnDef::new("m4", "#4", 6),
    ColumnDef::new("m5", "#5", 6),
    ColumnDef::new("m6", "#6", 6),
    ColumnDef::new("m7", "#7", 6),
    ColumnDef::new("m8", "#8", 6),
    ColumnDef::new("m9", "#9", 6),
    ColumnDef::new("mean", "MEAN", 6),
    ColumnDef::new("stdev", "STDEV", 9),
];

const SAMPLE_KEYS: [&str; MEASUREMENT_COUNT] = ["m1", "m2", "m3", "m4", "m5", "m6", "m7", "m8", "m9"];

pub fn run(cmd: ThkCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ThkCommands::List => run_list(global),
        ThkCommands::Show(args) => run_show(args, global),
        ThkCommands::Set(args) => run_set(args, global),
    }
}

fn record_row(record: &ThicknessRecord) -> TableRow {
    let mut row = TableRow::new()
        .cell("part_number", CellValue::Key(record.part_number.clone()))
        .cell("part_name", CellValue::Text(record.part_name.clone()))
        .cell("vendor", CellValue::Text(record.vendor.clone()));
    for (key, &value) in SAMPLE_KEYS.iter().zip(&record.measurements) {
        row = row.cell(*key, CellValue::Sample(value, MEASUREMENT.decimals));
    }
    row.cell("mean", CellValue::Float(record.mean, 3))
        .cell("stdev", CellValue::Float(record.stdev, 6))
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (_, _, session) = open_session(global)?;

    let rows: Vec<TableRow> = session.thickness().iter().map(record_row).collect();

    TableFormatter::new(COLUMNS, "thickness record")
        .quiet(global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, session) = open_session(global)?;
    let entry = session.require_part(&args.part_number)?;

    let record = match session.thickness().get(&entry.part_number) {
        Some(record) => record.clone(),
        None => ThicknessRecord::new(
            entry.part_number.clone(),
            entry.part_name.clone(),
            String::new(),
            [0.0; MEASUREMENT_COUNT],
        ),
    };

    if global.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&record).unwrap_or_default());
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn print_record(record: &ThicknessRecord) {
    println!("{}", style("─".repeat(50)).dim());
    println!("{}: {}", style("Part No").bold(), style(&record.part_number).cyan());
    println!("{}: {}", style("Part Name").bold(), record.part_name);
    println!(
        "{}: {}",
        style("Vendor").bold(),
        if record.vendor.is_empty() { "-" } else { &record.vendor }
    );
    println!("{}", style("─".repeat(50)).dim());
    for (i, value) in record.measurements.iter().enumerate() {
        println!("  #{}: {}", i + 1, MEASUREMENT.format(*value));
    }
    println!("{}", style("─".repeat(50)).dim());
    println!("{}: {:.3} mm", style("Mean").bold(), record.mean);
    println!("{}: {:.6} mm", style("Stdev").bold(), record.stdev);
}

/// Parse one `N=VALUE` pair
fn parse_position(raw: &str) -> Result<(usize, f64)> {
    let (position, value) = raw
        .split_once('=')
        .ok_or_else(|| miette::miette!("expected N=VALUE, got '{}'", raw))?;
    let position = position
        .trim()
        .parse::<usize>()
        .map_err(|_| miette::miette!("'{}' is not a measurement position", position.trim()))?;
    Ok((position, MEASUREMENT.parse(value)?))
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, mut session) = open_session(global)?;
    let entry = select_part(&session, args.part_number.as_deref(), args.interactive)?;
    let mut measurements: Measurements = session.thickness().measurements_for(&entry.part_number);
    let mut vendor = args.vendor.clone();

    if !args.values.is_empty() {
        let values = args
            .values
            .iter()
            .map(|raw| MEASUREMENT.parse(raw))
            .collect::<std::result::Result<Vec<f64>, _>>()?;
        overwrite_leading(&mut measurements, &values)?;
    }
    for raw in &args.set {
        let (position, value) = parse_position(raw)?;
        set_measurement(&mut measurements, position, value)?;
    }

    if args.interactive {
        let theme = ColorfulTheme::default();
        println!(
            "{} {} {}",
            style("Thickness measurements for").bold(),
            style(&entry.part_number).cyan(),
            style(&entry.part_name).dim()
        );
        let current_vendor = vendor.clone().unwrap_or_else(|| {
            session
                .thickness()
                .get(&entry.part_number)
                .map(|r| r.vendor.clone())
                .unwrap_or_default()
        });
        let entered: String = Input::with_theme(&theme)
            .with_prompt("Vendor")
            .default(current_vendor)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        vendor = Some(entered);

        for (i, slot) in measurements.iter_mut().enumerate() {
            let field = FieldSpec {
                label: SAMPLE_LABELS[i],
                ..MEASUREMENT
            };
            *slot = prompt_number(&theme, &field, *slot)?;
        }
    }

    let (record, outcome) = session.save_thickness(ThicknessEntry {
        part_number: entry.part_number.clone(),
        part_name: entry.part_name.clone(),
        vendor,
        measurements,
    })?;
    tracing::debug!(
        part_number = %record.part_number,
        mean = record.mean,
        stdev = record.stdev,
        "thickness saved"
    );

    if !global.quiet {
        let verb = match outcome {
            Upsert::Inserted => "Saved",
            Upsert::Replaced => "Updated",
        };
        success(format!(
            "{} thickness measurements for {} in {}",
            verb,
            style(&record.part_number).cyan(),
            style(session.thickness_path().display()).dim()
        ));
        print_record(&record);
    }
    Ok(())
}

const SAMPLE_LABELS: [&str; MEASUREMENT_COUNT] = [
    "Measurement 1 (mm)",
    "Measurement 2 (mm)",
    "Measurement 3 (mm)",
    "Measurement 4 (mm)",
    "Measurement 5 (mm)",
    "Measurement 6 (mm)",
    "Measurement 7 (mm)",
    "Measurement 8 (mm)",
    "Measurement 9 (mm)",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("4=0.137").unwrap(), (4, 0.137));
        assert_eq!(parse_position(" 1 = 0.2 ").unwrap(), (1, 0.2));
        assert!(parse_position("4").is_err());
        assert!(parse_position("x=0.1").is_err());
        assert!(parse_position("2=-0.1").is_err());
    }
}
