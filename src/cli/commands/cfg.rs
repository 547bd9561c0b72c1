//! `filmtk cfg` command - Film parameters per part number

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_session, prompt_number, select_part, success};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Upsert;
use crate::entities::fields::{CORE_DIAMETER, FILM_THICKNESS, LABELS_PER_SET, MARK_SET_LENGTH};
use crate::entities::film_config::parse_labels_per_set;
use crate::entities::FilmConfig;

#[derive(Subcommand, Debug)]
pub enum CfgCommands {
    /// List saved film parameters
    List,

    /// Show film parameters for a part number (saved or defaults)
    Show(ShowArgs),

    /// Save film parameters for a part number
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

    /// Film thickness in mm
    #[arg(long, short = 't')]
    pub thickness: Option<String>,

    /// Core outer diameter in cm
    #[arg(long, short = 'c')]
    pub core: Option<String>,

    /// Eye-mark set length in cm
    #[arg(long, short = 'm')]
    pub mark_set: Option<String>,

    /// Labels per eye-mark set
    #[arg(long, short = 'l')]
    pub labels_per_set: Option<String>,

    /// Prompt for each value
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("part_number", "PART NO", 24),
    ColumnDef::new("part_name", "PART NAME", 32),
    ColumnDef::new("film_thickness_mm", "THK (mm)", 9),
    ColumnDef::new("core_outer_diameter_cm", "CORE (cm)", 9),
    ColumnDef::new("eye_mark_set_length_cm", "SET (cm)", 9),
    ColumnDef::new("labels_per_set", "LABELS/SET", 10),
];

pub fn run(cmd: CfgCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CfgCommands::List => run_list(global),
        CfgCommands::Show(args) => run_show(args, global),
        CfgCommands::Set(args) => run_set(args, global),
    }
}

fn config_row(cfg: &FilmConfig) -> TableRow {
    TableRow::new()
        .cell("part_number", CellValue::Key(cfg.part_number.clone()))
        .cell("part_name", CellValue::Text(cfg.part_name.clone()))
        .cell(
            "film_thickness_mm",
            CellValue::Float(cfg.film_thickness_mm, FILM_THICKNESS.decimals),
        )
        .cell(
            "core_outer_diameter_cm",
            CellValue::Float(cfg.core_outer_diameter_cm, CORE_DIAMETER.decimals),
        )
        .cell(
            "eye_mark_set_length_cm",
            CellValue::Float(cfg.eye_mark_set_length_cm, MARK_SET_LENGTH.decimals),
        )
        .cell("labels_per_set", CellValue::Number(u64::from(cfg.labels_per_set)))
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let (_, _, session) = open_session(global)?;

    // File order, as kept by upsert
    let rows: Vec<TableRow> = session.film_configs().iter().map(config_row).collect();

    TableFormatter::new(COLUMNS, "film config")
        .quiet(global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, session) = open_session(global)?;
    let entry = session.require_part(&args.part_number)?;
    let saved = session.film_configs().contains(&entry.part_number);
    let cfg = session.film_config_or_default(entry);

    if global.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&cfg).unwrap_or_default());
        return Ok(());
    }

    print_config(&cfg);
    if !saved {
        println!();
        println!("{}", style("(not saved yet - showing defaults)").dim());
    }
    Ok(())
}

fn print_config(cfg: &FilmConfig) {
    println!("{}", style("─".repeat(50)).dim());
    println!("{}: {}", style("Part No").bold(), style(&cfg.part_number).cyan());
    println!("{}: {}", style("Part Name").bold(), cfg.part_name);
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "{}: {}",
        style(FILM_THICKNESS.label).bold(),
        FILM_THICKNESS.format(cfg.film_thickness_mm)
    );
    println!(
        "{}: {}",
        style(CORE_DIAMETER.label).bold(),
        CORE_DIAMETER.format(cfg.core_outer_diameter_cm)
    );
    println!(
        "{}: {}",
        style(MARK_SET_LENGTH.label).bold(),
        MARK_SET_LENGTH.format(cfg.eye_mark_set_length_cm)
    );
    println!("{}: {}", style(LABELS_PER_SET.label).bold(), cfg.labels_per_set);
}

fn check_labels_input(input: &str) -> std::result::Result<(), String> {
    parse_labels_per_set(input).map(|_| ()).map_err(|e| e.to_string())
}

/// Prompt for labels per set, re-asking until the value is a whole number
fn prompt_labels_per_set(theme: &ColorfulTheme, current: u32) -> Result<u32> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(LABELS_PER_SET.label)
        .default(current.to_string())
        .validate_with(|input: &String| check_labels_input(input))
        .interact_text()
        .into_diagnostic()?;
    Ok(parse_labels_per_set(&raw)?)
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, mut session) = open_session(global)?;
    let entry = select_part(&session, args.part_number.as_deref(), args.interactive)?;
    let mut cfg = session.film_config_or_default(&entry);

    if let Some(raw) = &args.thickness {
        cfg.film_thickness_mm = FILM_THICKNESS.parse(raw)?;
    }
    if let Some(raw) = &args.core {
        cfg.core_outer_diameter_cm = CORE_DIAMETER.parse(raw)?;
    }
    if let Some(raw) = &args.mark_set {
        cfg.eye_mark_set_length_cm = MARK_SET_LENGTH.parse(raw)?;
    }
    if let Some(raw) = &args.labels_per_set {
        cfg.labels_per_set = parse_labels_per_set(raw)?;
    }

    if args.interactive {
        let theme = ColorfulTheme::default();
        println!(
            "{} {} {}",
            style("Film parameters for").bold(),
            style(&entry.part_number).cyan(),
            style(&entry.part_name).dim()
        );
        cfg.film_thickness_mm = prompt_number(&theme, &FILM_THICKNESS, cfg.film_thickness_mm)?;
        cfg.core_outer_diameter_cm =
            prompt_number(&theme, &CORE_DIAMETER, cfg.core_outer_diameter_cm)?;
        cfg.eye_mark_set_length_cm =
            prompt_number(&theme, &MARK_SET_LENGTH, cfg.eye_mark_set_length_cm)?;
        cfg.labels_per_set = prompt_labels_per_set(&theme, cfg.labels_per_set)?;
    }

    let outcome = session.save_film_config(cfg)?;
    tracing::debug!(part_number = %entry.part_number, ?outcome, "film config saved");

    if !global.quiet {
        let verb = match outcome {
            Upsert::Inserted => "Saved",
            Upsert::Replaced => "Updated",
        };
        success(format!(
            "{} film parameters for {} in {}",
            verb,
            style(&entry.part_number).cyan(),
            style(session.film_config_path().display()).dim()
        ));
        if let Some(saved) = session.film_configs().get(&entry.part_number) {
            print_config(saved);
        }
    }
    Ok(())
}
