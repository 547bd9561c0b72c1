//! `filmtk roll` command - Labels per roll

use console::style;
use miette::Result;

use crate::calc::{parse_diameters, RollSpec, RollYield};
use crate::cli::helpers::{open_session, warn};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::entities::fields::{CORE_DIAMETER, FILM_THICKNESS, MARK_SET_LENGTH};
use crate::entities::film_config::parse_labels_per_set;
use crate::entities::FilmConfig;

#[derive(clap::Args, Debug)]
pub struct RollArgs {
    /// Part number whose saved parameters to use (defaults when not saved)
    pub part_number: Option<String>,

    /// Roll outer diameters in cm, separated by commas or whitespace
    #[arg(long, short = 'd')]
    pub diameters: String,

    /// Film thickness in mm (overrides the saved value)
    #[arg(long, short = 't')]
    pub thickness: Option<String>,

    /// Core outer diameter in cm (overrides the saved value)
    #[arg(long, short = 'c')]
    pub core: Option<String>,

    /// Eye-mark set length in cm (overrides the saved value)
    #[arg(long, short = 'm')]
    pub mark_set: Option<String>,

    /// Labels per eye-mark set (overrides the saved value)
    #[arg(long, short = 'l')]
    pub labels_per_set: Option<String>,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("roll_diameter_cm", "ROLL DIAMETER (cm)", 18),
    ColumnDef::new("labels", "LABELS", 12),
];

pub fn run(args: RollArgs, global: &GlobalOpts) -> Result<()> {
    let mut cfg = match &args.part_number {
        Some(pn) => {
            let (_, _, session) = open_session(global)?;
            let entry = session.require_part(pn)?;
            session.film_config_or_default(entry)
        }
        None => FilmConfig::with_defaults("", ""),
    };

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

    let list = parse_diameters(&args.diameters);
    for token in &list.rejected {
        warn(format!("'{}' is not a number, skipped", token));
    }
    if list.values.is_empty() {
        return Err(miette::miette!("no valid roll diameters in '{}'", args.diameters));
    }

    let spec = RollSpec::from(&cfg);
    let yields = spec.evaluate(&list.values);
    tracing::debug!(?spec, rolls = yields.len(), "evaluated roll yields");

    if !global.quiet {
        let heading = if cfg.part_number.is_empty() {
            String::new()
        } else {
            format!("{} ", style(&cfg.part_number).cyan())
        };
        eprintln!(
            "{}{} mm / core {} cm / set {} cm / {} labels per set",
            heading,
            FILM_THICKNESS.format(cfg.film_thickness_mm),
            CORE_DIAMETER.format(cfg.core_outer_diameter_cm),
            MARK_SET_LENGTH.format(cfg.eye_mark_set_length_cm),
            cfg.labels_per_set
        );
    }

    let rows: Vec<TableRow> = yields.iter().map(yield_row).collect();
    TableFormatter::new(COLUMNS, "roll")
        .quiet(global.quiet)
        .output(&rows, global.format);
    Ok(())
}

fn yield_row(y: &RollYield) -> TableRow {
    TableRow::new()
        .cell("roll_diameter_cm", CellValue::Text(y.roll_diameter_cm.to_string()))
        .cell("labels", CellValue::Number(y.labels))
}
