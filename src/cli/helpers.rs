//! Shared helper functions for CLI commands

use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::{CatalogEntry, Config, Project, Session};
use crate::entities::FieldSpec;

/// Truncate a string to `max_width` terminal columns, adding "..." if cut
pub fn truncate_str(s: &str, max_width: usize) -> String {
    if console::measure_text_width(s) <= max_width {
        return s.to_string();
    }
    let tail = if max_width >= 3 { "..." } else { "" };
    console::truncate_str(s, max_width, tail).into_owned()
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Discover the project, load layered config and open a session
pub fn open_session(global: &GlobalOpts) -> Result<(Project, Config, Session)> {
    let project = Project::resolve(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    let config = Config::load(Some(&project));
    let session = Session::open(&project, &config)?;
    Ok((project, config, session))
}

/// Resolve the part number argument, offering the sorted catalog as a pick
/// list when it is omitted in interactive mode
pub fn select_part(
    session: &Session,
    part_number: Option<&str>,
    interactive: bool,
) -> Result<CatalogEntry> {
    if let Some(pn) = part_number {
        return Ok(session.require_part(pn)?.clone());
    }
    if !interactive {
        return Err(miette::miette!(
            help = "pass a part number or use -i to pick one from the catalog",
            "a part number is required"
        ));
    }

    let numbers = session.require_catalog()?.part_numbers_sorted();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Part number")
        .items(&numbers)
        .default(0)
        .interact()
        .into_diagnostic()?;
    Ok(session.require_part(numbers[choice])?.clone())
}

/// Prompt for a numeric field, re-asking until the value passes the field minimum
pub fn prompt_number(theme: &ColorfulTheme, field: &FieldSpec, current: f64) -> Result<f64> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(field.label)
        .default(field.format(current))
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            field.parse(input).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()
        .into_diagnostic()?;
    Ok(field.parse(&raw)?)
}

/// Print a warning line to stderr
pub fn warn(message: impl std::fmt::Display) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print a success line to stdout
pub fn success(message: impl std::fmt::Display) {
    println!("{} {}", style("✓").green(), message);
}
