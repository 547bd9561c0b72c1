//! `filmtk init` command - Initialize a new project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::config::{
    DEFAULT_CATALOG_FILE, DEFAULT_FILM_CONFIG_FILE, DEFAULT_FILM_THICKNESS_FILE,
};
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .filmtk/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized filmtk project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Expected files in the project root:");
            println!("  {} reference parts catalog", style(DEFAULT_CATALOG_FILE).dim());
            println!("  {} film parameters (created on first save)", style(DEFAULT_FILM_CONFIG_FILE).dim());
            println!(
                "  {} thickness measurements (created on first save)",
                style(DEFAULT_FILM_THICKNESS_FILE).dim()
            );
            println!();
            println!("Next steps:");
            println!("  {} List catalog part numbers", style("filmtk parts list").yellow());
            println!("  {} Save film parameters", style("filmtk cfg set <PART> -i").yellow());
            println!(
                "  {} Labels per roll",
                style("filmtk roll <PART> --diameters \"29.9, 29.8\"").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} filmtk project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("filmtk init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
