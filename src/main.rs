use clap::Parser;
use filmtk::cli::{Cli, Commands};
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Restore default SIGPIPE so `filmtk parts list | head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => filmtk::cli::commands::init::run(args),
        Commands::Parts(cmd) => filmtk::cli::commands::parts::run(cmd, &global),
        Commands::Cfg(cmd) => filmtk::cli::commands::cfg::run(cmd, &global),
        Commands::Thk(cmd) => filmtk::cli::commands::thk::run(cmd, &global),
        Commands::Roll(args) => filmtk::cli::commands::roll::run(args, &global),
        Commands::Config(cmd) => filmtk::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => filmtk::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flags
fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
