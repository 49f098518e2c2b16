//! Word Tables CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use wordtables::cli::commands;
use wordtables::cli::{Cli, Commands, OutputFormat};
use wordtables::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR --format json OR non-TTY stdout
    let json = cli.json
        || cli.format == OutputFormat::Json
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let root = cli.root.as_ref();

    match &cli.command {
        Commands::Save { name, file } => commands::save::execute(name, file.as_deref(), root, json),
        Commands::Import { path } => commands::import::execute(path, root, json),
        Commands::List => commands::list::execute(root, json),
        Commands::Words { name } => commands::words::execute(name, root, json),
        Commands::Exists { name } => commands::exists::execute(name, root, json),
        Commands::Status => commands::status::execute(root, json),
        Commands::Refresh => commands::refresh::execute(root, json),
        Commands::DeleteAll { yes } => commands::delete::execute(*yes, root, json),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
