//! HelpHub import/export entry point.

use clap::Parser;
use hhsync::browser::TerminalKeys;
use hhsync::cli::Cli;
use hhsync::cli::commands;
use hhsync::cli::commands::menu::Shell;
use hhsync::error::Error;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !io::stdout().is_terminal();

    // Run the command and handle errors
    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if matches!(e, Error::Interrupted) {
                eprintln!("\n\nProgram terminated by the user.");
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
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let request = cli.request()?;
    let interactive = io::stdin().is_terminal() && io::stdout().is_terminal();
    let mut keys = TerminalKeys;
    let mut stdout = io::stdout();

    let config = commands::store::resolve_config(
        cli.db.as_deref(),
        interactive.then_some((&mut keys, &mut stdout)),
    )?;

    if let Some(request) = request {
        return commands::operation::execute(&config, &request, json, cli.quiet);
    }

    if !interactive {
        return Err(Error::InvalidArgument(
            "no operation given and no terminal for the interactive menu; use --export-clients, --import-clients, --export-calls or --import-calls".to_string(),
        ));
    }

    Shell::new(&config, io::stdin().lock(), stdout, keys).run()
}
