// Entrypoint for the CLI application.
// - Parse arguments, set up logging, resolve credentials, log in.
// - Dispatch the command and map any error to an exit code.

use std::io;
use std::process;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use mist::cli::Cli;
use mist::config::{default_config_path, Config, Overrides};
use mist::error::{MistError, EXIT_USAGE};
use mist::{commands, ui};

fn init_logging(level: &str) {
    let lvl = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(lvl)
        .with_writer(io::stderr)
        .finish();
    // Only fails if a subscriber is already installed.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<(), MistError> {
    let cfg_path = cli.config.clone().unwrap_or_else(default_config_path);
    let cfg = Config::load(&cfg_path).map_err(MistError::Config)?;

    let overrides = Overrides {
        uri: cli.uri,
        email: cli.email,
        password: cli.password,
        token: cli.token,
        auth_scheme: cli.auth_scheme,
    };
    let creds = cfg
        .resolve(overrides, &mut ui::TerminalPrompt)
        .map_err(MistError::Prompt)?;

    let mut session = ui::connect(&creds)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::dispatch(&mut session, cli.command, &mut out)
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { EXIT_USAGE } else { 0 });
        }
    };
    init_logging(&cli.log_level);

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        process::exit(e.exit_code());
    }
}
