// Entrypoint for the `pngx` binary.
// - Keeps `main` small: parse arguments, load the account store, set up the
//   session account and hand off to the command handlers.
// - Returns `anyhow::Result` so every error ends up as one message on stderr.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pngx_cli::api::HttpVerifier;
use pngx_cli::cli::Cli;
use pngx_cli::commands::{self, App};
use pngx_cli::config::ConfigStore;
use pngx_cli::ui;

fn init_tracing() {
    // `PNGX_LOG=debug pngx ...` shows requests and store changes.
    let filter = EnvFilter::try_from_env("PNGX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut session = cli.session;
    if session.ask_password {
        session.password = Some(ui::prompt_secret("Password")?);
    }
    if session.ask_token {
        session.token = Some(ui::prompt_secret("API token")?);
    }

    let store = ConfigStore::load(session.config.as_deref(), session.use_account.as_deref())
        .context("Cannot load configuration")?;

    if session.show_config {
        println!("{}", store.filepath().display());
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("No command given. See `pngx --help`.");
    };

    let verifier = HttpVerifier::new()?;
    let mut app = App::new(store, Box::new(verifier));
    commands::prepare_session(&mut app, &session, &command)?;
    commands::run(&mut app, &session, command)
}
