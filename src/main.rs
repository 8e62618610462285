mod api;
mod app;
mod cli;
mod config;
mod error;
mod models;

use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::cli::{Action, Cli};
use crate::config::Config;
use crate::error::{Error, Result};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        // stdout may already be gone, e.g. a closed pipe.
        let _ = writeln!(io::stdout(), "{e}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let action = cli.action().ok_or(Error::NoTemplate)?;

    // Explicit client, no process-wide state.
    let config = Config::from_env(cli.api_url.as_deref()).map_err(Error::Client)?;
    tracing::debug!(
        api_url = %config.api_url,
        authenticated = config.token.is_some(),
        "resolved config"
    );
    let client = ApiClient::new(config).map_err(Error::Client)?;

    let mut stdout = io::stdout().lock();
    match action {
        Action::List => app::list_templates(&client, &mut stdout).await?,
        Action::Generate(template) => {
            // An empty base keeps the confirmation at `.gitignore`.
            app::generate(&client, &template, Path::new(""), &mut stdout).await?;
        }
    }
    stdout.flush().map_err(Error::Output)
}
