//! azr - resolve Azure identifiers and keys from the command line
//!
//! Authenticates with the Azure CLI session (or service principal
//! environment variables) and prints subscriptions, resource groups and
//! access keys.

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use azresolve::cli::Cli;
use azresolve::config::Config;
use azresolve::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Error: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().await?;
    cli.apply_overrides(&mut config);

    init_logging(config.debug);

    config.validate()?;
    debug!("Configuration: {:?}", config);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    cli.execute(config, cancel).await
}

fn default_filter(debug: bool) -> &'static str {
    if debug {
        "azresolve=debug"
    } else {
        "azresolve=info"
    }
}

fn init_logging(debug: bool) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(debug).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
