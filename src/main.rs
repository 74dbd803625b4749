//! hb - control Hubitat devices from short free-text phrases.

use std::sync::Arc;

use hubquick::app::Orchestrator;
use hubquick::cli::Cli;
use hubquick::config::Config;
use hubquick::error::Result;
use hubquick::logging;
use hubquick::notify::StdoutNotifier;
use hubquick::persistence::{CatalogCache, KeyringSecretStore};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    if cli.verbose {
        logging::init_stderr_logging();
    } else {
        logging::init_file_logging();
    }

    if let Err(e) = run(cli).await {
        if e.is_guidance() {
            info!("{}: {}", e.category(), e);
            println!("{e}");
            return;
        }
        error!("{}: {}", e.category(), e);
        eprintln!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let mut orchestrator = Orchestrator::new(
        config,
        config_path,
        Arc::new(KeyringSecretStore::new()),
        CatalogCache::open_default()?,
        Arc::new(StdoutNotifier),
    );
    orchestrator.run(cli.command).await
}
