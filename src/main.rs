use anyhow::Result;
use clap::Parser;
use resume_client::cli::{handle_command, Cli};
use resume_client::ClientConfig;
use tracing::debug;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is reserved for command output
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load()?;

    debug!("Service URL: {}", config.api_base_url);
    debug!("Credential path: {}", config.credential_path.display());

    handle_command(cli, config).await
}
