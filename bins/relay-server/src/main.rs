mod bootstrap;
mod error;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use error::ServerError;
use relay_engine::config::RelayConfig;

#[derive(Parser)]
#[command(name = "relay-server", about = "Relays sensor broadcasts to the readings store")]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "relay.toml", env = "RELAY_CONFIG")]
    config: String,

    /// Override `listener.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "relay-server failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    tracing::info!(config = %cli.config, "loading configuration");
    let mut config = RelayConfig::load(&cli.config)?;
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    let relay = bootstrap::build(&config)?;
    let token = CancellationToken::new();

    let ingest = relay.run(token.clone());
    tokio::pin!(ingest);

    tracing::info!(addr = %config.listener.addr(), "relay-server started, press Ctrl+C to stop");

    tokio::select! {
        result = &mut ingest => {
            result?;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("shutting down...");
            token.cancel();
        }
    }

    // The datagram in flight is finished before the loop sees the stop.
    ingest.await?;
    tracing::info!("shutdown complete");
    Ok(())
}
