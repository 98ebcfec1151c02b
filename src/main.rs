use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use photoline_core::channel::line::LineApi;
use photoline_core::channel::MessagingApi;
use photoline_core::config::Config;
use photoline_core::relay::{BlobRelay, S3Store};
use photoline_core::router::EventRouter;
use photoline_core::service::{http, keepalive};
use photoline_core::store::PhotoStore;

#[derive(Parser)]
#[command(
    name = "photoline",
    about = "LINE webhook bot that archives user photos to S3",
    version = photoline_core::VERSION,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server
    Serve {
        /// Listen port
        #[arg(short, long, default_value_t = 8888)]
        port: u16,
        /// Listen address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("photoline=info".parse().unwrap())
                .add_directive("photoline_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => serve(&host, port).await?,
    }

    Ok(())
}

async fn serve(host: &str, port: u16) -> Result<()> {
    let config = Config::from_env()?;

    let store = PhotoStore::open(&config.database_path)?;
    let s3 = Arc::new(S3Store::from_env(config.bucket.clone()).await);
    let relay = BlobRelay::new(s3, config.cdn_domain.clone());
    let api: Arc<dyn MessagingApi> = Arc::new(LineApi::new(config.channel_access_token.clone()));
    let router = EventRouter::new(store, relay, api.clone());

    if let Some(url) = config.keepalive_url.clone() {
        info!("Keep-alive pinger enabled for {}", url);
        keepalive::spawn(url);
    }

    let state = Arc::new(http::AppState {
        config,
        router,
        api,
    });

    http::serve(&format!("{host}:{port}"), state).await
}
