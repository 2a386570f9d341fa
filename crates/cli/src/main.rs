mod bridge;

use std::sync::Arc;

use {
    anyhow::Context as _,
    clap::Parser,
    tracing::info,
    tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _},
};

use {
    zaprelay_common::{ChatClient, Config},
    zaprelay_dispatch::Dispatcher,
    zaprelay_gateway::{GatewayState, router},
};

use crate::bridge::BridgeClient;

#[derive(Parser)]
#[command(name = "zaprelay", about = "Chat-to-backend relay gateway", version)]
struct Cli {
    /// Address to bind the HTTP server to.
    #[arg(long, default_value = "0.0.0.0")]
    bind: String,

    /// Port override (falls back to the PORT environment variable).
    #[arg(long)]
    port: Option<u16>,

    /// Default log level when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = Config::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    info!(
        backend_url = %config.backend_url,
        bridge_url = %config.bridge_url,
        port = config.port,
        allowed_number = config.allowed_number.is_some(),
        "starting relay"
    );

    let client: Arc<dyn ChatClient> = Arc::new(BridgeClient::new(&config));
    let dispatcher = Arc::new(Dispatcher::new(&config, Arc::clone(&client)));
    let app = router(GatewayState::new(client, dispatcher));

    let addr = format!("{}:{}", cli.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .context("http server terminated")
}
