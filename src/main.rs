use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vitrine::config::Config;
use vitrine::crypto::MasterKey;
use vitrine::db::{AppState, create_pool, init_db};
use vitrine::payments::AsaasVerifier;

#[derive(Parser, Debug)]
#[command(name = "vitrine", version, about = "Checkout back end for digital products (PIX and card)")]
struct Cli {
    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH)
    #[arg(long)]
    database: Option<String>,

    /// Print a fresh MASTER_KEY value and exit
    #[arg(long)]
    generate_master_key: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.generate_master_key {
        println!("{}", MasterKey::generate_hex());
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env();
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    if config.uses_dev_admin_key() {
        anyhow::ensure!(config.dev_mode, "ADMIN_API_KEY must be set outside dev mode");
        tracing::warn!("Using the dev admin key");
    }
    let master_key = config.master_key().context("loading master key")?;

    let pool = create_pool(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path))?;
    {
        let conn = pool.get().context("getting a database connection")?;
        init_db(&conn).context("initializing schema")?;
    }

    let verifier = Arc::new(AsaasVerifier::new(
        pool.clone(),
        master_key.clone(),
        config.asaas_base_url.clone(),
    ));

    let state = AppState::new(
        pool,
        master_key,
        &config.admin_api_key,
        config.asaas_base_url.clone(),
        verifier,
        config.order_rate_limit_per_minute,
    );

    // Drop idle rate-limit keys
    let limiter = state.order_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    });

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    tracing::info!(
        addr = %addr,
        base_url = %config.base_url,
        dev_mode = config.dev_mode,
        "Vitrine listening"
    );

    axum::serve(
        listener,
        vitrine::app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
