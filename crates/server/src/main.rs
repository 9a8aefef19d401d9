use std::sync::Arc;

use auth_server::account::{AccountPolicy, AccountStore, InMemoryAccountStore, SeaOrmAccountStore};
use auth_server::api::{AppState, start_webserver};
use auth_server::config::load_config_or_panic;
use auth_server::issuer::JwtTokenIssuer;
use auth_server::service::TokenExchangeService;
use sea_orm::Database;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn initialize_standard_tracing() {
    let default_directives = "auth_server=info,tower_http=info,sea_orm=warn";
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    initialize_standard_tracing();

    let config = load_config_or_panic();
    let policy = AccountPolicy::from(&config);

    let store: Arc<dyn AccountStore> = if config.uses_memory_store() {
        tracing::warn!("Using the in-memory account store; accounts are lost on restart");
        Arc::new(InMemoryAccountStore::new(policy))
    } else {
        let db = Arc::new(Database::connect(&config.database_url).await?);
        Arc::new(SeaOrmAccountStore::new(db, policy))
    };

    let shutdown = CancellationToken::new();
    let state = AppState {
        exchange: Arc::new(TokenExchangeService::from_config(&config, store)),
        issuer: Arc::new(JwtTokenIssuer::new(&config.token)),
        shutdown: shutdown.clone(),
    };

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    start_webserver(state, &config.listen_addr).await
}
