use pokedex_core::Config;
use pokedex_core::server::{AppState, router};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn load_config() -> pokedex_core::Result<Config> {
    let path = std::env::var_os("POKEDEX_CONFIG").map(PathBuf::from);
    Config::load(path.as_deref())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format!(
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let state = match AppState::from_config(&config) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to initialize: {}", e);
            std::process::exit(1);
        }
    };

    let bind = config.server.bind.as_str();
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", bind, e);
            std::process::exit(1);
        }
    };

    match listener.local_addr() {
        Ok(addr) => tracing::info!("listening on {}", addr),
        Err(_) => tracing::info!("listening on {}", bind),
    }

    if let Err(e) = axum::serve(listener, router(state)).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
