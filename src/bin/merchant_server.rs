//! Merchant lookup server
//!
//! Serves single-merchant resolution through one process-wide lookup cache,
//! plus search over the last batch results file.

use std::sync::Arc;

use anyhow::Context;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use merchant_resolver::api::{router, AppState};
use merchant_resolver::{AbrClient, LookupCache, Resolver, ResolverConfig, ResultsStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "merchant_resolver=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ResolverConfig::from_env().context("Failed to load configuration")?;

    let client = AbrClient::new(&config).context("Failed to create ABR client")?;
    let resolver = Resolver::new(Arc::new(client), config.ranking_policy()?)
        .with_verification(config.enable_verification);
    let cache = Arc::new(LookupCache::new(resolver));

    let results = match ResultsStore::load(&config.results_file) {
        Ok(store) => {
            info!(file = %config.results_file, rows = store.len(), "Loaded batch results");
            store
        }
        Err(e) => {
            warn!(
                file = %config.results_file,
                error = %e,
                "No batch results loaded; search will be empty"
            );
            ResultsStore::default()
        }
    };

    let app = router(AppState::new(cache, Arc::new(results))).layer(
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        ),
    );

    let addr = format!("0.0.0.0:{}", config.server_port);
    info!("Starting merchant server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
