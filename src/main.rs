//! Storefront - Small-Business Catalog Site
//!
//! Serves the public site of a small product-and-services business:
//!
//! - **Catalog**: hierarchical categories with descendant-inclusive
//!   product filtering and search
//! - **RFQ**: request-for-quotation submissions with a status lifecycle
//! - **Forms**: admin-defined dynamic forms with validation
//! - **Pages**: home, information, and contact content managed as
//!   single-instance records

use axum::{Router, routing::get};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = storefront::Config::init();

    info!(
        database = config.database_url.as_str(),
        bind_address = config.bind_address.as_str(),
        "Starting storefront service"
    );

    let db = storefront::Database::new(&config.database_url).await?;
    let state = storefront::AppState::new(db, config);
    let app = Router::new()
        .merge(storefront::routes())
        .nest("/api", storefront::api_routes())
        .route("/health", get(|| async { "OK" }))
        .with_state(state);

    info!("Listening on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
