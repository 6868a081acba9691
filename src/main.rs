mod api;
mod application;
mod domain;
mod infrastructure;
mod ports;

use api::AppState;
use application::CartStore;
use infrastructure::{HttpStorefrontApi, InMemoryCartStorage, JsonFileCartStorage, StorefrontConfig};
use ports::CartStoragePort;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Starting storefront client...");

    let config = StorefrontConfig::from_env()?;
    info!("Storefront API: {}", config.api_base_url);
    info!("Return URLs rooted at: {}", config.origin_url);

    let api = Arc::new(HttpStorefrontApi::new(&config)?);

    match &config.cart_storage_dir {
        Some(dir) => {
            info!("Persisting cart under {}", dir.display());
            let storage = Arc::new(JsonFileCartStorage::new(dir)?);
            serve(&config, api, storage).await
        }
        None => {
            warn!("CART_STORAGE_DIR not set, cart will not survive restarts");
            serve(&config, api, Arc::new(InMemoryCartStorage::new())).await
        }
    }
}

async fn serve<S: CartStoragePort>(
    config: &StorefrontConfig,
    api: Arc<HttpStorefrontApi>,
    storage: Arc<S>,
) -> anyhow::Result<()> {
    let cart = Arc::new(CartStore::open(storage));
    let app_state = AppState::new(api, cart, &config.origin_url);
    let app = api::create_router(app_state);

    let addr = config.bind_addr();
    info!("Server listening on {}", addr);
    info!("Available endpoints:");
    info!("  GET  /products - Published catalog");
    info!("  GET  /cart, POST /cart/items - Cart");
    info!("  POST /checkout - Redirect to hosted checkout");
    info!("  GET  /success, GET /cancel - Checkout return pages");
    info!("  GET  /admin/products - Admin catalog and sync status");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
