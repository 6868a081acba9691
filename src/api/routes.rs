use super::handlers::*;
use crate::ports::{CartStoragePort, StorefrontApiPort};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

pub fn create_router<A: StorefrontApiPort, S: CartStoragePort>(state: AppState<A, S>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/products", get(list_products::<A, S>))
        .route("/cart", get(view_cart::<A, S>).delete(clear_cart::<A, S>))
        .route("/cart/items", post(add_item::<A, S>))
        .route(
            "/cart/items/:product_id",
            put(set_quantity::<A, S>).delete(remove_item::<A, S>),
        )
        .route("/checkout", post(checkout::<A, S>))
        .route("/success", get(checkout_success::<A, S>))
        .route("/cancel", get(checkout_cancel::<A, S>))
        .route("/orders/:id", get(get_order::<A, S>))
        .route(
            "/admin/products",
            get(admin_list_products::<A, S>).post(admin_create_product::<A, S>),
        )
        .route(
            "/admin/products/:id",
            put(admin_update_product::<A, S>).delete(admin_delete_product::<A, S>),
        )
        .route("/admin/products/:id/resync", post(admin_resync_product::<A, S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
