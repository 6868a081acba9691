use crate::application::{
    AddItemRequest, AdminCatalogService, AdminProductRow, CartStore, CartView, CatalogService,
    CheckoutOutcome, CheckoutService, ErrorResponse, OrderReconciler, ReconciliationOutcome,
    ResyncOutcome, ResyncResponse, ReturnRoute, SetQuantityRequest,
};
use crate::domain::errors::DomainError;
use crate::domain::{CatalogProduct, Order};
use crate::ports::{CartStoragePort, ProductDraft, StorefrontApiPort};
use axum::{
    extract::{OriginalUri, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Json, Redirect, Response},
};
use std::sync::Arc;
use tracing::{error, info, warn};

/// 应用状态
pub struct AppState<A: StorefrontApiPort, S: CartStoragePort> {
    pub cart: Arc<CartStore<S>>,
    pub catalog: Arc<CatalogService<A>>,
    pub checkout: Arc<CheckoutService<A>>,
    pub reconciler: Arc<OrderReconciler<A, S>>,
    pub admin: Arc<AdminCatalogService<A>>,
    pub origin_url: Arc<str>,
}

impl<A: StorefrontApiPort, S: CartStoragePort> AppState<A, S> {
    pub fn new(api: Arc<A>, cart: Arc<CartStore<S>>, origin_url: &str) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(api.clone())),
            checkout: Arc::new(CheckoutService::new(api.clone())),
            reconciler: Arc::new(OrderReconciler::new(api.clone(), cart.clone())),
            admin: Arc::new(AdminCatalogService::new(api)),
            cart,
            origin_url: Arc::from(origin_url),
        }
    }
}

impl<A: StorefrontApiPort, S: CartStoragePort> Clone for AppState<A, S> {
    fn clone(&self) -> Self {
        Self {
            cart: self.cart.clone(),
            catalog: self.catalog.clone(),
            checkout: self.checkout.clone(),
            reconciler: self.reconciler.clone(),
            admin: self.admin.clone(),
            origin_url: self.origin_url.clone(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(code: &str, e: DomainError) -> ApiError {
    error!("{}: {}", code, e);
    let status = match &e {
        DomainError::ValidationError(_) => StatusCode::BAD_REQUEST,
        DomainError::OrderNotFound(_) | DomainError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::ApiError { .. } | DomainError::HttpError(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(code.to_string(), e.to_string())))
}

fn cart_view<S: CartStoragePort>(cart: &CartStore<S>) -> Json<CartView> {
    Json(CartView::from(&cart.snapshot()))
}

/// 前台商品列表
pub async fn list_products<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
) -> Result<Json<Vec<CatalogProduct>>, ApiError> {
    state
        .catalog
        .list_products()
        .await
        .map(Json)
        .map_err(|e| error_response("CATALOG_ERROR", e))
}

pub async fn view_cart<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
) -> Json<CartView> {
    cart_view(&state.cart)
}

/// 加入购物车（按当前目录价格记录快照）
pub async fn add_item<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    info!("Add to cart: product {} x {}", request.product_id, request.quantity);

    let item = state
        .catalog
        .line_item_for(request.product_id, request.quantity)
        .await
        .map_err(|e| error_response("CART_ERROR", e))?;

    state
        .cart
        .add_item(item)
        .map_err(|e| error_response("CART_ERROR", e))?;

    Ok(cart_view(&state.cart))
}

pub async fn set_quantity<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Path(product_id): Path<i64>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartView>, ApiError> {
    state
        .cart
        .set_quantity(product_id, request.quantity)
        .map_err(|e| error_response("CART_ERROR", e))?;

    Ok(cart_view(&state.cart))
}

pub async fn remove_item<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Path(product_id): Path<i64>,
) -> Result<Json<CartView>, ApiError> {
    state
        .cart
        .remove_item(product_id)
        .map_err(|e| error_response("CART_ERROR", e))?;

    Ok(cart_view(&state.cart))
}

pub async fn clear_cart<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
) -> Result<Json<CartView>, ApiError> {
    state
        .cart
        .clear()
        .map_err(|e| error_response("CART_ERROR", e))?;

    Ok(cart_view(&state.cart))
}

/// 发起结算：成功时 303 跳转到托管支付页
pub async fn checkout<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
) -> Response {
    let cart = state.cart.snapshot();

    match state.checkout.initiate_checkout(&cart, &state.origin_url).await {
        CheckoutOutcome::Redirect(session) => Redirect::to(&session.checkout_url).into_response(),
        CheckoutOutcome::EmptyCart => StatusCode::NO_CONTENT.into_response(),
        CheckoutOutcome::Failed { message } => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::new("CHECKOUT_ERROR".to_string(), message)),
        )
            .into_response(),
    }
}

/// 按站点地址还原完整回跳URL，无法解析时按取消处理
fn return_route(origin_url: &str, uri: &Uri) -> ReturnRoute {
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let return_url = format!("{}{}", origin_url, path_and_query);

    ReturnRoute::parse(&return_url).unwrap_or_else(|e| {
        warn!("Treating unparseable return URL as cancelled: {}", e);
        ReturnRoute::Cancelled
    })
}

/// 支付成功回跳页
pub async fn checkout_success<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<ReconciliationOutcome>) {
    let route = return_route(&state.origin_url, &uri);
    let outcome = state.reconciler.resolve(route).await;

    let status = match outcome {
        ReconciliationOutcome::LookupFailed { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (status, Json(outcome))
}

/// 取消支付回跳页
pub async fn checkout_cancel<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    OriginalUri(uri): OriginalUri,
) -> Json<ReconciliationOutcome> {
    let route = return_route(&state.origin_url, &uri);
    Json(state.reconciler.resolve(route).await)
}

pub async fn get_order<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Path(id): Path<i64>,
) -> Result<Json<Order>, ApiError> {
    state
        .reconciler
        .get_order(id)
        .await
        .map(Json)
        .map_err(|e| error_response("ORDER_ERROR", e))
}

/// 管理端商品列表（每次请求都重新拉取）
pub async fn admin_list_products<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
) -> Result<Json<Vec<AdminProductRow>>, ApiError> {
    state
        .admin
        .refresh()
        .await
        .map(Json)
        .map_err(|e| error_response("ADMIN_ERROR", e))
}

pub async fn admin_create_product<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<CatalogProduct>), ApiError> {
    state
        .admin
        .create_product(&draft)
        .await
        .map(|product| (StatusCode::CREATED, Json(product)))
        .map_err(|e| error_response("ADMIN_ERROR", e))
}

pub async fn admin_update_product<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Path(id): Path<i64>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<CatalogProduct>, ApiError> {
    state
        .admin
        .update_product(id, &draft)
        .await
        .map(Json)
        .map_err(|e| error_response("ADMIN_ERROR", e))
}

pub async fn admin_delete_product<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state
        .admin
        .delete_product(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|e| error_response("ADMIN_ERROR", e))
}

pub async fn admin_resync_product<A: StorefrontApiPort, S: CartStoragePort>(
    State(state): State<AppState<A, S>>,
    Path(id): Path<i64>,
) -> (StatusCode, Json<ResyncResponse>) {
    let outcome = state.admin.resync(id).await;

    let status = match outcome {
        ResyncOutcome::Synced => StatusCode::OK,
        ResyncOutcome::InProgress => StatusCode::CONFLICT,
        ResyncOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
    };
    let products = state.admin.rows();
    (status, Json(ResyncResponse { outcome, products }))
}

/// 健康检查
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}
