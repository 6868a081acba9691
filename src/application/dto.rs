use crate::application::admin_catalog_service::ResyncOutcome;
use crate::domain::{Cart, CatalogProduct, LineItem, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

fn default_quantity() -> u32 {
    1
}

/// 加入购物车请求
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,

    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

/// 修改数量请求（小于等于 0 表示移除）
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// 购物车行展示
#[derive(Debug, Serialize)]
pub struct CartLineView {
    pub product_id: i64,
    pub quantity: u32,
    pub unit_price_minor: i64,
    pub formatted_unit_price: String,
    pub formatted_subtotal: String,
    pub display_title: String,
    pub display_image: Option<String>,
}

impl From<&LineItem> for CartLineView {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price_minor: item.unit_price_minor,
            formatted_unit_price: Money::from_minor(item.unit_price_minor, item.currency.clone())
                .to_string(),
            formatted_subtotal: item.subtotal().to_string(),
            display_title: item.display_title.clone(),
            display_image: item.display_image.clone(),
        }
    }
}

/// 购物车展示（金额仅供展示，实际扣款以结算会话为准）
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u64,
    pub total_minor: i64,
    pub formatted_total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            total_minor: cart.total(),
            formatted_total: cart.formatted_total(),
        }
    }
}

/// 管理端商品行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminProductRow {
    pub id: i64,
    pub title: String,
    pub primary_image: Option<String>,
    pub formatted_price: String,
    pub published: bool,

    /// Published / Draft
    pub status_label: String,

    /// 同步状态，未同步时为 "Not synced"
    pub sync_status: String,

    pub active_provider_price_id: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,

    /// 该商品是否正在同步
    pub syncing: bool,
}

impl AdminProductRow {
    pub fn project(product: &CatalogProduct, syncing: bool) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            primary_image: product.primary_image().map(String::from),
            formatted_price: product.display_price(),
            published: product.published,
            status_label: if product.published { "Published" } else { "Draft" }.to_string(),
            sync_status: product.sync_label().to_string(),
            active_provider_price_id: product.active_provider_price_id.clone(),
            last_sync_at: product.last_sync_at,
            syncing,
        }
    }
}

/// 重新同步响应：结果加上刷新后的列表
#[derive(Debug, Serialize)]
pub struct ResyncResponse {
    pub outcome: ResyncOutcome,
    pub products: Vec<AdminProductRow>,
}

/// 错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: String, message: String) -> Self {
        Self { error, message }
    }
}
