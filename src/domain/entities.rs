use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::timestamps;
use crate::domain::value_objects::{Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 购物车行项目
///
/// 价格、标题、图片是加入购物车时的快照，仅用于展示；实际扣款金额以结算会话为准。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// 商品ID（购物车内唯一）
    pub product_id: i64,

    /// 数量（始终 >= 1）
    pub quantity: u32,

    /// 单价快照（分）
    pub unit_price_minor: i64,

    /// 币种
    pub currency: Currency,

    /// 展示标题
    pub display_title: String,

    /// 展示图片
    #[serde(default)]
    pub display_image: Option<String>,
}

impl LineItem {
    pub fn new(
        product_id: i64,
        quantity: u32,
        unit_price_minor: i64,
        currency: Currency,
        display_title: String,
        display_image: Option<String>,
    ) -> DomainResult<Self> {
        if quantity == 0 {
            return Err(DomainError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            product_id,
            quantity,
            unit_price_minor,
            currency,
            display_title,
            display_image,
        })
    }

    /// 从目录商品生成行项目，记录当前价格快照
    pub fn from_product(product: &CatalogProduct, quantity: u32) -> DomainResult<Self> {
        Self::new(
            product.id,
            quantity,
            product.price_minor,
            product.currency.clone(),
            product.title.clone(),
            product.primary_image().map(String::from),
        )
    }

    pub fn subtotal(&self) -> Money {
        Money::from_minor(
            self.unit_price_minor.saturating_mul(i64::from(self.quantity)),
            self.currency.clone(),
        )
    }
}

/// 购物车
///
/// 按商品ID去重的有序行项目集合。反序列化时校验不变量，
/// 重复的商品ID或数量为 0 的行都会使整份数据无效。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<LineItem>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(DomainError::ValidationError(format!(
                    "Line item {} has zero quantity",
                    item.product_id
                )));
            }
            if !seen.insert(item.product_id) {
                return Err(DomainError::ValidationError(format!(
                    "Duplicate line item for product {}",
                    item.product_id
                )));
            }
        }

        Ok(Self { items })
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, product_id: i64) -> Option<&LineItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 加入商品；已存在时只累加数量，保留首次加入时的快照字段
    pub fn add_item(&mut self, item: LineItem) -> DomainResult<()> {
        if item.quantity == 0 {
            return Err(DomainError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(item.quantity).ok_or_else(|| {
                    DomainError::ValidationError(format!(
                        "Quantity for product {} is too large",
                        item.product_id
                    ))
                })?;
            }
            None => self.items.push(item),
        }

        Ok(())
    }

    /// 设置数量；小于等于 0 等同于移除，商品不存在时不做任何事
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = quantity;
        }
    }

    pub fn remove_item(&mut self, product_id: i64) {
        self.items.retain(|i| i.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// 总金额（分），整数累加
    pub fn total(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |sum, item| sum.saturating_add(item.subtotal().to_minor()))
    }

    /// 商品总件数（数量之和，不是行数）
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    pub fn currency(&self) -> Currency {
        self.items
            .first()
            .map(|i| i.currency.clone())
            .unwrap_or_default()
    }

    pub fn formatted_total(&self) -> String {
        Money::from_minor(self.total(), self.currency()).to_string()
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = DomainError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

/// 订单行（后端记录的实际成交快照）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    pub quantity: u32,
    pub unit_amount_snapshot: i64,
}

/// 订单
///
/// 只能通过结算会话ID或订单ID从后端获取，是实际扣款金额的唯一依据。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,

    /// 订单状态（pending_payment / paid / failed / cancelled ...），本地不解释
    pub status: String,

    /// 下单时的总金额快照（分）
    pub total_amount_snapshot: i64,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default)]
    pub customer_email: Option<String>,

    #[serde(default)]
    pub items: Vec<OrderItem>,

    #[serde(deserialize_with = "timestamps::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount_snapshot, self.currency.clone())
    }
}

/// 目录商品（管理端视图包含同步状态字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,

    /// 规范化后的图片列表（可能为空）
    pub images: Vec<String>,

    pub category: Option<String>,
    pub currency: Currency,

    /// 当前价格（分）
    pub price_minor: i64,

    /// 后端提供的展示价格
    pub formatted_price: Option<String>,

    pub published: bool,
    pub provider_product_id: Option<String>,
    pub active_provider_price_id: Option<String>,
    pub last_sync_status: Option<String>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl CatalogProduct {
    /// 合并新旧两种图片字段：先 images 顺序，再补上不重复的 image_url
    pub fn normalize_images(image_url: Option<String>, images: Vec<String>) -> Vec<String> {
        let mut normalized: Vec<String> = Vec::with_capacity(images.len() + 1);
        for url in images.into_iter().chain(image_url) {
            let url = url.trim();
            if !url.is_empty() && !normalized.iter().any(|u| u == url) {
                normalized.push(url.to_string());
            }
        }
        normalized
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn price(&self) -> Money {
        Money::from_minor(self.price_minor, self.currency.clone())
    }

    pub fn display_price(&self) -> String {
        self.formatted_price
            .clone()
            .unwrap_or_else(|| self.price().to_string())
    }

    pub fn sync_label(&self) -> &str {
        self.last_sync_status.as_deref().unwrap_or("Not synced")
    }
}
