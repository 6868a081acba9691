use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{CatalogProduct, LineItem};
use crate::ports::StorefrontApiPort;
use std::sync::Arc;
use tracing::{debug, info};

/// 前台商品目录
pub struct CatalogService<A: StorefrontApiPort> {
    api: Arc<A>,
}

impl<A: StorefrontApiPort> CatalogService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// 已上架商品
    pub async fn list_products(&self) -> DomainResult<Vec<CatalogProduct>> {
        let products = self.api.list_products().await?;
        debug!("Catalog returned {} products", products.len());
        Ok(products)
    }

    /// 按当前目录价格生成行项目快照
    pub async fn line_item_for(&self, product_id: i64, quantity: u32) -> DomainResult<LineItem> {
        let product = self
            .list_products()
            .await?
            .into_iter()
            .find(|p| p.id == product_id)
            .ok_or(DomainError::ProductNotFound(product_id))?;

        info!("Snapshotting product {} at {}", product.id, product.display_price());
        LineItem::from_product(&product, quantity)
    }
}
