use crate::application::dto::AdminProductRow;
use crate::domain::errors::DomainResult;
use crate::domain::CatalogProduct;
use crate::ports::{ProductDraft, StorefrontApiPort};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{error, info, warn};

/// 重新同步的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResyncOutcome {
    Synced,

    /// 同一商品已有同步请求在进行
    InProgress,

    /// 失败提示，本地状态不变
    Failed { message: String },
}

/// 同步中标记，离开作用域时自动移除
struct SyncingGuard<'a> {
    syncing: &'a Mutex<HashSet<i64>>,
    product_id: i64,
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.product_id);
    }
}

/// 管理端商品目录与支付服务商同步状态
///
/// 同步状态只做展示，来源于后端；本地只按商品ID记录哪些商品正在同步。
/// 列表刷新按到达顺序覆盖（后到的响应生效）。
pub struct AdminCatalogService<A: StorefrontApiPort> {
    api: Arc<A>,
    products: RwLock<Vec<CatalogProduct>>,
    syncing: Mutex<HashSet<i64>>,
}

impl<A: StorefrontApiPort> AdminCatalogService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            products: RwLock::new(Vec::new()),
            syncing: Mutex::new(HashSet::new()),
        }
    }

    /// 当前已知列表的展示行
    pub fn rows(&self) -> Vec<AdminProductRow> {
        let syncing = self.syncing.lock().unwrap_or_else(PoisonError::into_inner);
        self.products
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|p| AdminProductRow::project(p, syncing.contains(&p.id)))
            .collect()
    }

    #[cfg(test)]
    pub fn is_syncing(&self, product_id: i64) -> bool {
        self.syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&product_id)
    }

    /// 重新拉取管理端商品列表
    pub async fn refresh(&self) -> DomainResult<Vec<AdminProductRow>> {
        let products = self.api.list_admin_products().await?;
        info!("Admin catalog refreshed: {} products", products.len());
        *self.products.write().unwrap_or_else(PoisonError::into_inner) = products;
        Ok(self.rows())
    }

    async fn refresh_after_change(&self) {
        if let Err(e) = self.refresh().await {
            warn!("Admin catalog refresh failed, keeping last known list: {}", e);
        }
    }

    /// 触发单个商品与支付服务商的同步，完成后（无论成败）刷新列表
    pub async fn resync(&self, product_id: i64) -> ResyncOutcome {
        let Some(guard) = self.begin_sync(product_id) else {
            info!("Resync already in progress for product {}", product_id);
            return ResyncOutcome::InProgress;
        };

        info!("Resyncing product {}", product_id);
        let result = self.api.resync_product(product_id).await;
        drop(guard);

        let outcome = match result {
            Ok(()) => {
                info!("Product {} resynced", product_id);
                ResyncOutcome::Synced
            }
            Err(e) => {
                error!("Resync failed for product {}: {}", product_id, e);
                ResyncOutcome::Failed {
                    message: "Failed to resync product".to_string(),
                }
            }
        };

        self.refresh_after_change().await;
        outcome
    }

    fn begin_sync(&self, product_id: i64) -> Option<SyncingGuard<'_>> {
        let inserted = self
            .syncing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(product_id);

        inserted.then_some(SyncingGuard {
            syncing: &self.syncing,
            product_id,
        })
    }

    pub async fn create_product(&self, draft: &ProductDraft) -> DomainResult<CatalogProduct> {
        draft.validate_for_create()?;
        let product = self.api.create_product(draft).await?;
        info!("Product created: {}", product.id);
        self.refresh_after_change().await;
        Ok(product)
    }

    pub async fn update_product(&self, id: i64, draft: &ProductDraft) -> DomainResult<CatalogProduct> {
        draft.validate_for_update()?;
        let product = self.api.update_product(id, draft).await?;
        info!("Product updated: {}", product.id);
        self.refresh_after_change().await;
        Ok(product)
    }

    pub async fn delete_product(&self, id: i64) -> DomainResult<()> {
        self.api.delete_product(id).await?;
        info!("Product removed: {}", id);
        self.refresh_after_change().await;
        Ok(())
    }
}
