//! 测试用的后端接口替身

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::entities::OrderItem;
use crate::domain::{CatalogProduct, Currency, Order};
use crate::ports::storefront_api_port::*;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;

#[derive(Default)]
pub struct FakeStorefrontApi {
    pub products: Mutex<Vec<CatalogProduct>>,
    pub orders_by_session: Mutex<HashMap<String, Order>>,
    pub checkout_requests: Mutex<Vec<CheckoutRequest>>,
    pub resync_calls: Mutex<Vec<i64>>,
    pub failing_resyncs: Mutex<HashSet<i64>>,
    pub resync_gates: Mutex<HashMap<i64, oneshot::Receiver<()>>>,
    pub fail_checkout: AtomicBool,
    pub order_lookups: AtomicUsize,
    pub admin_list_calls: AtomicUsize,
}

impl FakeStorefrontApi {
    pub fn with_products(products: Vec<CatalogProduct>) -> Self {
        let api = Self::default();
        *api.products.lock().unwrap() = products;
        api
    }

    pub fn add_paid_order(&self, session_id: &str, order_id: i64) {
        let order = Order {
            id: order_id,
            status: "paid".to_string(),
            total_amount_snapshot: 3000,
            currency: Currency::usd(),
            customer_email: Some("buyer@example.com".to_string()),
            items: vec![OrderItem {
                product_id: 1,
                quantity: 2,
                unit_amount_snapshot: 1500,
            }],
            created_at: Utc::now(),
        };
        self.orders_by_session
            .lock()
            .unwrap()
            .insert(session_id.to_string(), order);
    }

    /// 让指定商品的同步请求挂起，直到返回的发送端被触发
    pub fn gate_resync(&self, id: i64) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.resync_gates.lock().unwrap().insert(id, rx);
        tx
    }

    fn find_product(&self, id: i64) -> DomainResult<CatalogProduct> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(DomainError::ProductNotFound(id))
    }
}

#[async_trait]
impl StorefrontApiPort for FakeStorefrontApi {
    async fn list_products(&self) -> DomainResult<Vec<CatalogProduct>> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.published)
            .cloned()
            .collect())
    }

    async fn list_admin_products(&self) -> DomainResult<Vec<CatalogProduct>> {
        self.admin_list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.lock().unwrap().clone())
    }

    async fn create_product(&self, draft: &ProductDraft) -> DomainResult<CatalogProduct> {
        let mut products = self.products.lock().unwrap();
        let id = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        let product = CatalogProduct {
            id,
            title: draft.title.clone().unwrap_or_default(),
            description: draft.description.clone(),
            images: draft.images.clone().unwrap_or_default(),
            category: draft.category.clone(),
            currency: draft
                .currency
                .as_deref()
                .map(Currency::new)
                .unwrap_or_default(),
            price_minor: draft.current_price_amount.unwrap_or_default(),
            formatted_price: None,
            published: draft.published.unwrap_or(false),
            provider_product_id: None,
            active_provider_price_id: None,
            last_sync_status: None,
            last_sync_at: None,
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> DomainResult<CatalogProduct> {
        let mut product = self.find_product(id)?;
        if let Some(title) = &draft.title {
            product.title = title.clone();
        }
        if let Some(amount) = draft.current_price_amount {
            product.price_minor = amount;
        }
        if let Some(published) = draft.published {
            product.published = published;
        }

        let mut products = self.products.lock().unwrap();
        if let Some(slot) = products.iter_mut().find(|p| p.id == id) {
            *slot = product.clone();
        }
        Ok(product)
    }

    async fn delete_product(&self, id: i64) -> DomainResult<()> {
        self.find_product(id)?;
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn resync_product(&self, id: i64) -> DomainResult<()> {
        self.resync_calls.lock().unwrap().push(id);

        let gate = self.resync_gates.lock().unwrap().remove(&id);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if self.failing_resyncs.lock().unwrap().contains(&id) {
            return Err(DomainError::ApiError {
                status: 502,
                message: "provider unavailable".to_string(),
            });
        }

        let mut products = self.products.lock().unwrap();
        if let Some(product) = products.iter_mut().find(|p| p.id == id) {
            product.last_sync_status = Some("success".to_string());
            product.active_provider_price_id = Some(format!("price_{}", id));
            product.last_sync_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> DomainResult<CheckoutSession> {
        self.checkout_requests.lock().unwrap().push(request.clone());

        if self.fail_checkout.load(Ordering::SeqCst) {
            return Err(DomainError::ApiError {
                status: 500,
                message: "Failed to create checkout session".to_string(),
            });
        }

        Ok(CheckoutSession {
            checkout_url: "https://pay.example/c/cs_test_1".to_string(),
            session_id: "cs_test_1".to_string(),
        })
    }

    async fn get_order(&self, id: i64) -> DomainResult<Order> {
        self.orders_by_session
            .lock()
            .unwrap()
            .values()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| DomainError::OrderNotFound(id.to_string()))
    }

    async fn get_order_by_session(&self, session_id: &str) -> DomainResult<Order> {
        self.order_lookups.fetch_add(1, Ordering::SeqCst);
        self.orders_by_session
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| DomainError::OrderNotFound(session_id.to_string()))
    }
}
