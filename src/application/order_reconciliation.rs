use crate::application::cart_store::CartStore;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::Order;
use crate::ports::{CartStoragePort, StorefrontApiPort};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};
use url::Url;

/// 支付回跳路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnRoute {
    /// 带会话ID回到成功页
    Success { session_id: String },

    /// 取消支付，或成功页缺少会话ID
    Cancelled,
}

impl ReturnRoute {
    /// 空白的会话ID视为缺失
    pub fn from_session_param(session_id: Option<String>) -> Self {
        match session_id {
            Some(id) if !id.trim().is_empty() => Self::Success {
                session_id: id.trim().to_string(),
            },
            _ => Self::Cancelled,
        }
    }

    /// 解析完整回跳URL：只有 `/success` 且带 `session_id` 才是成功
    pub fn parse(return_url: &str) -> DomainResult<Self> {
        let url = Url::parse(return_url).map_err(|e| {
            DomainError::ValidationError(format!("Invalid return URL {}: {}", return_url, e))
        })?;

        if !url.path().trim_end_matches('/').ends_with("/success") {
            return Ok(Self::Cancelled);
        }

        let session_id = url
            .query_pairs()
            .find(|(key, _)| key == "session_id")
            .map(|(_, value)| value.into_owned());
        Ok(Self::from_session_param(session_id))
    }
}

/// 回跳处理结果，直接用于页面展示
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReconciliationOutcome {
    /// 订单已确认
    Success { order: Order, cart_cleared: bool },

    /// 用户取消，购物车保持不变
    Cancelled,

    /// 订单查询失败，购物车保持不变
    LookupFailed { session_id: String, message: String },
}

/// 订单对账
///
/// 用回跳URL中的会话ID向后端查询订单；查询成功才清空购物车，
/// 同一会话ID在进程生命周期内只清空一次。
pub struct OrderReconciler<A: StorefrontApiPort, S: CartStoragePort> {
    api: Arc<A>,
    cart: Arc<CartStore<S>>,
    confirmed_sessions: Mutex<HashSet<String>>,
}

impl<A: StorefrontApiPort, S: CartStoragePort> OrderReconciler<A, S> {
    pub fn new(api: Arc<A>, cart: Arc<CartStore<S>>) -> Self {
        Self {
            api,
            cart,
            confirmed_sessions: Mutex::new(HashSet::new()),
        }
    }

    pub async fn resolve(&self, route: ReturnRoute) -> ReconciliationOutcome {
        match route {
            ReturnRoute::Success { session_id } => self.resolve_session(&session_id).await,
            ReturnRoute::Cancelled => {
                info!("Checkout cancelled, cart left untouched");
                ReconciliationOutcome::Cancelled
            }
        }
    }

    pub async fn resolve_session(&self, session_id: &str) -> ReconciliationOutcome {
        info!("Resolving checkout session: {}", session_id);

        let order = match self.api.get_order_by_session(session_id).await {
            Ok(order) => order,
            Err(e) => {
                error!("Order lookup failed for session {}: {}", session_id, e);
                return ReconciliationOutcome::LookupFailed {
                    session_id: session_id.to_string(),
                    message: e.to_string(),
                };
            }
        };

        let first_confirmation = self.mark_confirmed(session_id);
        let cart_cleared = if first_confirmation {
            match self.cart.clear() {
                Ok(()) => true,
                Err(e) => {
                    error!("Order {} confirmed but cart could not be cleared: {}", order.id, e);
                    self.unmark_confirmed(session_id);
                    false
                }
            }
        } else {
            warn!("Session {} already reconciled, cart not cleared again", session_id);
            false
        };

        info!(
            "Order {} confirmed with status {} ({})",
            order.id,
            order.status,
            order.total()
        );
        ReconciliationOutcome::Success {
            order,
            cart_cleared,
        }
    }

    /// 直接按订单ID查询（不经过回跳流程，不影响购物车）
    pub async fn get_order(&self, id: i64) -> DomainResult<Order> {
        self.api.get_order(id).await
    }

    fn mark_confirmed(&self, session_id: &str) -> bool {
        self.confirmed_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.to_string())
    }

    fn unmark_confirmed(&self, session_id: &str) {
        self.confirmed_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures::line_item;
    use crate::infrastructure::InMemoryCartStorage;
    use crate::ports::testing::FakeStorefrontApi;
    use std::sync::atomic::Ordering;

    fn setup() -> (
        Arc<FakeStorefrontApi>,
        Arc<CartStore<InMemoryCartStorage>>,
        OrderReconciler<FakeStorefrontApi, InMemoryCartStorage>,
    ) {
        let api = Arc::new(FakeStorefrontApi::default());
        let cart = Arc::new(CartStore::open(Arc::new(InMemoryCartStorage::new())));
        cart.add_item(line_item(1, 2, 1500)).unwrap();
        let reconciler = OrderReconciler::new(api.clone(), cart.clone());
        (api, cart, reconciler)
    }

    #[test]
    fn test_parse_return_urls() {
        assert_eq!(
            ReturnRoute::parse("https://shop.example/success?session_id=cs_1").unwrap(),
            ReturnRoute::Success {
                session_id: "cs_1".to_string()
            }
        );
        assert_eq!(
            ReturnRoute::parse("https://shop.example/success").unwrap(),
            ReturnRoute::Cancelled
        );
        assert_eq!(
            ReturnRoute::parse("https://shop.example/success?session_id=").unwrap(),
            ReturnRoute::Cancelled
        );
        assert_eq!(
            ReturnRoute::parse("https://shop.example/cancel?session_id=cs_1").unwrap(),
            ReturnRoute::Cancelled
        );
        assert!(ReturnRoute::parse("not a url").is_err());
    }

    #[tokio::test]
    async fn test_success_clears_cart() {
        let (api, cart, reconciler) = setup();
        api.add_paid_order("cs_1", 10);

        let outcome = reconciler
            .resolve(ReturnRoute::parse("https://shop.example/success?session_id=cs_1").unwrap())
            .await;

        match outcome {
            ReconciliationOutcome::Success {
                order,
                cart_cleared,
            } => {
                assert_eq!(order.id, 10);
                assert!(cart_cleared);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_is_cancelled_without_lookup() {
        let (api, cart, reconciler) = setup();

        let outcome = reconciler
            .resolve(ReturnRoute::from_session_param(None))
            .await;

        assert_eq!(outcome, ReconciliationOutcome::Cancelled);
        assert_eq!(api.order_lookups.load(Ordering::SeqCst), 0);
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_cart() {
        let (_api, cart, reconciler) = setup();

        let outcome = reconciler.resolve_session("cs_missing").await;

        assert!(matches!(
            outcome,
            ReconciliationOutcome::LookupFailed { ref session_id, .. } if session_id == "cs_missing"
        ));
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_does_not_clear_twice() {
        let (api, cart, reconciler) = setup();
        api.add_paid_order("cs_1", 10);

        let first = reconciler.resolve_session("cs_1").await;
        assert!(matches!(first, ReconciliationOutcome::Success { cart_cleared: true, .. }));

        // 用户在重新加载前又加了商品
        cart.add_item(line_item(2, 1, 500)).unwrap();

        let second = reconciler.resolve_session("cs_1").await;
        assert!(matches!(second, ReconciliationOutcome::Success { cart_cleared: false, .. }));
        assert_eq!(cart.item_count(), 1);
        assert_eq!(api.order_lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_outcome_serializes_with_state_tag() {
        let (_api, _cart, reconciler) = setup();

        let outcome = reconciler.resolve(ReturnRoute::Cancelled).await;
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["state"], "cancelled");
    }
}
