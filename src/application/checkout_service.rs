use crate::domain::Cart;
use crate::ports::{CheckoutItem, CheckoutRequest, CheckoutSession, StorefrontApiPort};
use std::sync::Arc;
use tracing::{error, info};

/// 支付服务商回跳时替换为真实会话ID的占位符
pub const SESSION_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

/// 发起结算的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// 整页跳转到托管支付页
    Redirect(CheckoutSession),

    /// 购物车为空，未发起请求
    EmptyCart,

    /// 创建会话失败，购物车保持原样，可重试
    Failed { message: String },
}

/// 根据购物车构建结算请求，空购物车返回 None
pub fn build_checkout_request(cart: &Cart, origin_url: &str) -> Option<CheckoutRequest> {
    if cart.is_empty() {
        return None;
    }

    let origin = origin_url.trim_end_matches('/');
    Some(CheckoutRequest {
        items: cart
            .items()
            .iter()
            .map(|item| CheckoutItem {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect(),
        success_url: format!("{}/success?session_id={}", origin, SESSION_PLACEHOLDER),
        cancel_url: format!("{}/cancel", origin),
    })
}

/// 结算编排服务
///
/// 只负责把购物车交给托管支付页；支付结果通过回跳地址由 [`OrderReconciler`] 单独处理。
///
/// [`OrderReconciler`]: crate::application::OrderReconciler
pub struct CheckoutService<A: StorefrontApiPort> {
    api: Arc<A>,
}

impl<A: StorefrontApiPort> CheckoutService<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    pub async fn initiate_checkout(&self, cart: &Cart, origin_url: &str) -> CheckoutOutcome {
        let Some(request) = build_checkout_request(cart, origin_url) else {
            info!("Checkout skipped: cart is empty");
            return CheckoutOutcome::EmptyCart;
        };

        info!("Creating checkout session for {} line items", request.items.len());

        match self.api.create_checkout_session(&request).await {
            Ok(session) => {
                info!("Checkout session created: {}", session.session_id);
                CheckoutOutcome::Redirect(session)
            }
            Err(e) => {
                error!("Checkout session creation failed: {}", e);
                CheckoutOutcome::Failed {
                    message: "Failed to create checkout session. Please try again.".to_string(),
                }
            }
        }
    }
}
