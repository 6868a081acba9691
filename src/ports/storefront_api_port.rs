use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::{CatalogProduct, Order};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 结算商品项（只带数量，价格以服务端为准）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutItem {
    pub product_id: i64,
    pub quantity: u32,
}

/// 创建结算会话请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,

    /// 支付成功回跳地址，包含会话ID占位符
    pub success_url: String,

    /// 取消支付回跳地址
    pub cancel_url: String,
}

/// 结算会话
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// 托管支付页地址（整页跳转，不直接请求）
    pub checkout_url: String,
    pub session_id: String,
}

/// 商品创建/更新参数
///
/// 更新时所有字段都可省略，未设置的字段不会出现在请求体中。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// 价格（分）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_price_amount: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
}

impl ProductDraft {
    /// 创建时必须提供标题和价格
    pub fn validate_for_create(&self) -> DomainResult<()> {
        if self.title.is_none() {
            return Err(DomainError::ValidationError("Title is required".to_string()));
        }
        if self.current_price_amount.is_none() {
            return Err(DomainError::ValidationError("Price is required".to_string()));
        }
        self.validate_for_update()
    }

    pub fn validate_for_update(&self) -> DomainResult<()> {
        if let Some(title) = &self.title {
            let len = title.trim().chars().count();
            if len == 0 || len > 255 {
                return Err(DomainError::ValidationError(
                    "Title must be 1-255 characters".to_string(),
                ));
            }
        }

        if let Some(amount) = self.current_price_amount {
            if amount <= 0 {
                return Err(DomainError::ValidationError(
                    "Price must be greater than 0".to_string(),
                ));
            }
        }

        if let Some(currency) = &self.currency {
            if currency.is_empty() || currency.len() > 3 {
                return Err(DomainError::ValidationError(
                    "Currency must be 1-3 characters".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// 商城后端接口端口
#[async_trait]
pub trait StorefrontApiPort: Send + Sync + 'static {
    /// 已上架商品列表
    async fn list_products(&self) -> DomainResult<Vec<CatalogProduct>>;

    /// 管理端商品列表（含草稿）
    async fn list_admin_products(&self) -> DomainResult<Vec<CatalogProduct>>;

    async fn create_product(&self, draft: &ProductDraft) -> DomainResult<CatalogProduct>;

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> DomainResult<CatalogProduct>;

    async fn delete_product(&self, id: i64) -> DomainResult<()>;

    /// 触发与支付服务商的商品/价格同步
    async fn resync_product(&self, id: i64) -> DomainResult<()>;

    /// 创建托管结算会话
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> DomainResult<CheckoutSession>;

    async fn get_order(&self, id: i64) -> DomainResult<Order>;

    /// 根据结算会话ID查询订单
    async fn get_order_by_session(&self, session_id: &str) -> DomainResult<Order>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_draft_requires_title_and_price() {
        let draft = ProductDraft {
            title: Some("Mug".to_string()),
            ..Default::default()
        };
        assert!(draft.validate_for_create().is_err());

        let draft = ProductDraft {
            title: Some("Mug".to_string()),
            current_price_amount: Some(1200),
            ..Default::default()
        };
        assert!(draft.validate_for_create().is_ok());
    }

    #[test]
    fn test_update_draft_validates_present_fields() {
        assert!(ProductDraft::default().validate_for_update().is_ok());

        let bad_price = ProductDraft {
            current_price_amount: Some(0),
            ..Default::default()
        };
        assert!(bad_price.validate_for_update().is_err());

        let bad_title = ProductDraft {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(bad_title.validate_for_update().is_err());

        let bad_currency = ProductDraft {
            currency: Some("dollar".to_string()),
            ..Default::default()
        };
        assert!(bad_currency.validate_for_update().is_err());
    }

    #[test]
    fn test_draft_omits_unset_fields() {
        let draft = ProductDraft {
            published: Some(true),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&draft).unwrap(), r#"{"published":true}"#);
    }
}
