use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::timestamps;
use crate::domain::{CatalogProduct, Currency, Order};
use crate::infrastructure::config::storefront_config::StorefrontConfig;
use crate::ports::storefront_api_port::*;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use url::Url;

/// 后端返回的商品记录
///
/// 图片字段存在新旧两种写法，在这里一次性规范化为 `images`。
#[derive(Debug, Deserialize)]
struct ProductRecord {
    id: i64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    images: Option<Vec<String>>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    currency: Currency,
    current_price_amount: i64,
    #[serde(default)]
    formatted_price: Option<String>,
    #[serde(default)]
    published: bool,
    #[serde(default, alias = "stripe_product_id")]
    provider_product_id: Option<String>,
    #[serde(default, alias = "active_stripe_price_id")]
    active_provider_price_id: Option<String>,
    #[serde(default)]
    last_sync_status: Option<String>,
    #[serde(default, deserialize_with = "timestamps::option::deserialize")]
    last_sync_at: Option<DateTime<Utc>>,
}

impl ProductRecord {
    fn into_product(self) -> CatalogProduct {
        CatalogProduct {
            id: self.id,
            title: self.title,
            description: self.description,
            images: CatalogProduct::normalize_images(
                self.image_url,
                self.images.unwrap_or_default(),
            ),
            category: self.category,
            currency: self.currency,
            price_minor: self.current_price_amount,
            formatted_price: self.formatted_price,
            published: self.published,
            provider_product_id: self.provider_product_id,
            active_provider_price_id: self.active_provider_price_id,
            last_sync_status: self.last_sync_status,
            last_sync_at: self.last_sync_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductListEnvelope {
    products: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// 商城后端 HTTP 适配器
#[derive(Clone)]
pub struct HttpStorefrontApi {
    base_url: Url,
    client: Client,
}

impl HttpStorefrontApi {
    pub fn new(config: &StorefrontConfig) -> DomainResult<Self> {
        let base_url = Url::parse(&config.api_base_url).map_err(|e| {
            DomainError::ConfigurationError(format!(
                "Invalid STOREFRONT_API_URL {}: {}",
                config.api_base_url, e
            ))
        })?;

        let client = Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self { base_url, client })
    }

    /// 拼接接口地址，路径段会被百分号编码
    fn endpoint(&self, segments: &[&str]) -> DomainResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DomainError::ConfigurationError(format!(
                    "STOREFRONT_API_URL cannot be a base: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> DomainResult<Response> {
        let response = request.header("Accept", "application/json").send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read error body for status {}: {}", status, e);
                String::new()
            }
        };
        error!("Storefront API error: {} - {}", status, body);

        Err(DomainError::ApiError {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> DomainResult<T> {
        let response = self.send(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// 从 `{"detail": ...}` 中提取可读的错误信息
fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if !body.is_empty() => body.to_string(),
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
    }
}

fn not_found_as_order(err: DomainError, key: &str) -> DomainError {
    match err {
        DomainError::ApiError { status: 404, .. } => DomainError::OrderNotFound(key.to_string()),
        other => other,
    }
}

#[async_trait]
impl StorefrontApiPort for HttpStorefrontApi {
    async fn list_products(&self) -> DomainResult<Vec<CatalogProduct>> {
        let url = self.endpoint(&["products"])?;
        let envelope: ProductListEnvelope = self.send_json(self.client.get(url)).await?;
        debug!("Fetched {} published products", envelope.products.len());

        Ok(envelope
            .products
            .into_iter()
            .map(ProductRecord::into_product)
            .collect())
    }

    async fn list_admin_products(&self) -> DomainResult<Vec<CatalogProduct>> {
        let url = self.endpoint(&["products", "admin"])?;
        let records: Vec<ProductRecord> = self.send_json(self.client.get(url)).await?;
        debug!("Fetched {} admin products", records.len());

        Ok(records.into_iter().map(ProductRecord::into_product).collect())
    }

    async fn create_product(&self, draft: &ProductDraft) -> DomainResult<CatalogProduct> {
        let url = self.endpoint(&["products", "admin"])?;
        let record: ProductRecord = self.send_json(self.client.post(url).json(draft)).await?;
        Ok(record.into_product())
    }

    async fn update_product(&self, id: i64, draft: &ProductDraft) -> DomainResult<CatalogProduct> {
        let url = self.endpoint(&["products", "admin", &id.to_string()])?;
        let record: ProductRecord = self.send_json(self.client.put(url).json(draft)).await?;
        Ok(record.into_product())
    }

    async fn delete_product(&self, id: i64) -> DomainResult<()> {
        let url = self.endpoint(&["products", "admin", &id.to_string()])?;
        self.send(self.client.delete(url)).await?;
        Ok(())
    }

    async fn resync_product(&self, id: i64) -> DomainResult<()> {
        let url = self.endpoint(&["products", "admin", &id.to_string(), "resync"])?;
        self.send(self.client.post(url)).await?;
        Ok(())
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> DomainResult<CheckoutSession> {
        let url = self.endpoint(&["checkout", "session"])?;
        debug!("Creating checkout session for {} items", request.items.len());
        self.send_json(self.client.post(url).json(request)).await
    }

    async fn get_order(&self, id: i64) -> DomainResult<Order> {
        let key = id.to_string();
        let url = self.endpoint(&["orders", &key])?;
        self.send_json(self.client.get(url))
            .await
            .map_err(|e| not_found_as_order(e, &key))
    }

    async fn get_order_by_session(&self, session_id: &str) -> DomainResult<Order> {
        let url = self.endpoint(&["orders", "by-session", session_id])?;
        self.send_json(self.client.get(url))
            .await
            .map_err(|e| not_found_as_order(e, session_id))
    }
}
