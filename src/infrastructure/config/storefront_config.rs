use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 商城客户端配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// 后端接口基础URL
    pub api_base_url: String,

    /// 本站对外地址，用于拼接支付回跳URL
    pub origin_url: String,

    /// 购物车持久化目录；未配置时使用内存存储
    pub cart_storage_dir: Option<PathBuf>,

    /// HTTP请求超时（秒）
    pub http_timeout_secs: u64,

    pub server_host: String,
    pub server_port: u16,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            origin_url: "http://localhost:3000".to_string(),
            cart_storage_dir: None,
            http_timeout_secs: 10,
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> DomainResult<Arc<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok()).map(Arc::new)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DomainResult<Self> {
        let defaults = Self::default();

        let http_timeout_secs = match lookup("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                DomainError::ConfigurationError(format!("HTTP_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            None => defaults.http_timeout_secs,
        };

        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw.parse().map_err(|_| {
                DomainError::ConfigurationError(format!("SERVER_PORT is not a valid port: {}", raw))
            })?,
            None => defaults.server_port,
        };

        Ok(Self {
            api_base_url: trim_url(lookup("STOREFRONT_API_URL").unwrap_or(defaults.api_base_url)),
            origin_url: trim_url(lookup("STOREFRONT_ORIGIN").unwrap_or(defaults.origin_url)),
            cart_storage_dir: lookup("CART_STORAGE_DIR")
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from),
            http_timeout_secs,
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
        })
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
