use thiserror::Error;

/// 领域层错误类型
#[derive(Error, Debug)]
pub enum DomainError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 订单未找到
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// 商品未找到
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// 后端接口返回非成功状态
    #[error("Storefront API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// HTTP请求错误
    #[error("HTTP request error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// 本地存储错误
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// 领域结果类型
pub type DomainResult<T> = Result<T, DomainError>;
