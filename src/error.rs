use http::StatusCode;
use parquet::errors::ParquetError;
use arrow::error::ArrowError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Forbidden - Access denied")]
    Forbidden,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Review fragment has no '{attribute}' attribute")]
    ExtractionIntegrity { attribute: &'static str },

    #[error("Cannot parse star rating {raw:?}")]
    RatingParse { raw: String },

    #[error("No {snapshot} snapshot stored for product {product_id}")]
    NotFound {
        product_id: String,
        snapshot: &'static str,
    },

    #[error("Product {product_id} does not exist")]
    ProductNotFound { product_id: String },

    #[error("Invalid product id {0:?}")]
    InvalidProductId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

impl Error {
    /// Failures worth another attempt: throttling, server errors and
    /// connection-level trouble. Client errors are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::RateLimit => true,
            Error::Status { status, .. } => status.is_server_error(),
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::ProductNotFound { .. })
    }
}
