pub mod pool;
pub mod http;

pub use pool::ClientPool;
pub use http::HttpClient;

use async_trait::async_trait;

use crate::error::Result;

/// Source of raw HTML pages, one request at a time.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    async fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url).await
    }
}
