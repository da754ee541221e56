use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::clients::http::HttpClient;
use crate::clients::PageFetcher;
use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::utils::retry_with_backoff;

const BROWSER_AGENTS: [&str; 4] = [
    "Mozilla/5.0 (X11; Linux x86_64; rv:136.0) Gecko/20100101 Firefox/136.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.3 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36 Edg/134.0.0.0",
];

/// Round-robin over clients that present as different browsers.
pub struct ClientPool {
    clients: Vec<HttpClient>,
    current: AtomicUsize,
    max_retries: u32,
    base_delay_ms: u64,
}

impl ClientPool {
    pub fn new(settings: &ScraperConfig) -> Result<Self> {
        debug!("Creating client pool with {} browser profiles", BROWSER_AGENTS.len());

        let clients = BROWSER_AGENTS
            .iter()
            .map(|agent| HttpClient::new(settings, agent))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            clients,
            current: AtomicUsize::new(0),
            max_retries: settings.max_retries,
            base_delay_ms: settings.base_delay_ms,
        })
    }

    pub fn next_client(&self) -> &HttpClient {
        let current = self.current.fetch_add(1, Ordering::SeqCst);
        &self.clients[current % self.clients.len()]
    }
}

/// A 403 is usually aimed at one browser profile, so it is retried on
/// the next client along with the ordinary transient failures.
fn worth_retrying(error: &Error) -> bool {
    error.is_transient() || matches!(error, Error::Forbidden)
}

#[async_trait]
impl PageFetcher for ClientPool {
    async fn fetch(&self, url: &str) -> Result<String> {
        retry_with_backoff(self.max_retries, self.base_delay_ms, worth_retrying, || async {
            let client = self.next_client();
            debug!(url = url, "Fetching page");
            client.fetch_text(url).await
        })
        .await
    }
}
