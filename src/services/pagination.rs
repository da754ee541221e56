use std::collections::HashSet;

use tracing::{debug, info, warn};
use url::Url;

use crate::clients::PageFetcher;
use crate::config::ScraperConfig;
use crate::error::Result;
use crate::extractors::{parse_product_name, parse_review_page};
use crate::models::ReviewRecord;
use crate::utils::time::sleep_with_jitter;

/// A fetched product page: the product name lives here and it is also the
/// first page of reviews.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub url: Url,
    pub body: String,
}

impl ProductPage {
    pub fn product_name(&self) -> Option<String> {
        parse_product_name(&self.body)
    }
}

/// Follows a product's "next page" links and gathers every review on the way.
pub struct PaginationWalker<F> {
    fetcher: F,
    base_url: Url,
    max_pages: u32,
    page_delay_ms: u64,
}

impl<F: PageFetcher> PaginationWalker<F> {
    pub fn new(fetcher: F, settings: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(&settings.base_url)?,
            max_pages: settings.max_pages,
            page_delay_ms: settings.page_delay_ms,
        })
    }

    pub fn product_url(&self, product_id: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("/{product_id}#tab=reviews"))?)
    }

    pub async fn fetch_product_page(&self, product_id: &str) -> Result<ProductPage> {
        let url = self.product_url(product_id)?;
        let body = self.fetcher.fetch(url.as_str()).await?;
        Ok(ProductPage { url, body })
    }

    pub async fn fetch_product_name(&self, product_id: &str) -> Result<Option<String>> {
        let name = self.fetch_product_page(product_id).await?.product_name();
        debug!(product_id = product_id, name = ?name, "Extracted product name");
        Ok(name)
    }

    pub async fn collect_reviews(&self, product_id: &str) -> Result<Vec<ReviewRecord>> {
        let first = self.fetch_product_page(product_id).await?;
        self.collect_from(product_id, first).await
    }

    /// Collects reviews page by page starting at an already fetched product
    /// page, keeping page order and in-page order.
    ///
    /// Ends when a page has no next link, when the next link points at a
    /// page already visited, or after `max_pages` pages. Any fetch failure
    /// discards everything collected so far.
    pub async fn collect_from(&self, product_id: &str, first: ProductPage) -> Result<Vec<ReviewRecord>> {
        let mut reviews = Vec::new();
        let mut visited = HashSet::new();
        let mut prefetched = Some(first.body);
        let mut next = Some(first.url);
        let mut pages = 0u32;

        while let Some(url) = next.take() {
            if pages >= self.max_pages {
                warn!(
                    product_id = product_id,
                    max_pages = self.max_pages,
                    url = %url,
                    "Page limit reached, stopping"
                );
                break;
            }

            let mut page_key = url.clone();
            page_key.set_fragment(None);
            if !visited.insert(page_key) {
                warn!(product_id = product_id, url = %url, "Next link points back to a visited page, stopping");
                break;
            }

            let body = match prefetched.take() {
                Some(body) => body,
                None => {
                    sleep_with_jitter(self.page_delay_ms, self.page_delay_ms / 2).await;
                    self.fetcher.fetch(url.as_str()).await?
                }
            };
            pages += 1;

            let page = parse_review_page(&body)?;

            info!(
                product_id = product_id,
                page = pages,
                reviews = page.reviews.len(),
                "Collected review page"
            );

            reviews.extend(page.reviews);
            next = match page.next_href {
                Some(href) => Some(url.join(&href)?),
                None => None,
            };
        }

        info!(
            product_id = product_id,
            pages = pages,
            reviews = reviews.len(),
            "Finished collecting reviews"
        );

        Ok(reviews)
    }
}
