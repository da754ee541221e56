use std::path::Path;

use tracing::{info, warn};

use crate::clients::PageFetcher;
use crate::error::{Error, Result};
use crate::models::{ProductStats, ReviewRecord};
use crate::services::pagination::PaginationWalker;
use crate::services::stats::{compute_stats, to_rows};
use crate::storage::{validate_product_id, ReviewTable, SnapshotStore};

/// One extraction run per call: name, reviews, stats, then both snapshots.
pub struct ProductService<F> {
    walker: PaginationWalker<F>,
    store: SnapshotStore,
}

impl<F: PageFetcher> ProductService<F> {
    pub fn new(walker: PaginationWalker<F>, store: SnapshotStore) -> Self {
        Self { walker, store }
    }

    /// Scrapes `product_id` from scratch and replaces its stored snapshot.
    ///
    /// A product page without a name is taken to mean the id does not
    /// exist; nothing is fetched or written after that.
    pub async fn extract(&self, product_id: &str) -> Result<ProductStats> {
        validate_product_id(product_id)?;
        info!(product_id = product_id, "Starting extraction");

        let page = self.walker.fetch_product_page(product_id).await?;
        let Some(product_name) = page.product_name() else {
            warn!(product_id = product_id, "No product name on page");
            return Err(Error::ProductNotFound {
                product_id: product_id.to_string(),
            });
        };

        let reviews = self.walker.collect_from(product_id, page).await?;
        let stats = compute_stats(product_id, Some(product_name), &reviews)?;

        self.store.export_reviews(product_id, &reviews).await?;
        self.store.export_stats(&stats).await?;

        info!(
            product_id = product_id,
            opinions_count = stats.opinions_count,
            average_score = ?stats.average_score,
            "Extraction complete"
        );

        Ok(stats)
    }

    pub async fn show(&self, product_id: &str) -> Result<(ProductStats, Vec<ReviewRecord>)> {
        self.store.import_product(product_id).await
    }

    /// Stats of every stored product, without loading their reviews.
    pub async fn list(&self) -> Result<Vec<ProductStats>> {
        let mut products = Vec::new();
        for product_id in self.store.list_products().await? {
            products.push(self.store.import_stats(&product_id).await?);
        }
        Ok(products)
    }

    /// Writes the stored reviews of `product_id` as a Parquet table.
    pub async fn export_table(&self, product_id: &str, output_path: &Path) -> Result<usize> {
        let reviews = self.store.import_reviews(product_id).await?;
        let rows = to_rows(&reviews)?;
        ReviewTable::write_parquet(&rows, output_path)?;
        info!(product_id = product_id, rows = rows.len(), path = ?output_path, "Wrote review table");
        Ok(rows.len())
    }
}
