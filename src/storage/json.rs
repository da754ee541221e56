use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{ProductStats, ReviewRecord};

const OPINIONS_DIR: &str = "opinions";
const PRODUCTS_DIR: &str = "products";
const EXTENSION: &str = "json";

/// Product ids double as file names, so only `[A-Za-z0-9_-]` is allowed.
pub fn validate_product_id(product_id: &str) -> Result<()> {
    let valid = !product_id.is_empty()
        && product_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidProductId(product_id.to_string()))
    }
}

#[derive(Debug, Clone)]
/// `opinions/{id}.json` and `products/{id}.json` under one data directory.
/// The two documents are written separately, each one atomically.
pub struct SnapshotStore {
    root: PathBuf,
}

impl SnapshotStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn snapshot_path(&self, dir: &str, product_id: &str) -> Result<PathBuf> {
        validate_product_id(product_id)?;
        Ok(self.root.join(dir).join(format!("{product_id}.{EXTENSION}")))
    }

    /// Replaces the stored review list for `product_id`.
    pub async fn export_reviews(&self, product_id: &str, reviews: &[ReviewRecord]) -> Result<()> {
        let path = self.snapshot_path(OPINIONS_DIR, product_id)?;
        let documents: Vec<Map<String, Value>> = reviews.iter().map(ReviewRecord::to_dict).collect();
        write_atomic(&path, &to_pretty_json(&documents)?).await?;
        info!(product_id = product_id, reviews = reviews.len(), path = ?path, "Exported reviews");
        Ok(())
    }

    /// Replaces the stored stats for `stats.product_id`.
    pub async fn export_stats(&self, stats: &ProductStats) -> Result<()> {
        let path = self.snapshot_path(PRODUCTS_DIR, &stats.product_id)?;
        write_atomic(&path, &to_pretty_json(stats)?).await?;
        info!(product_id = %stats.product_id, path = ?path, "Exported stats");
        Ok(())
    }

    pub async fn import_stats(&self, product_id: &str) -> Result<ProductStats> {
        let path = self.snapshot_path(PRODUCTS_DIR, product_id)?;
        let bytes = read_snapshot(&path, product_id, "stats").await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn import_reviews(&self, product_id: &str) -> Result<Vec<ReviewRecord>> {
        let path = self.snapshot_path(OPINIONS_DIR, product_id)?;
        let bytes = read_snapshot(&path, product_id, "opinions").await?;
        let documents: Vec<Map<String, Value>> = serde_json::from_slice(&bytes)?;
        documents.into_iter().map(ReviewRecord::from_dict).collect()
    }

    /// Loads both snapshots; either one missing is [`Error::NotFound`].
    pub async fn import_product(&self, product_id: &str) -> Result<(ProductStats, Vec<ReviewRecord>)> {
        let stats = self.import_stats(product_id).await?;
        let reviews = self.import_reviews(product_id).await?;
        debug!(product_id = product_id, reviews = reviews.len(), "Imported product");
        Ok((stats, reviews))
    }

    /// Ids of all products with a stored stats snapshot, sorted.
    pub async fn list_products(&self) -> Result<Vec<String>> {
        let dir = self.root.join(PRODUCTS_DIR);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|stem| stem.to_str()) {
                if validate_product_id(id).is_ok() {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Four-space indentation, non-ASCII text kept as is.
fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Storage(format!("{} has no parent directory", path.display())))?;
    tokio::fs::create_dir_all(parent).await?;

    let tmp = path.with_extension(format!("{EXTENSION}.tmp"));
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

async fn read_snapshot(path: &Path, product_id: &str, snapshot: &'static str) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::NotFound {
            product_id: product_id.to_string(),
            snapshot,
        }),
        Err(e) => Err(e.into()),
    }
}
