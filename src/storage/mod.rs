pub mod json;
pub mod parquet;

pub use json::{validate_product_id, SnapshotStore};
pub use parquet::ReviewTable;
