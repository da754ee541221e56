use serde::{Deserialize, Serialize};

/// Aggregate view of one product's review set.
///
/// Every number here is derived from the reviews and recomputed whenever
/// they change; nothing is authored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product_id: String,
    pub product_name: Option<String>,
    pub opinions_count: usize,
    pub pros_count: usize,
    pub cons_count: usize,
    /// Mean star rating rounded to two decimals, `None` when there are no reviews.
    pub average_score: Option<f64>,
}

impl ProductStats {
    pub fn empty(product_id: impl Into<String>, product_name: Option<String>) -> Self {
        Self {
            product_id: product_id.into(),
            product_name,
            opinions_count: 0,
            pros_count: 0,
            cons_count: 0,
            average_score: None,
        }
    }
}
