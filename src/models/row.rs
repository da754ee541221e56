use chrono::NaiveDateTime;

use super::review::Recommendation;

/// A review flattened for tables and charts: the rating is a number,
/// timestamps are parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub opinion_id: String,
    pub author: Option<String>,
    pub recommendation: Recommendation,
    pub stars: f64,
    pub content: Option<String>,
    pub useful: Option<u32>,
    pub useless: Option<u32>,
    pub published: Option<NaiveDateTime>,
    pub purchased: Option<NaiveDateTime>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}
