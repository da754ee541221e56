mod review;
mod row;
mod stats;

pub use review::{parse_count, Recommendation, ReviewRecord, TIMESTAMP_FORMAT};
pub use row::ReviewRow;
pub use stats::ProductStats;
