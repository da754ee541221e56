pub mod pagination;
pub mod product;
pub mod stats;

pub use pagination::{PaginationWalker, ProductPage};
pub use product::ProductService;
pub use stats::{compute_stats, normalize_rating};
