pub mod field;
pub mod page;
pub mod selectors;

pub use field::{extract, Extracted};
pub use page::{parse_product_name, parse_review_page, ReviewPage};
pub use selectors::{FieldRule, ReviewField, FIELD_RULES};
