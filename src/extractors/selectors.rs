use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::Selector;

/// Container of a single review on a listing page.
pub const REVIEW_FRAGMENT: &str = "div.js_product-review";

/// Attribute on the review container holding the site's own review id.
pub const ENTRY_ID_ATTR: &str = "data-entry-id";

pub const NEXT_PAGE: &str = "a.pagination__next";
pub const NEXT_PAGE_ATTR: &str = "href";

pub const PRODUCT_NAME: &str = "h1.product-top__product-info__name";

/// Key under which the identifier is serialized, ahead of the registry fields.
pub const ID_KEY: &str = "opinion_id";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewField {
    Author,
    Recommendation,
    Stars,
    Content,
    Useful,
    Useless,
    Published,
    Purchased,
    Pros,
    Cons,
}

impl ReviewField {
    pub const fn name(self) -> &'static str {
        match self {
            ReviewField::Author => "author",
            ReviewField::Recommendation => "recommendation",
            ReviewField::Stars => "stars",
            ReviewField::Content => "content",
            ReviewField::Useful => "useful",
            ReviewField::Useless => "useless",
            ReviewField::Published => "published",
            ReviewField::Purchased => "purchased",
            ReviewField::Pros => "pros",
            ReviewField::Cons => "cons",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: ReviewField,
    pub selector: &'static str,
    pub attribute: Option<&'static str>,
    pub collect_all: bool,
}

impl FieldRule {
    const fn text(field: ReviewField, selector: &'static str) -> Self {
        Self { field, selector, attribute: None, collect_all: false }
    }

    const fn attr(field: ReviewField, selector: &'static str, attribute: &'static str) -> Self {
        Self { field, selector, attribute: Some(attribute), collect_all: false }
    }

    const fn list(field: ReviewField, selector: &'static str) -> Self {
        Self { field, selector, attribute: None, collect_all: true }
    }

    /// Parsed form of `selector`, compiled once per process.
    pub fn compiled(&self) -> Option<&'static Selector> {
        COMPILED.get(self.selector)
    }
}

// Order here is the field order of extraction and of stored snapshots.
pub static FIELD_RULES: [FieldRule; 10] = [
    FieldRule::text(ReviewField::Author, "span.user-post__author-name"),
    FieldRule::text(ReviewField::Recommendation, "span.user-post__author-recomendation > em"),
    FieldRule::text(ReviewField::Stars, "span.user-post__score-count"),
    FieldRule::text(ReviewField::Content, "div.user-post__text"),
    FieldRule::text(ReviewField::Useful, "button.vote-yes > span"),
    FieldRule::text(ReviewField::Useless, "button.vote-no > span"),
    // first and second <time> of the same span
    FieldRule::attr(ReviewField::Published, "span.user-post__published > time:nth-child(1)", "datetime"),
    FieldRule::attr(ReviewField::Purchased, "span.user-post__published > time:nth-child(2)", "datetime"),
    FieldRule::list(ReviewField::Pros, "div[class$=positives] ~ div.review-feature__item"),
    FieldRule::list(ReviewField::Cons, "div[class$=negatives] ~ div.review-feature__item"),
];

static COMPILED: LazyLock<HashMap<&'static str, Selector>> = LazyLock::new(|| {
    FIELD_RULES
        .iter()
        .filter_map(|rule| Selector::parse(rule.selector).ok().map(|parsed| (rule.selector, parsed)))
        .collect()
});

/// Field names in serialization order, identifier first.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    std::iter::once(ID_KEY).chain(FIELD_RULES.iter().map(|rule| rule.field.name()))
}
