use scraper::{Html, Selector};
use tracing::debug;

use crate::error::Result;
use crate::models::ReviewRecord;
use super::field::{extract_attr, extract_text};
use super::selectors::{NEXT_PAGE, NEXT_PAGE_ATTR, PRODUCT_NAME, REVIEW_FRAGMENT};

/// Everything the walker needs from one listing page, detached from the
/// parsed document.
#[derive(Debug, Default)]
pub struct ReviewPage {
    pub reviews: Vec<ReviewRecord>,
    pub next_href: Option<String>,
}

pub fn parse_review_page(body: &str) -> Result<ReviewPage> {
    let document = Html::parse_document(body);
    let root = document.root_element();

    let mut reviews = Vec::new();
    if let Ok(selector) = Selector::parse(REVIEW_FRAGMENT) {
        for fragment in document.select(&selector) {
            reviews.push(ReviewRecord::from_fragment(fragment)?);
        }
    }

    let next_href = extract_attr(root, NEXT_PAGE, NEXT_PAGE_ATTR)
        .filter(|href| !href.trim().is_empty());

    debug!(reviews = reviews.len(), next = ?next_href, "Parsed review page");

    Ok(ReviewPage { reviews, next_href })
}

/// Product title from the product page; blank titles count as absent.
pub fn parse_product_name(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    extract_text(document.root_element(), PRODUCT_NAME).filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn page_without_reviews_or_next_link() {
        let page = parse_review_page("<html><body><p>Brak opinii</p></body></html>").unwrap();
        assert!(page.reviews.is_empty());
        assert!(page.next_href.is_none());
    }

    #[test]
    fn picks_up_reviews_and_next_link() {
        let body = r#"<html><body>
            <div class="js_product-review" data-entry-id="11"></div>
            <div class="js_product-review" data-entry-id="12"></div>
            <a class="pagination__next" href="/123/opinie-2">Następna</a>
        </body></html>"#;
        let page = parse_review_page(body).unwrap();
        let ids: Vec<_> = page.reviews.iter().map(|r| r.opinion_id.as_str()).collect();
        assert_eq!(ids, vec!["11", "12"]);
        assert_eq!(page.next_href.as_deref(), Some("/123/opinie-2"));
    }

    #[test]
    fn fragment_without_entry_id_is_fatal() {
        let body = r#"<div class="js_product-review"></div>"#;
        assert!(matches!(
            parse_review_page(body),
            Err(Error::ExtractionIntegrity { .. })
        ));
    }

    #[test]
    fn product_name() {
        let body = r#"<h1 class="product-top__product-info__name"> Kubek termiczny </h1>"#;
        assert_eq!(parse_product_name(body).as_deref(), Some("Kubek termiczny"));
        assert_eq!(parse_product_name("<h1 class=\"product-top__product-info__name\"> </h1>"), None);
        assert_eq!(parse_product_name("<p>404</p>"), None);
    }
}
