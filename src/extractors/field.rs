use scraper::{ElementRef, Selector};

use super::selectors::FieldRule;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    Text(Option<String>),
    List(Vec<String>),
}

impl Extracted {
    pub fn into_text(self) -> Option<String> {
        match self {
            Extracted::Text(value) => value,
            Extracted::List(_) => None,
        }
    }

    pub fn into_list(self) -> Vec<String> {
        match self {
            Extracted::Text(value) => value.into_iter().collect(),
            Extracted::List(values) => values,
        }
    }
}

/// Applies one registry rule to `node`. A selector that does not parse
/// matches nothing.
pub fn extract(node: ElementRef<'_>, rule: &FieldRule) -> Extracted {
    let Some(selector) = rule.compiled() else {
        return if rule.collect_all {
            Extracted::List(vec![])
        } else {
            Extracted::Text(None)
        };
    };

    if rule.collect_all {
        return Extracted::List(all_texts(node, selector));
    }
    match rule.attribute {
        Some(attribute) => Extracted::Text(first_attr(node, selector, attribute)),
        None => Extracted::Text(first_text(node, selector)),
    }
}

/// Trimmed text of the first descendant matching `selector`.
pub fn extract_text(node: ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    first_text(node, &selector)
}

pub fn extract_attr(node: ElementRef<'_>, selector: &str, attribute: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    first_attr(node, &selector, attribute)
}

/// Trimmed text of every descendant matching `selector`, in document order.
pub fn extract_all(node: ElementRef<'_>, selector: &str) -> Vec<String> {
    match Selector::parse(selector) {
        Ok(selector) => all_texts(node, &selector),
        Err(_) => vec![],
    }
}

fn first_text(node: ElementRef<'_>, selector: &Selector) -> Option<String> {
    node.select(selector).next().map(element_text)
}

fn first_attr(node: ElementRef<'_>, selector: &Selector, attribute: &str) -> Option<String> {
    node.select(selector)
        .next()
        .and_then(|el| el.value().attr(attribute).map(String::from))
}

fn all_texts(node: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    node.select(selector).map(element_text).collect()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::selectors::{FIELD_RULES, REVIEW_FRAGMENT};
    use scraper::Html;

    fn first_fragment(html: &Html) -> ElementRef<'_> {
        let selector = Selector::parse(REVIEW_FRAGMENT).unwrap();
        html.select(&selector).next().unwrap()
    }

    #[test]
    fn empty_fragment_yields_nothing_for_every_rule() {
        let html = Html::parse_fragment(r#"<div class="js_product-review" data-entry-id="1"></div>"#);
        let node = first_fragment(&html);

        for rule in &FIELD_RULES {
            let expected = if rule.collect_all {
                Extracted::List(vec![])
            } else {
                Extracted::Text(None)
            };
            assert_eq!(extract(node, rule), expected, "{}", rule.field.name());
        }
    }

    #[test]
    fn text_is_trimmed() {
        let html = Html::parse_fragment(
            r#"<div class="js_product-review"><span class="user-post__author-name">
                Jan K.
            </span></div>"#,
        );
        let node = first_fragment(&html);
        assert_eq!(extract_text(node, "span.user-post__author-name").as_deref(), Some("Jan K."));
    }

    #[test]
    fn missing_attribute_is_none() {
        let html = Html::parse_fragment(
            r#"<div class="js_product-review"><span class="user-post__published"><time>x</time></span></div>"#,
        );
        let node = first_fragment(&html);
        assert_eq!(extract_attr(node, "span.user-post__published > time", "datetime"), None);
        assert_eq!(extract_attr(node, "span.nothing-here", "datetime"), None);
    }

    #[test]
    fn bad_selector_folds_to_empty() {
        let html = Html::parse_fragment(r#"<div class="js_product-review"><p>a</p></div>"#);
        let node = first_fragment(&html);
        assert_eq!(extract_text(node, "p[[["), None);
        assert!(extract_all(node, "p[[[").is_empty());
    }

    #[test]
    fn collect_all_keeps_document_order() {
        let html = Html::parse_fragment(
            r#"<div class="js_product-review">
                <div class="review-feature__col">
                    <div class="review-feature__title review-feature__title--positives">Zalety</div>
                    <div class="review-feature__item"> cena </div>
                    <div class="review-feature__item">jakość</div>
                </div>
            </div>"#,
        );
        let node = first_fragment(&html);
        let pros = extract_all(node, "div[class$=positives] ~ div.review-feature__item");
        assert_eq!(pros, vec!["cena", "jakość"]);
    }

    #[test]
    fn registry_rule_and_string_lookup_agree() {
        let html = Html::parse_fragment(
            r#"<div class="js_product-review"><div class="user-post__text"> Dobry </div></div>"#,
        );
        let node = first_fragment(&html);
        let rule = FIELD_RULES
            .iter()
            .find(|rule| rule.field == crate::extractors::ReviewField::Content)
            .unwrap();
        assert_eq!(extract(node, rule).into_text(), extract_text(node, rule.selector));
        assert_eq!(extract(node, rule).into_text().as_deref(), Some("Dobry"));
    }

    #[test]
    fn extracted_conversions() {
        assert_eq!(Extracted::Text(Some("a".into())).into_text().as_deref(), Some("a"));
        assert_eq!(Extracted::Text(Some("a".into())).into_list(), vec!["a"]);
        assert!(Extracted::Text(None).into_list().is_empty());
    }
}
