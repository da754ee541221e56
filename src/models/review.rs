use std::fmt;

use chrono::NaiveDateTime;
use scraper::ElementRef;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::extractors::field::{extract, Extracted};
use crate::extractors::selectors::{ReviewField, ENTRY_ID_ATTR, FIELD_RULES, ID_KEY};

/// Format of the `datetime` attribute on review timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const POSITIVE_LABEL: &str = "Polecam";
const NEGATIVE_LABEL: &str = "Nie polecam";

/// Reviewer's verdict. Stored as the site's own label, `null` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Recommendation {
    Positive,
    Negative,
    #[default]
    None,
}

impl Recommendation {
    pub fn label(self) -> Option<&'static str> {
        match self {
            Recommendation::Positive => Some(POSITIVE_LABEL),
            Recommendation::Negative => Some(NEGATIVE_LABEL),
            Recommendation::None => None,
        }
    }
}

impl From<Option<String>> for Recommendation {
    fn from(label: Option<String>) -> Self {
        match label.as_deref().map(str::trim) {
            Some(POSITIVE_LABEL) => Recommendation::Positive,
            Some(NEGATIVE_LABEL) => Recommendation::Negative,
            _ => Recommendation::None,
        }
    }
}

impl From<Recommendation> for Option<String> {
    fn from(recommendation: Recommendation) -> Self {
        recommendation.label().map(String::from)
    }
}

/// One user review of one product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewRecord {
    pub opinion_id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub recommendation: Recommendation,
    /// As scraped, e.g. `"3,5/5"`.
    #[serde(default)]
    pub stars: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub useful: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub useless: Option<u32>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub purchased: Option<String>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

impl ReviewRecord {
    pub fn new(opinion_id: impl Into<String>) -> Self {
        Self {
            opinion_id: opinion_id.into(),
            author: None,
            recommendation: Recommendation::None,
            stars: None,
            content: None,
            useful: None,
            useless: None,
            published: None,
            purchased: None,
            pros: Vec::new(),
            cons: Vec::new(),
        }
    }

    /// Builds a record from one `div.js_product-review` element.
    ///
    /// Individual fields that cannot be found stay empty. The entry id is
    /// the only thing that must be present.
    pub fn from_fragment(fragment: ElementRef<'_>) -> Result<Self> {
        let opinion_id = fragment
            .value()
            .attr(ENTRY_ID_ATTR)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(Error::ExtractionIntegrity { attribute: ENTRY_ID_ATTR })?;

        let mut record = Self::new(opinion_id);
        for rule in &FIELD_RULES {
            record.assign(rule.field, extract(fragment, rule));
        }
        Ok(record)
    }

    fn assign(&mut self, field: ReviewField, value: Extracted) {
        match field {
            ReviewField::Author => self.author = value.into_text(),
            ReviewField::Recommendation => self.recommendation = value.into_text().into(),
            ReviewField::Stars => self.stars = value.into_text(),
            ReviewField::Content => self.content = value.into_text(),
            ReviewField::Useful => self.useful = value.into_text().as_deref().and_then(parse_count),
            ReviewField::Useless => self.useless = value.into_text().as_deref().and_then(parse_count),
            ReviewField::Published => self.published = value.into_text(),
            ReviewField::Purchased => self.purchased = value.into_text(),
            ReviewField::Pros => self.pros = value.into_list(),
            ReviewField::Cons => self.cons = value.into_list(),
        }
    }

    pub fn field_value(&self, field: ReviewField) -> Value {
        match field {
            ReviewField::Author => Value::from(self.author.clone()),
            ReviewField::Recommendation => Value::from(Option::<String>::from(self.recommendation)),
            ReviewField::Stars => Value::from(self.stars.clone()),
            ReviewField::Content => Value::from(self.content.clone()),
            ReviewField::Useful => Value::from(self.useful),
            ReviewField::Useless => Value::from(self.useless),
            ReviewField::Published => Value::from(self.published.clone()),
            ReviewField::Purchased => Value::from(self.purchased.clone()),
            ReviewField::Pros => Value::from(self.pros.clone()),
            ReviewField::Cons => Value::from(self.cons.clone()),
        }
    }

    /// Registry-ordered map, identifier first.
    pub fn to_dict(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(FIELD_RULES.len() + 1);
        map.insert(ID_KEY.to_string(), Value::from(self.opinion_id.clone()));
        for rule in &FIELD_RULES {
            map.insert(rule.field.name().to_string(), self.field_value(rule.field));
        }
        map
    }

    pub fn from_dict(map: Map<String, Value>) -> Result<Self> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    pub fn published_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(self.published.as_deref())
    }

    pub fn purchased_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(self.purchased.as_deref())
    }
}

impl Serialize for ReviewRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_RULES.len() + 1))?;
        map.serialize_entry(ID_KEY, &self.opinion_id)?;
        for rule in &FIELD_RULES {
            map.serialize_entry(rule.field.name(), &self.field_value(rule.field))?;
        }
        map.end()
    }
}

impl fmt::Display for ReviewRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ID_KEY}: {}", self.opinion_id)?;
        for rule in &FIELD_RULES {
            match self.field_value(rule.field) {
                Value::Null => write!(f, "\n{}: -", rule.field.name())?,
                Value::String(s) => write!(f, "\n{}: {s}", rule.field.name())?,
                Value::Array(items) => {
                    let items: Vec<String> = items
                        .iter()
                        .filter_map(|v| v.as_str().map(String::from))
                        .collect();
                    write!(f, "\n{}: {}", rule.field.name(), items.join(", "))?
                }
                other => write!(f, "\n{}: {other}", rule.field.name())?,
            }
        }
        Ok(())
    }
}

/// Vote counters are plain non-negative integers; anything else is absent.
pub fn parse_count(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    digits.parse().ok()
}

fn parse_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value?.trim(), TIMESTAMP_FORMAT).ok()
}

/// Accepts a JSON number or a numeric string for vote counters.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid vote count {n}"))),
        Some(Value::String(s)) => parse_count(&s)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid vote count {s:?}"))),
        Some(other) => Err(D::Error::custom(format!("invalid vote count {other}"))),
    }
}
