use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ProductStats, Recommendation, ReviewRecord, ReviewRow};

pub const MAX_RATING: f64 = 5.0;

/// Parses a scraped fraction like `"3,5/5"` into `3.5`.
///
/// The string must be `<numerator>/<denominator>` with a decimal comma or
/// point, and the numerator must land in `0..=5`. Anything else is a
/// [`Error::RatingParse`]; there is no fallback value.
pub fn normalize_rating(raw: &str) -> Result<f64> {
    let invalid = || Error::RatingParse { raw: raw.to_string() };

    let (numerator, denominator) = raw.trim().split_once('/').ok_or_else(invalid)?;
    parse_decimal(denominator).ok_or_else(invalid)?;
    let value = parse_decimal(numerator).ok_or_else(invalid)?;

    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(invalid());
    }
    Ok(value)
}

fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn rating_of(review: &ReviewRecord) -> Result<f64> {
    match review.stars.as_deref() {
        Some(raw) => normalize_rating(raw),
        None => Err(Error::RatingParse { raw: String::new() }),
    }
}

/// Rounds to two decimals, ties to even (`0.125` becomes `0.12`).
pub fn round_score(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

pub fn compute_stats(
    product_id: &str,
    product_name: Option<String>,
    reviews: &[ReviewRecord],
) -> Result<ProductStats> {
    let ratings = reviews.iter().map(rating_of).collect::<Result<Vec<_>>>()?;

    let mut stats = ProductStats::empty(product_id, product_name);
    stats.opinions_count = reviews.len();
    stats.pros_count = reviews.iter().filter(|r| !r.pros.is_empty()).count();
    stats.cons_count = reviews.iter().filter(|r| !r.cons.is_empty()).count();
    if !ratings.is_empty() {
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        stats.average_score = Some(round_score(mean));
    }

    debug!(
        product_id = product_id,
        opinions_count = stats.opinions_count,
        pros_count = stats.pros_count,
        cons_count = stats.cons_count,
        average_score = ?stats.average_score,
        "Computed product stats"
    );

    Ok(stats)
}

/// Table form of the review set, in the same order.
pub fn to_rows(reviews: &[ReviewRecord]) -> Result<Vec<ReviewRow>> {
    reviews
        .iter()
        .map(|review| {
            Ok(ReviewRow {
                opinion_id: review.opinion_id.clone(),
                author: review.author.clone(),
                recommendation: review.recommendation,
                stars: rating_of(review)?,
                content: review.content.clone(),
                useful: review.useful,
                useless: review.useless,
                published: review.published_at(),
                purchased: review.purchased_at(),
                pros: review.pros.clone(),
                cons: review.cons.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecommendationCounts {
    pub negative: usize,
    pub positive: usize,
    pub none: usize,
}

pub fn recommendation_distribution(reviews: &[ReviewRecord]) -> RecommendationCounts {
    reviews
        .iter()
        .fold(RecommendationCounts::default(), |mut counts, review| {
            match review.recommendation {
                Recommendation::Negative => counts.negative += 1,
                Recommendation::Positive => counts.positive += 1,
                Recommendation::None => counts.none += 1,
            }
            counts
        })
}

/// Review count per half-star bucket from 0.0 to 5.0, zeros included.
pub fn star_distribution(rows: &[ReviewRow]) -> Vec<(f64, usize)> {
    let buckets = (MAX_RATING * 2.0) as usize + 1;
    let mut counts = vec![0usize; buckets];
    for row in rows {
        let doubled = row.stars * 2.0;
        if doubled.fract() == 0.0 && (0.0..buckets as f64).contains(&doubled) {
            counts[doubled as usize] += 1;
        }
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| (i as f64 / 2.0, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: &str, stars: &str, pros: &[&str], cons: &[&str]) -> ReviewRecord {
        let mut review = ReviewRecord::new(id);
        review.stars = Some(stars.to_string());
        review.pros = pros.iter().map(|s| s.to_string()).collect();
        review.cons = cons.iter().map(|s| s.to_string()).collect();
        review
    }

    #[test]
    fn normalizes_comma_fractions() {
        assert_eq!(normalize_rating("3,5/5").unwrap(), 3.5);
        assert_eq!(normalize_rating("0/5").unwrap(), 0.0);
        assert_eq!(normalize_rating("4/5").unwrap(), 4.0);
        assert_eq!(normalize_rating(" 5/5 ").unwrap(), 5.0);
    }

    #[test]
    fn rejects_malformed_ratings() {
        for raw in ["", "4", "abc/5", "3,5", "/5", "4/", "-1/5", "5,5/5", "inf/5", "NaN/5", "1e1/5"] {
            assert!(
                matches!(normalize_rating(raw), Err(Error::RatingParse { .. })),
                "{raw:?} should not parse"
            );
        }
    }

    #[test]
    fn averages_and_rounds() {
        let reviews = vec![
            review("1", "3,5/5", &[], &[]),
            review("2", "0/5", &[], &[]),
            review("3", "4/5", &[], &[]),
        ];
        let stats = compute_stats("42", Some("Kubek".into()), &reviews).unwrap();
        assert_eq!(stats.opinions_count, 3);
        assert_eq!(stats.average_score, Some(2.5));
        assert_eq!(stats.product_name.as_deref(), Some("Kubek"));
    }

    #[test]
    fn rounding_ties_go_to_even() {
        assert_eq!(round_score(0.125), 0.12);
        assert_eq!(round_score(0.375), 0.38);

        let mut reviews = vec![review("1", "0,5/5", &[], &[]), review("2", "0,5/5", &[], &[])];
        reviews.extend((3..9).map(|i| review(&i.to_string(), "0/5", &[], &[])));
        let stats = compute_stats("42", None, &reviews).unwrap();
        assert_eq!(stats.average_score, Some(0.12));
    }

    #[test]
    fn counts_pros_and_cons_presence() {
        let reviews = vec![
            review("1", "1/5", &[], &["c1"]),
            review("2", "1/5", &["p1"], &[]),
            review("3", "1/5", &["p1", "p2"], &["c1", "c2"]),
            review("4", "1/5", &[], &[]),
        ];
        let stats = compute_stats("42", None, &reviews).unwrap();
        assert_eq!(stats.pros_count, 2);
        assert_eq!(stats.cons_count, 2);
        assert!(stats.pros_count <= stats.opinions_count);
    }

    #[test]
    fn empty_review_set() {
        let stats = compute_stats("42", None, &[]).unwrap();
        assert_eq!(stats, ProductStats::empty("42", None));
        assert_eq!(stats.average_score, None);
    }

    #[test]
    fn bad_rating_fails_the_whole_computation() {
        let reviews = vec![review("1", "4/5", &[], &[]), review("2", "brak", &[], &[])];
        assert!(matches!(
            compute_stats("42", None, &reviews),
            Err(Error::RatingParse { raw }) if raw == "brak"
        ));
        assert!(compute_stats("42", None, &[ReviewRecord::new("3")]).is_err());
    }

    #[test]
    fn rows_carry_numeric_stars() {
        let reviews = vec![review("1", "3,5/5", &["p"], &[]), review("2", "1/5", &[], &[])];
        let rows = to_rows(&reviews).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stars, 3.5);
        assert_eq!(rows[0].opinion_id, "1");
        assert_eq!(rows[1].stars, 1.0);
    }

    #[test]
    fn distributions() {
        let mut reviews = vec![
            review("1", "3,5/5", &[], &[]),
            review("2", "3,5/5", &[], &[]),
            review("3", "5/5", &[], &[]),
        ];
        reviews[0].recommendation = Recommendation::Positive;
        reviews[1].recommendation = Recommendation::Negative;

        let counts = recommendation_distribution(&reviews);
        assert_eq!(counts, RecommendationCounts { negative: 1, positive: 1, none: 1 });

        let stars = star_distribution(&to_rows(&reviews).unwrap());
        assert_eq!(stars.len(), 11);
        assert_eq!(stars[0], (0.0, 0));
        assert_eq!(stars[7], (3.5, 2));
        assert_eq!(stars[10], (5.0, 1));
    }
}
