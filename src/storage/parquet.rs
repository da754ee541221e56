use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::error::Result;
use crate::models::{ReviewRow, TIMESTAMP_FORMAT};

/// Columnar form of a product's reviews, with numeric star ratings.
pub struct ReviewTable;

impl ReviewTable {
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("opinion_id", DataType::Utf8, false),
            Field::new("author", DataType::Utf8, true),
            Field::new("recommendation", DataType::Utf8, true),
            Field::new("stars", DataType::Float64, false),
            Field::new("content", DataType::Utf8, true),
            Field::new("useful", DataType::UInt32, true),
            Field::new("useless", DataType::UInt32, true),
            Field::new("published", DataType::Utf8, true),
            Field::new("purchased", DataType::Utf8, true),
            // JSON-encoded string lists
            Field::new("pros", DataType::Utf8, false),
            Field::new("cons", DataType::Utf8, false),
        ]))
    }

    pub fn record_batch(rows: &[ReviewRow]) -> Result<RecordBatch> {
        let pros = rows
            .iter()
            .map(|r| serde_json::to_string(&r.pros))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let cons = rows
            .iter()
            .map(|r| serde_json::to_string(&r.cons))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let published: Vec<Option<String>> = rows
            .iter()
            .map(|r| r.published.map(|t| t.format(TIMESTAMP_FORMAT).to_string()))
            .collect();
        let purchased: Vec<Option<String>> = rows
            .iter()
            .map(|r| r.purchased.map(|t| t.format(TIMESTAMP_FORMAT).to_string()))
            .collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(rows.iter().map(|r| Some(r.opinion_id.as_str())).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.author.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.recommendation.label()).collect::<StringArray>()),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.stars).collect::<Vec<_>>())),
            Arc::new(rows.iter().map(|r| r.content.as_deref()).collect::<StringArray>()),
            Arc::new(rows.iter().map(|r| r.useful).collect::<UInt32Array>()),
            Arc::new(rows.iter().map(|r| r.useless).collect::<UInt32Array>()),
            Arc::new(published.iter().map(|s| s.as_deref()).collect::<StringArray>()),
            Arc::new(purchased.iter().map(|s| s.as_deref()).collect::<StringArray>()),
            Arc::new(pros.iter().map(|s| Some(s.as_str())).collect::<StringArray>()),
            Arc::new(cons.iter().map(|s| Some(s.as_str())).collect::<StringArray>()),
        ];

        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }

    pub fn write_parquet(rows: &[ReviewRow], output_path: &Path) -> Result<()> {
        let batch = Self::record_batch(rows)?;
        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(output_path)?;
        let mut writer = ArrowWriter::try_new(file, Self::schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recommendation;
    use arrow::array::Array;
    use chrono::NaiveDateTime;

    fn row(id: &str, stars: f64) -> ReviewRow {
        ReviewRow {
            opinion_id: id.into(),
            author: None,
            recommendation: Recommendation::None,
            stars,
            content: None,
            useful: None,
            useless: Some(2),
            published: None,
            purchased: None,
            pros: vec![],
            cons: vec!["głośny".into()],
        }
    }

    #[test]
    fn stars_column_is_numeric() {
        let mut first = row("1", 3.5);
        first.recommendation = Recommendation::Positive;
        first.published = NaiveDateTime::parse_from_str("2023-03-14 18:22:05", TIMESTAMP_FORMAT).ok();
        let batch = ReviewTable::record_batch(&[first, row("2", 0.0)]).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field_with_name("stars").unwrap().data_type(), &DataType::Float64);

        let stars = batch.column(3).as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(stars.value(0), 3.5);
        assert_eq!(stars.value(1), 0.0);

        let recommendation = batch.column(2).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(recommendation.value(0), "Polecam");
        assert!(recommendation.is_null(1));

        let published = batch.column(7).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(published.value(0), "2023-03-14 18:22:05");

        let cons = batch.column(10).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(cons.value(0), r#"["głośny"]"#);
    }

    #[test]
    fn writes_parquet_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tables/123.parquet");
        ReviewTable::write_parquet(&[row("1", 4.0)], &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
