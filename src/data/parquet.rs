//! Parquet archive of scan results

use crate::signal::{Opportunity, Side};
use arrow::array::{Array, ArrayRef, BooleanArray, StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File name prefix for archived scans
pub const ARCHIVE_PREFIX: &str = "scan";

/// Opportunity schema; Decimal columns are stored as strings for precision
pub fn opportunity_schema() -> Schema {
    Schema::new(vec![
        Field::new(
            "scanned_at",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new("market_key", DataType::Utf8, false),
        Field::new("platform", DataType::Utf8, false),
        Field::new("question", DataType::Utf8, false),
        Field::new("market_price", DataType::Utf8, false),
        Field::new("estimated_probability", DataType::Utf8, false),
        Field::new("edge", DataType::Utf8, false),
        Field::new("expected_value", DataType::Utf8, false),
        Field::new("confidence_score", DataType::Utf8, false),
        Field::new("kelly_fraction", DataType::Utf8, false),
        Field::new("suggested_stake_fraction", DataType::Utf8, false),
        Field::new("side", DataType::Utf8, true),
        Field::new("recommended_action", DataType::Utf8, false),
        Field::new("high_edge", DataType::Boolean, false),
    ])
}

/// One archived opportunity row
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityRecord {
    pub scanned_at: DateTime<Utc>,
    pub market_key: String,
    pub platform: String,
    pub question: String,
    pub market_price: Decimal,
    pub estimated_probability: Decimal,
    pub edge: Decimal,
    pub expected_value: Decimal,
    pub confidence_score: Decimal,
    pub kelly_fraction: Decimal,
    pub suggested_stake_fraction: Decimal,
    pub side: Option<String>,
    pub recommended_action: String,
    pub high_edge: bool,
}

impl OpportunityRecord {
    pub fn from_opportunity(opportunity: &Opportunity, scanned_at: DateTime<Utc>) -> Self {
        Self {
            scanned_at,
            market_key: opportunity.market_key.clone(),
            platform: opportunity.platform.clone(),
            question: opportunity.question.clone(),
            market_price: opportunity.market_price,
            estimated_probability: opportunity.estimated_probability,
            edge: opportunity.edge,
            expected_value: opportunity.expected_value,
            confidence_score: opportunity.confidence_score,
            kelly_fraction: opportunity.kelly_fraction,
            suggested_stake_fraction: opportunity.suggested_stake_fraction,
            side: opportunity.side.map(|side| match side {
                Side::Yes => "yes".to_string(),
                Side::No => "no".to_string(),
            }),
            recommended_action: opportunity.recommended_action.to_string(),
            high_edge: opportunity.high_edge,
        }
    }
}

/// Writes one Parquet file per archived scan
pub struct ScanArchive {
    output_dir: PathBuf,
}

impl ScanArchive {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Ensure output directory exists
    pub fn ensure_dir(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }

    /// Generate file path for a given timestamp and prefix
    pub fn file_path(&self, prefix: &str, timestamp: DateTime<Utc>) -> PathBuf {
        let filename = format!("{}_{}.parquet", prefix, timestamp.format("%Y%m%d_%H%M%S"));
        self.output_dir.join(filename)
    }

    /// Archive a scan's opportunities; returns the file written, if any
    pub fn write_scan(
        &self,
        opportunities: &[Opportunity],
        scanned_at: DateTime<Utc>,
    ) -> anyhow::Result<Option<PathBuf>> {
        if opportunities.is_empty() {
            return Ok(None);
        }
        let records: Vec<OpportunityRecord> = opportunities
            .iter()
            .map(|o| OpportunityRecord::from_opportunity(o, scanned_at))
            .collect();
        let path = self.file_path(ARCHIVE_PREFIX, scanned_at);
        self.write_records(&path, &records)?;
        Ok(Some(path))
    }

    /// Write opportunity records to a Parquet file
    pub fn write_records(&self, path: &Path, records: &[OpportunityRecord]) -> anyhow::Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        self.ensure_dir()?;

        let schema = Arc::new(opportunity_schema());
        let file = File::create(path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

        let timestamps: Vec<i64> = records
            .iter()
            .map(|r| r.scanned_at.timestamp_micros())
            .collect();
        let text = |f: fn(&OpportunityRecord) -> &str| -> ArrayRef {
            Arc::new(StringArray::from(records.iter().map(f).collect::<Vec<_>>()))
        };
        let decimal = |f: fn(&OpportunityRecord) -> Decimal| -> ArrayRef {
            Arc::new(StringArray::from(
                records.iter().map(|r| f(r).to_string()).collect::<Vec<_>>(),
            ))
        };

        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC"))
                    as ArrayRef,
                text(|r| r.market_key.as_str()),
                text(|r| r.platform.as_str()),
                text(|r| r.question.as_str()),
                decimal(|r| r.market_price),
                decimal(|r| r.estimated_probability),
                decimal(|r| r.edge),
                decimal(|r| r.expected_value),
                decimal(|r| r.confidence_score),
                decimal(|r| r.kelly_fraction),
                decimal(|r| r.suggested_stake_fraction),
                Arc::new(StringArray::from(
                    records.iter().map(|r| r.side.as_deref()).collect::<Vec<_>>(),
                )) as ArrayRef,
                text(|r| r.recommended_action.as_str()),
                Arc::new(BooleanArray::from(
                    records.iter().map(|r| r.high_edge).collect::<Vec<_>>(),
                )) as ArrayRef,
            ],
        )?;

        writer.write(&batch)?;
        writer.close()?;

        tracing::debug!(path = ?path, count = records.len(), "Archived scan to Parquet");

        Ok(())
    }
}

fn string_column(batch: &RecordBatch, index: usize) -> anyhow::Result<&StringArray> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow::anyhow!("Invalid string column {}", index))
}

/// Read archived opportunity records back
pub fn read_records(path: &Path) -> anyhow::Result<Vec<OpportunityRecord>> {
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
    use std::str::FromStr;

    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;

        let timestamps = batch
            .column(0)
            .as_any()
            .downcast_ref::<TimestampMicrosecondArray>()
            .ok_or_else(|| anyhow::anyhow!("Invalid scanned_at column"))?;
        let high_edge = batch
            .column(13)
            .as_any()
            .downcast_ref::<BooleanArray>()
            .ok_or_else(|| anyhow::anyhow!("Invalid high_edge column"))?;

        let keys = string_column(&batch, 1)?;
        let platforms = string_column(&batch, 2)?;
        let questions = string_column(&batch, 3)?;
        let decimals = (4..=10)
            .map(|index| string_column(&batch, index))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let sides = string_column(&batch, 11)?;
        let actions = string_column(&batch, 12)?;

        for i in 0..batch.num_rows() {
            let scanned_at = DateTime::from_timestamp_micros(timestamps.value(i))
                .ok_or_else(|| anyhow::anyhow!("Invalid timestamp"))?;
            let d = |column: usize| Decimal::from_str(decimals[column].value(i));

            records.push(OpportunityRecord {
                scanned_at,
                market_key: keys.value(i).to_string(),
                platform: platforms.value(i).to_string(),
                question: questions.value(i).to_string(),
                market_price: d(0)?,
                estimated_probability: d(1)?,
                edge: d(2)?,
                expected_value: d(3)?,
                confidence_score: d(4)?,
                kelly_fraction: d(5)?,
                suggested_stake_fraction: d(6)?,
                side: (!sides.is_null(i)).then(|| sides.value(i).to_string()),
                recommended_action: actions.value(i).to_string(),
                high_edge: high_edge.value(i),
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MarketQuote;
    use crate::model::testing::prediction;
    use crate::signal::EdgeScorer;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn scanned_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-15T12:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn opportunity(id: &str, price: Decimal, probability: f64) -> Opportunity {
        let quote = MarketQuote::new("polymarket", id, "Will it happen?", price);
        let p = prediction(probability, probability - 0.05, probability + 0.05, 0.8);
        EdgeScorer::default().score(&p, &quote, scanned_at())
    }

    #[test]
    fn test_opportunity_schema() {
        let schema = opportunity_schema();
        assert_eq!(schema.fields().len(), 14);
        assert_eq!(schema.field(0).name(), "scanned_at");
        assert_eq!(schema.field(6).name(), "edge");
        assert!(schema.field(11).is_nullable());
    }

    #[test]
    fn test_file_path() {
        let archive = ScanArchive::new(PathBuf::from("/data"));
        assert_eq!(
            archive.file_path("scan", scanned_at()),
            PathBuf::from("/data/scan_20261015_123000.parquet")
        );
    }

    #[test]
    fn test_write_and_read_scan() {
        let temp_dir = TempDir::new().unwrap();
        let archive = ScanArchive::new(temp_dir.path().join("archive"));

        let opportunities = vec![
            opportunity("m1", dec!(0.40), 0.55),
            opportunity("m2", dec!(0.50), 0.50),
        ];
        let path = archive.write_scan(&opportunities, scanned_at()).unwrap().unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].market_key, "polymarket:m1");
        assert_eq!(records[0].edge, dec!(0.15));
        assert_eq!(records[0].side.as_deref(), Some("yes"));
        assert_eq!(records[0].recommended_action, "Strong Buy");
        assert!(records[0].high_edge);
        assert_eq!(records[1].side, None);
        assert_eq!(records[1].recommended_action, "Hold");
        assert_eq!(records[1].scanned_at, scanned_at());
    }

    #[test]
    fn test_empty_scan_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let archive = ScanArchive::new(temp_dir.path().to_path_buf());
        assert_eq!(archive.write_scan(&[], scanned_at()).unwrap(), None);
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }
}
