//! Data archive module
//!
//! Stores scan results to Parquet for offline analysis

mod parquet;

pub use self::parquet::{opportunity_schema, read_records, OpportunityRecord, ScanArchive, ARCHIVE_PREFIX};
