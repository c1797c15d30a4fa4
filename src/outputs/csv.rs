//! CSV output for scored headlines.
//!
//! # Output Structure
//!
//! ```text
//! sentiment_dir/
//! ├── AAPL_sentiment.csv
//! └── MSFT_sentiment.csv
//! ```
//!
//! Each file has one header row, `headline,publishedAt,sentiment_score`, and
//! no index column. The table is serialized in memory and written in one
//! call once scoring for the ticker has finished.

use crate::error::SentimentError;
use crate::models::SentimentRow;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Column order of every sentiment file.
pub const HEADER: [&str; 3] = ["headline", "publishedAt", "sentiment_score"];

/// Serialize `rows` as CSV, header first.
pub fn to_csv_bytes(rows: &[SentimentRow]) -> Result<Vec<u8>, SentimentError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(HEADER)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| SentimentError::Io(e.into_error()))
}

/// Write `rows` to `path`, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = rows.len()))]
pub async fn write_sentiment(rows: &[SentimentRow], path: &Path) -> Result<(), SentimentError> {
    let bytes = to_csv_bytes(rows)?;
    fs::write(path, bytes).await?;
    info!("Wrote sentiment CSV");
    Ok(())
}
