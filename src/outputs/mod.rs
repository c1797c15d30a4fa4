//! Output generation for scored tickers.
//!
//! # Submodules
//!
//! - [`csv`]: Writes one `{symbol}_sentiment.csv` table per ticker
//!
//! # Output Structure
//!
//! ```text
//! sentiment_dir/
//! ├── AAPL_sentiment.csv
//! ├── MSFT_sentiment.csv
//! └── NVDA_sentiment.csv
//! ```
//!
//! The presence of a ticker's file is what the pipeline's cache check looks
//! at; files are only written after every row has been scored.

pub mod csv;
