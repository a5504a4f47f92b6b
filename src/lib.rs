//! Noshow Prep - clinical appointment data preparation
//!
//! Loads comma-separated appointment records and turns them into a clean,
//! fully numeric table for no-show modelling:
//!
//! ```no_run
//! use noshow_prep::{preprocess, DataLoader};
//!
//! let raw = DataLoader::load_path("appointments.csv")?;
//! let processed = preprocess(&raw)?;
//! println!("{processed}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod data;
pub mod stats;

pub use config::PreprocessConfig;
pub use data::{preprocess, DataLoader, LoadError, Preprocessor, SchemaError};
pub use stats::DatasetSummary;
