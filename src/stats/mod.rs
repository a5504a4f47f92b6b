//! Statistics module - summaries for display

mod summary;

pub use summary::{preview, ColumnStats, DatasetSummary, NullCount, StatsCalculator};
