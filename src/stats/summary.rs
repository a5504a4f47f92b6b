//! Statistics Summary Module
//! Shape, missing-value counts and descriptive statistics for a table,
//! as shown to the user before and after preprocessing.

use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl Default for ColumnStats {
    fn default() -> Self {
        Self {
            column: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            median: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NullCount {
    pub column: String,
    pub nulls: usize,
}

/// Everything the presentation layer displays about a table.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    /// One entry per column, in column order.
    pub null_counts: Vec<NullCount>,
    /// One entry per numeric column, in column order.
    pub numeric: Vec<ColumnStats>,
}

impl DatasetSummary {
    pub fn from_frame(df: &DataFrame) -> Self {
        let null_counts = df
            .get_columns()
            .iter()
            .map(|col| NullCount {
                column: col.name().to_string(),
                nulls: col.null_count(),
            })
            .collect();

        Self {
            rows: df.height(),
            columns: df.width(),
            null_counts,
            numeric: StatsCalculator::compute_all_stats_parallel(df),
        }
    }

    pub fn total_nulls(&self) -> usize {
        self.null_counts.iter().map(|n| n.nulls).sum()
    }

    /// Columns with at least one missing value.
    pub fn columns_with_nulls(&self) -> Vec<&NullCount> {
        self.null_counts.iter().filter(|n| n.nulls > 0).collect()
    }
}

/// First `n` rows of a table.
pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
    df.head(Some(n))
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    ///
    /// Quartiles interpolate linearly between neighbouring ranks.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnStats {
        let n = values.len();
        if n == 0 {
            return ColumnStats::default();
        }

        let ca = Float64Chunked::new("values".into(), values);
        let quartile = |q: f64| {
            ca.quantile(q, QuantileMethod::Linear)
                .ok()
                .flatten()
                .unwrap_or(f64::NAN)
        };
        let std = if n > 1 { values.iter().std_dev() } else { 0.0 };

        ColumnStats {
            column: String::new(),
            count: n,
            mean: values.iter().mean(),
            std,
            min: ca.min().unwrap_or(f64::NAN),
            p25: quartile(0.25),
            median: quartile(0.5),
            p75: quartile(0.75),
            max: ca.max().unwrap_or(f64::NAN),
        }
    }

    pub fn is_numeric(col: &Column) -> bool {
        matches!(
            col.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    /// Non-null, non-NaN values of a numeric column as `f64`.
    pub fn numeric_values(col: &Column) -> Vec<f64> {
        col.cast(&DataType::Float64)
            .ok()
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().filter(|v| !v.is_nan()).collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Compute statistics for every numeric column in parallel.
    pub fn compute_all_stats_parallel(df: &DataFrame) -> Vec<ColumnStats> {
        let numeric: Vec<&Column> = df
            .get_columns()
            .iter()
            .filter(|col| Self::is_numeric(col))
            .collect();

        numeric
            .par_iter()
            .map(|col| {
                let mut stats = Self::compute_descriptive_stats(&Self::numeric_values(col));
                stats.column = col.name().to_string();
                stats
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn descriptive_stats_match_describe() {
        let stats = StatsCalculator::compute_descriptive_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(stats.count, 4);
        assert!(approx(stats.mean, 2.5));
        assert!(approx(stats.std, 1.2909944487358056));
        assert!(approx(stats.min, 1.0));
        assert!(approx(stats.p25, 1.75));
        assert!(approx(stats.median, 2.5));
        assert!(approx(stats.p75, 3.25));
        assert!(approx(stats.max, 4.0));
    }

    #[test]
    fn empty_and_single_values() {
        let empty = StatsCalculator::compute_descriptive_stats(&[]);
        assert_eq!(empty.count, 0);
        assert!(empty.mean.is_nan());

        let single = StatsCalculator::compute_descriptive_stats(&[7.0]);
        assert!(approx(single.mean, 7.0));
        assert!(approx(single.std, 0.0));
        assert!(approx(single.median, 7.0));
    }

    #[test]
    fn summary_counts_nulls_and_skips_text() {
        let df = df!(
            "Age" => [Some(10i64), None, Some(30)],
            "Gender" => [Some("F"), Some("M"), None],
            "Score" => [0.5f64, 1.5, 2.5]
        )
        .unwrap();

        let summary = DatasetSummary::from_frame(&df);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 3);
        assert_eq!(summary.total_nulls(), 2);
        assert_eq!(
            summary
                .columns_with_nulls()
                .iter()
                .map(|n| n.column.as_str())
                .collect::<Vec<_>>(),
            vec!["Age", "Gender"]
        );

        let names: Vec<&str> = summary.numeric.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(names, vec!["Age", "Score"]);
        assert_eq!(summary.numeric[0].count, 2);
        assert!(approx(summary.numeric[0].mean, 20.0));
    }

    #[test]
    fn preview_takes_leading_rows() {
        let df = df!("a" => [1i64, 2, 3, 4]).unwrap();
        assert_eq!(preview(&df, 2).height(), 2);
        assert_eq!(preview(&df, 10).height(), 4);
    }
}
