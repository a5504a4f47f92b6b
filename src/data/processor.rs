//! Data Processor Module
//! Cleans and feature-engineers raw appointment records for modelling.
//!
//! The pipeline runs seven stages in a fixed order:
//! deduplicate, parse dates, derive lead time, encode the target, drop
//! identifier columns, encode categoricals, drop incomplete rows.
//! Bad individual values never fail the run; they become nulls and the
//! affected rows are removed by the last stage.

use super::dates::parse_timestamp;
use crate::config::PreprocessConfig;
use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Table has no columns")]
    NoColumns,
    #[error("Table has no rows")]
    NoRows,
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Run the pipeline with the default column contract.
pub fn preprocess(df: &DataFrame) -> Result<DataFrame, SchemaError> {
    Preprocessor::default().preprocess(df)
}

/// Stateless appointment preprocessor. The caller's frame is never modified.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Produce the cleaned, model-ready table.
    ///
    /// Fails only when there is nothing to process. An empty result (every
    /// row dropped) is returned as `Ok` for the caller to report.
    pub fn preprocess(&self, df: &DataFrame) -> Result<DataFrame, SchemaError> {
        if df.width() == 0 {
            return Err(SchemaError::NoColumns);
        }
        if df.height() == 0 {
            return Err(SchemaError::NoRows);
        }
        log::info!(
            "Preprocessing {} records with {} columns",
            df.height(),
            df.width()
        );

        let df = deduplicate(df)?;
        log_stage("deduplicate", &df);
        let df = self.parse_dates(df)?;
        log_stage("parse dates", &df);
        let df = self.derive_lead_time(df)?;
        log_stage("derive lead time", &df);
        let df = self.encode_target(df)?;
        log_stage("encode target", &df);
        let df = self.drop_non_predictive(df)?;
        log_stage("drop non-predictive", &df);
        let df = self.encode_categoricals(df)?;
        log_stage("encode categoricals", &df);
        let df = drop_incomplete_rows(df)?;
        log_stage("drop incomplete rows", &df);

        if df.height() == 0 {
            log::warn!("Every record was dropped during preprocessing");
        } else {
            log::info!(
                "Preprocessed dataset has {} records and {} columns",
                df.height(),
                df.width()
            );
        }
        Ok(df)
    }

    /// Stage 2: resolve date text to millisecond timestamps.
    fn parse_dates(&self, mut df: DataFrame) -> PolarsResult<DataFrame> {
        for name in self.config.date_columns() {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let parsed = parse_date_column(column)?;
            df.with_column(parsed)?;
        }
        Ok(df)
    }

    /// Stage 3: whole days from scheduling to appointment, floored at zero.
    fn derive_lead_time(&self, mut df: DataFrame) -> PolarsResult<DataFrame> {
        let [scheduled, appointment] = self.config.date_columns();
        if df.get_column_index(scheduled).is_none() || df.get_column_index(appointment).is_none()
        {
            return Ok(df);
        }

        let scheduled = df.column(scheduled)?.cast(&DataType::Int64)?;
        let appointment = df.column(appointment)?.cast(&DataType::Int64)?;
        let lead_times: Vec<Option<i64>> = scheduled
            .i64()?
            .into_iter()
            .zip(appointment.i64()?)
            .map(|(s, a)| Some(lead_time_days(s?, a?)))
            .collect();

        df.with_column(Column::new(
            self.config.lead_time_column.as_str().into(),
            lead_times,
        ))?;
        Ok(df)
    }

    /// Stage 4: map the target labels to 1/0, anything else to null.
    fn encode_target(&self, mut df: DataFrame) -> PolarsResult<DataFrame> {
        for name in &self.config.target_columns {
            let Ok(column) = df.column(name) else {
                continue;
            };
            let labels = column.cast(&DataType::String)?;
            let encoded: Vec<Option<i64>> = labels
                .str()?
                .into_iter()
                .map(|label| match label {
                    Some(l) if l == self.config.positive_label => Some(1),
                    Some(l) if l == self.config.negative_label => Some(0),
                    _ => None,
                })
                .collect();
            let encoded = Column::new(column.name().clone(), encoded);
            df.with_column(encoded)?;
        }
        Ok(df)
    }

    /// Stage 5: remove identifiers and the raw date columns.
    fn drop_non_predictive(&self, mut df: DataFrame) -> PolarsResult<DataFrame> {
        for name in &self.config.drop_columns {
            if df.get_column_index(name).is_some() {
                df = df.drop(name)?;
            }
        }
        Ok(df)
    }

    /// Stage 6: replace every text feature with sorted-order integer codes.
    fn encode_categoricals(&self, mut df: DataFrame) -> PolarsResult<DataFrame> {
        let categorical: Vec<PlSmallStr> = df
            .get_columns()
            .iter()
            .filter(|c| matches!(c.dtype(), DataType::String))
            .filter(|c| !self.config.is_target(c.name().as_str()))
            .map(|c| c.name().clone())
            .collect();

        for name in categorical {
            let encoded =
                encode_categorical(df.column(name.as_str())?, self.config.missing_category_code)?;
            df.with_column(encoded)?;
        }
        Ok(df)
    }
}

/// Stage 1: drop rows identical to an earlier row in every cell,
/// keeping first occurrences in their original order.
fn deduplicate(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Stage 7: drop any row holding a null. Float NaN counts as missing.
fn drop_incomplete_rows(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let floats: Vec<PlSmallStr> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype().is_float())
        .map(|c| c.name().clone())
        .collect();

    for name in floats {
        let values = df.column(name.as_str())?.cast(&DataType::Float64)?;
        let values = values.f64()?;
        let cleared = values.set(&values.is_nan(), None)?;
        df.with_column(cleared.into_series())?;
    }
    df.drop_nulls::<String>(None)
}

fn parse_date_column(column: &Column) -> PolarsResult<Column> {
    let timestamp = DataType::Datetime(TimeUnit::Milliseconds, None);
    if matches!(column.dtype(), DataType::Datetime(_, _) | DataType::Date) {
        return column.cast(&timestamp);
    }

    let text = column.cast(&DataType::String)?;
    let millis: Vec<Option<i64>> = text
        .str()?
        .into_iter()
        .map(|v| v.and_then(parse_timestamp))
        .map(|ts| ts.map(|ts| ts.and_utc().timestamp_millis()))
        .collect();
    Column::new(column.name().clone(), millis).cast(&timestamp)
}

fn encode_categorical(column: &Column, missing_code: Option<i64>) -> PolarsResult<Column> {
    let values = column.str()?;
    let categories: BTreeSet<&str> = values.into_iter().flatten().collect();
    let codes: HashMap<&str, i64> = categories
        .into_iter()
        .enumerate()
        .map(|(code, value)| (value, code as i64))
        .collect();

    let encoded: Vec<Option<i64>> = values
        .into_iter()
        .map(|v| match v {
            Some(v) => codes.get(v).copied(),
            None => missing_code,
        })
        .collect();
    Ok(Column::new(column.name().clone(), encoded))
}

/// Whole days between two millisecond timestamps. Partial days are floored
/// and negative spans count as zero.
fn lead_time_days(scheduled_ms: i64, appointment_ms: i64) -> i64 {
    (appointment_ms - scheduled_ms).div_euclid(MS_PER_DAY).max(0)
}

fn log_stage(stage: &str, df: &DataFrame) {
    log::debug!("{stage}: {} rows x {} columns", df.height(), df.width());
}
