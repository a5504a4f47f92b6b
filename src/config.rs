//! Preprocessing configuration.
//!
//! The defaults describe the appointment dataset's fixed column contract.
//! A JSON file may override any subset of fields.

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Date the appointment was booked.
    pub scheduled_column: String,
    /// Date the appointment takes place.
    pub appointment_column: String,
    /// Name of the derived whole-day span between the two dates.
    pub lead_time_column: String,
    /// Accepted spellings of the target label column.
    pub target_columns: Vec<String>,
    pub positive_label: String,
    pub negative_label: String,
    /// Identifier and raw date columns removed before encoding.
    pub drop_columns: Vec<String>,
    /// Code given to missing categorical cells. `None` leaves them null so
    /// the row is dropped with the other incomplete rows.
    pub missing_category_code: Option<i64>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            scheduled_column: "ScheduledDay".to_owned(),
            appointment_column: "AppointmentDay".to_owned(),
            lead_time_column: "LeadTime".to_owned(),
            target_columns: vec!["No-show".to_owned(), "No_show".to_owned()],
            positive_label: "Yes".to_owned(),
            negative_label: "No".to_owned(),
            drop_columns: vec![
                "PatientId".to_owned(),
                "AppointmentID".to_owned(),
                "ScheduledDay".to_owned(),
                "AppointmentDay".to_owned(),
            ],
            missing_category_code: None,
        }
    }
}

impl PreprocessConfig {
    /// Read a config from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Columns whose text is resolved to timestamps.
    pub fn date_columns(&self) -> [&str; 2] {
        [
            self.scheduled_column.as_str(),
            self.appointment_column.as_str(),
        ]
    }

    pub fn is_target(&self, name: &str) -> bool {
        self.target_columns.iter().any(|t| t == name)
    }
}
