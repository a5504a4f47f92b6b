use chrono::{Duration, NaiveDate};
use noshow_prep::{preprocess, DataLoader};
use polars::prelude::*;
use proptest::prelude::*;

const HEADER: &str = "PatientId,AppointmentID,ScheduledDay,AppointmentDay,Age,Gender,No-show";

#[derive(Debug, Clone)]
struct Appointment {
    patient: u32,
    scheduled: Option<i64>,
    appointment: Option<i64>,
    age: u8,
    gender: &'static str,
    no_show: &'static str,
}

impl Appointment {
    /// AppointmentID mirrors PatientId so identical rows occur naturally.
    fn to_csv(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.patient,
            self.patient,
            date_text(self.scheduled),
            date_text(self.appointment),
            self.age,
            self.gender,
            self.no_show
        )
    }
}

fn date_text(offset: Option<i64>) -> String {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    match offset {
        Some(days) => (base + Duration::days(days)).format("%Y-%m-%d").to_string(),
        None => "not-a-date".to_string(),
    }
}

fn appointment() -> impl Strategy<Value = Appointment> {
    (
        0u32..5,
        proptest::option::weighted(0.9, 0i64..60),
        proptest::option::weighted(0.9, 0i64..60),
        0u8..100,
        prop::sample::select(vec!["F", "M", ""]),
        prop::sample::select(vec!["Yes", "No", "Maybe", ""]),
    )
        .prop_map(|(patient, scheduled, appointment, age, gender, no_show)| Appointment {
            patient,
            scheduled,
            appointment,
            age,
            gender,
            no_show,
        })
}

fn to_frame(rows: &[Appointment]) -> DataFrame {
    let body: Vec<String> = rows.iter().map(Appointment::to_csv).collect();
    let text = format!("{HEADER}\n{}\n", body.join("\n"));
    DataLoader::load_reader(text.as_bytes()).unwrap()
}

proptest! {
    #[test]
    fn processed_table_is_clean(rows in prop::collection::vec(appointment(), 1..40)) {
        let out = preprocess(&to_frame(&rows)).unwrap();

        prop_assert!(out.height() <= rows.len());
        for column in out.get_columns() {
            prop_assert_eq!(column.null_count(), 0);
            prop_assert!(!matches!(column.dtype(), DataType::String));
        }
        for dropped in ["PatientId", "AppointmentID", "ScheduledDay", "AppointmentDay"] {
            prop_assert!(out.column(dropped).is_err());
        }

        let lead = out.column("LeadTime").unwrap().i64().unwrap();
        prop_assert!(lead.into_iter().flatten().all(|days| days >= 0));

        let target = out.column("No-show").unwrap().i64().unwrap();
        prop_assert!(target.into_iter().flatten().all(|v| v == 0 || v == 1));
    }

    #[test]
    fn appended_duplicate_changes_nothing(rows in prop::collection::vec(appointment(), 1..20)) {
        let mut with_duplicate = rows.clone();
        with_duplicate.push(rows[0].clone());

        let plain = preprocess(&to_frame(&rows)).unwrap();
        let duplicated = preprocess(&to_frame(&with_duplicate)).unwrap();
        prop_assert_eq!(plain.height(), duplicated.height());
    }

    #[test]
    fn codes_are_stable_across_runs(rows in prop::collection::vec(appointment(), 1..20)) {
        let raw = to_frame(&rows);
        let first = preprocess(&raw).unwrap();
        let second = preprocess(&raw).unwrap();
        prop_assert!(first.equals_missing(&second));
    }
}
