//! crates/aidoctor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::NaiveDate;
use serde_json::Value;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub country: String,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: String,
    pub email: String,
    pub password_hash: String,
}

/// Represents a single diagnosed condition tracked by a user.
#[derive(Debug, Clone)]
pub struct MedicalCondition {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub diagnosis_date: Option<NaiveDate>,
    pub medications: Vec<String>,
}

/// Represents one dosage-history graph owned by a user.
///
/// The `data` array is free-form JSON supplied by the client; only the
/// `date` key of each sample is interpreted (for ordering).
#[derive(Debug, Clone)]
pub struct MedicineGraph {
    pub id: String,
    pub name: String,
    pub data: Vec<Value>,
    pub user_id: String,
}

/// Sorts dosage samples ascending by their `date` key.
///
/// Comparison is lexicographic on the ISO `YYYY-MM-DD` string, which matches
/// chronological order. Samples without a `date` key (or with a non-string
/// one) sort before all dated samples. The sort is stable.
pub fn sort_samples_by_date(samples: &mut [Value]) {
    samples.sort_by(|a, b| sample_date(a).cmp(sample_date(b)));
}

fn sample_date(sample: &Value) -> &str {
    sample.get("date").and_then(Value::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn samples_sort_ascending_by_date() {
        let mut samples = vec![
            json!({"date": "2024-02-01", "dosage": 500}),
            json!({"date": "2024-01-01", "dosage": 250}),
            json!({"date": "2024-03-15", "dosage": 750}),
        ];
        sort_samples_by_date(&mut samples);
        let dates: Vec<&str> = samples
            .iter()
            .map(|s| s["date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, ["2024-01-01", "2024-02-01", "2024-03-15"]);
    }

    #[test]
    fn dateless_samples_sort_first() {
        let mut samples = vec![
            json!({"date": "2024-01-01", "dosage": 250}),
            json!({"dosage": 100}),
            json!({"date": "2023-12-31", "dosage": 200}),
        ];
        sort_samples_by_date(&mut samples);
        assert!(samples[0].get("date").is_none());
        assert_eq!(samples[1]["date"], "2023-12-31");
        assert_eq!(samples[2]["date"], "2024-01-01");
    }

    #[test]
    fn sort_is_stable_for_equal_dates() {
        let mut samples = vec![
            json!({"date": "2024-01-01", "dosage": 1}),
            json!({"date": "2024-01-01", "dosage": 2}),
        ];
        sort_samples_by_date(&mut samples);
        assert_eq!(samples[0]["dosage"], 1);
        assert_eq!(samples[1]["dosage"], 2);
    }
}
