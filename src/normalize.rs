//! Raw API record to stored record mapping.
//!
//! The external API never guarantees clean columns. The rule here is lossy on
//! purpose: a numeric field that fails to parse becomes `0`/`0.0`, a blank
//! string field falls back to a fixed default. Nothing in this module errors.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::{DEFAULT_FIN_YEAR, STATE_NAME},
    fetch::RawRecord,
};

/// The persisted entity. Numeric fields are always finite; invalid source
/// values coerce to zero rather than propagating as errors.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SchemeRecord {
    pub district: String,
    pub state: String,
    pub fin_year: String,
    pub total_households: i64,
    pub job_cards_issued: i64,
    pub employment_demanded: i64,
    pub employment_provided: i64,
    pub persondays_generated: i64,
    pub avg_days_per_household: i64,
    pub works_completed: i64,
    pub expenditure_cr: f64,
    pub last_synced: String,
}

/// Pure mapping from one raw record to one stored record. `fallback_district`
/// is the request's district parameter, used when the source omits its own.
pub fn normalize(raw: &RawRecord, fallback_district: &str, now: DateTime<Utc>) -> SchemeRecord {
    SchemeRecord {
        district: non_empty(&raw.district_name, fallback_district),
        state: STATE_NAME.to_string(),
        fin_year: non_empty(&raw.fin_year, DEFAULT_FIN_YEAR),
        total_households: as_int(&raw.total_households),
        job_cards_issued: as_int(&raw.job_cards_issued),
        employment_demanded: as_int(&raw.employment_demanded),
        employment_provided: as_int(&raw.employment_provided),
        persondays_generated: as_int(&raw.persondays_generated),
        avg_days_per_household: as_int(&raw.avg_days_per_household),
        works_completed: as_int(&raw.works_completed),
        expenditure_cr: as_float(&raw.total_expenditure_cr),
        last_synced: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn non_empty(value: &Option<String>, fallback: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

/// Integer columns arrive as strings, numbers, or garbage. Decimal strings
/// truncate ("12.7" parses to 12); anything unparseable is 0.
fn as_int(value: &Option<Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn as_float(value: &Option<Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    // "NaN" and "inf" parse as floats; the stored value must stay finite.
    parsed.filter(|f| f.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::{as_float, as_int, normalize};
    use crate::fetch::RawRecord;

    fn raw() -> RawRecord {
        RawRecord {
            district_name: Some("Agra".to_string()),
            fin_year: Some("2023-24".to_string()),
            total_households: Some(json!("1200")),
            job_cards_issued: Some(json!(450)),
            employment_demanded: Some(json!("N/A")),
            employment_provided: None,
            persondays_generated: Some(json!("88.9")),
            avg_days_per_household: Some(json!(null)),
            works_completed: Some(json!("  37 ")),
            total_expenditure_cr: Some(json!("15.25")),
        }
    }

    #[test]
    fn test_numeric_coercion() {
        let record = normalize(&raw(), "Agra", Utc::now());

        assert_eq!(record.total_households, 1200);
        assert_eq!(record.job_cards_issued, 450);
        assert_eq!(record.employment_demanded, 0);
        assert_eq!(record.employment_provided, 0);
        assert_eq!(record.persondays_generated, 88);
        assert_eq!(record.avg_days_per_household, 0);
        assert_eq!(record.works_completed, 37);
        assert_eq!(record.expenditure_cr, 15.25);
    }

    #[test]
    fn test_missing_district_falls_back_to_parameter() {
        let mut source = raw();
        source.district_name = None;
        assert_eq!(normalize(&source, "Lucknow", Utc::now()).district, "Lucknow");

        source.district_name = Some("   ".to_string());
        assert_eq!(normalize(&source, "Lucknow", Utc::now()).district, "Lucknow");
    }

    #[test]
    fn test_defaults_for_empty_record() {
        let record = normalize(&RawRecord::default(), "Varanasi", Utc::now());

        assert_eq!(record.district, "Varanasi");
        assert_eq!(record.state, "Uttar Pradesh");
        assert_eq!(record.fin_year, "2024-25");
        assert_eq!(record.total_households, 0);
        assert_eq!(record.expenditure_cr, 0.0);
    }

    #[test]
    fn test_float_stays_finite() {
        assert_eq!(as_float(&Some(json!("NaN"))), 0.0);
        assert_eq!(as_float(&Some(json!("inf"))), 0.0);
        assert_eq!(as_float(&Some(json!("-3.5"))), -3.5);
        assert_eq!(as_float(&None), 0.0);
    }

    #[test]
    fn test_int_edge_cases() {
        assert_eq!(as_int(&Some(json!(""))), 0);
        assert_eq!(as_int(&Some(json!("12.7"))), 12);
        assert_eq!(as_int(&Some(json!(3.9))), 3);
        assert_eq!(as_int(&Some(json!([1, 2]))), 0);
    }

    #[test]
    fn test_timestamp_is_sortable() {
        let now = Utc::now();
        let record = normalize(&RawRecord::default(), "Agra", now);

        assert!(record.last_synced.ends_with('Z'));
        assert_eq!(record.last_synced, now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true));
    }
}
