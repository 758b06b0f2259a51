use chrono::{DateTime, NaiveDate, Utc};
use form::{Action, validate::parse_dob};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

/// Stored document. `mobile` is the lookup key for upsert and delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub age: i64,
    pub action: Action,
    pub processed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of insert and upsert requests before any checking.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub age: Option<Value>,
    pub action: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
}

/// Checked and coerced fields, ready to become a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub name: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub age: i64,
    pub action: Action,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteRequest {
    pub mobile: Option<String>,
}

impl RecordInput {
    pub fn into_new(self, now: DateTime<Utc>) -> Result<NewRecord, AppError> {
        let fields = (
            text(self.name),
            text(self.mobile),
            text(self.dob),
            self.age.filter(|age| !age.is_null()),
            text(self.action),
        );

        match fields {
            (Some(name), Some(mobile), Some(dob), Some(age), Some(action)) => Ok(NewRecord {
                name,
                mobile,
                dob: parse_dob(&dob)?,
                age: coerce_age(&age)?,
                action: action.parse()?,
                processed_at: self.processed_at.unwrap_or(now),
            }),
            (name, mobile, dob, age, action) => {
                let missing = [
                    ("name", name.is_none()),
                    ("mobile", mobile.is_none()),
                    ("dob", dob.is_none()),
                    ("age", age.is_none()),
                    ("action", action.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();

                Err(AppError::MissingFields(missing))
            }
        }
    }
}

pub fn text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn coerce_age(age: &Value) -> Result<i64, AppError> {
    let coerced = match age {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        _ => None,
    };

    coerced.ok_or_else(|| AppError::MalformedPayload(format!("age must be a number, got {age}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn input(value: Value) -> RecordInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_age_coercion() {
        assert_eq!(coerce_age(&json!(29)).unwrap(), 29);
        assert_eq!(coerce_age(&json!(29.9)).unwrap(), 29);
        assert_eq!(coerce_age(&json!(" 41 ")).unwrap(), 41);
        assert_eq!(coerce_age(&json!("41.5")).unwrap(), 41);
        assert!(coerce_age(&json!("forty")).is_err());
        assert!(coerce_age(&json!(true)).is_err());
    }

    #[test]
    fn test_missing_fields_listed() {
        let err = input(json!({ "name": "Asha", "age": null, "dob": " " }))
            .into_new(Utc::now())
            .unwrap_err();

        match err {
            AppError::MissingFields(fields) => {
                assert_eq!(fields, ["mobile", "dob", "age", "action"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_processed_at_defaults_to_now() {
        let now = Utc::now();
        let record = input(json!({
            "name": " Asha Rao ",
            "mobile": "9876543210",
            "dob": "1995-01-01",
            "age": "29",
            "action": "CREATE",
        }))
        .into_new(now)
        .unwrap();

        assert_eq!(record.name, "Asha Rao");
        assert_eq!(record.age, 29);
        assert_eq!(record.action, Action::Create);
        assert_eq!(record.processed_at, now);
    }

    #[test]
    fn test_bad_dob_rejected() {
        let err = input(json!({
            "name": "Asha",
            "mobile": "9876543210",
            "dob": "yesterday",
            "age": 29,
            "action": "create",
        }))
        .into_new(Utc::now())
        .unwrap_err();

        assert!(matches!(err, AppError::Invalid(_)));
    }
}
