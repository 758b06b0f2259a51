use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// Form fields exactly as the client sent them. Anything may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// A form that passed every field rule. Name and mobile are trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub age: u8,
    pub action: Action,
}

/// Normalized record the relay forwards to the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub name: String,
    pub mobile: String,
    pub dob: NaiveDate,
    pub age: u8,
    pub action: Action,
    pub processed_at: DateTime<Utc>,
}

impl Submission {
    pub fn into_payload(self, processed_at: DateTime<Utc>) -> RecordPayload {
        RecordPayload {
            name: self.name,
            mobile: self.mobile,
            dob: self.dob,
            age: self.age,
            action: self.action,
            processed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_payload_wire_shape() {
        let payload = Submission {
            name: "Asha Rao".to_string(),
            mobile: "9876543210".to_string(),
            dob: NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            age: 29,
            action: Action::Create,
        }
        .into_payload(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "name": "Asha Rao",
                "mobile": "9876543210",
                "dob": "1995-01-01",
                "age": 29,
                "action": "create",
                "processedAt": "2024-06-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn test_form_input_tolerates_missing_fields() {
        let input: FormInput = serde_json::from_value(json!({ "name": "Asha" })).unwrap();

        assert_eq!(input.name.as_deref(), Some("Asha"));
        assert!(input.mobile.is_none());
        assert!(input.action.is_none());
    }
}
