use std::fmt;

use retailer_repository::{NewRetailerRecord, RecordId, RetailerRepository};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{Result, ServiceError};
use crate::settings::{ServiceSettings, ValidationMode};
use crate::timestamp::parse_visit_time;

/// A submission exactly as the client sent it.
///
/// Every field is optional on the wire. Scalars may arrive as JSON strings or
/// numbers; numbers are kept in their textual form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetailerPayload {
    #[serde(deserialize_with = "text_or_number")]
    pub employee_name: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub retailer_name: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub retailer_contact: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub retailer_email: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub shop_name: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub city_village: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub tehsil: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub district: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub state: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub visiting_date_time: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub bbps: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub aeps: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub dmt: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub cms: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub onboarding_status: Option<String>,
    #[serde(deserialize_with = "text_or_number")]
    pub retailer_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStatus {
    Yes,
    No,
}

impl OnboardingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStatus::Yes => "Yes",
            OnboardingStatus::No => "No",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

impl fmt::Display for OnboardingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RetailerPayload {
    /// Trims and checks the submission, producing the record to store.
    ///
    /// In strict mode every problem found is reported in one
    /// `ServiceError::Validation`. In permissive mode this never fails.
    pub fn normalize(self, settings: &ServiceSettings) -> Result<NewRetailerRecord> {
        let strict = settings.validation == ValidationMode::Strict;
        let mut problems = Vec::new();

        let visiting_date_time = match present(self.visiting_date_time) {
            None => None,
            Some(raw) => match parse_visit_time(&raw, settings.timezone) {
                Some(instant) => Some(instant),
                None if strict => {
                    problems.push(format!(
                        "visitingDateTime '{raw}' is not a recognizable date/time"
                    ));
                    None
                }
                None => {
                    warn!(value = %raw, "storing record without unreadable visitingDateTime");
                    None
                }
            },
        };

        let mut record = NewRetailerRecord {
            employee_name: text(self.employee_name),
            retailer_name: text(self.retailer_name),
            retailer_contact: text(self.retailer_contact),
            retailer_email: text(self.retailer_email),
            shop_name: text(self.shop_name),
            city_village: text(self.city_village),
            tehsil: present(self.tehsil),
            district: text(self.district),
            state: text(self.state),
            visiting_date_time,
            bbps: text(self.bbps),
            aeps: text(self.aeps),
            dmt: text(self.dmt),
            cms: text(self.cms),
            onboarding_status: text(self.onboarding_status),
            retailer_image: present(self.retailer_image),
        };

        if !strict {
            return Ok(record);
        }

        for (field, value) in [
            ("employeeName", &record.employee_name),
            ("retailerName", &record.retailer_name),
        ] {
            if value.is_empty() {
                problems.push(format!("{field} is required"));
            }
        }

        for (field, value) in [
            ("bbps", &record.bbps),
            ("aeps", &record.aeps),
            ("dmt", &record.dmt),
            ("cms", &record.cms),
        ] {
            if !value.is_empty() && value.parse::<u64>().is_err() {
                problems.push(format!("{field} must be a non-negative whole number"));
            }
        }

        if !record.onboarding_status.is_empty() {
            match OnboardingStatus::parse(&record.onboarding_status) {
                Some(status) => record.onboarding_status = status.as_str().to_string(),
                None => problems.push(format!(
                    "onboardingStatus '{}' must be Yes or No",
                    record.onboarding_status
                )),
            }
        }

        if problems.is_empty() {
            Ok(record)
        } else {
            Err(ServiceError::Validation(problems.join("; ")))
        }
    }
}

/// Normalizes and stores one submission. Duplicates are stored as-is.
pub async fn ingest(
    repository: &dyn RetailerRepository,
    payload: RetailerPayload,
    settings: &ServiceSettings,
) -> Result<RecordId> {
    let record = payload.normalize(settings)?;
    let id = repository.insert(&record).await?;
    info!(record_id = %id, employee = %record.employee_name, "retailer record saved");
    Ok(id)
}

fn text(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_kept_as_text() {
        let payload: RetailerPayload = serde_json::from_str(
            r#"{"retailerContact": 9876543210, "bbps": 5, "cms": null}"#,
        )
        .unwrap();
        assert_eq!(payload.retailer_contact.as_deref(), Some("9876543210"));
        assert_eq!(payload.bbps.as_deref(), Some("5"));
        assert_eq!(payload.cms, None);
        assert_eq!(payload.employee_name, None);
    }

    #[test]
    fn nested_values_are_rejected() {
        let parsed = serde_json::from_str::<RetailerPayload>(r#"{"shopName": {"a": 1}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn onboarding_status_is_canonicalized() {
        assert_eq!(OnboardingStatus::parse("YES"), Some(OnboardingStatus::Yes));
        assert_eq!(OnboardingStatus::parse("no"), Some(OnboardingStatus::No));
        assert_eq!(OnboardingStatus::parse("maybe"), None);
    }
}
