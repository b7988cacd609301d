use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RecordId = Uuid;

/// A normalized visit entry, ready to be written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRetailerRecord {
    pub employee_name: String,
    pub retailer_name: String,
    pub retailer_contact: String,
    pub retailer_email: String,
    pub shop_name: String,
    pub city_village: String,
    pub tehsil: Option<String>,
    pub district: String,
    pub state: String,
    pub visiting_date_time: Option<DateTime<Utc>>,
    pub bbps: String,
    pub aeps: String,
    pub dmt: String,
    pub cms: String,
    pub onboarding_status: String,
    pub retailer_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetailerRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub data: NewRetailerRecord,
}

/// Constraints applied at query time. Unset fields impose nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetailerFilter {
    /// Inclusive lower bound on `visiting_date_time`.
    pub visited_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `visiting_date_time`.
    pub visited_to: Option<DateTime<Utc>>,
    /// Case-insensitive literal substring of `employee_name`.
    pub employee_name_contains: Option<String>,
}

impl RetailerFilter {
    pub fn has_date_bound(&self) -> bool {
        self.visited_from.is_some() || self.visited_to.is_some()
    }

    pub fn is_unfiltered(&self) -> bool {
        !self.has_date_bound() && self.employee_name_contains.is_none()
    }

    /// Evaluates the filter against a record in process.
    ///
    /// Records without a visit time never satisfy a date bound.
    pub fn matches(&self, record: &NewRetailerRecord) -> bool {
        if self.has_date_bound() {
            let Some(visited) = record.visiting_date_time else {
                return false;
            };
            if self.visited_from.is_some_and(|from| visited < from) {
                return false;
            }
            if self.visited_to.is_some_and(|to| visited > to) {
                return false;
            }
        }

        match &self.employee_name_contains {
            Some(needle) => record
                .employee_name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}
