//! Subscriber model

use super::{Enterprise, NumberRange, Status};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum! {
    pub enum SubscriberType {
        #[default]
        Prepaid => "PREPAID",
        Postpaid => "POSTPAID",
    }
}

string_enum! {
    pub enum ActivationStatus {
        #[default]
        NotActivated => "NOT_ACTIVATED",
        Activated => "ACTIVATED",
    }
}

/// A SIM subscription bound to a number range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subscriber {
    pub id: Uuid,
    pub msisdn: String,
    pub serial_number: String,
    pub telco_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telco: Option<Enterprise>,
    pub range_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<NumberRange>,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub sub_type: SubscriberType,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub activation_status: ActivationStatus,
    pub activation_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(deserialize_with = "crate::models::lenient")]
    pub status: Status,
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    /// Case-insensitive substring match on MSISDN or SIM serial
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.msisdn.to_lowercase().contains(&term)
            || self.serial_number.to_lowercase().contains(&term)
    }
}
