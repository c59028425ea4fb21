// libs/scheduling-cell/src/models.rs
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::interval::MinuteInterval;

/// Central scheduling entity. Dates are clinic-local `YYYY-MM-DD`, times are
/// grid-aligned `HH:MM`; no timezone conversion happens anywhere (single
/// clinic, local wall-clock).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor: String,
    pub date: NaiveDate,
    #[serde(with = "time_hm")]
    pub time: NaiveTime,
    pub duration_minutes: i64,
    pub reason: VisitReason,
    pub custom_reason: Option<String>,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub cancellation_requested: bool,
    pub notes: Option<String>,
}

impl Appointment {
    /// Occupied minute range `[time, time + duration)`.
    pub fn interval(&self) -> MinuteInterval {
        MinuteInterval::starting_at(self.time, self.duration_minutes)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }

    /// Unpaid pending requests are placeholders: visible on the assigned
    /// doctor's calendar but not allowed to block public booking.
    pub fn is_unpaid_placeholder(&self) -> bool {
        self.status == AppointmentStatus::Pending && self.payment_status == PaymentStatus::Unpaid
    }
}

/// Categorical reason for the visit. `Other` is the sentinel that requires a
/// non-empty free-text `custom_reason`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisitReason {
    Checkup,
    Cleaning,
    Filling,
    Extraction,
    RootCanal,
    Braces,
    Whitening,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "tentative")]
    Tentative,
    #[serde(rename = "To Pay")]
    ToPay,
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Tentative => write!(f, "tentative"),
            AppointmentStatus::ToPay => write!(f, "To Pay"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Confirmed => write!(f, "confirmed"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Set by the payment subsystem; the scheduling core only reads it to gate
/// public visibility and the requests inbox.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    #[serde(rename = "unpaid")]
    Unpaid,
    #[serde(rename = "half-paid")]
    HalfPaid,
    #[serde(rename = "paid")]
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "unpaid"),
            PaymentStatus::HalfPaid => write!(f, "half-paid"),
            PaymentStatus::Paid => write!(f, "paid"),
        }
    }
}

/// Wire format for appointment start times is `HH:MM`, not chrono's default
/// `HH:MM:SS`.
pub mod time_hm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "Maria Cruz".to_string(),
            doctor: "Dr. Reyes".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 9, 14).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            duration_minutes: 30,
            reason: VisitReason::Cleaning,
            custom_reason: None,
            status: AppointmentStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            cancellation_requested: false,
            notes: None,
        }
    }

    #[test]
    fn serializes_portal_wire_strings() {
        let mut appt = sample();
        appt.status = AppointmentStatus::ToPay;
        appt.payment_status = PaymentStatus::HalfPaid;

        let value = serde_json::to_value(&appt).unwrap();
        assert_eq!(value["status"], "To Pay");
        assert_eq!(value["payment_status"], "half-paid");
        assert_eq!(value["date"], "2026-09-14");
        assert_eq!(value["time"], "09:30");
    }

    #[test]
    fn deserializes_seconds_suffixed_times() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["time"] = serde_json::json!("14:00:00");
        let appt: Appointment = serde_json::from_value(value).unwrap();
        assert_eq!(appt.time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }

    #[test]
    fn unpaid_pending_is_a_placeholder() {
        let appt = sample();
        assert!(appt.is_unpaid_placeholder());

        let mut paid = sample();
        paid.payment_status = PaymentStatus::Paid;
        assert!(!paid.is_unpaid_placeholder());

        let mut confirmed = sample();
        confirmed.status = AppointmentStatus::Confirmed;
        assert!(!confirmed.is_unpaid_placeholder());
    }
}
