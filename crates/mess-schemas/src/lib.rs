//! Shared domain records for the mess portal core.
//!
//! Everything here is plain data: serde-derived shapes plus the `Month`
//! value type. No I/O, no storage knowledge; the store and ledger crates
//! consume these.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod month;

pub use month::Month;

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Manager,
    Admin,
}

/// Approval state of a directory record. One-way: `pending` may move to
/// `approved` or `rejected`; neither of those ever moves again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Pending,
    Approved,
    Rejected,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Pending => "pending",
            StudentStatus::Approved => "approved",
            StudentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(StudentStatus::Pending),
            "approved" => Ok(StudentStatus::Approved),
            "rejected" => Ok(StudentStatus::Rejected),
            other => Err(anyhow!("invalid student status: {}", other)),
        }
    }
}

/// One directory record. `id` is the stable unique identifier (the portal
/// uses the email address). `credential_hash` is carried for bootstrap-created
/// accounts; the core never verifies credentials itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub credential_hash: String,
    pub role: Role,
    pub status: StudentStatus,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub const SETTINGS_KEY: &str = "settings";

/// Singleton mess settings. `monthly_fee` is in minor units and must be >= 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessSettings {
    pub id: String,
    pub monthly_fee: i64,
    pub rules: String,
}

impl Default for MessSettings {
    fn default() -> Self {
        Self {
            id: SETTINGS_KEY.to_string(),
            monthly_fee: 0,
            rules: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Monthly dues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Due,
    Paid,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Due => "due",
            DueStatus::Paid => "paid",
        }
    }
}

/// One month's payable obligation for one student.
///
/// `id` is the composite key `studentId:YYYY-MM`. `amount` is fixed at
/// creation and never recomputed; `carried_over_amount` is present only when
/// an unpaid prior balance was folded in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyDue {
    pub id: String,
    pub student_id: String,
    /// `YYYY-MM`
    pub month: String,
    pub amount: i64,
    pub status: DueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_over_amount: Option<i64>,
}

// ---------------------------------------------------------------------------
// Guest payments
// ---------------------------------------------------------------------------

/// Append-only record of a one-off guest transaction. Never mutated, never
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestPayment {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Gateway orders (transient)
// ---------------------------------------------------------------------------

/// A remote payment intent. Correlates an amount to a local entity on the
/// gateway side only; never persisted locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOrder {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
}
