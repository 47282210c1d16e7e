//! The monthly due ledger.
//!
//! Owns every write path to dues and guest payments: idempotent seeding with
//! arrears carry-forward, settlement, the append-only guest log, the
//! settings read path, and the directory status transition that triggers
//! seeding. The gateway crate calls into this one after it has verified a
//! callback; nothing else mutates ledger state.

use mess_schemas::StudentStatus;
use mess_store::StoreError;

mod directory;
mod dues;
mod guests;
mod settings;

pub use directory::{get_student, list_students, set_student_status};
pub use dues::{all_dues, dues_for_student, ensure_and_list_dues, ensure_monthly_due, mark_due_paid};
pub use guests::{all_guest_payments, record_guest_payment};
pub use settings::{fetch_settings, update_settings};

// ---------------------------------------------------------------------------
// LedgerError
// ---------------------------------------------------------------------------

/// Ledger-level failures layered over the store's.
#[derive(Debug)]
pub enum LedgerError {
    Store(StoreError),
    /// Attempted status change that violates the one-way
    /// pending → approved/rejected rule.
    InvalidStatusTransition {
        from: StudentStatus,
        to: StudentStatus,
    },
    /// Malformed or out-of-range input, rejected before any store write.
    Validation(&'static str),
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerError::Store(err) => write!(f, "{err}"),
            LedgerError::InvalidStatusTransition { from, to } => write!(
                f,
                "invalid status transition: {} -> {}",
                from.as_str(),
                to.as_str()
            ),
            LedgerError::Validation(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        LedgerError::Store(err)
    }
}
