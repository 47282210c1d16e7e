//! Callback reconciliation: verify first, mutate second.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mess_ledger::{mark_due_paid, record_guest_payment};
use mess_schemas::{GuestPayment, MonthlyDue};
use mess_store::EntityStore;

use crate::{GatewayError, SignatureVerifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackEntity {
    Due,
    Guest,
}

/// A gateway callback as the daemon receives it: the gateway's order id,
/// payment id and signature, plus the caller-supplied correlation fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCallback {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    pub entity_id: String,
    pub entity_type: CallbackEntity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_details: Option<GuestDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestDetails {
    pub name: String,
    pub phone: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettlementOutcome {
    DueSettled { due: MonthlyDue },
    GuestRecorded { payment: GuestPayment },
}

/// Apply one gateway callback to the ledger.
///
/// The signature check gates everything: a mismatch returns
/// [`GatewayError::SignatureInvalid`] before any store access. After a
/// match, a `due` callback settles the referenced due (`NotFound` when it
/// does not exist; a replay against an already-paid due is a no-op), and a
/// `guest` callback always appends a fresh guest payment. Replayed valid
/// guest callbacks therefore double-record: known at-least-once semantics,
/// deliberately not deduplicated by payment id.
pub async fn apply_callback(
    store: &dyn EntityStore,
    verifier: &SignatureVerifier,
    callback: &PaymentCallback,
    now: DateTime<Utc>,
) -> Result<SettlementOutcome, GatewayError> {
    verifier.verify(&callback.order_id, &callback.payment_id, &callback.signature)?;

    match callback.entity_type {
        CallbackEntity::Due => {
            let due = mark_due_paid(store, &callback.entity_id).await?;
            Ok(SettlementOutcome::DueSettled { due })
        }
        CallbackEntity::Guest => {
            let details = callback
                .guest_details
                .as_ref()
                .ok_or(GatewayError::InvalidGuestDetails(
                    "guest callback requires guest details",
                ))?;
            if details.amount <= 0 {
                return Err(GatewayError::InvalidGuestDetails(
                    "guest payment amount must be > 0",
                ));
            }
            if details.name.trim().is_empty() {
                return Err(GatewayError::InvalidGuestDetails(
                    "guest payment requires a name",
                ));
            }
            let payment =
                record_guest_payment(store, &details.name, &details.phone, details.amount, now)
                    .await?;
            Ok(SettlementOutcome::GuestRecorded { payment })
        }
    }
}
