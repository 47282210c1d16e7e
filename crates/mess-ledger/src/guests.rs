//! Append-only guest payment log.

use chrono::{DateTime, Utc};
use mess_schemas::GuestPayment;
use mess_store::{EntityStore, EntityStoreExt, StoreError};
use tracing::info;
use uuid::Uuid;

/// Record one guest transaction. Every call appends a fresh record; there
/// is no dedup here; callers that need at-most-once must arrange it above
/// this layer.
pub async fn record_guest_payment(
    store: &dyn EntityStore,
    name: &str,
    phone: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<GuestPayment, StoreError> {
    let payment = GuestPayment {
        id: Uuid::new_v4(),
        name: name.to_string(),
        phone: phone.to_string(),
        amount,
        created_at: now,
    };
    store.create(&payment).await?;
    info!(payment_id = %payment.id, amount, "guest payment recorded");
    Ok(payment)
}

pub async fn all_guest_payments(store: &dyn EntityStore) -> Result<Vec<GuestPayment>, StoreError> {
    store.list::<GuestPayment>().await
}
