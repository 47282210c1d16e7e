//! Settings singleton access.

use mess_schemas::{MessSettings, SETTINGS_KEY};
use mess_store::{EntityStore, EntityStoreExt, StoreError};
use serde_json::json;

use crate::LedgerError;

/// Read the settings, falling back to the zero-fee default when nothing has
/// ever been written. The default is NOT persisted; this is the one place a
/// missing record is deliberately papered over with a just-in-time value.
pub async fn fetch_settings(store: &dyn EntityStore) -> Result<MessSettings, StoreError> {
    Ok(store
        .get::<MessSettings>(SETTINGS_KEY)
        .await?
        .unwrap_or_default())
}

/// Upsert the settings singleton. Fees are forward-looking only: dues that
/// were already seeded keep their amount.
pub async fn update_settings(
    store: &dyn EntityStore,
    monthly_fee: i64,
    rules: &str,
) -> Result<MessSettings, LedgerError> {
    if monthly_fee < 0 {
        return Err(LedgerError::Validation("monthly fee must be >= 0"));
    }

    if store.exists::<MessSettings>(SETTINGS_KEY).await? {
        let updated = store
            .patch::<MessSettings>(
                SETTINGS_KEY,
                json!({ "monthly_fee": monthly_fee, "rules": rules }),
            )
            .await?;
        Ok(updated)
    } else {
        let settings = MessSettings {
            id: SETTINGS_KEY.to_string(),
            monthly_fee,
            rules: rules.to_string(),
        };
        store.create(&settings).await?;
        Ok(settings)
    }
}
