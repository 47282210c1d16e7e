//! One-time startup bootstrap.
//!
//! The portal ships with fixed admin and manager accounts. They are created
//! here, once, at daemon startup, guarded by the store's atomic create. This
//! replaces any notion of re-checking them on every request: a duplicate
//! create simply reports `AlreadyExists` and is ignored.

use sha2::{Digest, Sha256};
use tracing::info;

use mess_schemas::{Role, Student, StudentStatus};
use mess_store::{EntityStore, EntityStoreExt, StoreError};

pub const ADMIN_ID: &str = "admin@messconnect.com";
pub const MANAGER_ID: &str = "manager@messconnect.com";

/// Env var overriding the default bootstrap credential.
pub const ENV_BOOTSTRAP_CREDENTIAL: &str = "MESS_BOOTSTRAP_CREDENTIAL";

const DEFAULT_CREDENTIAL: &str = "password";

/// Idempotent: safe to call on every startup.
pub async fn ensure_bootstrap_accounts(store: &dyn EntityStore) -> Result<(), StoreError> {
    let credential = std::env::var(ENV_BOOTSTRAP_CREDENTIAL)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CREDENTIAL.to_string());
    let credential_hash = sha256_hex(&credential);

    let accounts = [
        (ADMIN_ID, "Admin", "0000000000", Role::Admin),
        (MANAGER_ID, "Manager", "1111111111", Role::Manager),
    ];

    for (id, name, phone, role) in accounts {
        let account = Student {
            id: id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            credential_hash: credential_hash.clone(),
            role,
            status: StudentStatus::Approved,
        };
        match store.create(&account).await {
            Ok(()) => info!(id, "bootstrap account created"),
            Err(StoreError::AlreadyExists { .. }) => {}
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}
