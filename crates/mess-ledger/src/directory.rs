//! Student directory reads and the one status transition the ledger cares
//! about: approval, which seeds the current month's due.

use mess_schemas::{Month, Student, StudentStatus};
use mess_store::{EntityStore, EntityStoreExt, KeyedRecord, StoreError};
use serde_json::json;
use tracing::info;

use crate::dues::ensure_monthly_due;
use crate::settings::fetch_settings;
use crate::LedgerError;

pub async fn get_student(
    store: &dyn EntityStore,
    id: &str,
) -> Result<Option<Student>, StoreError> {
    store.get::<Student>(id).await
}

pub async fn list_students(store: &dyn EntityStore) -> Result<Vec<Student>, StoreError> {
    store.list::<Student>().await
}

/// Apply the one-way status transition pending → approved/rejected.
///
/// Re-applying the status a student already has is a no-op; any other move
/// away from a terminal status is refused. Approval seeds the current
/// month's due at the current fee: only the current month, never earlier
/// ones, regardless of when in the month the approval lands.
pub async fn set_student_status(
    store: &dyn EntityStore,
    student_id: &str,
    new_status: StudentStatus,
    current_month: Month,
) -> Result<Student, LedgerError> {
    if new_status == StudentStatus::Pending {
        return Err(LedgerError::Validation(
            "status can only be set to approved or rejected",
        ));
    }

    let student = store
        .get::<Student>(student_id)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: Student::ENTITY,
            key: student_id.to_string(),
        })?;

    if student.status == new_status {
        return Ok(student);
    }
    if student.status != StudentStatus::Pending {
        return Err(LedgerError::InvalidStatusTransition {
            from: student.status,
            to: new_status,
        });
    }

    let updated = store
        .patch::<Student>(student_id, json!({ "status": new_status.as_str() }))
        .await?;
    info!(student_id, status = new_status.as_str(), "student status updated");

    if new_status == StudentStatus::Approved {
        let settings = fetch_settings(store).await?;
        ensure_monthly_due(store, student_id, current_month, settings.monthly_fee).await?;
    }

    Ok(updated)
}
