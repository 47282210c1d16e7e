//! Due generation, carry-forward, and settlement.

use mess_schemas::{DueStatus, Month, MonthlyDue, Student, StudentStatus};
use mess_store::{monthly_due_key, EntityStore, EntityStoreExt, KeyedRecord, StoreError};
use serde_json::json;
use tracing::info;

use crate::settings::fetch_settings;

/// Ensure the due for (student, month) exists; idempotent and race-safe.
///
/// When absent, the new due's amount is the current fee plus the previous
/// month's amount if that due exists and is still unpaid. The carry-forward
/// reads the previous month's status as persisted *at seed time*: a payment
/// that lands after this month's due was already created does not shrink it.
/// Creation goes through the store's atomic create, so two requests racing
/// on the same (student, month) produce exactly one record; the loser
/// re-reads and returns the winner's.
pub async fn ensure_monthly_due(
    store: &dyn EntityStore,
    student_id: &str,
    month: Month,
    fee: i64,
) -> Result<MonthlyDue, StoreError> {
    let month_str = month.to_string();
    let key = monthly_due_key(student_id, &month_str);

    if let Some(existing) = store.get::<MonthlyDue>(&key).await? {
        return Ok(existing);
    }

    let prev_key = monthly_due_key(student_id, &month.previous().to_string());
    let carried_over = store
        .get::<MonthlyDue>(&prev_key)
        .await?
        .filter(|d| d.status == DueStatus::Due)
        .map(|d| d.amount)
        .filter(|&a| a > 0);

    let due = MonthlyDue {
        id: key.clone(),
        student_id: student_id.to_string(),
        month: month_str,
        amount: fee + carried_over.unwrap_or(0),
        status: DueStatus::Due,
        carried_over_amount: carried_over,
    };

    match store.create(&due).await {
        Ok(()) => {
            info!(
                student_id,
                month = %month,
                amount = due.amount,
                carried_over = ?due.carried_over_amount,
                "seeded monthly due"
            );
            Ok(due)
        }
        // Lost a seed race: another request created it between our read and
        // our create. Their record is the one and only.
        Err(StoreError::AlreadyExists { .. }) => store
            .get::<MonthlyDue>(&key)
            .await?
            .ok_or(StoreError::NotFound {
                entity: MonthlyDue::ENTITY,
                key,
            }),
        Err(err) => Err(err),
    }
}

/// The lazy seeding path behind every dues query: an approved student gets
/// the current month's due ensured before listing; anyone else just gets
/// whatever already exists.
pub async fn ensure_and_list_dues(
    store: &dyn EntityStore,
    student: &Student,
    month: Month,
) -> Result<Vec<MonthlyDue>, StoreError> {
    if student.status == StudentStatus::Approved {
        let settings = fetch_settings(store).await?;
        ensure_monthly_due(store, &student.id, month, settings.monthly_fee).await?;
    }
    dues_for_student(store, &student.id).await
}

pub async fn dues_for_student(
    store: &dyn EntityStore,
    student_id: &str,
) -> Result<Vec<MonthlyDue>, StoreError> {
    let mut dues: Vec<MonthlyDue> = store.list::<MonthlyDue>().await?;
    dues.retain(|d| d.student_id == student_id);
    Ok(dues)
}

pub async fn all_dues(store: &dyn EntityStore) -> Result<Vec<MonthlyDue>, StoreError> {
    store.list::<MonthlyDue>().await
}

/// Manual settlement: set the due to paid unconditionally.
///
/// `NotFound` when the id does not exist; re-applying to an already-paid due
/// is a no-op (the amount never changes either way).
pub async fn mark_due_paid(
    store: &dyn EntityStore,
    due_id: &str,
) -> Result<MonthlyDue, StoreError> {
    let due = store
        .get::<MonthlyDue>(due_id)
        .await?
        .ok_or_else(|| StoreError::NotFound {
            entity: MonthlyDue::ENTITY,
            key: due_id.to_string(),
        })?;

    if due.status == DueStatus::Paid {
        return Ok(due);
    }

    let settled = store
        .patch::<MonthlyDue>(due_id, json!({ "status": DueStatus::Paid.as_str() }))
        .await?;
    info!(due_id, amount = settled.amount, "due settled");
    Ok(settled)
}
