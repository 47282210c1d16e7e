//! Due generation and carry-forward scenarios.

use std::sync::Arc;

use mess_ledger::{
    ensure_and_list_dues, ensure_monthly_due, fetch_settings, mark_due_paid, update_settings,
};
use mess_schemas::{DueStatus, Month, Role, Student, StudentStatus};
use mess_store::{EntityStoreExt, MemoryStore};

fn month(s: &str) -> Month {
    Month::parse(s).unwrap()
}

fn approved_student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        name: "Alice".to_string(),
        phone: "9000000001".to_string(),
        credential_hash: "deadbeef".to_string(),
        role: Role::Student,
        status: StudentStatus::Approved,
    }
}

// ---------------------------------------------------------------------------
// First seeding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_query_of_a_month_creates_the_due_at_the_current_fee() {
    let store = MemoryStore::new();

    let due = ensure_monthly_due(&store, "alice", month("2024-06"), 3000)
        .await
        .unwrap();

    assert_eq!(due.id, "alice:2024-06");
    assert_eq!(due.month, "2024-06");
    assert_eq!(due.amount, 3000);
    assert_eq!(due.status, DueStatus::Due);
    assert!(
        due.carried_over_amount.is_none(),
        "no prior month, so nothing carried over"
    );
}

#[tokio::test]
async fn seeding_twice_yields_exactly_one_record() {
    let store = MemoryStore::new();

    let first = ensure_monthly_due(&store, "alice", month("2024-06"), 3000)
        .await
        .unwrap();
    // Fee change between calls must not matter: amount is fixed at creation.
    let second = ensure_monthly_due(&store, "alice", month("2024-06"), 9999)
        .await
        .unwrap();

    assert_eq!(first.amount, second.amount);
    let all: Vec<mess_schemas::MonthlyDue> = store.list().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn concurrent_seeding_races_produce_one_due() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            ensure_monthly_due(store.as_ref(), "alice", month("2024-06"), 3000).await
        }));
    }
    for h in handles {
        let due = h.await.unwrap().expect("losers adopt the winner's record");
        assert_eq!(due.amount, 3000);
    }

    let all: Vec<mess_schemas::MonthlyDue> = store.list().await.unwrap();
    assert_eq!(all.len(), 1);
}

// ---------------------------------------------------------------------------
// Carry-forward
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unpaid_prior_month_is_carried_into_the_new_due() {
    let store = MemoryStore::new();

    // June seeded at fee 3000, left unpaid.
    ensure_monthly_due(&store, "alice", month("2024-06"), 3000)
        .await
        .unwrap();

    // Fee raised to 3500; first July query folds the arrears in.
    let july = ensure_monthly_due(&store, "alice", month("2024-07"), 3500)
        .await
        .unwrap();

    assert_eq!(july.amount, 6500);
    assert_eq!(july.carried_over_amount, Some(3000));
    assert_eq!(july.status, DueStatus::Due);

    // June is untouched: still its own due at its own amount.
    let june: mess_schemas::MonthlyDue = store
        .get::<mess_schemas::MonthlyDue>("alice:2024-06")
        .await
        .unwrap()
        .expect("june due still present");
    assert_eq!(june.amount, 3000);
    assert_eq!(june.status, DueStatus::Due);
}

#[tokio::test]
async fn paid_prior_month_carries_nothing() {
    let store = MemoryStore::new();

    ensure_monthly_due(&store, "alice", month("2024-06"), 3000)
        .await
        .unwrap();
    mark_due_paid(&store, "alice:2024-06").await.unwrap();

    let july = ensure_monthly_due(&store, "alice", month("2024-07"), 3500)
        .await
        .unwrap();

    assert_eq!(july.amount, 3500);
    assert!(july.carried_over_amount.is_none());
}

#[tokio::test]
async fn late_payment_does_not_shrink_an_already_seeded_due() {
    let store = MemoryStore::new();

    ensure_monthly_due(&store, "alice", month("2024-06"), 3000)
        .await
        .unwrap();
    let july = ensure_monthly_due(&store, "alice", month("2024-07"), 3500)
        .await
        .unwrap();
    assert_eq!(july.amount, 6500);

    // June gets paid only after July was seeded. July's amount was fixed at
    // seed time and stays put.
    mark_due_paid(&store, "alice:2024-06").await.unwrap();
    let july_after: mess_schemas::MonthlyDue = store
        .get::<mess_schemas::MonthlyDue>("alice:2024-07")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(july_after.amount, 6500);
    assert_eq!(july_after.carried_over_amount, Some(3000));
}

// ---------------------------------------------------------------------------
// Lazy query path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dues_query_seeds_for_approved_students_only() {
    let store = MemoryStore::new();
    update_settings(&store, 3000, "").await.unwrap();

    let mut pending = approved_student("bob");
    pending.status = StudentStatus::Pending;
    let dues = ensure_and_list_dues(&store, &pending, month("2024-06"))
        .await
        .unwrap();
    assert!(dues.is_empty(), "pending students are never seeded");

    let dues = ensure_and_list_dues(&store, &approved_student("alice"), month("2024-06"))
        .await
        .unwrap();
    assert_eq!(dues.len(), 1);
    assert_eq!(dues[0].amount, 3000);
}

#[tokio::test]
async fn settings_default_to_zero_fee_until_written() {
    let store = MemoryStore::new();

    let settings = fetch_settings(&store).await.unwrap();
    assert_eq!(settings.monthly_fee, 0);
    assert_eq!(settings.rules, "");

    // The just-in-time default is not persisted.
    assert!(
        !store
            .exists::<mess_schemas::MessSettings>("settings")
            .await
            .unwrap()
    );

    update_settings(&store, 3500, "no outside food").await.unwrap();
    let settings = fetch_settings(&store).await.unwrap();
    assert_eq!(settings.monthly_fee, 3500);
    assert_eq!(settings.rules, "no outside food");
}

#[tokio::test]
async fn negative_fee_is_rejected_before_any_write() {
    let store = MemoryStore::new();

    let err = update_settings(&store, -1, "").await.unwrap_err();
    assert!(err.to_string().contains("monthly fee"));
    assert!(
        !store
            .exists::<mess_schemas::MessSettings>("settings")
            .await
            .unwrap()
    );
}
