//! Store-contract scenarios against the in-memory backend.
//!
//! The contract under test is the one every backend must honor: atomic
//! put-if-absent create, patch-is-not-upsert, index/record consistency, and
//! insertion-ordered listing.

use std::sync::Arc;

use mess_schemas::{DueStatus, MonthlyDue, Role, Student, StudentStatus};
use mess_store::{EntityStoreExt, KeyedRecord, MemoryStore, StoreError};
use serde_json::json;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn student(id: &str) -> Student {
    Student {
        id: id.to_string(),
        name: "Test Student".to_string(),
        phone: "9000000000".to_string(),
        credential_hash: "deadbeef".to_string(),
        role: Role::Student,
        status: StudentStatus::Pending,
    }
}

fn due(student_id: &str, month: &str, amount: i64) -> MonthlyDue {
    MonthlyDue {
        id: format!("{student_id}:{month}"),
        student_id: student_id.to_string(),
        month: month.to_string(),
        amount,
        status: DueStatus::Due,
        carried_over_amount: None,
    }
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_rejects_duplicate_key_regardless_of_payload() {
    let store = MemoryStore::new();
    store.create(&student("alice@example.com")).await.unwrap();

    // Different payload, same key: must still be rejected.
    let mut other = student("alice@example.com");
    other.name = "Somebody Else".to_string();
    let err = store.create(&other).await.unwrap_err();

    assert!(
        matches!(err, StoreError::AlreadyExists { entity: "student", .. }),
        "expected AlreadyExists, got: {err}"
    );

    // The original record won.
    let stored: Student = store
        .get::<Student>("alice@example.com")
        .await
        .unwrap()
        .expect("record exists");
    assert_eq!(stored.name, "Test Student");
}

#[tokio::test]
async fn concurrent_creates_on_one_key_yield_exactly_one_winner() {
    let store = Arc::new(MemoryStore::new());

    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store.create(&due("alice", "2024-06", 3000)).await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(()) => winners += 1,
            Err(StoreError::AlreadyExists { .. }) => losers += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1, "exactly one create must win the race");
    assert_eq!(losers, 31);

    let all: Vec<MonthlyDue> = store.list::<MonthlyDue>().await.unwrap();
    assert_eq!(all.len(), 1, "the race must not duplicate the record");
}

#[tokio::test]
async fn entity_names_namespace_the_key_space() {
    let store = MemoryStore::new();

    // A student whose id happens to look like a composite due key must not
    // collide with an actual due under the same string.
    store.create(&student("alice:2024-06")).await.unwrap();
    store.create(&due("alice", "2024-06", 3000)).await.unwrap();

    assert!(store.exists::<Student>("alice:2024-06").await.unwrap());
    assert!(store.exists::<MonthlyDue>("alice:2024-06").await.unwrap());
}

// ---------------------------------------------------------------------------
// patch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn patch_merges_fields_and_preserves_the_rest() {
    let store = MemoryStore::new();
    store.create(&due("alice", "2024-06", 3000)).await.unwrap();

    let updated: MonthlyDue = store
        .patch::<MonthlyDue>("alice:2024-06", json!({"status": "paid"}))
        .await
        .unwrap();

    assert_eq!(updated.status, DueStatus::Paid);
    assert_eq!(updated.amount, 3000, "untouched fields survive the patch");
    assert_eq!(updated.student_id, "alice");
}

#[tokio::test]
async fn patch_is_not_an_upsert() {
    let store = MemoryStore::new();

    let err = store
        .patch::<MonthlyDue>("ghost:2024-06", json!({"status": "paid"}))
        .await
        .unwrap_err();

    assert!(
        matches!(err, StoreError::NotFound { .. }),
        "patch on a missing key must be NotFound, got: {err}"
    );
    assert!(
        !store.exists::<MonthlyDue>("ghost:2024-06").await.unwrap(),
        "patch must not have created the record"
    );
}

// ---------------------------------------------------------------------------
// delete / list / index consistency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_record_and_index_entry() {
    let store = MemoryStore::new();
    store.create(&student("a@example.com")).await.unwrap();
    store.create(&student("b@example.com")).await.unwrap();

    assert!(store.delete::<Student>("a@example.com").await.unwrap());
    assert!(
        !store.delete::<Student>("a@example.com").await.unwrap(),
        "second delete reports absent"
    );

    let keys = store.index_keys(Student::ENTITY).await;
    assert_eq!(keys, vec!["b@example.com".to_string()]);

    let listed: Vec<Student> = store.list::<Student>().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "b@example.com");
}

#[tokio::test]
async fn list_returns_insertion_order() {
    let store = MemoryStore::new();
    for id in ["c@example.com", "a@example.com", "b@example.com"] {
        store.create(&student(id)).await.unwrap();
    }

    let listed: Vec<Student> = store.list::<Student>().await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["c@example.com", "a@example.com", "b@example.com"]);
}

#[tokio::test]
async fn list_of_unknown_entity_is_empty() {
    let store = MemoryStore::new();
    let listed: Vec<Student> = store.list::<Student>().await.unwrap();
    assert!(listed.is_empty());
}
