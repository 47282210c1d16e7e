//! Axum router and all HTTP handlers for mess-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

use mess_gateway::reconcile::{apply_callback, PaymentCallback};
use mess_gateway::{CreateOrderRequest, GatewayError, ENV_WEBHOOK_SECRET};
use mess_ledger::LedgerError;
use mess_schemas::{Month, StudentStatus};
use mess_store::StoreError;

use crate::api_types::{
    fail, ok, CreateOrderBody, FinancialsData, HealthData, SettingsUpdateRequest,
    StatusUpdateRequest,
};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/students", get(students_list))
        .route("/v1/students/:id", get(student_get))
        .route("/v1/students/:id/status", post(student_set_status))
        .route("/v1/students/:id/dues", get(student_dues))
        .route("/v1/financials", get(financials))
        .route("/v1/dues/:id/settle", post(due_settle))
        .route("/v1/settings", get(settings_get).put(settings_put))
        .route("/v1/payments/order", post(payment_order))
        .route("/v1/payments/verify", post(payment_verify))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error → envelope mapping
// ---------------------------------------------------------------------------

fn store_error(err: StoreError) -> Response {
    match &err {
        StoreError::NotFound { .. } => fail(StatusCode::NOT_FOUND, err.to_string()),
        StoreError::AlreadyExists { .. } => fail(StatusCode::CONFLICT, err.to_string()),
        StoreError::Backend(_) => fail(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn ledger_error(err: LedgerError) -> Response {
    match err {
        LedgerError::Store(inner) => store_error(inner),
        LedgerError::InvalidStatusTransition { .. } | LedgerError::Validation(_) => {
            fail(StatusCode::BAD_REQUEST, err.to_string())
        }
    }
}

fn gateway_error(err: GatewayError) -> Response {
    match err {
        GatewayError::SignatureInvalid => fail(StatusCode::UNAUTHORIZED, err.to_string()),
        GatewayError::InvalidGuestDetails(_) => fail(StatusCode::BAD_REQUEST, err.to_string()),
        GatewayError::Store(inner) => store_error(inner),
        GatewayError::MissingConfig(_)
        | GatewayError::Remote { .. }
        | GatewayError::Transport(_) => fail(StatusCode::BAD_GATEWAY, err.to_string()),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> Response {
    ok(HealthData {
        service: st.build.service,
        version: st.build.version,
    })
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

pub(crate) async fn students_list(State(st): State<Arc<AppState>>) -> Response {
    match mess_ledger::list_students(st.store.as_ref()).await {
        Ok(students) => ok(students),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn student_get(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match mess_ledger::get_student(st.store.as_ref(), &id).await {
        Ok(Some(student)) => ok(student),
        Ok(None) => fail(StatusCode::NOT_FOUND, format!("student '{id}' not found")),
        Err(err) => store_error(err),
    }
}

/// Apply the one-way approval transition. Approval seeds the current month's
/// due before the response goes out.
pub(crate) async fn student_set_status(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdateRequest>,
) -> Response {
    let Ok(status) = StudentStatus::parse(&body.status) else {
        return fail(
            StatusCode::BAD_REQUEST,
            format!("invalid status '{}'", body.status),
        );
    };

    let month = Month::containing(Utc::now());
    match mess_ledger::set_student_status(st.store.as_ref(), &id, status, month).await {
        Ok(student) => {
            info!(student_id = %id, status = status.as_str(), "status updated");
            ok(student)
        }
        Err(err) => ledger_error(err),
    }
}

/// Dues for one student. The first query in a new month creates that month's
/// due (approved students only); seeding is lazy, not scheduled.
pub(crate) async fn student_dues(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let student = match mess_ledger::get_student(st.store.as_ref(), &id).await {
        Ok(Some(student)) => student,
        Ok(None) => return fail(StatusCode::NOT_FOUND, format!("student '{id}' not found")),
        Err(err) => return store_error(err),
    };

    let month = Month::containing(Utc::now());
    match mess_ledger::ensure_and_list_dues(st.store.as_ref(), &student, month).await {
        Ok(dues) => ok(dues),
        Err(err) => store_error(err),
    }
}

// ---------------------------------------------------------------------------
// GET /v1/financials
// ---------------------------------------------------------------------------

/// Manager view. The two listings are independent reads, so they are issued
/// concurrently.
pub(crate) async fn financials(State(st): State<Arc<AppState>>) -> Response {
    let (dues, guest_payments) = tokio::join!(
        mess_ledger::all_dues(st.store.as_ref()),
        mess_ledger::all_guest_payments(st.store.as_ref()),
    );

    match (dues, guest_payments) {
        (Ok(dues), Ok(guest_payments)) => ok(FinancialsData {
            dues,
            guest_payments,
        }),
        (Err(err), _) | (_, Err(err)) => store_error(err),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/dues/:id/settle
// ---------------------------------------------------------------------------

/// Manager override: settle a due without the gateway.
pub(crate) async fn due_settle(
    State(st): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match mess_ledger::mark_due_paid(st.store.as_ref(), &id).await {
        Ok(due) => ok(due),
        Err(err) => store_error(err),
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

pub(crate) async fn settings_get(State(st): State<Arc<AppState>>) -> Response {
    match mess_ledger::fetch_settings(st.store.as_ref()).await {
        Ok(settings) => ok(settings),
        Err(err) => store_error(err),
    }
}

pub(crate) async fn settings_put(
    State(st): State<Arc<AppState>>,
    Json(body): Json<SettingsUpdateRequest>,
) -> Response {
    match mess_ledger::update_settings(st.store.as_ref(), body.monthly_fee, &body.rules).await {
        Ok(settings) => ok(settings),
        Err(err) => ledger_error(err),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/payments/order
// ---------------------------------------------------------------------------

/// Create a remote gateway order. Validation happens before any I/O; no
/// local state is written on any path through here.
pub(crate) async fn payment_order(
    State(st): State<Arc<AppState>>,
    Json(body): Json<CreateOrderBody>,
) -> Response {
    if body.amount <= 0 {
        return fail(StatusCode::BAD_REQUEST, "amount must be > 0");
    }
    if body.entity_id.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "entity_id must not be empty");
    }
    if body.payer.trim().is_empty() {
        return fail(StatusCode::BAD_REQUEST, "payer must not be empty");
    }

    let req = CreateOrderRequest {
        amount: body.amount,
        currency: st.currency.clone(),
        receipt: body.entity_id,
        payer: Some(body.payer),
    };
    match st.orders.create_order(req).await {
        Ok(order) => ok(order),
        Err(err) => gateway_error(err),
    }
}

// ---------------------------------------------------------------------------
// POST /v1/payments/verify
// ---------------------------------------------------------------------------

/// Gateway callback: verify the signature, then settle the referenced due or
/// append the guest payment.
pub(crate) async fn payment_verify(
    State(st): State<Arc<AppState>>,
    Json(callback): Json<PaymentCallback>,
) -> Response {
    let Some(verifier) = st.verifier.as_ref() else {
        return gateway_error(GatewayError::MissingConfig(ENV_WEBHOOK_SECRET));
    };

    match apply_callback(st.store.as_ref(), verifier, &callback, Utc::now()).await {
        Ok(outcome) => ok(outcome),
        Err(err) => gateway_error(err),
    }
}
