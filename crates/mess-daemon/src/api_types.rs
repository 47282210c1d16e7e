//! Request/response bodies and the uniform response envelope.
//!
//! Every endpoint answers `{success, data?, error?}`; failure pairs
//! `success:false` with a non-2xx status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use mess_schemas::{GuestPayment, MonthlyDue};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 200 envelope around `data`.
pub fn ok<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }),
    )
        .into_response()
}

/// Failure envelope with the category-appropriate status.
pub fn fail(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthData {
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// "approved" | "rejected"
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingsUpdateRequest {
    pub monthly_fee: i64,
    pub rules: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderBody {
    /// Minor units; must be > 0.
    pub amount: i64,
    /// Payer identity forwarded to the gateway order.
    pub payer: String,
    /// The local entity this order will settle (a due id, or a guest marker).
    pub entity_id: String,
}

/// Manager view: both collections in one round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct FinancialsData {
    pub dues: Vec<MonthlyDue>,
    pub guest_payments: Vec<GuestPayment>,
}
