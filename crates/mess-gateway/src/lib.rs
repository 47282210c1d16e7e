//! Payment gateway adapter and reconciliation.
//!
//! This crate is the trust boundary between the external payment gateway and
//! the ledger: remote order creation flows out through [`OrderGateway`], and
//! callbacks flow back in through [`reconcile::apply_callback`], which
//! refuses to touch the ledger until the callback's HMAC signature has been
//! recomputed and matched. Nothing mutates ledger state on a gateway's word
//! alone.

use mess_store::StoreError;

mod config;
mod order;
mod signature;

pub mod reconcile;

pub use config::{
    GatewayConfig, ENV_BASE_URL, ENV_CURRENCY, ENV_KEY_ID, ENV_KEY_SECRET, ENV_WEBHOOK_SECRET,
};
pub use order::{CreateOrderRequest, HttpOrderGateway, OrderGateway, UnconfiguredOrderGateway};
pub use signature::SignatureVerifier;

// ---------------------------------------------------------------------------
// GatewayError
// ---------------------------------------------------------------------------

/// Failure modes of the payment boundary.
///
/// `SignatureInvalid` carries a deliberately generic message: a forged or
/// corrupted callback learns nothing about what was checked.
#[derive(Debug)]
pub enum GatewayError {
    /// A required env var for the gateway is absent or empty. Named by the
    /// variable, never by its value.
    MissingConfig(&'static str),
    /// The remote gateway answered with a non-success status.
    Remote { status: u16, message: String },
    /// The remote gateway could not be reached or its response could not be
    /// read.
    Transport(anyhow::Error),
    SignatureInvalid,
    InvalidGuestDetails(&'static str),
    Store(StoreError),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::MissingConfig(var) => {
                write!(f, "missing gateway configuration: {var}")
            }
            GatewayError::Remote { status, message } => {
                write!(f, "payment gateway error: status={status} {message}")
            }
            GatewayError::Transport(err) => write!(f, "payment gateway unreachable: {err}"),
            GatewayError::SignatureInvalid => write!(f, "payment verification failed"),
            GatewayError::InvalidGuestDetails(msg) => write!(f, "{msg}"),
            GatewayError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Transport(err) => Some(err.as_ref()),
            GatewayError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        GatewayError::Store(err)
    }
}
