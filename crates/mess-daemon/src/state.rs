//! Shared runtime state for mess-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. All persistent state
//! lives behind the entity store; the daemon itself keeps nothing mutable,
//! so handlers stay stateless and request-scoped.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use mess_gateway::{
    GatewayConfig, HttpOrderGateway, OrderGateway, SignatureVerifier, UnconfiguredOrderGateway,
};
use mess_store::EntityStore;

/// Static build metadata included in health responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    /// Absent when the webhook secret is not configured; verification then
    /// fails closed with a configuration error.
    pub verifier: Option<SignatureVerifier>,
    pub orders: Arc<dyn OrderGateway>,
    /// Currency for new gateway orders.
    pub currency: String,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EntityStore>,
        verifier: Option<SignatureVerifier>,
        orders: Arc<dyn OrderGateway>,
        currency: String,
    ) -> Self {
        Self {
            store,
            verifier,
            orders,
            currency,
            build: BuildInfo {
                service: "mess-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }

    /// Wire the payment boundary from an optional gateway config: configured
    /// → HTTP gateway + verifier; not configured → every order and every
    /// verification fails closed, but the rest of the surface still serves.
    pub fn with_gateway(store: Arc<dyn EntityStore>, cfg: Option<GatewayConfig>) -> Self {
        match cfg {
            Some(cfg) => {
                let verifier = SignatureVerifier::new(cfg.webhook_secret.clone());
                let currency = cfg.currency.clone();
                Self::new(
                    store,
                    Some(verifier),
                    Arc::new(HttpOrderGateway::new(cfg)),
                    currency,
                )
            }
            None => Self::new(
                store,
                None,
                Arc::new(UnconfiguredOrderGateway),
                "INR".to_string(),
            ),
        }
    }
}
