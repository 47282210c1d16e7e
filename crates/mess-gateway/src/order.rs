//! Remote order creation.
//!
//! [`OrderGateway`] is the adapter seam: the daemon talks to the trait, the
//! HTTP implementation talks to the gateway, and tests substitute stubs.
//! Order creation writes no local state: an order only matters once its
//! callback comes back through verification.

use anyhow::Context;
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use mess_schemas::PaymentOrder;

use crate::{GatewayConfig, GatewayError, ENV_KEY_ID};

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest {
    /// Minor units; callers validate > 0 before reaching the gateway.
    pub amount: i64,
    pub currency: String,
    /// Opaque correlation ref: the local entity id this order will settle.
    pub receipt: String,
    /// Payer identity, forwarded for the gateway's records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(&self, req: CreateOrderRequest) -> Result<PaymentOrder, GatewayError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct HttpOrderGateway {
    cfg: GatewayConfig,
    http: reqwest::Client,
}

impl HttpOrderGateway {
    pub fn new(cfg: GatewayConfig) -> Self {
        Self {
            cfg,
            http: reqwest::Client::new(),
        }
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct RemoteOrder {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    error: Option<RemoteErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct RemoteErrorDetail {
    description: Option<String>,
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    async fn create_order(&self, req: CreateOrderRequest) -> Result<PaymentOrder, GatewayError> {
        let resp = self
            .http
            .post(self.orders_url())
            .basic_auth(&self.cfg.key_id, Some(self.cfg.key_secret.expose_secret()))
            .json(&req)
            .send()
            .await
            .context("order create request failed")
            .map_err(GatewayError::Transport)?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("order create response read failed")
            .map_err(GatewayError::Transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<RemoteErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| "unknown".to_string());
            return Err(GatewayError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let order: RemoteOrder = serde_json::from_str(&body)
            .context("order create response decode failed")
            .map_err(GatewayError::Transport)?;

        Ok(PaymentOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}

// ---------------------------------------------------------------------------
// Unconfigured fallback
// ---------------------------------------------------------------------------

/// Stands in when the gateway env vars are absent: every order attempt fails
/// with `MissingConfig` and nothing else happens. The daemon boots with this
/// rather than refusing to start, so the read-only surface stays available.
pub struct UnconfiguredOrderGateway;

#[async_trait]
impl OrderGateway for UnconfiguredOrderGateway {
    async fn create_order(&self, _req: CreateOrderRequest) -> Result<PaymentOrder, GatewayError> {
        Err(GatewayError::MissingConfig(ENV_KEY_ID))
    }
}
