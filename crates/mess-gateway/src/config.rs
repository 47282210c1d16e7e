//! Gateway configuration, resolved from the environment once at startup.
//!
//! Env vars carry the secrets; this struct is built in `main` and passed to
//! constructors; no `std::env::var` calls scattered across handlers.
//! `Debug` redacts both secrets, and error messages reference env var NAMES,
//! never values.

use secrecy::SecretString;

use crate::GatewayError;

pub const ENV_KEY_ID: &str = "MESS_GATEWAY_KEY_ID";
pub const ENV_KEY_SECRET: &str = "MESS_GATEWAY_KEY_SECRET";
pub const ENV_WEBHOOK_SECRET: &str = "MESS_GATEWAY_WEBHOOK_SECRET";
pub const ENV_BASE_URL: &str = "MESS_GATEWAY_BASE_URL";
pub const ENV_CURRENCY: &str = "MESS_GATEWAY_CURRENCY";

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";
const DEFAULT_CURRENCY: &str = "INR";

#[derive(Clone)]
pub struct GatewayConfig {
    /// API key id, sent as the basic-auth username.
    pub key_id: String,
    /// API key secret, sent as the basic-auth password.
    pub key_secret: SecretString,
    /// Shared secret for callback HMAC verification.
    pub webhook_secret: SecretString,
    pub base_url: String,
    pub currency: String,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<REDACTED>")
            .field("webhook_secret", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("currency", &self.currency)
            .finish()
    }
}

fn required(var: &'static str) -> Result<String, GatewayError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::MissingConfig(var)),
    }
}

impl GatewayConfig {
    /// Resolve the full gateway configuration, failing on the first missing
    /// required var. Base URL and currency have defaults.
    pub fn from_env() -> Result<Self, GatewayError> {
        Ok(Self {
            key_id: required(ENV_KEY_ID)?,
            key_secret: SecretString::from(required(ENV_KEY_SECRET)?),
            webhook_secret: SecretString::from(required(ENV_WEBHOOK_SECRET)?),
            base_url: std::env::var(ENV_BASE_URL)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            currency: std::env::var(ENV_CURRENCY)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let cfg = GatewayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from("super-secret"),
            webhook_secret: SecretString::from("hook-secret"),
            base_url: DEFAULT_BASE_URL.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        };
        let dbg = format!("{cfg:?}");
        assert!(dbg.contains("<REDACTED>"));
        assert!(!dbg.contains("super-secret"));
        assert!(!dbg.contains("hook-secret"));
    }
}
