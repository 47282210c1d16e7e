//! HMAC-SHA256 callback signature verification.
//!
//! The gateway signs `orderId|paymentId` with the shared webhook secret and
//! sends the hex digest alongside the callback. Verification recomputes the
//! digest and compares constant-time; the secret lives in a `SecretString`
//! so it cannot leak through `Debug` output.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::GatewayError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
}

impl SignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// The hex HMAC-SHA256 digest of `orderId|paymentId` under the shared
    /// secret. This is exactly what a well-behaved gateway sends.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        hex::encode(self.compute(order_id, payment_id))
    }

    /// Check a supplied signature byte-for-byte against the recomputed one.
    ///
    /// Any failure (non-hex input, wrong length, wrong digest) collapses
    /// into the same generic [`GatewayError::SignatureInvalid`].
    pub fn verify(
        &self,
        order_id: &str,
        payment_id: &str,
        supplied: &str,
    ) -> Result<(), GatewayError> {
        let Ok(supplied_bytes) = hex::decode(supplied) else {
            warn!("payment callback signature rejected");
            return Err(GatewayError::SignatureInvalid);
        };

        let expected = self.compute(order_id, payment_id);
        if expected.ct_eq(&supplied_bytes).into() {
            Ok(())
        } else {
            warn!("payment callback signature rejected");
            Err(GatewayError::SignatureInvalid)
        }
    }

    fn compute(&self, order_id: &str, payment_id: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts keys of any size");
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> SignatureVerifier {
        SignatureVerifier::new(SecretString::from("test-webhook-secret"))
    }

    #[test]
    fn correctly_computed_signature_is_accepted() {
        let v = verifier();
        let sig = v.sign("order_1", "pay_1");
        assert!(v.verify("order_1", "pay_1", &sig).is_ok());
    }

    #[test]
    fn signature_over_tampered_payment_id_is_rejected() {
        let v = verifier();
        let sig = v.sign("order_1", "pay_1");
        let err = v.verify("order_1", "pay_2", &sig).unwrap_err();
        assert!(matches!(err, GatewayError::SignatureInvalid));
    }

    #[test]
    fn signature_under_wrong_secret_is_rejected() {
        let forged = SignatureVerifier::new(SecretString::from("attacker-secret"))
            .sign("order_1", "pay_1");
        let err = verifier().verify("order_1", "pay_1", &forged).unwrap_err();
        assert!(matches!(err, GatewayError::SignatureInvalid));
    }

    #[test]
    fn non_hex_and_truncated_signatures_are_rejected() {
        let v = verifier();
        assert!(matches!(
            v.verify("order_1", "pay_1", "not-hex!!").unwrap_err(),
            GatewayError::SignatureInvalid
        ));
        let sig = v.sign("order_1", "pay_1");
        assert!(matches!(
            v.verify("order_1", "pay_1", &sig[..sig.len() - 2]).unwrap_err(),
            GatewayError::SignatureInvalid
        ));
    }

    #[test]
    fn rejection_message_stays_generic() {
        let v = verifier();
        let err = v.verify("order_1", "pay_1", "00ff").unwrap_err();
        assert_eq!(err.to_string(), "payment verification failed");
    }
}
