use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: u32 = 1;
const TOKEN_PREFIX: &str = "v1";
const DEFAULT_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub exp: i64,
    pub ver: u32,
}

/// Issues and verifies stateless session tokens.
///
/// Tokens have the format `v1.<base64url(claims)>.<base64url(mac)>` where the
/// MAC is HMAC-SHA256 over `v1.<base64url(claims)>` under a symmetric key.
/// Verification rejects tokens that are malformed, carry a bad signature or an
/// unknown version, or have expired.
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }

    /// Produces a signed token binding `user_id`, expiring after the TTL.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let claims = Claims {
            user_id,
            exp: Utc::now().timestamp() + self.ttl_secs,
            ver: TOKEN_VERSION,
        };

        let payload = serde_json::to_vec(&claims)
            .map_err(|e| Error::Config(format!("failed to encode claims: {e}")))?;
        let body = format!("{TOKEN_PREFIX}.{}", URL_SAFE_NO_PAD.encode(payload));
        let mac = self.sign(body.as_bytes())?;

        Ok(format!("{body}.{}", URL_SAFE_NO_PAD.encode(mac)))
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let (body, sig) = token.rsplit_once('.').ok_or(Error::InvalidToken)?;

        let (prefix, payload) = body.split_once('.').ok_or(Error::InvalidToken)?;
        if prefix != TOKEN_PREFIX {
            return Err(Error::InvalidToken);
        }

        let given = URL_SAFE_NO_PAD.decode(sig).map_err(|_| Error::InvalidToken)?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Config(format!("invalid signing key: {e}")))?;
        mac.update(body.as_bytes());
        if mac.verify_slice(&given).is_err() {
            return Err(Error::InvalidToken);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| Error::InvalidToken)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| Error::InvalidToken)?;

        if claims.ver != TOKEN_VERSION {
            return Err(Error::InvalidToken);
        }
        if claims.exp < Utc::now().timestamp() {
            return Err(Error::TokenExpired);
        }

        Ok(claims)
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| Error::Config(format!("invalid signing key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_round_trip() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue(42).unwrap();
        let claims = signer.verify(&token).unwrap();

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.ver, TOKEN_VERSION);
    }

    #[test]
    fn test_token_format() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue(1).unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "v1");
    }

    #[test]
    fn test_malformed_token_rejected() {
        let signer = TokenSigner::new("test-secret");

        assert!(matches!(signer.verify("garbage"), Err(Error::InvalidToken)));
        assert!(matches!(
            signer.verify("v1.only-two-parts"),
            Err(Error::InvalidToken)
        ));
        assert!(matches!(signer.verify(""), Err(Error::InvalidToken)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = TokenSigner::new("test-secret");
        let token = signer.issue(42).unwrap();

        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let forged = Claims {
            user_id: 99,
            exp: Utc::now().timestamp() + 3600,
            ver: TOKEN_VERSION,
        };
        parts[1] = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged).unwrap());

        let result = signer.verify(&parts.join("."));
        assert!(matches!(result, Err(Error::InvalidToken)));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = TokenSigner::new("key-a").issue(42).unwrap();
        let result = TokenSigner::new("key-b").verify(&token);
        assert!(matches!(result, Err(Error::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = TokenSigner::new("test-secret").with_ttl(-60);
        let token = signer.issue(42).unwrap();
        assert!(matches!(signer.verify(&token), Err(Error::TokenExpired)));
    }
}
