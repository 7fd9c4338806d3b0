//! Authenticated session state and client-side JWT claim decoding. The token
//! is never verified here; the core only needs the subject for endpoint
//! paths and the expiry for the startup gate.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppError, ErrorKind};

/// Secure-storage key names, shared with the shells.
pub mod storage_keys {
    pub const JWT_TOKEN: &str = "jwt_token";
    pub const JWT_EXPIRY: &str = "jwt_expiry";
    pub const SHOPS: &str = "shops";
    pub const SELECTED_SHOP: &str = "selected_shop";
    pub const CANCELLED_ORDERS: &str = "cancelled_orders";
}

#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("token is not a three-part JWT")]
    MalformedToken,
    #[error("token payload is not valid base64: {0}")]
    PayloadNotBase64(String),
    #[error("token claims are not valid JSON: {0}")]
    ClaimsNotJson(String),
    #[error("token is missing the `{0}` claim")]
    MissingClaim(&'static str),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::new(ErrorKind::Authentication, "Received an invalid session token")
            .with_internal(e.to_string())
    }
}

/// Claims the client actually reads.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: Option<String>,
    pub exp: Option<i64>,
}

/// Decodes the payload segment of a JWT without verifying the signature.
pub fn decode_token_claims(token: &str) -> Result<TokenClaims, SessionError> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) if segments.next().is_none() => payload,
        _ => return Err(SessionError::MalformedToken),
    };

    // Some issuers pad; URL_SAFE_NO_PAD does not accept it.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SessionError::PayloadNotBase64(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| SessionError::ClaimsNotJson(e.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Subject claim; doubles as the `{username}` path segment.
    pub username: String,
    pub token: String,
    pub expiry_epoch_ms: u64,
}

impl Session {
    /// Builds a session from a freshly issued token.
    pub fn from_token(token: &str) -> Result<Self, SessionError> {
        let claims = decode_token_claims(token)?;
        let username = claims.sub.ok_or(SessionError::MissingClaim("sub"))?;
        let exp = claims.exp.ok_or(SessionError::MissingClaim("exp"))?;

        Ok(Self {
            username,
            token: token.to_string(),
            expiry_epoch_ms: u64::try_from(exp).unwrap_or(0).saturating_mul(1000),
        })
    }

    /// Rebuilds a session from persisted token + expiry, refusing expired
    /// ones. The stored expiry string wins over the claim so that resume
    /// does not re-decode.
    #[must_use]
    pub fn resume(token: &str, expiry_ms: &str, now_ms: u64) -> Option<Self> {
        let expiry: u64 = expiry_ms.trim().parse().ok()?;
        if expiry <= now_ms {
            return None;
        }
        let claims = decode_token_claims(token).ok()?;
        Some(Self {
            username: claims.sub?,
            token: token.to_string(),
            expiry_epoch_ms: expiry,
        })
    }

    #[must_use]
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expiry_epoch_ms <= now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds an unsigned JWT-shaped token with the given JSON claims.
    fn token_with_claims(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn decodes_subject_and_expiry() {
        let token = token_with_claims(r#"{"sub":"glassguy","exp":1893456000}"#);
        let session = Session::from_token(&token).unwrap();

        assert_eq!(session.username, "glassguy");
        assert_eq!(session.expiry_epoch_ms, 1_893_456_000_000);
    }

    #[test]
    fn rejects_tokens_without_three_segments() {
        assert!(matches!(
            decode_token_claims("not-a-jwt"),
            Err(SessionError::MalformedToken)
        ));
        assert!(matches!(
            decode_token_claims("a.b.c.d"),
            Err(SessionError::MalformedToken)
        ));
    }

    #[test]
    fn rejects_missing_claims() {
        let token = token_with_claims(r#"{"exp":1893456000}"#);
        assert!(matches!(
            Session::from_token(&token),
            Err(SessionError::MissingClaim("sub"))
        ));
    }

    #[test]
    fn tolerates_padded_payloads() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
        let payload = base64::engine::general_purpose::URL_SAFE
            .encode(br#"{"sub":"glassguy","exp":1}"#);
        let claims = decode_token_claims(&format!("{header}.{payload}.sig")).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("glassguy"));
    }

    mod resume {
        use super::*;

        #[test]
        fn future_expiry_restores_the_session() {
            let token = token_with_claims(r#"{"sub":"glassguy","exp":1}"#);
            let session = Session::resume(&token, "2000000000000", 1_700_000_000_000).unwrap();
            assert_eq!(session.username, "glassguy");
            assert_eq!(session.expiry_epoch_ms, 2_000_000_000_000);
        }

        #[test]
        fn past_expiry_yields_none() {
            let token = token_with_claims(r#"{"sub":"glassguy","exp":1}"#);
            assert!(Session::resume(&token, "1000", 1_700_000_000_000).is_none());
        }

        #[test]
        fn garbage_expiry_yields_none() {
            let token = token_with_claims(r#"{"sub":"glassguy","exp":1}"#);
            assert!(Session::resume(&token, "soon", 0).is_none());
        }
    }
}
