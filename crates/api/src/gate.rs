//! Request gate: bearer-token extraction and verification.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use thiserror::Error;

use rentaldesk_auth::{IdentityClaim, TokenCodec, TokenError};

/// Why a request carrying (or lacking) a bearer token was turned away.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    #[error("access token not provided")]
    NoToken,

    #[error("access token expired")]
    TokenExpired,

    #[error("invalid access token")]
    InvalidToken,
}

impl GateRejection {
    pub fn code(&self) -> &'static str {
        match self {
            GateRejection::NoToken => "NO_TOKEN",
            GateRejection::TokenExpired => "TOKEN_EXPIRED",
            GateRejection::InvalidToken => "INVALID_TOKEN",
        }
    }
}

impl From<TokenError> for GateRejection {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => GateRejection::TokenExpired,
            TokenError::Malformed | TokenError::InvalidSignature | TokenError::Encoding(_) => {
                GateRejection::InvalidToken
            }
        }
    }
}

/// Verified claim, or `None` for a missing or unusable token. Never fails.
pub fn extract_claim(headers: &HeaderMap, codec: &TokenCodec) -> Option<IdentityClaim> {
    require_claim(headers, codec).ok()
}

/// Verified claim, or the precise reason there is none.
pub fn require_claim(headers: &HeaderMap, codec: &TokenCodec) -> Result<IdentityClaim, GateRejection> {
    let token = extract_bearer(headers)?;
    codec.verify(token).map_err(|err| {
        let rejection = GateRejection::from(err);
        tracing::warn!(code = rejection.code(), "bearer token rejected");
        rejection
    })
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, GateRejection> {
    let header = headers.get(AUTHORIZATION).ok_or(GateRejection::NoToken)?;

    let header = header.to_str().map_err(|_| GateRejection::NoToken)?;

    // Case-sensitive, single space.
    let token = header.strip_prefix("Bearer ").ok_or(GateRejection::NoToken)?;

    let token = token.trim();
    if token.is_empty() {
        return Err(GateRejection::InvalidToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    use rentaldesk_auth::Role;
    use rentaldesk_core::UserId;

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"gate-test-secret")
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token(codec: &TokenCodec, issued_at: chrono::DateTime<Utc>) -> String {
        let claim = IdentityClaim::new(UserId::new("1"), "a@b.c", Role::Owner, issued_at);
        codec.issue(&claim).unwrap()
    }

    #[test]
    fn valid_bearer_yields_claim() {
        let codec = codec();
        let claim = require_claim(&headers(&format!("Bearer {}", token(&codec, Utc::now()))), &codec).unwrap();
        assert_eq!(claim.subject_id.as_str(), "1");
        assert_eq!(claim.role, Role::Owner);
    }

    #[test]
    fn missing_header_or_wrong_scheme_is_no_token() {
        let codec = codec();
        let t = token(&codec, Utc::now());

        assert_eq!(require_claim(&HeaderMap::new(), &codec).unwrap_err(), GateRejection::NoToken);
        assert_eq!(require_claim(&headers(&format!("bearer {t}")), &codec).unwrap_err(), GateRejection::NoToken);
        assert_eq!(require_claim(&headers(&format!("Token {t}")), &codec).unwrap_err(), GateRejection::NoToken);
        assert_eq!(require_claim(&headers(&t), &codec).unwrap_err(), GateRejection::NoToken);
    }

    #[test]
    fn expired_and_foreign_tokens_are_distinguished() {
        let codec = codec();
        let stale = token(&codec, Utc::now() - Duration::days(8));
        let foreign = token(&TokenCodec::new(b"someone-else"), Utc::now());

        assert_eq!(
            require_claim(&headers(&format!("Bearer {stale}")), &codec).unwrap_err(),
            GateRejection::TokenExpired
        );
        assert_eq!(
            require_claim(&headers(&format!("Bearer {foreign}")), &codec).unwrap_err(),
            GateRejection::InvalidToken
        );
        assert_eq!(
            require_claim(&headers("Bearer not.a.jwt"), &codec).unwrap_err(),
            GateRejection::InvalidToken
        );
    }

    #[test]
    fn extract_claim_never_fails() {
        let codec = codec();
        assert!(extract_claim(&HeaderMap::new(), &codec).is_none());
        assert!(extract_claim(&headers("Bearer garbage"), &codec).is_none());
        assert!(extract_claim(&headers(&format!("Bearer {}", token(&codec, Utc::now()))), &codec).is_some());
    }
}
