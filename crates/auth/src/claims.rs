use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rentaldesk_core::UserId;

use crate::Role;

/// Lifetime of every issued token (7 days).
pub const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Identity claim embedded in an access token.
///
/// Claims are stateless: nothing is stored server-side, so a claim stays valid
/// until `expires_at` or until the signing secret changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    /// Subject / user identifier.
    pub subject_id: UserId,

    pub email: String,

    pub role: Role,

    /// Issued-at timestamp (whole seconds).
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp, always `issued_at + TOKEN_TTL_SECONDS`.
    pub expires_at: DateTime<Utc>,
}

impl IdentityClaim {
    /// Build a claim issued at `issued_at`.
    ///
    /// Timestamps are truncated to whole seconds because that is the precision
    /// the token carries.
    pub fn new(subject_id: UserId, email: impl Into<String>, role: Role, issued_at: DateTime<Utc>) -> Self {
        let issued_at = issued_at.trunc_subsecs(0);
        Self {
            subject_id,
            email: email.into(),
            role,
            issued_at,
            expires_at: issued_at + Duration::seconds(TOKEN_TTL_SECONDS),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token could not be encoded: {0}")]
    Encoding(String),
}

/// On-the-wire JWT payload.
///
/// `iat` is optional on input: tokens minted without it are treated as issued
/// one full lifetime before `exp`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    user_id: String,
    email: String,
    role: Role,
    #[serde(default)]
    iat: Option<i64>,
    exp: i64,
}

impl From<&IdentityClaim> for WireClaims {
    fn from(claim: &IdentityClaim) -> Self {
        Self {
            user_id: claim.subject_id.to_string(),
            email: claim.email.clone(),
            role: claim.role,
            iat: Some(claim.issued_at.timestamp()),
            exp: claim.expires_at.timestamp(),
        }
    }
}

impl TryFrom<WireClaims> for IdentityClaim {
    type Error = TokenError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let iat = wire.iat.unwrap_or_else(|| wire.exp.saturating_sub(TOKEN_TTL_SECONDS));
        let issued_at = DateTime::from_timestamp(iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(wire.exp, 0).ok_or(TokenError::Malformed)?;
        if wire.user_id.trim().is_empty() || expires_at <= issued_at {
            return Err(TokenError::Malformed);
        }

        Ok(Self {
            subject_id: UserId::new(wire.user_id),
            email: wire.email,
            role: wire.role,
            issued_at,
            expires_at,
        })
    }
}

/// HS256 signer/verifier for identity claims.
///
/// Built once at startup from the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec").field("algorithm", &"HS256").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against the caller's clock.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign `claim` into a compact JWT.
    pub fn issue(&self, claim: &IdentityClaim) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &WireClaims::from(claim), &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<IdentityClaim, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify signature, shape and expiry of `token` as of `now`.
    ///
    /// The signature is checked before expiry, so a forged token never reports
    /// `Expired`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaim, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        let claim = IdentityClaim::try_from(data.claims)?;
        if claim.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(claim)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim_at(now: DateTime<Utc>) -> IdentityClaim {
        IdentityClaim::new(UserId::new("1"), "admin@rentaldesk.dev", Role::Owner, now)
    }

    #[test]
    fn issued_token_verifies_back_to_the_same_claim() {
        let codec = TokenCodec::new(b"test-secret");
        let claim = claim_at(Utc::now());

        let token = codec.issue(&claim).unwrap();
        let verified = codec.verify(&token).unwrap();

        assert_eq!(verified, claim);
    }

    #[test]
    fn expiry_is_exactly_seven_days_after_issuance() {
        let claim = claim_at(Utc::now());
        assert_eq!((claim.expires_at - claim.issued_at).num_seconds(), 604_800);
    }

    #[test]
    fn token_past_its_expiry_is_rejected() {
        let codec = TokenCodec::new(b"test-secret");
        let issued = Utc::now() - Duration::days(8);
        let token = codec.issue(&claim_at(issued)).unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_is_still_valid_at_the_exact_expiry_instant() {
        let codec = TokenCodec::new(b"test-secret");
        let claim = claim_at(Utc::now());
        let token = codec.issue(&claim).unwrap();

        assert!(codec.verify_at(&token, claim.expires_at).is_ok());
        assert_eq!(
            codec.verify_at(&token, claim.expires_at + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let ours = TokenCodec::new(b"test-secret");
        let theirs = TokenCodec::new(b"someone-else");
        let token = theirs.issue(&claim_at(Utc::now())).unwrap();

        assert_eq!(ours.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn forged_and_expired_token_reports_the_signature_first() {
        let ours = TokenCodec::new(b"test-secret");
        let theirs = TokenCodec::new(b"someone-else");
        let token = theirs.issue(&claim_at(Utc::now() - Duration::days(30))).unwrap();

        assert_eq!(ours.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn swapped_payload_fails_signature_check() {
        let codec = TokenCodec::new(b"test-secret");
        let owner = codec.issue(&claim_at(Utc::now())).unwrap();
        let admin = codec
            .issue(&IdentityClaim::new(UserId::new("9"), "x@y.z", Role::Admin, Utc::now()))
            .unwrap();

        let owner_parts: Vec<&str> = owner.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", owner_parts[0], admin_parts[1], owner_parts[2]);

        assert_eq!(codec.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn token_without_issued_at_takes_it_from_expiry() {
        let secret = b"test-secret";
        let codec = TokenCodec::new(secret);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let payload = serde_json::json!({
            "userId": "1",
            "email": "admin@rentaldesk.dev",
            "role": "OWNER",
            "exp": exp,
        });
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &EncodingKey::from_secret(secret))
            .unwrap();

        let claim = codec.verify(&token).unwrap();
        assert_eq!(claim.subject_id.as_str(), "1");
        assert_eq!(claim.expires_at.timestamp(), exp);
        assert_eq!(claim.issued_at.timestamp(), exp - TOKEN_TTL_SECONDS);
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = TokenCodec::new(b"test-secret");
        assert_eq!(codec.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(codec.verify(""), Err(TokenError::Malformed));
    }
}
