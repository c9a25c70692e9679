//! `rentaldesk-auth`: identity, token and ownership boundary.
//!
//! This crate is intentionally decoupled from HTTP: the API crate extracts
//! bearer tokens and hands them to the [`TokenCodec`].

pub mod authorize;
pub mod claims;
pub mod credentials;
pub mod roles;
pub mod user;

pub use authorize::{authorize, AllowReason, Decision, Operation};
pub use claims::{IdentityClaim, TokenCodec, TokenError, TOKEN_TTL_SECONDS};
pub use credentials::{AuthSession, CredentialError, CredentialStore, PasswordPolicy, ProfileUpdate};
pub use roles::Role;
pub use user::{PublicUser, UserRecord};
