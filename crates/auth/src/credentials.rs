//! In-memory credential store.
//!
//! Users are keyed by normalized email. Registration is the only path that
//! persists a user; demo logins for unknown emails hand out an ephemeral
//! identity that is never stored.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use rentaldesk_core::{id::sequence_number, UserId};

use crate::user::{hash_password, normalize_email, verify_password};
use crate::{IdentityClaim, PublicUser, Role, UserRecord};

/// How `login` treats passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordPolicy {
    /// Demo behavior: any password is accepted for a known email and unknown
    /// emails receive an ephemeral TENANT identity.
    #[default]
    AcceptAny,
    /// Strict behavior: the email must exist and the password must match.
    Verify,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("email and password are required")]
    MissingCredentials,

    #[error("all fields are required")]
    MissingFields,

    #[error("email is already registered")]
    EmailExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("user not found")]
    UserNotFound,

    #[error("current password is incorrect")]
    InvalidCurrentPassword,

    #[error("field {0} must not be blank")]
    BlankField(&'static str),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Editable profile fields; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub claim: IdentityClaim,
    pub user: PublicUser,
}

#[derive(Debug, Default)]
struct UserTable {
    by_email: HashMap<String, UserRecord>,
    last_id: u64,
}

#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: RwLock<UserTable>,
    policy: PasswordPolicy,
}

impl CredentialStore {
    pub fn new(policy: PasswordPolicy) -> Self {
        Self {
            inner: RwLock::new(UserTable::default()),
            policy,
        }
    }

    /// Insert a pre-built record (demo seed). Existing emails are replaced.
    pub fn seed(&self, mut record: UserRecord) {
        record.email = normalize_email(&record.email);
        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(n) = sequence_number(record.id.as_str()) {
            table.last_id = table.last_id.max(n);
        }
        table.by_email.insert(record.email.clone(), record);
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthSession, CredentialError> {
        self.login_at(email, password, Utc::now())
    }

    pub fn login_at(&self, email: &str, password: &str, now: DateTime<Utc>) -> Result<AuthSession, CredentialError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(CredentialError::MissingCredentials);
        }

        let existing = {
            let table = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            table.by_email.get(&email).cloned()
        };

        let user = match (existing, self.policy) {
            (Some(record), PasswordPolicy::AcceptAny) => {
                if !record.password_matches(password) {
                    tracing::debug!(user_id = %record.id, "password mismatch accepted (demo login)");
                }
                record.public_view()
            }
            (Some(record), PasswordPolicy::Verify) => {
                if !record.password_matches(password) {
                    return Err(CredentialError::InvalidCredentials);
                }
                record.public_view()
            }
            (None, PasswordPolicy::AcceptAny) => demo_user(&email, now),
            (None, PasswordPolicy::Verify) => return Err(CredentialError::InvalidCredentials),
        };

        let claim = IdentityClaim::new(user.id.clone(), user.email.clone(), user.role, now);
        Ok(AuthSession { claim, user })
    }

    pub fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthSession, CredentialError> {
        self.register_at(email, password, first_name, last_name, Utc::now())
    }

    pub fn register_at(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthSession, CredentialError> {
        let email = normalize_email(email);
        let first_name = first_name.trim();
        let last_name = last_name.trim();
        if email.is_empty() || password.is_empty() || first_name.is_empty() || last_name.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        // Hash outside the guard; the check-and-insert below is atomic.
        let password_hash = hash_password(password)?;

        let record = {
            let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if table.by_email.contains_key(&email) {
                return Err(CredentialError::EmailExists);
            }

            table.last_id += 1;
            let record = UserRecord {
                id: UserId::from_sequence(table.last_id),
                email: email.clone(),
                password_hash,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                role: Role::Tenant,
                is_active: true,
                email_verified: false,
                created_at: now,
            };
            table.by_email.insert(email, record.clone());
            record
        };

        tracing::info!(user_id = %record.id, "user registered");

        let user = record.public_view();
        let claim = IdentityClaim::new(user.id.clone(), user.email.clone(), user.role, now);
        Ok(AuthSession { claim, user })
    }

    /// Apply `update` to the account stored under `email`.
    ///
    /// Names are trimmed; a provided but blank name is rejected and nothing
    /// is written.
    pub fn update_profile(&self, email: &str, update: ProfileUpdate) -> Result<PublicUser, CredentialError> {
        let first_name = trimmed_name(update.first_name, "firstName")?;
        let last_name = trimmed_name(update.last_name, "lastName")?;

        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let record = table
            .by_email
            .get_mut(&normalize_email(email))
            .ok_or(CredentialError::UserNotFound)?;

        if let Some(first_name) = first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            record.last_name = last_name;
        }

        tracing::info!(user_id = %record.id, "profile updated");
        Ok(record.public_view())
    }

    /// Replace the password of the account stored under `email`.
    ///
    /// The current password is always verified, whatever the login policy.
    pub fn change_password(&self, email: &str, current: &str, new: &str) -> Result<(), CredentialError> {
        if current.is_empty() || new.is_empty() {
            return Err(CredentialError::MissingFields);
        }

        let email = normalize_email(email);
        let old_hash = {
            let table = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            table
                .by_email
                .get(&email)
                .map(|record| record.password_hash.clone())
                .ok_or(CredentialError::UserNotFound)?
        };

        // Hashing is slow; do it outside the guard and swap only if the hash
        // we verified against is still the stored one.
        if !verify_password(current, &old_hash) {
            return Err(CredentialError::InvalidCurrentPassword);
        }
        let new_hash = hash_password(new)?;

        let mut table = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let record = table.by_email.get_mut(&email).ok_or(CredentialError::UserNotFound)?;
        if record.password_hash != old_hash {
            return Err(CredentialError::InvalidCurrentPassword);
        }
        record.password_hash = new_hash;

        tracing::info!(user_id = %record.id, "password changed");
        Ok(())
    }

    pub fn find_by_email(&self, email: &str) -> Option<PublicUser> {
        let table = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        table.by_email.get(&normalize_email(email)).map(UserRecord::public_view)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).by_email.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn trimmed_name(value: Option<String>, field: &'static str) -> Result<Option<String>, CredentialError> {
    match value {
        None => Ok(None),
        Some(name) => {
            let name = name.trim();
            if name.is_empty() {
                return Err(CredentialError::BlankField(field));
            }
            Ok(Some(name.to_string()))
        }
    }
}

/// Ephemeral identity for an unknown email under the demo policy.
///
/// The id lives outside the numeric sequence so it can never collide with a
/// registered user (and therefore never owns their properties).
fn demo_user(email: &str, now: DateTime<Utc>) -> PublicUser {
    PublicUser {
        id: UserId::new(format!("demo-{}", Uuid::now_v7())),
        email: email.to_string(),
        first_name: "Demo".to_string(),
        last_name: "User".to_string(),
        role: Role::Tenant,
        is_active: true,
        email_verified: true,
        created_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(policy: PasswordPolicy) -> CredentialStore {
        let store = CredentialStore::new(policy);
        store.seed(UserRecord {
            id: UserId::new("1"),
            email: "Admin@RentalDesk.dev".to_string(),
            password_hash: hash_password("123456").unwrap(),
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            role: Role::Owner,
            is_active: true,
            email_verified: true,
            created_at: Utc::now(),
        });
        store
    }

    #[test]
    fn register_then_login_yields_the_same_subject() {
        let store = CredentialStore::default();
        let registered = store.register("new@example.com", "pw", "New", "Person").unwrap();
        let logged_in = store.login("  NEW@example.com ", "pw").unwrap();

        assert_eq!(registered.claim.subject_id, logged_in.claim.subject_id);
        assert_eq!(registered.user.role, Role::Tenant);
        assert!(!registered.user.email_verified);
    }

    #[test]
    fn second_registration_of_same_email_conflicts() {
        let store = CredentialStore::default();
        store.register("dup@example.com", "pw", "A", "B").unwrap();
        let err = store.register("DUP@example.com", "other", "C", "D").unwrap_err();

        assert_eq!(err, CredentialError::EmailExists);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn register_requires_every_field() {
        let store = CredentialStore::default();
        assert_eq!(store.register("", "pw", "A", "B").unwrap_err(), CredentialError::MissingFields);
        assert_eq!(store.register("a@b.c", "", "A", "B").unwrap_err(), CredentialError::MissingFields);
        assert_eq!(store.register("a@b.c", "pw", " ", "B").unwrap_err(), CredentialError::MissingFields);
        assert_eq!(store.register("a@b.c", "pw", "A", "").unwrap_err(), CredentialError::MissingFields);
        assert!(store.is_empty());
    }

    #[test]
    fn registered_ids_continue_after_seeded_ones() {
        let store = seeded(PasswordPolicy::AcceptAny);
        let session = store.register("second@example.com", "pw", "A", "B").unwrap();
        assert_eq!(session.user.id.as_str(), "2");
    }

    #[test]
    fn demo_login_accepts_any_password_for_known_email() {
        let store = seeded(PasswordPolicy::AcceptAny);
        let session = store.login("admin@rentaldesk.dev", "wrong").unwrap();

        assert_eq!(session.user.id.as_str(), "1");
        assert_eq!(session.claim.role, Role::Owner);
    }

    #[test]
    fn demo_login_for_unknown_email_is_not_persisted() {
        let store = seeded(PasswordPolicy::AcceptAny);
        let session = store.login("stranger@example.com", "pw").unwrap();

        assert_eq!(session.user.role, Role::Tenant);
        assert_eq!(session.user.first_name, "Demo");
        assert!(session.user.id.as_str().starts_with("demo-"));
        assert_eq!(store.len(), 1);
        assert!(store.find_by_email("stranger@example.com").is_none());
    }

    #[test]
    fn strict_policy_checks_passwords() {
        let store = seeded(PasswordPolicy::Verify);
        assert!(store.login("admin@rentaldesk.dev", "123456").is_ok());
        assert_eq!(
            store.login("admin@rentaldesk.dev", "wrong").unwrap_err(),
            CredentialError::InvalidCredentials
        );
        assert_eq!(
            store.login("stranger@example.com", "pw").unwrap_err(),
            CredentialError::InvalidCredentials
        );
    }

    #[test]
    fn login_requires_email_and_password() {
        let store = CredentialStore::default();
        assert_eq!(store.login("  ", "pw").unwrap_err(), CredentialError::MissingCredentials);
        assert_eq!(store.login("a@b.c", "").unwrap_err(), CredentialError::MissingCredentials);
    }

    #[test]
    fn registered_password_is_stored_salted() {
        let store = CredentialStore::new(PasswordPolicy::Verify);
        store.register("salted@example.com", "pw", "A", "B").unwrap();

        let table = store.inner.read().unwrap();
        let record = &table.by_email["salted@example.com"];
        assert_ne!(record.password_hash, "pw");
        assert!(record.password_hash.starts_with("$argon2"));
    }

    #[test]
    fn profile_update_touches_only_provided_names() {
        let store = seeded(PasswordPolicy::AcceptAny);
        let update = ProfileUpdate {
            first_name: Some("  Joana ".to_string()),
            last_name: None,
        };

        let user = store.update_profile("ADMIN@rentaldesk.dev", update).unwrap();
        assert_eq!(user.first_name, "Joana");
        assert_eq!(user.last_name, "Lima");
        assert_eq!(store.find_by_email("admin@rentaldesk.dev").unwrap().first_name, "Joana");
    }

    #[test]
    fn blank_profile_name_is_rejected_without_writing() {
        let store = seeded(PasswordPolicy::AcceptAny);
        let update = ProfileUpdate {
            first_name: Some("Joana".to_string()),
            last_name: Some("   ".to_string()),
        };

        assert_eq!(
            store.update_profile("admin@rentaldesk.dev", update).unwrap_err(),
            CredentialError::BlankField("lastName")
        );
        assert_eq!(store.find_by_email("admin@rentaldesk.dev").unwrap().first_name, "Ana");
    }

    #[test]
    fn profile_update_for_unknown_email_is_not_found() {
        let store = seeded(PasswordPolicy::AcceptAny);
        assert_eq!(
            store.update_profile("stranger@example.com", ProfileUpdate::default()).unwrap_err(),
            CredentialError::UserNotFound
        );
    }

    #[test]
    fn changed_password_is_enforced_by_strict_login() {
        let store = seeded(PasswordPolicy::Verify);
        store
            .change_password("admin@rentaldesk.dev", "123456", "n3w-Secret!")
            .unwrap();

        assert_eq!(
            store.login("admin@rentaldesk.dev", "123456").unwrap_err(),
            CredentialError::InvalidCredentials
        );
        assert!(store.login("admin@rentaldesk.dev", "n3w-Secret!").is_ok());
    }

    #[test]
    fn change_password_checks_the_current_password() {
        let store = seeded(PasswordPolicy::AcceptAny);
        assert_eq!(
            store.change_password("admin@rentaldesk.dev", "wrong", "long-enough").unwrap_err(),
            CredentialError::InvalidCurrentPassword
        );
        assert_eq!(
            store.change_password("admin@rentaldesk.dev", "", "long-enough").unwrap_err(),
            CredentialError::MissingFields
        );
        assert_eq!(
            store.change_password("stranger@example.com", "123456", "long-enough").unwrap_err(),
            CredentialError::UserNotFound
        );
        let table = store.inner.read().unwrap();
        assert!(verify_password("123456", &table.by_email["admin@rentaldesk.dev"].password_hash));
    }

    #[test]
    fn concurrent_registrations_get_distinct_ids() {
        use std::sync::Arc;

        let store = Arc::new(CredentialStore::default());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .register(&format!("user{i}@example.com"), "pw", "U", "V")
                        .unwrap()
                        .user
                        .id
                })
            })
            .collect();

        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16);
    }
}
