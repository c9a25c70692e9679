//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use anyhow::Context;

use rentaldesk_auth::PasswordPolicy;

const DEV_SECRET: &str = "rentaldesk-dev-secret";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub password_policy: PasswordPolicy,
    pub seed_demo_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = match lookup("JWT_SECRET").or_else(|| lookup("SECRET_KEY")) {
            Some(secret) if !secret.trim().is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        let bind_addr = lookup("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address such as 0.0.0.0:8080")?;

        let verify = parse_flag(lookup("AUTH_VERIFY_PASSWORDS"), false).context("AUTH_VERIFY_PASSWORDS")?;
        let seed_demo_data = parse_flag(lookup("SEED_DEMO_DATA"), true).context("SEED_DEMO_DATA")?;

        Ok(Self {
            jwt_secret,
            bind_addr,
            password_policy: if verify { PasswordPolicy::Verify } else { PasswordPolicy::AcceptAny },
            seed_demo_data,
        })
    }

    /// Config for in-process tests: fixed secret, demo data seeded.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            password_policy: PasswordPolicy::AcceptAny,
            seed_demo_data: true,
        }
    }
}

fn parse_flag(value: Option<String>, default: bool) -> anyhow::Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
