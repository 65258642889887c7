//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if any variable is missing or malformed.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.

pub mod secrets;

use std::fmt;
use std::str::FromStr;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resolve::{ResolvedEnv, resolve};
use crate::schema::{self, Schema};
use crate::source::{ReadEnv, SystemEnv};
use secrets::{REDACTED, redact_opt};

// ---------------------------------------------------------------------------
// Runtime mode
// ---------------------------------------------------------------------------

/// Value of `NODE_ENV`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    #[default]
    Development,
    Test,
    Production,
}

impl RuntimeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "development" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" => Ok(Self::Production),
            other => Err(Error::Other(format!("unknown runtime mode: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Credentials for one OAuth provider.
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .finish()
    }
}

/// The application's validated configuration.
pub struct Config {
    pub database_url: SecretString,
    pub node_env: RuntimeMode,
    /// Only guaranteed in production.
    pub nextauth_secret: Option<SecretString>,
    /// A full URL, or a bare host name when deployed on the hosting platform.
    pub nextauth_url: String,
    pub google: OAuthClient,
    pub slack: OAuthClient,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &REDACTED)
            .field("node_env", &self.node_env)
            .field("nextauth_secret", &redact_opt(self.nextauth_secret.as_ref()))
            .field("nextauth_url", &self.nextauth_url)
            .field("google", &self.google)
            .field("slack", &self.slack)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, the platform provides the vars.
    pub fn from_env() -> Result<Self> {
        Self::from_source(&SystemEnv)
    }

    /// Validate `env` against [`Schema::standard`].
    pub fn from_source(env: &dyn ReadEnv) -> Result<Self> {
        let resolved = resolve(env, &Schema::standard())?;
        Self::from_resolved(&resolved)
    }

    /// Build the typed record from an already validated environment.
    pub fn from_resolved(env: &ResolvedEnv) -> Result<Self> {
        Ok(Self {
            database_url: secret(env.require(schema::DATABASE_URL)?),
            node_env: env.require(schema::NODE_ENV)?.parse()?,
            nextauth_secret: env.get(schema::NEXTAUTH_SECRET)?.map(secret),
            nextauth_url: env.require(schema::NEXTAUTH_URL)?.to_string(),
            google: OAuthClient {
                client_id: env.require(schema::GOOGLE_CLIENT_ID)?.to_string(),
                client_secret: secret(env.require(schema::GOOGLE_CLIENT_SECRET)?),
            },
            slack: OAuthClient {
                client_id: env.require(schema::SLACK_CLIENT_ID)?.to_string(),
                client_secret: secret(env.require(schema::SLACK_CLIENT_SECRET)?),
            },
        })
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
