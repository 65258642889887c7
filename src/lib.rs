//! # appenv
//!
//! Validated environment for the web application.
//!
//! Declares which variables the server and the client bundle need, checks
//! their shapes once at startup, and hands out an immutable, typed record.
//! Any violation aborts startup with every offending variable listed.

pub mod config;
pub mod error;
pub mod preprocess;
pub mod resolve;
pub mod schema;
pub mod source;
pub mod telemetry;

pub use config::{Config, RuntimeMode};
pub use error::{Error, Result};
pub use resolve::{ResolvedEnv, resolve, resolve_for};
pub use schema::{Audience, Descriptor, Rule, Schema};
pub use source::{MapEnv, ReadEnv, SystemEnv};
