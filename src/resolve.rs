//! One-shot validation of the environment against a [`Schema`].
//!
//! [`resolve`] reads every declared variable, applies its preprocessing hook
//! and rule, and either returns a complete [`ResolvedEnv`] or every violation
//! it found. There is no partial result.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use url::Url;

use crate::config::secrets::REDACTED;
use crate::error::{Error, Result, ViolationKind, Violations};
use crate::preprocess::non_empty;
use crate::schema::{Audience, Descriptor, Rule, Schema};
use crate::source::ReadEnv;
use crate::telemetry;

/// A validated value and what the schema says about it.
#[derive(Clone)]
struct Resolved {
    audience: Audience,
    sensitive: bool,
    value: Option<String>,
}

/// The validated, read-only environment.
///
/// Holds exactly the declared variables of the side it was resolved for.
/// `None` values are optional variables that were not set.
#[derive(Clone)]
pub struct ResolvedEnv {
    side: Audience,
    values: BTreeMap<&'static str, Resolved>,
    withheld: BTreeSet<&'static str>,
}

/// Validate every declared variable for the server side.
pub fn resolve(env: &dyn ReadEnv, schema: &Schema) -> Result<ResolvedEnv> {
    resolve_for(env, schema, Audience::Server)
}

/// Validate the variables visible to `side`.
///
/// The server sees everything; the client only sees client-audience
/// variables, and server-audience names become inaccessible.
pub fn resolve_for(env: &dyn ReadEnv, schema: &Schema, side: Audience) -> Result<ResolvedEnv> {
    let _span = telemetry::resolve_span(side, schema.len()).entered();

    let mut values = BTreeMap::new();
    let mut withheld = BTreeSet::new();
    let mut violations = Violations::default();

    for entry in schema.entries() {
        let descriptor = &entry.descriptor;
        if side == Audience::Client && entry.audience == Audience::Server {
            withheld.insert(descriptor.name);
            continue;
        }

        match check(env, descriptor) {
            Ok(value) => {
                tracing::debug!(
                    variable = descriptor.name,
                    set = value.is_some(),
                    "variable validated"
                );
                values.insert(
                    descriptor.name,
                    Resolved {
                        audience: entry.audience,
                        sensitive: descriptor.sensitive,
                        value,
                    },
                );
            }
            Err(kind) => {
                tracing::debug!(variable = descriptor.name, reason = %kind, "variable rejected");
                violations.push(descriptor.name, kind);
            }
        }
    }

    if !violations.is_empty() {
        tracing::debug!(
            count = violations.len(),
            variables = ?violations.variables(),
            "environment validation failed"
        );
        return Err(Error::SchemaViolation(violations));
    }

    tracing::info!(side = %side, count = values.len(), "environment validated");
    Ok(ResolvedEnv {
        side,
        values,
        withheld,
    })
}

/// Preprocess, normalize and validate a single variable.
fn check(
    env: &dyn ReadEnv,
    descriptor: &Descriptor,
) -> std::result::Result<Option<String>, ViolationKind> {
    let mut value = non_empty(env.var(descriptor.name));
    let mut rule = descriptor.rule;

    if let Some(hook) = &descriptor.preprocess {
        let out = hook.preprocess(env, value);
        value = non_empty(out.value);
        rule = out.rule.unwrap_or(rule);
    }

    match rule {
        Rule::Required => value.map(Some).ok_or(ViolationKind::Missing),
        Rule::Url => {
            let value = value.ok_or(ViolationKind::Missing)?;
            Url::parse(&value).map_err(|e| ViolationKind::InvalidUrl(e.to_string()))?;
            Ok(Some(value))
        }
        Rule::OneOf { allowed, default } => match value {
            None => Ok(Some(default.to_string())),
            Some(v) if allowed.contains(&v.as_str()) => Ok(Some(v)),
            Some(_) => Err(ViolationKind::InvalidChoice {
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            }),
        },
        Rule::RequiredWhen { var, equals } => {
            let mode = non_empty(env.var(var));
            if value.is_none() && mode.as_deref() == Some(equals) {
                Err(ViolationKind::RequiredInMode {
                    var: var.to_string(),
                    mode: equals.to_string(),
                })
            } else {
                Ok(value)
            }
        }
    }
}

impl ResolvedEnv {
    /// The side this environment was resolved for.
    pub fn audience(&self) -> Audience {
        self.side
    }

    /// Value of a declared variable; `Ok(None)` for an unset optional one.
    pub fn get(&self, name: &str) -> Result<Option<&str>> {
        if let Some(resolved) = self.values.get(name) {
            return Ok(resolved.value.as_deref());
        }
        if self.withheld.contains(name) {
            return Err(Error::ServerOnly(name.to_string()));
        }
        Err(Error::Undeclared(name.to_string()))
    }

    /// Value of a variable that must be set, e.g. one with a required rule.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.get(name)?
            .ok_or_else(|| Error::Other(format!("{name} resolved without a value")))
    }

    /// Names of the accessible variables, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_sensitive(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|r| r.sensitive)
    }

    /// Audience each accessible variable was declared for.
    pub fn declared_audience(&self, name: &str) -> Option<Audience> {
        self.values.get(name).map(|r| r.audience)
    }

    /// JSON object of every accessible variable, secrets replaced and unset
    /// optional variables as `null`.
    pub fn to_redacted_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(name, r)| {
                let value = match (&r.value, r.sensitive) {
                    (None, _) => serde_json::Value::Null,
                    (Some(_), true) => serde_json::Value::from(REDACTED),
                    (Some(v), false) => serde_json::Value::from(v.as_str()),
                };
                (name.to_string(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Debug for ResolvedEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, r) in &self.values {
            match (&r.value, r.sensitive) {
                (None, _) => map.entry(name, &Option::<&str>::None),
                (Some(_), true) => map.entry(name, &REDACTED),
                (Some(v), false) => map.entry(name, v),
            };
        }
        map.finish()
    }
}
