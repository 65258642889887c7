//! Declared variables and the rules they must satisfy.
//!
//! A [`Schema`] is built once and never changes. [`Schema::standard`] is the
//! web app's own table; [`Schema::builder`] assembles others.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::preprocess::{PlatformFallback, Preprocessor};

/// Names the client bundle may read must start with this.
pub const DEFAULT_CLIENT_PREFIX: &str = "NEXT_PUBLIC_";

pub const DATABASE_URL: &str = "DATABASE_URL";
pub const NODE_ENV: &str = "NODE_ENV";
pub const NEXTAUTH_SECRET: &str = "NEXTAUTH_SECRET";
pub const NEXTAUTH_URL: &str = "NEXTAUTH_URL";
pub const GOOGLE_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
pub const SLACK_CLIENT_ID: &str = "SLACK_CLIENT_ID";
pub const SLACK_CLIENT_SECRET: &str = "SLACK_CLIENT_SECRET";

pub const RUNTIME_MODES: &[&str] = &["development", "test", "production"];

// ---------------------------------------------------------------------------
// Audience / Rule
// ---------------------------------------------------------------------------

/// Which side of the application may read a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Audience {
    Server,
    Client,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => write!(f, "server"),
            Self::Client => write!(f, "client"),
        }
    }
}

/// Shape a variable's value must have once preprocessing is done and empty
/// strings have been turned into "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and non-empty.
    Required,
    /// Present and an absolute URL.
    Url,
    /// One of `allowed`; `default` when absent.
    OneOf {
        allowed: &'static [&'static str],
        default: &'static str,
    },
    /// Mandatory while the runtime-mode variable `var` equals `equals`,
    /// optional otherwise.
    RequiredWhen {
        var: &'static str,
        equals: &'static str,
    },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required string"),
            Self::Url => write!(f, "required URL"),
            Self::OneOf { allowed, default } => {
                write!(f, "one of {{{}}}, default {default}", allowed.join(","))
            }
            Self::RequiredWhen { var, equals } => write!(f, "required when {var}={equals}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// One declared variable.
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub name: &'static str,
    pub rule: Rule,
    /// Redacted in debug and CLI output.
    pub sensitive: bool,
    pub preprocess: Option<Arc<dyn Preprocessor>>,
}

impl Descriptor {
    pub fn new(name: &'static str, rule: Rule) -> Self {
        Self {
            name,
            rule,
            sensitive: false,
            preprocess: None,
        }
    }

    pub fn required(name: &'static str) -> Self {
        Self::new(name, Rule::Required)
    }

    pub fn url(name: &'static str) -> Self {
        Self::new(name, Rule::Url)
    }

    pub fn one_of(
        name: &'static str,
        allowed: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self::new(name, Rule::OneOf { allowed, default })
    }

    pub fn required_when(name: &'static str, var: &'static str, equals: &'static str) -> Self {
        Self::new(name, Rule::RequiredWhen { var, equals })
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn preprocess(mut self, hook: impl Preprocessor + 'static) -> Self {
        self.preprocess = Some(Arc::new(hook));
        self
    }
}

/// A descriptor together with the side it was declared for.
#[derive(Debug, Clone)]
pub struct Entry {
    pub audience: Audience,
    pub descriptor: Descriptor,
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// The full, validated set of declared variables, in declaration order.
#[derive(Debug, Clone)]
pub struct Schema {
    entries: Vec<Entry>,
    client_prefix: String,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The application's variables, including the hosting-platform fallback
    /// for `NEXTAUTH_URL`.
    pub fn standard() -> Self {
        Self::standard_with(Some(PlatformFallback::vercel()))
    }

    /// [`Schema::standard`] for deployments outside the hosting platform:
    /// `NEXTAUTH_URL` is always a plain required URL.
    pub fn standard_without_platform() -> Self {
        Self::standard_with(None)
    }

    fn standard_with(platform: Option<PlatformFallback>) -> Self {
        let mut nextauth_url = Descriptor::url(NEXTAUTH_URL);
        if let Some(hook) = platform {
            nextauth_url = nextauth_url.preprocess(hook);
        }

        let server = |descriptor| Entry {
            audience: Audience::Server,
            descriptor,
        };

        Self {
            entries: vec![
                server(Descriptor::url(DATABASE_URL).sensitive()),
                server(Descriptor::one_of(NODE_ENV, RUNTIME_MODES, "development")),
                server(
                    Descriptor::required_when(NEXTAUTH_SECRET, NODE_ENV, "production").sensitive(),
                ),
                server(nextauth_url),
                server(Descriptor::required(GOOGLE_CLIENT_ID)),
                server(Descriptor::required(GOOGLE_CLIENT_SECRET).sensitive()),
                server(Descriptor::required(SLACK_CLIENT_ID)),
                server(Descriptor::required(SLACK_CLIENT_SECRET).sensitive()),
            ],
            client_prefix: DEFAULT_CLIENT_PREFIX.to_string(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    pub fn client_prefix(&self) -> &str {
        &self.client_prefix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Collects descriptors; [`SchemaBuilder::build`] checks names and prefixes.
#[derive(Debug)]
pub struct SchemaBuilder {
    entries: Vec<Entry>,
    client_prefix: String,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            client_prefix: DEFAULT_CLIENT_PREFIX.to_string(),
        }
    }
}

impl SchemaBuilder {
    pub fn server(self, descriptor: Descriptor) -> Self {
        self.push(Audience::Server, descriptor)
    }

    pub fn client(self, descriptor: Descriptor) -> Self {
        self.push(Audience::Client, descriptor)
    }

    pub fn client_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.client_prefix = prefix.into();
        self
    }

    fn push(mut self, audience: Audience, descriptor: Descriptor) -> Self {
        self.entries.push(Entry {
            audience,
            descriptor,
        });
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut seen = BTreeSet::new();
        for entry in &self.entries {
            let name = entry.descriptor.name;
            if name.is_empty() {
                return Err(Error::Schema("variable name must not be empty".to_string()));
            }
            if !seen.insert(name) {
                return Err(Error::Schema(format!("{name} is declared more than once")));
            }

            let prefix = self.client_prefix.as_str();
            let prefixed = !prefix.is_empty() && name.starts_with(prefix);
            match entry.audience {
                Audience::Client if !prefix.is_empty() && !prefixed => {
                    return Err(Error::Schema(format!(
                        "client variable {name} must be prefixed with {prefix}"
                    )));
                }
                Audience::Server if prefixed => {
                    return Err(Error::Schema(format!(
                        "server variable {name} must not be prefixed with {prefix}"
                    )));
                }
                _ => {}
            }

            if let Rule::OneOf { allowed, default } = entry.descriptor.rule {
                if !allowed.contains(&default) {
                    return Err(Error::Schema(format!(
                        "default {default:?} for {name} is not one of its allowed values"
                    )));
                }
            }
        }

        Ok(Schema {
            entries: self.entries,
            client_prefix: self.client_prefix,
        })
    }
}
