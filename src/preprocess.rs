//! Hooks that rewrite a raw value before its rule is checked.

use std::fmt;

use crate::schema::Rule;
use crate::source::ReadEnv;

/// Outcome of a [`Preprocessor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preprocessed {
    /// Value to validate in place of the raw one.
    pub value: Option<String>,
    /// Replaces the descriptor's rule for this resolution, when set.
    pub rule: Option<Rule>,
}

impl Preprocessed {
    pub fn unchanged(value: Option<String>) -> Self {
        Self { value, rule: None }
    }
}

/// Rewrites a variable's raw value, possibly consulting other variables.
///
/// `raw` has already had empty strings turned into `None`.
pub trait Preprocessor: fmt::Debug + Send + Sync {
    fn preprocess(&self, env: &dyn ReadEnv, raw: Option<String>) -> Preprocessed;
}

/// Falls back to a hosting platform's deployment URL.
///
/// The platform exports `marker` on every deployment and `url_var` with the
/// deployment's host name, without a scheme. While on the platform, or when
/// the value came from `url_var`, the value only has to be a non-empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformFallback {
    pub marker: &'static str,
    pub url_var: &'static str,
}

impl PlatformFallback {
    pub const fn vercel() -> Self {
        Self {
            marker: "VERCEL",
            url_var: "VERCEL_URL",
        }
    }

    /// Whether the process runs on the platform.
    pub fn detected(&self, env: &dyn ReadEnv) -> bool {
        non_empty(env.var(self.marker)).is_some()
    }
}

impl Preprocessor for PlatformFallback {
    /// A value taken from `url_var` is relaxed to [`Rule::Required`] even
    /// when `marker` is unset.
    fn preprocess(&self, env: &dyn ReadEnv, raw: Option<String>) -> Preprocessed {
        let on_platform = self.detected(env);

        match raw {
            Some(value) => Preprocessed {
                value: Some(value),
                rule: on_platform.then_some(Rule::Required),
            },
            None => match non_empty(env.var(self.url_var)) {
                Some(platform_url) => {
                    tracing::debug!(source = self.url_var, "using platform deployment URL");
                    Preprocessed {
                        value: Some(platform_url),
                        rule: Some(Rule::Required),
                    }
                }
                None => Preprocessed {
                    value: None,
                    rule: on_platform.then_some(Rule::Required),
                },
            },
        }
    }
}

/// Empty strings count as unset.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
