//! Configuration for installation and audit.
//!
//! Defaults come from the build: the `assertions` cargo feature (on by
//! default) decides whether conflicts are checked at all. The environment
//! can override that at startup:
//!
//! | Variable | Values |
//! |---|---|
//! | `SAFECAT_ASSERTIONS` | `1`, `true`, `on`, `yes` / `0`, `false`, `off`, `no` |
//! | `SAFECAT_SHADOW_CHECK` | `own`, `inherited` |
//!
//! Unrecognised values are ignored with a warning.

use crate::runtime::Selector;
use tracing::warn;

/// Environment variable overriding [`Config::assertions`].
pub const ASSERTIONS_ENV: &str = "SAFECAT_ASSERTIONS";

/// Environment variable overriding [`Config::shadow_check`].
pub const SHADOW_CHECK_ENV: &str = "SAFECAT_SHADOW_CHECK";

/// What counts as "already present" when installing a category method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowCheck {
    /// Only methods declared directly on the target class.
    #[default]
    Own,
    /// Methods on the target or inherited from any of its ancestors.
    Inherited,
}

impl ShadowCheck {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "own" => Some(ShadowCheck::Own),
            "inherited" => Some(ShadowCheck::Inherited),
            _ => None,
        }
    }
}

/// Safe-category settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Check for conflicts at install time and run the audit. When off,
    /// methods are installed with last-write-wins and the audit is a no-op.
    pub assertions: bool,
    /// Class-method name the runtime treats as the load hook. A category's
    /// own hook is never copied onto its target.
    pub lifecycle_hook: Selector,
    /// Scope of the install-time presence check.
    pub shadow_check: ShadowCheck,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            assertions: cfg!(feature = "assertions"),
            lifecycle_hook: Selector::load(),
            shadow_check: ShadowCheck::Own,
        }
    }
}

impl Config {
    /// Default configuration with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Default configuration with overrides read through `lookup`.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(raw) = lookup(ASSERTIONS_ENV) {
            match parse_flag(&raw) {
                Some(enabled) => config.assertions = enabled,
                None => warn!(variable = ASSERTIONS_ENV, value = %raw, "ignoring invalid value"),
            }
        }

        if let Some(raw) = lookup(SHADOW_CHECK_ENV) {
            match ShadowCheck::parse(&raw) {
                Some(check) => config.shadow_check = check,
                None => warn!(variable = SHADOW_CHECK_ENV, value = %raw, "ignoring invalid value"),
            }
        }

        config
    }

    /// Sets [`Config::assertions`].
    #[must_use]
    pub fn with_assertions(mut self, enabled: bool) -> Self {
        self.assertions = enabled;
        self
    }

    /// Sets [`Config::lifecycle_hook`].
    #[must_use]
    pub fn with_lifecycle_hook(mut self, hook: Selector) -> Self {
        self.lifecycle_hook = hook;
        self
    }

    /// Sets [`Config::shadow_check`].
    #[must_use]
    pub fn with_shadow_check(mut self, check: ShadowCheck) -> Self {
        self.shadow_check = check;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
