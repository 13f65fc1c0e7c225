//! Named value lookup over flags, environment, and in-memory maps.
//!
//! Every input the resolver reads is a [`Param`]. Providers implement
//! [`ValueSource`] and are composed with [`ValueSourceExt::or`], so the
//! usual flag-over-environment precedence is `args.or(EnvSource)`.

use std::collections::BTreeMap;

/// A named input to the parameter resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Param {
    Url,
    Prefix,
    Timeout,
    LogLevel,
}

impl Param {
    pub const ALL: [Param; 4] = [Param::Url, Param::Prefix, Param::Timeout, Param::LogLevel];

    /// Environment variable consulted for this parameter.
    pub fn env_key(self) -> &'static str {
        match self {
            Param::Url => "DATABASE_URL",
            Param::Prefix => "DATABASE_PREFIX",
            Param::Timeout => "DATABASE_TIMEOUT",
            Param::LogLevel => "LOG_LEVEL",
        }
    }

    /// Long command-line flag, without the leading dashes.
    pub fn flag_name(self) -> &'static str {
        match self {
            Param::Url => "database-url",
            Param::Prefix => "database-prefix",
            Param::Timeout => "database-timeout",
            Param::LogLevel => "log-level",
        }
    }

    /// Field name used in error messages.
    pub fn field(self) -> &'static str {
        match self {
            Param::Url => "url",
            Param::Prefix => "prefix",
            Param::Timeout => "timeout",
            Param::LogLevel => "log-level",
        }
    }
}

impl std::fmt::Display for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// Capability to look up a parameter by name.
///
/// `None` means the source has no value. An empty string is a value as far
/// as the source is concerned; the resolver decides what empty means.
pub trait ValueSource {
    fn lookup(&self, param: Param) -> Option<String>;
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn lookup(&self, param: Param) -> Option<String> {
        (**self).lookup(param)
    }
}

/// Combinators for [`ValueSource`].
pub trait ValueSourceExt: ValueSource + Sized {
    /// Consult `self` first and fall back to `fallback` when it has no value.
    fn or<F: ValueSource>(self, fallback: F) -> Layered<Self, F> {
        Layered {
            primary: self,
            fallback,
        }
    }
}

impl<T: ValueSource> ValueSourceExt for T {}

/// Two sources composed with override precedence.
pub struct Layered<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ValueSource, F: ValueSource> ValueSource for Layered<P, F> {
    fn lookup(&self, param: Param) -> Option<String> {
        self.primary
            .lookup(param)
            .or_else(|| self.fallback.lookup(param))
    }
}

/// Process environment, keyed by [`Param::env_key`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ValueSource for EnvSource {
    fn lookup(&self, param: Param) -> Option<String> {
        std::env::var(param.env_key()).ok()
    }
}

/// Fixed set of values, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    values: BTreeMap<Param, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: Param, value: impl Into<String>) -> Self {
        self.values.insert(param, value.into());
        self
    }
}

impl ValueSource for MapSource {
    fn lookup(&self, param: Param) -> Option<String> {
        self.values.get(&param).cloned()
    }
}

/// Store flags as parsed by clap. A flag counts as set only when the user
/// passed it.
#[derive(Clone, Default, clap::Args)]
pub struct StoreArgs {
    /// Store URL in the form <scheme>://<address> (e.g. mem://local)
    #[arg(long = "database-url", global = true, value_name = "URL")]
    pub database_url: Option<String>,

    /// Key prefix used to namespace the store
    #[arg(long = "database-prefix", global = true, value_name = "PREFIX")]
    pub database_prefix: Option<String>,

    /// Store connection timeout in seconds
    #[arg(long = "database-timeout", global = true, value_name = "SECONDS")]
    pub database_timeout: Option<String>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl ValueSource for StoreArgs {
    fn lookup(&self, param: Param) -> Option<String> {
        match param {
            Param::Url => self.database_url.clone(),
            Param::Prefix => self.database_prefix.clone(),
            Param::Timeout => self.database_timeout.clone(),
            Param::LogLevel => self.log_level.clone(),
        }
    }
}
