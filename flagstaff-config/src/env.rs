// Environment variable loading

use crate::{ConfigError, Result};
use flagstaff_features::{FlagValue, Overrides, Schema, overrides};
use std::env;
use std::sync::Arc;
use tracing::trace;

/// Default variable prefix
pub const DEFAULT_PREFIX: &str = "FLAGSTAFF";

/// Environment variable loader.
///
/// With the default prefix, `FLAGSTAFF_ENV` names the active environment
/// and `FLAGSTAFF_FLAG_DEV_TOOLS` overrides the `devTools` flag.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Load a prefixed environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        env::var(self.var_name(key)).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }

    /// Active environment name from `<PREFIX>_ENV`, if set.
    pub fn environment(&self) -> Option<String> {
        self.load_var("ENV").ok().filter(|s| !s.is_empty())
    }

    /// Variable consulted for a flag override.
    pub fn flag_var(&self, flag: &str) -> String {
        self.var_name(&format!("FLAG_{}", screaming_snake(flag)))
    }

    fn var_name(&self, key: &str) -> String {
        format!("{}_{}", self.prefix, key.to_uppercase())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Override source backed by environment variables.
///
/// The variable is read on every resolution, so changing it at runtime
/// affects the next write. The raw text is matched against the textual form
/// of the flag's options; text that matches no option is ignored.
#[derive(Debug, Clone)]
pub struct EnvOverrides {
    loader: EnvLoader,
    schema: Arc<Schema>,
}

impl EnvOverrides {
    pub fn new(loader: EnvLoader, schema: Schema) -> Self {
        Self {
            loader,
            schema: Arc::new(schema),
        }
    }

    /// Look up the override for one flag.
    pub fn lookup(&self, flag: &str) -> Option<FlagValue> {
        let raw = env::var(self.loader.flag_var(flag)).ok()?;
        let definition = self.schema.definition(flag)?;
        let value = definition
            .options
            .iter()
            .find(|option| option.to_string() == raw.trim())
            .cloned();

        if value.is_none() {
            trace!(flag, raw = raw.as_str(), "Environment override matches no option");
        }
        value
    }

    pub fn into_overrides(self) -> Overrides {
        overrides(move |flag| self.lookup(flag))
    }
}

/// `devTools` / `dev-tools` / `dev.tools` to `DEV_TOOLS`.
fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                out.push('_');
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            out.push(c.to_ascii_uppercase());
        } else {
            if !out.ends_with('_') {
                out.push('_');
            }
            prev_lower = false;
        }
    }

    out
}
