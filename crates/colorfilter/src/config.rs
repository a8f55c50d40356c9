use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tagged, flat key/value configuration.
///
/// Values are kept as strings so any producer (TOML, JSON, CLI flags) can feed
/// them in; typed reads parse on access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    key: String,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

impl Config {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: BTreeMap::new(),
        }
    }

    /// The type tag of this configuration.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Sets `name` to the display form of `value`, replacing any previous value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Display) -> &mut Self {
        self.values.insert(name.into(), value.to_string());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.add(name, value);
        self
    }

    pub fn has_value(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn raw(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Parses `name`, falling back to `default` when it is absent or unparsable.
    pub fn value<T>(&self, name: &str, default: T) -> T
    where
        T: FromStr,
    {
        let Some(raw) = self.raw(name) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(
                    config = %self.key,
                    key = name,
                    value = raw,
                    "ignoring unparsable config value"
                );
                default
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
