use std::collections::BTreeMap;

use colorfilter::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse filter document: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize filter document: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid filter document: {0}")]
    Invalid(String),
}

/// TOML document listing the color filter chain of each layer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterDocument {
    pub version: u32,
    #[serde(default)]
    pub layers: BTreeMap<String, Layer>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Layer {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub filters: Vec<FilterEntry>,
}

fn default_enabled() -> bool {
    true
}

/// One filter: its registry type plus flat numeric settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FilterEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, toml::Value>,
}

/// Value a setting takes once it reaches a shader uniform. `None` for
/// non-numbers and for numbers outside the finite `f32` range.
fn uniform_value(value: &toml::Value) -> Option<f32> {
    let number = match value {
        toml::Value::Integer(number) => *number as f32,
        toml::Value::Float(number) => *number as f32,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

impl FilterEntry {
    /// Converts to a filter config. Numbers keep their TOML display form.
    pub fn to_config(&self) -> Config {
        let mut config = Config::new(self.kind.trim());
        for (name, value) in &self.values {
            match value {
                toml::Value::Integer(number) => config.add(name.as_str(), number),
                toml::Value::Float(number) => config.add(name.as_str(), number),
                _ => continue,
            };
        }
        config
    }

    /// Builds an entry from a filter config. Every value must be a finite number
    /// and is written as a TOML float.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let values = config
            .iter()
            .map(|(name, raw)| -> Result<(String, toml::Value), ConfigError> {
                let number = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|number| (*number as f32).is_finite())
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!(
                            "filter '{}' value '{name}' is not a finite number: '{raw}'",
                            config.key()
                        ))
                    })?;
                Ok((name.to_string(), toml::Value::Float(number)))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self {
            kind: config.key().to_string(),
            values,
        })
    }
}

impl FilterDocument {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: FilterDocument = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Enabled layers in name order.
    pub fn enabled_layers(&self) -> impl Iterator<Item = (&str, &Layer)> {
        self.layers
            .iter()
            .filter(|(_, layer)| layer.enabled)
            .map(|(name, layer)| (name.as_str(), layer))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported document version {}; expected 1",
                self.version
            )));
        }

        if self.layers.is_empty() {
            return Err(ConfigError::Invalid(
                "document must define at least one layer".into(),
            ));
        }

        for (name, layer) in &self.layers {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid("layer name may not be empty".into()));
            }

            for (index, filter) in layer.filters.iter().enumerate() {
                if filter.kind.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "layer '{name}' filter #{index} is missing a type"
                    )));
                }

                for (key, value) in &filter.values {
                    if uniform_value(value).is_none() {
                        return Err(ConfigError::Invalid(format!(
                            "layer '{name}' filter '{}' value '{key}' must be a finite number, got {value}",
                            filter.kind
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Layer {
    pub fn from_configs<'a>(
        configs: impl IntoIterator<Item = &'a Config>,
    ) -> Result<Self, ConfigError> {
        let filters = configs
            .into_iter()
            .map(FilterEntry::from_config)
            .collect::<Result<_, _>>()?;
        Ok(Self {
            enabled: true,
            filters,
        })
    }

    pub fn filter_configs(&self) -> Vec<Config> {
        self.filters.iter().map(FilterEntry::to_config).collect()
    }
}
