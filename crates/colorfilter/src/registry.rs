use std::collections::BTreeMap;
use std::fmt;

use crate::cmyk::CmykColorFilter;
use crate::config::Config;
use crate::counter::InstanceCounter;
use crate::filter::ColorFilter;

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("color filter config is missing a type tag")]
    MissingType,
    #[error("unknown color filter type '{0}'")]
    UnknownType(String),
}

/// Builds a filter from its config, drawing instance ids from the counter.
pub type FilterFactory = fn(&Config, &InstanceCounter) -> Box<dyn ColorFilter>;

/// Maps config type tags to filter constructors.
///
/// Every filter built through one registry draws its instance id from the
/// registry's counter.
#[derive(Clone)]
pub struct ColorFilterRegistry {
    counter: InstanceCounter,
    factories: BTreeMap<String, FilterFactory>,
}

impl ColorFilterRegistry {
    /// An empty registry naming its filters from `counter`.
    pub fn new(counter: InstanceCounter) -> Self {
        Self {
            counter,
            factories: BTreeMap::new(),
        }
    }

    /// A registry with every built-in filter type registered.
    pub fn with_builtin_filters(counter: InstanceCounter) -> Self {
        let mut registry = Self::new(counter);
        CmykColorFilter::register(&mut registry);
        registry
    }

    /// Registers `factory` under `key`, returning the factory it replaced.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        factory: FilterFactory,
    ) -> Option<FilterFactory> {
        self.factories.insert(key.into(), factory)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered type tags in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn counter(&self) -> &InstanceCounter {
        &self.counter
    }

    /// Fails the way [`create`](Self::create) would, without drawing an instance id.
    pub fn check(&self, config: &Config) -> Result<(), FilterError> {
        self.factory(config).map(|_| ())
    }

    /// Constructs the filter named by `config.key()`.
    pub fn create(&self, config: &Config) -> Result<Box<dyn ColorFilter>, FilterError> {
        let (key, factory) = self.factory(config)?;
        let filter = factory(config, &self.counter);
        tracing::debug!(
            filter = key,
            entry_point = %filter.entry_point_function_name(),
            "created color filter"
        );
        Ok(filter)
    }

    fn factory<'c>(&self, config: &'c Config) -> Result<(&'c str, FilterFactory), FilterError> {
        let key = config.key().trim();
        if key.is_empty() {
            return Err(FilterError::MissingType);
        }
        let factory = self
            .factories
            .get(key)
            .ok_or_else(|| FilterError::UnknownType(key.to_string()))?;
        Ok((key, *factory))
    }
}

impl fmt::Debug for ColorFilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorFilterRegistry")
            .field("counter", &self.counter)
            .field("keys", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ColorFilterRegistry {
    /// Built-in filters named from the process-wide counter.
    fn default() -> Self {
        Self::with_builtin_filters(InstanceCounter::global())
    }
}
