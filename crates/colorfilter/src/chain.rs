use std::sync::Arc;

use glam::Vec4;

use crate::config::Config;
use crate::filter::ColorFilter;
use crate::registry::{ColorFilterRegistry, FilterError};
use crate::state::StateContainer;

/// Ordered list of color filters applied to one layer.
#[derive(Debug, Clone, Default)]
pub struct ColorFilterChain {
    filters: Vec<Arc<dyn ColorFilter>>,
}

impl ColorFilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds each filter in `configs` through `registry`, preserving order.
    ///
    /// Every type tag is checked before any filter is built, so a rejected chain
    /// draws no instance ids.
    pub fn from_configs<'a, I>(
        registry: &ColorFilterRegistry,
        configs: I,
    ) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = &'a Config>,
    {
        let configs: Vec<&Config> = configs.into_iter().collect();
        for config in &configs {
            registry.check(config)?;
        }
        let filters = configs
            .into_iter()
            .map(|config| registry.create(config).map(Arc::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    pub fn push(&mut self, filter: Arc<dyn ColorFilter>) {
        self.filters.push(filter);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ColorFilter>> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Installs every filter onto `state` in chain order.
    pub fn install(&self, state: &mut dyn StateContainer) {
        for filter in &self.filters {
            filter.install(state);
        }
    }

    /// Entry-point names in chain order; hosts call them in this sequence.
    pub fn entry_points(&self) -> Vec<String> {
        self.filters
            .iter()
            .map(|filter| filter.entry_point_function_name())
            .collect()
    }

    /// Runs `color` through every filter in chain order.
    pub fn apply(&self, color: Vec4) -> Vec4 {
        self.filters
            .iter()
            .fold(color, |color, filter| filter.apply(color))
    }

    pub fn configs(&self) -> Vec<Config> {
        self.filters.iter().map(|filter| filter.config()).collect()
    }
}
