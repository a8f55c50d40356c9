//! Color filters that inject per-instance fragment shader stages into a
//! composable shader program.
//!
//! A filter owns a named `vec4` [`Uniform`] and knows how to render a small GLSL
//! function around it. Installing a filter onto a [`StateContainer`] hands the
//! uniform to the container and, when the container exposes a
//! [`ShaderComposition`] capability, registers the generated function under the
//! filter's entry-point name.
//!
//! Filters are constructed either directly or through a
//! [`ColorFilterRegistry`] from a tagged key/value [`Config`].
mod chain;
mod cmyk;
mod config;
mod counter;
mod filter;
mod program;
mod registry;
mod state;
mod uniform;

pub use chain::ColorFilterChain;
pub use cmyk::{CmykColorFilter, CMYK_FILTER_KEY};
pub use config::Config;
pub use counter::InstanceCounter;
pub use filter::ColorFilter;
pub use program::{Shader, ShaderComposition, ShaderStage, VirtualProgram};
pub use registry::{ColorFilterRegistry, FilterError, FilterFactory};
pub use state::{StateContainer, StateSet};
pub use uniform::Uniform;

pub use glam::Vec4;
