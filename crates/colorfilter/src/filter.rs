use std::fmt;

use glam::Vec4;

use crate::config::Config;
use crate::state::StateContainer;

/// A color filter contributes one fragment function, applied to each texel's color.
///
/// The generated function has the signature
/// `void <entry point>(in int slot, inout vec4 color)`.
pub trait ColorFilter: fmt::Debug + Send + Sync {
    /// Name of the generated GLSL function. Unique per filter instance.
    fn entry_point_function_name(&self) -> String;

    /// Adds the filter's uniforms and, when available, its shader function to `state`.
    ///
    /// Installing the same filter twice leaves `state` unchanged.
    fn install(&self, state: &mut dyn StateContainer);

    /// Runs the filter's color transform on the CPU, matching its shader function.
    fn apply(&self, color: Vec4) -> Vec4;

    /// Serializes the filter's settings, tagged with its registry key.
    fn config(&self) -> Config;
}
