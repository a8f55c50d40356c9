use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline stage a shader function is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// GLSL source for a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    pub stage: ShaderStage,
    pub source: String,
}

impl Shader {
    pub fn new(stage: ShaderStage, source: impl Into<String>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }

    pub fn fragment(source: impl Into<String>) -> Self {
        Self::new(ShaderStage::Fragment, source)
    }
}

/// Capability to accept named shader functions for later composition.
pub trait ShaderComposition {
    /// Registers `shader` under `name`, replacing any previous entry with that name.
    fn set_shader(&mut self, name: &str, shader: Shader);
}

/// In-memory shader composition: a table of named shader functions.
#[derive(Debug, Clone, Default)]
pub struct VirtualProgram {
    shaders: BTreeMap<String, Shader>,
}

impl VirtualProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shader(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    /// Registered shaders in name order.
    pub fn shaders(&self) -> impl Iterator<Item = (&str, &Shader)> {
        self.shaders
            .iter()
            .map(|(name, shader)| (name.as_str(), shader))
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

impl ShaderComposition for VirtualProgram {
    fn set_shader(&mut self, name: &str, shader: Shader) {
        if self.shaders.insert(name.to_string(), shader).is_some() {
            tracing::debug!(shader = name, "replaced existing shader function");
        }
    }
}
