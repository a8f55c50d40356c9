use std::collections::BTreeMap;
use std::sync::Arc;

use crate::program::{ShaderComposition, VirtualProgram};
use crate::uniform::Uniform;

/// Rendering state a filter installs itself into.
pub trait StateContainer {
    /// Adds `uniform`, keyed by its name. Adding the same uniform twice is a no-op.
    fn add_uniform(&mut self, uniform: Arc<Uniform>);

    /// Returns the attached shader composition, if the container has one.
    fn shader_composition(&mut self) -> Option<&mut dyn ShaderComposition>;
}

/// Uniform table plus an optional program attribute.
#[derive(Debug, Default)]
pub struct StateSet {
    uniforms: BTreeMap<String, Arc<Uniform>>,
    program: Option<VirtualProgram>,
}

impl StateSet {
    /// A state set without a program attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// A state set with `program` attached in its program slot.
    pub fn with_program(program: VirtualProgram) -> Self {
        Self {
            uniforms: BTreeMap::new(),
            program: Some(program),
        }
    }

    pub fn program(&self) -> Option<&VirtualProgram> {
        self.program.as_ref()
    }

    pub fn uniform(&self, name: &str) -> Option<&Arc<Uniform>> {
        self.uniforms.get(name)
    }

    /// Uniforms in name order.
    pub fn uniforms(&self) -> impl Iterator<Item = &Arc<Uniform>> {
        self.uniforms.values()
    }

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }
}

impl StateContainer for StateSet {
    fn add_uniform(&mut self, uniform: Arc<Uniform>) {
        match self.uniforms.get(uniform.name()) {
            Some(existing) if Arc::ptr_eq(existing, &uniform) => {}
            Some(_) => {
                tracing::debug!(uniform = uniform.name(), "replacing uniform with same name");
                self.uniforms.insert(uniform.name().to_string(), uniform);
            }
            None => {
                self.uniforms.insert(uniform.name().to_string(), uniform);
            }
        }
    }

    fn shader_composition(&mut self) -> Option<&mut dyn ShaderComposition> {
        self.program
            .as_mut()
            .map(|program| program as &mut dyn ShaderComposition)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec4;

    use super::*;

    #[test]
    fn adding_same_uniform_twice_keeps_one_entry() {
        let mut state = StateSet::new();
        let uniform = Arc::new(Uniform::new("u", Vec4::ZERO));
        state.add_uniform(uniform.clone());
        state.add_uniform(uniform.clone());
        assert_eq!(state.uniform_count(), 1);
        assert!(Arc::ptr_eq(state.uniform("u").unwrap(), &uniform));
    }

    #[test]
    fn different_uniform_with_same_name_replaces() {
        let mut state = StateSet::new();
        state.add_uniform(Arc::new(Uniform::new("u", Vec4::ZERO)));
        let replacement = Arc::new(Uniform::new("u", Vec4::ONE));
        state.add_uniform(replacement.clone());
        assert_eq!(state.uniform_count(), 1);
        assert_eq!(state.uniform("u").unwrap().get(), Vec4::ONE);
    }

    #[test]
    fn composition_capability_follows_program_slot() {
        assert!(StateSet::new().shader_composition().is_none());

        let mut state = StateSet::with_program(VirtualProgram::new());
        state
            .shader_composition()
            .unwrap()
            .set_shader("tint", crate::program::Shader::fragment("void tint() {}"));
        assert!(state.program().unwrap().shader("tint").is_some());
    }
}
