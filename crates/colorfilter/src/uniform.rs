use std::sync::{PoisonError, RwLock};

use glam::Vec4;

/// Named `vec4` shader uniform.
///
/// Uniforms are shared between the filter that drives them and every state
/// container they were installed into, so the value sits behind a lock and the
/// uniform itself is passed around as `Arc<Uniform>`.
#[derive(Debug)]
pub struct Uniform {
    name: String,
    value: RwLock<Vec4>,
}

impl Uniform {
    pub fn new(name: impl Into<String>, value: Vec4) -> Self {
        Self {
            name: name.into(),
            value: RwLock::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self) -> Vec4 {
        *self.value.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, value: Vec4) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// The value as laid out in a std140 uniform block (four native-endian `f32`s).
    pub fn to_bytes(&self) -> [u8; 16] {
        bytemuck::cast(self.get().to_array())
    }
}
