use colorfilter::{ColorFilterChain, Config, ShaderStage, StateSet};
use serde::Serialize;

/// JSON summary of one installed layer.
#[derive(Debug, Serialize)]
pub struct LayerReport {
    pub layer: String,
    pub filters: Vec<FilterReport>,
    pub uniforms: Vec<UniformReport>,
    pub shaders: Vec<ShaderReport>,
}

#[derive(Debug, Serialize)]
pub struct FilterReport {
    pub entry_point: String,
    pub config: Config,
}

#[derive(Debug, Serialize)]
pub struct UniformReport {
    pub name: String,
    pub value: [f32; 4],
    /// Upload form of `value`: 16 bytes in native order, hex encoded.
    pub bytes: String,
}

#[derive(Debug, Serialize)]
pub struct ShaderReport {
    pub name: String,
    pub stage: ShaderStage,
    pub source: String,
}

impl LayerReport {
    pub fn collect(layer: &str, chain: &ColorFilterChain, state: &StateSet) -> Self {
        let filters = chain
            .iter()
            .map(|filter| FilterReport {
                entry_point: filter.entry_point_function_name(),
                config: filter.config(),
            })
            .collect();

        let uniforms = state
            .uniforms()
            .map(|uniform| UniformReport {
                name: uniform.name().to_string(),
                value: uniform.get().to_array(),
                bytes: hex(&uniform.to_bytes()),
            })
            .collect();

        let shaders = state
            .program()
            .map(|program| {
                program
                    .shaders()
                    .map(|(name, shader)| ShaderReport {
                        name: name.to_string(),
                        stage: shader.stage,
                        source: shader.source.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            layer: layer.to_string(),
            filters,
            uniforms,
            shaders,
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}
