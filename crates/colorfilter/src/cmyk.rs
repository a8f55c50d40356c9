use std::sync::Arc;

use glam::{Vec3, Vec4};

use crate::config::Config;
use crate::counter::InstanceCounter;
use crate::filter::ColorFilter;
use crate::program::Shader;
use crate::registry::ColorFilterRegistry;
use crate::state::StateContainer;
use crate::uniform::Uniform;

/// Registry key and config tag for [`CmykColorFilter`].
pub const CMYK_FILTER_KEY: &str = "cmyk";

const FUNCTION_PREFIX: &str = "osgearthutil_cmykColorFilter_";
const UNIFORM_PREFIX: &str = "osgearthutil_u_cmyk_";

const UNIFORM_TOKEN: &str = "__UNIFORM_NAME__";
const ENTRY_POINT_TOKEN: &str = "__ENTRY_POINT__";

/// Per-instance fragment function. The zero check skips the subtraction when no
/// offset is set; hosts may cache on the exact text, so keep it byte for byte.
const SHADER_TEMPLATE: &str = concat!(
    "#version 110\n",
    "uniform vec4 __UNIFORM_NAME__;\n",
    "void __ENTRY_POINT__(in int slot, inout vec4 color)\n",
    "{\n",
    "    if ((__UNIFORM_NAME__.x != 0.0) || (__UNIFORM_NAME__.y != 0.0) || (__UNIFORM_NAME__.z != 0.0) || (__UNIFORM_NAME__.w != 0.0))\n",
    "    {\n",
    "        color.rgb = clamp(color.rgb - __UNIFORM_NAME__.xyz - __UNIFORM_NAME__.w, 0.0, 1.0); \n",
    "    }\n",
    "}\n",
);

/// Subtractive CMYK offset.
///
/// The offset is stored as cyan, magenta, yellow and key. Cyan, magenta and
/// yellow are subtracted from red, green and blue respectively, and key is
/// subtracted from all three; results are clamped to `[0, 1]`. An RGBW offset
/// is the negation of the CMYK offset.
#[derive(Debug)]
pub struct CmykColorFilter {
    instance_id: u32,
    cmyk: Arc<Uniform>,
}

impl CmykColorFilter {
    /// Creates a filter with a zero offset, named from the process-wide counter.
    pub fn new() -> Self {
        Self::with_counter(&InstanceCounter::global())
    }

    /// Creates a filter with a zero offset, named from `counter`.
    pub fn with_counter(counter: &InstanceCounter) -> Self {
        let instance_id = counter.next_id();
        let cmyk = Arc::new(Uniform::new(
            format!("{UNIFORM_PREFIX}{instance_id}"),
            Vec4::ZERO,
        ));
        Self { instance_id, cmyk }
    }

    /// Creates a filter from a `cmyk` config. Missing components default to zero.
    pub fn from_config(config: &Config, counter: &InstanceCounter) -> Self {
        let filter = Self::with_counter(counter);
        filter.set_cmyk_offset(Vec4::new(
            config.value("c", 0.0),
            config.value("m", 0.0),
            config.value("y", 0.0),
            config.value("k", 0.0),
        ));
        filter
    }

    /// Registers the `cmyk` factory with `registry`.
    pub fn register(registry: &mut ColorFilterRegistry) {
        registry.register(CMYK_FILTER_KEY, build_from_config);
    }

    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    pub fn uniform(&self) -> &Arc<Uniform> {
        &self.cmyk
    }

    pub fn uniform_name(&self) -> &str {
        self.cmyk.name()
    }

    pub fn set_cmyk_offset(&self, cmyk: Vec4) {
        self.cmyk.set(cmyk);
    }

    pub fn cmyk_offset(&self) -> Vec4 {
        self.cmyk.get()
    }

    pub fn set_rgbw_offset(&self, rgbw: Vec4) {
        self.cmyk.set(-rgbw);
    }

    pub fn rgbw_offset(&self) -> Vec4 {
        -self.cmyk.get()
    }

    /// The GLSL fragment function installed for this instance.
    pub fn shader_source(&self) -> String {
        SHADER_TEMPLATE
            .replace(UNIFORM_TOKEN, self.cmyk.name())
            .replace(ENTRY_POINT_TOKEN, &self.entry_point_function_name())
    }
}

impl Default for CmykColorFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorFilter for CmykColorFilter {
    fn entry_point_function_name(&self) -> String {
        format!("{FUNCTION_PREFIX}{}", self.instance_id)
    }

    fn install(&self, state: &mut dyn StateContainer) {
        state.add_uniform(Arc::clone(&self.cmyk));

        let Some(composition) = state.shader_composition() else {
            tracing::debug!(
                uniform = self.cmyk.name(),
                "no shader composition attached; installed uniform only"
            );
            return;
        };

        let entry_point = self.entry_point_function_name();
        composition.set_shader(&entry_point, Shader::fragment(self.shader_source()));
        tracing::debug!(
            entry_point = %entry_point,
            uniform = self.cmyk.name(),
            "installed cmyk color filter"
        );
    }

    /// Same arithmetic as the generated shader. Alpha passes through.
    fn apply(&self, color: Vec4) -> Vec4 {
        let offset = self.cmyk_offset();
        if offset == Vec4::ZERO {
            return color;
        }
        let rgb = color.truncate() - offset.truncate() - Vec3::splat(offset.w);
        rgb.clamp(Vec3::ZERO, Vec3::ONE).extend(color.w)
    }

    fn config(&self) -> Config {
        let offset = self.cmyk_offset();
        Config::new(CMYK_FILTER_KEY)
            .with("c", offset.x)
            .with("m", offset.y)
            .with("y", offset.z)
            .with("k", offset.w)
    }
}

fn build_from_config(config: &Config, counter: &InstanceCounter) -> Box<dyn ColorFilter> {
    Box::new(CmykColorFilter::from_config(config, counter))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread;

    use super::*;
    use crate::program::{ShaderStage, VirtualProgram};
    use crate::state::StateSet;

    fn approx(a: Vec4, b: Vec4) -> bool {
        a.abs_diff_eq(b, 1e-6)
    }

    #[test]
    fn starts_with_zero_offset() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        assert_eq!(filter.cmyk_offset(), Vec4::ZERO);
        assert_eq!(filter.uniform_name(), "osgearthutil_u_cmyk_0");
        assert_eq!(
            filter.entry_point_function_name(),
            "osgearthutil_cmykColorFilter_0"
        );
    }

    #[test]
    fn cmyk_offset_round_trips() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let value = Vec4::new(0.1, -0.2, 1.5, 0.0);
        filter.set_cmyk_offset(value);
        assert_eq!(filter.cmyk_offset(), value);
    }

    #[test]
    fn rgbw_offset_is_negated_cmyk() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let value = Vec4::new(0.1, 0.2, -0.3, 0.4);
        filter.set_rgbw_offset(value);
        assert_eq!(filter.rgbw_offset(), value);
        assert_eq!(filter.cmyk_offset(), -value);
    }

    #[test]
    fn instances_get_distinct_names() {
        let counter = InstanceCounter::new();
        let first = CmykColorFilter::with_counter(&counter);
        let second = CmykColorFilter::with_counter(&counter);
        assert_ne!(first.instance_id(), second.instance_id());
        assert_ne!(first.uniform_name(), second.uniform_name());
        assert_ne!(
            first.entry_point_function_name(),
            second.entry_point_function_name()
        );
    }

    #[test]
    fn global_counter_instances_are_distinct() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                thread::spawn(|| {
                    (0..16)
                        .map(|_| CmykColorFilter::new().instance_id())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(ids.insert(id));
            }
        }
    }

    #[test]
    fn config_round_trip_preserves_values() {
        let counter = InstanceCounter::new();
        let input = Config::new(CMYK_FILTER_KEY)
            .with("c", 0.1)
            .with("m", 0.2)
            .with("y", 0.3)
            .with("k", 0.4);
        let filter = CmykColorFilter::from_config(&input, &counter);
        let output = filter.config();

        assert_eq!(output.key(), "cmyk");
        assert_eq!(output.value("c", f32::NAN), 0.1);
        assert_eq!(output.value("m", f32::NAN), 0.2);
        assert_eq!(output.value("y", f32::NAN), 0.3);
        assert_eq!(output.value("k", f32::NAN), 0.4);
        assert_eq!(output, input);

        let again = CmykColorFilter::from_config(&output, &counter);
        assert_eq!(again.config(), output);
    }

    #[test]
    fn missing_config_values_default_to_zero() {
        let config = Config::new(CMYK_FILTER_KEY).with("m", 0.5);
        let filter = CmykColorFilter::from_config(&config, &InstanceCounter::new());
        assert_eq!(filter.cmyk_offset(), Vec4::new(0.0, 0.5, 0.0, 0.0));
    }

    #[test]
    fn shader_source_substitutes_names() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let expected = "#version 110\n\
uniform vec4 osgearthutil_u_cmyk_0;\n\
void osgearthutil_cmykColorFilter_0(in int slot, inout vec4 color)\n\
{\n    if ((osgearthutil_u_cmyk_0.x != 0.0) || (osgearthutil_u_cmyk_0.y != 0.0) || (osgearthutil_u_cmyk_0.z != 0.0) || (osgearthutil_u_cmyk_0.w != 0.0))\n    {\n        color.rgb = clamp(color.rgb - osgearthutil_u_cmyk_0.xyz - osgearthutil_u_cmyk_0.w, 0.0, 1.0); \n    }\n}\n";
        assert_eq!(filter.shader_source(), expected);
        assert!(!filter.shader_source().contains("__"));
    }

    #[test]
    fn install_adds_uniform_and_fragment_shader() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let mut state = StateSet::with_program(VirtualProgram::new());
        filter.install(&mut state);

        assert!(Arc::ptr_eq(
            state.uniform(filter.uniform_name()).unwrap(),
            filter.uniform()
        ));
        let program = state.program().unwrap();
        let shader = program
            .shader(&filter.entry_point_function_name())
            .unwrap();
        assert_eq!(shader.stage, ShaderStage::Fragment);
        assert_eq!(shader.source, filter.shader_source());
    }

    #[test]
    fn install_twice_is_idempotent() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let mut state = StateSet::with_program(VirtualProgram::new());
        filter.install(&mut state);
        filter.install(&mut state);
        assert_eq!(state.uniform_count(), 1);
        assert_eq!(state.program().unwrap().len(), 1);
    }

    #[test]
    fn install_without_program_adds_uniform_only() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let mut state = StateSet::new();
        filter.install(&mut state);
        assert_eq!(state.uniform_count(), 1);
        assert!(state.program().is_none());
    }

    #[test]
    fn installed_uniform_tracks_later_changes() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let mut state = StateSet::new();
        filter.install(&mut state);
        filter.set_cmyk_offset(Vec4::new(0.0, 0.0, 0.0, 0.25));
        assert_eq!(
            state.uniform(filter.uniform_name()).unwrap().get(),
            Vec4::new(0.0, 0.0, 0.0, 0.25)
        );
    }

    #[test]
    fn zero_offset_leaves_color_unchanged() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        let color = Vec4::new(0.2, 0.5, 0.9, 0.7);
        assert_eq!(filter.apply(color), color);
    }

    #[test]
    fn cyan_offset_reduces_red() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        filter.set_cmyk_offset(Vec4::new(0.1, 0.0, 0.0, 0.0));
        let out = filter.apply(Vec4::new(0.5, 0.5, 0.05, 1.0));
        assert!(approx(out, Vec4::new(0.4, 0.5, 0.05, 1.0)), "{out:?}");
    }

    #[test]
    fn key_offset_reduces_every_channel_and_clamps() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        filter.set_cmyk_offset(Vec4::new(0.0, 0.0, 0.0, 0.1));
        let out = filter.apply(Vec4::new(0.5, 0.05, 1.0, 0.3));
        assert!(approx(out, Vec4::new(0.4, 0.0, 0.9, 0.3)), "{out:?}");
    }

    #[test]
    fn negative_offset_brightens_and_clamps() {
        let filter = CmykColorFilter::with_counter(&InstanceCounter::new());
        filter.set_rgbw_offset(Vec4::new(0.2, 0.0, 0.0, 0.0));
        let out = filter.apply(Vec4::new(0.9, 0.5, 0.5, 1.0));
        assert!(approx(out, Vec4::new(1.0, 0.5, 0.5, 1.0)), "{out:?}");
    }
}
