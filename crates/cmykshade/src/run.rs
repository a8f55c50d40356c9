use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colorfilter::{
    CmykColorFilter, ColorFilterChain, ColorFilterRegistry, InstanceCounter, ShaderStage,
    StateSet, Vec4, VirtualProgram,
};
use filterconfig::{FilterDocument, Layer};
use tracing_subscriber::EnvFilter;

use crate::cli::{OutputFormat, PreviewArgs, RunArgs, SourceArgs};
use crate::report::LayerReport;

/// Layer name used when rendering a single `--cmyk` offset.
const INLINE_LAYER: &str = "default";

/// A layer's filter chain installed onto its own state set.
struct InstalledLayer {
    name: String,
    chain: ColorFilterChain,
    state: StateSet,
}

pub fn run(args: RunArgs) -> Result<()> {
    let registry = ColorFilterRegistry::with_builtin_filters(InstanceCounter::new());
    let chains = build_chains(&args.source, &registry)?;

    let layers: Vec<InstalledLayer> = chains
        .into_iter()
        .map(|(name, chain)| {
            let mut state = StateSet::with_program(VirtualProgram::new());
            chain.install(&mut state);
            tracing::debug!(
                layer = %name,
                filters = chain.len(),
                uniforms = state.uniform_count(),
                "installed layer filter chain"
            );
            InstalledLayer { name, chain, state }
        })
        .collect();

    if let Some(dir) = args.output_dir.as_ref() {
        let written = write_shader_files(dir, &layers)?;
        tracing::info!(count = written.len(), dir = %dir.display(), "wrote shader files");
        for path in written {
            println!("{}", path.display());
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Text => print_sources(&layers),
        OutputFormat::Json => print_json(&layers),
    }
}

pub fn preview(args: PreviewArgs) -> Result<()> {
    let registry = ColorFilterRegistry::with_builtin_filters(InstanceCounter::new());
    for (name, chain) in build_chains(&args.source, &registry)? {
        let color = chain.apply(args.color);
        tracing::debug!(layer = %name, input = ?args.color, output = ?color, "previewed layer");
        println!("{name} {}", format_color(color));
    }
    Ok(())
}

pub fn normalize(path: &Path) -> Result<()> {
    let registry = ColorFilterRegistry::with_builtin_filters(InstanceCounter::new());
    let mut document = load_document(path)?;

    for (name, layer) in document.layers.iter_mut() {
        let chain = ColorFilterChain::from_configs(&registry, &layer.filter_configs())
            .with_context(|| format!("failed to build filters for layer '{name}'"))?;
        let enabled = layer.enabled;
        *layer = Layer::from_configs(&chain.configs())
            .with_context(|| format!("failed to write filters for layer '{name}'"))?;
        layer.enabled = enabled;
    }

    print!("{}", document.to_toml_string()?);
    Ok(())
}

pub fn list_types() -> Result<()> {
    let registry = ColorFilterRegistry::with_builtin_filters(InstanceCounter::new());
    for key in registry.keys() {
        println!("{key}");
    }
    Ok(())
}

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_chains(
    args: &SourceArgs,
    registry: &ColorFilterRegistry,
) -> Result<Vec<(String, ColorFilterChain)>> {
    if let Some(offset) = args.cmyk {
        let filter = CmykColorFilter::with_counter(registry.counter());
        if args.rgbw {
            filter.set_rgbw_offset(offset);
        } else {
            filter.set_cmyk_offset(offset);
        }
        let mut chain = ColorFilterChain::new();
        chain.push(Arc::new(filter));
        return Ok(vec![(INLINE_LAYER.to_string(), chain)]);
    }

    let Some(path) = args.config.as_ref() else {
        bail!("either --config or --cmyk must be supplied");
    };
    let document = load_document(path)?;

    let selected: Vec<(&str, &Layer)> = match args.layer.as_deref() {
        Some(name) => {
            let layer = document
                .layer(name)
                .with_context(|| format!("layer '{name}' not found in {}", path.display()))?;
            if !layer.enabled {
                tracing::warn!(layer = name, "rendering disabled layer by explicit request");
            }
            vec![(name, layer)]
        }
        None => document.enabled_layers().collect(),
    };

    if selected.is_empty() {
        tracing::warn!(path = %path.display(), "document has no enabled layers");
    }

    selected
        .into_iter()
        .map(|(name, layer)| -> Result<(String, ColorFilterChain)> {
            let chain = ColorFilterChain::from_configs(registry, &layer.filter_configs())
                .with_context(|| format!("failed to build filters for layer '{name}'"))?;
            Ok((name.to_string(), chain))
        })
        .collect()
}

fn load_document(path: &Path) -> Result<FilterDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read filter document {}", path.display()))?;
    FilterDocument::from_toml_str(&text)
        .with_context(|| format!("failed to load filter document {}", path.display()))
}

fn format_color(color: Vec4) -> String {
    color
        .to_array()
        .iter()
        .map(|component| component.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fragment sources of `layer` in chain order.
fn fragment_sources(layer: &InstalledLayer) -> Vec<(String, &str)> {
    let Some(program) = layer.state.program() else {
        return Vec::new();
    };
    layer
        .chain
        .entry_points()
        .into_iter()
        .filter_map(|entry_point| {
            let shader = program.shader(&entry_point)?;
            (shader.stage == ShaderStage::Fragment)
                .then(|| (entry_point, shader.source.as_str()))
        })
        .collect()
}

fn print_sources(layers: &[InstalledLayer]) -> Result<()> {
    for layer in layers {
        println!("// layer: {}", layer.name);
        for (entry_point, source) in fragment_sources(layer) {
            println!("// entry point: {entry_point}");
            println!("{source}");
        }
    }
    Ok(())
}

fn print_json(layers: &[InstalledLayer]) -> Result<()> {
    let reports: Vec<LayerReport> = layers
        .iter()
        .map(|layer| LayerReport::collect(&layer.name, &layer.chain, &layer.state))
        .collect();
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}

fn write_shader_files(dir: &Path, layers: &[InstalledLayer]) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for layer in layers {
        let layer_dir = dir.join(&layer.name);
        fs::create_dir_all(&layer_dir)
            .with_context(|| format!("failed to create {}", layer_dir.display()))?;
        for (entry_point, source) in fragment_sources(layer) {
            let path = layer_dir.join(format!("{entry_point}.frag"));
            fs::write(&path, source)
                .with_context(|| format!("failed to write {}", path.display()))?;
            written.push(path);
        }
    }
    Ok(written)
}
