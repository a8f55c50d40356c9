use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colorfilter::Vec4;

#[derive(Parser, Debug)]
#[command(
    name = "cmykshade",
    author,
    version,
    about = "CMYK color filter shader generator",
    arg_required_else_help = false,
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Where the filter chains come from: a document or a single inline offset.
#[derive(Parser, Debug)]
pub struct SourceArgs {
    /// Filter document (TOML) listing each layer's color filters.
    #[arg(long, short, value_name = "FILE", conflicts_with = "cmyk")]
    pub config: Option<PathBuf>,

    /// Use a single filter with this offset instead of a document (`c,m,y,k`).
    #[arg(
        long,
        value_name = "C,M,Y,K",
        value_parser = parse_offset,
        allow_hyphen_values = true
    )]
    pub cmyk: Option<Vec4>,

    /// Treat the `--cmyk` offset as an RGBW offset (the negated CMYK offset).
    #[arg(long, requires = "cmyk")]
    pub rgbw: bool,

    /// Only use the named layer from the document.
    #[arg(long, value_name = "NAME", requires = "config")]
    pub layer: Option<String>,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write one `.frag` file per shader function under `DIR/<layer>/` instead of printing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format on stdout: `text` (shader sources) or `json` (state summary).
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild a filter document through the filter registry and print it.
    Normalize(NormalizeArgs),
    /// Print the color each layer's filter chain produces for an input color.
    Preview(PreviewArgs),
    /// List the registered color filter types.
    Types,
}

#[derive(Parser, Debug)]
pub struct NormalizeArgs {
    /// Filter document (TOML) to normalize.
    #[arg(value_name = "FILE")]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Input color (`r,g,b,a`).
    #[arg(long, value_name = "R,G,B,A", value_parser = parse_color)]
    pub color: Vec4,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_offset(value: &str) -> Result<Vec4, String> {
    parse_components(value, "offset")
}

pub fn parse_color(value: &str) -> Result<Vec4, String> {
    parse_components(value, "color")
}

fn parse_components(value: &str, what: &str) -> Result<Vec4, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{what} must not be empty"));
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!(
            "expected four comma-separated components, got {}",
            parts.len()
        ));
    }

    let mut components = [0.0_f32; 4];
    for (slot, part) in components.iter_mut().zip(&parts) {
        let parsed = part
            .parse::<f32>()
            .map_err(|_| format!("invalid {what} component '{part}'"))?;
        if !parsed.is_finite() {
            return Err(format!("{what} component '{part}' must be finite"));
        }
        *slot = parsed;
    }
    Ok(Vec4::from_array(components))
}
