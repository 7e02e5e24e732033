//! Command line interface
//!
//! Usage:
//!   gcodeview print.gcode
//!   gcodeview print.gcode --format obj --line-height layer
//!   gcodeview a.gcode b.gcode --tools 1,0 --support yes --jobs 4
//!   gcodeview print.gcode --config gcodeview.toml -o preview.json

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use clap::Parser;
use gcodeview_core::constants::INFILL_AUTO_LIMIT_BYTES;
use gcodeview_core::{ConversionOptions, LineHeight, OutputFormat, ToolSet};
use gcodeview_settings::{parse_bool, Config};
use gcodeview_visualizer::{ConversionPool, FileConversionJob, GcodeFileReader};
use tracing::{debug, error, info};

/// Convert 3D printer G-code into per-layer JSON line documents or OBJ meshes
#[derive(Parser, Debug)]
#[command(name = "gcodeview")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// G-code files to convert
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,

    /// Output file (only with a single input)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Configuration file (JSON or TOML); defaults to the user config if present
    #[arg(short, long, value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Tools to render, in output order (e.g. `1,0`)
    #[arg(long, value_delimiter = ',')]
    pub tools: Option<Vec<u8>>,

    /// Render infill; decided by file size when omitted
    #[arg(long, value_parser = parse_flag)]
    pub infill: Option<bool>,

    /// Render skirt, support and prime tower; hidden when omitted
    #[arg(long, value_parser = parse_flag)]
    pub support: Option<bool>,

    /// X offset of the second tool in the JSON document (mm)
    #[arg(long)]
    pub separation: Option<f64>,

    /// Ribbon width in the OBJ mesh (mm)
    #[arg(long)]
    pub line_width: Option<f64>,

    /// Ribbon height in the OBJ mesh: a height in mm or `layer`
    #[arg(long, value_parser = parse_line_height)]
    pub line_height: Option<LineHeight>,

    /// Maximum number of files converted at once
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Convert even if the output is newer than the input
    #[arg(long)]
    pub force: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_flag(value: &str) -> std::result::Result<bool, String> {
    parse_bool(value).map_err(|e| e.to_string())
}

/// `layer` or a positive height in mm.
pub fn parse_line_height(value: &str) -> std::result::Result<LineHeight, String> {
    if value.trim().eq_ignore_ascii_case("layer") {
        return Ok(LineHeight::Layer);
    }
    match value.trim().parse::<f64>() {
        Ok(height) if height > 0.0 => Ok(LineHeight::Fixed(height)),
        Ok(_) => Err(format!("line height must be > 0: {}", value)),
        Err(e) => Err(format!("invalid line height '{}': {}", value, e)),
    }
}

/// Whether infill is rendered: the explicit flag, else the config, else
/// only for inputs below the auto limit.
pub fn render_infill(flag: Option<bool>, config: &Config, file_size: u64) -> bool {
    match flag {
        Some(render) => render,
        None if config.filter.ignore_infill => false,
        None => file_size < INFILL_AUTO_LIMIT_BYTES,
    }
}

/// Whether support is rendered: only when explicitly requested.
pub fn render_support(flag: Option<bool>) -> bool {
    flag.unwrap_or(false)
}

/// `<stem>[_no_infill][_support].<ext>` next to the input.
pub fn default_output_path(
    input: &Path,
    format: OutputFormat,
    infill: bool,
    support: bool,
) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    if !infill {
        name.push_str("_no_infill");
    }
    if support {
        name.push_str("_support");
    }
    name.push('.');
    name.push_str(format.extension());
    input.with_file_name(name)
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// True when `output` exists and is at least as new as `input`.
pub fn is_up_to_date(input: &Path, output: &Path) -> bool {
    match (modified(input), modified(output)) {
        (Some(input), Some(output)) => output >= input,
        _ => false,
    }
}

/// Configuration with command line overrides applied.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    if let Some(tools) = &cli.tools {
        config.filter.tools = ToolSet::new(tools.iter().copied())?;
    }
    if let Some(separation) = cli.separation {
        config.layers.extruder_separation = separation;
    }
    if let Some(width) = cli.line_width {
        config.mesh.line_width = width;
    }
    if let Some(height) = cli.line_height {
        config.mesh.line_height = height;
    }
    if let Some(jobs) = cli.jobs {
        config.pool.workers = jobs;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// One input file and where its document goes.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    pub input: PathBuf,
    pub output: PathBuf,
    pub options: ConversionOptions,
}

/// Resolve per-file options and output paths.
pub fn plan(cli: &Cli, config: &Config) -> Result<Vec<ConversionTask>> {
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output can only be used with a single input file");
    }

    cli.inputs
        .iter()
        .map(|input| -> Result<ConversionTask> {
            let reader = GcodeFileReader::new(input)?;
            let infill = render_infill(cli.infill, config, reader.file_size());
            let support = render_support(cli.support);

            let mut options = config.conversion_options();
            options.filter.ignore_infill = !infill;
            options.filter.ignore_support = !support;

            let output = cli
                .output
                .clone()
                .unwrap_or_else(|| default_output_path(input, cli.format, infill, support));

            Ok(ConversionTask {
                input: input.clone(),
                output,
                options,
            })
        })
        .collect()
}

/// Convert every input and write the documents.
pub async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let tasks = plan(&cli, &config)?;

    let (fresh, pending): (Vec<_>, Vec<_>) = tasks
        .into_iter()
        .partition(|task| !cli.force && is_up_to_date(&task.input, &task.output));
    for task in &fresh {
        info!("{} is up to date", task.output.display());
    }
    if pending.is_empty() {
        return Ok(());
    }

    let jobs: Vec<FileConversionJob> = pending
        .iter()
        .map(|task| {
            FileConversionJob::new(
                &task.input,
                &task.output,
                cli.format,
                task.options.clone(),
            )
        })
        .collect();

    let pool = ConversionPool::new(config.pool.workers);
    debug!(
        "Converting {} files with {} workers",
        jobs.len(),
        pool.workers()
    );
    let results = pool.convert_files(jobs).await;

    let mut failures = 0;
    for (task, result) in pending.iter().zip(results) {
        match result {
            Ok(bytes) => info!("Wrote {} ({} bytes)", task.output.display(), bytes),
            Err(e) => {
                error!("Failed to convert {}: {}", task.input.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} conversions failed", failures, pending.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "gcodeview",
            "a.gcode",
            "--format",
            "obj",
            "--tools",
            "1,0",
            "--infill",
            "no",
            "--support",
            "Y",
            "--line-height",
            "layer",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Obj);
        assert_eq!(cli.tools, Some(vec![1, 0]));
        assert_eq!(cli.infill, Some(false));
        assert_eq!(cli.support, Some(true));
        assert_eq!(cli.line_height, Some(LineHeight::Layer));
    }

    #[test]
    fn test_invalid_flag_value() {
        assert!(Cli::try_parse_from(["gcodeview", "a.gcode", "--infill", "maybe"]).is_err());
        assert!(Cli::try_parse_from(["gcodeview"]).is_err());
    }

    #[test]
    fn test_line_height_values() {
        assert_eq!(parse_line_height("0.3"), Ok(LineHeight::Fixed(0.3)));
        assert_eq!(parse_line_height("Layer"), Ok(LineHeight::Layer));
        assert!(parse_line_height("0").is_err());
        assert!(parse_line_height("tall").is_err());
    }

    #[test]
    fn test_default_output_names() {
        let input = Path::new("/prints/benchy.gcode");
        assert_eq!(
            default_output_path(input, OutputFormat::Json, true, false),
            PathBuf::from("/prints/benchy.json")
        );
        assert_eq!(
            default_output_path(input, OutputFormat::Obj, false, true),
            PathBuf::from("/prints/benchy_no_infill_support.obj")
        );
    }

    #[test]
    fn test_infill_auto_decision() {
        let config = Config::default();
        assert!(render_infill(None, &config, 1024));
        assert!(!render_infill(None, &config, INFILL_AUTO_LIMIT_BYTES));
        assert!(render_infill(Some(true), &config, INFILL_AUTO_LIMIT_BYTES * 2));

        let mut config = Config::default();
        config.filter.ignore_infill = true;
        assert!(!render_infill(None, &config, 1024));
    }

    #[test]
    fn test_support_hidden_unless_requested() {
        assert!(!render_support(None));
        assert!(!render_support(Some(false)));
        assert!(render_support(Some(true)));

        let cli = Cli::try_parse_from(["gcodeview", "a.gcode"]).unwrap();
        assert_eq!(cli.support, None);
    }

    #[test]
    fn test_output_only_for_single_input() {
        let cli = Cli::try_parse_from(["gcodeview", "a.gcode", "b.gcode", "-o", "out.json"])
            .unwrap();
        assert!(plan(&cli, &Config::default()).is_err());
    }
}
