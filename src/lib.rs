//! # GCodeView
//!
//! Converts sliced 3D printer G-code into lightweight visualization documents:
//! - A per-layer JSON document of the 2D extrusion paths of every tool
//! - A Wavefront OBJ ribbon mesh of the same paths
//!
//! ## Architecture
//!
//! GCodeView is organized as a workspace with multiple crates:
//!
//! 1. **gcodeview-core** - Data model, conversion options, error types
//! 2. **gcodeview-settings** - Configuration files and flag parsing
//! 3. **gcodeview-visualizer** - Interpreter, simplifier, layer and mesh output, worker pool
//! 4. **gcodeview** - Command line binary that integrates all crates

pub mod cli;

pub use gcodeview_core::{
    ConversionOptions, Error, FilterOptions, GcodeError, LayerOptions, LineHeight, MeshOptions,
    OutputFormat, Point, Polyline, Result, SimplifyTolerances, ToolPaths, ToolPolylines, ToolSet,
};

pub use gcodeview_settings::{parse_bool, Config, ConfigError, PoolSettings, SettingsError};

pub use gcodeview_visualizer::{
    convert, gcode_to_json, gcode_to_layers, gcode_to_mesh, gcode_to_obj, interpret_lines,
    interpret_reader, write_gcode_json, write_gcode_obj, ConversionJob, ConversionPool,
    GcodeFileReader, Interpreter, LayerDocument, Mesh, MeshBuilder, Simplifier, TopologyCache,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging
///
/// Sets up structured logging with:
/// - Output on stderr, so documents written to stdout stay clean
/// - RUST_LOG environment variable support
/// - `info` by default, `debug` when `verbose` is set
/// - JSON lines instead of human-readable output when `json` is set
pub fn init_logging(verbose: bool, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .with_thread_names(verbose)
            .with_line_number(verbose);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
