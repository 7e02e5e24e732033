//! End-to-end conversions from G-code lines to visualization documents.
//!
//! Every function here is synchronous and self-contained, so independent
//! conversions can run on separate threads. The only shared state is the
//! process-wide [`TopologyCache`].

use std::io::Write;

use gcodeview_core::{ConversionOptions, OutputFormat, Result, ToolPaths};
use tracing::info;

use crate::gcode::interpret_lines;
use crate::geometry::Simplifier;
use crate::layers::LayerDocument;
use crate::mesh::{obj_to_string, write_obj, Mesh, MeshBuilder, TopologyCache};

/// Interpret and simplify: the polylines every output format starts from.
pub fn extract_tool_paths<I, S>(lines: I, options: &ConversionOptions) -> Result<ToolPaths>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths = interpret_lines(lines, &options.filter)?;
    Simplifier::new(options.simplify).simplify_tool_paths(&mut paths);
    Ok(paths)
}

/// Layer document for a toolpath.
pub fn gcode_to_layers<I, S>(lines: I, options: &ConversionOptions) -> Result<LayerDocument>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if options.filter.tools.is_empty() {
        return Ok(LayerDocument::empty());
    }
    let paths = extract_tool_paths(lines, options)?;
    Ok(LayerDocument::build(&paths, &options.layers))
}

/// Layer document as compact JSON.
pub fn gcode_to_json<I, S>(lines: I, options: &ConversionOptions) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    gcode_to_layers(lines, options)?.to_json()
}

/// Layer document as compact JSON, written into `writer`.
pub fn write_gcode_json<I, S, W>(lines: I, options: &ConversionOptions, writer: W) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write,
{
    gcode_to_layers(lines, options)?.write_json(writer)
}

/// Ribbon mesh for a toolpath, sharing the process-wide topology cache.
pub fn gcode_to_mesh<I, S>(lines: I, options: &ConversionOptions) -> Result<Mesh>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    gcode_to_mesh_with_cache(lines, options, TopologyCache::global())
}

/// Ribbon mesh for a toolpath using a caller-owned topology cache.
pub fn gcode_to_mesh_with_cache<I, S>(
    lines: I,
    options: &ConversionOptions,
    cache: &TopologyCache,
) -> Result<Mesh>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let paths = extract_tool_paths(lines, options)?;
    MeshBuilder::with_cache(options.mesh, cache).build(&paths)
}

/// Ribbon mesh as OBJ text. No geometry yields an empty string.
pub fn gcode_to_obj<I, S>(lines: I, options: &ConversionOptions) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(obj_to_string(&gcode_to_mesh(lines, options)?))
}

/// Ribbon mesh as OBJ text, written into `writer`.
pub fn write_gcode_obj<I, S, W>(lines: I, options: &ConversionOptions, writer: W) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    W: Write,
{
    write_obj(&gcode_to_mesh(lines, options)?, writer)
}

/// Render a complete G-code text in the requested format.
pub fn convert(source: &str, format: OutputFormat, options: &ConversionOptions) -> Result<String> {
    let document = match format {
        OutputFormat::Json => gcode_to_json(source.lines(), options)?,
        OutputFormat::Obj => gcode_to_obj(source.lines(), options)?,
    };
    info!(
        "Converted {} bytes of G-code into {} bytes of {}",
        source.len(),
        document.len(),
        format
    );
    Ok(document)
}
