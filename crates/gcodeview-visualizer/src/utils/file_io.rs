//! G-code file reading
//!
//! Streams large toolpath files line by line through a buffered reader
//! instead of loading them into memory, feeds them to the interpreter and
//! writes the rendered document straight into an output file.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use gcodeview_core::{ConversionOptions, FilterOptions, OutputFormat, ToolPaths};
use tracing::{debug, info};

use crate::gcode::Interpreter;
use crate::geometry::Simplifier;
use crate::layers::LayerDocument;
use crate::mesh::{write_obj, MeshBuilder};

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// File read statistics
#[derive(Debug, Clone, PartialEq)]
pub struct FileReadStats {
    /// Total bytes read, counting one newline per line
    pub bytes_read: u64,
    /// Total lines read
    pub lines_read: u64,
    /// File size in bytes
    pub file_size: u64,
    /// Time taken to read (milliseconds)
    pub read_time_ms: u64,
}

/// G-code file reader with streaming support
#[derive(Debug, Clone)]
pub struct GcodeFileReader {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFileReader {
    /// Create a new G-code file reader
    ///
    /// # Errors
    /// Returns error if the path does not exist or is not a regular file
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {}", path.display()));
        }

        if !path.is_file() {
            return Err(anyhow!("Path is not a file: {}", path.display()));
        }

        let file_size = fs::metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();

        Ok(Self { path, file_size })
    }

    /// Get file size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Get file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stream the file line by line into `callback`, which receives the
    /// line and its 1-based line number.
    pub fn read_lines<F>(&self, mut callback: F) -> Result<FileReadStats>
    where
        F: FnMut(&str, u64) -> Result<()>,
    {
        let start = Instant::now();
        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

        let mut lines_read = 0u64;
        let mut bytes_read = 0u64;

        for line in reader.lines() {
            let line = line.with_context(|| format!("Failed to read {}", self.path.display()))?;
            lines_read += 1;
            bytes_read += line.len() as u64 + 1;
            callback(&line, lines_read)?;
        }

        Ok(FileReadStats {
            bytes_read,
            lines_read,
            file_size: self.file_size,
            read_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Interpret the file without loading it into memory.
    pub fn interpret(&self, filter: &FilterOptions) -> Result<ToolPaths> {
        if filter.tools.is_empty() {
            return Ok(ToolPaths::default());
        }

        let mut interpreter = Interpreter::new(filter);
        let stats = self.read_lines(|line, line_number| {
            interpreter
                .feed_line(line, line_number)
                .with_context(|| format!("Invalid G-code in {}", self.path.display()))
        })?;

        debug!(
            "Read {} lines ({} bytes) from {} in {}ms",
            stats.lines_read,
            stats.bytes_read,
            self.path.display(),
            stats.read_time_ms
        );
        Ok(interpreter.finish())
    }

    /// Interpret and simplify the file.
    pub fn tool_paths(&self, options: &ConversionOptions) -> Result<ToolPaths> {
        let mut paths = self.interpret(&options.filter)?;
        Simplifier::new(options.simplify).simplify_tool_paths(&mut paths);
        Ok(paths)
    }

    /// Render the file as `format` into `output` and return the number of
    /// bytes written. `output` is only created once the input has been
    /// interpreted, so invalid G-code leaves no file behind.
    pub fn render_to_file(
        &self,
        format: OutputFormat,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<u64> {
        let paths = self.tool_paths(options)?;
        let create = || {
            File::create(output).with_context(|| format!("Failed to create {}", output.display()))
        };

        match format {
            OutputFormat::Json => {
                let document = LayerDocument::build(&paths, &options.layers);
                let mut writer = BufWriter::new(create()?);
                document.write_json(&mut writer)?;
                writer
                    .flush()
                    .with_context(|| format!("Failed to write {}", output.display()))?;
            }
            OutputFormat::Obj => {
                let mesh = MeshBuilder::new(options.mesh).build(&paths)?;
                write_obj(&mesh, create()?)?;
            }
        }

        let written = fs::metadata(output)
            .with_context(|| format!("Failed to stat {}", output.display()))?
            .len();
        info!(
            "Converted {} ({} bytes) into {} bytes of {}",
            self.path.display(),
            self.file_size,
            written,
            format
        );
        Ok(written)
    }
}
