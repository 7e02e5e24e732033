//! G-Code tokenizer and toolpath interpreter
//!
//! This module provides:
//! - Line classification (blank, `;TYPE:` feature comment, command)
//! - Positioning and extrusion state tracking
//! - Per-tool polyline extraction with support/infill filtering

pub mod command;
pub mod interpreter;

pub use command::{parse_line, Axis, AxisWord, Command, FeatureType, Line};
pub use interpreter::{interpret_lines, interpret_reader, Interpreter, InterpreterStats, Positioning};
