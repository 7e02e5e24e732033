//! Toolpath interpreter
//!
//! A small state machine that replays the positioning commands of a sliced
//! print and records, per tool, every run of consecutive extruding moves as a
//! [`Polyline`].
//!
//! Tracked state:
//! - logical position (as commanded) and the offset that `G92` introduces,
//!   so recorded physical positions stay continuous across redefinitions
//! - XYZE positioning mode (`G90`/`G91`) and the E-only override (`M82`/`M83`)
//! - active tool and, per included tool, an extrusion accumulator
//! - whether the current geometry class is filtered out

use std::io::BufRead;

use gcodeview_core::{
    Error, FilterOptions, GcodeError, Point, Polyline, Result, ToolPaths, ToolPolylines,
};
use tracing::{debug, trace};

use super::command::{parse_line, AxisWord, Command, FeatureType, Line};

/// How a commanded axis value combines with the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    /// Take the new value
    #[default]
    Absolute,
    /// Add the new value to the old one
    Relative,
}

impl Positioning {
    pub fn apply(self, current: f64, value: f64) -> f64 {
        match self {
            Self::Absolute => value,
            Self::Relative => current + value,
        }
    }
}

/// Counters reported once the stream is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterpreterStats {
    pub lines: u64,
    pub moves: u64,
    pub tool_changes: u64,
    pub ignored_commands: u64,
}

/// Line-by-line G-code interpreter.
#[derive(Debug, Clone)]
pub struct Interpreter {
    filter: FilterOptions,
    position: [f64; 4],
    offset: [f64; 4],
    positioning: Positioning,
    extruder_positioning: Positioning,
    active_tool: u8,
    highest_tool: u8,
    skipping: bool,
    /// Per include slot: extrusion accumulator
    extrusion: Vec<f64>,
    /// Per include slot: recorded polylines, the last one is still open
    buffers: Vec<Vec<Polyline>>,
    stats: InterpreterStats,
}

impl Interpreter {
    pub fn new(filter: &FilterOptions) -> Self {
        let slots = filter.tools.len();
        Self {
            filter: filter.clone(),
            position: [0.0; 4],
            offset: [0.0; 4],
            positioning: Positioning::Absolute,
            extruder_positioning: Positioning::Absolute,
            active_tool: 0,
            highest_tool: 0,
            skipping: false,
            extrusion: vec![0.0; slots],
            buffers: vec![vec![Polyline::new()]; slots],
            stats: InterpreterStats::default(),
        }
    }

    /// Logical (commanded) position.
    pub fn position(&self) -> Point {
        Point::from_axes(self.position)
    }

    /// Logical position plus the offsets introduced by `G92`.
    pub fn physical_position(&self) -> Point {
        let mut axes = self.position;
        for (axis, offset) in axes.iter_mut().zip(self.offset) {
            *axis += offset;
        }
        Point::from_axes(axes)
    }

    pub fn active_tool(&self) -> u8 {
        self.active_tool
    }

    pub fn stats(&self) -> InterpreterStats {
        self.stats
    }

    /// Consume one line. `line_number` is 1-based and only used in errors.
    pub fn feed_line(&mut self, line: &str, line_number: u64) -> std::result::Result<(), GcodeError> {
        if self.filter.tools.is_empty() {
            return Ok(());
        }
        self.stats.lines += 1;

        match parse_line(line, line_number)? {
            Line::Empty => {}
            Line::Feature(feature) => self.skipping = self.is_filtered(&feature),
            Line::Command(command) => self.execute(command),
        }
        Ok(())
    }

    fn is_filtered(&self, feature: &FeatureType) -> bool {
        (self.filter.ignore_support && feature.is_support())
            || (self.filter.ignore_infill && feature.is_infill())
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::SelectTool(tool) => {
                self.stats.tool_changes += 1;
                self.active_tool = tool;
                if self.filter.tools.contains(tool) {
                    self.highest_tool = self.highest_tool.max(tool);
                }
            }
            Command::AbsolutePositioning => {
                self.positioning = Positioning::Absolute;
                self.extruder_positioning = Positioning::Absolute;
            }
            Command::RelativePositioning => {
                self.positioning = Positioning::Relative;
                self.extruder_positioning = Positioning::Relative;
            }
            Command::AbsoluteExtrusion => self.extruder_positioning = Positioning::Absolute,
            Command::RelativeExtrusion => self.extruder_positioning = Positioning::Relative,
            Command::SetPosition(words) => self.set_position(&words),
            Command::Move(words) => self.linear_move(&words),
            Command::Other(word) => {
                self.stats.ignored_commands += 1;
                trace!("Ignoring command {}", word);
            }
        }
    }

    fn set_position(&mut self, words: &[AxisWord]) {
        for word in words {
            let i = word.axis.index();
            self.offset[i] += self.position[i] - word.value;
            self.position[i] = word.value;
        }
    }

    fn linear_move(&mut self, words: &[AxisWord]) {
        self.stats.moves += 1;
        let last_e = self.position[3];

        for word in words {
            let i = word.axis.index();
            let positioning = if i == 3 {
                self.extruder_positioning
            } else {
                self.positioning
            };
            self.position[i] = positioning.apply(self.position[i], word.value);
        }

        let Some(slot) = self.filter.tools.position(self.active_tool) else {
            return;
        };

        // Once a retraction drives the accumulator negative, priming moves
        // only count once they have cancelled the retraction out.
        let accumulated = &mut self.extrusion[slot];
        let base = if *accumulated > 0.0 { 0.0 } else { *accumulated };
        *accumulated = base + (self.position[3] - last_e);
        let extruding = *accumulated > 0.0;

        let point = self.physical_position();
        let lines = &mut self.buffers[slot];
        if !extruding {
            match lines.last_mut() {
                Some(open) if open.len() <= 1 => open.clear(),
                _ => lines.push(Polyline::new()),
            }
        }

        if !self.skipping {
            if let Some(open) = lines.last_mut() {
                open.push(point);
            }
        }
    }

    /// Finish the stream and collect the retained polylines.
    ///
    /// Single-point polylines are dropped, as are tools above the highest
    /// tool index that was selected.
    pub fn finish(self) -> ToolPaths {
        let highest_tool = self.highest_tool;
        let tools: Vec<ToolPolylines> = self
            .filter
            .tools
            .iter()
            .zip(self.buffers)
            .filter(|(tool, _)| *tool <= highest_tool)
            .map(|(tool, lines)| ToolPolylines {
                tool,
                polylines: lines.into_iter().filter(|line| line.len() >= 2).collect(),
            })
            .collect();

        let paths = ToolPaths::new(tools);
        debug!(
            "Interpreted {} lines: {} moves, {} tool changes, {} ignored commands, {} polylines over {} tools",
            self.stats.lines,
            self.stats.moves,
            self.stats.tool_changes,
            self.stats.ignored_commands,
            paths.polyline_count(),
            paths.len()
        );
        paths
    }
}

/// Interpret a complete in-memory toolpath.
pub fn interpret_lines<I, S>(lines: I, filter: &FilterOptions) -> Result<ToolPaths>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if filter.tools.is_empty() {
        return Ok(ToolPaths::default());
    }

    let mut interpreter = Interpreter::new(filter);
    for (index, line) in lines.into_iter().enumerate() {
        interpreter.feed_line(line.as_ref(), index as u64 + 1)?;
    }
    Ok(interpreter.finish())
}

/// Interpret a toolpath streamed from a buffered reader.
pub fn interpret_reader<R: BufRead>(reader: R, filter: &FilterOptions) -> Result<ToolPaths> {
    if filter.tools.is_empty() {
        return Ok(ToolPaths::default());
    }

    let mut interpreter = Interpreter::new(filter);
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(Error::from)?;
        interpreter.feed_line(&line, index as u64 + 1)?;
    }
    Ok(interpreter.finish())
}
