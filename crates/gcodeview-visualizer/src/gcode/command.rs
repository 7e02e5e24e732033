//! Line tokenizer for the slicer G-code dialect
//!
//! Turns one raw line into a [`Line`]: nothing to do, a geometry class
//! announcement (`;TYPE:` comment), or a [`Command`] the interpreter acts on.

use std::sync::OnceLock;

use gcodeview_core::constants::MAX_TOOL_INDEX;
use gcodeview_core::GcodeError;
use regex::Regex;

/// Machine axis addressed by a parameter word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
    E,
}

impl Axis {
    /// Index into an `[x, y, z, e]` array.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
            Self::E => 3,
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            'E' => Some(Self::E),
            _ => None,
        }
    }
}

/// A parsed `<axis><value>` parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisWord {
    pub axis: Axis,
    pub value: f64,
}

/// Geometry class announced by a `;TYPE:<NAME>` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureType {
    Skirt,
    Support,
    SupportInterface,
    PrimeTower,
    Fill,
    /// Walls, skin and anything else the filters never drop
    Other(String),
}

impl FeatureType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "SKIRT" => Self::Skirt,
            "SUPPORT" => Self::Support,
            "SUPPORT-INTERFACE" => Self::SupportInterface,
            "PRIME-TOWER" => Self::PrimeTower,
            "FILL" => Self::Fill,
            other => Self::Other(other.to_string()),
        }
    }

    /// Skirt, support, support interface and prime tower all count as support.
    pub fn is_support(&self) -> bool {
        matches!(
            self,
            Self::Skirt | Self::Support | Self::SupportInterface | Self::PrimeTower
        )
    }

    pub fn is_infill(&self) -> bool {
        matches!(self, Self::Fill)
    }
}

/// Interpreter-relevant commands. Everything else maps to [`Command::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `T<n>`
    SelectTool(u8),
    /// `G90`: absolute positioning for X, Y, Z and E
    AbsolutePositioning,
    /// `G91`: relative positioning for X, Y, Z and E
    RelativePositioning,
    /// `M82`: absolute positioning for E only
    AbsoluteExtrusion,
    /// `M83`: relative positioning for E only
    RelativeExtrusion,
    /// `G92`: redefine the current logical position
    SetPosition(Vec<AxisWord>),
    /// `G0` / `G1`: linear move
    Move(Vec<AxisWord>),
    /// Any other command word, kept for tracing
    Other(String),
}

/// Classification of a single input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    /// Blank or comment-only
    Empty,
    Feature(FeatureType),
    Command(Command),
}

fn feature_regex() -> &'static Regex {
    static FEATURE_REGEX: OnceLock<Regex> = OnceLock::new();
    FEATURE_REGEX.get_or_init(|| Regex::new(r"^\s*;TYPE:(.*)$").expect("invalid regex pattern"))
}

/// Parse one line. `line_number` is 1-based and only used for error reporting.
///
/// Only X/Y/Z/E parameters of `G0`, `G1` and `G92` are parsed as numbers;
/// a malformed value there is an error. Other words are ignored.
pub fn parse_line(line: &str, line_number: u64) -> Result<Line, GcodeError> {
    if let Some(captures) = feature_regex().captures(line) {
        let name = captures.get(1).map_or("", |m| m.as_str()).trim();
        return Ok(Line::Feature(FeatureType::from_name(name)));
    }

    let code = line.split(';').next().unwrap_or_default().trim();
    let mut words = code.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(Line::Empty);
    };

    let word = word.to_ascii_uppercase();
    let command = match word.as_str() {
        "G0" | "G00" | "G1" | "G01" => Command::Move(parse_axis_words(words, line_number)?),
        "G92" => Command::SetPosition(parse_axis_words(words, line_number)?),
        "G90" => Command::AbsolutePositioning,
        "G91" => Command::RelativePositioning,
        "M82" => Command::AbsoluteExtrusion,
        "M83" => Command::RelativeExtrusion,
        _ => match parse_tool(&word) {
            Some(tool) => Command::SelectTool(tool),
            None => Command::Other(word),
        },
    };

    Ok(Line::Command(command))
}

/// `T0`..`T6`; anything else (including `T7`, `T`, `T01`) is not a tool select.
fn parse_tool(word: &str) -> Option<u8> {
    let digits = word.strip_prefix('T')?;
    let mut chars = digits.chars();
    let tool = chars.next()?.to_digit(10)?;
    if chars.next().is_some() {
        return None;
    }
    u8::try_from(tool).ok().filter(|&t| t <= MAX_TOOL_INDEX)
}

fn parse_axis_words<'a>(
    words: impl Iterator<Item = &'a str>,
    line_number: u64,
) -> Result<Vec<AxisWord>, GcodeError> {
    let mut parsed = Vec::new();
    for word in words {
        let mut chars = word.chars();
        let Some(axis) = chars.next().and_then(Axis::from_letter) else {
            continue;
        };
        let raw = chars.as_str();
        let value = raw
            .parse::<f64>()
            .map_err(|e| GcodeError::InvalidParameter {
                line_number,
                param: word.to_string(),
                reason: e.to_string(),
            })?;
        parsed.push(AxisWord { axis, value });
    }
    Ok(parsed)
}
