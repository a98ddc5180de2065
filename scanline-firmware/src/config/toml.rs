//! Minimal TOML parser for the video configuration
//!
//! Handles only the subset `video.toml` needs. It does NOT support the
//! full TOML spec.
//!
//! Supported features:
//! - `[section]` headers: `mode`, `horizontal`, `vertical`, `clock`
//! - `key = integer` pairs, with optional `_` digit separators
//! - Comments (`# ...`), including after a value
//!
//! Every section must appear. Keys that are left out keep the 640x480
//! defaults.

use heapless::String as HString;

use scanline_core::config::{AxisConfig, VideoConfig};

/// Longest integer literal accepted, separators included
const MAX_NUMBER_LEN: usize = 24;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not valid in its section, or outside any section
    UnknownKey,
    /// Value is not an integer in range
    InvalidValue,
    /// Line is neither a header nor a key/value pair
    InvalidLine,
    /// A required section never appeared
    MissingSection,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Mode,
    Horizontal,
    Vertical,
    Clock,
}

impl Section {
    fn bit(self) -> u8 {
        match self {
            Section::Root => 0,
            Section::Mode => 1 << 0,
            Section::Horizontal => 1 << 1,
            Section::Vertical => 1 << 2,
            Section::Clock => 1 << 3,
        }
    }
}

const ALL_SECTIONS: u8 = 0b1111;

/// Parse TOML configuration into a VideoConfig
pub fn parse_config(input: &str) -> Result<VideoConfig, ParseError> {
    let mut config = VideoConfig::default();
    let mut section = Section::Root;
    let mut seen = 0u8;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            seen |= section.bit();
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(&mut config, section, key, value)?;
    }

    if seen != ALL_SECTIONS {
        return Err(ParseError::MissingSection);
    }

    Ok(config)
}

/// Drop everything from the first `#`
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "mode" => Ok(Section::Mode),
        "horizontal" => Ok(Section::Horizontal),
        "vertical" => Ok(Section::Vertical),
        "clock" => Ok(Section::Clock),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse an integer value, allowing `_` between digits
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    if value.starts_with('_') || value.ends_with('_') {
        return Err(ParseError::InvalidValue);
    }

    let mut digits: HString<MAX_NUMBER_LEN> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }

    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn apply_axis_value(axis: &mut AxisConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "front_porch" => axis.front_porch = parse_int(value)?,
        "sync_pulse" => axis.sync_pulse = parse_int(value)?,
        "back_porch" => axis.back_porch = parse_int(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_value(
    config: &mut VideoConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Mode => match key {
            "width" => config.mode.width = parse_int(value)?,
            "height" => config.mode.height = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Horizontal => apply_axis_value(&mut config.horizontal, key, value)?,
        Section::Vertical => apply_axis_value(&mut config.vertical, key, value)?,
        Section::Clock => match key {
            "pixel_hz" => config.clock.pixel_hz = parse_int(value)?,
            "divider" => config.clock.divider = parse_int(value)?,
            "system_hz" => config.clock.system_hz = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
    }
    Ok(())
}
