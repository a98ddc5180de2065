//! Configuration loading and parsing
//!
//! The video configuration is compiled into the firmware from
//! `video.toml` and parsed once at startup by a custom no_std parser.

pub mod toml;

pub use toml::{parse_config, ParseError};

/// Embedded configuration (compiled into firmware)
/// Edit video.toml and rebuild to customize
pub const EMBEDDED_CONFIG: &str = include_str!("../../video.toml");
