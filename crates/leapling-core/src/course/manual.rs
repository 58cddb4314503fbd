//! Parsing of hand-written obstacle lists
//!
//! Grammar: `entry (',' entry)*` where `entry = position ':' height` or a
//! bare `position`. Bad entries are reported individually so the caller
//! can skip them and keep the rest.

use thiserror::Error;

/// Height multiplier used when an entry omits it or it fails to parse
pub const DEFAULT_HEIGHT_MULTIPLIER: f32 = 1.5;

/// Manual positions must lie strictly inside `(MIN_POSITION, length - END_MARGIN)`
pub const MIN_POSITION: f32 = 50.0;
pub const END_MARGIN: f32 = 40.0;

/// One accepted manual entry, before difficulty scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualEntry {
    pub position: f32,
    pub height_multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManualSpecError {
    #[error("empty entry")]
    Empty,
    #[error("invalid position '{0}'")]
    InvalidPosition(String),
    #[error("position {position} outside ({min}, {max})")]
    OutOfBounds { position: f32, min: f32, max: f32 },
}

/// Parse a single `position[:height]` entry
pub fn parse_entry(entry: &str, course_length: f32) -> Result<ManualEntry, ManualSpecError> {
    let entry = entry.trim();
    if entry.is_empty() {
        return Err(ManualSpecError::Empty);
    }

    let (position_text, height_text) = match entry.split_once(':') {
        Some((position, height)) => (position.trim(), Some(height.trim())),
        None => (entry, None),
    };

    let position = position_text
        .parse::<f32>()
        .ok()
        .filter(|p| p.is_finite())
        .ok_or_else(|| ManualSpecError::InvalidPosition(position_text.to_string()))?;

    let max = course_length - END_MARGIN;
    if position <= MIN_POSITION || position >= max {
        return Err(ManualSpecError::OutOfBounds {
            position,
            min: MIN_POSITION,
            max,
        });
    }

    let height_multiplier = height_text
        .and_then(|h| h.parse::<f32>().ok())
        .filter(|h| h.is_finite())
        .unwrap_or(DEFAULT_HEIGHT_MULTIPLIER);

    Ok(ManualEntry {
        position,
        height_multiplier,
    })
}

/// Parse a whole obstacle list, dropping unusable entries
pub fn parse_manual_spec(spec: &str, course_length: f32) -> Vec<ManualEntry> {
    spec.split(',')
        .filter_map(|entry| match parse_entry(entry, course_length) {
            Ok(parsed) => Some(parsed),
            Err(ManualSpecError::Empty) => None,
            Err(e) => {
                log::debug!("Skipping manual obstacle entry '{}': {}", entry.trim(), e);
                None
            }
        })
        .collect()
}
