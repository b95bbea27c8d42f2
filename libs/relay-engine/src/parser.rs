use serde::Deserialize;

use relay_api::Record;

use crate::error::ParseError;

/// Positions of the fields inside the firmware status report.
///
/// The report is a fixed multi-line text; fields are taken by line index
/// (0-based). Defaults match the RoomSensor firmware:
///
/// ```text
/// 0  RoomSensor Broadcasting
/// 1  Location:Teachers room                       -> location (whole line)
/// 2  Platform: ...
/// 3  Machine:armv6l                               -> machine name (whole line)
/// 4..6  sensor values
/// 7  Movement last detected: 2015-11-26 08:05:56  -> movement, after 24 chars
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayloadLayout {
    pub location_line: usize,
    pub machine_line: usize,
    pub movement_line: usize,
    /// Characters (not bytes) stripped from the start of the movement line.
    pub movement_offset: usize,
}

impl Default for PayloadLayout {
    fn default() -> Self {
        Self {
            location_line: 1,
            machine_line: 3,
            movement_line: 7,
            movement_offset: 24,
        }
    }
}

impl PayloadLayout {
    /// Minimum number of lines a payload must have.
    pub fn required_lines(&self) -> usize {
        self.location_line.max(self.machine_line).max(self.movement_line) + 1
    }

    /// Extract a `Record` from one broadcast payload.
    ///
    /// Lines are split on `'\n'` only; location and machine name are
    /// taken verbatim, labels included.
    pub fn parse(&self, raw: &str) -> Result<Record, ParseError> {
        let lines: Vec<&str> = raw.split('\n').collect();
        let required = self.required_lines();
        if lines.len() < required {
            return Err(ParseError::TooFewLines { lines: lines.len(), required });
        }

        let movement_line = lines[self.movement_line];
        let movement = strip_chars(movement_line, self.movement_offset).ok_or_else(|| {
            ParseError::LineTooShort {
                line: self.movement_line,
                chars: movement_line.chars().count(),
                offset: self.movement_offset,
            }
        })?;

        let location = non_empty(lines[self.location_line], "location")?;
        let machine_name = non_empty(lines[self.machine_line], "machine name")?;
        let movement = non_empty(movement, "movement detected")?;

        Ok(Record::new(location, machine_name, movement))
    }
}

/// Parse with the default firmware layout.
pub fn parse(raw: &str) -> Result<Record, ParseError> {
    PayloadLayout::default().parse(raw)
}

/// `line` without its first `n` characters; `None` if it is shorter than `n`.
fn strip_chars(line: &str, n: usize) -> Option<&str> {
    if n == 0 {
        return Some(line);
    }
    match line.char_indices().nth(n) {
        Some((idx, _)) => Some(&line[idx..]),
        None if line.chars().count() == n => Some(""),
        None => None,
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        Err(ParseError::EmptyField { field })
    } else {
        Ok(value)
    }
}
