//! Duration cells
//!
//! Delays and timeouts are written either as seconds (`90`, `2.5`)
//! or as clock time (`MM:SS`, `HH:MM:SS`).

use crate::number::parse_number;
use thiserror::Error;

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SecondsError {
    #[error("Empty duration")]
    Empty,

    #[error("Invalid duration '{0}', expected seconds or HH:MM:SS")]
    Format(String),

    #[error("Negative duration '{0}'")]
    Negative(String),
}

/// Parse seconds from `"10"`, `"2.5"`, `"01:30"` or `"00:05:00"`
pub fn parse_seconds(text: &str) -> Result<f64, SecondsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SecondsError::Empty);
    }

    let seconds = if text.contains(':') {
        parse_clock(text)?
    } else {
        parse_number(text).ok_or_else(|| SecondsError::Format(text.to_string()))?
    };

    if seconds < 0.0 {
        return Err(SecondsError::Negative(text.to_string()));
    }
    Ok(seconds)
}

/// `MM:SS` or `HH:MM:SS`, the last field may be fractional
fn parse_clock(text: &str) -> Result<f64, SecondsError> {
    let invalid = || SecondsError::Format(text.to_string());
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid()),
    };

    let hours: u64 = hours.parse().map_err(|_| invalid())?;
    let minutes: u64 = minutes.parse().map_err(|_| invalid())?;
    let seconds = parse_number(seconds).ok_or_else(invalid)?;
    if seconds < 0.0 {
        return Err(SecondsError::Negative(text.to_string()));
    }

    Ok(hours as f64 * SECONDS_PER_HOUR + minutes as f64 * SECONDS_PER_MINUTE + seconds)
}
