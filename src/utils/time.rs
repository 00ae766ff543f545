//! Time parsing and formatting utilities

use crate::error::{SliceError, SliceResult};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Millisecond <-> timecode conversion
pub struct TimeCode;

impl TimeCode {
    /// Format milliseconds as `HH:MM:SS`, truncating the sub-second part
    pub fn format_hms(ms: u64) -> String {
        let hours = ms / MS_PER_HOUR;
        let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
        let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }

    /// Format milliseconds for an encoder argument.
    ///
    /// Whole seconds render as `HH:MM:SS`; anything else keeps the
    /// millisecond part as `HH:MM:SS.mmm` so seeks stay exact.
    pub fn format_arg(ms: u64) -> String {
        let millis = ms % MS_PER_SECOND;
        if millis == 0 {
            Self::format_hms(ms)
        } else {
            format!("{}.{:03}", Self::format_hms(ms), millis)
        }
    }

    /// Format milliseconds as plain seconds (`30`, `2.5`)
    pub fn format_seconds(ms: u64) -> String {
        let whole = ms / MS_PER_SECOND;
        let millis = ms % MS_PER_SECOND;
        if millis == 0 {
            whole.to_string()
        } else {
            let fraction = format!("{:03}", millis);
            format!("{}.{}", whole, fraction.trim_end_matches('0'))
        }
    }

    /// Convert a seconds value to milliseconds, rejecting negatives and NaN
    pub fn seconds_to_ms(seconds: f64) -> Option<u64> {
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        Some((seconds * MS_PER_SECOND as f64).round() as u64)
    }

    /// Parse a time string (seconds, `MM:SS.ms` or `HH:MM:SS.ms`) to milliseconds
    pub fn parse_ms(time_str: &str) -> SliceResult<u64> {
        let time_str = time_str.trim();
        let invalid = || SliceError::InvalidTimeFormat {
            time: time_str.to_string(),
        };

        let parts: Vec<&str> = time_str.split(':').collect();
        let seconds = match parts.as_slice() {
            [secs] => Self::parse_component(secs).ok_or_else(invalid)?,
            [mins, secs] => {
                let minutes = Self::parse_whole(mins).ok_or_else(invalid)?;
                let seconds = Self::parse_component(secs).ok_or_else(invalid)?;
                if seconds >= 60.0 {
                    return Err(invalid());
                }
                minutes * 60.0 + seconds
            }
            [hours, mins, secs] => {
                let hours = Self::parse_whole(hours).ok_or_else(invalid)?;
                let minutes = Self::parse_whole(mins).ok_or_else(invalid)?;
                let seconds = Self::parse_component(secs).ok_or_else(invalid)?;
                if minutes >= 60.0 || seconds >= 60.0 {
                    return Err(invalid());
                }
                hours * 3600.0 + minutes * 60.0 + seconds
            }
            _ => return Err(invalid()),
        };

        Self::seconds_to_ms(seconds).ok_or_else(invalid)
    }

    fn parse_whole(part: &str) -> Option<f64> {
        part.parse::<u32>().ok().map(f64::from)
    }

    fn parse_component(part: &str) -> Option<f64> {
        part.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
    }
}
