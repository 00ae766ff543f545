//! Common utilities and helpers

use std::time::Duration;

pub mod path;
pub mod time;

/// Utility functions for StorySlice
pub struct Utils;

impl Utils {
    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        let milliseconds = duration.subsec_millis();

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }

    /// Format an elapsed millisecond count for display
    pub fn format_elapsed_ms(ms: u64) -> String {
        Self::format_duration(Duration::from_millis(ms))
    }
}
