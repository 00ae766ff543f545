//! Path and filename utilities

use std::cmp::Ordering;
use std::path::Path;

/// Filename used when the selected asset carries none
pub const DEFAULT_FILENAME: &str = "videoToSplit";

/// Path utilities for segment naming and ordering
pub struct PathUtils;

impl PathUtils {
    /// Get file stem (name without extension), falling back to the default name
    pub fn stem(filename: &str) -> String {
        Path::new(filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
    }

    /// Check whether a filename carries the given extension (case-insensitive)
    pub fn has_extension(filename: &str, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        Path::new(filename)
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
            .unwrap_or(false)
    }

    /// Sort filenames by embedded numeric value rather than character code
    pub fn natural_sort(names: &mut [String]) {
        names.sort_by(|a, b| natural_cmp(a, b));
    }
}

/// Compare two strings treating runs of ASCII digits as numbers.
///
/// `clip2.mp4` orders before `clip10.mp4`. Equal numeric values with
/// different zero padding fall back to the shorter run first, then to a
/// plain comparison so the order is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.as_bytes();
    let mut right = b.as_bytes();

    loop {
        match (left.first(), right.first()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let (l_run, l_rest) = split_digits(left);
                let (r_run, r_rest) = split_digits(right);
                let ordering = compare_digit_runs(l_run, r_run);
                if ordering != Ordering::Equal {
                    return ordering;
                }
                left = l_rest;
                right = r_rest;
            }
            (Some(l), Some(r)) => {
                if l != r {
                    return l.cmp(r);
                }
                left = &left[1..];
                right = &right[1..];
            }
        }
    }
}

fn split_digits(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    bytes.split_at(end)
}

fn compare_digit_runs(left: &[u8], right: &[u8]) -> Ordering {
    let trim = |run: &[u8]| -> usize { run.iter().take_while(|b| **b == b'0').count() };
    let l_sig = &left[trim(left)..];
    let r_sig = &right[trim(right)..];

    // Without leading zeros a longer run is a larger number
    l_sig
        .len()
        .cmp(&r_sig.len())
        .then_with(|| l_sig.cmp(r_sig))
        .then_with(|| left.len().cmp(&right.len()))
}
