// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SliceError, SliceResult};
use crate::utils::path::{PathUtils, DEFAULT_FILENAME};
use crate::utils::time::TimeCode;

#[cfg(test)]
mod tests;

/// Segment length used when the user leaves the input blank or invalid
pub const DEFAULT_SEGMENT_SECS: u64 = 30;

/// Step used by the fine trim adjusters
pub const NUDGE_STEP_MS: i64 = 100;

/// Video selected for splitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub uri: PathBuf,
    pub filename: String,
    pub duration_ms: u64,
}

impl VideoAsset {
    /// Create an asset; an empty filename falls back to the default name
    pub fn new(uri: impl Into<PathBuf>, filename: Option<String>, duration_ms: u64) -> Self {
        let filename = filename
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
        Self {
            uri: uri.into(),
            filename,
            duration_ms,
        }
    }

    /// Create an asset named after the last component of its path
    pub fn from_path(uri: impl Into<PathBuf>, duration_ms: u64) -> Self {
        let uri = uri.into();
        let filename = uri
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        Self::new(uri, filename, duration_ms)
    }

    /// Filename without its extension, used as the output prefix
    pub fn stem(&self) -> String {
        PathUtils::stem(&self.filename)
    }
}

/// Selected time range inside an asset.
///
/// Always satisfies `0 <= start_ms <= end_ms <= max_ms`; the fields are only
/// reachable through the bounds-checked setters below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TrimBounds")]
pub struct TrimRange {
    start_ms: u64,
    end_ms: u64,
    max_ms: u64,
}

/// Unchecked wire form of [`TrimRange`]; deserializing validates it
#[derive(Deserialize)]
struct TrimBounds {
    start_ms: u64,
    end_ms: u64,
    max_ms: u64,
}

impl TryFrom<TrimBounds> for TrimRange {
    type Error = SliceError;

    fn try_from(bounds: TrimBounds) -> SliceResult<Self> {
        Self::new(bounds.start_ms, bounds.end_ms, bounds.max_ms)
    }
}

impl TrimRange {
    /// Full range over an asset of the given duration
    pub fn full(max_ms: u64) -> Self {
        Self {
            start_ms: 0,
            end_ms: max_ms,
            max_ms,
        }
    }

    /// Explicit range, validated against the invariant
    pub fn new(start_ms: u64, end_ms: u64, max_ms: u64) -> SliceResult<Self> {
        if start_ms > end_ms || end_ms > max_ms {
            return Err(SliceError::configuration(format!(
                "trim range {}..{} does not fit inside 0..{}",
                TimeCode::format_arg(start_ms),
                TimeCode::format_arg(end_ms),
                TimeCode::format_arg(max_ms)
            )));
        }
        Ok(Self {
            start_ms,
            end_ms,
            max_ms,
        })
    }

    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Length of the selection
    pub fn selected_duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// Move the start. Returns false (range unchanged) when the value
    /// passes the current end.
    pub fn set_start(&mut self, start_ms: u64) -> bool {
        if start_ms > self.end_ms {
            return false;
        }
        self.start_ms = start_ms.min(self.max_ms);
        true
    }

    /// Move the end. Values below the start are clamped up to it.
    /// Returns the effective end.
    pub fn set_end(&mut self, end_ms: u64) -> u64 {
        self.end_ms = end_ms.min(self.max_ms).max(self.start_ms);
        self.end_ms
    }

    /// Shift the start by a signed step; ignored when it would leave `[0, end]`
    pub fn nudge_start(&mut self, delta_ms: i64) -> bool {
        match Self::offset(self.start_ms, delta_ms) {
            Some(start_ms) if start_ms <= self.end_ms => {
                self.start_ms = start_ms;
                true
            }
            _ => false,
        }
    }

    /// Shift the end by a signed step; ignored when it would leave `[start, max]`
    pub fn nudge_end(&mut self, delta_ms: i64) -> bool {
        match Self::offset(self.end_ms, delta_ms) {
            Some(end_ms) if end_ms >= self.start_ms && end_ms <= self.max_ms => {
                self.end_ms = end_ms;
                true
            }
            _ => false,
        }
    }

    fn offset(value: u64, delta_ms: i64) -> Option<u64> {
        if delta_ms.is_negative() {
            value.checked_sub(delta_ms.unsigned_abs())
        } else {
            value.checked_add(delta_ms as u64)
        }
    }
}

/// Rotation applied while re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    /// 90 degrees clockwise
    Cw90,
    /// 90 degrees counter-clockwise
    Ccw90,
    /// 180 degrees
    Half,
}

/// Toggle order for rotation
const ROTATION_RING: [Rotation; 4] = [Rotation::None, Rotation::Cw90, Rotation::Half, Rotation::Ccw90];

impl Rotation {
    /// Successor in the toggle ring `None -> 90 -> 180 -> -90 -> None`
    pub fn next(self) -> Self {
        let position = ROTATION_RING
            .iter()
            .position(|r| *r == self)
            .unwrap_or(0);
        ROTATION_RING[(position + 1) % ROTATION_RING.len()]
    }

    /// Signed degrees, `None` for no rotation
    pub fn degrees(self) -> Option<i32> {
        match self {
            Rotation::None => None,
            Rotation::Cw90 => Some(90),
            Rotation::Ccw90 => Some(-90),
            Rotation::Half => Some(180),
        }
    }

    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::None),
            90 | -270 => Some(Rotation::Cw90),
            -90 | 270 => Some(Rotation::Ccw90),
            180 | -180 => Some(Rotation::Half),
            _ => None,
        }
    }

    /// Whether the rotation swaps width and height
    pub fn transposes(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Ccw90)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.degrees() {
            Some(degrees) => write!(f, "{}°", degrees),
            None => write!(f, "none"),
        }
    }
}

/// Output resolution applied while re-encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scale {
    #[default]
    Native,
    P144,
    P360,
    P720,
    P1080,
}

/// Toggle order for resolution, walked in both directions
const SCALE_LADDER: [Scale; 5] = [Scale::Native, Scale::P144, Scale::P360, Scale::P720, Scale::P1080];

impl Scale {
    fn ladder_position(self) -> usize {
        SCALE_LADDER.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// One step up the ladder, wrapping to `Native` after 1080p
    pub fn right(self) -> Self {
        SCALE_LADDER[(self.ladder_position() + 1) % SCALE_LADDER.len()]
    }

    /// One step down the ladder, wrapping to 1080p before `Native`
    pub fn left(self) -> Self {
        let len = SCALE_LADDER.len();
        SCALE_LADDER[(self.ladder_position() + len - 1) % len]
    }

    /// Target size of the locked axis
    pub fn pixels(self) -> Option<u32> {
        match self {
            Scale::Native => None,
            Scale::P144 => Some(144),
            Scale::P360 => Some(360),
            Scale::P720 => Some(720),
            Scale::P1080 => Some(1080),
        }
    }

    /// Output width for the 16:9 frame of the same class, used when the
    /// width axis is locked
    pub fn width(self) -> Option<u32> {
        match self {
            Scale::Native => None,
            Scale::P144 => Some(256),
            Scale::P360 => Some(640),
            Scale::P720 => Some(1280),
            Scale::P1080 => Some(1920),
        }
    }

    pub fn from_pixels(pixels: u32) -> Option<Self> {
        SCALE_LADDER.iter().copied().find(|s| s.pixels() == Some(pixels))
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pixels() {
            Some(pixels) => write!(f, "{}p", pixels),
            None => write!(f, "Native"),
        }
    }
}

/// Rotation and resolution chosen for a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    pub rotate: Rotation,
    pub scale: Scale,
}

impl TransformSpec {
    pub fn new(rotate: Rotation, scale: Scale) -> Self {
        Self { rotate, scale }
    }

    /// Any transform forces a per-segment re-encode
    pub fn uses_filter(&self) -> bool {
        self.rotate != Rotation::None || self.scale != Scale::Native
    }
}

/// Observer for the preview player driven by trim edits.
///
/// Every method defaults to a no-op so a headless caller can ignore them.
pub trait PreviewHooks: Send {
    /// The start moved; preview should play from here
    fn play_from(&mut self, _position_ms: u64) {}

    /// The end moved; preview should pause on this frame
    fn pause_at(&mut self, _position_ms: u64) {}

    /// Playback passed the end of the selection; loop back to `restart_ms`
    fn boundary_reached(&mut self, _restart_ms: u64) {}
}

/// Hooks that ignore every event
#[derive(Debug, Default)]
pub struct NoPreview;

impl PreviewHooks for NoPreview {}

/// Everything the user has chosen for one split, frozen for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRequest {
    pub asset: VideoAsset,
    pub trim: TrimRange,
    pub transform: TransformSpec,
    pub segment_length_ms: u64,
}

impl SplitRequest {
    /// Build a request, rejecting settings that could never run
    pub fn new(
        asset: VideoAsset,
        trim: TrimRange,
        transform: TransformSpec,
        segment_length_ms: u64,
    ) -> SliceResult<Self> {
        if segment_length_ms == 0 {
            return Err(SliceError::configuration(
                "segment length must be greater than zero",
            ));
        }
        if trim.max_ms() > asset.duration_ms {
            return Err(SliceError::configuration(format!(
                "trim range extends past the end of {} ({})",
                asset.filename,
                TimeCode::format_arg(asset.duration_ms)
            )));
        }
        Ok(Self {
            asset,
            trim,
            transform,
            segment_length_ms,
        })
    }
}

/// Editing state for one user session.
///
/// Owns the asset, trim range, transform and segment length, and reports
/// trim edits to the preview through [`PreviewHooks`].
pub struct EditSession {
    asset: Option<VideoAsset>,
    trim: TrimRange,
    transform: TransformSpec,
    segment_length_ms: Option<u64>,
    hooks: Box<dyn PreviewHooks>,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("asset", &self.asset)
            .field("trim", &self.trim)
            .field("transform", &self.transform)
            .field("segment_length_ms", &self.segment_length_ms)
            .finish()
    }
}

impl EditSession {
    /// Empty session with the default segment length
    pub fn new() -> Self {
        Self::with_hooks(Box::new(NoPreview))
    }

    /// Empty session reporting to the given preview
    pub fn with_hooks(hooks: Box<dyn PreviewHooks>) -> Self {
        Self {
            asset: None,
            trim: TrimRange::full(0),
            transform: TransformSpec::default(),
            segment_length_ms: Some(DEFAULT_SEGMENT_SECS * 1000),
            hooks,
        }
    }

    /// Replace the asset and select all of it
    pub fn load_asset(&mut self, asset: VideoAsset) {
        self.trim = TrimRange::full(asset.duration_ms);
        self.asset = Some(asset);
    }

    pub fn asset(&self) -> Option<&VideoAsset> {
        self.asset.as_ref()
    }

    pub fn trim(&self) -> &TrimRange {
        &self.trim
    }

    pub fn transform(&self) -> &TransformSpec {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: TransformSpec) {
        self.transform = transform;
    }

    pub fn set_start(&mut self, start_ms: u64) -> bool {
        let accepted = self.trim.set_start(start_ms);
        if accepted {
            self.hooks.play_from(self.trim.start_ms());
        }
        accepted
    }

    pub fn set_end(&mut self, end_ms: u64) -> u64 {
        let end_ms = self.trim.set_end(end_ms);
        self.hooks.pause_at(end_ms);
        end_ms
    }

    /// Fine-adjust the start by `NUDGE_STEP_MS` in either direction
    pub fn nudge_start(&mut self, forward: bool) -> bool {
        let moved = self.trim.nudge_start(Self::step(forward));
        if moved {
            self.hooks.pause_at(self.trim.start_ms());
        }
        moved
    }

    /// Fine-adjust the end by `NUDGE_STEP_MS` in either direction
    pub fn nudge_end(&mut self, forward: bool) -> bool {
        let moved = self.trim.nudge_end(Self::step(forward));
        if moved {
            self.hooks.pause_at(self.trim.end_ms());
        }
        moved
    }

    fn step(forward: bool) -> i64 {
        if forward {
            NUDGE_STEP_MS
        } else {
            -NUDGE_STEP_MS
        }
    }

    /// Feed the preview's playback position; loops the selection at its end
    pub fn on_playback_position(&mut self, position_ms: u64) -> bool {
        if position_ms >= self.trim.end_ms() {
            self.hooks.boundary_reached(self.trim.start_ms());
            return true;
        }
        false
    }

    pub fn toggle_rotation(&mut self) -> Rotation {
        self.transform.rotate = self.transform.rotate.next();
        self.transform.rotate
    }

    pub fn scale_left(&mut self) -> Scale {
        self.transform.scale = self.transform.scale.left();
        self.transform.scale
    }

    pub fn scale_right(&mut self) -> Scale {
        self.transform.scale = self.transform.scale.right();
        self.transform.scale
    }

    /// Store a segment length typed by the user, in whole or fractional seconds.
    /// Unparsable text marks the length invalid until committed.
    pub fn set_segment_length_input(&mut self, text: &str) {
        self.segment_length_ms = text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(TimeCode::seconds_to_ms);
    }

    /// Set the segment length directly; NaN and negative values mark it invalid
    pub fn set_segment_length_secs(&mut self, seconds: f64) {
        self.segment_length_ms = TimeCode::seconds_to_ms(seconds);
    }

    /// Finish editing the segment length, restoring the default when invalid
    pub fn commit_segment_length(&mut self) -> u64 {
        let length = match self.segment_length_ms {
            Some(ms) if ms > 0 => ms,
            _ => DEFAULT_SEGMENT_SECS * 1000,
        };
        self.segment_length_ms = Some(length);
        length
    }

    pub fn segment_length_ms(&self) -> Option<u64> {
        self.segment_length_ms
    }

    /// Selection length as `HH:MM:SS`
    pub fn selected_duration_label(&self) -> String {
        TimeCode::format_hms(self.trim.selected_duration_ms())
    }

    /// Freeze the current state into a runnable request
    pub fn split_request(&self) -> SliceResult<SplitRequest> {
        let asset = self
            .asset
            .clone()
            .ok_or_else(|| SliceError::configuration("no video has been selected"))?;
        let segment_length_ms = self
            .segment_length_ms
            .ok_or_else(|| SliceError::configuration("segment length is not a number"))?;
        SplitRequest::new(asset, self.trim, self.transform, segment_length_ms)
    }
}
