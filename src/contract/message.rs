use crate::foundation::error::{SkyframeError, SkyframeResult};
use serde::{Deserialize, Serialize};

/// Inclusive numeric bounds for a contract field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds<T> {
    /// Smallest accepted value.
    pub min: T,
    /// Largest accepted value.
    pub max: T,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// Return `true` when `v` lies within `[min, max]`.
    pub fn contains(&self, v: T) -> bool {
        self.min <= v && v <= self.max
    }
}

/// Logical width/height in pixels.
pub const EXTENT_BOUNDS: Bounds<u32> = Bounds { min: 100, max: 5000 };
/// Device pixel ratio.
pub const DPR_BOUNDS: Bounds<f64> = Bounds { min: 1.0, max: 3.0 };
/// Camera zoom.
pub const ZOOM_BOUNDS: Bounds<f64> = Bounds { min: 0.5, max: 2.0 };
/// Rotation speed in units per tick.
pub const ROTATION_SPEED_BOUNDS: Bounds<f64> = Bounds { min: 0.0, max: 10.0 };
/// Calibration vector length in logical units.
pub const LINE_LENGTH_BOUNDS: Bounds<f64> = Bounds {
    min: 50.0,
    max: 150.0,
};
/// Apparent magnitude of a catalogued object.
pub const MAGNITUDE_BOUNDS: Bounds<f64> = Bounds { min: 1.0, max: 6.0 };

/// What a message asks the renderer to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    /// Advance the animation state, draw a frame, reply with its pixels.
    Render,
    /// Advance the animation state only. Never replied to.
    Animate,
}

/// Catalogue class of a celestial object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CelestialKind {
    /// Point source.
    Star,
    /// Diffuse cloud.
    Nebula,
    /// Extended galaxy.
    Galaxy,
}

/// Calibration state reported by the caller. Carried through unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalibrationStatus {
    /// No calibration in progress.
    #[default]
    Idle,
    /// Calibration running.
    Calibrating,
    /// Last calibration failed.
    Error,
}

/// Camera pan in logical pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraOffset {
    /// Horizontal pan.
    pub x: f64,
    /// Vertical pan.
    pub y: f64,
}

/// A catalogued object in the field of view.
///
/// Accepted and preserved in order, but not drawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CelestialObject {
    /// Object class.
    #[serde(rename = "type")]
    pub kind: CelestialKind,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Apparent magnitude in `[1, 6]`.
    pub magnitude: f64,
}

/// A validated inbound command.
///
/// Values built by hand are not checked; the renderer only executes commands that went through
/// [`crate::contract::validate::validate`]. Serializing yields the wire format.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderCommand {
    /// Message tag.
    #[serde(rename = "type")]
    pub kind: CommandKind,
    /// Logical width, `[100, 5000]`.
    pub width: u32,
    /// Logical height, `[100, 5000]`.
    pub height: u32,
    /// Physical pixels per logical pixel, `[1, 3]`.
    #[serde(rename = "dpr")]
    pub device_pixel_ratio: f64,
    /// Camera pan.
    #[serde(rename = "offset")]
    pub camera_offset: CameraOffset,
    /// Uniform camera zoom, `[0.5, 2]`.
    pub zoom_level: f64,
    /// Rotation advance per tick, `[0, 10]`.
    pub rotation_speed: f64,
    /// Whether this command advances the rotation accumulator.
    pub auto_rotate: bool,
    /// Grid toggle. Axes are drawn regardless.
    pub show_grid: bool,
    /// Calibration vector length, `[50, 150]`.
    #[serde(rename = "lineLength")]
    pub calibration_vector_length: f64,
    /// Objects in the field, insertion order.
    pub celestial_objects: Vec<CelestialObject>,
    /// Informational calibration state.
    pub calibration_status: CalibrationStatus,
}

impl RenderCommand {
    /// A neutral command: no pan, unit zoom, no rotation, 100-unit calibration vectors.
    pub fn new(kind: CommandKind, width: u32, height: u32) -> Self {
        Self {
            kind,
            width,
            height,
            device_pixel_ratio: 1.0,
            camera_offset: CameraOffset::default(),
            zoom_level: 1.0,
            rotation_speed: 0.0,
            auto_rotate: false,
            show_grid: true,
            calibration_vector_length: 100.0,
            celestial_objects: Vec::new(),
            calibration_status: CalibrationStatus::Idle,
        }
    }

    /// Set the device pixel ratio.
    pub fn with_dpr(mut self, dpr: f64) -> Self {
        self.device_pixel_ratio = dpr;
        self
    }

    /// Enable auto-rotation at `speed` units per tick.
    pub fn with_auto_rotate(mut self, speed: f64) -> Self {
        self.auto_rotate = true;
        self.rotation_speed = speed;
        self
    }

    /// Encode as the wire payload.
    pub fn to_json(&self) -> SkyframeResult<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| SkyframeError::serde(e.to_string()))
    }
}
