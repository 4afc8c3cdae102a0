use std::path::Path;

use cgmath::InnerSpace;
use serde::{Deserialize, Serialize};
use tumbler_base::{Error, Result};
use tumbler_geometry::{Point3, point_from_array};

use crate::camera::Projection;
use crate::input::ModifierKey;

/// Tuning for one rig. Speeds are per pixel of pointer travel unless noted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    /// Radians of tumble per pixel.
    pub rotate_speed: f64,
    /// Pan distance per pixel, as a fraction of the drag-start pivot distance.
    pub pan_speed: f64,
    /// Dolly distance per pixel of horizontal drag, as a fraction of the
    /// drag-start target distance.
    pub zoom_speed: f64,
    /// Dolly distance per wheel unit, as a fraction of the current target distance.
    pub wheel_zoom_speed: f64,
    /// Flips the wheel so that negative deltas zoom in.
    pub invert_zoom_wheel: bool,
    /// Closest the camera may get to the target, and the floor used for
    /// distance-scaled speeds.
    pub min_distance: f64,
    pub drag_modifier: ModifierKey,
    pub pivot_modifier: ModifierKey,
    /// Extra room around framed bounds; 1.0 fits the bounding sphere exactly.
    pub frame_padding: f64,
    pub camera: CameraSettings,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.005,
            pan_speed: 0.001,
            zoom_speed: 0.001,
            wheel_zoom_speed: 0.001,
            invert_zoom_wheel: false,
            min_distance: 0.5,
            drag_modifier: ModifierKey::Alt,
            pivot_modifier: ModifierKey::Ctrl,
            frame_padding: 1.5,
            camera: CameraSettings::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub fov_deg: f64,
    pub near: f64,
    pub far: f64,
    /// Home camera position, restored by `reset_view`.
    pub position: [f64; 3],
    /// Home look-at target; the pivot starts here too.
    pub target: [f64; 3],
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            near: 0.1,
            far: 1000.0,
            position: [0.0, 5.0, 10.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraSettings {
    pub fn home_position(&self) -> Point3 {
        point_from_array(self.position)
    }

    pub fn home_target(&self) -> Point3 {
        point_from_array(self.target)
    }

    pub fn projection(&self, aspect: f64) -> Projection {
        Projection {
            fov_deg: self.fov_deg,
            aspect,
            near: self.near,
            far: self.far,
        }
    }
}

impl RigConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_speed("rotate_speed", self.rotate_speed)?;
        ensure_speed("pan_speed", self.pan_speed)?;
        ensure_speed("zoom_speed", self.zoom_speed)?;
        ensure_speed("wheel_zoom_speed", self.wheel_zoom_speed)?;
        if !self.min_distance.is_finite() || self.min_distance <= 0.0 {
            return Err(Error::InvalidConfig("min_distance must be > 0".to_string()));
        }
        if !self.frame_padding.is_finite() || self.frame_padding <= 0.0 {
            return Err(Error::InvalidConfig("frame_padding must be > 0".to_string()));
        }
        if self.drag_modifier == self.pivot_modifier {
            return Err(Error::InvalidConfig(format!(
                "drag_modifier and pivot_modifier are both {:?}",
                self.drag_modifier
            )));
        }
        if !self.camera.projection(1.0).is_valid() {
            return Err(Error::InvalidConfig(
                "camera needs 0 < fov_deg < 180 and 0 < near < far".to_string(),
            ));
        }
        let home_distance = (self.camera.home_position() - self.camera.home_target()).magnitude();
        if !home_distance.is_finite() || home_distance < self.min_distance {
            return Err(Error::InvalidConfig(
                "home position must be at least min_distance from the home target".to_string(),
            ));
        }
        Ok(())
    }
}

fn ensure_speed(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidConfig(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}
