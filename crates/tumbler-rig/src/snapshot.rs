use serde::{Deserialize, Serialize};
use tumbler_geometry::{Point3, is_finite_point, point_from_array, point_to_array};

/// Serializable copy of everything a rig needs to reproduce a view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigSnapshot {
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub pivot: [f64; 3],
    pub fov_deg: f64,
}

impl RigSnapshot {
    pub fn new(position: Point3, target: Point3, pivot: Point3, fov_deg: f64) -> Self {
        Self {
            position: point_to_array(position),
            target: point_to_array(target),
            pivot: point_to_array(pivot),
            fov_deg,
        }
    }

    pub fn position(&self) -> Point3 {
        point_from_array(self.position)
    }

    pub fn target(&self) -> Point3 {
        point_from_array(self.target)
    }

    pub fn pivot(&self) -> Point3 {
        point_from_array(self.pivot)
    }

    pub fn is_finite(&self) -> bool {
        is_finite_point(self.position())
            && is_finite_point(self.target())
            && is_finite_point(self.pivot())
            && self.fov_deg.is_finite()
    }
}
