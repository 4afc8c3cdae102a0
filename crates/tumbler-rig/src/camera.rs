use cgmath::InnerSpace;
use serde::{Deserialize, Serialize};
use tumbler_geometry::{Matrix3, Point3, Quaternion, Vector3, try_normalize, world_up};

const LOOK_EPS: f64 = 1.0e-9;

/// Perspective projection parameters. `fov_deg` is the vertical field of view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub fov_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn is_valid(&self) -> bool {
        self.fov_deg.is_finite()
            && self.fov_deg > 0.0
            && self.fov_deg < 180.0
            && self.aspect.is_finite()
            && self.aspect > 0.0
            && self.near.is_finite()
            && self.near > 0.0
            && self.far.is_finite()
            && self.far > self.near
    }

    pub fn half_fov_tan(&self) -> f64 {
        (self.fov_deg.to_radians() * 0.5).tan()
    }
}

/// The camera object the rig drives. Orientation is never set directly;
/// it is always derived from [`CameraNode::look_at`].
pub trait CameraNode {
    fn position(&self) -> Point3;

    fn set_position(&mut self, position: Point3);

    fn orientation(&self) -> Quaternion;

    fn look_at(&mut self, target: Point3);

    fn projection(&self) -> Projection;

    fn set_projection(&mut self, projection: Projection);

    fn right(&self) -> Vector3 {
        self.orientation() * Vector3::unit_x()
    }

    fn up(&self) -> Vector3 {
        self.orientation() * Vector3::unit_y()
    }

    /// View direction. Cameras look down their local -Z.
    fn forward(&self) -> Vector3 {
        self.orientation() * -Vector3::unit_z()
    }
}

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    position: Point3,
    orientation: Quaternion,
    projection: Projection,
}

impl PerspectiveCamera {
    pub fn new(position: Point3, projection: Projection) -> Self {
        Self {
            position,
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            projection,
        }
    }
}

impl CameraNode for PerspectiveCamera {
    fn position(&self) -> Point3 {
        self.position
    }

    fn set_position(&mut self, position: Point3) {
        self.position = position;
    }

    fn orientation(&self) -> Quaternion {
        self.orientation
    }

    fn look_at(&mut self, target: Point3) {
        if let Some(orientation) = look_rotation(target - self.position) {
            self.orientation = orientation;
        }
    }

    fn projection(&self) -> Projection {
        self.projection
    }

    fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }
}

/// Rotation taking local -Z onto `forward` with local +Y as close to world
/// up as possible. Pitch is not clamped, but the right axis flips sign when
/// `forward` crosses the vertical. A single large pitch step carries the
/// camera over the pole, while a run of small drags settles on it, the same
/// as any up-vector look-at.
pub fn look_rotation(forward: Vector3) -> Option<Quaternion> {
    let back = -try_normalize(forward, LOOK_EPS)?;
    let right = try_normalize(world_up().cross(back), LOOK_EPS)
        .or_else(|| try_normalize(Vector3::unit_z().cross(back), LOOK_EPS))?;
    let up = back.cross(right);
    Some(Quaternion::from(Matrix3::from_cols(right, up, back)).normalize())
}
