use cgmath::{InnerSpace, Rad, Rotation3};
use tracing::{debug, trace};
use tumbler_base::{Error, Guid, Result, Tolerance};
use tumbler_geometry::{
    Aabb, Point2, Point3, Quaternion, Ray, Vector3, is_finite_point, try_normalize, world_up,
};
use tumbler_scene::SceneQuery;

use crate::camera::{CameraNode, PerspectiveCamera, Projection};
use crate::config::RigConfig;
use crate::input::{InputEvent, ModifierKey, Modifiers, PointerButton};
use crate::pivot::PivotState;
use crate::snapshot::RigSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    Idle,
    Tumble,
    Pan,
    Zoom,
}

impl Default for ControlMode {
    fn default() -> Self {
        Self::Idle
    }
}

impl ControlMode {
    pub fn from_button(button: PointerButton) -> Self {
        match button {
            PointerButton::Primary => Self::Tumble,
            PointerButton::Auxiliary => Self::Pan,
            PointerButton::Secondary => Self::Zoom,
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Idle
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveDrag {
    mode: ControlMode,
    previous: Point2,
    distance_to_pivot: f64,
    distance_to_target: f64,
}

/// Client-area size in pixels, used to turn pointer positions into rays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn contains(&self, pos: Point2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }
}

/// Maya-style navigation around a pivot that is independent of the look-at
/// target.
///
/// While the drag modifier is held, primary-drag tumbles around the pivot,
/// auxiliary-drag pans and secondary-drag dollies. The wheel dollies at any
/// time. Tumbling rotates the pivot-to-target offset together with the
/// camera, so whatever sits at the centre of the view stays put relative to
/// the pivot instead of snapping the pivot to the middle of the screen.
#[derive(Clone, Debug)]
pub struct CameraRig<C = PerspectiveCamera> {
    config: RigConfig,
    camera: C,
    target: Point3,
    pivot: PivotState,
    active: Option<ActiveDrag>,
    modifiers: Modifiers,
    viewport: Viewport,
    tolerance: Tolerance,
}

impl CameraRig<PerspectiveCamera> {
    /// Rig with a perspective camera at the configured home pose.
    pub fn new(config: RigConfig) -> Result<Self> {
        let viewport = Viewport::default();
        let camera = PerspectiveCamera::new(
            config.camera.home_position(),
            config.camera.projection(viewport.aspect()),
        );
        Self::with_camera(config, camera)
    }
}

impl<C: CameraNode> CameraRig<C> {
    /// Drives an existing camera from where it stands. Target and pivot
    /// start at the configured home target.
    pub fn with_camera(config: RigConfig, camera: C) -> Result<Self> {
        config.validate()?;
        if !camera.projection().is_valid() {
            return Err(Error::InvalidConfig(
                "camera projection must satisfy 0 < fov_deg < 180 and 0 < near < far".to_string(),
            ));
        }
        let target = config.camera.home_target();
        let mut rig = Self {
            config,
            camera,
            target,
            pivot: PivotState::new(target),
            active: None,
            modifiers: Modifiers::default(),
            viewport: Viewport::default(),
            tolerance: Tolerance::default(),
        };
        rig.apply_viewport();
        rig.camera.look_at(target);
        Ok(rig)
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn position(&self) -> Point3 {
        self.camera.position()
    }

    pub fn target(&self) -> Point3 {
        self.target
    }

    pub fn pivot(&self) -> Point3 {
        self.pivot.position()
    }

    pub fn mode(&self) -> ControlMode {
        self.active.map(|drag| drag.mode).unwrap_or_default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn distance_to_target(&self) -> f64 {
        (self.target - self.camera.position()).magnitude()
    }

    pub fn distance_to_pivot(&self) -> f64 {
        (self.pivot.position() - self.camera.position()).magnitude()
    }

    pub fn is_pivot_pick_armed(&self) -> bool {
        self.pivot.is_pick_armed()
    }

    /// Starts a tumble, pan or zoom drag. Refused unless the drag modifier is
    /// held and no drag is already running.
    pub fn begin_drag(&mut self, button: PointerButton, pointer: Point2) -> bool {
        if self.active.is_some() || !self.modifiers.is_held(self.config.drag_modifier) {
            return false;
        }
        let mode = ControlMode::from_button(button);
        self.active = Some(ActiveDrag {
            mode,
            previous: pointer,
            distance_to_pivot: self.distance_to_pivot(),
            distance_to_target: self.distance_to_target(),
        });
        debug!(?mode, "camera drag started");
        true
    }

    /// Applies the pointer travel since the previous event to the active
    /// drag. Returns whether the camera moved.
    pub fn on_drag(&mut self, pointer: Point2) -> bool {
        let Some(mut drag) = self.active else {
            return false;
        };
        let delta = pointer - drag.previous;
        if !delta.x.is_finite() || !delta.y.is_finite() {
            return false;
        }
        drag.previous = pointer;
        self.active = Some(drag);
        trace!(mode = ?drag.mode, dx = delta.x, dy = delta.y, "camera drag");

        match drag.mode {
            ControlMode::Tumble => self.tumble(delta.x, delta.y),
            ControlMode::Pan => self.pan(delta.x, delta.y, drag.distance_to_pivot),
            ControlMode::Zoom => {
                let distance = drag.distance_to_target.max(self.config.min_distance);
                self.dolly(delta.x * self.config.zoom_speed * distance)
            }
            ControlMode::Idle => false,
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(drag) = self.active.take() {
            debug!(mode = ?drag.mode, "camera drag ended");
        }
    }

    /// Moves the tumble centre. Camera and target stay where they are.
    pub fn set_pivot(&mut self, point: Point3) {
        if !is_finite_point(point) {
            debug!("ignoring non-finite pivot");
            return;
        }
        self.pivot.set_position(point);
        debug!(x = point.x, y = point.y, z = point.z, "pivot set");
    }

    /// Dollies toward the target by a step proportional to the current
    /// distance. Positive deltas zoom in unless the wheel is inverted.
    pub fn wheel_zoom(&mut self, delta: f64) -> bool {
        if !delta.is_finite() || delta == 0.0 {
            return false;
        }
        let sign = if self.config.invert_zoom_wheel { -1.0 } else { 1.0 };
        let distance = self.distance_to_target().max(self.config.min_distance);
        self.dolly(sign * delta * self.config.wheel_zoom_speed * distance)
    }

    /// The next primary click places the pivot even without the pivot
    /// modifier.
    pub fn arm_pivot_pick(&mut self) {
        self.pivot.arm_pick();
    }

    pub fn disarm_pivot_pick(&mut self) {
        self.pivot.disarm_pick();
    }

    /// Casts a ray through `pointer` and moves the pivot to the nearest hit.
    /// A miss leaves the pivot where it was.
    pub fn pick_pivot<S: SceneQuery + ?Sized>(&mut self, pointer: Point2, scene: &S) -> Option<Point3> {
        let ray = self.screen_ray(pointer)?;
        let Some(hit) = scene.raycast(&ray) else {
            debug!(x = pointer.x, y = pointer.y, "pivot pick missed");
            return None;
        };
        self.set_pivot(hit.point);
        self.pivot.disarm_pick();
        Some(hit.point)
    }

    /// World-space ray from the camera through a client-space pixel.
    pub fn screen_ray(&self, pointer: Point2) -> Option<Ray> {
        if !self.viewport.contains(pointer) {
            return None;
        }
        let ndc_x = 2.0 * pointer.x / self.viewport.width - 1.0;
        let ndc_y = 1.0 - 2.0 * pointer.y / self.viewport.height;
        let projection = self.camera.projection();
        let half = projection.half_fov_tan();
        let local = Vector3::new(ndc_x * half * projection.aspect, ndc_y * half, -1.0);
        Ray::new(self.camera.position(), self.camera.orientation() * local)
    }

    /// Centres target and pivot on `bounds` and backs the camera off along
    /// its current view direction until the bounding sphere fits.
    pub fn frame_bounds(&mut self, bounds: Aabb) -> bool {
        let center = bounds.center();
        let radius = bounds.radius();
        if !is_finite_point(center) || !radius.is_finite() {
            return false;
        }
        let half = self.camera.projection().half_fov_tan();
        let distance = (radius / half * self.config.frame_padding).max(self.config.min_distance);
        let forward = self.camera.forward();

        self.target = center;
        self.pivot.set_position(center);
        self.camera.set_position(center - forward * distance);
        self.camera.look_at(center);
        debug!(distance, radius, "framed bounds");
        true
    }

    pub fn frame_object<S: SceneQuery + ?Sized>(&mut self, id: Guid, scene: &S) -> bool {
        match scene.object_bounds(id) {
            Some(bounds) => self.frame_bounds(bounds),
            None => {
                debug!(%id, "frame skipped: object has no bounds");
                false
            }
        }
    }

    pub fn frame_all<S: SceneQuery + ?Sized>(&mut self, scene: &S) -> bool {
        match scene.bounds() {
            Some(bounds) => self.frame_bounds(bounds),
            None => {
                debug!("frame skipped: nothing visible");
                false
            }
        }
    }

    /// Back to the configured home pose. Config, viewport and held modifiers
    /// are kept.
    pub fn reset_view(&mut self) {
        self.active = None;
        self.pivot = PivotState::new(self.config.camera.home_target());
        self.target = self.config.camera.home_target();
        self.camera.set_position(self.config.camera.home_position());
        let projection = self.config.camera.projection(self.viewport.aspect());
        self.camera.set_projection(projection);
        self.camera.look_at(self.target);
        debug!("view reset");
    }

    /// Per-frame hook: re-aims the camera at the target.
    pub fn update(&mut self) {
        self.camera.look_at(self.target);
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        let Some(viewport) = Viewport::new(width, height) else {
            debug!(width, height, "ignoring degenerate viewport");
            return false;
        };
        self.viewport = viewport;
        self.apply_viewport();
        true
    }

    pub fn key_down(&mut self, key: ModifierKey) {
        self.modifiers.set(key, true);
    }

    /// Releasing the drag modifier ends any drag in progress.
    pub fn key_up(&mut self, key: ModifierKey) {
        self.modifiers.set(key, false);
        if key == self.config.drag_modifier {
            self.end_drag();
        }
    }

    /// Replaces the held-modifier state wholesale, e.g. from a pointer
    /// event's modifier flags.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
        if !modifiers.is_held(self.config.drag_modifier) {
            self.end_drag();
        }
    }

    /// Routes one input event. Returns whether the camera or pivot changed.
    pub fn handle_event<S: SceneQuery + ?Sized>(&mut self, event: &InputEvent, scene: &S) -> bool {
        match *event {
            InputEvent::PointerDown { button, x, y } => {
                let pointer = Point2::new(x, y);
                let pivot_modifier = self.modifiers.is_held(self.config.pivot_modifier);
                if button == PointerButton::Primary
                    && self.active.is_none()
                    && self.pivot.is_pick_active(pivot_modifier)
                {
                    return self.pick_pivot(pointer, scene).is_some();
                }
                self.begin_drag(button, pointer);
                false
            }
            InputEvent::PointerMove { x, y } => self.on_drag(Point2::new(x, y)),
            InputEvent::PointerUp { .. } => {
                self.end_drag();
                false
            }
            InputEvent::Wheel { delta } => self.wheel_zoom(delta),
            InputEvent::KeyDown { key } => {
                self.key_down(key);
                false
            }
            InputEvent::KeyUp { key } => {
                self.key_up(key);
                false
            }
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    pub fn snapshot(&self) -> RigSnapshot {
        RigSnapshot::new(
            self.camera.position(),
            self.target,
            self.pivot.position(),
            self.camera.projection().fov_deg,
        )
    }

    /// Restores a saved view and cancels any drag.
    pub fn restore(&mut self, snapshot: &RigSnapshot) -> Result<()> {
        if !snapshot.is_finite() {
            return Err(Error::InvalidParameter(
                "snapshot contains non-finite values".to_string(),
            ));
        }
        let projection = Projection {
            fov_deg: snapshot.fov_deg,
            ..self.camera.projection()
        };
        if !projection.is_valid() {
            return Err(Error::InvalidParameter(format!(
                "snapshot fov_deg {} is out of range",
                snapshot.fov_deg
            )));
        }
        self.active = None;
        self.camera.set_projection(projection);
        self.camera.set_position(snapshot.position());
        self.target = snapshot.target();
        self.pivot.set_position(snapshot.pivot());
        self.camera.look_at(self.target);
        Ok(())
    }

    fn apply_viewport(&mut self) {
        let projection = Projection {
            aspect: self.viewport.aspect(),
            ..self.camera.projection()
        };
        self.camera.set_projection(projection);
    }

    fn tumble(&mut self, dx: f64, dy: f64) -> bool {
        let yaw = -dx * self.config.rotate_speed;
        let pitch = -dy * self.config.rotate_speed;
        if yaw.abs() <= self.tolerance.angular && pitch.abs() <= self.tolerance.angular {
            return false;
        }

        let right = try_normalize(self.camera.right(), self.tolerance.linear)
            .unwrap_or_else(Vector3::unit_x);
        let rotation: Quaternion = Quaternion::from_axis_angle(right, Rad(pitch))
            * Quaternion::from_axis_angle(world_up(), Rad(yaw));

        let pivot = self.pivot.position();
        let offset = self.camera.position() - pivot;
        let radius = offset.magnitude();
        // Renormalise so repeated tumbles cannot drift off the sphere.
        match try_normalize(rotation * offset, self.tolerance.linear) {
            Some(dir) => self.camera.set_position(pivot + dir * radius),
            None => debug!("tumble left camera in place: camera sits on the pivot"),
        }

        let target_to_pivot = rotation * (pivot - self.target);
        self.target = pivot - target_to_pivot;
        self.camera.look_at(self.target);
        true
    }

    fn pan(&mut self, dx: f64, dy: f64, distance_to_pivot: f64) -> bool {
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        let speed = distance_to_pivot.max(self.config.min_distance) * self.config.pan_speed;
        let movement = self.camera.right() * (-dx * speed) + self.camera.up() * (dy * speed);
        self.camera.set_position(self.camera.position() + movement);
        self.target = self.target + movement;
        self.camera.look_at(self.target);
        true
    }

    /// Moves the camera along the view line by `amount` (positive is closer),
    /// stopping `min_distance` short of the target.
    fn dolly(&mut self, amount: f64) -> bool {
        let position = self.camera.position();
        let to_target = self.target - position;
        let distance = to_target.magnitude();
        let Some(dir) = try_normalize(to_target, self.tolerance.linear) else {
            debug!("dolly skipped: camera sits on the target");
            return false;
        };
        let step = if amount > 0.0 {
            amount.min((distance - self.config.min_distance).max(0.0))
        } else {
            amount
        };
        if !step.is_finite() || step == 0.0 {
            return false;
        }
        self.camera.set_position(position + dir * step);
        self.camera.look_at(self.target);
        true
    }
}
