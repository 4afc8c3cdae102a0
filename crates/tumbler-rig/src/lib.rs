//! Pivot-relative camera rig: Maya-style tumble, pan and dolly around a
//! pivot that is independent of the camera's look-at target.

pub mod camera;
pub mod config;
pub mod input;
pub mod pivot;
pub mod rig;
pub mod snapshot;

pub use camera::{CameraNode, PerspectiveCamera, Projection, look_rotation};
pub use config::{CameraSettings, RigConfig};
pub use input::{InputEvent, ModifierKey, Modifiers, PointerButton};
pub use pivot::PivotState;
pub use rig::{CameraRig, ControlMode, Viewport};
pub use snapshot::RigSnapshot;
