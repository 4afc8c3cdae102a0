use anyhow::{Context, Result, bail};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};
use tumbler_geometry::point_from_array;
use tumbler_rig::{CameraRig, InputEvent, RigSnapshot};
use tumbler_scene::Scene;

/// One entry of a recorded session: either raw input or a viewer command
/// that the host UI would have issued from a menu or shortcut.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum SessionStep {
    Command(SessionCommand),
    Input(InputEvent),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionCommand {
    FrameAll,
    FrameObject { name: String },
    SetPivot { point: [f64; 3] },
    ArmPivotPick,
    ResetView,
    Tick,
}

impl SessionCommand {
    const TAGS: [&'static str; 6] = [
        "frame_all",
        "frame_object",
        "set_pivot",
        "arm_pivot_pick",
        "reset_view",
        "tick",
    ];
}

// Dispatch on the `type` tag so a bad entry reports the field that is wrong
// for its own variant.
impl<'de> Deserialize<'de> for SessionStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let tag = value.get("type").and_then(Value::as_str).unwrap_or_default();
        let step = if SessionCommand::TAGS.contains(&tag) {
            SessionCommand::deserialize(value).map(SessionStep::Command)
        } else {
            InputEvent::deserialize(value).map(SessionStep::Input)
        };
        step.map_err(D::Error::custom)
    }
}

pub fn load_session(path: &Path) -> Result<Vec<SessionStep>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session {}", path.display()))?;
    parse_session(&text).with_context(|| format!("invalid session {}", path.display()))
}

pub fn parse_session(text: &str) -> Result<Vec<SessionStep>> {
    let entries: Vec<Value> =
        serde_json::from_str(text).context("session must be a JSON array of steps")?;
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| {
            serde_json::from_value(entry).with_context(|| format!("bad session step {idx}"))
        })
        .collect()
}

pub struct ReplaySummary {
    pub steps: usize,
    pub changed: usize,
    pub final_view: RigSnapshot,
}

pub fn replay(rig: &mut CameraRig, scene: &Scene, steps: &[SessionStep]) -> Result<ReplaySummary> {
    let mut changed = 0;
    for (idx, step) in steps.iter().enumerate() {
        let moved = match step {
            SessionStep::Input(event) => rig.handle_event(event, scene),
            SessionStep::Command(command) => apply_command(rig, scene, command)
                .with_context(|| format!("session step {idx} failed"))?,
        };
        if moved {
            changed += 1;
        }
        let view = rig.snapshot();
        debug!(
            step = idx,
            moved,
            mode = ?rig.mode(),
            position = ?view.position,
            target = ?view.target,
            pivot = ?view.pivot,
            "session step applied"
        );
    }
    let final_view = rig.snapshot();
    info!(steps = steps.len(), changed, "session replay complete");
    Ok(ReplaySummary {
        steps: steps.len(),
        changed,
        final_view,
    })
}

fn apply_command(rig: &mut CameraRig, scene: &Scene, command: &SessionCommand) -> Result<bool> {
    match command {
        SessionCommand::FrameAll => Ok(rig.frame_all(scene)),
        SessionCommand::FrameObject { name } => {
            let Some(object) = scene.find_by_name(name) else {
                bail!("no scene object named {name:?}");
            };
            Ok(rig.frame_object(object.id, scene))
        }
        SessionCommand::SetPivot { point } => {
            rig.set_pivot(point_from_array(*point));
            Ok(true)
        }
        SessionCommand::ArmPivotPick => {
            rig.arm_pivot_pick();
            Ok(false)
        }
        SessionCommand::ResetView => {
            rig.reset_view();
            Ok(true)
        }
        SessionCommand::Tick => {
            rig.update();
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tumbler_rig::{ControlMode, RigConfig};
    use tumbler_scene::SceneDocument;

    const SCENE: &str = r#"{ "objects": [
        { "name": "floor", "shape": { "type": "box", "min": [-20, -1, -15], "max": [20, 0, 25] } },
        { "name": "statue", "shape": { "type": "box", "min": [-1, 0, -1], "max": [1, 4, 1] } }
    ] }"#;

    fn parse(text: &str) -> Result<Vec<SessionStep>> {
        parse_session(text)
    }

    fn error_text(text: &str) -> String {
        match parse_session(text) {
            Ok(steps) => panic!("expected an error, parsed {steps:?}"),
            Err(err) => format!("{err:#}"),
        }
    }

    #[test]
    fn commands_and_inputs_share_one_stream() -> Result<()> {
        let steps = parse(
            r#"[
                { "type": "frame_object", "name": "statue" },
                { "type": "key_down", "key": "alt" },
                { "type": "pointer_down", "button": "primary", "x": 640, "y": 360 },
                { "type": "pointer_move", "x": 700, "y": 360 },
                { "type": "pointer_up", "button": "primary" },
                { "type": "tick" }
            ]"#,
        )?;
        assert!(matches!(steps[0], SessionStep::Command(SessionCommand::FrameObject { .. })));
        assert!(matches!(steps[1], SessionStep::Input(InputEvent::KeyDown { .. })));

        let scene = SceneDocument::from_json_str(SCENE)?.build()?;
        let mut rig = CameraRig::new(RigConfig::default())?;
        let summary = replay(&mut rig, &scene, &steps)?;

        assert_eq!(summary.steps, 6);
        assert_eq!(summary.changed, 2);
        assert_eq!(summary.final_view.pivot, [0.0, 2.0, 0.0]);
        assert_eq!(rig.mode(), ControlMode::Idle);
        Ok(())
    }

    #[test]
    fn unknown_object_fails_the_replay() -> Result<()> {
        let steps = parse(r#"[ { "type": "frame_object", "name": "ghost" } ]"#)?;
        let scene = SceneDocument::from_json_str(SCENE)?.build()?;
        let mut rig = CameraRig::new(RigConfig::default())?;
        assert!(replay(&mut rig, &scene, &steps).is_err());
        Ok(())
    }

    #[test]
    fn set_pivot_command() -> Result<()> {
        let steps = parse(r#"[ { "type": "set_pivot", "point": [1, 2, 3] } ]"#)?;
        let mut rig = CameraRig::new(RigConfig::default())?;
        replay(&mut rig, &Scene::new(), &steps)?;
        assert_eq!(rig.snapshot().pivot, [1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn malformed_steps_name_the_bad_field() {
        let text = error_text(r#"[ { "type": "tick" }, { "type": "frame_object" } ]"#);
        assert!(text.contains("step 1"), "{text}");
        assert!(text.contains("missing field `name`"), "{text}");

        let text = error_text(r#"[ { "type": "pointer_move", "x": 3 } ]"#);
        assert!(text.contains("step 0"), "{text}");
        assert!(text.contains("missing field `y`"), "{text}");

        let text = error_text(r#"[ { "type": "wheel", "delta": "far" } ]"#);
        assert!(text.contains("invalid type"), "{text}");
    }

    #[test]
    fn session_must_be_an_array() {
        let text = error_text(r#"{ "type": "tick" }"#);
        assert!(text.contains("JSON array"), "{text}");
    }
}
