use cgmath::InnerSpace;
use tumbler_base::{Guid, Result};
use tumbler_geometry::{Point2, Point3, TriMesh};
use tumbler_rig::{
    CameraNode, CameraRig, ControlMode, InputEvent, ModifierKey, PointerButton, RigConfig,
};
use tumbler_scene::{Scene, SceneQuery};

fn scene() -> Result<(Scene, Guid)> {
    let mut scene = Scene::new();
    scene.add(
        "floor",
        TriMesh::cuboid(Point3::new(-50.0, -1.0, -40.0), Point3::new(50.0, 0.0, 60.0))?,
    );
    let block = scene.add(
        "block",
        TriMesh::cuboid(Point3::new(3.0, 0.0, -1.0), Point3::new(5.0, 2.0, 1.0))?,
    );
    Ok((scene, block))
}

fn centre(rig: &CameraRig) -> Point2 {
    let viewport = rig.viewport();
    Point2::new(viewport.width / 2.0, viewport.height / 2.0)
}

fn primary_down(at: Point2) -> InputEvent {
    InputEvent::PointerDown {
        button: PointerButton::Primary,
        x: at.x,
        y: at.y,
    }
}

#[test]
fn ctrl_click_places_pivot_on_geometry() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    rig.set_pivot(Point3::new(9.0, 9.0, 9.0));
    let position = rig.position();
    let target = rig.target();

    rig.handle_event(&InputEvent::KeyDown { key: ModifierKey::Ctrl }, &scene);
    assert!(rig.handle_event(&primary_down(centre(&rig)), &scene));

    assert!((rig.pivot() - Point3::new(0.0, 0.0, 0.0)).magnitude() < 1.0e-6);
    assert_eq!(rig.position(), position);
    assert_eq!(rig.target(), target);
    assert_eq!(rig.mode(), ControlMode::Idle);
    Ok(())
}

#[test]
fn pivot_pick_takes_precedence_over_tumble() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    rig.key_down(ModifierKey::Alt);
    rig.key_down(ModifierKey::Ctrl);

    assert!(rig.handle_event(&primary_down(centre(&rig)), &scene));
    assert_eq!(rig.mode(), ControlMode::Idle);

    // Other buttons still drag.
    rig.handle_event(
        &InputEvent::PointerDown {
            button: PointerButton::Auxiliary,
            x: 10.0,
            y: 10.0,
        },
        &scene,
    );
    assert_eq!(rig.mode(), ControlMode::Pan);
    Ok(())
}

#[test]
fn missed_pick_keeps_pivot() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    let pivot = Point3::new(1.0, 1.0, 1.0);
    rig.set_pivot(pivot);
    rig.key_down(ModifierKey::Ctrl);

    // Top edge of the view looks above the horizon.
    let sky = Point2::new(rig.viewport().width / 2.0, 0.0);
    assert!(!rig.handle_event(&primary_down(sky), &scene));
    assert_eq!(rig.pivot(), pivot);
    Ok(())
}

#[test]
fn armed_pick_needs_no_modifier_and_disarms_on_hit() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    rig.arm_pivot_pick();

    let sky = Point2::new(rig.viewport().width / 2.0, 0.0);
    assert!(rig.pick_pivot(sky, &scene).is_none());
    assert!(rig.is_pivot_pick_armed());

    assert!(rig.handle_event(&primary_down(centre(&rig)), &scene));
    assert!(!rig.is_pivot_pick_armed());

    rig.set_pivot(Point3::new(7.0, 7.0, 7.0));
    assert!(!rig.handle_event(&primary_down(centre(&rig)), &scene));
    assert_eq!(rig.pivot(), Point3::new(7.0, 7.0, 7.0));
    Ok(())
}

#[test]
fn event_stream_tumbles_and_modifier_release_stops_it() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    let radius = rig.distance_to_pivot();
    let start = rig.position();

    let events = [
        InputEvent::KeyDown { key: ModifierKey::Alt },
        primary_down(Point2::new(600.0, 300.0)),
        InputEvent::PointerMove { x: 650.0, y: 310.0 },
        InputEvent::PointerMove { x: 700.0, y: 290.0 },
        InputEvent::KeyUp { key: ModifierKey::Alt },
    ];
    for event in &events {
        rig.handle_event(event, &scene);
    }
    assert_eq!(rig.mode(), ControlMode::Idle);
    assert!((rig.position() - start).magnitude() > 1.0e-3);
    assert!((rig.distance_to_pivot() - radius).abs() < 1.0e-9);

    let after = rig.position();
    assert!(!rig.handle_event(&InputEvent::PointerMove { x: 900.0, y: 100.0 }, &scene));
    assert_eq!(rig.position(), after);
    Ok(())
}

#[test]
fn wheel_and_resize_events() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    let start = rig.distance_to_target();

    assert!(rig.handle_event(&InputEvent::Wheel { delta: 120.0 }, &scene));
    assert!(rig.distance_to_target() < start);

    assert!(rig.handle_event(
        &InputEvent::Resize {
            width: 300.0,
            height: 300.0
        },
        &scene
    ));
    assert_eq!(rig.camera().projection().aspect, 1.0);
    assert!(!rig.handle_event(
        &InputEvent::Resize {
            width: -1.0,
            height: 300.0
        },
        &scene
    ));
    Ok(())
}

#[test]
fn frame_object_centres_target_and_pivot() -> Result<()> {
    let (scene, block) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    let forward = rig.camera().forward();

    assert!(rig.frame_object(block, &scene));

    let centre = Point3::new(4.0, 1.0, 0.0);
    assert!((rig.target() - centre).magnitude() < 1.0e-12);
    assert_eq!(rig.pivot(), rig.target());
    assert!((rig.camera().forward() - forward).magnitude() < 1.0e-9);

    let radius = 3.0_f64.sqrt();
    let expected = radius / 30.0_f64.to_radians().tan() * rig.config().frame_padding;
    assert!((rig.distance_to_target() - expected).abs() < 1.0e-9);
    Ok(())
}

#[test]
fn frame_all_uses_visible_bounds() -> Result<()> {
    let (mut scene, block) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;

    scene.set_visible(block, false)?;
    let Some(bounds) = scene.bounds() else {
        panic!("floor bounds");
    };
    assert!(rig.frame_all(&scene));
    assert!((rig.target() - bounds.center()).magnitude() < 1.0e-12);
    assert_eq!(rig.pivot(), rig.target());
    Ok(())
}

#[test]
fn framing_nothing_is_a_no_op() -> Result<()> {
    let (scene, _) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    let before = rig.snapshot();

    assert!(!rig.frame_all(&Scene::new()));
    assert!(!rig.frame_object(Guid::new(), &scene));
    assert_eq!(rig.snapshot(), before);
    Ok(())
}

#[test]
fn reset_and_restore_views() -> Result<()> {
    let (scene, block) = scene()?;
    let mut rig = CameraRig::new(RigConfig::default())?;
    let home = rig.snapshot();

    rig.frame_object(block, &scene);
    rig.key_down(ModifierKey::Alt);
    rig.begin_drag(PointerButton::Primary, Point2::new(0.0, 0.0));
    rig.on_drag(Point2::new(80.0, 20.0));
    let framed = rig.snapshot();
    assert_ne!(framed, home);

    rig.reset_view();
    assert_eq!(rig.snapshot(), home);
    assert_eq!(rig.mode(), ControlMode::Idle);
    assert!(rig.modifiers().alt);

    rig.restore(&framed)?;
    assert_eq!(rig.snapshot(), framed);
    Ok(())
}
