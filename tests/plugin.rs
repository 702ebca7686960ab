use std::time::Duration;

use bevy_app::prelude::*;
use bevy_ecs::{event::Events, prelude::*};
use bevy_input::{
    mouse::{MouseButton, MouseButtonInput},
    ButtonState, InputPlugin,
};
use bevy_math::{Vec2, Vec3};
use bevy_navigation_style::prelude::*;
use bevy_time::{TimePlugin, TimeUpdateStrategy};
use bevy_transform::prelude::*;
use bevy_window::{CursorMoved, RequestRedraw};

fn app() -> (App, Entity, Entity) {
    let mut app = App::new();
    app.add_plugins((TimePlugin, InputPlugin, NavigationPlugin));
    let camera = app
        .world_mut()
        .spawn((
            Transform::from_xyz(0.0, 0.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
            ViewCamera::default().with_focal_distance(10.0),
        ))
        .id();
    let controller = app
        .world_mut()
        .spawn(NavigationController::default().with_viewer(camera))
        .id();
    (app, camera, controller)
}

fn move_cursor(app: &mut App, position: Vec2) {
    app.world_mut().send_event(CursorMoved {
        window: Entity::PLACEHOLDER,
        position,
        delta: None,
    });
}

fn button(app: &mut App, button: MouseButton, state: ButtonState) {
    app.world_mut().send_event(MouseButtonInput {
        button,
        state,
        window: Entity::PLACEHOLDER,
    });
}

fn mode(app: &App, controller: Entity) -> ViewerMode {
    app.world()
        .get::<NavigationController>(controller)
        .unwrap()
        .mode()
}

/// Take every pending event of one type. Bevy only swaps event buffers after a fixed update, so
/// reading the current buffer is not enough.
fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

#[test]
fn middle_drag_pans_the_camera() {
    let (mut app, camera, controller) = app();
    let start = Vec2::new(640.0, 360.0);
    move_cursor(&mut app, start);
    button(&mut app, MouseButton::Middle, ButtonState::Pressed);
    app.update();
    assert_eq!(mode(&app, controller), ViewerMode::Panning);
    let modes = drain::<NavigationModeChanged>(&mut app);
    assert_eq!(modes.last().map(|event| event.mode), Some(ViewerMode::Panning));
    drain::<RequestRedraw>(&mut app);

    let before = *app.world().get::<Transform>(camera).unwrap();
    move_cursor(&mut app, start + Vec2::new(80.0, 0.0));
    app.update();
    let after = *app.world().get::<Transform>(camera).unwrap();
    assert!(after.translation.x < before.translation.x);
    assert_eq!(after.rotation, before.rotation);
    assert!(!drain::<RequestRedraw>(&mut app).is_empty());

    button(&mut app, MouseButton::Middle, ButtonState::Released);
    app.update();
    assert_eq!(mode(&app, controller), ViewerMode::Idle);
}

#[test]
fn right_click_requests_a_context_menu() {
    let (mut app, _, controller) = app();
    let position = Vec2::new(100.0, 200.0);
    move_cursor(&mut app, position);
    button(&mut app, MouseButton::Right, ButtonState::Pressed);
    button(&mut app, MouseButton::Right, ButtonState::Released);
    app.update();

    let menus = drain::<ContextMenuRequested>(&mut app);
    assert_eq!(
        menus,
        vec![ContextMenuRequested {
            controller,
            position
        }]
    );
    assert_eq!(mode(&app, controller), ViewerMode::Idle);
}

#[test]
fn style_requests_switch_the_controller() {
    let (mut app, _, controller) = app();
    app.world_mut().send_event(SetNavigationStyle {
        controller,
        style: NavigationStyle::Blender,
    });
    app.update();
    let style = app
        .world()
        .get::<NavigationController>(controller)
        .unwrap()
        .navigation_style();
    assert_eq!(style, NavigationStyle::Blender);
    assert_eq!(drain::<NavigationStyleChanged>(&mut app).len(), 1);

    app.world_mut().send_event(SetNavigationStyle {
        controller,
        style: NavigationStyle::Blender,
    });
    app.update();
    assert!(drain::<NavigationStyleChanged>(&mut app).is_empty());
}

#[test]
fn unbound_controllers_ignore_input() {
    let (mut app, camera, controller) = app();
    app.world_mut()
        .get_mut::<NavigationController>(controller)
        .unwrap()
        .set_viewer(None);
    let before = *app.world().get::<Transform>(camera).unwrap();
    move_cursor(&mut app, Vec2::new(640.0, 360.0));
    button(&mut app, MouseButton::Middle, ButtonState::Pressed);
    app.update();
    move_cursor(&mut app, Vec2::new(700.0, 360.0));
    app.update();
    assert_eq!(mode(&app, controller), ViewerMode::Idle);
    assert_eq!(*app.world().get::<Transform>(camera).unwrap(), before);
}

#[test]
fn flick_with_several_moves_per_frame_spins_then_settles() {
    let (mut app, camera, controller) = app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(16)));
    let mut position = Vec2::new(640.0, 360.0);
    move_cursor(&mut app, position);
    button(&mut app, MouseButton::Right, ButtonState::Pressed);
    app.update();
    assert_eq!(mode(&app, controller), ViewerMode::Dragging);

    for _ in 0..3 {
        for _ in 0..4 {
            position.x += 5.0;
            move_cursor(&mut app, position);
        }
        app.update();
    }
    button(&mut app, MouseButton::Right, ButtonState::Released);
    app.update();
    assert_eq!(mode(&app, controller), ViewerMode::Spinning);

    let released = app.world().get::<Transform>(camera).unwrap().rotation;
    app.update();
    let spun = app.world().get::<Transform>(camera).unwrap().rotation;
    assert_ne!(spun, released);

    for _ in 0..600 {
        app.update();
        if mode(&app, controller) == ViewerMode::Idle {
            break;
        }
    }
    assert_eq!(mode(&app, controller), ViewerMode::Idle);
    let transform = *app.world().get::<Transform>(camera).unwrap();
    let focal_point = transform.translation + transform.forward() * 10.0;
    assert!(focal_point.abs_diff_eq(Vec3::ZERO, 1e-3));
}

#[test]
fn style_requests_reset_the_cursor_mode() {
    let (mut app, _, controller) = app();
    move_cursor(&mut app, Vec2::new(640.0, 360.0));
    button(&mut app, MouseButton::Middle, ButtonState::Pressed);
    app.update();
    assert_eq!(mode(&app, controller), ViewerMode::Panning);
    drain::<NavigationModeChanged>(&mut app);

    app.world_mut().send_event(SetNavigationStyle {
        controller,
        style: NavigationStyle::Cad,
    });
    app.update();
    let modes = drain::<NavigationModeChanged>(&mut app);
    assert_eq!(
        modes,
        vec![NavigationModeChanged {
            controller,
            mode: ViewerMode::Idle
        }]
    );
}

#[test]
fn idle_pointer_motion_leaves_the_camera_unchanged() {
    let (mut app, camera, controller) = app();
    app.update();
    let last_changed = |app: &App| {
        let entity = app.world().entity(camera);
        (
            entity.get_ref::<Transform>().unwrap().last_changed(),
            entity.get_ref::<ViewCamera>().unwrap().last_changed(),
        )
    };
    let before = last_changed(&app);

    for x in [100.0, 140.0, 180.0] {
        move_cursor(&mut app, Vec2::new(x, 200.0));
        app.update();
    }
    assert_eq!(mode(&app, controller), ViewerMode::Idle);
    assert_eq!(last_changed(&app), before);
}
