//! The primary [`Component`] of the controller, [`NavigationController`].

use std::time::Duration;

use bevy_ecs::prelude::*;
use bevy_input::keyboard::KeyCode;
use bevy_log::prelude::*;
use bevy_math::{Quat, Rect, Vec2, Vec3};
use bevy_reflect::prelude::*;

use super::{
    animation::{AnimationSettings, Flight},
    camera::CameraMut,
    flags::{InteractionFlags, PointerButton},
    mode::{ModeState, ViewerMode},
    mouse_log::MouseLog,
    spin::{estimate_release, Inertia, OrbitStyle, SphereSheetProjector, SpinSettings, SpinState},
    viewer::Viewer,
    zoom::ZoomSettings,
};
use crate::{
    input::{NavEvent, NavEventKind},
    selection::{MouseSelection, SelectionCapture, SelectionMode, SelectionResponse},
    styles::{ButtonLatch, NavigationStyle, NavigationStyleChanged},
};

/// Fraction of the viewport the arrow keys pan by.
const ARROW_PAN_STEP: f32 = 0.1;

/// When a press and release count as a click.
#[derive(Debug, Clone, Reflect)]
pub struct ClickSettings {
    /// Longest press that is still a click, and longest gap between the presses of a double
    /// click.
    pub double_click_interval: Duration,
    /// How far, in logical pixels, the pointer may move during a click.
    pub click_tolerance: f32,
    /// A short middle click, or shift and left click, recenters the view on the clicked point.
    pub recenter_on_click: bool,
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            double_click_interval: Duration::from_millis(400),
            click_tolerance: 4.0,
            recenter_on_click: true,
        }
    }
}

/// Every tunable of a [`NavigationController`].
#[derive(Debug, Clone, Default, Reflect)]
pub struct NavigationSettings {
    /// Wheel, drag, key and pinch zooming.
    pub zoom: ZoomSettings,
    /// Orbiting and inertial spin.
    pub spin: SpinSettings,
    /// Click detection.
    pub click: ClickSettings,
    /// Camera flights.
    pub animation: AnimationSettings,
}

/// Press times and positions, used to tell clicks from drags.
#[derive(Debug, Clone, Copy, Default)]
struct ClickTracker {
    pressed: [Option<(Duration, Vec2)>; 3],
    dragged: bool,
    last_button1: Option<(Duration, Vec2)>,
}

impl ClickTracker {
    /// Record a press. Returns `true` if it completes a double click of the left button.
    fn press(&mut self, button: PointerButton, event: &NavEvent, settings: &ClickSettings) -> bool {
        self.dragged = false;
        self.pressed[button.index()] = Some((event.time, event.position));
        if button != PointerButton::Button1 {
            return false;
        }
        let double = self.last_button1.is_some_and(|(time, position)| {
            event.time.saturating_sub(time) <= settings.double_click_interval
                && event.position.distance(position) <= settings.click_tolerance
        });
        self.last_button1 = (!double).then_some((event.time, event.position));
        double
    }

    fn motion(&mut self, position: Vec2, settings: &ClickSettings) {
        let moved_away = self
            .pressed
            .iter()
            .flatten()
            .any(|(_, pressed_at)| pressed_at.distance(position) > settings.click_tolerance);
        self.dragged |= moved_away;
    }

    /// Record a release. Returns `true` if the press and release form a click.
    fn release(
        &mut self,
        button: PointerButton,
        event: &NavEvent,
        settings: &ClickSettings,
    ) -> bool {
        let Some((time, position)) = self.pressed[button.index()].take() else {
            return false;
        };
        !self.dragged
            && event.time.saturating_sub(time) <= settings.double_click_interval
            && event.position.distance(position) <= settings.click_tolerance
    }
}

/// What mode-specific handling did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// Nothing; the style decides.
    Ignored,
    /// The camera or the mode data changed; the style still decides the next mode.
    Handled,
    /// The handler already chose the next mode.
    Settled,
}

/// Tracks all state of a viewer's navigation: the mode, held buttons, pointer history, selection
/// polygon and settings.
///
/// See the documentation on the contained fields and types to learn more about each setting.
///
/// # Moving the Camera
///
/// The [`NavigationPlugin`](crate::NavigationPlugin) collects window input, turns it into
/// [`NavEvent`]s, and feeds them to every controller bound to a camera with
/// [`NavigationController::set_viewer`]. Animations advance once per frame.
///
/// Outside of a Bevy app, or to drive a controller manually:
///
/// 1. Implement [`Viewer`] for whatever owns your camera, or use
///    [`StandaloneViewer`](super::viewer::StandaloneViewer).
/// 2. Pass each input event to [`NavigationController::process_event`].
/// 3. Call [`NavigationController::tick`] every frame while
///    [`NavigationController::is_animating`].
#[derive(Debug, Component)]
pub struct NavigationController {
    /// Zoom, spin, click and animation tuning.
    pub settings: NavigationSettings,
    style: NavigationStyle,
    latch: ButtonLatch,
    projector: SphereSheetProjector,
    state: ModeState,
    flags: InteractionFlags,
    log: MouseLog,
    clicks: ClickTracker,
    last_position: Vec2,
    now: Duration,
    /// Time of the event being handled. Animations started outside of event handling begin on
    /// the next tick.
    event_time: Option<Duration>,
    last_tick: Option<Duration>,
    interactive_count: u32,
    animation_enabled: bool,
    popup_menu_enabled: bool,
    polygon: Vec<Vec2>,
    clip_inner: bool,
    cursor: Option<ViewerMode>,
    viewer: Option<Entity>,
}

impl Default for NavigationController {
    fn default() -> Self {
        Self {
            settings: Default::default(),
            style: Default::default(),
            latch: Default::default(),
            projector: Default::default(),
            state: Default::default(),
            flags: Default::default(),
            log: Default::default(),
            clicks: Default::default(),
            last_position: Vec2::ZERO,
            now: Duration::ZERO,
            event_time: None,
            last_tick: None,
            interactive_count: 0,
            animation_enabled: true,
            popup_menu_enabled: true,
            polygon: Vec::new(),
            clip_inner: false,
            cursor: None,
            viewer: None,
        }
    }
}

impl NavigationController {
    /// Create a controller using the given style.
    pub fn new(style: NavigationStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    /// Replace the settings.
    pub fn with_settings(self, settings: NavigationSettings) -> Self {
        Self { settings, ..self }
    }

    /// Bind the controller to the camera entity it should move.
    pub fn with_viewer(self, viewer: Entity) -> Self {
        Self {
            viewer: Some(viewer),
            ..self
        }
    }

    /// Bind, or unbind, the camera entity this controller moves. Events are ignored while unbound.
    pub fn set_viewer(&mut self, viewer: Option<Entity>) {
        self.viewer = viewer;
    }

    /// The camera entity this controller moves.
    pub fn viewer(&self) -> Option<Entity> {
        self.viewer
    }

    /// The current mode.
    pub fn mode(&self) -> ViewerMode {
        self.state.mode()
    }

    /// The buttons and modifiers currently held.
    pub fn flags(&self) -> InteractionFlags {
        self.flags
    }

    /// The recent pointer history of the current orbit.
    pub fn mouse_log(&self) -> &MouseLog {
        &self.log
    }

    /// How many camera-moving modes are active. At most one at a time, so this is `0` or `1`.
    pub fn interactive_count(&self) -> u32 {
        self.interactive_count
    }

    /// The style in use.
    pub fn navigation_style(&self) -> NavigationStyle {
        self.style
    }

    /// Switch to another style. A gesture in progress is abandoned and any selection capture is
    /// discarded. Returns the notification to send, or `None` if the style did not change.
    ///
    /// The viewer is not at hand here, so its cursor is marked stale: see
    /// [`NavigationController::cursor_update`].
    pub fn set_navigation_style(&mut self, style: NavigationStyle) -> Option<NavigationStyleChanged> {
        if style == self.style {
            return None;
        }
        debug!("Navigation style {} -> {}", self.style.name(), style.name());
        self.transition(ModeState::Idle);
        self.style = style;
        self.latch = ButtonLatch::default();
        self.cursor = None;
        Some(NavigationStyleChanged { style })
    }

    /// The mode the viewer's cursor has not been told about yet, if any. The mode is recorded as
    /// told, so a second call returns `None`.
    pub fn cursor_update(&mut self) -> Option<ViewerMode> {
        let mode = self.mode();
        (self.cursor != Some(mode)).then(|| {
            self.cursor = Some(mode);
            mode
        })
    }

    /// The orbit style.
    pub fn orbit_style(&self) -> OrbitStyle {
        self.projector.orbit_style
    }

    /// Set the orbit style. Takes effect on the next orbit.
    pub fn set_orbit_style(&mut self, orbit_style: OrbitStyle) {
        self.projector.orbit_style = orbit_style;
    }

    /// Are inertial spins and flights enabled?
    pub fn is_animation_enabled(&self) -> bool {
        self.animation_enabled
    }

    /// Enable or disable inertial spins and flights. Disabling stops any that are running.
    pub fn set_animation_enabled(&mut self, enabled: bool) {
        self.animation_enabled = enabled;
        if !enabled {
            self.stop_animating();
        }
    }

    /// Is the camera spinning or flying on its own?
    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    /// Spin the camera around a camera space `axis` at `velocity` radians per second.
    pub fn start_animating(&mut self, axis: Vec3, velocity: f32) {
        if !self.animation_enabled {
            return;
        }
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.transition(ModeState::Spinning(Inertia { axis, velocity }));
    }

    /// Stop a spin or flight where it is.
    pub fn stop_animating(&mut self) {
        if self.state.is_animating() {
            self.transition(ModeState::Idle);
        }
    }

    /// Is zooming reversed?
    pub fn is_zoom_inverted(&self) -> bool {
        self.settings.zoom.inverted
    }

    /// Reverse wheel, key, pinch and drag zooming.
    pub fn set_zoom_inverted(&mut self, inverted: bool) {
        self.settings.zoom.inverted = inverted;
    }

    /// Does a right click open a context menu?
    pub fn is_popup_menu_enabled(&self) -> bool {
        self.popup_menu_enabled
    }

    /// Enable or disable context menu requests on right click.
    pub fn set_popup_menu_enabled(&mut self, enabled: bool) {
        self.popup_menu_enabled = enabled;
    }

    /// Are camera gestures interpreted? See [`ViewerMode::Interact`].
    pub fn is_viewing(&self) -> bool {
        self.mode() != ViewerMode::Interact
    }

    /// Interpret camera gestures, or leave events to the scene.
    pub fn set_viewing(&mut self, viewing: bool) {
        let interacting = self.mode() == ViewerMode::Interact;
        if viewing && interacting {
            self.transition(ModeState::Idle);
        } else if !viewing && !interacting {
            self.transition(ModeState::Interact);
        }
    }

    /// Is the controller waiting for, or flying to, a seek point?
    pub fn is_seek_mode(&self) -> bool {
        matches!(self.mode(), ViewerMode::SeekWait | ViewerMode::Seek)
    }

    /// Wait for a click to seek to, or stop waiting.
    pub fn set_seek_mode(&mut self, enabled: bool) {
        match (enabled, self.is_seek_mode()) {
            (true, false) => {
                self.transition(ModeState::SeekWait);
            }
            (false, true) => {
                self.transition(ModeState::Idle);
            }
            _ => (),
        }
    }

    /// Switch modes. Modes with data are entered from rest: a spin without velocity, a seek
    /// without destination. Requesting the current mode does nothing.
    pub fn set_viewing_mode(&mut self, viewer: &mut dyn Viewer, mode: ViewerMode) {
        self.request_mode(viewer, mode);
        self.sync_cursor(viewer);
    }

    /// Handle one input event. Returns `true` if the event was used for navigation, `false` if it
    /// should be passed on to the scene.
    pub fn process_event(&mut self, viewer: &mut dyn Viewer, event: &NavEvent) -> bool {
        if !viewer.has_camera() {
            trace!("Ignoring {:?}, the viewer has no camera", event.kind);
            return false;
        }
        if !self.flags.update(event) {
            return false;
        }
        self.now = self.now.max(event.time);
        self.event_time = Some(event.time);
        let previous = self.last_position;
        if event.kind == NavEventKind::Move {
            self.clicks.motion(event.position, &self.settings.click);
        }

        let processed = if self.state.has_capture() {
            self.last_position = event.position;
            self.route_to_selection(viewer, event)
        } else if self.mode() == ViewerMode::Interact {
            self.last_position = event.position;
            self.handle_interact(viewer, event)
        } else {
            let mode = self.mode();
            let outcome = self.handle_event(viewer, event, previous);
            self.last_position = event.position;
            match outcome {
                Outcome::Settled => true,
                outcome => {
                    let current = self.mode();
                    let request =
                        self.style
                            .next_mode(&self.flags, event, current, &mut self.latch);
                    if let Some(next) = request.mode {
                        self.request_mode(viewer, next);
                    }
                    let entered = self.mode() != mode
                        && !matches!(self.mode(), ViewerMode::Idle | ViewerMode::Selection);
                    outcome == Outcome::Handled || request.consumed || entered
                }
            }
        };

        if processed {
            viewer.request_redraw();
        }
        self.sync_cursor(viewer);
        self.event_time = None;
        processed
    }

    /// Advance spins and flights to `now`. Returns `true` if the camera moved.
    ///
    /// An animation started outside of event handling begins at the first tick after it started.
    pub fn tick(&mut self, viewer: &mut dyn Viewer, now: Duration) -> bool {
        let dt = match self.last_tick {
            Some(last) => now.saturating_sub(last),
            None => {
                if let ModeState::Seek(Some(flight)) = &mut self.state {
                    flight.restart(now);
                }
                Duration::ZERO
            }
        };
        self.last_tick = Some(now);
        self.now = self.now.max(now);
        if !self.animation_enabled || !self.state.is_animating() {
            if let ModeState::Seek(None) = self.state {
                self.transition(ModeState::Idle);
                self.sync_cursor(viewer);
            }
            return false;
        }
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        let finished = match &mut self.state {
            ModeState::Spinning(inertia) => inertia.do_spin(&mut camera, dt, &self.settings.spin),
            ModeState::Seek(Some(flight)) => flight.advance(&mut camera, now),
            _ => true,
        };
        viewer.request_redraw();
        if finished {
            trace!("Animation finished");
            self.transition(ModeState::Idle);
        }
        self.sync_cursor(viewer);
        true
    }

    /// Frame the whole scene, keeping the orientation.
    pub fn view_all(&mut self, viewer: &mut dyn Viewer) -> bool {
        self.cancel_motion();
        let Some(bounds) = viewer.scene_bounds() else {
            debug!("Nothing to frame, the scene has no bounds");
            self.sync_cursor(viewer);
            return false;
        };
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        camera.view_all(&bounds);
        self.finish_direct(viewer)
    }

    /// Turn the camera to `rotation` around its focal point, flying there if animation is enabled.
    pub fn set_camera_orientation(&mut self, viewer: &mut dyn Viewer, rotation: Quat) -> bool {
        self.cancel_motion();
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        if self.animation_enabled {
            let duration = self.settings.animation.duration;
            let flight = Flight::reorient(&camera, rotation, self.now, duration);
            self.fly(flight);
        } else {
            camera.set_orientation(rotation);
        }
        self.finish_direct(viewer)
    }

    /// Make `point` the focal point, flying there if animation is enabled.
    pub fn look_at_point(&mut self, viewer: &mut dyn Viewer, point: Vec3) -> bool {
        self.cancel_motion();
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        if self.animation_enabled {
            let duration = self.settings.animation.duration;
            let flight = Flight::look_at(&camera, point, self.now, duration);
            self.fly(flight);
        } else {
            camera.look_at(point);
        }
        self.finish_direct(viewer)
    }

    /// Make the scene point under a pixel position the focal point. Returns `false` if nothing is
    /// there.
    pub fn look_at_screen_point(&mut self, viewer: &mut dyn Viewer, position: Vec2) -> bool {
        match viewer.pick_point(position) {
            Some(point) => self.look_at_point(viewer, point),
            None => false,
        }
    }

    /// Fly toward the scene point under a pixel position. Returns `false`, and leaves seek mode,
    /// if nothing is there.
    pub fn seek_to_point(&mut self, viewer: &mut dyn Viewer, position: Vec2) -> bool {
        let Some(point) = viewer.pick_point(position) else {
            debug!("Seek missed at {position}");
            self.transition(ModeState::Idle);
            self.sync_cursor(viewer);
            return false;
        };
        self.seek_to_scene_point(viewer, point)
    }

    /// Fly toward a world space point, turning to face it and closing in by
    /// [`AnimationSettings::seek_distance`]. Without animation the camera arrives at once.
    pub fn seek_to_scene_point(&mut self, viewer: &mut dyn Viewer, point: Vec3) -> bool {
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        let animation = &self.settings.animation;
        let flight = Flight::seek(
            &camera,
            point,
            animation.seek_distance,
            self.now,
            animation.seek_duration,
        );
        if self.animation_enabled {
            self.fly(flight);
        } else {
            flight.finish(&mut camera);
            self.transition(ModeState::Idle);
        }
        self.finish_direct(viewer)
    }

    /// Zoom into a rectangle given in logical pixels. Returns `false`, leaving the camera
    /// untouched, if the rectangle has no area.
    pub fn box_zoom(&mut self, viewer: &mut dyn Viewer, rect: Rect) -> bool {
        self.cancel_motion();
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        let corner_a = camera.normalize(rect.min);
        let corner_b = camera.normalize(rect.max);
        if !camera.box_zoom(corner_a, corner_b, &self.settings.zoom.limits) {
            self.sync_cursor(viewer);
            return false;
        }
        self.finish_direct(viewer)
    }

    /// Pan so the scene under a pixel position moves to the center of the view.
    pub fn pan_to_center(&mut self, viewer: &mut dyn Viewer, position: Vec2) -> bool {
        self.cancel_motion();
        let Some(mut camera) = viewer.camera() else {
            return false;
        };
        let normalized = camera.normalize(position);
        camera.pan_to_center(normalized);
        self.finish_direct(viewer)
    }

    /// Start capturing a selection polygon. A capture already in progress is discarded.
    pub fn start_selection(&mut self, mode: SelectionMode) {
        self.begin_capture(SelectionCapture::new(mode));
    }

    /// Start capturing a selection polygon with a capture of your own.
    pub fn start_custom_selection(&mut self, selection: Box<dyn MouseSelection>) {
        self.begin_capture(SelectionCapture::custom(selection));
    }

    /// Finish the capture in progress and return its polygon. Without a capture in progress, the
    /// polygon of the last finished capture is returned.
    pub fn stop_selection(&mut self, viewer: &mut dyn Viewer) -> Vec<Vec2> {
        if self.state.has_capture() {
            self.finish_selection(viewer);
            self.sync_cursor(viewer);
        }
        self.polygon.clone()
    }

    /// Is a selection polygon being captured?
    pub fn is_selecting(&self) -> bool {
        self.state.has_capture()
    }

    /// The last finished selection polygon, in logical pixels, and whether its inside should be
    /// clipped.
    pub fn polygon(&self) -> (&[Vec2], bool) {
        (&self.polygon, self.clip_inner)
    }

    fn handle_event(&mut self, viewer: &mut dyn Viewer, event: &NavEvent, previous: Vec2) -> Outcome {
        match event.kind {
            NavEventKind::Press(button) => match PointerButton::from_mouse(button) {
                Some(button) => self.handle_press(viewer, event, button),
                None => Outcome::Ignored,
            },
            NavEventKind::Release(button) => match PointerButton::from_mouse(button) {
                Some(button) => self.handle_release(viewer, event, button),
                None => Outcome::Ignored,
            },
            NavEventKind::Move => self.handle_motion(viewer, event, previous),
            NavEventKind::Wheel(notches) => {
                if matches!(self.mode(), ViewerMode::Selection | ViewerMode::SeekWait) {
                    return Outcome::Ignored;
                }
                let delta = self.settings.zoom.wheel_delta(notches);
                self.zoom_at(viewer, event.position, delta)
            }
            NavEventKind::Pinch(pinch) => {
                let delta = self.settings.zoom.pinch_delta(pinch);
                self.zoom_at(viewer, event.position, delta)
            }
            NavEventKind::Gesture(delta) => self.handle_gesture(viewer, event.position, delta),
            NavEventKind::Key { key, pressed: true } => self.handle_key(viewer, key),
            NavEventKind::Key { pressed: false, .. } => Outcome::Ignored,
        }
    }

    fn handle_press(&mut self, viewer: &mut dyn Viewer, event: &NavEvent, button: PointerButton) -> Outcome {
        let double_click = self.clicks.press(button, event, &self.settings.click);
        match self.mode() {
            ViewerMode::Spinning => {
                self.transition(ModeState::Idle);
                Outcome::Settled
            }
            ViewerMode::SeekWait if button == PointerButton::Button1 => {
                self.seek_to_point(viewer, event.position);
                Outcome::Settled
            }
            ViewerMode::Idle | ViewerMode::Selection if double_click => {
                self.transition(ModeState::SeekWait);
                Outcome::Settled
            }
            _ => Outcome::Ignored,
        }
    }

    fn handle_release(
        &mut self,
        viewer: &mut dyn Viewer,
        event: &NavEvent,
        button: PointerButton,
    ) -> Outcome {
        let click = self.clicks.release(button, event, &self.settings.click);
        let mode = self.mode();

        if click && !self.flags.any_button() {
            if button == PointerButton::Button2
                && self.popup_menu_enabled
                && matches!(
                    mode,
                    ViewerMode::Idle | ViewerMode::Dragging | ViewerMode::Selection
                )
            {
                self.transition(ModeState::Idle);
                viewer.open_popup_menu(event.position);
                return Outcome::Settled;
            }
            let recenter = button == PointerButton::Button3
                || (button == PointerButton::Button1 && self.flags.shift);
            if recenter
                && self.settings.click.recenter_on_click
                && matches!(
                    mode,
                    ViewerMode::Idle
                        | ViewerMode::Panning
                        | ViewerMode::Dragging
                        | ViewerMode::Zooming
                        | ViewerMode::Selection
                )
            {
                self.transition(ModeState::Idle);
                if !self.look_at_screen_point(viewer, event.position) {
                    self.pan_to_center(viewer, event.position);
                }
                return Outcome::Settled;
            }
        }

        let ModeState::Dragging(spin) = &self.state else {
            return Outcome::Ignored;
        };
        if !self.animation_enabled || !self.style.allows_inertia() {
            return Outcome::Ignored;
        }
        match estimate_release(&self.log, event.time, spin, &self.settings.spin) {
            Some(inertia) => {
                debug!("Spinning at {} rad/s", inertia.velocity);
                self.transition(ModeState::Spinning(inertia));
                Outcome::Handled
            }
            None => Outcome::Ignored,
        }
    }

    fn handle_motion(&mut self, viewer: &mut dyn Viewer, event: &NavEvent, previous: Vec2) -> Outcome {
        if !matches!(
            self.state,
            ModeState::Panning(_) | ModeState::Zooming { .. } | ModeState::Dragging(_)
        ) {
            return Outcome::Ignored;
        }
        let Some(mut camera) = viewer.camera() else {
            return Outcome::Ignored;
        };
        let current = camera.normalize(event.position);
        let before = camera.normalize(previous);
        match &mut self.state {
            ModeState::Panning(plane) => {
                camera.pan(plane, before, current);
                Outcome::Handled
            }
            ModeState::Zooming { anchor } => {
                let delta = self.settings.zoom.drag_delta(current.y - before.y);
                camera.zoom_by_cursor(*anchor, delta, &self.settings.zoom);
                Outcome::Handled
            }
            ModeState::Dragging(spin) => {
                self.log.push(event.position, event.time);
                let aspect = camera.camera.aspect_ratio();
                let to = self.projector.project(current, aspect);
                spin.spin(to, &self.projector, &mut camera, &self.settings.spin);
                Outcome::Handled
            }
            _ => Outcome::Ignored,
        }
    }

    fn handle_gesture(&mut self, viewer: &mut dyn Viewer, position: Vec2, delta: Vec2) -> Outcome {
        let ModeState::Dragging(spin) = &mut self.state else {
            return Outcome::Ignored;
        };
        let Some(mut camera) = viewer.camera() else {
            return Outcome::Ignored;
        };
        let aspect = camera.camera.aspect_ratio();
        let from = self.projector.project(camera.normalize(position), aspect);
        let to = self.projector.project(camera.normalize(position + delta), aspect);
        spin.restart(from);
        spin.spin(to, &self.projector, &mut camera, &self.settings.spin);
        Outcome::Handled
    }

    fn handle_key(&mut self, viewer: &mut dyn Viewer, key: KeyCode) -> Outcome {
        match key {
            KeyCode::KeyS => {
                let enable = !self.is_seek_mode();
                self.set_seek_mode(enable);
                Outcome::Settled
            }
            KeyCode::Escape if self.is_seek_mode() || self.is_animating() => {
                self.transition(ModeState::Idle);
                Outcome::Settled
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                let notches = if key == KeyCode::PageUp { 1.0 } else { -1.0 };
                let delta = self.settings.zoom.wheel_delta(notches);
                self.zoom_at(viewer, self.last_position, delta)
            }
            KeyCode::ArrowLeft | KeyCode::ArrowRight | KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let step = match key {
                    KeyCode::ArrowLeft => Vec2::new(ARROW_PAN_STEP, 0.0),
                    KeyCode::ArrowRight => Vec2::new(-ARROW_PAN_STEP, 0.0),
                    KeyCode::ArrowUp => Vec2::new(0.0, -ARROW_PAN_STEP),
                    _ => Vec2::new(0.0, ARROW_PAN_STEP),
                };
                let Some(mut camera) = viewer.camera() else {
                    return Outcome::Ignored;
                };
                let plane = camera.focal_plane();
                let center = Vec2::splat(0.5);
                camera.pan(&plane, center, center + step);
                Outcome::Handled
            }
            KeyCode::Home | KeyCode::KeyV => {
                self.view_all(viewer);
                Outcome::Settled
            }
            _ => Outcome::Ignored,
        }
    }

    fn handle_interact(&mut self, viewer: &mut dyn Viewer, event: &NavEvent) -> bool {
        let NavEventKind::Release(button) = event.kind else {
            if let NavEventKind::Press(button) = event.kind {
                if let Some(button) = PointerButton::from_mouse(button) {
                    self.clicks.press(button, event, &self.settings.click);
                }
            }
            return false;
        };
        let Some(button) = PointerButton::from_mouse(button) else {
            return false;
        };
        let click = self.clicks.release(button, event, &self.settings.click);
        if click && button == PointerButton::Button2 && self.popup_menu_enabled {
            viewer.open_popup_menu(event.position);
            return true;
        }
        false
    }

    fn zoom_at(&mut self, viewer: &mut dyn Viewer, position: Vec2, delta: f32) -> Outcome {
        if self.mode() == ViewerMode::Seek {
            self.transition(ModeState::Idle);
        }
        let Some(mut camera) = viewer.camera() else {
            return Outcome::Ignored;
        };
        let cursor = camera.normalize(position);
        camera.zoom_by_cursor(cursor, delta, &self.settings.zoom);
        Outcome::Handled
    }

    fn route_to_selection(&mut self, viewer: &mut dyn Viewer, event: &NavEvent) -> bool {
        let Some(capture) = self.state.capture_mut() else {
            return false;
        };
        match capture.handle(event) {
            SelectionResponse::Continue => (),
            SelectionResponse::Finish => self.finish_selection(viewer),
            SelectionResponse::Cancel => {
                debug!("Selection cancelled");
                self.polygon.clear();
                self.transition(ModeState::Idle);
            }
        }
        true
    }

    fn begin_capture(&mut self, capture: SelectionCapture) {
        if self.state.has_capture() {
            debug!("Discarding the selection in progress");
        }
        self.polygon.clear();
        self.clip_inner = capture.clip_inner();
        let next = if capture.mode() == Some(SelectionMode::BoxZoom) {
            ModeState::BoxZoom(capture)
        } else {
            ModeState::Selection(Some(capture))
        };
        self.transition(next);
    }

    fn finish_selection(&mut self, viewer: &mut dyn Viewer) {
        match self.transition(ModeState::Idle) {
            ModeState::BoxZoom(mut capture) => {
                self.polygon.clear();
                let corners = capture.end();
                if let [first, _, last, _] = corners[..] {
                    self.box_zoom(viewer, Rect::from_corners(first, last));
                }
            }
            ModeState::Selection(Some(mut capture)) => {
                self.polygon = capture.end();
                self.clip_inner = capture.clip_inner();
                debug!("Selection finished with {} points", self.polygon.len());
            }
            _ => (),
        }
    }

    fn fly(&mut self, flight: Flight) {
        debug!("Flying to {}", flight.destination());
        self.transition(ModeState::Seek(Some(flight)));
    }

    /// Stop whatever is moving the camera.
    fn cancel_motion(&mut self) {
        if self.mode().is_interactive() || self.mode() == ViewerMode::SeekWait {
            self.transition(ModeState::Idle);
        }
    }

    fn finish_direct(&mut self, viewer: &mut dyn Viewer) -> bool {
        viewer.request_redraw();
        self.sync_cursor(viewer);
        true
    }

    fn request_mode(&mut self, viewer: &mut dyn Viewer, mode: ViewerMode) {
        if mode == self.mode() {
            return;
        }
        let next = match mode {
            ViewerMode::Idle => ModeState::Idle,
            ViewerMode::Interact => ModeState::Interact,
            ViewerMode::SeekWait => ModeState::SeekWait,
            ViewerMode::Seek => ModeState::Seek(None),
            ViewerMode::Selection => ModeState::Selection(None),
            ViewerMode::Spinning => ModeState::Spinning(Inertia::default()),
            ViewerMode::BoxZoom => ModeState::BoxZoom(SelectionCapture::new(SelectionMode::BoxZoom)),
            ViewerMode::Zooming | ViewerMode::Panning | ViewerMode::Dragging => {
                let Some(camera) = viewer.camera() else {
                    return;
                };
                self.gesture_state(mode, &camera)
            }
        };
        self.transition(next);
    }

    fn gesture_state(&self, mode: ViewerMode, camera: &CameraMut) -> ModeState {
        let position = camera.normalize(self.last_position);
        match mode {
            ViewerMode::Panning => ModeState::Panning(camera.focal_plane()),
            ViewerMode::Dragging => {
                let aspect = camera.camera.aspect_ratio();
                ModeState::Dragging(SpinState::new(self.projector.project(position, aspect)))
            }
            _ => ModeState::Zooming { anchor: position },
        }
    }

    /// Replace the mode state, running exit and entry bookkeeping. Returns the old state.
    fn transition(&mut self, next: ModeState) -> ModeState {
        let old = self.state.mode();
        let new = next.mode();
        if old.is_interactive() {
            self.interactive_count = self.interactive_count.saturating_sub(1);
        }
        if new.is_interactive() {
            self.interactive_count += 1;
        }
        if new != ViewerMode::Spinning {
            self.log.clear();
        }
        if next.is_animating() {
            self.last_tick = self.event_time;
        }
        if old != new {
            debug!("Viewer mode {old:?} -> {new:?}");
        }
        std::mem::replace(&mut self.state, next)
    }

    fn sync_cursor(&mut self, viewer: &mut dyn Viewer) {
        if let Some(mode) = self.cursor_update() {
            viewer.set_cursor(mode);
        }
    }
}
