//! Navigation events, and the systems that derive them from Bevy's window and input events.

use std::time::Duration;

use bevy_ecs::prelude::*;
use bevy_input::{
    gestures::{PanGesture, PinchGesture},
    keyboard::{KeyCode, KeyboardInput},
    mouse::{MouseButton, MouseButtonInput, MouseScrollUnit, MouseWheel},
    ButtonInput, ButtonState,
};
use bevy_log::prelude::*;
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;
use bevy_time::prelude::*;
use bevy_window::CursorMoved;

/// Scroll distance, in pixels, treated as one wheel notch.
const PIXELS_PER_LINE: f32 = 100.0;

/// The state of the modifier keys at the time an event was generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct Modifiers {
    /// Either control key is held.
    pub ctrl: bool,
    /// Either shift key is held.
    pub shift: bool,
    /// Either alt key is held.
    pub alt: bool,
}

impl Modifiers {
    /// No modifier held.
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
    };
    /// Only control held.
    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
    };
    /// Only shift held.
    pub const SHIFT: Self = Self {
        ctrl: false,
        shift: true,
        alt: false,
    };
    /// Only alt held.
    pub const ALT: Self = Self {
        ctrl: false,
        shift: false,
        alt: true,
    };

    /// Read the modifier state from the keyboard.
    pub fn from_keys(keys: &ButtonInput<KeyCode>) -> Self {
        Self {
            ctrl: keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]),
            shift: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
            alt: keys.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavEventKind {
    /// A pointer button went down.
    Press(MouseButton),
    /// A pointer button went up.
    Release(MouseButton),
    /// The pointer moved to [`NavEvent::position`].
    Move,
    /// The wheel turned by this many notches. Positive values scroll away from the user.
    Wheel(f32),
    /// A key changed state.
    Key {
        /// The physical key.
        key: KeyCode,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// A two-finger drag on a touchpad surface, in pixels.
    Gesture(Vec2),
    /// A two-finger pinch on a touchpad surface. Positive values spread the fingers.
    Pinch(f32),
}

/// A classified input event consumed by
/// [`NavigationController::process_event`](crate::controller::component::NavigationController::process_event).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NavEvent {
    /// What happened.
    pub kind: NavEventKind,
    /// Pointer position in logical pixels, origin at the top-left of the viewport.
    pub position: Vec2,
    /// Modifier keys held when the event was generated.
    pub modifiers: Modifiers,
    /// Time the event was generated. Only differences between timestamps matter.
    pub time: Duration,
}

impl NavEvent {
    /// Create an event with no modifiers held.
    pub fn new(kind: NavEventKind, position: Vec2, time: Duration) -> Self {
        Self {
            kind,
            position,
            modifiers: Modifiers::NONE,
            time,
        }
    }

    /// A button press at `position`.
    pub fn press(button: MouseButton, position: Vec2, time: Duration) -> Self {
        Self::new(NavEventKind::Press(button), position, time)
    }

    /// A button release at `position`.
    pub fn release(button: MouseButton, position: Vec2, time: Duration) -> Self {
        Self::new(NavEventKind::Release(button), position, time)
    }

    /// A pointer motion to `position`.
    pub fn motion(position: Vec2, time: Duration) -> Self {
        Self::new(NavEventKind::Move, position, time)
    }

    /// A key press or release.
    pub fn key(key: KeyCode, pressed: bool, position: Vec2, time: Duration) -> Self {
        Self::new(NavEventKind::Key { key, pressed }, position, time)
    }

    /// Replace the modifier snapshot.
    #[must_use = "with_modifiers returns a modified NavEvent"]
    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        Self { modifiers, ..self }
    }
}

/// Navigation events gathered this frame, waiting to be routed to controllers.
#[derive(Resource, Debug, Default)]
pub struct NavigationInput {
    /// Events in the order they will be processed.
    pub events: Vec<NavEvent>,
    /// Last known cursor position in logical pixels.
    pub cursor: Vec2,
}

/// Translate this frame's Bevy input events into [`NavEvent`]s.
///
/// Bevy delivers each event type on its own channel, so the relative order between channels is
/// not known. Keyboard events are queued first so modifiers apply to the pointer events that
/// follow, then cursor motion, buttons, wheel and gestures.
#[allow(clippy::too_many_arguments)]
pub fn collect_navigation_input(
    mut input: ResMut<NavigationInput>,
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    mut keyboard: EventReader<KeyboardInput>,
    mut cursor: EventReader<CursorMoved>,
    mut buttons: EventReader<MouseButtonInput>,
    mut wheel: EventReader<MouseWheel>,
    mut pan: EventReader<PanGesture>,
    mut pinch: EventReader<PinchGesture>,
) {
    let now = time.elapsed();
    let modifiers = Modifiers::from_keys(&keys);
    let input = &mut *input;

    for event in keyboard.read() {
        if event.repeat {
            continue;
        }
        input.events.push(
            NavEvent::key(
                event.key_code,
                event.state == ButtonState::Pressed,
                input.cursor,
                now,
            )
            .with_modifiers(modifiers),
        );
    }

    for event in cursor.read() {
        input.cursor = event.position;
        input
            .events
            .push(NavEvent::motion(event.position, now).with_modifiers(modifiers));
    }

    for event in buttons.read() {
        let kind = match event.state {
            ButtonState::Pressed => NavEventKind::Press(event.button),
            ButtonState::Released => NavEventKind::Release(event.button),
        };
        input
            .events
            .push(NavEvent::new(kind, input.cursor, now).with_modifiers(modifiers));
    }

    for event in wheel.read() {
        let notches = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / PIXELS_PER_LINE,
        };
        if notches != 0.0 {
            input.events.push(
                NavEvent::new(NavEventKind::Wheel(notches), input.cursor, now)
                    .with_modifiers(modifiers),
            );
        }
    }

    for event in pan.read() {
        input.events.push(
            NavEvent::new(NavEventKind::Gesture(event.0), input.cursor, now)
                .with_modifiers(modifiers),
        );
    }

    for event in pinch.read() {
        input.events.push(
            NavEvent::new(NavEventKind::Pinch(event.0), input.cursor, now)
                .with_modifiers(modifiers),
        );
    }

    if !input.events.is_empty() {
        trace!("Collected {} navigation events", input.events.len());
    }
}
