//! Provides [`InteractionFlags`], the button and modifier state read by navigation styles.

use bevy_input::{keyboard::KeyCode, mouse::MouseButton};
use bevy_reflect::prelude::*;

use crate::input::{Modifiers, NavEvent, NavEventKind};

/// The three pointer buttons a navigation style can bind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum PointerButton {
    /// The left button.
    Button1,
    /// The right button.
    Button2,
    /// The middle button, usually the wheel.
    Button3,
}

impl PointerButton {
    /// Classify a Bevy mouse button. Extra buttons are not part of any chord.
    pub fn from_mouse(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Button1),
            MouseButton::Right => Some(Self::Button2),
            MouseButton::Middle => Some(Self::Button3),
            _ => None,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Button1 => 0,
            Self::Button2 => 1,
            Self::Button3 => 2,
        }
    }
}

/// Which buttons and modifiers are currently held.
///
/// Updated by the controller on every event before anything else looks at it. Camera and
/// selection code only ever read these.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct InteractionFlags {
    /// Left button held.
    pub button1: bool,
    /// Right button held.
    pub button2: bool,
    /// Middle button held.
    pub button3: bool,
    /// Control held.
    pub ctrl: bool,
    /// Shift held.
    pub shift: bool,
    /// Alt held.
    pub alt: bool,
}

impl InteractionFlags {
    /// Apply an event. Returns `false` if the event involves a button no style can bind, in which
    /// case nothing was changed.
    pub fn update(&mut self, event: &NavEvent) -> bool {
        match event.kind {
            NavEventKind::Press(button) | NavEventKind::Release(button) => {
                let Some(button) = PointerButton::from_mouse(button) else {
                    return false;
                };
                let pressed = matches!(event.kind, NavEventKind::Press(_));
                self.set_modifiers(event.modifiers);
                *self.button_mut(button) = pressed;
            }
            NavEventKind::Key { key, pressed } => {
                self.set_modifiers(event.modifiers);
                match key {
                    KeyCode::ControlLeft | KeyCode::ControlRight => self.ctrl = pressed,
                    KeyCode::ShiftLeft | KeyCode::ShiftRight => self.shift = pressed,
                    KeyCode::AltLeft | KeyCode::AltRight => self.alt = pressed,
                    _ => (),
                }
            }
            _ => self.set_modifiers(event.modifiers),
        }
        true
    }

    /// Is any of the three buttons held?
    pub fn any_button(&self) -> bool {
        self.button1 || self.button2 || self.button3
    }

    /// The modifier part of the flags.
    pub fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl,
            shift: self.shift,
            alt: self.alt,
        }
    }

    fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.ctrl = modifiers.ctrl;
        self.shift = modifiers.shift;
        self.alt = modifiers.alt;
    }

    fn button_mut(&mut self, button: PointerButton) -> &mut bool {
        match button {
            PointerButton::Button1 => &mut self.button1,
            PointerButton::Button2 => &mut self.button2,
            PointerButton::Button3 => &mut self.button3,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy_math::Vec2;

    use super::*;

    #[test]
    fn press_and_release_track_buttons() {
        let mut flags = InteractionFlags::default();
        let t = Duration::ZERO;
        assert!(flags.update(&NavEvent::press(MouseButton::Middle, Vec2::ZERO, t)));
        assert!(flags.button3);
        assert!(flags.any_button());
        assert!(flags.update(&NavEvent::release(MouseButton::Middle, Vec2::ZERO, t)));
        assert!(!flags.any_button());
    }

    #[test]
    fn unknown_buttons_leave_flags_untouched() {
        let mut flags = InteractionFlags {
            ctrl: true,
            ..Default::default()
        };
        let event = NavEvent::press(MouseButton::Back, Vec2::ZERO, Duration::ZERO);
        assert!(!flags.update(&event));
        assert!(flags.ctrl);
        assert!(!flags.any_button());
    }

    #[test]
    fn modifier_key_overrides_snapshot() {
        let mut flags = InteractionFlags::default();
        let event = NavEvent::key(KeyCode::ShiftLeft, true, Vec2::ZERO, Duration::ZERO);
        flags.update(&event);
        assert!(flags.shift);

        let event = NavEvent::motion(Vec2::ONE, Duration::ZERO).with_modifiers(Modifiers::CTRL);
        flags.update(&event);
        assert_eq!(flags.modifiers(), Modifiers::CTRL);
    }
}
