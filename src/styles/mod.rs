//! Navigation styles: which button and modifier chords drive which camera mode.
//!
//! A style never touches the camera. Given the held buttons and modifiers, the event that just
//! happened and the current mode, it names the mode the controller should be in next. The
//! controller performs the transition.

mod blender;
mod cad;
mod inventor;
mod touchpad;

use bevy_ecs::prelude::*;
use bevy_input::keyboard::KeyCode;
use bevy_reflect::prelude::*;

use crate::{
    controller::{flags::InteractionFlags, mode::ViewerMode},
    input::{NavEvent, NavEventKind},
};

/// The navigation styles a controller can use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum NavigationStyle {
    /// Open Inventor examiner viewer chords. Left selects, right or ctrl+left orbits, middle pans.
    #[default]
    Inventor,
    /// CAD chords. Middle orbits, middle with left or right pans.
    Cad,
    /// Blender chords. Middle orbits, shift+middle pans, ctrl+middle zooms.
    Blender,
    /// For touchpads. Two-finger drag orbits, shift pans, ctrl+shift zooms, pinch zooms.
    Touchpad,
    /// Never requests a mode. Used while another tool owns the pointer.
    Internal,
}

/// Every style, in menu order.
pub const ALL_STYLES: [NavigationStyle; 5] = [
    NavigationStyle::Inventor,
    NavigationStyle::Cad,
    NavigationStyle::Blender,
    NavigationStyle::Touchpad,
    NavigationStyle::Internal,
];

/// Sent when a controller switches to a different style.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationStyleChanged {
    /// The style now in use.
    pub style: NavigationStyle,
}

/// Set when the left button took part in a navigation chord, so that releasing the other buttons
/// does not turn the still held left button into a selection click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub struct ButtonLatch {
    /// The left button is latched.
    pub lock_button1: bool,
}

/// The outcome of consulting a style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleRequest {
    /// The mode to switch to, or `None` to stay.
    pub mode: Option<ViewerMode>,
    /// The style used up the event.
    pub consumed: bool,
}

impl StyleRequest {
    const NONE: Self = Self {
        mode: None,
        consumed: false,
    };
}

impl From<Option<ViewerMode>> for StyleRequest {
    fn from(mode: Option<ViewerMode>) -> Self {
        Self {
            mode,
            consumed: false,
        }
    }
}

impl NavigationStyle {
    /// The mode the controller should switch to after `event`. `flags` already include the event.
    pub fn next_mode(
        self,
        flags: &InteractionFlags,
        event: &NavEvent,
        mode: ViewerMode,
        latch: &mut ButtonLatch,
    ) -> StyleRequest {
        if mode == ViewerMode::Interact || !self.reacts_to(event) {
            return StyleRequest::NONE;
        }
        if !flags.any_button()
            && matches!(
                mode,
                ViewerMode::Spinning | ViewerMode::SeekWait | ViewerMode::Seek
            )
        {
            latch.lock_button1 = false;
            return StyleRequest::NONE;
        }
        match self {
            Self::Inventor => inventor::next_mode(flags, mode).into(),
            Self::Cad => cad::next_mode(flags, mode, latch),
            Self::Blender => blender::next_mode(flags, mode, latch),
            Self::Touchpad => touchpad::next_mode(flags, event).into(),
            Self::Internal => StyleRequest::NONE,
        }
    }

    /// A one-line description of the chord that enters `mode`.
    pub fn mouse_buttons(self, mode: ViewerMode) -> &'static str {
        let legend = match self {
            Self::Inventor => inventor::mouse_buttons(mode),
            Self::Cad => cad::mouse_buttons(mode),
            Self::Blender => blender::mouse_buttons(mode),
            Self::Touchpad => touchpad::mouse_buttons(mode),
            Self::Internal => None,
        };
        legend.unwrap_or("No description")
    }

    /// May a released orbit keep spinning?
    pub fn allows_inertia(self) -> bool {
        !matches!(self, Self::Touchpad)
    }

    /// Should the style be offered to users?
    pub fn is_user_selectable(self) -> bool {
        !matches!(self, Self::Internal)
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Inventor => "Inventor",
            Self::Cad => "CAD",
            Self::Blender => "Blender",
            Self::Touchpad => "Touchpad",
            Self::Internal => "Internal",
        }
    }

    fn reacts_to(self, event: &NavEvent) -> bool {
        match event.kind {
            NavEventKind::Press(_) | NavEventKind::Release(_) => true,
            NavEventKind::Key { key, .. } => is_modifier(key),
            NavEventKind::Move | NavEventKind::Gesture(_) => self == Self::Touchpad,
            NavEventKind::Wheel(_) | NavEventKind::Pinch(_) => false,
        }
    }
}

fn is_modifier(key: KeyCode) -> bool {
    matches!(
        key,
        KeyCode::ControlLeft
            | KeyCode::ControlRight
            | KeyCode::ShiftLeft
            | KeyCode::ShiftRight
            | KeyCode::AltLeft
            | KeyCode::AltRight
    )
}

/// Run a style over a sequence of events, applying every requested mode. Returns the mode after
/// each event.
#[cfg(test)]
pub(crate) fn drive(style: NavigationStyle, events: &[NavEvent]) -> Vec<ViewerMode> {
    let mut flags = InteractionFlags::default();
    let mut latch = ButtonLatch::default();
    let mut mode = ViewerMode::Idle;
    events
        .iter()
        .map(|event| {
            flags.update(event);
            if let Some(next) = style.next_mode(&flags, event, mode, &mut latch).mode {
                mode = next;
            }
            mode
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod chords {
    use std::time::Duration;

    use bevy_input::{keyboard::KeyCode, mouse::MouseButton};
    use bevy_math::Vec2;

    use crate::input::{Modifiers, NavEvent};

    pub fn press(button: MouseButton) -> NavEvent {
        NavEvent::press(button, Vec2::ZERO, Duration::ZERO)
    }

    pub fn release(button: MouseButton) -> NavEvent {
        NavEvent::release(button, Vec2::ZERO, Duration::ZERO)
    }

    pub fn press_with(button: MouseButton, modifiers: Modifiers) -> NavEvent {
        press(button).with_modifiers(modifiers)
    }

    pub fn key(key: KeyCode, pressed: bool) -> NavEvent {
        NavEvent::key(key, pressed, Vec2::ZERO, Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use bevy_input::mouse::MouseButton;

    use super::{chords::*, *};

    #[test]
    fn only_internal_is_hidden_from_users() {
        let hidden: Vec<_> = ALL_STYLES
            .iter()
            .filter(|style| !style.is_user_selectable())
            .collect();
        assert_eq!(hidden, vec![&NavigationStyle::Internal]);
    }

    #[test]
    fn internal_style_never_requests_a_mode() {
        let modes = drive(
            NavigationStyle::Internal,
            &[press(MouseButton::Middle), release(MouseButton::Middle)],
        );
        assert_eq!(modes, vec![ViewerMode::Idle, ViewerMode::Idle]);
    }

    #[test]
    fn releasing_keeps_an_inertial_spin() {
        let flags = InteractionFlags::default();
        let mut latch = ButtonLatch::default();
        for style in ALL_STYLES {
            let request = style.next_mode(
                &flags,
                &release(MouseButton::Right),
                ViewerMode::Spinning,
                &mut latch,
            );
            assert_eq!(request.mode, None, "{}", style.name());
        }
    }

    #[test]
    fn every_style_describes_orbiting() {
        for style in ALL_STYLES.into_iter().filter(|s| s.is_user_selectable()) {
            assert_ne!(style.mouse_buttons(ViewerMode::Dragging), "No description");
        }
        assert_eq!(
            NavigationStyle::Internal.mouse_buttons(ViewerMode::Dragging),
            "No description"
        );
    }

    #[test]
    fn touchpad_does_not_spin() {
        assert!(!NavigationStyle::Touchpad.allows_inertia());
        assert!(NavigationStyle::Cad.allows_inertia());
    }
}
