use crate::{
    controller::{flags::InteractionFlags, mode::ViewerMode},
    input::{NavEvent, NavEventKind},
};

pub(super) fn next_mode(flags: &InteractionFlags, event: &NavEvent) -> Option<ViewerMode> {
    if flags.any_button() {
        let only_left = flags.button1 && !flags.button2 && !flags.button3;
        return Some(if only_left {
            ViewerMode::Selection
        } else {
            ViewerMode::Idle
        });
    }
    if let NavEventKind::Gesture(_) = event.kind {
        return Some(ViewerMode::Dragging);
    }
    let next = match (flags.ctrl, flags.shift, flags.alt) {
        (false, true, false) => ViewerMode::Panning,
        (true, true, _) => ViewerMode::Zooming,
        (false, false, true) => ViewerMode::Dragging,
        _ => ViewerMode::Idle,
    };
    Some(next)
}

pub(super) fn mouse_buttons(mode: ViewerMode) -> Option<&'static str> {
    match mode {
        ViewerMode::Selection => Some("Tap or press left button"),
        ViewerMode::Panning => Some("Press SHIFT and move the pointer"),
        ViewerMode::Dragging => Some("Drag with two fingers, or press ALT and move the pointer"),
        ViewerMode::Zooming => Some("Pinch, or press CTRL and SHIFT and move the pointer"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy_input::{keyboard::KeyCode, mouse::MouseButton::Left};
    use bevy_math::Vec2;

    use crate::{
        controller::mode::ViewerMode::*,
        input::{Modifiers, NavEvent, NavEventKind},
        styles::{chords::*, drive, NavigationStyle},
    };

    fn motion(modifiers: Modifiers) -> NavEvent {
        NavEvent::motion(Vec2::ONE, Duration::ZERO).with_modifiers(modifiers)
    }

    #[test]
    fn modifiers_select_the_gesture() {
        let both = Modifiers {
            ctrl: true,
            shift: true,
            alt: false,
        };
        let modes = drive(
            NavigationStyle::Touchpad,
            &[
                motion(Modifiers::SHIFT),
                motion(both),
                motion(Modifiers::ALT),
                motion(Modifiers::NONE),
            ],
        );
        assert_eq!(modes, vec![Panning, Zooming, Dragging, Idle]);
    }

    #[test]
    fn two_finger_drag_orbits_until_the_pointer_moves() {
        let gesture = NavEvent::new(NavEventKind::Gesture(Vec2::X), Vec2::ZERO, Duration::ZERO);
        let modes = drive(
            NavigationStyle::Touchpad,
            &[gesture, gesture, motion(Modifiers::NONE)],
        );
        assert_eq!(modes, vec![Dragging, Dragging, Idle]);
    }

    #[test]
    fn releasing_shift_ends_the_pan() {
        let modes = drive(
            NavigationStyle::Touchpad,
            &[
                key(KeyCode::ShiftLeft, true),
                key(KeyCode::ShiftLeft, false),
                press(Left),
                release(Left),
            ],
        );
        assert_eq!(modes, vec![Panning, Idle, Selection, Idle]);
    }
}
