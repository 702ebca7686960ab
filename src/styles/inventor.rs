use crate::controller::{flags::InteractionFlags, mode::ViewerMode};

pub(super) fn next_mode(flags: &InteractionFlags, mode: ViewerMode) -> Option<ViewerMode> {
    let next = match (flags.button1, flags.button2, flags.button3) {
        (false, false, false) => ViewerMode::Idle,
        (true, false, false) if flags.ctrl => ViewerMode::Dragging,
        (true, false, false) if mode == ViewerMode::Spinning => ViewerMode::Idle,
        (true, false, false) => ViewerMode::Selection,
        (false, true, false) => ViewerMode::Dragging,
        (true, true, false) => ViewerMode::Panning,
        (false, false, true) if flags.ctrl => ViewerMode::Zooming,
        (false, false, true) => ViewerMode::Panning,
        (_, _, true) => ViewerMode::Zooming,
    };
    Some(next)
}

pub(super) fn mouse_buttons(mode: ViewerMode) -> Option<&'static str> {
    match mode {
        ViewerMode::Selection => Some("Press left mouse button"),
        ViewerMode::Panning => Some("Press middle mouse button, or left and right mouse buttons"),
        ViewerMode::Dragging => Some("Press right mouse button, or CTRL and left mouse button"),
        ViewerMode::Zooming => Some("Scroll the mouse wheel, or press CTRL and middle mouse button"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use bevy_input::mouse::MouseButton::{Left, Middle, Right};

    use crate::{
        controller::mode::ViewerMode::*,
        input::Modifiers,
        styles::{chords::*, drive, NavigationStyle},
    };

    #[test]
    fn left_selects_and_right_orbits() {
        let modes = drive(
            NavigationStyle::Inventor,
            &[press(Left), release(Left), press(Right), release(Right)],
        );
        assert_eq!(modes, vec![Selection, Idle, Dragging, Idle]);
    }

    #[test]
    fn middle_pans_and_ctrl_middle_zooms() {
        let modes = drive(
            NavigationStyle::Inventor,
            &[
                press(Middle),
                release(Middle),
                press_with(Middle, Modifiers::CTRL),
                release(Middle),
            ],
        );
        assert_eq!(modes, vec![Panning, Idle, Zooming, Idle]);
    }

    #[test]
    fn ctrl_left_orbits_and_adding_right_pans() {
        let modes = drive(
            NavigationStyle::Inventor,
            &[
                press_with(Left, Modifiers::CTRL),
                press(Right),
                release(Right),
                release(Left),
            ],
        );
        assert_eq!(modes, vec![Dragging, Panning, Selection, Idle]);
    }

    #[test]
    fn modifier_key_changes_the_chord() {
        use bevy_input::keyboard::KeyCode;
        let modes = drive(
            NavigationStyle::Inventor,
            &[
                press(Left),
                key(KeyCode::ControlLeft, true).with_modifiers(Modifiers::CTRL),
                key(KeyCode::ControlLeft, false),
            ],
        );
        assert_eq!(modes, vec![Selection, Dragging, Selection]);
    }
}
