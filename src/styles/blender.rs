use super::{ButtonLatch, StyleRequest};
use crate::controller::{flags::InteractionFlags, mode::ViewerMode};

pub(super) fn next_mode(
    flags: &InteractionFlags,
    mode: ViewerMode,
    latch: &mut ButtonLatch,
) -> StyleRequest {
    let mut consumed = false;
    let next = match (flags.button1, flags.button2, flags.button3) {
        (false, false, false) => {
            consumed = std::mem::take(&mut latch.lock_button1);
            Some(ViewerMode::Idle)
        }
        (true, false, false) if latch.lock_button1 || mode == ViewerMode::Spinning => {
            Some(ViewerMode::Idle)
        }
        (true, false, false) => Some(ViewerMode::Selection),
        (false, true, false) if flags.shift => Some(ViewerMode::Panning),
        (false, true, false) => Some(ViewerMode::Idle),
        (false, false, true) if flags.shift => Some(ViewerMode::Panning),
        (false, false, true) if flags.ctrl => Some(ViewerMode::Zooming),
        (false, false, true) => Some(ViewerMode::Dragging),
        (true, true, false) => {
            latch.lock_button1 = true;
            Some(ViewerMode::Panning)
        }
        (false, true, true) => Some(ViewerMode::Panning),
        (true, _, true) => {
            latch.lock_button1 = true;
            None
        }
    };
    StyleRequest {
        mode: next,
        consumed,
    }
}

pub(super) fn mouse_buttons(mode: ViewerMode) -> Option<&'static str> {
    match mode {
        ViewerMode::Selection => Some("Press left mouse button"),
        ViewerMode::Panning => Some("Press SHIFT and middle or right mouse button"),
        ViewerMode::Dragging => Some("Press middle mouse button"),
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
    fn middle_orbits_and_shift_pans() {
        let modes = drive(
            NavigationStyle::Blender,
            &[
                press(Middle),
                release(Middle),
                press_with(Middle, Modifiers::SHIFT),
                release(Middle),
                press_with(Right, Modifiers::SHIFT),
                release(Right),
            ],
        );
        assert_eq!(modes, vec![Dragging, Idle, Panning, Idle, Panning, Idle]);
    }

    #[test]
    fn ctrl_middle_zooms() {
        let modes = drive(
            NavigationStyle::Blender,
            &[press_with(Middle, Modifiers::CTRL), release(Middle)],
        );
        assert_eq!(modes, vec![Zooming, Idle]);
    }

    #[test]
    fn left_after_a_pan_chord_is_latched() {
        let modes = drive(
            NavigationStyle::Blender,
            &[press(Left), press(Right), release(Right), release(Left)],
        );
        assert_eq!(modes, vec![Selection, Panning, Idle, Idle]);
    }
}
