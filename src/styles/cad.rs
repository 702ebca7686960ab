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
        (false, true, false) => Some(ViewerMode::Idle),
        (false, false, true) => Some(ViewerMode::Dragging),
        (true, false, true) => {
            latch.lock_button1 = true;
            Some(ViewerMode::Panning)
        }
        (false, true, true) => Some(ViewerMode::Panning),
        (true, true, _) => {
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
        ViewerMode::Panning => {
            Some("Press middle mouse button together with left or right mouse button")
        }
        ViewerMode::Dragging => Some("Press middle mouse button"),
        ViewerMode::Zooming => Some("Scroll the mouse wheel"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use bevy_input::mouse::MouseButton::{Left, Middle, Right};

    use crate::{
        controller::{flags::InteractionFlags, mode::ViewerMode::*},
        styles::{chords::*, drive, ButtonLatch, NavigationStyle},
    };

    #[test]
    fn middle_orbits_and_adding_left_pans() {
        let modes = drive(
            NavigationStyle::Cad,
            &[press(Middle), press(Left), release(Left), release(Middle)],
        );
        assert_eq!(modes, vec![Dragging, Panning, Dragging, Idle]);
    }

    #[test]
    fn latched_left_button_does_not_select() {
        let modes = drive(
            NavigationStyle::Cad,
            &[press(Middle), press(Left), release(Middle), release(Left)],
        );
        assert_eq!(modes, vec![Dragging, Panning, Idle, Idle]);
    }

    #[test]
    fn releasing_everything_clears_the_latch() {
        let mut flags = InteractionFlags::default();
        let mut latch = ButtonLatch::default();
        let style = NavigationStyle::Cad;
        let mut last = None;
        for event in [press(Middle), press(Left), release(Middle), release(Left)] {
            flags.update(&event);
            last = Some(style.next_mode(&flags, &event, Panning, &mut latch));
        }
        assert!(last.is_some_and(|request| request.consumed));
        assert!(!latch.lock_button1);

        let modes = drive(style, &[press(Left), release(Left)]);
        assert_eq!(modes, vec![Selection, Idle]);
    }

    #[test]
    fn right_and_middle_pan() {
        let modes = drive(
            NavigationStyle::Cad,
            &[press(Right), press(Middle), release(Middle), release(Right)],
        );
        assert_eq!(modes, vec![Idle, Panning, Idle, Idle]);
    }
}
