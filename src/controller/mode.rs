//! The interaction modes of the controller and the state each one carries.

use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use super::{
    animation::Flight,
    camera::PanningPlane,
    spin::{Inertia, SpinState},
};
use crate::selection::SelectionCapture;

/// The mode of a [`NavigationController`](super::component::NavigationController). Exactly one is
/// active at a time, and it alone decides how the next event is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Reflect)]
pub enum ViewerMode {
    /// Viewing, nothing in progress.
    #[default]
    Idle,
    /// Not viewing. Events are left to the scene.
    Interact,
    /// Dragging vertically zooms around the point where the drag started.
    Zooming,
    /// A rectangle is being captured and will be zoomed into.
    BoxZoom,
    /// Dragging translates the camera in a plane.
    Panning,
    /// Dragging orbits the camera around its focal point.
    Dragging,
    /// The camera keeps orbiting after a drag was released.
    Spinning,
    /// Waiting for a click that picks the point to seek to.
    SeekWait,
    /// The camera is flying to a new pose.
    Seek,
    /// The pointer is selecting, either by clicking or by capturing a polygon.
    Selection,
}

impl ViewerMode {
    /// Does this mode move the camera? These modes are counted by
    /// [`NavigationController::interactive_count`](super::component::NavigationController::interactive_count).
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::Zooming
                | Self::BoxZoom
                | Self::Panning
                | Self::Dragging
                | Self::Spinning
                | Self::Seek
        )
    }
}

/// A [`ViewerMode`] together with the data only that mode needs.
///
/// Holding the data in the variant means a panning plane, a spin, and a capture can never outlive
/// the mode they belong to.
#[derive(Debug, Default)]
pub enum ModeState {
    /// See [`ViewerMode::Idle`].
    #[default]
    Idle,
    /// See [`ViewerMode::Interact`].
    Interact,
    /// See [`ViewerMode::Zooming`].
    Zooming {
        /// Normalized viewport position that stays fixed while zooming.
        anchor: Vec2,
    },
    /// See [`ViewerMode::BoxZoom`].
    BoxZoom(SelectionCapture),
    /// See [`ViewerMode::Panning`].
    Panning(PanningPlane),
    /// See [`ViewerMode::Dragging`].
    Dragging(SpinState),
    /// See [`ViewerMode::Spinning`].
    Spinning(Inertia),
    /// See [`ViewerMode::SeekWait`].
    SeekWait,
    /// See [`ViewerMode::Seek`]. `None` when entered without a destination.
    Seek(Option<Flight>),
    /// See [`ViewerMode::Selection`]. Without a capture, the mode only marks a click selection.
    Selection(Option<SelectionCapture>),
}

impl ModeState {
    /// The mode this state belongs to.
    pub fn mode(&self) -> ViewerMode {
        match self {
            Self::Idle => ViewerMode::Idle,
            Self::Interact => ViewerMode::Interact,
            Self::Zooming { .. } => ViewerMode::Zooming,
            Self::BoxZoom(_) => ViewerMode::BoxZoom,
            Self::Panning(_) => ViewerMode::Panning,
            Self::Dragging(_) => ViewerMode::Dragging,
            Self::Spinning(_) => ViewerMode::Spinning,
            Self::SeekWait => ViewerMode::SeekWait,
            Self::Seek(_) => ViewerMode::Seek,
            Self::Selection(_) => ViewerMode::Selection,
        }
    }

    /// Is a selection polygon being captured?
    pub fn has_capture(&self) -> bool {
        matches!(self, Self::BoxZoom(_) | Self::Selection(Some(_)))
    }

    /// The active capture, if any.
    pub fn capture_mut(&mut self) -> Option<&mut SelectionCapture> {
        match self {
            Self::BoxZoom(capture) | Self::Selection(Some(capture)) => Some(capture),
            _ => None,
        }
    }

    /// Is the camera being animated without user input?
    pub fn is_animating(&self) -> bool {
        matches!(self, Self::Spinning(_) | Self::Seek(Some(_)))
    }
}
