//! Selection polygon capture.
//!
//! While a capture is active the controller hands it every event. The capture decides when the
//! polygon is complete, and the finished polygon is left on the controller for the host's picking
//! code.

use std::fmt;

use bevy_input::{keyboard::KeyCode, mouse::MouseButton};
use bevy_math::prelude::*;
use bevy_reflect::prelude::*;

use crate::input::{NavEvent, NavEventKind};

/// Upper bound on the number of points a freehand capture will collect.
pub const MAX_POLYGON_POINTS: usize = 4096;

/// What a capture wants to happen after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionResponse {
    /// Keep capturing.
    Continue,
    /// The polygon is complete.
    Finish,
    /// Throw the polygon away.
    Cancel,
}

/// The built-in captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SelectionMode {
    /// Freehand polygon.
    Lasso,
    /// Axis-aligned rectangle.
    Rectangle,
    /// Rectangle that is zoomed into instead of selected.
    BoxZoom,
    /// Freehand polygon whose inside is clipped away.
    Clip,
}

/// A way of capturing a selection polygon from pointer events. Positions are logical pixels.
pub trait MouseSelection: Send + Sync + 'static {
    /// The capture received its first point.
    fn begin(&mut self, position: Vec2);

    /// The pointer reached another point.
    fn extend(&mut self, position: Vec2);

    /// Take the captured polygon. The capture is empty afterwards.
    fn end(&mut self) -> Vec<Vec2>;

    /// Has [`MouseSelection::begin`] been called since the last [`MouseSelection::end`]?
    fn is_started(&self) -> bool;

    /// Should the inside of the polygon be clipped rather than selected?
    fn clip_inner(&self) -> bool {
        false
    }

    /// Feed an event. The default mapping draws freehand: presses and moves add points, a right
    /// button release or `Enter` finishes, `Escape` cancels.
    fn handle(&mut self, event: &NavEvent) -> SelectionResponse {
        match event.kind {
            NavEventKind::Press(MouseButton::Left) | NavEventKind::Move => {
                if self.is_started() {
                    self.extend(event.position);
                } else {
                    self.begin(event.position);
                }
                SelectionResponse::Continue
            }
            NavEventKind::Release(MouseButton::Right) if self.is_started() => {
                SelectionResponse::Finish
            }
            NavEventKind::Key {
                key: KeyCode::Enter | KeyCode::NumpadEnter,
                pressed: true,
            } if self.is_started() => SelectionResponse::Finish,
            NavEventKind::Key {
                key: KeyCode::Escape,
                pressed: true,
            } => SelectionResponse::Cancel,
            _ => SelectionResponse::Continue,
        }
    }
}

/// Freehand polygon capture.
#[derive(Debug, Clone, Default)]
pub struct Lasso {
    points: Vec<Vec2>,
    clip_inner: bool,
}

impl Lasso {
    /// A lasso whose polygon clips rather than selects.
    pub fn clip() -> Self {
        Self {
            clip_inner: true,
            ..Default::default()
        }
    }
}

impl MouseSelection for Lasso {
    fn begin(&mut self, position: Vec2) {
        self.points.clear();
        self.points.push(position);
    }

    fn extend(&mut self, position: Vec2) {
        if self.points.len() < MAX_POLYGON_POINTS && self.points.last() != Some(&position) {
            self.points.push(position);
        }
    }

    fn end(&mut self) -> Vec<Vec2> {
        std::mem::take(&mut self.points)
    }

    fn is_started(&self) -> bool {
        !self.points.is_empty()
    }

    fn clip_inner(&self) -> bool {
        self.clip_inner
    }
}

/// Rectangle capture between the press position and the release position.
#[derive(Debug, Clone, Default)]
pub struct RubberBand {
    corners: Option<(Vec2, Vec2)>,
}

impl MouseSelection for RubberBand {
    fn begin(&mut self, position: Vec2) {
        self.corners = Some((position, position));
    }

    fn extend(&mut self, position: Vec2) {
        if let Some((_, last)) = &mut self.corners {
            *last = position;
        }
    }

    /// The four corners, starting at the first corner and winding through the last.
    fn end(&mut self) -> Vec<Vec2> {
        let Some((first, last)) = self.corners.take() else {
            return Vec::new();
        };
        vec![
            first,
            Vec2::new(last.x, first.y),
            last,
            Vec2::new(first.x, last.y),
        ]
    }

    fn is_started(&self) -> bool {
        self.corners.is_some()
    }

    fn handle(&mut self, event: &NavEvent) -> SelectionResponse {
        match event.kind {
            NavEventKind::Press(MouseButton::Left) => {
                self.begin(event.position);
                SelectionResponse::Continue
            }
            NavEventKind::Move => {
                self.extend(event.position);
                SelectionResponse::Continue
            }
            NavEventKind::Release(MouseButton::Left) if self.is_started() => {
                self.extend(event.position);
                SelectionResponse::Finish
            }
            NavEventKind::Key {
                key: KeyCode::Escape,
                pressed: true,
            } => SelectionResponse::Cancel,
            _ => SelectionResponse::Continue,
        }
    }
}

/// An active capture held by the controller.
pub struct SelectionCapture {
    mode: Option<SelectionMode>,
    selection: Box<dyn MouseSelection>,
}

impl SelectionCapture {
    /// One of the built-in captures.
    pub fn new(mode: SelectionMode) -> Self {
        let selection: Box<dyn MouseSelection> = match mode {
            SelectionMode::Lasso => Box::new(Lasso::default()),
            SelectionMode::Clip => Box::new(Lasso::clip()),
            SelectionMode::Rectangle | SelectionMode::BoxZoom => Box::new(RubberBand::default()),
        };
        Self {
            mode: Some(mode),
            selection,
        }
    }

    /// A capture supplied by the host.
    pub fn custom(selection: Box<dyn MouseSelection>) -> Self {
        Self {
            mode: None,
            selection,
        }
    }

    /// The built-in mode, or `None` for a custom capture.
    pub fn mode(&self) -> Option<SelectionMode> {
        self.mode
    }

    /// See [`MouseSelection::handle`].
    pub fn handle(&mut self, event: &NavEvent) -> SelectionResponse {
        self.selection.handle(event)
    }

    /// See [`MouseSelection::end`].
    pub fn end(&mut self) -> Vec<Vec2> {
        self.selection.end()
    }

    /// See [`MouseSelection::clip_inner`].
    pub fn clip_inner(&self) -> bool {
        self.selection.clip_inner()
    }
}

impl fmt::Debug for SelectionCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionCapture")
            .field("mode", &self.mode)
            .field("started", &self.selection.is_started())
            .finish()
    }
}
