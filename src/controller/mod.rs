//! The navigation controller: mode state machine, camera math, and the viewer seam.

pub mod animation;
pub mod camera;
pub mod component;
pub mod flags;
pub mod mode;
pub mod mouse_log;
pub mod spin;
pub mod viewer;
pub mod zoom;
