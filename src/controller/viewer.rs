//! The [`Viewer`] trait, through which the controller reaches the camera and the scene.

use std::{fmt, sync::Arc};

use bevy_ecs::prelude::*;
use bevy_math::{bounding::BoundingSphere, Ray3d, Vec2, Vec3};
use bevy_transform::prelude::*;

use super::{
    camera::{CameraMut, ViewCamera},
    mode::ViewerMode,
};

/// What the controller needs from the viewer it navigates.
///
/// Only [`Viewer::camera`] is required. The remaining methods default to "nothing in the scene"
/// and no-op notifications.
pub trait Viewer {
    /// Borrow the camera. Events are rejected while this returns `None`.
    fn camera(&mut self) -> Option<CameraMut<'_>>;

    /// Is there a camera to move? Checked before every event. Override it when borrowing the
    /// camera has side effects, such as change detection.
    fn has_camera(&mut self) -> bool {
        self.camera().is_some()
    }

    /// The first scene point under a pixel position, if any.
    fn pick_point(&mut self, _position: Vec2) -> Option<Vec3> {
        None
    }

    /// Bounds of everything in the scene.
    fn scene_bounds(&mut self) -> Option<BoundingSphere> {
        None
    }

    /// The camera changed and the view should be rendered again.
    fn request_redraw(&mut self) {}

    /// A context menu was requested at a pixel position.
    fn open_popup_menu(&mut self, _position: Vec2) {}

    /// The mode changed, and with it the cursor that should be shown.
    fn set_cursor(&mut self, _mode: ViewerMode) {}
}

/// Finds the first scene point along a world space ray.
///
/// Attach it to the entity holding a
/// [`NavigationController`](super::component::NavigationController) so clicks can recenter and
/// seek onto geometry.
///
/// # Example
///
/// ```
/// # use bevy_navigation_style::prelude::*;
/// # use bevy_math::{primitives::InfinitePlane3d, Vec3};
/// // Everything sits on the ground plane.
/// let picker = ScenePicker::new(|ray| {
///     let distance = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
///     Some(ray.get_point(distance))
/// });
/// ```
#[derive(Component, Clone)]
pub struct ScenePicker {
    /// Returns the first hit along the ray.
    pub pick: Arc<dyn Fn(Ray3d) -> Option<Vec3> + Send + Sync>,
}

impl ScenePicker {
    /// Create a picker from a ray cast function.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Ray3d) -> Option<Vec3> + Send + Sync + 'static,
    {
        Self { pick: Arc::new(f) }
    }

    /// Cast a ray through a pixel position of the camera.
    pub fn pick_through(&self, camera: &CameraMut, position: Vec2) -> Option<Vec3> {
        (self.pick)(camera.ray(camera.normalize(position)))
    }
}

impl fmt::Debug for ScenePicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenePicker")
            .field("pick", &"<function>")
            .finish()
    }
}

/// Bounds of the scene, used when framing everything.
#[derive(Component, Debug, Clone, Copy)]
pub struct SceneBounds(pub BoundingSphere);

/// A [`Viewer`] that owns its camera, for hosts that keep the camera outside of an ECS world.
///
/// Redraw requests and context menu requests are recorded for the host to act on.
#[derive(Debug, Clone, Default)]
pub struct StandaloneViewer {
    /// The camera pose.
    pub transform: Transform,
    /// The camera parameters.
    pub camera: ViewCamera,
    /// Optional scene hit testing.
    pub picker: Option<ScenePicker>,
    /// Optional scene bounds.
    pub bounds: Option<BoundingSphere>,
    /// Number of redraws requested so far.
    pub redraws: usize,
    /// Positions where a context menu was requested, oldest first.
    pub popup_requests: Vec<Vec2>,
    /// The cursor mode last requested.
    pub cursor: ViewerMode,
}

impl StandaloneViewer {
    /// Wrap a camera.
    pub fn new(transform: Transform, camera: ViewCamera) -> Self {
        Self {
            transform,
            camera,
            ..Default::default()
        }
    }

    /// Add scene hit testing.
    pub fn with_picker(self, picker: ScenePicker) -> Self {
        Self {
            picker: Some(picker),
            ..self
        }
    }

    /// Add scene bounds.
    pub fn with_bounds(self, bounds: BoundingSphere) -> Self {
        Self {
            bounds: Some(bounds),
            ..self
        }
    }
}

impl Viewer for StandaloneViewer {
    fn camera(&mut self) -> Option<CameraMut<'_>> {
        Some(CameraMut::new(&mut self.transform, &mut self.camera))
    }

    fn pick_point(&mut self, position: Vec2) -> Option<Vec3> {
        let picker = self.picker.clone()?;
        let camera = self.camera()?;
        picker.pick_through(&camera, position)
    }

    fn scene_bounds(&mut self) -> Option<BoundingSphere> {
        self.bounds
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn open_popup_menu(&mut self, position: Vec2) {
        self.popup_requests.push(position);
    }

    fn set_cursor(&mut self, mode: ViewerMode) {
        self.cursor = mode;
    }
}

/// A viewer without a camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl Viewer for Detached {
    fn camera(&mut self) -> Option<CameraMut<'_>> {
        None
    }
}
