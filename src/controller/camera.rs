//! Provides [`ViewCamera`] and [`CameraMut`], the camera the controller drives and the geometric
//! operations it applies to it.
//!
//! Positions passed to these operations are normalized viewport coordinates: `(0, 0)` is the
//! bottom-left corner of the viewport and `(1, 1)` the top-right corner.

use std::f32::consts::FRAC_PI_4;

use bevy_ecs::prelude::*;
use bevy_log::prelude::*;
use bevy_math::{bounding::BoundingSphere, primitives::InfinitePlane3d, Dir3, Quat, Ray3d, Vec2, Vec3};
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::zoom::{ZoomLimits, ZoomSettings};

/// Shape of the view volume.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ViewProjection {
    /// A frustum opening by `height_angle` radians.
    Perspective {
        /// Full opening angle, in radians, spanning the shorter side of the viewport.
        height_angle: f32,
    },
    /// A box `height` world units across.
    Orthographic {
        /// Extent in world units of the shorter side of the viewport.
        height: f32,
    },
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self::Perspective {
            height_angle: FRAC_PI_4,
        }
    }
}

/// The camera parameters navigation needs beyond its [`Transform`].
///
/// The camera looks down its local `-Z` axis. The focal point sits `focal_distance` in front of it
/// and is the center of orbiting and zooming.
#[derive(Debug, Clone, Component, Reflect)]
pub struct ViewCamera {
    /// Perspective or orthographic view volume.
    pub projection: ViewProjection,
    /// Distance from the camera to its focal point.
    pub focal_distance: f32,
    /// Size of the viewport in logical pixels.
    pub viewport_size: Vec2,
}

impl Default for ViewCamera {
    fn default() -> Self {
        Self {
            projection: ViewProjection::default(),
            focal_distance: 5.0,
            viewport_size: Vec2::new(1280.0, 720.0),
        }
    }
}

impl ViewCamera {
    /// A perspective camera with the given opening angle.
    pub fn perspective(height_angle: f32) -> Self {
        Self {
            projection: ViewProjection::Perspective { height_angle },
            ..Default::default()
        }
    }

    /// An orthographic camera with the given view height.
    pub fn orthographic(height: f32) -> Self {
        Self {
            projection: ViewProjection::Orthographic { height },
            ..Default::default()
        }
    }

    /// Set the focal distance.
    pub fn with_focal_distance(self, focal_distance: f32) -> Self {
        Self {
            focal_distance,
            ..self
        }
    }

    /// Set the viewport size.
    pub fn with_viewport_size(self, viewport_size: Vec2) -> Self {
        Self {
            viewport_size,
            ..self
        }
    }

    /// Width over height of the viewport. `1.0` for an empty viewport.
    pub fn aspect_ratio(&self) -> f32 {
        let size = self.viewport_size;
        if size.x > 0.0 && size.y > 0.0 {
            size.x / size.y
        } else {
            1.0
        }
    }

    /// Convert a logical pixel position, origin top-left, to a normalized viewport position.
    pub fn normalize(&self, pixel: Vec2) -> Vec2 {
        if self.viewport_size.min_element() < 1.0 {
            warn_once!("Viewport size {} is degenerate", self.viewport_size);
        }
        let size = self.viewport_size.max(Vec2::ONE);
        Vec2::new(pixel.x / size.x, 1.0 - pixel.y / size.y)
    }

    /// Convert a normalized viewport position back to logical pixels.
    pub fn to_pixels(&self, normalized: Vec2) -> Vec2 {
        let size = self.viewport_size.max(Vec2::ONE);
        Vec2::new(normalized.x * size.x, (1.0 - normalized.y) * size.y)
    }

    /// Half extents of the view volume: at unit distance for perspective, absolute for
    /// orthographic. The angle or height spans the shorter side of the viewport.
    pub fn half_extents(&self) -> Vec2 {
        let aspect = self.aspect_ratio();
        let half_height = match self.projection {
            ViewProjection::Perspective { height_angle } => (height_angle * 0.5).tan(),
            ViewProjection::Orthographic { height } => height * 0.5,
        };
        let extents = Vec2::new(half_height * aspect, half_height);
        if aspect < 1.0 {
            extents / aspect
        } else {
            extents
        }
    }
}

/// A plane the pointer is dragged across while panning, fixed for the whole gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanningPlane {
    /// A point on the plane.
    pub origin: Vec3,
    /// The plane normal.
    pub normal: Dir3,
}

impl PanningPlane {
    /// Where the ray hits the plane, if it does.
    pub fn intersect(&self, ray: Ray3d) -> Option<Vec3> {
        let distance = ray.intersect_plane(
            self.origin,
            InfinitePlane3d {
                normal: self.normal,
            },
        )?;
        Some(ray.get_point(distance))
    }
}

/// Rotates a transform around a point.
pub fn rotate_around(transform: &mut Transform, point: Vec3, rotation: Quat) {
    transform.translation = point + rotation * (transform.translation - point);
    transform.rotation = (rotation * transform.rotation).normalize();
}

/// Mutable access to a camera, borrowed from a [`Viewer`](super::viewer::Viewer) for the duration
/// of one operation.
#[derive(Debug)]
pub struct CameraMut<'a> {
    /// The camera pose.
    pub transform: &'a mut Transform,
    /// The camera parameters.
    pub camera: &'a mut ViewCamera,
}

impl<'a> CameraMut<'a> {
    /// Borrow a camera.
    pub fn new(transform: &'a mut Transform, camera: &'a mut ViewCamera) -> Self {
        Self { transform, camera }
    }

    /// The point the camera orbits around and zooms toward.
    pub fn focal_point(&self) -> Vec3 {
        self.transform.translation + self.transform.forward() * self.camera.focal_distance
    }

    /// See [`ViewCamera::normalize`].
    pub fn normalize(&self, pixel: Vec2) -> Vec2 {
        self.camera.normalize(pixel)
    }

    /// The plane through the focal point, facing the camera.
    pub fn focal_plane(&self) -> PanningPlane {
        PanningPlane {
            origin: self.focal_point(),
            normal: self.transform.forward(),
        }
    }

    /// The world space ray through a normalized viewport position.
    pub fn ray(&self, normalized: Vec2) -> Ray3d {
        let offset = (normalized * 2.0 - Vec2::ONE) * self.camera.half_extents();
        let rotation = self.transform.rotation;
        match self.camera.projection {
            ViewProjection::Perspective { .. } => Ray3d {
                origin: self.transform.translation,
                direction: Dir3::new(rotation * offset.extend(-1.0))
                    .unwrap_or(self.transform.forward()),
            },
            ViewProjection::Orthographic { .. } => Ray3d {
                origin: self.transform.translation + rotation * offset.extend(0.0),
                direction: self.transform.forward(),
            },
        }
    }

    /// The normalized viewport position of a world space point. `None` for points behind a
    /// perspective camera.
    pub fn project(&self, world: Vec3) -> Option<Vec2> {
        let local = self.transform.rotation.inverse() * (world - self.transform.translation);
        let extents = self.camera.half_extents();
        let ndc = match self.camera.projection {
            ViewProjection::Perspective { .. } => {
                if local.z >= -f32::EPSILON {
                    return None;
                }
                local.truncate() / -local.z / extents
            }
            ViewProjection::Orthographic { .. } => local.truncate() / extents,
        };
        let normalized = (ndc + Vec2::ONE) * 0.5;
        normalized.is_finite().then_some(normalized)
    }

    /// Rotate the camera around its focal point by a rotation expressed in camera space.
    pub fn reorient(&mut self, rotation: Quat) {
        let focal_point = self.focal_point();
        let world = self.transform.rotation * rotation * self.transform.rotation.inverse();
        rotate_around(self.transform, focal_point, world);
    }

    /// Move the camera so the point of `plane` under `previous` ends up under `current`.
    pub fn pan(&mut self, plane: &PanningPlane, previous: Vec2, current: Vec2) {
        if previous == current {
            return;
        }
        let (Some(from), Some(to)) = (
            plane.intersect(self.ray(previous)),
            plane.intersect(self.ray(current)),
        ) else {
            trace!("Pan ignored, the pointer ray misses the panning plane");
            return;
        };
        self.transform.translation -= to - from;
    }

    /// Pan the focal plane point under `normalized` to the center of the view.
    pub fn pan_to_center(&mut self, normalized: Vec2) {
        let plane = self.focal_plane();
        self.pan(&plane, normalized, Vec2::splat(0.5));
    }

    /// Zoom by `delta`, see [`ZoomSettings`]. Returns `false` if the camera did not change.
    pub fn zoom(&mut self, delta: f32, settings: &ZoomSettings) -> bool {
        self.scale_view(settings.factor(delta), &settings.limits)
    }

    /// Scale the view volume by `factor` around the focal point. Perspective cameras move along
    /// their view axis, orthographic cameras change their height.
    pub fn scale_view(&mut self, factor: f32, limits: &ZoomLimits) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            warn!("Ignoring invalid zoom factor {factor}");
            return false;
        }
        match self.camera.projection {
            ViewProjection::Orthographic { height } => {
                let new_height = limits.clamp(height * factor);
                self.camera.projection = ViewProjection::Orthographic { height: new_height };
                new_height != height
            }
            ViewProjection::Perspective { .. } => {
                let old = self.camera.focal_distance;
                let new = limits.clamp(old * factor);
                let translation =
                    self.transform.translation - self.transform.forward() * (new - old);
                if !translation.is_finite() || translation.length() > f32::MAX.sqrt() {
                    warn!("Refusing to zoom the camera to {translation}");
                    return false;
                }
                self.transform.translation = translation;
                self.camera.focal_distance = new;
                new != old
            }
        }
    }

    /// Zoom by `delta` while keeping the focal plane point under `cursor` fixed on screen.
    pub fn zoom_by_cursor(&mut self, cursor: Vec2, delta: f32, settings: &ZoomSettings) -> bool {
        let center = Vec2::splat(0.5);
        let plane = self.focal_plane();
        self.pan(&plane, cursor, center);
        let zoomed = self.zoom(delta, settings);
        let plane = self.focal_plane();
        self.pan(&plane, center, cursor);
        zoomed
    }

    /// Frame the box spanned by two normalized corners. The longer relative side of the box fills
    /// the view. Returns `false`, leaving the camera untouched, for a box without area.
    pub fn box_zoom(&mut self, corner_a: Vec2, corner_b: Vec2, limits: &ZoomLimits) -> bool {
        let min = corner_a.min(corner_b);
        let max = corner_a.max(corner_b);
        let size = max - min;
        if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
            debug!("Rejecting box zoom with size {size}");
            return false;
        }
        self.pan_to_center((min + max) * 0.5);
        self.scale_view(size.max_element(), limits);
        true
    }

    /// Move the camera, keeping its orientation and focal distance, so `point` becomes the focal
    /// point.
    pub fn look_at(&mut self, point: Vec3) {
        self.transform.translation = point - self.transform.forward() * self.camera.focal_distance;
    }

    /// Turn the camera to `rotation`, keeping the focal point.
    pub fn set_orientation(&mut self, rotation: Quat) {
        let focal_point = self.focal_point();
        self.set_pose(focal_point, rotation, self.camera.focal_distance);
    }

    /// Place the camera `distance` away from `focal_point`, facing it with `rotation`.
    pub fn set_pose(&mut self, focal_point: Vec3, rotation: Quat, distance: f32) {
        self.transform.rotation = rotation.normalize();
        self.camera.focal_distance = distance;
        self.transform.translation = focal_point - self.transform.forward() * distance;
    }

    /// Keep the orientation and fit the bounding sphere into the view.
    pub fn view_all(&mut self, bounds: &BoundingSphere) {
        let center = Vec3::from(bounds.center);
        let radius = bounds.radius();
        if !center.is_finite() || !radius.is_finite() {
            warn!("Ignoring malformed scene bounds {bounds:?}");
            return;
        }
        if radius <= 0.0 {
            self.look_at(center);
            return;
        }
        let distance = match self.camera.projection {
            ViewProjection::Perspective { .. } => {
                let half_angle = self.camera.half_extents().min_element().atan();
                radius / half_angle.sin()
            }
            ViewProjection::Orthographic { .. } => {
                self.camera.projection = ViewProjection::Orthographic {
                    height: 2.0 * radius,
                };
                2.0 * radius
            }
        };
        let rotation = self.transform.rotation;
        self.set_pose(center, rotation, distance);
    }
}
