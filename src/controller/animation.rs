//! Camera flights: smooth transitions of the focal point, orientation and distance, used by seek,
//! animated look-at and animated orientation changes.

use std::time::Duration;

use bevy_math::{
    curve::{Curve, EaseFunction, EasingCurve},
    Quat, Vec3,
};
use bevy_reflect::prelude::*;
use bevy_transform::prelude::*;

use super::camera::CameraMut;

/// Durations and distances of camera flights.
#[derive(Debug, Clone, Reflect)]
pub struct AnimationSettings {
    /// Duration of animated look-at and orientation changes.
    pub duration: Duration,
    /// Duration of a seek flight.
    pub seek_duration: Duration,
    /// Fraction of the distance to the picked point the camera keeps after a seek.
    pub seek_distance: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(400),
            seek_duration: Duration::from_millis(600),
            seek_distance: 0.5,
        }
    }
}

/// A camera pose: where it looks, how it is turned, how far back it sits.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Pose {
    focal_point: Vec3,
    rotation: Quat,
    distance: f32,
}

impl Pose {
    fn of(camera: &CameraMut) -> Self {
        Self {
            focal_point: camera.focal_point(),
            rotation: camera.transform.rotation,
            distance: camera.camera.focal_distance,
        }
    }
}

/// An eased transition between two camera poses.
#[derive(Debug, Clone)]
pub struct Flight {
    start: Duration,
    duration: Duration,
    from: Pose,
    to: Pose,
}

impl Flight {
    fn new(camera: &CameraMut, to: Pose, start: Duration, duration: Duration) -> Self {
        Self {
            start,
            duration,
            from: Pose::of(camera),
            to,
        }
    }

    /// Fly so `point` becomes the focal point, keeping orientation and distance.
    pub fn look_at(camera: &CameraMut, point: Vec3, start: Duration, duration: Duration) -> Self {
        let to = Pose {
            focal_point: point,
            ..Pose::of(camera)
        };
        Self::new(camera, to, start, duration)
    }

    /// Turn to `rotation` around the focal point.
    pub fn reorient(
        camera: &CameraMut,
        rotation: Quat,
        start: Duration,
        duration: Duration,
    ) -> Self {
        let to = Pose {
            rotation: rotation.normalize(),
            ..Pose::of(camera)
        };
        Self::new(camera, to, start, duration)
    }

    /// Fly toward `point`, turning to face it and closing the distance to `fraction` of what it
    /// was.
    pub fn seek(
        camera: &CameraMut,
        point: Vec3,
        fraction: f32,
        start: Duration,
        duration: Duration,
    ) -> Self {
        let eye = camera.transform.translation;
        let up = camera.transform.up();
        let rotation = if (point - eye).length_squared() > f32::EPSILON {
            Transform::from_translation(eye)
                .looking_at(point, up)
                .rotation
        } else {
            camera.transform.rotation
        };
        let distance = (point - eye).length() * fraction.clamp(0.0, 1.0);
        let to = Pose {
            focal_point: point,
            rotation,
            distance: distance.max(f32::EPSILON),
        };
        Self::new(camera, to, start, duration)
    }

    /// Move the camera to where the flight is at `now`. Returns `true` once it has arrived.
    pub fn advance(&self, camera: &mut CameraMut, now: Duration) -> bool {
        let t = if self.duration.is_zero() {
            1.0
        } else {
            now.saturating_sub(self.start).as_secs_f32() / self.duration.as_secs_f32()
        }
        .clamp(0.0, 1.0);
        let progress = EasingCurve::new(0.0, 1.0, EaseFunction::CubicInOut).sample_clamped(t);

        let focal_point = self.from.focal_point.lerp(self.to.focal_point, progress);
        let rotation = self.from.rotation.slerp(self.to.rotation, progress);
        let distance = self.from.distance + (self.to.distance - self.from.distance) * progress;
        camera.set_pose(focal_point, rotation, distance);
        t >= 1.0
    }

    /// Begin the flight at `start` instead.
    pub fn restart(&mut self, start: Duration) {
        self.start = start;
    }

    /// Jump to the destination.
    pub fn finish(&self, camera: &mut CameraMut) {
        camera.set_pose(self.to.focal_point, self.to.rotation, self.to.distance);
    }

    /// The focal point the flight ends at.
    pub fn destination(&self) -> Vec3 {
        self.to.focal_point
    }
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec2;

    use super::*;
    use crate::controller::camera::ViewCamera;

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    fn rig() -> (Transform, ViewCamera) {
        (
            Transform::from_xyz(0.0, 0.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
            ViewCamera::default()
                .with_focal_distance(10.0)
                .with_viewport_size(Vec2::new(800.0, 600.0)),
        )
    }

    #[test]
    fn flight_ends_at_the_target() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let flight = Flight::look_at(&camera, Vec3::new(3.0, 1.0, 0.0), ms(100), ms(400));

        assert!(!flight.advance(&mut camera, ms(100)));
        assert!(camera.focal_point().abs_diff_eq(Vec3::ZERO, 1e-4));

        assert!(!flight.advance(&mut camera, ms(300)));
        let halfway = camera.focal_point();
        assert!(halfway.x > 0.0 && halfway.x < 3.0);

        assert!(flight.advance(&mut camera, ms(500)));
        assert!(camera.focal_point().abs_diff_eq(Vec3::new(3.0, 1.0, 0.0), 1e-4));
    }

    #[test]
    fn seek_faces_the_point_and_closes_in() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let point = Vec3::new(2.0, 0.0, 0.0);
        let flight = Flight::seek(&camera, point, 0.5, Duration::ZERO, ms(100));
        flight.finish(&mut camera);

        assert!(camera.focal_point().abs_diff_eq(point, 1e-4));
        let expected = (point - Vec3::new(0.0, 0.0, 10.0)).length() * 0.5;
        assert!((camera.camera.focal_distance - expected).abs() < 1e-4);
        let to_point = (point - camera.transform.translation).normalize();
        assert!(camera.transform.forward().abs_diff_eq(to_point, 1e-4));
    }

    #[test]
    fn restarting_delays_the_flight() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let target = Vec3::new(3.0, 0.0, 0.0);
        let mut flight = Flight::look_at(&camera, target, Duration::ZERO, ms(400));
        assert_eq!(flight.destination(), target);

        flight.restart(ms(10_000));
        assert!(!flight.advance(&mut camera, ms(10_016)));
        assert!(camera.focal_point().x < 0.1);
        assert!(flight.advance(&mut camera, ms(10_400)));
        assert!(camera.focal_point().abs_diff_eq(target, 1e-4));
    }

    #[test]
    fn zero_duration_arrives_immediately() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let rotation = Quat::from_rotation_y(0.5);
        let flight = Flight::reorient(&camera, rotation, ms(10), Duration::ZERO);
        assert!(flight.advance(&mut camera, ms(10)));
        assert!(camera.transform.rotation.abs_diff_eq(rotation, 1e-5));
        assert!(camera.focal_point().abs_diff_eq(Vec3::ZERO, 1e-4));
    }
}
