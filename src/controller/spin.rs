//! Orbiting: mapping pointer motion onto rotations, and the inertial spin that follows a flick.

use std::time::Duration;

use bevy_log::prelude::*;
use bevy_math::{Quat, Vec2, Vec3};
use bevy_reflect::prelude::*;

use super::{camera::CameraMut, mouse_log::MouseLog};

/// How pointer motion is turned into an orbit rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
pub enum OrbitStyle {
    /// Free rotation following the pointer across a virtual ball.
    #[default]
    Trackball,
    /// Horizontal motion yaws about the world up axis, vertical motion pitches. The horizon stays
    /// level.
    Turntable,
}

/// Tuning of orbiting and inertial spin.
#[derive(Debug, Clone, Reflect)]
pub struct SpinSettings {
    /// World up axis used by [`OrbitStyle::Turntable`].
    pub up: Vec3,
    /// Releases slower than this, in radians per second, do not start a spin.
    pub min_velocity: f32,
    /// A spin ends once it slows below this, in radians per second.
    pub stop_velocity: f32,
    /// Exponential decay rate of the spin velocity, per second.
    pub damping: f32,
    /// The newest pointer sample must be at most this old at release.
    pub max_release_pause: Duration,
    /// The samples used to estimate velocity must span less than this.
    pub max_sample_window: Duration,
    /// Number of recent increments averaged while dragging.
    pub max_samples: u32,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            up: Vec3::Y,
            min_velocity: 0.05,
            stop_velocity: 0.02,
            damping: 1.5,
            max_release_pause: Duration::from_millis(100),
            max_sample_window: Duration::from_millis(300),
            max_samples: 3,
        }
    }
}

/// Projects viewport positions onto a unit sphere blended into a hyperbolic sheet, so dragging
/// anywhere in the viewport produces a rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct SphereSheetProjector {
    /// How projected motion becomes a rotation.
    pub orbit_style: OrbitStyle,
}

impl SphereSheetProjector {
    /// Project a normalized viewport position into camera space. The view center maps to
    /// `(0, 0, 1)`, the side of the sphere facing the camera.
    pub fn project(&self, normalized: Vec2, aspect_ratio: f32) -> Vec3 {
        let mut point = (normalized - Vec2::splat(0.5)) * 2.0;
        if aspect_ratio >= 1.0 {
            point.x *= aspect_ratio;
        } else if aspect_ratio > 0.0 {
            point.y /= aspect_ratio;
        }
        let r2 = point.length_squared();
        let z = if r2 <= 0.5 {
            (1.0 - r2).sqrt()
        } else {
            0.5 / r2.sqrt()
        };
        point.extend(z)
    }

    /// The camera space rotation carrying `from` onto `to`. `up` is the world up axis expressed
    /// in camera space, used by [`OrbitStyle::Turntable`].
    pub fn rotation(&self, from: Vec3, to: Vec3, up: Vec3) -> Quat {
        let (Some(from_dir), Some(to_dir)) = (from.try_normalize(), to.try_normalize()) else {
            return Quat::IDENTITY;
        };
        let arc = Quat::from_rotation_arc(from_dir, to_dir);
        match self.orbit_style {
            OrbitStyle::Trackball => arc,
            OrbitStyle::Turntable => {
                let (_, angle) = arc.to_axis_angle();
                let delta = to - from;
                if delta.y.abs() > delta.x.abs() {
                    Quat::from_axis_angle(Vec3::X, -angle.copysign(delta.y))
                } else if let Some(up) = up.try_normalize() {
                    Quat::from_axis_angle(up, angle.copysign(delta.x))
                } else {
                    arc
                }
            }
        }
    }
}

/// Orbit state while the pointer drags the camera.
#[derive(Debug, Clone, Copy)]
pub struct SpinState {
    last_point: Vec3,
    axis: Vec3,
    angle: f32,
    samples: u32,
}

impl SpinState {
    /// Start a drag at a projected point.
    pub fn new(start: Vec3) -> Self {
        Self {
            last_point: start,
            axis: Vec3::Z,
            angle: 0.0,
            samples: 0,
        }
    }

    /// Move the drag origin without rotating.
    pub fn restart(&mut self, point: Vec3) {
        self.last_point = point;
    }

    /// Rotate the camera so the scene follows the pointer to `to`.
    pub fn spin(
        &mut self,
        to: Vec3,
        projector: &SphereSheetProjector,
        camera: &mut CameraMut,
        settings: &SpinSettings,
    ) {
        let up = camera.transform.rotation.inverse() * settings.up;
        let rotation = projector.rotation(self.last_point, to, up).inverse();
        self.last_point = to;
        camera.reorient(rotation);

        let (axis, angle) = rotation.to_axis_angle();
        if !axis.is_finite() || angle == 0.0 {
            return;
        }
        let samples = self.samples as f32;
        self.angle = (self.angle * samples + angle) / (samples + 1.0);
        self.axis = axis;
        self.samples = (self.samples + 1).min(settings.max_samples.max(1));
    }

    /// The averaged rotation of recent pointer moves.
    pub fn increment(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle)
    }
}

/// A spin that continues after the pointer was released.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Inertia {
    /// Camera space rotation axis.
    pub axis: Vec3,
    /// Angular velocity in radians per second.
    pub velocity: f32,
}

impl Inertia {
    /// Advance the spin by `dt`. Returns `true` once the spin has come to rest.
    pub fn do_spin(&mut self, camera: &mut CameraMut, dt: Duration, settings: &SpinSettings) -> bool {
        if self.velocity <= settings.stop_velocity || !self.axis.is_normalized() {
            return true;
        }
        let dt = dt.as_secs_f32();
        camera.reorient(Quat::from_axis_angle(self.axis, self.velocity * dt));
        self.velocity *= (-settings.damping * dt).exp();
        self.velocity <= settings.stop_velocity
    }
}

/// Estimate the spin to continue with when a drag is released at `release_time`.
///
/// The spin turns about the axis of the averaged drag increment. Its velocity is that increment
/// times the number of moves logged since the oldest sample used, over the time they took. Moves
/// that arrived together share a timestamp, so the oldest sample is the first one at least two
/// moves back that is strictly older than the newest.
///
/// Returns `None` if the pointer had paused before the release, if there are too few samples, or
/// if the movement was too slow.
pub fn estimate_release(
    log: &MouseLog,
    release_time: Duration,
    spin: &SpinState,
    settings: &SpinSettings,
) -> Option<Inertia> {
    let newest = log.get(0)?;
    if release_time.saturating_sub(newest.time) >= settings.max_release_pause {
        trace!("No spin, the pointer paused before release");
        return None;
    }
    let (moves, oldest) = log
        .iter()
        .enumerate()
        .skip(2)
        .find(|(_, sample)| sample.time < newest.time)?;
    let window = newest.time.saturating_sub(oldest.time);
    if window >= settings.max_sample_window {
        return None;
    }

    let (axis, angle) = spin.increment().to_axis_angle();
    let velocity = angle * moves as f32 / window.as_secs_f32();
    (axis.is_normalized() && velocity.is_finite() && velocity > settings.min_velocity)
        .then_some(Inertia { axis, velocity })
}

#[cfg(test)]
mod tests {
    use bevy_math::Vec2;
    use bevy_transform::prelude::*;

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
    fn projector_is_continuous_at_the_sheet_boundary() {
        let projector = SphereSheetProjector::default();
        let r = 0.5f32.sqrt();
        let inside = projector.project(Vec2::new(0.5 + r / 2.0 - 1e-4, 0.5), 1.0);
        let outside = projector.project(Vec2::new(0.5 + r / 2.0 + 1e-4, 0.5), 1.0);
        assert!((inside.z - outside.z).abs() < 1e-3);
        assert_eq!(projector.project(Vec2::splat(0.5), 1.0), Vec3::Z);
    }

    #[test]
    fn turntable_yaws_about_up() {
        let projector = SphereSheetProjector {
            orbit_style: OrbitStyle::Turntable,
        };
        let from = projector.project(Vec2::new(0.5, 0.5), 1.0);
        let to = projector.project(Vec2::new(0.6, 0.52), 1.0);
        let (axis, _) = projector.rotation(from, to, Vec3::Y).to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::Y, 1e-4));

        let to = projector.project(Vec2::new(0.52, 0.6), 1.0);
        let (axis, _) = projector.rotation(from, to, Vec3::Y).to_axis_angle();
        assert!(axis.abs_diff_eq(Vec3::NEG_X, 1e-4));
    }

    #[test]
    fn dragging_keeps_the_focal_point() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let projector = SphereSheetProjector::default();
        let settings = SpinSettings::default();
        let mut spin = SpinState::new(projector.project(Vec2::splat(0.5), 1.0));
        for step in 1..10 {
            let point = Vec2::new(0.5 + step as f32 * 0.02, 0.5);
            spin.spin(projector.project(point, 1.0), &projector, &mut camera, &settings);
        }
        assert!(camera.focal_point().abs_diff_eq(Vec3::ZERO, 1e-3));
        assert!(camera.transform.translation.x.abs() > 0.1);
        assert!(spin.increment().to_axis_angle().1 > 0.0);
    }

    /// Drag right from the view center in 20 pixel steps, `per_frame` moves sharing each
    /// timestamp. The last move lands at `4 * frame_ms`.
    fn flick(camera: &mut CameraMut, frame_ms: u64, per_frame: u64) -> (MouseLog, SpinState) {
        let projector = SphereSheetProjector::default();
        let settings = SpinSettings::default();
        let aspect = camera.camera.aspect_ratio();
        let start = Vec2::new(400.0, 300.0);
        let mut spin = SpinState::new(projector.project(camera.normalize(start), aspect));
        let mut log = MouseLog::default();
        for i in 1..=4 * per_frame {
            let position = start + Vec2::new(i as f32 * 20.0 / per_frame as f32, 0.0);
            log.push(position, ms(i.div_ceil(per_frame) * frame_ms));
            let to = projector.project(camera.normalize(position), aspect);
            spin.spin(to, &projector, camera, &settings);
        }
        (log, spin)
    }

    #[test]
    fn quick_release_starts_a_spin() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let (log, spin) = flick(&mut camera, 16, 1);
        let inertia = estimate_release(&log, ms(74), &spin, &SpinSettings::default());
        let inertia = inertia.expect("a flick should spin");
        assert!(inertia.velocity > 0.05);
        let (axis, _) = spin.increment().to_axis_angle();
        assert!(inertia.axis.abs_diff_eq(axis, 1e-5));
    }

    #[test]
    fn several_moves_per_frame_spin_as_fast_as_one() {
        let settings = SpinSettings::default();
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let (log, spin) = flick(&mut camera, 16, 1);
        let single = estimate_release(&log, ms(74), &spin, &settings).expect("one move per frame");

        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let (log, spin) = flick(&mut camera, 16, 4);
        assert_eq!(log.get(0).map(|s| s.time), log.get(3).map(|s| s.time));
        let batched = estimate_release(&log, ms(74), &spin, &settings).expect("four moves per frame");

        let ratio = batched.velocity / single.velocity;
        assert!((0.5..2.0).contains(&ratio), "velocity ratio {ratio}");
    }

    #[test]
    fn paused_or_short_release_does_not_spin() {
        let settings = SpinSettings::default();
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);

        let (log, spin) = flick(&mut camera, 16, 1);
        assert!(estimate_release(&log, ms(200), &spin, &settings).is_none());

        let (slow, spin) = flick(&mut camera, 200, 1);
        assert!(estimate_release(&slow, ms(810), &spin, &settings).is_none());

        let (same_time, spin) = flick(&mut camera, 0, 1);
        assert!(estimate_release(&same_time, ms(10), &spin, &settings).is_none());

        let mut short = MouseLog::default();
        short.push(Vec2::ZERO, ms(0));
        short.push(Vec2::ONE, ms(10));
        assert!(estimate_release(&short, ms(20), &spin, &settings).is_none());
    }

    #[test]
    fn inertia_decays_to_rest() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let settings = SpinSettings::default();
        let mut inertia = Inertia {
            axis: Vec3::Y,
            velocity: 2.0,
        };
        let mut last = inertia.velocity;
        let mut frames = 0;
        while !inertia.do_spin(&mut camera, ms(16), &settings) {
            assert!(inertia.velocity < last);
            last = inertia.velocity;
            frames += 1;
            assert!(frames < 10_000, "spin never stopped");
        }
        assert!(camera.focal_point().abs_diff_eq(Vec3::ZERO, 1e-3));
    }

    #[test]
    fn slow_inertia_stops_at_once() {
        let (mut transform, mut camera) = rig();
        let mut camera = CameraMut::new(&mut transform, &mut camera);
        let before = *camera.transform;
        let mut inertia = Inertia {
            axis: Vec3::Y,
            velocity: 0.01,
        };
        assert!(inertia.do_spin(&mut camera, ms(16), &SpinSettings::default()));
        assert_eq!(*camera.transform, before);
    }
}
