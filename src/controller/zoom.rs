//! Provides [`ZoomSettings`] and [`ZoomLimits`].

use core::f32;

use bevy_reflect::Reflect;

/// Bound zooming, in world units.
///
/// For perspective cameras the bounds apply to the focal distance, for orthographic cameras to the
/// height of the view volume.
#[derive(Debug, Clone, Reflect)]
pub struct ZoomLimits {
    /// The closest the camera can get to its focal point when zooming in.
    ///
    /// Setting this to a small value will let you zoom in further. If this is too small, you may
    /// begin to encounter floating point errors when panning.
    pub min_distance: f32,
    /// The furthest the camera can get from its focal point when zooming out.
    pub max_distance: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min_distance: 1e-4,
            // Any larger and the squared length of the camera position overflows.
            max_distance: f32::MAX.sqrt(),
        }
    }
}

impl ZoomLimits {
    /// Clamp a distance into the limits.
    pub fn clamp(&self, distance: f32) -> f32 {
        let min = self.min_distance.max(f32::MIN_POSITIVE);
        distance.clamp(min, self.max_distance.max(min))
    }
}

/// How strongly each input zooms.
///
/// A zoom delta `d` scales the view by `base.powf(d)`, so deltas compose additively: two zooms of
/// `d` equal one zoom of `2d`. Positive deltas zoom out.
#[derive(Debug, Clone, Reflect)]
pub struct ZoomSettings {
    /// Base of the exponential zoom curve.
    pub base: f32,
    /// Zoom delta of one wheel notch or one zoom key press.
    pub step: f32,
    /// Zoom delta of dragging across the full height of the viewport.
    pub drag_scale: f32,
    /// Zoom delta per unit of touchpad pinch.
    pub pinch_scale: f32,
    /// Reverse the direction of wheel, key, pinch and drag zooming.
    pub inverted: bool,
    /// See [`ZoomLimits`].
    pub limits: ZoomLimits,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            base: f32::consts::E,
            step: 0.2,
            drag_scale: 10.0,
            pinch_scale: 2.0,
            inverted: false,
            limits: ZoomLimits::default(),
        }
    }
}

impl ZoomSettings {
    /// The scale factor of a zoom delta.
    pub fn factor(&self, delta: f32) -> f32 {
        self.base.powf(delta)
    }

    /// Zoom delta for a number of wheel notches. Scrolling away from the user zooms in.
    pub fn wheel_delta(&self, notches: f32) -> f32 {
        self.oriented(-notches * self.step)
    }

    /// Zoom delta for a vertical drag, in normalized viewport units. Dragging up zooms out.
    pub fn drag_delta(&self, dy: f32) -> f32 {
        self.oriented(dy * self.drag_scale)
    }

    /// Zoom delta for a pinch. Spreading the fingers zooms in.
    pub fn pinch_delta(&self, pinch: f32) -> f32 {
        self.oriented(-pinch * self.pinch_scale)
    }

    fn oriented(&self, delta: f32) -> f32 {
        if self.inverted {
            -delta
        } else {
            delta
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_compose_multiplicatively() {
        let settings = ZoomSettings::default();
        let twice = settings.factor(0.3) * settings.factor(0.3);
        assert!((twice - settings.factor(0.6)).abs() < 1e-5);
        assert_eq!(settings.factor(0.0), 1.0);
    }

    #[test]
    fn inversion_flips_every_input() {
        let mut settings = ZoomSettings::default();
        let wheel = settings.wheel_delta(1.0);
        let pinch = settings.pinch_delta(1.0);
        assert!(wheel < 0.0 && pinch < 0.0);
        settings.inverted = true;
        assert_eq!(settings.wheel_delta(1.0), -wheel);
        assert_eq!(settings.pinch_delta(1.0), -pinch);
    }

    #[test]
    fn limits_never_reach_zero() {
        let limits = ZoomLimits {
            min_distance: 0.0,
            max_distance: 10.0,
        };
        assert!(limits.clamp(-1.0) > 0.0);
        assert_eq!(limits.clamp(50.0), 10.0);
    }
}
