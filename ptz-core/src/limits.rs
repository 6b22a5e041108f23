use crate::error::{PtzError, Result};

/// Speed used for every axis when the camera does not report its envelope.
pub const DEFAULT_MAX_SPEED: f32 = 0.5;

/// Maximum continuous velocity per axis, as reported by the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityLimits {
    max_pan: f32,
    max_tilt: f32,
    max_zoom: f32,
}

impl VelocityLimits {
    pub fn new(max_pan: f32, max_tilt: f32, max_zoom: f32) -> Result<Self> {
        for (axis, value) in [("pan", max_pan), ("tilt", max_tilt), ("zoom", max_zoom)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(PtzError::LimitsUnavailable(format!(
                    "{axis} maximum must be positive, got {value}"
                )));
            }
        }
        Ok(Self {
            max_pan,
            max_tilt,
            max_zoom,
        })
    }

    pub fn max_pan(&self) -> f32 {
        self.max_pan
    }

    pub fn max_tilt(&self) -> f32 {
        self.max_tilt
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }
}

impl Default for VelocityLimits {
    fn default() -> Self {
        Self {
            max_pan: DEFAULT_MAX_SPEED,
            max_tilt: DEFAULT_MAX_SPEED,
            max_zoom: DEFAULT_MAX_SPEED,
        }
    }
}

#[cfg(test)]
mod success {
    use super::{VelocityLimits, DEFAULT_MAX_SPEED};

    #[test]
    fn default_is_half_speed_on_every_axis() {
        let limits = VelocityLimits::default();

        assert_eq!(limits.max_pan(), DEFAULT_MAX_SPEED);
        assert_eq!(limits.max_tilt(), DEFAULT_MAX_SPEED);
        assert_eq!(limits.max_zoom(), DEFAULT_MAX_SPEED);
    }

    #[test]
    fn new_keeps_reported_maxima() {
        let limits = VelocityLimits::new(0.7, 0.6, 0.4).unwrap();

        assert_eq!(limits.max_pan(), 0.7);
        assert_eq!(limits.max_tilt(), 0.6);
        assert_eq!(limits.max_zoom(), 0.4);
    }
}

#[cfg(test)]
mod failure {
    use super::VelocityLimits;
    use crate::error::PtzError;

    #[test]
    fn zero_maximum_is_rejected() {
        let result = VelocityLimits::new(1.0, 0.0, 1.0);

        assert!(matches!(result, Err(PtzError::LimitsUnavailable(_))));
    }

    #[test]
    fn negative_maximum_is_rejected() {
        let result = VelocityLimits::new(1.0, 1.0, -0.5);

        assert!(matches!(result, Err(PtzError::LimitsUnavailable(_))));
    }

    #[test]
    fn nan_maximum_is_rejected() {
        let result = VelocityLimits::new(f32::NAN, 1.0, 1.0);

        assert!(matches!(result, Err(PtzError::LimitsUnavailable(_))));
    }
}
