use crate::limits::VelocityLimits;

/// Scales an operator value in [-1, 1] to an absolute velocity.
///
/// Values outside the range are truncated to the nearest bound. NaN is
/// returned unchanged; callers must not pass it.
pub fn normalize(value: f32, limit: f32) -> f32 {
    value.clamp(-1.0, 1.0) * limit
}

/// Operator intent per axis, each in [-1, 1].
///
/// Positive pan moves right, positive tilt moves up, positive zoom zooms in.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionCommand {
    pub pan: f32,
    pub tilt: f32,
    pub zoom: f32,
}

impl MotionCommand {
    pub fn new(pan: f32, tilt: f32, zoom: f32) -> Self {
        Self { pan, tilt, zoom }
    }

    pub fn pan(value: f32) -> Self {
        Self::new(value, 0.0, 0.0)
    }

    pub fn tilt(value: f32) -> Self {
        Self::new(0.0, value, 0.0)
    }

    pub fn zoom(value: f32) -> Self {
        Self::new(0.0, 0.0, value)
    }

    pub fn is_zoom_only(&self) -> bool {
        self.pan == 0.0 && self.tilt == 0.0 && self.zoom != 0.0
    }

    pub fn normalize(&self, limits: &VelocityLimits) -> Velocity {
        Velocity {
            pan: normalize(self.pan, limits.max_pan()),
            tilt: normalize(self.tilt, limits.max_tilt()),
            zoom: normalize(self.zoom, limits.max_zoom()),
        }
    }
}

/// Absolute velocity sent with a continuous move.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub pan: f32,
    pub tilt: f32,
    pub zoom: f32,
}

/// Axis groups a stop request applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopScope {
    pub pan_tilt: bool,
    pub zoom: bool,
}

impl StopScope {
    pub const ALL: Self = Self {
        pan_tilt: true,
        zoom: true,
    };

    pub const ZOOM: Self = Self {
        pan_tilt: false,
        zoom: true,
    };

    /// Stop scope that ends the given motion. Zoom-only moves leave pan/tilt alone.
    pub fn for_motion(command: &MotionCommand) -> Self {
        if command.is_zoom_only() {
            Self::ZOOM
        } else {
            Self::ALL
        }
    }
}

impl Default for StopScope {
    fn default() -> Self {
        Self::ALL
    }
}
