pub mod burst;
pub mod camera;
pub mod controller;
pub mod error;
pub mod limits;
pub mod motion;
pub mod preset;

pub use burst::BurstOutcome;
pub use camera::{CameraControl, MockCameraControl};
pub use controller::PtzController;
pub use error::{Operation, PtzError, Result};
pub use limits::VelocityLimits;
pub use motion::{normalize, MotionCommand, StopScope, Velocity};
pub use preset::{Preset, PresetToken};
