use strum::Display;
use thiserror::Error;

/// Camera-side operation a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    ContinuousMove,
    Stop,
    GotoPreset,
    SetPreset,
    ListPresets,
    GetVelocityLimits,
}

#[derive(Error, Debug)]
pub enum PtzError {
    #[error("{operation} request failed: {message}")]
    ControlRequest {
        operation: Operation,
        message: String,
    },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("Velocity limits unavailable: {0}")]
    LimitsUnavailable(String),

    #[error("Stop after burst failed: {source}{}", motion_suffix(.motion_error))]
    StopFailed {
        source: Box<PtzError>,
        motion_error: Option<Box<PtzError>>,
    },
}

impl PtzError {
    pub fn control(operation: Operation, message: impl Into<String>) -> Self {
        Self::ControlRequest {
            operation,
            message: message.into(),
        }
    }

    /// Operation the error is tagged with, if any.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::ControlRequest { operation, .. } => Some(*operation),
            Self::UnknownPreset(_) => Some(Operation::GotoPreset),
            Self::LimitsUnavailable(_) => Some(Operation::GetVelocityLimits),
            Self::StopFailed { .. } => Some(Operation::Stop),
        }
    }
}

fn motion_suffix(motion_error: &Option<Box<PtzError>>) -> String {
    motion_error
        .as_ref()
        .map(|err| format!(" (after motion error: {err})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, PtzError>;

#[cfg(test)]
mod success {
    use super::{Operation, PtzError};

    #[test]
    fn control_request_display_names_operation() {
        let err = PtzError::control(Operation::ContinuousMove, "HTTP 500");

        assert_eq!(err.to_string(), "ContinuousMove request failed: HTTP 500");
        assert_eq!(err.operation(), Some(Operation::ContinuousMove));
    }

    #[test]
    fn stop_failed_display_keeps_motion_error() {
        let err = PtzError::StopFailed {
            source: Box::new(PtzError::control(Operation::Stop, "timeout")),
            motion_error: Some(Box::new(PtzError::control(
                Operation::ContinuousMove,
                "HTTP 400",
            ))),
        };

        assert_eq!(
            err.to_string(),
            "Stop after burst failed: Stop request failed: timeout (after motion error: ContinuousMove request failed: HTTP 400)"
        );
    }

    #[test]
    fn stop_failed_display_without_motion_error() {
        let err = PtzError::StopFailed {
            source: Box::new(PtzError::control(Operation::Stop, "timeout")),
            motion_error: None,
        };

        assert_eq!(
            err.to_string(),
            "Stop after burst failed: Stop request failed: timeout"
        );
    }
}
