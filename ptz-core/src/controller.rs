use crate::burst::{BurstOutcome, MotionBurst};
use crate::camera::CameraControl;
use crate::error::Result;
use crate::limits::VelocityLimits;
use crate::motion::{MotionCommand, StopScope};
use crate::preset::{Preset, PresetToken};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Turns operator intents into camera requests scaled to the camera's
/// velocity envelope.
pub struct PtzController<C> {
    client: Arc<C>,
    limits: VelocityLimits,
}

impl<C: CameraControl + 'static> PtzController<C> {
    /// Queries the camera's velocity limits, falling back to the defaults
    /// when the query fails for any reason.
    pub async fn connect(client: C) -> Self {
        let limits = match client.velocity_limits().await {
            Ok(limits) => {
                tracing::info!(
                    "velocity limits: pan={:.3} tilt={:.3} zoom={:.3}",
                    limits.max_pan(),
                    limits.max_tilt(),
                    limits.max_zoom()
                );
                limits
            }
            Err(err) => {
                let limits = VelocityLimits::default();
                tracing::warn!(
                    "{err}; using default velocity limits pan={:.3} tilt={:.3} zoom={:.3}",
                    limits.max_pan(),
                    limits.max_tilt(),
                    limits.max_zoom()
                );
                limits
            }
        };
        Self::with_limits(client, limits)
    }

    pub fn with_limits(client: C, limits: VelocityLimits) -> Self {
        Self {
            client: Arc::new(client),
            limits,
        }
    }

    pub fn limits(&self) -> VelocityLimits {
        self.limits
    }

    pub async fn continuous_move(&self, command: MotionCommand) -> Result<()> {
        let velocity = command.normalize(&self.limits);
        tracing::debug!(
            "continuous move: pan={:.3} tilt={:.3} zoom={:.3}",
            velocity.pan,
            velocity.tilt,
            velocity.zoom
        );
        self.client.continuous_move(velocity).await
    }

    pub async fn stop(&self, scope: StopScope) -> Result<()> {
        tracing::debug!("stop: pan_tilt={} zoom={}", scope.pan_tilt, scope.zoom);
        self.client.stop(scope).await
    }

    /// Moves for `duration`, then stops. The stop is attempted even when the
    /// move request fails or the returned future is dropped early.
    pub async fn burst_move(&self, command: MotionCommand, duration: Duration) -> Result<()> {
        self.burst_move_until(command, duration, &CancellationToken::new())
            .await
            .map(|_| ())
    }

    /// Like [`burst_move`](Self::burst_move), but the hold phase ends early
    /// when `cancel` fires.
    pub async fn burst_move_until(
        &self,
        command: MotionCommand,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> Result<BurstOutcome> {
        let velocity = command.normalize(&self.limits);
        let scope = StopScope::for_motion(&command);
        let burst = MotionBurst::start(&self.client, velocity, scope, duration).await;
        burst.finish(cancel).await
    }

    pub async fn goto_preset(&self, token: &str) -> Result<()> {
        tracing::info!("goto preset: {token}");
        self.client.goto_preset(token).await
    }

    pub async fn set_preset(&self, name: &str) -> Result<PresetToken> {
        let token = PresetToken::from(self.client.set_preset(name).await?);
        match &token {
            PresetToken::Assigned(token) => tracing::info!("preset saved: token={token}"),
            PresetToken::Missing => tracing::warn!("no PresetToken returned from camera"),
        }
        Ok(token)
    }

    pub async fn list_presets(&self) -> Result<Vec<Preset>> {
        let presets = self.client.list_presets().await?;
        tracing::debug!("presets: {}", presets.len());
        Ok(presets)
    }
}

#[cfg(test)]
mod success {
    use super::PtzController;
    use crate::camera::MockCameraControl;
    use crate::error::{Operation, PtzError};
    use crate::limits::VelocityLimits;
    use crate::motion::{MotionCommand, StopScope, Velocity};
    use crate::preset::{Preset, PresetToken};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn connect_uses_reported_limits() {
        let mut client = MockCameraControl::new();
        client
            .expect_velocity_limits()
            .times(1)
            .returning(|| VelocityLimits::new(0.7, 0.6, 0.4));

        let controller = PtzController::connect(client).await;

        assert_eq!(
            controller.limits(),
            VelocityLimits::new(0.7, 0.6, 0.4).unwrap()
        );
    }

    #[tokio::test]
    async fn connect_falls_back_when_limits_unavailable() {
        let mut client = MockCameraControl::new();
        client
            .expect_velocity_limits()
            .returning(|| Err(PtzError::LimitsUnavailable("no velocity spaces".to_string())));

        let controller = PtzController::connect(client).await;

        assert_eq!(controller.limits(), VelocityLimits::default());
    }

    #[tokio::test]
    async fn connect_falls_back_on_transport_error() {
        let mut client = MockCameraControl::new();
        client.expect_velocity_limits().returning(|| {
            Err(PtzError::control(
                Operation::GetVelocityLimits,
                "connection refused",
            ))
        });

        let controller = PtzController::connect(client).await;

        assert_eq!(controller.limits(), VelocityLimits::default());
    }

    #[tokio::test]
    async fn continuous_move_scales_by_limits() {
        let mut client = MockCameraControl::new();
        client
            .expect_continuous_move()
            .with(eq(Velocity {
                pan: 0.7,
                tilt: -0.3,
                zoom: 0.0,
            }))
            .times(1)
            .returning(|_| Ok(()));
        let limits = VelocityLimits::new(0.7, 0.6, 0.4).unwrap();
        let controller = PtzController::with_limits(client, limits);

        let result = controller
            .continuous_move(MotionCommand::new(1.0, -0.5, 0.0))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn continuous_move_truncates_out_of_range_input() {
        let mut client = MockCameraControl::new();
        client
            .expect_continuous_move()
            .with(eq(Velocity {
                pan: -0.5,
                tilt: 0.5,
                zoom: 0.5,
            }))
            .times(1)
            .returning(|_| Ok(()));
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        let result = controller
            .continuous_move(MotionCommand::new(-3.0, 2.0, 1.5))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn stop_without_motion_succeeds() {
        let mut client = MockCameraControl::new();
        client
            .expect_stop()
            .with(eq(StopScope::ALL))
            .times(1)
            .returning(|_| Ok(()));
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        assert!(controller.stop(StopScope::ALL).await.is_ok());
    }

    #[tokio::test]
    async fn goto_preset_forwards_token() {
        let mut client = MockCameraControl::new();
        client
            .expect_goto_preset()
            .with(eq("3"))
            .times(1)
            .returning(|_| Ok(()));
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        assert!(controller.goto_preset("3").await.is_ok());
    }

    #[tokio::test]
    async fn set_preset_returns_assigned_token() {
        let mut client = MockCameraControl::new();
        client
            .expect_set_preset()
            .with(eq("door"))
            .times(1)
            .returning(|_| Ok(Some("12".to_string())));
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        let token = controller.set_preset("door").await.unwrap();

        assert_eq!(token, PresetToken::Assigned("12".to_string()));
    }

    #[tokio::test]
    async fn set_preset_without_token_is_not_an_error() {
        let mut client = MockCameraControl::new();
        client.expect_set_preset().returning(|_| Ok(None));
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        let token = controller.set_preset("").await.unwrap();

        assert!(token.is_missing());
        assert_eq!(token.token(), "");
    }

    #[tokio::test]
    async fn list_presets_keeps_camera_order() {
        let mut client = MockCameraControl::new();
        client.expect_list_presets().returning(|| {
            Ok(vec![
                Preset::new("2", "gate"),
                Preset::new("1", "door"),
                Preset::new("5", ""),
            ])
        });
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        let presets = controller.list_presets().await.unwrap();

        let tokens: Vec<&str> = presets.iter().map(|p| p.token.as_str()).collect();
        assert_eq!(tokens, vec!["2", "1", "5"]);
    }

    #[tokio::test]
    async fn list_presets_empty_is_ok() {
        let mut client = MockCameraControl::new();
        client.expect_list_presets().returning(|| Ok(Vec::new()));
        let controller = PtzController::with_limits(client, VelocityLimits::default());

        let presets = controller.list_presets().await.unwrap();

        assert!(presets.is_empty());
    }
}
