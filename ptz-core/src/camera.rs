use crate::error::Result;
use crate::limits::VelocityLimits;
use crate::motion::{StopScope, Velocity};
use crate::preset::Preset;
use async_trait::async_trait;
use mockall::automock;

/// Capability surface of a PTZ camera session.
///
/// Implementations tag failures with the operation that produced them.
#[automock]
#[async_trait]
pub trait CameraControl: Send + Sync {
    /// Start moving at a constant velocity until stopped.
    async fn continuous_move(&self, velocity: Velocity) -> Result<()>;

    async fn stop(&self, scope: StopScope) -> Result<()>;

    async fn goto_preset(&self, token: &str) -> Result<()>;

    /// Save the current position. `None` when the camera returns no token.
    async fn set_preset(&self, name: &str) -> Result<Option<String>>;

    async fn list_presets(&self) -> Result<Vec<Preset>>;

    async fn velocity_limits(&self) -> Result<VelocityLimits>;
}
