use crate::camera::CameraControl;
use crate::error::{PtzError, Result};
use crate::motion::{StopScope, Velocity};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstOutcome {
    /// The hold phase ran for the full duration.
    Completed,
    /// The hold phase was cut short by the cancellation token.
    Cancelled,
}

/// A continuous move that has been issued and still owes a stop.
///
/// `start` sends the motion; `finish` waits out the hold phase and always
/// sends the stop, whatever happened to the motion request. A burst dropped
/// before `finish` completes hands the stop to a spawned task.
#[must_use = "a started burst must be finished to stop the camera"]
pub(crate) struct MotionBurst<C: CameraControl + 'static> {
    guard: StopGuard<C>,
    deadline: Instant,
    motion: Result<()>,
}

impl<C: CameraControl + 'static> MotionBurst<C> {
    pub(crate) async fn start(
        client: &Arc<C>,
        velocity: Velocity,
        stop_scope: StopScope,
        duration: Duration,
    ) -> Self {
        let deadline = Instant::now() + duration;
        let guard = StopGuard::arm(client, stop_scope);
        tracing::debug!(
            "burst start: pan={:.3} tilt={:.3} zoom={:.3} hold={:?}",
            velocity.pan,
            velocity.tilt,
            velocity.zoom,
            duration
        );
        let motion = client.continuous_move(velocity).await;
        if let Err(err) = &motion {
            tracing::warn!("burst motion failed, stop still pending: {err}");
        }
        Self {
            guard,
            deadline,
            motion,
        }
    }

    pub(crate) async fn finish(mut self, cancel: &CancellationToken) -> Result<BurstOutcome> {
        let outcome = hold(self.deadline, cancel).await;
        if outcome == BurstOutcome::Cancelled {
            tracing::info!("burst cancelled, stopping early");
        }
        let stopped = self.guard.stop().await;
        match (self.motion, stopped) {
            (Ok(()), Ok(())) => Ok(outcome),
            (Err(motion_err), Ok(())) => Err(motion_err),
            (motion, Err(stop_err)) => {
                tracing::error!("stop after burst failed: {stop_err}");
                Err(PtzError::StopFailed {
                    source: Box::new(stop_err),
                    motion_error: motion.err().map(Box::new),
                })
            }
        }
    }
}

/// Stop owed to the camera until `stop` returns.
struct StopGuard<C: CameraControl + 'static> {
    client: Option<Arc<C>>,
    scope: StopScope,
}

impl<C: CameraControl + 'static> StopGuard<C> {
    fn arm(client: &Arc<C>, scope: StopScope) -> Self {
        Self {
            client: Some(Arc::clone(client)),
            scope,
        }
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(client) = self.client.as_ref() else {
            return Ok(());
        };
        let stopped = client.stop(self.scope).await;
        self.client = None;
        stopped
    }
}

impl<C: CameraControl + 'static> Drop for StopGuard<C> {
    fn drop(&mut self) {
        let Some(client) = self.client.take() else {
            return;
        };
        let scope = self.scope;
        match Handle::try_current() {
            Ok(handle) => {
                tracing::warn!("burst dropped before its stop, stopping in background");
                handle.spawn(async move {
                    if let Err(err) = client.stop(scope).await {
                        tracing::error!("stop after dropped burst failed: {err}");
                    }
                });
            }
            Err(_) => tracing::error!("burst dropped outside a runtime, camera not stopped"),
        }
    }
}

async fn hold(deadline: Instant, cancel: &CancellationToken) -> BurstOutcome {
    tokio::select! {
        _ = tokio::time::sleep_until(deadline) => BurstOutcome::Completed,
        _ = cancel.cancelled() => BurstOutcome::Cancelled,
    }
}
