use crate::config::BurstPolicy;
use ptz_core::{
    BurstOutcome, CameraControl, MotionCommand, PresetToken, PtzController, StopScope,
};
use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// One operator intent, independent of the input mode that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Unit direction; the burst policy decides speed and length.
    Move(MotionCommand),
    Stop,
    ListPresets,
    GotoPreset(String),
    SavePreset(String),
    Quit,
}

/// Raw input decoded by a shell, before any prompt is answered.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Act(Action),
    AskPresetToken,
    AskPresetName,
}

pub struct Session<'a, C> {
    controller: &'a PtzController<C>,
    policy: BurstPolicy,
    cancel: CancellationToken,
}

impl<'a, C: CameraControl + 'static> Session<'a, C> {
    pub fn new(
        controller: &'a PtzController<C>,
        policy: BurstPolicy,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            controller,
            policy,
            cancel,
        }
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Handles actions from `rx` until `Quit`, a closed channel or
    /// cancellation, then stops all motion.
    pub async fn run(&self, mut rx: mpsc::Receiver<Action>) {
        loop {
            let action = tokio::select! {
                action = rx.recv() => action,
                _ = self.cancel.cancelled() => None,
            };
            let Some(action) = action else {
                break;
            };
            if !self.handle(action).await {
                break;
            }
        }
        self.shutdown().await;
    }

    /// Runs one action. Returns `false` when the session should end.
    /// Camera failures are reported and the session goes on.
    pub async fn handle(&self, action: Action) -> bool {
        match action {
            Action::Move(direction) => self.burst(direction).await,
            Action::Stop => {
                if let Err(err) = self.controller.stop(StopScope::ALL).await {
                    report(&err);
                }
            }
            Action::ListPresets => self.list_presets().await,
            Action::GotoPreset(token) => {
                self.stop_before_preset().await;
                match self.controller.goto_preset(&token).await {
                    Ok(()) => say(format!("Moving to preset {token}")),
                    Err(err) => report(&err),
                }
            }
            Action::SavePreset(name) => {
                self.stop_before_preset().await;
                match self.controller.set_preset(&name).await {
                    Ok(PresetToken::Assigned(token)) => say(format!("Preset saved: {token}")),
                    Ok(PresetToken::Missing) => {
                        say("Preset saved, but the camera returned no token")
                    }
                    Err(err) => report(&err),
                }
            }
            Action::Quit => return false,
        }
        true
    }

    /// Final stop issued on every exit path.
    pub async fn shutdown(&self) {
        log::info!("stopping camera before exit");
        if let Err(err) = self.controller.stop(StopScope::ALL).await {
            report(&err);
        }
    }

    async fn burst(&self, direction: MotionCommand) {
        let speed = self.policy.speed;
        let command = MotionCommand::new(
            direction.pan * speed,
            direction.tilt * speed,
            direction.zoom * speed,
        );
        match self
            .controller
            .burst_move_until(command, self.policy.duration, &self.cancel)
            .await
        {
            Ok(BurstOutcome::Completed) => {}
            Ok(BurstOutcome::Cancelled) => log::info!("burst cancelled"),
            Err(err) => report(&err),
        }
    }

    async fn list_presets(&self) {
        match self.controller.list_presets().await {
            Ok(presets) if presets.is_empty() => say("No presets"),
            Ok(presets) => {
                say("Presets:");
                for preset in presets {
                    say(format!("  {}: {}", preset.token, preset.name));
                }
            }
            Err(err) => report(&err),
        }
    }

    async fn stop_before_preset(&self) {
        if let Err(err) = self.controller.stop(StopScope::ALL).await {
            log::warn!("stop before preset failed: {err}");
        }
    }
}

/// Cancels `cancel` once `interrupt` resolves, so the running shell stops the
/// camera and returns. `main` passes `tokio::signal::ctrl_c()`.
pub fn cancel_on_interrupt<F>(interrupt: F, cancel: CancellationToken) -> JoinHandle<()>
where
    F: Future<Output = std::io::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        match interrupt.await {
            Ok(()) => {
                log::info!("interrupted, stopping");
                cancel.cancel();
            }
            Err(err) => log::warn!("interrupt listener unavailable: {err}"),
        }
    })
}

/// Trims a typed preset token. Empty input is rejected with a message.
pub fn preset_token(line: &str) -> Option<String> {
    let token = line.trim();
    if token.is_empty() {
        say("Preset token must not be empty");
        None
    } else {
        Some(token.to_string())
    }
}

/// Prints a line that renders correctly in raw and cooked terminal modes.
pub fn say(line: impl Display) {
    let mut stdout = std::io::stdout().lock();
    let _ = write!(stdout, "{line}\r\n");
    let _ = stdout.flush();
}

fn report(err: &ptz_core::PtzError) {
    log::error!("{err}");
    say(format!("Error: {err}"));
}


#[cfg(test)]
mod failure {
    use super::{preset_token, Action, Session};
    use crate::config::BurstPolicy;
    use ptz_core::{
        MockCameraControl, MotionCommand, Operation, PtzController, PtzError, VelocityLimits,
    };
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    fn session_controller(client: MockCameraControl) -> PtzController<MockCameraControl> {
        PtzController::with_limits(client, VelocityLimits::default())
    }

    fn policy() -> BurstPolicy {
        BurstPolicy {
            speed: 1.0,
            duration: Duration::from_millis(300),
        }
    }

    #[test]
    fn empty_preset_token_is_rejected() {
        assert!(preset_token("   ").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_burst_keeps_session_alive() {
        let mut client = MockCameraControl::new();
        client
            .expect_continuous_move()
            .returning(|_| Err(PtzError::control(Operation::ContinuousMove, "timeout")));
        client.expect_stop().times(1).returning(|_| Ok(()));
        let controller = session_controller(client);
        let session = Session::new(&controller, policy(), CancellationToken::new());

        assert!(session.handle(Action::Move(MotionCommand::tilt(1.0))).await);
    }

    #[tokio::test]
    async fn unknown_preset_keeps_session_alive() {
        let mut client = MockCameraControl::new();
        client.expect_stop().returning(|_| Ok(()));
        client
            .expect_goto_preset()
            .returning(|token| Err(PtzError::UnknownPreset(token.to_string())));
        let controller = session_controller(client);
        let session = Session::new(&controller, policy(), CancellationToken::new());

        assert!(session.handle(Action::GotoPreset("99".to_string())).await);
    }

    #[tokio::test]
    async fn failed_stop_keeps_session_alive() {
        let mut client = MockCameraControl::new();
        client
            .expect_stop()
            .returning(|_| Err(PtzError::control(Operation::Stop, "HTTP 500")));
        let controller = session_controller(client);
        let session = Session::new(&controller, policy(), CancellationToken::new());

        assert!(session.handle(Action::Stop).await);
    }
}
