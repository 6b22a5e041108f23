use crate::ptz_session::{self, Action, Input, Session};
use anyhow::{Context, Result};
use ptz_core::{CameraControl, MotionCommand};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

const MENU: [&str; 12] = [
    "1) pan left",
    "2) pan right",
    "3) tilt up",
    "4) tilt down",
    "5) zoom in",
    "6) zoom out",
    "7) stop",
    "8) list presets",
    "9) go to preset",
    "10) save preset",
    "0) quit",
    "Choice: ",
];

/// Decodes one menu line. `None` for anything that is not a menu entry.
pub fn parse_menu_choice(line: &str) -> Option<Input> {
    let action = match line.trim() {
        "1" => Action::Move(MotionCommand::pan(-1.0)),
        "2" => Action::Move(MotionCommand::pan(1.0)),
        "3" => Action::Move(MotionCommand::tilt(1.0)),
        "4" => Action::Move(MotionCommand::tilt(-1.0)),
        "5" => Action::Move(MotionCommand::zoom(1.0)),
        "6" => Action::Move(MotionCommand::zoom(-1.0)),
        "7" => Action::Stop,
        "8" => Action::ListPresets,
        "9" => return Some(Input::AskPresetToken),
        "10" => return Some(Input::AskPresetName),
        "0" => Action::Quit,
        _ => return None,
    };
    Some(Input::Act(action))
}

/// Runs the text menu on stdin until quit, end of input or cancellation.
pub async fn run<C: CameraControl + 'static>(session: &Session<'_, C>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result = menu_loop(session, &mut lines).await;
    session.shutdown().await;
    result
}

async fn menu_loop<C, R>(session: &Session<'_, C>, lines: &mut Lines<BufReader<R>>) -> Result<()>
where
    C: CameraControl + 'static,
    R: AsyncRead + Unpin,
{
    loop {
        show_menu();
        let Some(line) = next_line(session, lines).await? else {
            return Ok(());
        };
        let action = match parse_menu_choice(&line) {
            Some(Input::Act(action)) => action,
            Some(Input::AskPresetToken) => {
                ptz_session::say("Preset token: ");
                let Some(line) = next_line(session, lines).await? else {
                    return Ok(());
                };
                match ptz_session::preset_token(&line) {
                    Some(token) => Action::GotoPreset(token),
                    None => continue,
                }
            }
            Some(Input::AskPresetName) => {
                ptz_session::say("Preset name: ");
                let Some(line) = next_line(session, lines).await? else {
                    return Ok(());
                };
                Action::SavePreset(line.trim().to_string())
            }
            None => {
                ptz_session::say("Invalid choice");
                continue;
            }
        };
        if !session.handle(action).await {
            return Ok(());
        }
    }
}

/// `None` on end of input or cancellation.
async fn next_line<C, R>(
    session: &Session<'_, C>,
    lines: &mut Lines<BufReader<R>>,
) -> Result<Option<String>>
where
    C: CameraControl + 'static,
    R: AsyncRead + Unpin,
{
    tokio::select! {
        line = lines.next_line() => line.context("stdin read failed"),
        _ = session.cancel_token().cancelled() => Ok(None),
    }
}

fn show_menu() {
    for entry in MENU {
        ptz_session::say(entry);
    }
}
