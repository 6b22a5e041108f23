use crate::ptz_session::{self, Action, Input};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use ptz_core::MotionCommand;
use std::io::Write;
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

const HELP: [&str; 7] = [
    "W/S or Up/Down: tilt",
    "A/D or Left/Right: pan",
    "Q/E: zoom in/out",
    "Space: stop",
    "P: list presets",
    "G: go to preset, O: save preset",
    "Esc or Ctrl-C: quit",
];

/// Decodes one key event. Releases and unmapped keys yield `None`.
pub fn map_key(key: &KeyEvent) -> Option<Input> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(Input::Act(Action::Quit)),
            _ => None,
        };
    }
    let action = match key.code {
        KeyCode::Up => Action::Move(MotionCommand::tilt(1.0)),
        KeyCode::Down => Action::Move(MotionCommand::tilt(-1.0)),
        KeyCode::Left => Action::Move(MotionCommand::pan(-1.0)),
        KeyCode::Right => Action::Move(MotionCommand::pan(1.0)),
        KeyCode::Esc => Action::Quit,
        KeyCode::Char(ch) => match ch.to_ascii_lowercase() {
            'w' => Action::Move(MotionCommand::tilt(1.0)),
            's' => Action::Move(MotionCommand::tilt(-1.0)),
            'a' => Action::Move(MotionCommand::pan(-1.0)),
            'd' => Action::Move(MotionCommand::pan(1.0)),
            'q' => Action::Move(MotionCommand::zoom(1.0)),
            'e' => Action::Move(MotionCommand::zoom(-1.0)),
            ' ' => Action::Stop,
            'p' => Action::ListPresets,
            'g' => return Some(Input::AskPresetToken),
            'o' => return Some(Input::AskPresetName),
            _ => return None,
        },
        _ => return None,
    };
    Some(Input::Act(action))
}

/// Reads keys on a dedicated thread while the terminal is in raw mode.
/// Quitting cancels `cancel` first so a running burst ends early. The
/// thread also ends when `cancel` fires elsewhere.
pub fn spawn_input_loop(
    tx: mpsc::Sender<Action>,
    cancel: CancellationToken,
) -> thread::JoinHandle<()> {
    for line in HELP {
        ptz_session::say(line);
    }
    thread::spawn(move || input_loop(tx, cancel))
}

fn input_loop(tx: mpsc::Sender<Action>, cancel: CancellationToken) {
    let _raw_mode = RawModeGuard::new();
    loop {
        if cancel.is_cancelled() {
            break;
        }
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                log::error!("keyboard poll failed: {err}");
                cancel.cancel();
                break;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(err) => {
                log::error!("keyboard read failed: {err}");
                cancel.cancel();
                break;
            }
        };
        let action = match map_key(&key) {
            Some(Input::Act(action)) => action,
            Some(Input::AskPresetToken) => {
                match prompt("Preset token: ").and_then(|line| ptz_session::preset_token(&line)) {
                    Some(token) => Action::GotoPreset(token),
                    None => continue,
                }
            }
            Some(Input::AskPresetName) => match prompt("Preset name: ") {
                Some(name) => Action::SavePreset(name.trim().to_string()),
                None => continue,
            },
            None => continue,
        };
        let quit = action == Action::Quit;
        if quit {
            cancel.cancel();
        }
        if tx.blocking_send(action).is_err() || quit {
            break;
        }
    }
}

/// Reads one line in cooked mode, restoring raw mode afterwards.
fn prompt(label: &str) -> Option<String> {
    let _ = terminal::disable_raw_mode();
    print!("{label}");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let read = std::io::stdin().read_line(&mut line);
    let _ = terminal::enable_raw_mode();
    match read {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

struct RawModeGuard;

impl RawModeGuard {
    fn new() -> Self {
        if let Err(err) = terminal::enable_raw_mode() {
            log::warn!("raw mode unavailable: {err}");
        }
        Self
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
