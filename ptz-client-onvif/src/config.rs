use crate::cli::{Args, Mode, OnvifAuth};
use anyhow::{bail, Result};
use std::time::Duration;

const KEYBOARD_SPEED: f32 = 1.0;
const KEYBOARD_BURST_MS: u64 = 300;
const MENU_SPEED: f32 = 0.5;
const MENU_BURST_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct Target {
    host: String,
    port: u16,
    path: String,
    username: Option<String>,
    password: Option<String>,
    auth: OnvifAuth,
    insecure: bool,
    profile_token: Option<String>,
    timeout: Duration,
    log_responses: bool,
}

/// Speed and length of the motion bursts issued by one key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstPolicy {
    pub speed: f32,
    pub duration: Duration,
}

impl BurstPolicy {
    pub fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Keyboard => Self {
                speed: KEYBOARD_SPEED,
                duration: Duration::from_millis(KEYBOARD_BURST_MS),
            },
            Mode::Menu => Self {
                speed: MENU_SPEED,
                duration: Duration::from_millis(MENU_BURST_MS),
            },
        }
    }

    pub fn from_args(args: &Args) -> Result<Self> {
        let mut policy = Self::for_mode(args.mode);
        if let Some(speed) = args.move_speed {
            if !speed.is_finite() || speed <= 0.0 {
                bail!("move speed must be in (0, 1], got {speed}");
            }
            policy.speed = speed.min(1.0);
        }
        if let Some(ms) = args.burst_ms {
            if ms == 0 {
                bail!("burst duration must be positive");
            }
            policy.duration = Duration::from_millis(ms);
        }
        Ok(policy)
    }
}

impl Target {
    pub fn from_args(args: &Args) -> Result<Self> {
        let host = args.ip.trim().to_string();
        if host.is_empty() {
            bail!("ip is required");
        }
        if matches!(args.auth, OnvifAuth::Wsse)
            && (args.username.is_none() || args.password.is_none())
        {
            bail!("wsse auth requires username and password");
        }
        Ok(Self {
            host,
            port: args.port,
            path: normalize_path(&args.path),
            username: args.username.clone(),
            password: args.password.clone(),
            auth: args.auth,
            insecure: args.insecure,
            profile_token: args
                .profile_token
                .as_deref()
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string),
            timeout: Duration::from_millis(args.timeout_ms),
            log_responses: args.log_responses,
        })
    }

    pub fn onvif_endpoint(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn display_name(&self) -> String {
        let user = self.username.as_deref().unwrap_or("-");
        format!("{}:{} as {}", self.host, self.port, user)
    }

    pub fn auth(&self) -> OnvifAuth {
        self.auth
    }

    pub fn insecure(&self) -> bool {
        self.insecure
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    pub fn profile_token(&self) -> Option<&str> {
        self.profile_token.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn log_responses(&self) -> bool {
        self.log_responses
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "/".to_string();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod success {
    use super::{BurstPolicy, Target};
    use crate::cli::{Args, Mode};
    use clap::Parser;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("ptz-client-onvif").chain(args.iter().copied()))
    }

    #[test]
    fn endpoint_uses_defaults() {
        let target = Target::from_args(&parse(&["--ip", "192.168.1.13"])).unwrap();

        assert_eq!(
            target.onvif_endpoint(),
            "http://192.168.1.13:80/onvif/device_service"
        );
        assert_eq!(target.timeout(), Duration::from_millis(3000));
        assert!(target.credentials().is_none());
    }

    #[test]
    fn path_gets_leading_slash() {
        let target =
            Target::from_args(&parse(&["--ip", "cam", "--port", "2020", "--path", "onvif"]))
                .unwrap();

        assert_eq!(target.onvif_endpoint(), "http://cam:2020/onvif");
    }

    #[test]
    fn blank_profile_token_is_ignored() {
        let target = Target::from_args(&parse(&["--ip", "cam", "--profile-token", " "])).unwrap();

        assert_eq!(target.profile_token(), None);
    }

    #[test]
    fn keyboard_policy_defaults() {
        let policy = BurstPolicy::from_args(&parse(&["--ip", "cam"])).unwrap();

        assert_eq!(policy, BurstPolicy::for_mode(Mode::Keyboard));
        assert_eq!(policy.speed, 1.0);
        assert_eq!(policy.duration, Duration::from_millis(300));
    }

    #[test]
    fn menu_policy_defaults() {
        let policy = BurstPolicy::from_args(&parse(&["--ip", "cam", "--mode", "menu"])).unwrap();

        assert_eq!(policy.speed, 0.5);
        assert_eq!(policy.duration, Duration::from_millis(500));
    }

    #[test]
    fn policy_overrides_are_applied() {
        let policy = BurstPolicy::from_args(&parse(&[
            "--ip",
            "cam",
            "--move-speed",
            "2.5",
            "--burst-ms",
            "120",
        ]))
        .unwrap();

        assert_eq!(policy.speed, 1.0);
        assert_eq!(policy.duration, Duration::from_millis(120));
    }
}

#[cfg(test)]
mod failure {
    use super::{BurstPolicy, Target};
    use crate::cli::Args;
    use clap::Parser;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(std::iter::once("ptz-client-onvif").chain(args.iter().copied()))
    }

    #[test]
    fn empty_ip_is_rejected() {
        assert!(Target::from_args(&parse(&["--ip", "  "])).is_err());
    }

    #[test]
    fn wsse_without_credentials_is_rejected() {
        assert!(Target::from_args(&parse(&["--ip", "cam", "--auth", "wsse"])).is_err());
    }

    #[test]
    fn zero_speed_is_rejected() {
        assert!(BurstPolicy::from_args(&parse(&["--ip", "cam", "--move-speed", "0"])).is_err());
    }

    #[test]
    fn zero_burst_is_rejected() {
        assert!(BurstPolicy::from_args(&parse(&["--ip", "cam", "--burst-ms", "0"])).is_err());
    }
}
