use clap::{Parser, ValueEnum};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnvifAuth {
    Basic,
    Wsse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    /// Single key presses move the camera in short bursts
    Keyboard,
    /// Numbered text menu read line by line
    Menu,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive an ONVIF PTZ camera from the keyboard")]
pub struct Args {
    /// IP address or hostname of the camera
    #[arg(long)]
    pub ip: String,

    /// ONVIF/HTTP port
    #[arg(long, default_value_t = 80)]
    pub port: u16,

    /// ONVIF device service path
    #[arg(long, default_value = "/onvif/device_service")]
    pub path: String,

    /// Username for ONVIF authentication
    #[arg(long)]
    pub username: Option<String>,

    /// Password for ONVIF authentication
    #[arg(long)]
    pub password: Option<String>,

    /// ONVIF auth mode (basic or wsse)
    #[arg(long, value_enum, default_value_t = OnvifAuth::Basic)]
    pub auth: OnvifAuth,

    /// Allow invalid TLS certificates for ONVIF HTTPS
    #[arg(long)]
    pub insecure: bool,

    /// Media profile token (first profile when omitted)
    #[arg(long)]
    pub profile_token: Option<String>,

    /// Input mode
    #[arg(long, value_enum, default_value_t = Mode::Keyboard)]
    pub mode: Mode,

    /// Normalized speed of each burst in (0, 1] (keyboard 1.0, menu 0.5)
    #[arg(long)]
    pub move_speed: Option<f32>,

    /// Burst duration in milliseconds (keyboard 300, menu 500)
    #[arg(long)]
    pub burst_ms: Option<u64>,

    /// Timeout in milliseconds
    #[arg(long, default_value_t = 3000)]
    pub timeout_ms: u64,

    /// Log SOAP responses
    #[arg(long)]
    pub log_responses: bool,
}
