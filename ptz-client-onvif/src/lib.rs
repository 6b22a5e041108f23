pub mod cli;
pub mod config;
pub mod onvif_camera;
pub mod onvif_presets;
pub mod onvif_profiles;
pub mod onvif_requests;
pub mod onvif_services;
pub mod ptz_config;
pub mod ptz_input;
pub mod ptz_menu;
pub mod ptz_session;
pub mod soap;
pub mod wsse;
