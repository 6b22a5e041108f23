use crate::soap::xml_escape;
use ptz_core::{StopScope, Velocity};

pub const DEVICE_ACTION_NS: &str = "http://www.onvif.org/ver10/device/wsdl";
pub const MEDIA_ACTION_NS: &str = "http://www.onvif.org/ver10/media/wsdl";
pub const PTZ_ACTION_NS: &str = "http://www.onvif.org/ver20/ptz/wsdl";
pub const TT_NS: &str = "http://www.onvif.org/ver10/schema";

pub const PAN_TILT_VELOCITY_SPACE: &str =
    "http://www.onvif.org/ver10/tptz/PanTiltSpaces/VelocityGenericSpace";
pub const ZOOM_VELOCITY_SPACE: &str =
    "http://www.onvif.org/ver10/tptz/ZoomSpaces/VelocityGenericSpace";

/// One SOAP operation: its action namespace, name and body element.
#[derive(Debug, Clone)]
pub struct OnvifRequest {
    pub namespace: &'static str,
    pub operation: &'static str,
    pub body: String,
}

impl OnvifRequest {
    pub fn action(&self) -> String {
        format!("{}/{}", self.namespace, self.operation)
    }
}

/// Velocity space URIs reported by the camera, if any.
#[derive(Clone, Copy, Debug, Default)]
pub struct PtzVelocitySpaces<'a> {
    pub pan_tilt: Option<&'a str>,
    pub zoom: Option<&'a str>,
}

pub fn get_services() -> OnvifRequest {
    build(
        DEVICE_ACTION_NS,
        "GetServices",
        format!(
            r#"<GetServices xmlns="{}"><IncludeCapability>false</IncludeCapability></GetServices>"#,
            DEVICE_ACTION_NS
        ),
    )
}

pub fn get_capabilities() -> OnvifRequest {
    build(
        DEVICE_ACTION_NS,
        "GetCapabilities",
        format!(
            r#"<GetCapabilities xmlns="{}"><Category>All</Category></GetCapabilities>"#,
            DEVICE_ACTION_NS
        ),
    )
}

pub fn get_profiles() -> OnvifRequest {
    build(
        MEDIA_ACTION_NS,
        "GetProfiles",
        format!(r#"<GetProfiles xmlns="{}"/>"#, MEDIA_ACTION_NS),
    )
}

pub fn get_configurations() -> OnvifRequest {
    build(
        PTZ_ACTION_NS,
        "GetConfigurations",
        format!(r#"<GetConfigurations xmlns="{}"/>"#, PTZ_ACTION_NS),
    )
}

pub fn get_configuration_options(config_token: &str) -> OnvifRequest {
    build(
        PTZ_ACTION_NS,
        "GetConfigurationOptions",
        format!(
            r#"<GetConfigurationOptions xmlns="{0}"><ConfigurationToken>{1}</ConfigurationToken></GetConfigurationOptions>"#,
            PTZ_ACTION_NS,
            xml_escape(config_token)
        ),
    )
}

pub fn continuous_move(
    profile: &str,
    velocity: Velocity,
    spaces: PtzVelocitySpaces<'_>,
) -> OnvifRequest {
    let pan_tilt_space = spaces.pan_tilt.unwrap_or(PAN_TILT_VELOCITY_SPACE);
    let zoom_space = spaces.zoom.unwrap_or(ZOOM_VELOCITY_SPACE);
    let body = format!(
        r#"<ContinuousMove xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><Velocity><PanTilt x="{pan}" y="{tilt}" xmlns="{tt}" space="{pan_tilt_space}"/><Zoom x="{zoom}" xmlns="{tt}" space="{zoom_space}"/></Velocity></ContinuousMove>"#,
        ns = PTZ_ACTION_NS,
        profile = xml_escape(profile),
        pan = format_float(velocity.pan),
        tilt = format_float(velocity.tilt),
        zoom = format_float(velocity.zoom),
        tt = TT_NS,
        pan_tilt_space = xml_escape(pan_tilt_space),
        zoom_space = xml_escape(zoom_space),
    );
    build(PTZ_ACTION_NS, "ContinuousMove", body)
}

pub fn stop(profile: &str, scope: StopScope) -> OnvifRequest {
    let body = format!(
        r#"<Stop xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><PanTilt>{pan_tilt}</PanTilt><Zoom>{zoom}</Zoom></Stop>"#,
        ns = PTZ_ACTION_NS,
        profile = xml_escape(profile),
        pan_tilt = scope.pan_tilt,
        zoom = scope.zoom,
    );
    build(PTZ_ACTION_NS, "Stop", body)
}

pub fn goto_preset(profile: &str, preset_token: &str) -> OnvifRequest {
    let body = format!(
        r#"<GotoPreset xmlns="{ns}"><ProfileToken>{profile}</ProfileToken><PresetToken>{preset}</PresetToken></GotoPreset>"#,
        ns = PTZ_ACTION_NS,
        profile = xml_escape(profile),
        preset = xml_escape(preset_token),
    );
    build(PTZ_ACTION_NS, "GotoPreset", body)
}

/// Saves the current position as a new preset. An empty name lets the camera
/// pick one.
pub fn set_preset(profile: &str, name: &str) -> OnvifRequest {
    let name = name.trim();
    let name_element = if name.is_empty() {
        String::new()
    } else {
        format!("<PresetName>{}</PresetName>", xml_escape(name))
    };
    let body = format!(
        r#"<SetPreset xmlns="{ns}"><ProfileToken>{profile}</ProfileToken>{name_element}</SetPreset>"#,
        ns = PTZ_ACTION_NS,
        profile = xml_escape(profile),
    );
    build(PTZ_ACTION_NS, "SetPreset", body)
}

pub fn get_presets(profile: &str) -> OnvifRequest {
    let body = format!(
        r#"<GetPresets xmlns="{ns}"><ProfileToken>{profile}</ProfileToken></GetPresets>"#,
        ns = PTZ_ACTION_NS,
        profile = xml_escape(profile),
    );
    build(PTZ_ACTION_NS, "GetPresets", body)
}

fn build(namespace: &'static str, operation: &'static str, body: String) -> OnvifRequest {
    OnvifRequest {
        namespace,
        operation,
        body,
    }
}

fn format_float(value: f32) -> String {
    let normalized = if value.abs() < f32::EPSILON {
        0.0
    } else {
        value
    };
    format!("{:.3}", normalized)
}
