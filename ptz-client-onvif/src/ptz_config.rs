use crate::onvif_requests::PtzVelocitySpaces;
use ptz_core::limits::DEFAULT_MAX_SPEED;
use ptz_core::{PtzError, VelocityLimits};
use roxmltree::{Document, Node};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanTiltRange {
    pub uri: Option<String>,
    pub x: AxisRange,
    pub y: AxisRange,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoomRange {
    pub uri: Option<String>,
    pub x: AxisRange,
}

/// Continuous velocity spaces from `GetConfigurationOptions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VelocityOptions {
    pub pan_tilt: Option<PanTiltRange>,
    pub zoom: Option<ZoomRange>,
}

impl VelocityOptions {
    /// Maxima of the first reported velocity spaces. A missing pan/tilt or
    /// zoom space leaves those axes at the default speed.
    pub fn limits(&self) -> ptz_core::Result<VelocityLimits> {
        if self.pan_tilt.is_none() && self.zoom.is_none() {
            return Err(PtzError::LimitsUnavailable(
                "no continuous velocity space reported".to_string(),
            ));
        }
        let (pan, tilt) = self
            .pan_tilt
            .as_ref()
            .map(|range| (range.x.max, range.y.max))
            .unwrap_or((DEFAULT_MAX_SPEED, DEFAULT_MAX_SPEED));
        let zoom = self
            .zoom
            .as_ref()
            .map(|range| range.x.max)
            .unwrap_or(DEFAULT_MAX_SPEED);
        VelocityLimits::new(pan, tilt, zoom)
    }

    pub fn spaces(&self) -> PtzVelocitySpaces<'_> {
        PtzVelocitySpaces {
            pan_tilt: self.pan_tilt.as_ref().and_then(|range| range.uri.as_deref()),
            zoom: self.zoom.as_ref().and_then(|range| range.uri.as_deref()),
        }
    }

    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(range) = &self.pan_tilt {
            lines.push(format!(
                "Continuous pan/tilt: x=[{:.3}..{:.3}] y=[{:.3}..{:.3}]{}",
                range.x.min,
                range.x.max,
                range.y.min,
                range.y.max,
                uri_suffix(range.uri.as_deref())
            ));
        }
        if let Some(range) = &self.zoom {
            lines.push(format!(
                "Continuous zoom: x=[{:.3}..{:.3}]{}",
                range.x.min,
                range.x.max,
                uri_suffix(range.uri.as_deref())
            ));
        }
        lines
    }
}

/// PTZ configuration tokens listed by `GetConfigurations`.
pub fn extract_tokens(body: &str) -> Vec<String> {
    let Ok(doc) = Document::parse(body) else {
        return Vec::new();
    };
    doc.descendants()
        .filter(|node| has_tag(*node, "PTZConfiguration"))
        .filter_map(|node| node.attribute("token").map(str::to_string))
        .collect()
}

/// `None` when the body is not XML or holds no `PTZConfigurationOptions`.
pub fn parse_velocity_options(body: &str) -> Option<VelocityOptions> {
    let doc = Document::parse(body).ok()?;
    let options = doc
        .descendants()
        .find(|node| has_tag(*node, "PTZConfigurationOptions"))?;
    let mut parsed = VelocityOptions::default();
    let Some(spaces) = options.children().find(|node| has_tag(*node, "Spaces")) else {
        return Some(parsed);
    };
    for space in spaces.children().filter(|node| node.is_element()) {
        match space.tag_name().name() {
            "ContinuousPanTiltVelocitySpace" if parsed.pan_tilt.is_none() => {
                parsed.pan_tilt = parse_pan_tilt_space(space);
            }
            "ContinuousZoomVelocitySpace" if parsed.zoom.is_none() => {
                parsed.zoom = parse_zoom_space(space);
            }
            _ => {}
        }
    }
    Some(parsed)
}

fn parse_pan_tilt_space(space: Node) -> Option<PanTiltRange> {
    let uri = find_text(space, "URI");
    let x = parse_axis_range(child(space, "XRange")?)?;
    let y = parse_axis_range(child(space, "YRange")?)?;
    Some(PanTiltRange { uri, x, y })
}

fn parse_zoom_space(space: Node) -> Option<ZoomRange> {
    let uri = find_text(space, "URI");
    let x = parse_axis_range(child(space, "XRange")?)?;
    Some(ZoomRange { uri, x })
}

fn parse_axis_range(range: Node) -> Option<AxisRange> {
    let min = parse_f32(&find_text(range, "Min")?)?;
    let max = parse_f32(&find_text(range, "Max")?)?;
    Some(AxisRange::new(min, max))
}

fn uri_suffix(uri: Option<&str>) -> String {
    uri.map(|value| format!(" uri={value}")).unwrap_or_default()
}

fn parse_f32(value: &str) -> Option<f32> {
    value.trim().parse::<f32>().ok()
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

fn find_text(node: Node, tag: &str) -> Option<String> {
    node.descendants()
        .find(|child| has_tag(*child, tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn has_tag(node: Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}
