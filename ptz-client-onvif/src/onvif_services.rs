use crate::{onvif_camera::OnvifCamera, onvif_requests};
use roxmltree::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub media_endpoint: String,
    pub ptz_endpoint: String,
}

/// Finds the media and PTZ service addresses, trying GetServices first and
/// GetCapabilities second. Anything still unknown falls back to the device
/// endpoint.
pub async fn discover_endpoints(onvif: &OnvifCamera) -> ServiceEndpoints {
    let mut media = None;
    let mut ptz = None;
    let cmd = onvif_requests::get_services();
    match onvif.send_device(&cmd).await {
        Ok(services) if services.is_success() => {
            (media, ptz) = parse_services(&services.body);
        }
        Ok(services) => log::debug!("GetServices: {}", services.failure_summary()),
        Err(err) => log::debug!("GetServices failed: {err:#}"),
    }
    if media.is_none() || ptz.is_none() {
        let cmd = onvif_requests::get_capabilities();
        match onvif.send_device(&cmd).await {
            Ok(caps) if caps.is_success() => {
                let parsed = parse_capabilities(&caps.body);
                media = media.or(parsed.0);
                ptz = ptz.or(parsed.1);
            }
            Ok(caps) => log::debug!("GetCapabilities: {}", caps.failure_summary()),
            Err(err) => log::debug!("GetCapabilities failed: {err:#}"),
        }
    }
    let fallback = onvif.device_endpoint().to_string();
    if ptz.is_none() {
        log::warn!("PTZ service not advertised, using device endpoint {fallback}");
    }
    ServiceEndpoints {
        media_endpoint: media.unwrap_or_else(|| fallback.clone()),
        ptz_endpoint: ptz.unwrap_or(fallback),
    }
}

fn parse_services(body: &str) -> (Option<String>, Option<String>) {
    let Ok(doc) = Document::parse(body) else {
        return (None, None);
    };
    let mut media = None;
    let mut ptz = None;
    for service in doc
        .descendants()
        .filter(|node| node.has_tag_name("Service"))
    {
        let namespace = child_text(service, "Namespace");
        let xaddr = child_text(service, "XAddr").and_then(|text| select_xaddr(&text));
        if let (Some(ns), Some(addr)) = (namespace, xaddr) {
            if ns.contains("media/wsdl") && media.is_none() {
                media = Some(addr);
            } else if ns.contains("ptz/wsdl") && ptz.is_none() {
                ptz = Some(addr);
            }
        }
    }
    (media, ptz)
}

fn parse_capabilities(body: &str) -> (Option<String>, Option<String>) {
    let Ok(doc) = Document::parse(body) else {
        return (None, None);
    };
    let find = |tag: &str| {
        doc.descendants()
            .find(|node| node.has_tag_name(tag))
            .and_then(|node| child_text(node, "XAddr"))
            .and_then(|text| select_xaddr(&text))
    };
    (find("Media"), find("PTZ"))
}

fn child_text(node: roxmltree::Node, name: &str) -> Option<String> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(name))
        .and_then(|child| child.text())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// XAddr may list several addresses; plain http is preferred.
fn select_xaddr(text: &str) -> Option<String> {
    let candidates: Vec<&str> = text.split_whitespace().collect();
    candidates
        .iter()
        .find(|addr| addr.starts_with("http://"))
        .or_else(|| candidates.iter().find(|addr| addr.starts_with("https://")))
        .or_else(|| candidates.first())
        .map(|addr| addr.to_string())
}
