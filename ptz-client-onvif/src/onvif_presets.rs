use ptz_core::Preset;
use roxmltree::Document;

/// Presets from a `GetPresetsResponse`, in the order the camera lists them.
/// Entries without a token are skipped.
pub fn parse_presets(body: &str) -> anyhow::Result<Vec<Preset>> {
    let doc = Document::parse(body).map_err(|err| anyhow::anyhow!("invalid presets XML: {err}"))?;
    let presets = doc
        .descendants()
        .filter(|node| node.is_element() && node.has_tag_name("Preset"))
        .filter_map(|node| {
            let token = node.attribute("token")?.trim();
            if token.is_empty() {
                log::warn!("GetPresets preset without token skipped");
                return None;
            }
            let name = node
                .children()
                .find(|child| child.is_element() && child.has_tag_name("Name"))
                .and_then(|child| child.text())
                .map(str::trim)
                .unwrap_or_default();
            Some(Preset::new(token, name))
        })
        .collect();
    Ok(presets)
}

/// Token returned by `SetPresetResponse`, if the camera sent one.
pub fn parse_preset_token(body: &str) -> Option<String> {
    let doc = Document::parse(body).ok()?;
    doc.descendants()
        .find(|node| node.is_element() && node.has_tag_name("PresetToken"))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
