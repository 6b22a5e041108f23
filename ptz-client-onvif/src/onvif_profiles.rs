use crate::{onvif_camera::OnvifCamera, onvif_requests, soap};
use anyhow::{anyhow, bail, Result};
use roxmltree::Document;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub token: String,
    pub name: Option<String>,
    pub ptz_config: Option<String>,
}

pub async fn fetch(onvif: &OnvifCamera) -> Result<Vec<ProfileSummary>> {
    let cmd = onvif_requests::get_profiles();
    let response = onvif.send_media(&cmd).await?;
    soap::log_response(
        cmd.operation,
        onvif.media_endpoint(),
        &response,
        onvif.log_responses(),
    );
    if !response.is_success() {
        bail!("get profiles failed with {}", response.failure_summary());
    }
    let profiles = extract_profiles(&response.body)?;
    log_profiles(&profiles);
    Ok(profiles)
}

/// Picks the profile named by `hint`, or the first one.
pub fn select<'a>(profiles: &'a [ProfileSummary], hint: Option<&str>) -> Result<&'a ProfileSummary> {
    match hint {
        Some(hint) => profiles
            .iter()
            .find(|profile| profile.token == hint)
            .ok_or_else(|| anyhow!("profile {hint} not found on camera")),
        None => profiles
            .first()
            .ok_or_else(|| anyhow!("No media profiles found on camera")),
    }
}

fn extract_profiles(body: &str) -> Result<Vec<ProfileSummary>> {
    let doc = Document::parse(body).map_err(|err| anyhow!("invalid profiles XML: {err}"))?;
    let mut profiles = Vec::new();
    for profile in doc
        .descendants()
        .filter(|node| node.has_tag_name("Profiles"))
    {
        let Some(token) = profile.attribute("token") else {
            log::warn!("GetProfiles profile token missing");
            continue;
        };
        let name = profile
            .children()
            .find(|node| node.has_tag_name("Name"))
            .and_then(|node| node.text())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        let ptz_config = profile
            .descendants()
            .find(|node| node.has_tag_name("PTZConfiguration"))
            .and_then(|node| node.attribute("token"))
            .map(str::to_string);
        profiles.push(ProfileSummary {
            token: token.to_string(),
            name,
            ptz_config,
        });
    }
    if profiles.is_empty() {
        bail!("No media profiles found on camera");
    }
    Ok(profiles)
}

fn log_profiles(profiles: &[ProfileSummary]) {
    log::info!("[GetProfiles] profiles={}", profiles.len());
    for (index, profile) in profiles.iter().enumerate() {
        log::info!(
            "  [{}] token={} name={} ptz_config={}",
            index,
            profile.token,
            profile.name.as_deref().unwrap_or("-"),
            profile.ptz_config.as_deref().unwrap_or("-"),
        );
    }
}

#[cfg(test)]
mod success {
    use super::{extract_profiles, select, ProfileSummary};

    const PROFILES: &str = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:trt="http://www.onvif.org/ver10/media/wsdl" xmlns:tt="http://www.onvif.org/ver10/schema">
  <s:Body>
    <trt:GetProfilesResponse>
      <trt:Profiles token="Profile_1" fixed="true">
        <tt:Name>mainStream</tt:Name>
        <tt:VideoSourceConfiguration token="VideoSource_1"><tt:Name>src</tt:Name></tt:VideoSourceConfiguration>
        <tt:PTZConfiguration token="PTZ_1"><tt:Name>ptz</tt:Name></tt:PTZConfiguration>
      </trt:Profiles>
      <trt:Profiles token="Profile_2">
        <tt:Name>subStream</tt:Name>
      </trt:Profiles>
    </trt:GetProfilesResponse>
  </s:Body>
</s:Envelope>"#;

    #[test]
    fn extracts_tokens_names_and_ptz_config() {
        let profiles = extract_profiles(PROFILES).unwrap();

        assert_eq!(
            profiles,
            vec![
                ProfileSummary {
                    token: "Profile_1".to_string(),
                    name: Some("mainStream".to_string()),
                    ptz_config: Some("PTZ_1".to_string()),
                },
                ProfileSummary {
                    token: "Profile_2".to_string(),
                    name: Some("subStream".to_string()),
                    ptz_config: None,
                },
            ]
        );
    }

    #[test]
    fn selects_first_profile_without_hint() {
        let profiles = extract_profiles(PROFILES).unwrap();

        assert_eq!(select(&profiles, None).unwrap().token, "Profile_1");
    }

    #[test]
    fn selects_hinted_profile() {
        let profiles = extract_profiles(PROFILES).unwrap();

        assert_eq!(select(&profiles, Some("Profile_2")).unwrap().token, "Profile_2");
    }
}
