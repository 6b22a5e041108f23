use crate::{
    config::Target,
    onvif_presets, onvif_profiles,
    onvif_requests::{self, OnvifRequest},
    onvif_services, ptz_config, soap,
};
use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use ptz_core::{
    CameraControl, Operation, Preset, PtzError, StopScope, Velocity, VelocityLimits,
};
use reqwest::Client;

/// Fault subcodes meaning the preset token itself is not known.
const UNKNOWN_PRESET_SUBCODES: [&str; 2] = ["NoToken", "NoEntity"];

/// ONVIF session bound to one media profile.
pub struct OnvifCamera {
    client: Client,
    target: Target,
    device_endpoint: String,
    media_endpoint: String,
    ptz_endpoint: String,
    profile_token: String,
    velocity: std::result::Result<ptz_config::VelocityOptions, String>,
}

impl OnvifCamera {
    fn new(client: Client, target: Target) -> Self {
        let device_endpoint = target.onvif_endpoint();
        Self {
            client,
            target,
            media_endpoint: device_endpoint.clone(),
            ptz_endpoint: device_endpoint.clone(),
            device_endpoint,
            profile_token: String::new(),
            velocity: Err("velocity options not fetched".to_string()),
        }
    }

    /// Discovers service endpoints, picks the profile and reads its
    /// continuous velocity spaces. Only a missing profile is fatal.
    pub async fn initialize(target: Target) -> Result<Self> {
        let client = soap::client(&target)?;
        let mut onvif = Self::new(client, target);

        let endpoints = onvif_services::discover_endpoints(&onvif).await;
        onvif.set_endpoints(endpoints);
        log::info!(
            "endpoints: media={} ptz={}",
            onvif.media_endpoint,
            onvif.ptz_endpoint
        );

        let profiles = onvif_profiles::fetch(&onvif).await?;
        let profile = onvif_profiles::select(&profiles, onvif.target.profile_token())?;
        log::info!("using profile {}", profile.token);
        onvif.profile_token = profile.token.clone();
        let config_hint = profile.ptz_config.clone();

        onvif.velocity = match onvif.fetch_velocity_options(config_hint).await {
            Ok(options) => {
                for line in options.summary_lines() {
                    log::info!("{line}");
                }
                Ok(options)
            }
            Err(err) => {
                log::warn!("velocity options unavailable: {err:#}");
                Err(format!("{err:#}"))
            }
        };
        Ok(onvif)
    }

    pub fn set_endpoints(&mut self, endpoints: onvif_services::ServiceEndpoints) {
        self.media_endpoint = endpoints.media_endpoint;
        self.ptz_endpoint = endpoints.ptz_endpoint;
    }

    pub fn device_endpoint(&self) -> &str {
        &self.device_endpoint
    }

    pub fn media_endpoint(&self) -> &str {
        &self.media_endpoint
    }

    pub fn ptz_endpoint(&self) -> &str {
        &self.ptz_endpoint
    }

    pub fn profile_token(&self) -> &str {
        &self.profile_token
    }

    pub fn log_responses(&self) -> bool {
        self.target.log_responses()
    }

    pub async fn send_device(&self, request: &OnvifRequest) -> Result<soap::SoapResponse> {
        self.send_to(&self.device_endpoint, request).await
    }

    pub async fn send_media(&self, request: &OnvifRequest) -> Result<soap::SoapResponse> {
        self.send_to(&self.media_endpoint, request).await
    }

    pub async fn send_ptz(&self, request: &OnvifRequest) -> Result<soap::SoapResponse> {
        self.send_to(&self.ptz_endpoint, request).await
    }

    async fn send_to(&self, endpoint: &str, request: &OnvifRequest) -> Result<soap::SoapResponse> {
        soap::send(
            &self.client,
            &self.target,
            endpoint,
            &request.action(),
            &request.body,
        )
        .await
    }

    async fn fetch_velocity_options(
        &self,
        config_hint: Option<String>,
    ) -> Result<ptz_config::VelocityOptions> {
        let token = match config_hint {
            Some(token) => token,
            None => self.fetch_config_token().await?,
        };
        let cmd = onvif_requests::get_configuration_options(&token);
        let response = self.send_ptz(&cmd).await?;
        soap::log_response(
            cmd.operation,
            &self.ptz_endpoint,
            &response,
            self.log_responses(),
        );
        if !response.is_success() {
            bail!(
                "get configuration options failed with {}",
                response.failure_summary()
            );
        }
        ptz_config::parse_velocity_options(&response.body)
            .ok_or_else(|| anyhow!("PTZ configuration options missing in response"))
    }

    async fn fetch_config_token(&self) -> Result<String> {
        let cmd = onvif_requests::get_configurations();
        let response = self.send_ptz(&cmd).await?;
        soap::log_response(
            cmd.operation,
            &self.ptz_endpoint,
            &response,
            self.log_responses(),
        );
        if !response.is_success() {
            bail!(
                "get configurations failed with {}",
                response.failure_summary()
            );
        }
        ptz_config::extract_tokens(&response.body)
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("PTZ configuration token not found in response"))
    }

    /// Sends a PTZ request, tagging transport errors with `operation`.
    async fn request(
        &self,
        operation: Operation,
        request: &OnvifRequest,
    ) -> ptz_core::Result<soap::SoapResponse> {
        let response = self
            .send_ptz(request)
            .await
            .map_err(|err| PtzError::control(operation, format!("{err:#}")))?;
        soap::log_response(
            request.operation,
            &self.ptz_endpoint,
            &response,
            self.log_responses(),
        );
        Ok(response)
    }

    /// Like `request`, but HTTP errors and SOAP faults fail too.
    async fn exchange(
        &self,
        operation: Operation,
        request: &OnvifRequest,
    ) -> ptz_core::Result<soap::SoapResponse> {
        let response = self.request(operation, request).await?;
        expect_success(operation, response)
    }
}

#[async_trait]
impl CameraControl for OnvifCamera {
    async fn continuous_move(&self, velocity: Velocity) -> ptz_core::Result<()> {
        let spaces = match &self.velocity {
            Ok(options) => options.spaces(),
            Err(_) => onvif_requests::PtzVelocitySpaces::default(),
        };
        let cmd = onvif_requests::continuous_move(&self.profile_token, velocity, spaces);
        log::debug!(
            "ContinuousMove pan={:.3} tilt={:.3} zoom={:.3}",
            velocity.pan,
            velocity.tilt,
            velocity.zoom
        );
        self.exchange(Operation::ContinuousMove, &cmd).await?;
        Ok(())
    }

    async fn stop(&self, scope: StopScope) -> ptz_core::Result<()> {
        let cmd = onvif_requests::stop(&self.profile_token, scope);
        log::debug!("Stop pan_tilt={} zoom={}", scope.pan_tilt, scope.zoom);
        self.exchange(Operation::Stop, &cmd).await?;
        Ok(())
    }

    async fn goto_preset(&self, token: &str) -> ptz_core::Result<()> {
        let cmd = onvif_requests::goto_preset(&self.profile_token, token);
        let response = self.request(Operation::GotoPreset, &cmd).await?;
        goto_preset_result(token, response)
    }

    async fn set_preset(&self, name: &str) -> ptz_core::Result<Option<String>> {
        let cmd = onvif_requests::set_preset(&self.profile_token, name);
        let response = self.exchange(Operation::SetPreset, &cmd).await?;
        Ok(onvif_presets::parse_preset_token(&response.body))
    }

    async fn list_presets(&self) -> ptz_core::Result<Vec<Preset>> {
        let cmd = onvif_requests::get_presets(&self.profile_token);
        let response = self.exchange(Operation::ListPresets, &cmd).await?;
        onvif_presets::parse_presets(&response.body)
            .map_err(|err| PtzError::control(Operation::ListPresets, format!("{err:#}")))
    }

    async fn velocity_limits(&self) -> ptz_core::Result<VelocityLimits> {
        match &self.velocity {
            Ok(options) => options.limits(),
            Err(reason) => Err(PtzError::LimitsUnavailable(reason.clone())),
        }
    }
}

fn expect_success(
    operation: Operation,
    response: soap::SoapResponse,
) -> ptz_core::Result<soap::SoapResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(PtzError::control(operation, response.failure_summary()))
    }
}

fn goto_preset_result(token: &str, response: soap::SoapResponse) -> ptz_core::Result<()> {
    if is_unknown_preset(&response) {
        return Err(PtzError::UnknownPreset(token.to_string()));
    }
    expect_success(Operation::GotoPreset, response)?;
    Ok(())
}

/// Only the token subcodes count. `InvalidArgVal` sits above every argument
/// fault, bad profile tokens included.
fn is_unknown_preset(response: &soap::SoapResponse) -> bool {
    response.fault().is_some_and(|fault| {
        UNKNOWN_PRESET_SUBCODES
            .iter()
            .any(|subcode| fault.has_code(subcode))
    })
}
