use crate::cli::OnvifAuth;
use crate::config::Target;
use crate::wsse::UsernameToken;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use roxmltree::Document;

const CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";

#[derive(Debug, Clone)]
pub struct SoapResponse {
    pub status: u16,
    pub body: String,
}

/// Decoded `s:Fault` of a SOAP 1.2 response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoapFault {
    pub codes: Vec<String>,
    pub reason: Option<String>,
}

impl SoapResponse {
    pub fn is_success(&self) -> bool {
        self.status < 400 && self.fault().is_none()
    }

    pub fn fault(&self) -> Option<SoapFault> {
        parse_fault(&self.body)
    }

    /// One-line description of a failed response for error messages.
    pub fn failure_summary(&self) -> String {
        match self.fault() {
            Some(fault) => format!("HTTP {}: {}", self.status, fault.describe()),
            None => format!("HTTP {}", self.status),
        }
    }
}

impl SoapFault {
    pub fn describe(&self) -> String {
        let codes = self.codes.join("/");
        match (&self.reason, codes.is_empty()) {
            (Some(reason), true) => reason.clone(),
            (Some(reason), false) => format!("{reason} ({codes})"),
            (None, false) => codes,
            (None, true) => "SOAP fault".to_string(),
        }
    }

    /// Whether a code or subcode has the local name `name`, ignoring its
    /// namespace prefix.
    pub fn has_code(&self, name: &str) -> bool {
        self.codes
            .iter()
            .any(|code| code.rsplit(':').next() == Some(name))
    }
}

pub fn client(target: &Target) -> Result<Client> {
    Client::builder()
        .timeout(target.timeout())
        .danger_accept_invalid_certs(target.insecure())
        .build()
        .context("http client build failed")
}

pub async fn send(
    client: &Client,
    target: &Target,
    endpoint: &str,
    action: &str,
    body: &str,
) -> Result<SoapResponse> {
    let envelope = build_envelope(target, body)?;
    let content_type = format!("{CONTENT_TYPE}; action=\"{action}\"");
    let mut request = client
        .post(endpoint)
        .header("Content-Type", content_type)
        .body(envelope);
    if matches!(target.auth(), OnvifAuth::Basic) {
        if let Some((user, pass)) = target.credentials() {
            request = request.basic_auth(user, Some(pass));
        }
    }
    let response = request
        .send()
        .await
        .with_context(|| format!("soap request failed for {} -> {}", action, endpoint))?;
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .with_context(|| format!("soap response body unreadable for {}", action))?;

    Ok(SoapResponse { status, body })
}

pub fn log_response(operation: &str, endpoint: &str, response: &SoapResponse, verbose: bool) {
    let level = if verbose {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    if response.body.is_empty() {
        log::log!(
            level,
            "SOAP response ({operation}): {endpoint} -> HTTP {} (empty body)",
            response.status
        );
    } else {
        log::log!(
            level,
            "SOAP response ({operation}): {endpoint} -> HTTP {}\n{}",
            response.status,
            response.body
        );
    }
}

fn build_envelope(target: &Target, body: &str) -> Result<String> {
    let header = match target.auth() {
        OnvifAuth::Basic => String::new(),
        OnvifAuth::Wsse => {
            let (user, pass) = target
                .credentials()
                .ok_or_else(|| anyhow!("onvif wsse auth requires username and password"))?;
            UsernameToken::generate(user, pass)?.to_header()
        }
    };
    Ok(format!(
        r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">
{header}  <s:Body xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
    {body}
  </s:Body>
</s:Envelope>
"#
    ))
}

fn parse_fault(body: &str) -> Option<SoapFault> {
    let doc = Document::parse(body).ok()?;
    let fault = doc
        .descendants()
        .find(|node| node.is_element() && node.has_tag_name("Fault"))?;
    let codes = fault
        .descendants()
        .filter(|node| node.is_element() && node.has_tag_name("Value"))
        .filter_map(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();
    let reason = fault
        .descendants()
        .find(|node| node.is_element() && node.has_tag_name("Reason"))
        .and_then(|reason| {
            reason
                .descendants()
                .find(|node| node.is_element() && node.has_tag_name("Text"))
        })
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string);
    Some(SoapFault { codes, reason })
}

/// Escapes text placed inside XML element content or attribute values.
pub fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod success {
    use super::{xml_escape, SoapFault, SoapResponse};

    const NO_TOKEN_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope" xmlns:ter="http://www.onvif.org/ver10/error">
  <env:Body>
    <env:Fault>
      <env:Code>
        <env:Value>env:Sender</env:Value>
        <env:Subcode>
          <env:Value>ter:InvalidArgVal</env:Value>
          <env:Subcode><env:Value>ter:NoToken</env:Value></env:Subcode>
        </env:Subcode>
      </env:Code>
      <env:Reason><env:Text xml:lang="en">The requested preset token does not exist.</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;

    #[test]
    fn parses_fault_codes_and_reason() {
        let response = SoapResponse {
            status: 400,
            body: NO_TOKEN_FAULT.to_string(),
        };

        let fault = response.fault().unwrap();

        assert_eq!(
            fault.codes,
            vec!["env:Sender", "ter:InvalidArgVal", "ter:NoToken"]
        );
        assert_eq!(
            fault.reason.as_deref(),
            Some("The requested preset token does not exist.")
        );
        assert!(fault.has_code("NoToken"));
        assert!(!fault.has_code("Token"));
        assert!(!response.is_success());
    }

    #[test]
    fn failure_summary_includes_reason() {
        let response = SoapResponse {
            status: 500,
            body: NO_TOKEN_FAULT.to_string(),
        };

        assert_eq!(
            response.failure_summary(),
            "HTTP 500: The requested preset token does not exist. (env:Sender/ter:InvalidArgVal/ter:NoToken)"
        );
    }

    #[test]
    fn plain_response_is_success() {
        let response = SoapResponse {
            status: 200,
            body: r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope"><s:Body><StopResponse/></s:Body></s:Envelope>"#.to_string(),
        };

        assert!(response.fault().is_none());
        assert!(response.is_success());
    }

    #[test]
    fn http_error_without_body_is_failure() {
        let response = SoapResponse {
            status: 401,
            body: String::new(),
        };

        assert!(!response.is_success());
        assert_eq!(response.failure_summary(), "HTTP 401");
    }

    #[test]
    fn empty_fault_describes_itself() {
        assert_eq!(SoapFault::default().describe(), "SOAP fault");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            xml_escape(r#"<a & "b">'"#),
            "&lt;a &amp; &quot;b&quot;&gt;&apos;"
        );
    }
}
