use crate::soap::xml_escape;
use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use rand::{rngs::OsRng, RngCore};
use sha1::{Digest, Sha1};
use time::{macros::format_description, OffsetDateTime};

const PASSWORD_DIGEST_TYPE: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest";
const NONCE_ENCODING: &str = "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary";
const NONCE_LEN: usize = 20;

/// WS-Security UsernameToken with a PasswordDigest, valid for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameToken {
    username: String,
    digest: String,
    nonce: String,
    created: String,
}

impl UsernameToken {
    pub fn generate(username: &str, password: &str) -> Result<Self> {
        let created = created_timestamp()?;
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        Ok(Self::with_nonce(username, password, &nonce, created))
    }

    fn with_nonce(username: &str, password: &str, nonce: &[u8], created: String) -> Self {
        Self {
            username: username.to_string(),
            digest: password_digest(nonce, &created, password),
            nonce: general_purpose::STANDARD.encode(nonce),
            created,
        }
    }

    pub fn to_header(&self) -> String {
        format!(
            r#"  <s:Header>
    <Security xmlns="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd" s:mustUnderstand="1">
      <UsernameToken>
        <Username>{}</Username>
        <Password Type="{}">{}</Password>
        <Nonce EncodingType="{}">{}</Nonce>
        <Created xmlns="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">{}</Created>
      </UsernameToken>
    </Security>
  </s:Header>
"#,
            xml_escape(&self.username),
            PASSWORD_DIGEST_TYPE,
            self.digest,
            NONCE_ENCODING,
            self.nonce,
            self.created
        )
    }
}

fn created_timestamp() -> Result<String> {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].000Z");
    OffsetDateTime::now_utc()
        .format(&format)
        .context("failed to format wsse created timestamp")
}

/// Base64(SHA-1(nonce + created + password)).
fn password_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    general_purpose::STANDARD.encode(hasher.finalize())
}
