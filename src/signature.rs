//! JS-SDK `wx.config` signature.
//!
//! The signature is the lowercase hex SHA-1 of
//! `jsapi_ticket=TICKET&noncestr=NONCE&timestamp=TS&url=URL`, with the fields in
//! exactly that order and no escaping. `url` must be the page URL the JS-SDK
//! runs on, without the `#fragment`.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::nonce::nonce_str;
use crate::token::{Error, Result};

/// Payload handed to the browser for `wx.config({...})`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiConfig {
    pub app_id: String,
    /// Decimal unix seconds
    pub timestamp: String,
    pub nonce_str: String,
    /// Lowercase hex SHA-1
    pub signature: String,
}

/// Build the string WeChat verifies the signature over.
pub fn canonical_string(ticket: &str, nonce: &str, timestamp: &str, url: &str) -> String {
    format!("jsapi_ticket={ticket}&noncestr={nonce}&timestamp={timestamp}&url={url}")
}

/// Lowercase hex SHA-1 digest of `input`.
pub fn sha1_hex(input: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Signature for fixed inputs.
pub fn jsapi_signature(ticket: &str, nonce: &str, timestamp: &str, url: &str) -> String {
    sha1_hex(&canonical_string(ticket, nonce, timestamp, url))
}

/// Recompute and compare a signature (case-insensitive).
pub fn verify_jsapi_signature(
    ticket: &str,
    nonce: &str,
    timestamp: &str,
    url: &str,
    signature: &str,
) -> bool {
    jsapi_signature(ticket, nonce, timestamp, url).eq_ignore_ascii_case(signature)
}

impl JsApiConfig {
    /// Deterministic variant: caller supplies nonce and timestamp.
    pub fn sign_with(app_id: &str, ticket: &str, url: &str, nonce: &str, timestamp: &str) -> Self {
        Self {
            app_id: app_id.to_string(),
            timestamp: timestamp.to_string(),
            nonce_str: nonce.to_string(),
            signature: jsapi_signature(ticket, nonce, timestamp, url),
        }
    }

    /// Sign `url` with a fresh nonce and the current time.
    pub fn sign(app_id: &str, ticket: &str, url: &str) -> Result<Self> {
        let timestamp = epoch()?.to_string();
        let nonce = nonce_str();
        Ok(Self::sign_with(app_id, ticket, url, &nonce, &timestamp))
    }

    /// Check this payload against the ticket and page URL it claims to sign.
    pub fn verify(&self, ticket: &str, url: &str) -> bool {
        verify_jsapi_signature(ticket, &self.nonce_str, &self.timestamp, url, &self.signature)
    }
}

/// Get current epoch seconds
pub(crate) fn epoch() -> Result<i64> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| Error::Time)?;
    Ok(now.as_secs() as i64)
}
