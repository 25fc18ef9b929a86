//! WeChat Official Account credential endpoints.
//!
//! Provides the HTTP client and response types for fetching the
//! `access_token` and the JS-SDK `jsapi_ticket`.
//!
//! Design:
//! - `WxClient` handles HTTP and basic error mapping; caching and expiry
//!   bookkeeping live in `OfficialHandler`.
//! - Errors are unified via `Error`.
//!
//! Endpoints:
//! - access_token: GET https://api.weixin.qq.com/cgi-bin/token?grant_type=client_credential&appid=APPID&secret=APPSECRET
//! - jsapi_ticket: GET https://api.weixin.qq.com/cgi-bin/ticket/getticket?access_token=ACCESS_TOKEN&type=jsapi
//!
//! Example:
//! ```ignore
//! use wxshare_rs::{AppIdentity, WxClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WxClient::default();
//!     let identity = AppIdentity::new("your_appid", "your_appsecret");
//!     let token = client.get_access_token(&identity).await?;
//!     let ticket = client.get_jsapi_ticket(&token.access_token).await?;
//!     println!("ticket expires_in: {}", ticket.expires_in);
//!     Ok(())
//! }
//! ```

use reqwest::Url;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{AppIdentity, redact_id};

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";

const TOKEN_PATH: &str = "/cgi-bin/token";
const TICKET_PATH: &str = "/cgi-bin/ticket/getticket";
const GRANT_TYPE_CLIENT_CREDENTIAL: &str = "client_credential";
const TICKET_TYPE_JSAPI: &str = "jsapi";

/// Maximum number of body bytes echoed back in `Error::UnexpectedResponse`
const MAX_ERROR_BODY: usize = 2048;

/// Successful access_token response
#[derive(Clone, Debug, Deserialize)]
pub struct AccessTokenResponse {
    /// Access token string
    pub access_token: String,
    /// Expiration in seconds
    pub expires_in: i64,
}

/// Successful jsapi_ticket response
#[derive(Clone, Debug, Deserialize)]
pub struct JsApiTicketResponse {
    pub ticket: String,
    /// Expiration in seconds
    pub expires_in: i64,
}

/// Error envelope shared by every endpoint. A missing `errcode` means success.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct WxStatus {
    #[serde(default)]
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

/// Unified error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("weixin error {code}: {message}")]
    Wx { code: i64, message: String },

    #[error("unexpected response (status {status}): {error}; body: {body}")]
    UnexpectedResponse {
        status: u16,
        error: String,
        body: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("system clock is before the unix epoch")]
    Time,
}

impl Error {
    /// The vendor errcode, if this error came from a decoded WeChat envelope.
    pub fn wx_code(&self) -> Option<i64> {
        match self {
            Error::Wx { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the request never produced a usable response body.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::UnexpectedResponse { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// HTTP client for the Official Account credential endpoints
///
/// - Wraps `reqwest::Client`
/// - No caching here; see `OfficialHandler`
#[derive(Clone, Debug)]
pub struct WxClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for WxClient {
    fn default() -> Self {
        // Builder only fails when the TLS backend cannot initialize; fall back
        // to the plain constructor which uses the same defaults.
        let http = reqwest::Client::builder()
            .gzip(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl WxClient {
    /// Use a custom `reqwest::Client` (timeouts, proxies, ...)
    pub fn with_http(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host, e.g. a mock server in tests
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch access_token
    ///
    /// GET /cgi-bin/token
    /// params: grant_type=client_credential, appid, secret (do not log secrets)
    #[instrument(level = "debug", skip(self, identity))]
    pub async fn get_access_token(&self, identity: &AppIdentity) -> Result<AccessTokenResponse> {
        let url = self.access_token_url(identity)?;
        if identity.app_id().starts_with("ww") {
            warn!(
                "Detected appid starting with 'ww' (likely a WeCom corpid). Official Account JS-SDK requires the appid/appsecret pair from the Official Account platform."
            );
        }
        debug!(
            "Requesting Official Account access_token (no secrets), appid hint: {}",
            redact_id(identity.app_id())
        );
        self.get_json(url).await
    }

    /// Fetch the JS-SDK jsapi_ticket using a valid access_token
    ///
    /// GET /cgi-bin/ticket/getticket
    /// params: access_token, type=jsapi
    #[instrument(level = "debug", skip(self, access_token))]
    pub async fn get_jsapi_ticket(&self, access_token: &str) -> Result<JsApiTicketResponse> {
        let url = self.jsapi_ticket_url(access_token)?;
        debug!("Requesting jsapi_ticket");
        self.get_json(url).await
    }

    pub(crate) fn access_token_url(&self, identity: &AppIdentity) -> Result<Url> {
        let mut url = self.endpoint(TOKEN_PATH)?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("grant_type", GRANT_TYPE_CLIENT_CREDENTIAL);
            qp.append_pair("appid", identity.app_id());
            qp.append_pair("secret", identity.app_secret());
        }
        Ok(url)
    }

    pub(crate) fn jsapi_ticket_url(&self, access_token: &str) -> Result<Url> {
        let mut url = self.endpoint(TICKET_PATH)?;
        {
            let mut qp = url.query_pairs_mut();
            qp.append_pair("access_token", access_token);
            qp.append_pair("type", TICKET_TYPE_JSAPI);
        }
        Ok(url)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        decode_envelope(status.as_u16(), &bytes)
    }
}

/// Decode a WeChat JSON envelope: a non-zero `errcode` wins over any payload.
pub(crate) fn decode_envelope<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> Result<T> {
    let unexpected = |error: String| Error::UnexpectedResponse {
        status,
        error,
        body: redact_body(bytes),
    };

    let head: WxStatus = serde_json::from_slice(bytes).map_err(|e| unexpected(e.to_string()))?;
    if head.errcode != 0 {
        return Err(Error::Wx {
            code: head.errcode,
            message: head.errmsg,
        });
    }
    serde_json::from_slice::<T>(bytes).map_err(|e| unexpected(e.to_string()))
}

/// Redact credentials and truncate a response body before it ends up in an error
fn redact_body(bytes: &[u8]) -> String {
    let mut body = String::from_utf8_lossy(bytes).to_string();
    if let Ok(mut v) = serde_json::from_str::<serde_json::Value>(&body) {
        if let Some(obj) = v.as_object_mut() {
            for field in ["access_token", "ticket"] {
                if obj.contains_key(field) {
                    obj.insert(
                        field.to_string(),
                        serde_json::Value::String("[redacted]".into()),
                    );
                }
            }
        }
        if let Ok(s) = serde_json::to_string(&v) {
            body = s;
        }
    }
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}
