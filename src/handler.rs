//! In-memory access_token / jsapi_ticket holder for one Official Account.
//!
//! `OfficialHandler` owns the two credentials and their expiry timestamps.
//! Each credential is replaced only by its own fetch; there is no
//! invalidation and no background refresh. Callers decide when to refresh,
//! typically by checking [`OfficialHandler::both_expired`] before signing.
//!
//! Expiry is recorded as `issued_at + expires_in - 3600` so that a credential
//! is considered stale an hour before WeChat drops it. With `expires_in < 3600`
//! the recorded expiry is already in the past.
//!
//! Mutating methods take `&mut self`. To share one handler between tasks wrap
//! it in `tokio::sync::Mutex` (see `demos/shared_handler.rs`); for several
//! processes use an external cache instead.
//!
//! Example:
//! ```ignore
//! use wxshare_rs::OfficialHandler;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut handler = OfficialHandler::new("your_appid", "your_appsecret");
//!     if handler.both_expired() {
//!         handler.refresh_both().await?;
//!     }
//!     let cfg = handler.page_config("https://example.com/share")?;
//!     println!("{}", serde_json::to_string(&cfg)?);
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::{AppIdentity, redact_id};
use crate::signature::{JsApiConfig, epoch};
use crate::token::{AccessTokenResponse, Error, JsApiTicketResponse, Result, WxClient};

/// Seconds subtracted from the vendor `expires_in`
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 3600;

/// A cached credential value and its local expiry (epoch seconds).
///
/// Starts empty with `expires_at == 0`, which is always in the past.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CachedCredential {
    value: String,
    expires_at: i64,
}

impl CachedCredential {
    fn issue(value: String, issued_at: i64, expires_in: i64) -> Self {
        Self {
            value,
            expires_at: adjusted_expiry(issued_at, expires_in),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn is_set(&self) -> bool {
        !self.value.is_empty()
    }

    /// Strictly before `now`
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }
}

impl fmt::Debug for CachedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedCredential")
            .field("value_len", &self.value.len())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Local expiry for a credential issued at `issued_at` with the vendor TTL `expires_in`.
pub fn adjusted_expiry(issued_at: i64, expires_in: i64) -> i64 {
    issued_at
        .saturating_add(expires_in)
        .saturating_sub(EXPIRY_SAFETY_MARGIN_SECS)
}

/// Failure of [`OfficialHandler::refresh_both`].
///
/// `JsApiTicket` means the access_token was already replaced with a fresh one
/// while the cached ticket kept its previous value.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("access_token refresh failed: {0}")]
    AccessToken(#[source] Error),

    #[error("jsapi_ticket refresh failed (access_token already refreshed): {0}")]
    JsApiTicket(#[source] Error),
}

impl RefreshError {
    /// True when the handler holds a new access_token but a stale ticket.
    pub fn access_token_refreshed(&self) -> bool {
        matches!(self, RefreshError::JsApiTicket(_))
    }

    pub fn error(&self) -> &Error {
        match self {
            RefreshError::AccessToken(e) | RefreshError::JsApiTicket(e) => e,
        }
    }

    pub fn into_inner(self) -> Error {
        match self {
            RefreshError::AccessToken(e) | RefreshError::JsApiTicket(e) => e,
        }
    }
}

/// Credential owner for one Official Account.
#[derive(Clone, Debug)]
pub struct OfficialHandler {
    identity: AppIdentity,
    client: WxClient,
    access_token: CachedCredential,
    jsapi_ticket: CachedCredential,
}

impl OfficialHandler {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self::with_client(AppIdentity::new(app_id, app_secret), WxClient::default())
    }

    pub fn with_client(identity: AppIdentity, client: WxClient) -> Self {
        Self {
            identity,
            client,
            access_token: CachedCredential::default(),
            jsapi_ticket: CachedCredential::default(),
        }
    }

    /// Build from `WX_APPID` / `WX_APPSECRET`
    pub fn from_env() -> Result<Self> {
        Ok(Self::with_client(
            AppIdentity::from_env()?,
            WxClient::default(),
        ))
    }

    pub fn app_id(&self) -> &str {
        self.identity.app_id()
    }

    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    pub fn access_token(&self) -> &CachedCredential {
        &self.access_token
    }

    pub fn jsapi_ticket(&self) -> &CachedCredential {
        &self.jsapi_ticket
    }

    /// Fetch a new access_token and cache it.
    ///
    /// On error the cached token is left untouched.
    #[instrument(level = "debug", skip(self), fields(appid = %redact_id(self.identity.app_id())))]
    pub async fn fetch_access_token(&mut self) -> Result<AccessTokenResponse> {
        let resp = self.client.get_access_token(&self.identity).await?;
        let now = epoch()?;
        self.access_token = CachedCredential::issue(resp.access_token.clone(), now, resp.expires_in);
        debug!(
            expires_in = resp.expires_in,
            expires_at = self.access_token.expires_at,
            "access_token cached"
        );
        Ok(resp)
    }

    /// Fetch a new jsapi_ticket with the given access_token and cache it.
    ///
    /// On error the cached ticket is left untouched.
    #[instrument(level = "debug", skip(self, access_token), fields(appid = %redact_id(self.identity.app_id())))]
    pub async fn fetch_jsapi_ticket(&mut self, access_token: &str) -> Result<JsApiTicketResponse> {
        let resp = self.client.get_jsapi_ticket(access_token).await?;
        let now = epoch()?;
        self.jsapi_ticket = CachedCredential::issue(resp.ticket.clone(), now, resp.expires_in);
        debug!(
            expires_in = resp.expires_in,
            expires_at = self.jsapi_ticket.expires_at,
            "jsapi_ticket cached"
        );
        Ok(resp)
    }

    /// Sign `url` with an explicit ticket. No network call.
    pub fn jsapi_config(&self, ticket: &str, url: &str) -> Result<JsApiConfig> {
        JsApiConfig::sign(self.identity.app_id(), ticket, url)
    }

    /// Sign `url` with the cached ticket.
    pub fn page_config(&self, url: &str) -> Result<JsApiConfig> {
        if !self.jsapi_ticket.is_set() {
            return Err(Error::Config(
                "no jsapi_ticket cached; call refresh_both first".to_string(),
            ));
        }
        self.jsapi_config(self.jsapi_ticket.value(), url)
    }

    /// True only when both the access_token and the ticket are past their local expiry.
    pub fn both_expired(&self) -> bool {
        match epoch() {
            Ok(now) => self.both_expired_at(now),
            Err(_) => true,
        }
    }

    pub fn both_expired_at(&self, now: i64) -> bool {
        self.access_token.is_expired_at(now) && self.jsapi_ticket.is_expired_at(now)
    }

    /// Refresh the access_token, then the ticket using that token.
    ///
    /// Stops at the first failure. A ticket failure does not roll back the
    /// already refreshed access_token; see [`RefreshError::access_token_refreshed`].
    #[instrument(level = "debug", skip(self), fields(appid = %redact_id(self.identity.app_id())))]
    pub async fn refresh_both(&mut self) -> std::result::Result<(), RefreshError> {
        let token = match self.fetch_access_token().await {
            Ok(resp) => resp.access_token,
            Err(e) => {
                warn!("access_token refresh failed: {e}");
                return Err(RefreshError::AccessToken(e));
            }
        };
        if let Err(e) = self.fetch_jsapi_ticket(&token).await {
            warn!("jsapi_ticket refresh failed, access_token kept: {e}");
            return Err(RefreshError::JsApiTicket(e));
        }
        debug!("access_token and jsapi_ticket refreshed");
        Ok(())
    }

    /// Run [`refresh_both`](Self::refresh_both) when both credentials are expired.
    ///
    /// Returns whether a refresh happened.
    pub async fn ensure_fresh(&mut self) -> std::result::Result<bool, RefreshError> {
        if !self.both_expired() {
            return Ok(false);
        }
        self.refresh_both().await?;
        Ok(true)
    }
}
