//! Application identity for an Official Account.
//!
//! Environment variables read by [`AppIdentity::from_env`]:
//! - WX_APPID: Official Account appid (wx...)
//! - WX_APPSECRET: Official Account appsecret

use std::env;
use std::fmt;

use crate::token::{Error, Result};

pub const ENV_APPID: &str = "WX_APPID";
pub const ENV_APPSECRET: &str = "WX_APPSECRET";

/// Vendor-issued appid + appsecret pair. Immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct AppIdentity {
    app_id: String,
    app_secret: String,
}

impl AppIdentity {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    /// Read `WX_APPID` and `WX_APPSECRET` from the environment.
    pub fn from_env() -> Result<Self> {
        let app_id = read_var(ENV_APPID)?;
        let app_secret = read_var(ENV_APPSECRET)?;
        Ok(Self::new(app_id, app_secret))
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }
}

// Never print the secret
impl fmt::Debug for AppIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppIdentity")
            .field("app_id", &redact_id(&self.app_id))
            .field("app_secret", &"[redacted]")
            .finish()
    }
}

fn read_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        Ok(_) => Err(Error::Config(format!("{name} is empty"))),
        Err(e) => Err(Error::Config(format!("{name}: {e}"))),
    }
}

/// Redact an ID for logs: keep first 2 and last 2 chars where possible
pub fn redact_id(id: &str) -> String {
    if id.len() <= 4 || !id.is_ascii() {
        format!("{}***", id.chars().take(2).collect::<String>())
    } else {
        format!("{}***{}", &id[..2], &id[id.len() - 2..])
    }
}
