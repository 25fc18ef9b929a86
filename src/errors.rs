//! Official Account `errcode` helpers
//!
//! Purpose
//! - Map well-known global errcode values of the credential endpoints to
//!   categories and hints
//! - Tell whether a cached access_token should be thrown away and refetched
//!
//! Notes
//! - Make program logic depend on `errcode`, never on `errmsg`; treat `errmsg`
//!   as diagnostic text only.
//! - These helpers only advise. Neither `WxClient` nor `OfficialHandler`
//!   retries on its own.
//! - Unknown codes are categorized as `Unknown` with a generic hint.

use crate::token::Error;

/// High-level classification for an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// errcode = 0
    Success,
    /// System busy
    TemporarySystem,
    /// Wrong appid/appsecret, or an invalid/expired access_token
    Auth,
    /// Missing or malformed request parameter
    InvalidParam,
    /// Caller IP is not on the Official Account whitelist
    IpWhitelist,
    /// Daily or per-minute API quota exhausted
    Quota,
    /// The account lacks permission for this API
    Unauthorized,
    Unknown,
}

/// A compact explanation for an errcode.
#[derive(Debug, Clone)]
pub struct ErrorHelp {
    pub code: i64,
    pub category: ErrorCategory,
    pub summary: &'static str,
    pub hint: &'static str,
    /// Whether the cached access_token should be refetched
    pub refresh_token: bool,
}

/// Classify errcode into a category.
pub fn category_for(code: i64) -> ErrorCategory {
    match code {
        0 => ErrorCategory::Success,
        -1 => ErrorCategory::TemporarySystem,
        40001 | 40013 | 40014 | 40125 | 40243 | 42001 => ErrorCategory::Auth,
        40002 | 41001 | 41002 | 41004 => ErrorCategory::InvalidParam,
        40164 => ErrorCategory::IpWhitelist,
        45009 | 45011 => ErrorCategory::Quota,
        48001 => ErrorCategory::Unauthorized,
        _ => ErrorCategory::Unknown,
    }
}

/// Short, stable summary for a code.
pub fn summary_for(code: i64) -> &'static str {
    match code {
        -1 => "System busy",
        0 => "Success",
        40001 => "Invalid credential",
        40002 => "Invalid grant_type",
        40013 => "Invalid appid",
        40014 => "Invalid access_token",
        40125 => "Invalid appsecret",
        40164 => "Caller IP not whitelisted",
        40243 => "AppSecret frozen",
        41001 => "Missing access_token",
        41002 => "Missing appid",
        41004 => "Missing appsecret",
        42001 => "access_token expired",
        45009 => "Daily API quota reached",
        45011 => "API minute quota reached",
        48001 => "API unauthorized",
        _ => "Unknown error",
    }
}

/// Actionable hint for a code.
pub fn hint_for(code: i64) -> &'static str {
    match code {
        -1 => "WeChat is busy; try again later.",
        0 => "Success.",
        40001 => {
            "AppSecret is wrong or the access_token is invalid; check the appsecret on the Official Account platform and refetch the token."
        }
        40002 => "grant_type must be client_credential.",
        40013 => {
            "appid is wrong; use the Official Account appid (starts with 'wx'), not a WeCom corpid."
        }
        40014 | 42001 => "Refetch the access_token before calling getticket again.",
        40125 => "appsecret does not match the appid; reset or re-copy it from the platform.",
        40164 => {
            "Add the server's egress IP to the IP whitelist under Basic Configuration on the Official Account platform."
        }
        40243 => "AppSecret is frozen; unfreeze it on the Official Account platform.",
        41001 | 41002 | 41004 => "A required query parameter is missing.",
        45009 => {
            "Daily quota reached; cache access_token and jsapi_ticket instead of fetching per request."
        }
        45011 => "Per-minute quota reached; slow down and cache credentials.",
        48001 => "The account is not authorized for this API; check account type and verification.",
        _ => "Unknown code; refer to official docs and logs for details.",
    }
}

/// Whether the cached access_token should be refetched for this code.
pub fn should_refresh_token(code: i64) -> bool {
    matches!(code, 40001 | 40014 | 42001)
}

/// Build a structured help object for a given errcode.
pub fn lookup(code: i64) -> ErrorHelp {
    ErrorHelp {
        code,
        category: category_for(code),
        summary: summary_for(code),
        hint: hint_for(code),
        refresh_token: should_refresh_token(code),
    }
}

/// Concise, human-readable explanation string.
pub fn explain(errcode: i64, errmsg: &str) -> String {
    let help = lookup(errcode);
    let mut parts = vec![
        format!("errcode={} ({:?})", help.code, help.category),
        help.summary.to_string(),
        format!("hint: {}", help.hint),
    ];
    if help.refresh_token {
        parts.push("refresh_token: yes".to_string());
    } else {
        parts.push("refresh_token: no".to_string());
    }
    if !errmsg.is_empty() {
        parts.push(format!("errmsg: {errmsg}"));
    }
    parts.join(" | ")
}

/// Explain a crate error; `None` unless it carries a vendor errcode.
pub fn explain_error(err: &Error) -> Option<String> {
    match err {
        Error::Wx { code, message } => Some(explain(*code, message)),
        _ => None,
    }
}

/// Return true if this looks like an appid/appsecret/token problem.
pub fn is_auth_issue(code: i64) -> bool {
    matches!(category_for(code), ErrorCategory::Auth)
}

/// Return true if the caller IP must be whitelisted.
pub fn is_ip_whitelist_issue(code: i64) -> bool {
    matches!(category_for(code), ErrorCategory::IpWhitelist)
}
