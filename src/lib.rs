#![doc = r#"
wxshare-rs

WeChat Official Account credentials for the JS-SDK: fetch the `access_token`,
exchange it for a `jsapi_ticket`, and sign page URLs for `wx.config`.

Modules:
- token: HTTP client (`WxClient`) and response/error types.
- handler: `OfficialHandler`, the in-memory holder of both credentials and their expiry.
- signature: `JsApiConfig` and the SHA-1 signature over the canonical string.
- nonce: random `nonceStr` generation.
- config: `AppIdentity` (appid + appsecret), env loading.
- errors: errcode classification and hints.

Quick usage:

```ignore
use wxshare_rs::OfficialHandler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut handler = OfficialHandler::new("your_appid", "your_appsecret");
    handler.ensure_fresh().await?;

    let cfg = handler.page_config("https://example.com/article/1")?;
    println!("{}", serde_json::to_string(&cfg)?);
    Ok(())
}
```
"#]

pub mod config;
pub mod errors;
pub mod handler;
pub mod nonce;
pub mod signature;
pub mod token;

pub use config::AppIdentity;
pub use handler::{CachedCredential, OfficialHandler, RefreshError};
pub use signature::JsApiConfig;
pub use token::*;
