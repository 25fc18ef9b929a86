/*!
Example: sign a page URL for `wx.config`

Run:
  cargo run --example jsapi_config -- https://example.com/article/1

Environment variables:
- WX_APPID, WX_APPSECRET: Official Account appid / appsecret

Prints the JSON payload to embed in the page:
  {"appId":"...","timestamp":"...","nonceStr":"...","signature":"..."}
*/

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;
use wxshare_rs::OfficialHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let _ = dotenv();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com/".to_string());

    let mut handler = OfficialHandler::from_env().context("WX_APPID / WX_APPSECRET")?;
    info!("credentials expired: {}", handler.both_expired());

    if let Err(e) = handler.refresh_both().await {
        if e.access_token_refreshed() {
            warn!("access_token refreshed but jsapi_ticket was not; cannot sign");
        }
        return Err(e).context("refreshing credentials");
    }
    info!(
        "credentials cached: access_token until {}, jsapi_ticket until {}",
        handler.access_token().expires_at(),
        handler.jsapi_ticket().expires_at()
    );

    let cfg = handler.page_config(&url)?;
    println!("{}", serde_json::to_string_pretty(&cfg)?);
    Ok(())
}
