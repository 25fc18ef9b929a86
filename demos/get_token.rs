use dotenvy::dotenv;
use std::env;
use wxshare_rs::{AppIdentity, WxClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Run:
    //   cargo run --example get_token
    //
    // Environment variables:
    // - WX_APPID, WX_APPSECRET: Official Account appid / appsecret
    //
    // Fetches an access_token, then exchanges it for a jsapi_ticket.

    let _ = dotenv();

    let (appid, secret) = match (env::var("WX_APPID"), env::var("WX_APPSECRET")) {
        (Ok(appid), Ok(secret)) => (appid, secret),
        _ => {
            println!("Skipping: set WX_APPID and WX_APPSECRET to try this example.");
            return Ok(());
        }
    };

    let appid_hint = if appid.len() <= 4 {
        format!("{}***", appid)
    } else {
        format!(
            "{}***{}",
            &appid[..2],
            &appid[appid.len().saturating_sub(2)..]
        )
    };
    println!("Requesting Official Account access_token, appid hint: {}", appid_hint);

    let client = WxClient::default();
    let token = match client
        .get_access_token(&AppIdentity::new(appid, secret))
        .await
    {
        Ok(token) => {
            println!(
                "[OK] access_token fetched (len {}), expires_in: {}s",
                token.access_token.len(),
                token.expires_in
            );
            token
        }
        Err(e) => {
            eprintln!("[ERR] access_token request failed: {e}");
            if let Some(help) = wxshare_rs::errors::explain_error(&e) {
                eprintln!("      {help}");
            }
            return Ok(());
        }
    };

    match client.get_jsapi_ticket(&token.access_token).await {
        Ok(ticket) => println!(
            "[OK] jsapi_ticket fetched (len {}), expires_in: {}s",
            ticket.ticket.len(),
            ticket.expires_in
        ),
        Err(e) => eprintln!("[ERR] jsapi_ticket request failed: {e}"),
    }

    Ok(())
}
