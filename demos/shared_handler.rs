/*!
Example: one handler shared by several tasks

Run:
  cargo run --example shared_handler

`OfficialHandler` mutates its cached credentials through `&mut self`, so tasks
share it behind a `tokio::sync::Mutex`. Only the first task to find both
credentials expired calls WeChat; the rest sign with the cached ticket.

Environment variables:
- WX_APPID, WX_APPSECRET: Official Account appid / appsecret
*/

use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;
use wxshare_rs::OfficialHandler;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_target(false).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let _ = dotenv();

    let handler = match OfficialHandler::from_env() {
        Ok(h) => Arc::new(Mutex::new(h)),
        Err(e) => {
            eprintln!("{e}; set WX_APPID and WX_APPSECRET to run this example.");
            return Ok(());
        }
    };

    let mut tasks = Vec::new();
    for i in 0..4 {
        let handler = handler.clone();
        tasks.push(tokio::spawn(async move {
            let url = format!("https://example.com/page/{i}");
            let mut h = handler.lock().await;
            match h.ensure_fresh().await {
                Ok(refreshed) => info!(task = i, refreshed, "credentials ready"),
                Err(e) => {
                    error!(task = i, "refresh failed: {e}");
                    return;
                }
            }
            match h.page_config(&url) {
                Ok(cfg) => info!(task = i, signature = %cfg.signature, "signed {url}"),
                Err(e) => error!(task = i, "signing failed: {e}"),
            }
        }));
    }
    for t in tasks {
        t.await?;
    }
    Ok(())
}
