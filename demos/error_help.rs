/*!
Example: errcode explanation helpers

Run:
  cargo run --example error_help

What this shows:
- How to use wxshare_rs::errors helpers to interpret errcode
- How to decide between fixing configuration and refetching the access_token
*/

use wxshare_rs::errors::{explain, is_auth_issue, is_ip_whitelist_issue, lookup};

fn main() {
    let samples: Vec<(i64, &str)> = vec![
        (-1, "system error"),
        (0, "ok"),
        (40001, "invalid credential, access_token is invalid or not latest"),
        (40013, "invalid appid"),
        (40125, "invalid appsecret"),
        (40164, "invalid ip 203.0.113.7, not in whitelist"),
        (42001, "access_token expired"),
        (45009, "reach max api daily quota limit"),
        (123456, "unknown"),
    ];

    println!("== errcode explanation demo ==");
    for (code, errmsg) in samples {
        println!("\n- errcode={} errmsg='{}'\n  {}", code, errmsg, explain(code, errmsg));

        let help = lookup(code);
        println!(
            "  details: category={:?}, refresh_token={}",
            help.category, help.refresh_token
        );

        if help.refresh_token {
            println!("  action: refetch access_token, then jsapi_ticket");
        } else if is_ip_whitelist_issue(code) {
            println!("  action: whitelist this server's egress IP");
        } else if is_auth_issue(code) {
            println!("  action: fix appid/appsecret configuration");
        }
    }
}
