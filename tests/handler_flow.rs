use std::time::{SystemTime, UNIX_EPOCH};

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wxshare_rs::handler::EXPIRY_SAFETY_MARGIN_SECS;
use wxshare_rs::{AppIdentity, Error, OfficialHandler, WxClient};

const APPID: &str = "wx4eb23463562b5403";
const SECRET: &str = "test-secret";

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}

fn handler_for(server: &MockServer) -> OfficialHandler {
    let client = WxClient::default().with_base_url(server.uri());
    OfficialHandler::with_client(AppIdentity::new(APPID, SECRET), client)
}

fn token_mock(body: serde_json::Value) -> Mock {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .and(query_param("grant_type", "client_credential"))
        .and(query_param("appid", APPID))
        .and(query_param("secret", SECRET))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

fn ticket_mock(access_token: &str, body: serde_json::Value) -> Mock {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/ticket/getticket"))
        .and(query_param("access_token", access_token))
        .and(query_param("type", "jsapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

#[tokio::test]
async fn fetch_access_token_stores_adjusted_expiry() {
    let server = MockServer::start().await;
    token_mock(serde_json::json!({"access_token": "ACCESS_1", "expires_in": 7200}))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = handler_for(&server);
    let before = now();
    let resp = handler.fetch_access_token().await.expect("token");
    let after = now();

    assert_eq!(resp.access_token, "ACCESS_1");
    assert_eq!(resp.expires_in, 7200);
    assert_eq!(handler.access_token().value(), "ACCESS_1");
    let expires_at = handler.access_token().expires_at();
    assert!(expires_at >= before + 7200 - EXPIRY_SAFETY_MARGIN_SECS);
    assert!(expires_at <= after + 7200 - EXPIRY_SAFETY_MARGIN_SECS);
    // ticket untouched
    assert!(!handler.jsapi_ticket().is_set());
}

#[tokio::test]
async fn short_ttl_yields_expiry_in_the_past() {
    let server = MockServer::start().await;
    token_mock(serde_json::json!({"access_token": "SHORT", "expires_in": 600}))
        .mount(&server)
        .await;

    let mut handler = handler_for(&server);
    handler.fetch_access_token().await.expect("token");
    assert!(handler.access_token().expires_at() < now());
}

#[tokio::test]
async fn refresh_both_populates_and_clears_expired_flag() {
    let server = MockServer::start().await;
    token_mock(serde_json::json!({"access_token": "ACCESS_1", "expires_in": 7200}))
        .expect(1)
        .mount(&server)
        .await;
    ticket_mock(
        "ACCESS_1",
        serde_json::json!({"errcode": 0, "errmsg": "ok", "ticket": "TICKET_1", "expires_in": 7200}),
    )
    .expect(1)
    .mount(&server)
    .await;

    let mut handler = handler_for(&server);
    assert!(handler.both_expired());

    handler.refresh_both().await.expect("refresh");
    assert!(!handler.both_expired());
    assert_eq!(handler.access_token().value(), "ACCESS_1");
    assert_eq!(handler.jsapi_ticket().value(), "TICKET_1");

    // once the clock passes both adjusted expiries
    let later = handler
        .access_token()
        .expires_at()
        .max(handler.jsapi_ticket().expires_at())
        + 1;
    assert!(handler.both_expired_at(later));
    assert!(!handler.both_expired_at(later - 1));

    let cfg = handler.page_config("https://example.com/share").expect("sign");
    assert_eq!(cfg.app_id, APPID);
    assert!(cfg.verify("TICKET_1", "https://example.com/share"));
}

#[tokio::test]
async fn vendor_error_keeps_cached_token() {
    let server = MockServer::start().await;
    let mut handler = handler_for(&server);

    {
        let _guard = token_mock(serde_json::json!({"access_token": "GOOD", "expires_in": 7200}))
            .mount_as_scoped(&server)
            .await;
        handler.fetch_access_token().await.expect("first fetch");
    }
    let cached = handler.access_token().clone();

    {
        let _guard = token_mock(serde_json::json!({"errcode": 40164, "errmsg": "invalid ip 1.2.3.4"}))
            .mount_as_scoped(&server)
            .await;
        let err = handler.fetch_access_token().await.unwrap_err();
        match &err {
            Error::Wx { code, message } => {
                assert_eq!(*code, 40164);
                assert_eq!(message, "invalid ip 1.2.3.4");
            }
            other => panic!("expected vendor error, got {other:?}"),
        }
        let text = err.to_string();
        assert!(text.contains("40164") && text.contains("invalid ip 1.2.3.4"));
    }

    assert_eq!(handler.access_token(), &cached);
}

#[tokio::test]
async fn ticket_vendor_error_keeps_cached_ticket() {
    let server = MockServer::start().await;
    let mut handler = handler_for(&server);

    {
        let _guard = ticket_mock(
            "TOK",
            serde_json::json!({"errcode": 0, "errmsg": "ok", "ticket": "OLD", "expires_in": 7200}),
        )
        .mount_as_scoped(&server)
        .await;
        handler.fetch_jsapi_ticket("TOK").await.expect("ticket");
    }
    let cached = handler.jsapi_ticket().clone();

    {
        let _guard = ticket_mock("TOK", serde_json::json!({"errcode": 40001, "errmsg": "invalid credential"}))
            .mount_as_scoped(&server)
            .await;
        let err = handler.fetch_jsapi_ticket("TOK").await.unwrap_err();
        assert_eq!(err.wx_code(), Some(40001));
    }

    assert_eq!(handler.jsapi_ticket(), &cached);
    assert_eq!(handler.jsapi_ticket().value(), "OLD");
}

#[tokio::test]
async fn refresh_both_skips_ticket_when_token_fails() {
    let server = MockServer::start().await;
    token_mock(serde_json::json!({"errcode": 40125, "errmsg": "invalid appsecret"}))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/ticket/getticket"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut handler = handler_for(&server);
    let err = handler.refresh_both().await.unwrap_err();
    assert!(!err.access_token_refreshed());
    assert_eq!(err.error().wx_code(), Some(40125));
    assert!(handler.both_expired());
}

#[tokio::test]
async fn refresh_both_keeps_new_token_when_ticket_fails() {
    let server = MockServer::start().await;
    token_mock(serde_json::json!({"access_token": "ACCESS_2", "expires_in": 7200}))
        .mount(&server)
        .await;
    ticket_mock("ACCESS_2", serde_json::json!({"errcode": -1, "errmsg": "system error"}))
        .expect(1)
        .mount(&server)
        .await;

    let mut handler = handler_for(&server);
    let err = handler.refresh_both().await.unwrap_err();
    assert!(err.access_token_refreshed());
    assert_eq!(err.error().wx_code(), Some(-1));

    // partial state: token replaced, ticket still unset
    assert_eq!(handler.access_token().value(), "ACCESS_2");
    assert!(!handler.jsapi_ticket().is_set());
    assert!(!handler.both_expired());
    assert!(matches!(
        handler.page_config("https://example.com"),
        Err(Error::Config(_))
    ));
}

#[tokio::test]
async fn malformed_body_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cgi-bin/token"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let mut handler = handler_for(&server);
    let err = handler.fetch_access_token().await.unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, Error::UnexpectedResponse { status: 502, .. }));
    assert!(!handler.access_token().is_set());
}

#[tokio::test]
async fn ensure_fresh_only_refreshes_when_both_expired() {
    let server = MockServer::start().await;
    token_mock(serde_json::json!({"access_token": "ACCESS_3", "expires_in": 7200}))
        .expect(1)
        .mount(&server)
        .await;
    ticket_mock(
        "ACCESS_3",
        serde_json::json!({"errcode": 0, "errmsg": "ok", "ticket": "TICKET_3", "expires_in": 7200}),
    )
    .expect(1)
    .mount(&server)
    .await;

    let mut handler = handler_for(&server);
    assert!(handler.ensure_fresh().await.expect("first"));
    assert!(!handler.ensure_fresh().await.expect("second"));
    assert_eq!(handler.jsapi_ticket().value(), "TICKET_3");
}
