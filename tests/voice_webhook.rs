use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use callroute::{
    routing::RoutingPolicy,
    secrets::Secrets,
    voice::signature::{sign, SIGNATURE_HEADER},
    CONFIG,
};
use http_body_util::BodyExt;
use std::collections::HashMap;
use tower::ServiceExt;

fn env() -> HashMap<&'static str, String> {
    HashMap::from([
        ("TWILIO_ACCOUNT_SID", format!("AC{}", "0a".repeat(16))),
        ("TWILIO_API_KEY", format!("SK{}", "1b".repeat(16))),
        ("TWILIO_API_SECRET", "s3cr3t-signing-key".to_owned()),
        ("TWILIO_APP_SID", format!("AP{}", "2c".repeat(16))),
        ("WEBCALL_TOKEN", "dialer-bearer".to_owned()),
    ])
}

fn app_with(env: HashMap<&'static str, String>) -> Router {
    let secrets = Secrets::from_lookup(|key| env.get(key).cloned()).unwrap();
    callroute::app(secrets, RoutingPolicy::default())
}

fn app() -> Router {
    app_with(env())
}

fn form_post(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(CONFIG.settings.voice_route)
        .header(header::HOST, "calls.example.com")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_owned());
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn outgoing_call_is_dialed() {
    let (status, content_type, body) = send(
        app(),
        form_post("To=%2B15551234567&From=%2B15559876543&CallSid=CA0001"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
         <Dial callerId=\"+15559876543\" timeout=\"30\" record=\"false\">\
         <Number>+15551234567</Number></Dial></Response>"
    );
}

#[tokio::test]
async fn call_without_destination_is_greeted() {
    let (status, content_type, body) = send(app(), form_post("From=%2B15559876543")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert_eq!(
        body,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response>\
         <Say voice=\"alice\">Hello! This call is being connected.</Say></Response>"
    );
}

#[tokio::test]
async fn empty_destination_is_greeted() {
    let (status, _, body) = send(app(), form_post("To=&From=%2B15559876543")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Say voice=\"alice\">"));
    assert!(!body.contains("<Dial"));
}

#[tokio::test]
async fn unusual_requests_still_get_a_document() {
    let empty = Request::builder()
        .method("POST")
        .uri(CONFIG.settings.voice_route)
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), empty).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Say"));

    let json = Request::builder()
        .method("POST")
        .uri(CONFIG.settings.voice_route)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"To":"+15551234567"}"#))
        .unwrap();
    let (status, _, body) = send(app(), json).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Say"));

    let get = Request::builder()
        .uri(format!(
            "{}?To=%2B15551234567",
            CONFIG.settings.voice_route
        ))
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), get).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Number>+15551234567</Number>"));
    assert!(!body.contains("callerId"));
}

#[tokio::test]
async fn oversized_body_still_gets_a_document() {
    let mut body = String::from("To=%2B15551234567&From=%2B15559876543&Padding=");
    body.push_str(&"a".repeat(3 * 1024 * 1024));

    let (status, content_type, body) = send(app(), form_post(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/xml"));
    assert!(body.contains("<Say voice=\"alice\">"));
}

#[tokio::test]
async fn whitespace_destination_is_dialed_as_given() {
    let (status, _, body) = send(app(), form_post("To=+%2B15551234567&From=%2B15559876543")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Number> +15551234567</Number>"));
}

#[tokio::test]
async fn signed_webhooks_are_verified() {
    let mut env = env();
    env.insert("TWILIO_AUTH_TOKEN", "0123456789abcdef".to_owned());

    let params = vec![
        ("To".to_owned(), "+15551234567".to_owned()),
        ("From".to_owned(), "+15559876543".to_owned()),
    ];
    let url = format!("https://calls.example.com{}", CONFIG.settings.voice_route);
    let signature = sign("0123456789abcdef", &url, &params).unwrap();

    let mut signed = form_post("To=%2B15551234567&From=%2B15559876543");
    signed
        .headers_mut()
        .insert(SIGNATURE_HEADER, signature.parse().unwrap());
    let (status, _, body) = send(app_with(env.clone()), signed).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<Dial"));

    let mut tampered = form_post("To=%2B19005550000&From=%2B15559876543");
    tampered
        .headers_mut()
        .insert(SIGNATURE_HEADER, signature.parse().unwrap());
    let (status, _, _) = send(app_with(env.clone()), tampered).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let unsigned = form_post("To=%2B15551234567&From=%2B15559876543");
    let (status, _, _) = send(app_with(env), unsigned).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_check_and_fallback() {
    let health = Request::builder()
        .uri("/health_check")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = send(app(), health).await;
    assert_eq!(status, StatusCode::OK);

    let unknown = Request::builder()
        .uri("/api/unknown")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = send(app(), unknown).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"Not Found"}"#);
}
