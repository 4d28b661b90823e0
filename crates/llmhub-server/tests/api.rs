//! Router tests: requests go through the full axum stack with every
//! upstream (OpenRouter, NewsAPI, OpenWeather) served by a mock server.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use llmhub_core::GatewayConfig;
use llmhub_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(upstream: &str, with_data_keys: bool) -> GatewayConfig {
    let mut env: HashMap<&str, String> = HashMap::new();
    env.insert("OPENROUTER_API_KEY", "router-key".into());
    env.insert("OPENROUTER_BASE_URL", upstream.to_string());
    env.insert("NEWS_BASE_URL", upstream.to_string());
    env.insert("STOCK_NEWS_FEED_URL", format!("{}/rss", upstream));
    env.insert("OPENWEATHER_BASE_URL", upstream.to_string());
    if with_data_keys {
        env.insert("NEWS_API_KEY", "news-key".into());
        env.insert("OPENWEATHER_KEY", "weather-key".into());
    }
    GatewayConfig::from_lookup(|k| env.get(k).cloned())
}

fn app(upstream: &str, with_data_keys: bool) -> Router {
    let state = AppState::new(config(upstream, with_data_keys)).unwrap();
    build_router(Arc::new(state))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_chat(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn mock_geocode(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Delhi", "lat": 28.65, "lon": 77.23, "country": "IN", "state": "Delhi"}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_root_liveness() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server.uri(), false), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_providers_listing() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server.uri(), false), get("/providers")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["providers"],
        json!(["openai", "gemini", "deepseek", "news"])
    );
}

#[test]
fn test_missing_llm_key_fails_startup() {
    let config = GatewayConfig::from_lookup(|_| None);
    let err = AppState::new(config).err().expect("startup must fail");
    assert!(err.to_string().contains("API key missing"));
}

#[tokio::test]
async fn test_chat_history_persists_across_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello there"}}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let router = app(&server.uri(), false);
    let request = json!({"provider": "deepseek", "message": "hi"});

    let (status, body) = send(
        router.clone(),
        post_chat("/chat?session_id=s1", request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "Hello there", "provider": "deepseek"}));

    send(router, post_chat("/chat?session_id=s1", request)).await;

    let requests = server.received_requests().await.unwrap();
    let second: Value = serde_json::from_slice(&requests[1].body).unwrap();
    // user, assistant, user
    assert_eq!(second["messages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_chat_unknown_provider_is_bad_request() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server.uri(), false),
        post_chat("/chat", json!({"provider": "claude", "message": "hi"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("claude"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_upstream_failure_is_a_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server.uri(), false),
        post_chat("/chat", json!({"provider": "openai", "message": "hi"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "openai");
    assert!(body["response"].as_str().unwrap().contains("Unauthorized"));
}

#[tokio::test]
async fn test_chat_news_provider_is_relabelled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "articles": [{"title": "Markets rally"}],
        })))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server.uri(), true),
        post_chat("/chat", json!({"provider": "news", "message": "anything"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["provider"], "newsapi");
    assert!(body["response"].as_str().unwrap().contains("Markets rally"));
}

#[tokio::test]
async fn test_news_missing_key_is_bad_request() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server.uri(), false), get("/news/in")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("NEWS_API_KEY"));
}

#[tokio::test]
async fn test_news_upstream_error_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let (status, _) = send(app(&server.uri(), true), get("/news/global")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_news_combined_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("country", "in"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "articles": [],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/top-headlines/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "sources": [{"id": "the-hindu"}],
        })))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server.uri(), true),
        get("/news/combined?country=in"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["headlines"]["articles"].is_array());
    assert_eq!(body["sources"]["sources"][0]["id"], "the-hindu");
}

#[tokio::test]
async fn test_news_stocks_default_feed() {
    let server = MockServer::start().await;
    let rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Feed</title>
<item><title>Stocks up</title><link>https://example.com/a</link><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>
<item><title>Stocks down</title><link>https://example.com/b</link></item>
</channel></rss>"#;
    Mock::given(method("GET"))
        .and(path("/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss))
        .mount(&server)
        .await;

    let (status, body) = send(app(&server.uri(), true), get("/news/stocks?limit=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feed_url"], format!("{}/rss", server.uri()));
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["items"][0]["title"], "Stocks up");
}

#[tokio::test]
async fn test_weather_current_degrades_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server.uri(), true),
        get("/weather/current?city=Atlantis"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].is_string());
    assert!(body["error"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn test_weather_current_without_city_degrades_to_text() {
    let server = MockServer::start().await;
    let (status, body) = send(app(&server.uri(), true), get("/weather/current")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["text"].as_str().unwrap().contains("city"));
    assert!(body["error"].is_string());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_weather_current_unknown_units_fall_back_to_metric() {
    let server = MockServer::start().await;
    mock_geocode(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "main": {"temp": 31.5},
            "weather": [{"description": "haze"}],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server.uri(), true),
        get("/weather/current?city=Delhi&units=kelvin"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["main"]["temp"], 31.5);
    assert_eq!(body["resolved_name"], "Delhi, Delhi, IN");
}

#[tokio::test]
async fn test_weather_forecast_failure_is_bad_request() {
    let server = MockServer::start().await;
    let (status, body) = send(
        app(&server.uri(), false),
        get("/weather/forecast?city=Delhi"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_weather_combined_shares_geocode() {
    let server = MockServer::start().await;
    mock_geocode(&server).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Delhi",
            "main": {"temp": 31.5},
            "weather": [{"description": "haze"}],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": []})))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = send(
        app(&server.uri(), true),
        get("/weather/combined?city=Delhi&units=metric"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current"]["main"]["temp"], 31.5);
    assert!(body["forecast"]["list"].is_array());

    let geocodes = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/geo/1.0/direct")
        .count();
    assert_eq!(geocodes, 1);
}
