//! Google `gtx` client and cache against a mock HTTP server.

use std::sync::Arc;

use mockito::{Matcher, Server};
use postlingo::{
    CacheConfig, GoogleConfig, GoogleTranslateClient, TranslateError, TranslationCache,
    TranslationProvider, TranslationStatus, AUTO_DETECT,
};

fn client_for(url: &str) -> GoogleTranslateClient {
    let config = GoogleConfig {
        base_url: url.to_string(),
        timeout_ms: 2_000,
        ..GoogleConfig::default()
    };
    GoogleTranslateClient::new(&config).expect("client should build")
}

fn gtx_query(text: &str, source: &str, target: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("client".into(), "gtx".into()),
        Matcher::UrlEncoded("sl".into(), source.into()),
        Matcher::UrlEncoded("tl".into(), target.into()),
        Matcher::UrlEncoded("dt".into(), "t".into()),
        Matcher::UrlEncoded("q".into(), text.into()),
    ])
}

#[tokio::test]
async fn sends_gtx_query_and_joins_segments() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/translate_a/single")
        .match_query(gtx_query("Hello world & more", AUTO_DETECT, "es"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[[["Hola mundo ","Hello world ",null,null,10],["y más","& more",null,null,10]],null,"en"]"#)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let result = client
        .translate("Hello world & more", "es", AUTO_DETECT)
        .await
        .expect("translation should succeed");

    assert_eq!(result.translated_text, "Hola mundo y más");
    assert_eq!(result.detected_source_language.as_deref(), Some("en"));
    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_reported() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/translate_a/single")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.translate("hello", "es", AUTO_DETECT).await.unwrap_err();
    match err {
        TranslateError::Status { status, .. } => assert_eq!(status, 503),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/translate_a/single")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>captcha</html>")
        .create_async()
        .await;

    let client = client_for(&server.url());
    let err = client.translate("hello", "es", AUTO_DETECT).await.unwrap_err();
    assert!(matches!(err, TranslateError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let client = client_for("http://127.0.0.1:1");
    let err = client.translate("hello", "es", AUTO_DETECT).await.unwrap_err();
    assert!(
        matches!(err, TranslateError::Transport(_) | TranslateError::Timeout),
        "got {err:?}"
    );
}

#[tokio::test]
async fn cache_records_success_and_failure_from_http() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/translate_a/single")
        .match_query(gtx_query("hello", AUTO_DETECT, "es"))
        .with_status(200)
        .with_body(r#"[[["hola","hello",null,null,10]],null,"en"]"#)
        .create_async()
        .await;
    let _bad = server
        .mock("GET", "/translate_a/single")
        .match_query(gtx_query("broken", AUTO_DETECT, "es"))
        .with_status(200)
        .with_body(r#"{"sentences": "not a list"}"#)
        .create_async()
        .await;

    let cache = TranslationCache::new(
        Arc::new(client_for(&server.url())),
        &CacheConfig::default(),
    );

    let ok = cache.request("post1", "hello", "es").expect("valid request");
    let bad = cache.request("post2", "broken", "es").expect("valid request");
    assert_eq!(cache.get("post1").unwrap().status(), TranslationStatus::Pending);
    assert_eq!(cache.get("post2").unwrap().status(), TranslationStatus::Pending);
    ok.await.unwrap();
    bad.await.unwrap();

    let post1 = cache.get("post1").unwrap();
    assert_eq!(post1.translated_text(), "hola");
    assert_eq!(post1.source_language(), Some("en"));
    assert!(cache.is_complete("post1"));

    let post2 = cache.get("post2").unwrap();
    assert_eq!(post2.status(), TranslationStatus::Failed);
    assert_eq!(post2.translated_text(), "");
    assert!(post2.error_message().is_some_and(|m| !m.is_empty()));
    assert!(!cache.is_complete("post2"));
}
