// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use checkpoint_config::FetchMethod;
use checkpoint_core::{CheckpointError, Fetcher, VerificationQuery};
use checkpoint_fetch::HttpFetcher;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug)]
struct Lookup {
    series: String,
    number: String,
}

impl VerificationQuery for Lookup {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![("series", self.series.clone()), ("number", self.number.clone())]
    }

    fn validate(&self) -> Result<(), CheckpointError> {
        Ok(())
    }
}

fn lookup() -> Lookup {
    Lookup {
        series: "77".into(),
        number: "1234567".into(),
    }
}

fn fetcher(server: &MockServer, method: FetchMethod) -> HttpFetcher {
    HttpFetcher::new(format!("{}/check", server.uri()), method, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn get_sends_fields_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/check"))
        .and(query_param("series", "77"))
        .and(query_param("number", "1234567"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Патент действителен"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher(&server, FetchMethod::Get).fetch(&lookup()).await.unwrap();

    assert_eq!(body, "Патент действителен");
}

#[tokio::test]
async fn post_sends_fields_as_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/check"))
        .and(body_string_contains("series=77"))
        .and(body_string_contains("number=1234567"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher(&server, FetchMethod::Post).fetch(&lookup()).await.unwrap();

    assert_eq!(body, "ok");
}

#[tokio::test]
async fn non_success_status_is_a_transient_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = fetcher(&server, FetchMethod::Get)
        .fetch(&lookup())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckpointError::HttpStatus { status: 503 }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_source_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(
        format!("{}/check", server.uri()),
        FetchMethod::Get,
        Duration::from_millis(200),
    )
    .unwrap();
    let err = fetcher.fetch(&lookup()).await.unwrap_err();

    assert!(matches!(err, CheckpointError::Timeout { .. }));
}

#[tokio::test]
async fn oversized_body_is_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a".repeat(4096)))
        .mount(&server)
        .await;

    let body = fetcher(&server, FetchMethod::Get)
        .with_max_body_bytes(100)
        .fetch(&lookup())
        .await
        .unwrap();

    assert_eq!(body.len(), 100);
}

#[tokio::test]
async fn fetch_url_reads_arbitrary_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/law/115-fz"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Статья 1</h1>"))
        .mount(&server)
        .await;

    let body = fetcher(&server, FetchMethod::Get)
        .fetch_url(&format!("{}/law/115-fz", server.uri()))
        .await
        .unwrap();

    assert_eq!(body, "<h1>Статья 1</h1>");
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let fetcher = HttpFetcher::new(
        "http://127.0.0.1:9/check",
        FetchMethod::Get,
        Duration::from_secs(2),
    )
    .unwrap();

    let err = fetcher.fetch(&lookup()).await.unwrap_err();

    assert!(matches!(
        err,
        CheckpointError::Transport { .. } | CheckpointError::Timeout { .. }
    ));
}
