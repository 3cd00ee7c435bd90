// SPDX-FileCopyrightText: 2026 Checkpoint Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end gateway behavior over scripted fetchers.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use checkpoint_classify::BanType;
use checkpoint_core::{CheckpointError, CircuitState, FallbackReason, ResultSource};
use checkpoint_gateway::{
    CheckedAtPolicy, DocumentStatus, EntryBanDomain, EntryBanStatus, InnDomain, InnQuery,
    InnStatus, PatentDomain, PatentQuery, PersonQuery, VerificationDomain,
};
use checkpoint_test_utils::{CacheMode, TestHarness};
use tokio_util::sync::CancellationToken;

fn person(surname: &str) -> PersonQuery {
    PersonQuery {
        surname: surname.to_string(),
        given_names: "Иван".to_string(),
        patronymic: None,
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 17).unwrap(),
        citizenship: None,
    }
}

fn transport_errors(n: usize) -> Vec<Result<String, CheckpointError>> {
    (0..n)
        .map(|_| Err(CheckpointError::transport("connection reset")))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_degrade_and_count_one_breaker_failure() {
    let harness = TestHarness::builder()
        .with_responses(transport_errors(3))
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let result = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(result.status, EntryBanStatus::Unknown);
    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.fallback, Some(FallbackReason::RetriesExhausted));
    assert!(result.error.as_deref().unwrap().contains("3 attempts"));
    assert_eq!(harness.fetcher.calls(), 3);
    assert_eq!(gateway.circuit_state().failures, 1);
}

#[tokio::test(start_paused = true)]
async fn no_data_page_means_no_ban() {
    let harness = TestHarness::builder()
        .with_responses(vec![Ok("Данных нет".to_string())])
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let result = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(result.status, EntryBanStatus::NoBan);
    assert_eq!(result.source, ResultSource::Live);
    assert!(result.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn ban_page_yields_type_expiry_and_reason() {
    let harness = TestHarness::builder()
        .with_responses(vec![Ok(
            "Запрет на въезд до: 31.12.2025. Причина: административное выдворение".to_string(),
        )])
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let result = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(
        result.status,
        EntryBanStatus::HasBan {
            ban_type: BanType::Administrative
        }
    );
    assert_eq!(result.expires_at, NaiveDate::from_ymd_opt(2025, 12, 31));
    assert!(
        result
            .reason
            .as_deref()
            .unwrap()
            .contains("административное выдворение")
    );

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["expiresAt"], "2025-12-31");
    assert_eq!(json["status"]["code"], "HAS_BAN");
}

#[tokio::test(start_paused = true)]
async fn disabled_domain_never_calls_the_fetcher() {
    let harness = TestHarness::builder()
        .with_default_body("Данных нет")
        .configure(|c| c.enabled = false)
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let result = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(result.source, ResultSource::Fallback);
    assert_eq!(result.fallback, Some(FallbackReason::Disabled));
    assert_eq!(result.reason.as_deref(), Some("check manually"));
    assert!(result.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn open_circuit_rejects_without_fetching() {
    let harness = TestHarness::builder()
        .with_responses(transport_errors(5))
        .configure(|c| {
            c.retry_attempts = 1;
            c.circuit_breaker_threshold = 5;
        })
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    for i in 0..5 {
        let result = gateway.check(&person(&format!("Иванов{i}"))).await.unwrap();
        assert_eq!(result.fallback, Some(FallbackReason::RetriesExhausted));
    }
    assert_eq!(gateway.circuit_state().state, CircuitState::Open);
    assert_eq!(harness.fetcher.calls(), 5);

    let rejected = gateway.check(&person("Петров")).await.unwrap();

    assert_eq!(harness.fetcher.calls(), 5);
    assert_eq!(rejected.source, ResultSource::Fallback);
    assert_eq!(rejected.fallback, Some(FallbackReason::CircuitOpen));
    assert!(rejected.error.as_deref().unwrap().contains("circuit open"));
}

#[tokio::test(start_paused = true)]
async fn repeated_query_is_served_from_cache_unchanged() {
    let harness = TestHarness::builder()
        .with_responses(vec![Ok(
            "Уголовное преследование. Основание: приговор суда".to_string(),
        )])
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let live = gateway.check(&person("Иванов")).await.unwrap();
    let cached = gateway.check(&person("  иванов ")).await.unwrap();

    assert_eq!(harness.fetcher.calls(), 1);
    assert_eq!(live.source, ResultSource::Live);
    assert_eq!(cached.source, ResultSource::Cache);
    assert_eq!(cached.status, live.status);
    assert_eq!(cached.reason, live.reason);
    assert_eq!(cached.checked_at, live.checked_at);
}

#[tokio::test(start_paused = true)]
async fn degraded_results_are_not_cached() {
    let mut responses = transport_errors(3);
    responses.push(Ok("Данных нет".to_string()));
    let harness = TestHarness::builder().with_responses(responses).build().await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let first = gateway.check(&person("Иванов")).await.unwrap();
    let second = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(first.source, ResultSource::Fallback);
    assert_eq!(second.source, ResultSource::Live);
    assert_eq!(second.status, EntryBanStatus::NoBan);
}

#[tokio::test(start_paused = true)]
async fn inn_cache_hits_refresh_checked_at() {
    let harness = TestHarness::builder()
        .with_responses(vec![Ok("<p>ИНН: 770123456789</p>".to_string())])
        .build()
        .await;
    let gateway = harness.gateway(InnDomain::new());
    let query = InnQuery {
        surname: "Каримов".into(),
        given_names: "Алишер".into(),
        patronymic: None,
        birth_date: NaiveDate::from_ymd_opt(1988, 1, 2).unwrap(),
        passport_series: "AA".into(),
        passport_number: "1234567".into(),
    };

    let live = gateway.check(&query).await.unwrap();
    let cached = gateway.check(&query).await.unwrap();

    assert_eq!(
        live.status,
        InnStatus::Found {
            inn: "770123456789".into()
        }
    );
    assert_eq!(cached.source, ResultSource::Cache);
    assert_eq!(cached.status, live.status);
    assert_eq!(InnDomain::new().checked_at_policy(), CheckedAtPolicy::Refresh);
    assert!(cached.checked_at >= live.checked_at);
}

#[tokio::test(start_paused = true)]
async fn validation_failure_is_returned_before_any_work() {
    let harness = TestHarness::builder()
        .with_default_body("Данных нет")
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let err = gateway.check(&person("   ")).await.unwrap_err();

    assert!(matches!(err, CheckpointError::Validation { ref field, .. } if field == "surname"));
    assert_eq!(harness.fetcher.calls(), 0);
    assert_eq!(gateway.circuit_state().failures, 0);
}

#[tokio::test(start_paused = true)]
async fn broken_cache_still_serves_live_results() {
    let harness = TestHarness::builder()
        .with_default_body("Патент действителен до 31.12.2099")
        .with_cache(CacheMode::Failing)
        .build()
        .await;
    assert!(!harness.cache.is_available());
    let gateway = harness.gateway(PatentDomain::patent());
    let query = PatentQuery {
        series: "77".into(),
        number: "1234567".into(),
        issue_date: None,
    };

    let first = gateway.check(&query).await.unwrap();
    let second = gateway.check(&query).await.unwrap();

    assert_eq!(first.status, DocumentStatus::Valid);
    assert_eq!(second.source, ResultSource::Live);
    assert_eq!(harness.fetcher.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_document_check_reports_error_status() {
    let harness = TestHarness::builder()
        .with_responses(transport_errors(3))
        .build()
        .await;
    let gateway = harness.gateway(PatentDomain::patent());
    let query = PatentQuery {
        series: "77".into(),
        number: "7654321".into(),
        issue_date: None,
    };

    let result = gateway.check(&query).await.unwrap();

    assert_eq!(result.status, DocumentStatus::Error);
    assert_eq!(result.source, ResultSource::Fallback);
}

#[tokio::test(start_paused = true)]
async fn permanent_source_error_is_rejected_without_breaker_failure() {
    let harness = TestHarness::builder()
        .with_responses(vec![Err(CheckpointError::Internal(
            "unparseable response".into(),
        ))])
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let result = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(result.fallback, Some(FallbackReason::Rejected));
    assert_eq!(harness.fetcher.calls(), 1);
    assert_eq!(gateway.circuit_state().failures, 0);
}

#[tokio::test(start_paused = true)]
async fn cancellation_yields_uncached_fallback() {
    let harness = TestHarness::builder()
        .with_default_body("Данных нет")
        .with_fetch_delay(Duration::from_secs(2))
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let cancelled = gateway
        .check_with_cancel(&person("Иванов"), &cancel)
        .await
        .unwrap();
    assert_eq!(cancelled.fallback, Some(FallbackReason::Cancelled));
    assert_eq!(gateway.circuit_state().failures, 0);

    let retried = gateway.check(&person("Иванов")).await.unwrap();
    assert_eq!(retried.source, ResultSource::Live);
}

#[tokio::test(start_paused = true)]
async fn overall_deadline_stops_slow_sources() {
    let harness = TestHarness::builder()
        .with_default_body("Данных нет")
        .with_fetch_delay(Duration::from_secs(30))
        .configure(|c| {
            c.timeout_secs = 60;
            c.deadline_secs = Some(2);
        })
        .build()
        .await;
    let gateway = harness.gateway(EntryBanDomain::new());

    let result = gateway.check(&person("Иванов")).await.unwrap();

    assert_eq!(result.fallback, Some(FallbackReason::DeadlineExceeded));
    assert_eq!(result.status, EntryBanStatus::Unknown);
}

#[tokio::test(start_paused = true)]
async fn concurrency_bound_limits_calls_in_flight() {
    let harness = TestHarness::builder()
        .with_default_body("Данных нет")
        .with_fetch_delay(Duration::from_millis(200))
        .configure(|c| c.max_concurrency = Some(2))
        .build()
        .await;
    let gateway = Arc::new(harness.gateway(EntryBanDomain::new()));

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..6 {
        let gateway = gateway.clone();
        tasks.spawn(async move { gateway.check(&person(&format!("Иванов{i}"))).await });
    }

    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap().unwrap();
        assert_eq!(result.source, ResultSource::Live);
    }
    assert_eq!(harness.fetcher.calls(), 6);
    assert!(harness.fetcher.peak_in_flight() <= 2);
}
