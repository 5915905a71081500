//! Front unit against a mocked Back unit.

use cep_weather::config::Unit;
use httpmock::prelude::*;
use reqwest::StatusCode;
use serde_json::json;

mod common;

use common::{
    client, front_config, header_value, start_capturing_backend, start_truncating_backend,
    start_unit, trace_id_of,
    TestTelemetry, TRACEPARENT, TRACE_ID,
};

#[tokio::test]
async fn test_relays_back_result() {
    let back = MockServer::start_async().await;
    let back_mock = back
        .mock_async(|when, then| {
            when.method(GET)
                .path("/temperature")
                .query_param("cep", "01310930");
            then.status(200).json_body(
                json!({"city": "São Paulo", "temp_C": 25, "temp_F": 77, "temp_K": 298}),
            );
        })
        .await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&back.url("/temperature")),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=01310930", addr))
        .send()
        .await
        .expect("front unit unreachable");

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.text().await.unwrap(),
        r#"{"city":"São Paulo","temp_C":25,"temp_F":77,"temp_K":298}"#
    );
    back_mock.assert_hits_async(1).await;
    assert_eq!(telemetry.span_names(), vec!["weather-front-01310930".to_string()]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_back_not_found_maps_to_404() {
    let back = MockServer::start_async().await;
    back.mock_async(|when, then| {
        when.method(GET).path("/temperature");
        then.status(404).body("can not find zipcode");
    })
    .await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&back.url("/temperature")),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=00000000", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.text().await.unwrap(), "can not find zipcode");

    shutdown.trigger();
}

#[tokio::test]
async fn test_back_error_message_is_mirrored() {
    let back = MockServer::start_async().await;
    back.mock_async(|when, then| {
        when.method(GET).path("/temperature");
        then.status(500).body("weather service responded with status 401 Unauthorized\n");
    })
    .await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&back.url("/temperature")),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=01310930", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.text().await.unwrap(),
        "weather service responded with status 401 Unauthorized"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreadable_error_body_falls_back_to_status() {
    let back_addr = start_truncating_backend().await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&format!("http://{}/temperature", back_addr)),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=01310930", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        res.text().await.unwrap(),
        "back unit responded with status 500 Internal Server Error"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_undecodable_back_body() {
    let back = MockServer::start_async().await;
    back.mock_async(|when, then| {
        when.method(GET).path("/temperature");
        then.status(200).body("not json");
    })
    .await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&back.url("/temperature")),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=01310930", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(res
        .text()
        .await
        .unwrap()
        .starts_with("invalid response from back unit"));

    // The span was closed on the error path too.
    assert_eq!(telemetry.span_names(), vec!["weather-front-01310930".to_string()]);

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_zipcode_never_calls_back() {
    let back = MockServer::start_async().await;
    let back_mock = back
        .mock_async(|when, then| {
            when.method(GET);
            then.status(200).body("{}");
        })
        .await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&back.url("/temperature")),
        &telemetry.instrumentation,
    )
    .await;

    for cep in ["123", "", "0131093", "013109300"] {
        let res = client()
            .get(format!("http://{}/temperature?cep={}", addr, cep))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "cep {:?}", cep);
        assert_eq!(res.text().await.unwrap(), "invalid zipcode");
    }
    back_mock.assert_hits_async(0).await;

    shutdown.trigger();
}

#[tokio::test]
async fn test_trace_context_injected_into_back_call() {
    let (back_addr, captured) = start_capturing_backend(
        200,
        r#"{"city":"Recife","temp_C":30,"temp_F":86,"temp_K":303}"#,
    )
    .await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&format!("http://{}/temperature", back_addr)),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=50030230", addr))
        .header("traceparent", TRACEPARENT)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let heads = captured.lock().unwrap().clone();
    assert_eq!(heads.len(), 1);
    assert!(heads[0].starts_with("GET /temperature?cep=50030230 "));

    let traceparent = header_value(&heads[0], "traceparent").expect("traceparent not forwarded");
    assert_eq!(trace_id_of(&traceparent).as_deref(), Some(TRACE_ID));
    // The Back unit sees the Front unit's span as its parent, not the caller's.
    assert_ne!(traceparent, TRACEPARENT);

    shutdown.trigger();
}

#[tokio::test]
async fn test_new_trace_started_without_inbound_context() {
    let (back_addr, captured) = start_capturing_backend(404, "can not find zipcode").await;

    let telemetry = TestTelemetry::new();
    let (addr, shutdown) = start_unit(
        Unit::Front,
        front_config(&format!("http://{}/temperature", back_addr)),
        &telemetry.instrumentation,
    )
    .await;

    let res = client()
        .get(format!("http://{}/temperature?cep=00000000", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let heads = captured.lock().unwrap().clone();
    let traceparent = header_value(&heads[0], "traceparent").expect("traceparent not sent");
    let spans = telemetry.finished_spans();
    assert_eq!(spans.len(), 1);
    assert_eq!(
        trace_id_of(&traceparent),
        Some(spans[0].span_context.trace_id().to_string())
    );

    shutdown.trigger();
}
