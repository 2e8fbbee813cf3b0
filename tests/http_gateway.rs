//! HttpGateway against a mock console API.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use hwconsole_search::model::types::{Query, ResultStatus, SearchFilters, SortBy};
use hwconsole_search::search::fallback::{OFFLINE_ADVISORY, default_entity_types};
use hwconsole_search::search::gateway::{GatewayError, SearchGateway};
use hwconsole_search::search::http::HttpGateway;
use hwconsole_search::search::pipeline::{PipelineSettings, QueryPipeline, next_settled};
use mockito::{Matcher, Server};
use serde_json::json;

fn search_body() -> String {
    json!({
        "query": "led",
        "totalResults": 42,
        "page": 1,
        "totalPages": 3,
        "executionTimeMs": 17,
        "isSuccess": true,
        "results": [
            {
                "id": 7,
                "entityType": "HardwareOutput",
                "title": "LED Strip",
                "description": "Annunciator LED strip",
                "relevanceScore": 0.93,
                "actions": [
                    { "name": "View", "url": "https://api.local/api/hardware-outputs/7", "method": "GET" }
                ]
            },
            {
                "id": "12",
                "entityType": "HardwareOutputType",
                "title": "LED Generic Indicator",
                "relevanceScore": 1.7
            }
        ],
        "facets": {
            "entityTypes": { "HardwareOutput": 30, "HardwareOutputType": 12 }
        }
    })
    .to_string()
}

#[tokio::test]
async fn search_sends_every_filter() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "led".into()),
            Matcher::UrlEncoded("limit".into(), "5".into()),
            Matcher::UrlEncoded("offset".into(), "10".into()),
            Matcher::UrlEncoded("includeInactive".into(), "true".into()),
            Matcher::UrlEncoded("sortBy".into(), "title".into()),
            Matcher::UrlEncoded("type".into(), "HardwareOutput".into()),
            Matcher::UrlEncoded("fromDate".into(), "2024-01-01".into()),
            Matcher::UrlEncoded("toDate".into(), "2024-06-30".into()),
            Matcher::UrlEncoded("manufacturer".into(), "Honeywell".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body())
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    let query = Query::new("led").with_filters(SearchFilters {
        entity_type: Some("HardwareOutput".into()),
        limit: 5,
        offset: 10,
        include_inactive: true,
        from_date: NaiveDate::from_ymd_opt(2024, 1, 1),
        to_date: NaiveDate::from_ymd_opt(2024, 6, 30),
        manufacturer: Some("Honeywell".into()),
        sort_by: SortBy::Title,
        ..SearchFilters::default()
    });
    let response = gateway.search(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.total_results, 42);
    assert_eq!(response.results.len(), 2);
    assert_eq!(response.results[0].id, "7");
    assert_eq!(response.results[1].relevance_score, 1.0);
    assert_eq!(response.facets.entity_types.get("HardwareOutput"), Some(&30));
}

#[tokio::test]
async fn quick_search_returns_items() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/search/quick")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "led".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body())
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    let items = gateway.quick_search("led", 10).await.unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "LED Strip");
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/search/quick")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    let err = gateway.quick_search("xyz", 10).await.unwrap_err();
    assert!(matches!(err, GatewayError::Status(500)), "{err}");
}

#[tokio::test]
async fn unsuccessful_envelope_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "isSuccess": false, "errorMessage": "index offline" }).to_string())
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    match gateway.search(&Query::new("panel")).await {
        Err(GatewayError::Rejected(msg)) => assert_eq!(msg, "index offline"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/search/quick")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    let err = gateway.quick_search("led", 10).await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)), "{err}");
}

#[tokio::test]
async fn entity_types_are_fetched_once_per_session() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/search/entity-types")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "id": "HardwarePanel", "name": "Hardware Panels", "description": "Panels", "icon": "dashboard" }
            ])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    let first = gateway.entity_types().await.unwrap();
    let second = gateway.entity_types().await.unwrap();

    mock.assert_async().await;
    assert_eq!(first, second);
    assert_eq!(first[0].id, "HardwarePanel");
}

#[tokio::test]
async fn entity_types_fall_back_to_builtin_catalog() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/search/entity-types")
        .with_status(404)
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    assert_eq!(gateway.entity_types_or_default().await, default_entity_types());
}

#[tokio::test]
async fn suggestions_and_statistics_decode() {
    let mut server = Server::new_async().await;
    let _suggest = server
        .mock("GET", "/api/search/suggestions")
        .match_query(Matcher::UrlEncoded("q".into(), "pan".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([{ "text": "panel", "type": "term", "score": 0.8 }]).to_string())
        .create_async()
        .await;
    let _stats = server
        .mock("GET", "/api/search/statistics")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "totalSearches": 120, "searchSuccessRate": 0.97 }).to_string())
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), None).unwrap();
    let suggestions = gateway.suggestions("pan", 5).await.unwrap();
    assert_eq!(suggestions[0].text, "panel");
    assert_eq!(suggestions[0].kind, "term");

    let stats = gateway.statistics().await.unwrap();
    assert_eq!(stats.total_searches, 120);
    assert!(stats.most_searched_terms.is_empty());
}

#[tokio::test]
async fn slow_server_hits_client_timeout() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/search/quick")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(500));
            w.write_all(b"{}")
        })
        .create_async()
        .await;

    let gateway = HttpGateway::new(server.url(), Some(Duration::from_millis(100))).unwrap();
    let err = gateway.quick_search("led", 10).await.unwrap_err();
    assert!(matches!(err, GatewayError::Timeout(_)), "{err}");
}

#[tokio::test]
async fn pipeline_over_http_degrades_when_service_fails() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/api/search/quick")
        .match_query(Matcher::UrlEncoded("q".into(), "led".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body())
        .create_async()
        .await;
    let _down = server
        .mock("GET", "/api/search/quick")
        .match_query(Matcher::UrlEncoded("q".into(), "xyz".into()))
        .with_status(503)
        .create_async()
        .await;

    let gateway = Arc::new(HttpGateway::new(server.url(), None).unwrap());
    let settings = PipelineSettings {
        debounce: Duration::from_millis(5),
        ..PipelineSettings::instant()
    };
    let (pipeline, mut events) = QueryPipeline::spawn(gateway, settings);

    pipeline.set_text("led");
    let set = next_settled(&mut events).await.unwrap();
    assert_eq!(set.status, ResultStatus::Matches);
    assert_eq!(set.len(), 2);

    pipeline.set_text("xyz");
    let set = next_settled(&mut events).await.unwrap();
    assert_eq!(set.advisory(), Some(OFFLINE_ADVISORY));
}
