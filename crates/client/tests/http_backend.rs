//! Integration tests for the HTTP backend against a throwaway in-process
//! mock service: query-parameter serialization, envelope decoding, and
//! status/error mapping.

use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::json;

use regscope_client::{ClientConfig, ClientError, HttpBackend};
use regscope_core::{FilterState, MetadataSnapshot, SearchBackend};

// ---------------------------------------------------------------------------
// Mock service plumbing
// ---------------------------------------------------------------------------

/// Query parameter lists captured per request, in arrival order.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<Vec<(String, String)>>>>);

impl Captured {
    fn take(&self) -> Vec<Vec<(String, String)>> {
        std::mem::take(&mut self.0.lock().unwrap())
    }
}

async fn capture_search(
    State(captured): State<Captured>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<serde_json::Value> {
    captured.0.lock().unwrap().push(params);
    Json(json!({
        "results": [
            { "section": "§ 310.4", "excerpt": "privacy of records", "link": "https://example.gov/310.4" }
        ]
    }))
}

/// Bind an ephemeral port, serve the router in the background, and return a
/// backend pointed at it.
async fn serve(app: Router) -> HttpBackend {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    HttpBackend::new(ClientConfig::default().base_url(format!("http://{addr}"))).unwrap()
}

async fn serve_search() -> (Captured, HttpBackend) {
    let captured = Captured::default();
    let app = Router::new()
        .route("/api/search", get(capture_search))
        .with_state(captured.clone());
    (captured, serve(app).await)
}

// ---------------------------------------------------------------------------
// Query serialization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_sends_only_the_query_when_no_facets_are_set() {
    let (captured, backend) = serve_search().await;
    let filters = FilterState { query: "privacy".into(), ..FilterState::default() };

    let hits = backend.search(&filters).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].label(), "§ 310.4");

    let requests = captured.take();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0], [("q".to_string(), "privacy".to_string())]);
}

#[tokio::test]
async fn facet_only_search_uses_the_repeatable_slug_parameter() {
    let (captured, backend) = serve_search().await;
    let filters = FilterState {
        agency_slug: Some("department-of-defense".into()),
        ..FilterState::default()
    };

    backend.search(&filters).await.unwrap();

    let requests = captured.take();
    assert_eq!(
        requests[0],
        [("agency_slugs[]".to_string(), "department-of-defense".to_string())]
    );
}

#[tokio::test]
async fn all_filter_fields_serialize_under_their_wire_names() {
    let (captured, backend) = serve_search().await;
    let filters = FilterState {
        query: "  privacy  ".into(),
        agency_slug: Some("department-of-defense".into()),
        title_number: Some(32),
        version_date: NaiveDate::from_ymd_opt(2024, 1, 31),
    };

    backend.search(&filters).await.unwrap();

    let requests = captured.take();
    assert_eq!(
        requests[0],
        [
            ("q".to_string(), "privacy".to_string()),
            ("agency_slugs[]".to_string(), "department-of-defense".to_string()),
            ("title".to_string(), "32".to_string()),
            ("issueDate".to_string(), "2024-01-31".to_string()),
        ]
    );
}

// ---------------------------------------------------------------------------
// Response decoding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_results_field_is_an_empty_success() {
    let app = Router::new().route("/api/search", get(|| async { Json(json!({})) }));
    let backend = serve(app).await;

    let hits = backend
        .search(&FilterState { query: "nothing".into(), ..FilterState::default() })
        .await
        .unwrap();
    assert!(hits.is_empty(), "no results is success, not an error");
}

#[tokio::test]
async fn metadata_endpoints_feed_a_snapshot() {
    let app = Router::new()
        .route(
            "/api/titles",
            get(|| async {
                Json(json!({
                    "titles": [
                        { "number": 32, "name": "National Defense",
                          "latest_amended_on": "2024-03-09", "latest_issue_date": "2024-03-09" }
                    ]
                }))
            }),
        )
        .route(
            "/api/agencies",
            get(|| async {
                Json(json!({
                    "agencies": [
                        { "name": "Department of Defense", "slug": "department-of-defense",
                          "cfr_references": [ { "title": 32, "chapter": "I" } ] }
                    ]
                }))
            }),
        )
        .route(
            "/api/agency-title-map",
            get(|| async { Json(json!({ "map": { "Department of Defense": [32] } })) }),
        );
    let backend = serve(app).await;

    let snapshot = MetadataSnapshot::load(&backend).await.unwrap();
    assert_eq!(snapshot.titles().len(), 1);
    assert_eq!(snapshot.agencies()[0].cfr_references[0].chapter.as_deref(), Some("I"));
    assert_eq!(snapshot.agency_title_map()["Department of Defense"], [32]);

    let summary = snapshot.summary();
    assert_eq!(summary.most_recent_amendment.unwrap().title_number, 32);
}

#[tokio::test]
async fn suggestions_pass_the_partial_and_decode() {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/api/search/suggestions",
            get(
                |State(captured): State<Captured>,
                 Query(params): Query<Vec<(String, String)>>| async move {
                    captured.0.lock().unwrap().push(params);
                    Json(json!({ "suggestions": ["Title 32 - National Defense", "privacy act"] }))
                },
            ),
        )
        .with_state(captured.clone());
    let backend = serve(app).await;

    let labels = backend.suggest("priv").await.unwrap();
    assert_eq!(labels, ["Title 32 - National Defense", "privacy act"]);
    assert_eq!(captured.take()[0], [("query".to_string(), "priv".to_string())]);
}

#[tokio::test]
async fn word_counts_decode_totals_and_breakdowns() {
    let app = Router::new()
        .route("/api/wordcount/{title}", get(|| async { Json(json!({ "wordCount": 123456 })) }))
        .route(
            "/api/wordcount/agency/{slug}",
            get(|| async {
                Json(json!({
                    "breakdowns": [
                        { "title": 32, "chapter": "I", "wordCount": 100000 },
                        { "title": 2, "chapter": null, "wordCount": 23456 }
                    ],
                    "total": 123456
                }))
            }),
        );
    let backend = serve(app).await;

    assert_eq!(backend.title_word_count(32).await.unwrap(), 123456);

    let agency = backend.agency_word_count("department-of-defense").await.unwrap();
    assert_eq!(agency.total, 123456);
    assert_eq!(agency.breakdowns.len(), 2);
    assert_eq!(agency.breakdowns[1].chapter, None);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_success_status_maps_to_a_status_error() {
    let app = Router::new()
        .route("/api/search", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
    let backend = serve(app).await;

    let err = backend
        .search(&FilterState { query: "privacy".into(), ..FilterState::default() })
        .await
        .unwrap_err();
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::Status { status, .. }) => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_a_decode_error() {
    let app = Router::new().route("/api/wordcount/{title}", get(|| async { "not json" }));
    let backend = serve(app).await;

    let err = backend.title_word_count(32).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }), "got {err:?}");
}
