use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use ficrec_core::persist::{save_catalogue, save_meta, save_report, MetaFile, OutputPaths};
use ficrec_core::title_search::{Catalogue, CatalogueEntry};
use ficrec_core::{ScoredDocument, SimilarityReport};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_tiny_output(dir: &std::path::Path) {
    let paths = OutputPaths::new(dir);

    let mut report = SimilarityReport::default();
    report.cossims.insert(
        0,
        vec![
            ScoredDocument { score: 0.8, document_index: 1 },
            ScoredDocument { score: 0.3, document_index: 0 },
        ],
    );
    report.cossims.insert(1, vec![]);
    report.index_to_reference_id.insert(0, 1001);
    report.index_to_reference_id.insert(1, 2002);
    report.query_title_to_index.insert("Solo Leveling".into(), 0);
    report.query_title_to_index.insert("Omniscient Reader".into(), 1);
    save_report(&paths, &report).unwrap();

    let catalogue = Catalogue::new(vec![
        CatalogueEntry { titles: vec!["Solo Leveling".into(), "Only I Level Up".into()], description: "hunters".into() },
        CatalogueEntry { titles: vec!["Omniscient Reader".into()], description: "a reader".into() },
    ]);
    save_catalogue(&paths, &catalogue).unwrap();

    let meta = MetaFile { num_reference_docs: 2, num_queries: 2, vocabulary_size: 5, created_at: "2026-01-01T00:00:00Z".into(), version: 1 };
    save_meta(&paths, &meta).unwrap();
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn app_for(dir: &std::path::Path) -> Router {
    server::build_app(dir.to_string_lossy().to_string()).unwrap()
}

#[tokio::test]
async fn recommendations_are_ranked_reference_ids() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());

    let (status, body) = call(app_for(dir.path()), "/recommendations?title=Solo%20Leveling&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["reference_id"].as_u64().unwrap(), 2002);
    assert_eq!(arr[1]["reference_id"].as_u64().unwrap(), 1001);

    let (_, body) = call(app_for(dir.path()), "/recommendations?title=Solo%20Leveling&k=1").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_title_is_not_found() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());
    let (status, _) = call(app_for(dir.path()), "/recommendations?title=Nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_without_matches_returns_empty_list() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());
    let (status, body) = call(app_for(dir.path()), "/recommendations?title=Omniscient%20Reader").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn episodes_substring_search() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());
    let (status, body) = call(app_for(dir.path()), "/episodes?title=reader").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["index"], 1);

    let (_, body) = call(app_for(dir.path()), "/episodes").await;
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn fuzzy_titles_match_aliases() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());
    let (status, body) = call(app_for(dir.path()), "/titles?q=only%20i%20level%20up&k=1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["index"], 0);
    assert_eq!(arr[0]["distance"], 0);
}

#[tokio::test]
async fn overlong_title_query_is_rejected() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());
    let longest = "a".repeat(256);
    let (status, _) = call(app_for(dir.path()), &format!("/titles?q={longest}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(app_for(dir.path()), &format!("/titles?q={longest}a")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("256"));
}

#[tokio::test]
async fn health_is_ok() {
    let dir = tempdir().unwrap();
    write_tiny_output(dir.path());
    let (status, body) = call(app_for(dir.path()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}
