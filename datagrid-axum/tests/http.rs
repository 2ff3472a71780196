use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use datagrid_axum::{table_route, DataTablesHttpError};
use datagrid_core::prelude::*;
use datagrid_core::{FieldError, MemoryBackend, MemoryQuery, TableHooks};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Debug, Clone)]
struct City {
    id: i64,
    name: String,
    population: i64,
}

impl Entity for City {
    fn table_name() -> &'static str {
        "city"
    }

    fn register_accessors(accessors: &mut Accessors<Self>) {
        accessors
            .register("getId", |c: &City| c.id)
            .register("getName", |c: &City| c.name.clone())
            .register("getPopulation", |c: &City| c.population);
    }
}

type Query = MemoryQuery<City>;

fn cities() -> Vec<City> {
    [("Lyon", 522_000), ("Nantes", 320_000), ("Paris", 2_100_000), ("Lille", 236_000)]
        .iter()
        .enumerate()
        .map(|(i, (name, population))| City {
            id: i as i64 + 1,
            name: name.to_string(),
            population: *population,
        })
        .collect()
}

fn app() -> Router {
    let handlers = FieldHandlers::<City, Query>::builder()
        .search("name", |q, term| q.add_predicate(Filter::ilike("name", &format!("{term}%"))))
        .build();
    let table = DataTable::new(MemoryBackend::new(cities()), handlers);
    Router::new().route("/cities", table_route(Arc::new(table)))
}

async fn post_json(app: Router, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/cities")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn error_parts(err: impl IntoResponse) -> (StatusCode, Value) {
    let resp = err.into_response();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn serves_table_page() {
    let body = json!({
        "draw": 4,
        "columns": [
            {"data": 0, "name": "name", "searcheable": true, "orderable": true},
            {"data": 1, "name": "population", "searcheable": false, "orderable": true},
        ],
        "order": [{"column": 1, "dir": "desc"}],
        "start": 0,
        "length": 2,
    });
    let (status, json) = post_json(app(), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({
            "draw": 4,
            "recordsTotal": 4,
            "recordsFiltered": 4,
            "data": [["Paris", 2_100_000], ["Lyon", 522_000]],
        })
    );
}

#[tokio::test]
async fn column_search_over_http() {
    let body = json!({
        "draw": 1,
        "columns": [{"data": 0, "name": "name", "search": {"value": "l", "regex": false}}],
        "order": [{"column": 0, "dir": "asc"}],
    });
    let (status, json) = post_json(app(), body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["recordsFiltered"], 2);
    assert_eq!(json["data"], json!([["Lille"], ["Lyon"]]));
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (status, json) = post_json(app(), "{\"draw\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["details"][0]["field"], "body");
    assert_eq!(json["details"][0]["code"], "parse");
}

#[tokio::test]
async fn invalid_request_is_400() {
    let body = json!({"draw": 1, "start": -3, "columns": [{"data": 0, "name": "name"}]});
    let (status, json) = post_json(app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation failed");
    assert_eq!(json["details"][0]["field"], "start");
}

#[tokio::test]
async fn unknown_order_column_is_400() {
    let body = json!({
        "draw": 1,
        "columns": [{"data": 0, "name": "name"}],
        "order": [{"column": 3, "dir": "asc"}],
    });
    let (status, json) = post_json(app(), body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Order references unknown column position 3");
}

struct Unavailable;

impl TableHooks<Query> for Unavailable {
    fn pre_search(
        &self,
        _query: &mut Query,
        _ctx: &mut RequestContext<Query>,
        _params: &Parameters,
    ) -> Result<(), DataTableError> {
        Err(DataTableError::backend(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "database unreachable",
        )))
    }
}

#[tokio::test]
async fn backend_failure_is_500() {
    let table = DataTable::new(
        MemoryBackend::new(cities()),
        FieldHandlers::<City, Query>::builder().build(),
    )
    .with_hooks(Unavailable);
    let app = Router::new().route("/cities", table_route(Arc::new(table)));

    let body = json!({"draw": 1, "columns": [{"data": 0, "name": "name"}]});
    let (status, json) = post_json(app, body.to_string()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Backend error: database unreachable");
}

#[tokio::test]
async fn error_mapping() {
    let (status, json) = error_parts(DataTablesHttpError::from(DataTableError::Binding(vec![
        FieldError::new("start", "lower than 0", "validation"),
    ])))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json,
        json!({
            "error": "Validation failed",
            "details": [{"field": "start", "message": "lower than 0", "code": "validation"}],
        })
    );

    let (status, json) =
        error_parts(DataTablesHttpError::from(DataTableError::Execution("worker panicked".into())))
            .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Execution error: worker panicked");
}
