// tests for the http api, driven without a listener

use std::collections::HashMap;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use sqlwrite::{Databases, Db, Server};
use tower::ServiceExt;

async fn app() -> Router {
    let test = Db::connect("test", "sqlite::memory:").await.unwrap();
    test.execute_write(
        "create table one (id integer primary key, count integer)",
        &HashMap::new(),
    )
    .await
    .unwrap();
    test.execute_write(
        "insert into one (id, count) values (1, 10), (2, 20)",
        &HashMap::new(),
    )
    .await
    .unwrap();
    let test2 = Db::connect("test2", "sqlite::memory:").await.unwrap();

    Server::router(Databases::from_dbs(vec![test, test2]))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post(body: Value) -> Request<Body> {
    Request::post("/-/write")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app().await, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_form_defaults_to_first_database() {
    let (status, body) = send(app().await, get("/-/write")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["databases"], json!(["test", "test2"]));
    assert_eq!(body["database"], "test");
    assert_eq!(body["tables"], json!(["one"]));
    assert_eq!(body["parameters"], json!([]));
}

#[tokio::test]
async fn test_form_selects_database_and_derives_parameters() {
    let uri = "/-/write?database=test&sql=update%20one%20set%20count%20%3D%20%3Acount";
    let (status, body) = send(app().await, get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "test");
    assert_eq!(
        body["parameters"],
        json!([{ "name": "count", "kind": "text", "label": "count" }])
    );

    let (_, body) = send(app().await, get("/-/write?database=test2")).await;
    assert_eq!(body["database"], "test2");
    assert_eq!(body["tables"], json!([]));
}

#[tokio::test]
async fn test_derive_parameters_endpoint() {
    let uri = "/-/write/derive-parameters?database=test\
               &sql=update%20one%20set%20count%20%3D%20%3Anote_textarea";
    let (status, body) = send(app().await, get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "parameters": [{ "name": "note_textarea", "kind": "textarea", "label": "note" }] })
    );
}

#[tokio::test]
async fn test_derive_parameters_invalid_sql_is_empty() {
    let uri = "/-/write/derive-parameters?database=test&sql=insert%20into%20nope%20values%20(%3Aa)";
    let (status, body) = send(app().await, get(uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "parameters": [] }));
}

#[tokio::test]
async fn test_write_messages() {
    let cases = [
        ("test", "create table newtable (id integer)", "info", "Created table: newtable"),
        ("test2", "create table newtable (id integer)", "info", "Created table: newtable"),
        ("test2", "create view blah as select 1 + 1", "info", "Created view: blah"),
        ("test", "update one set count = 5", "info", "2 rows affected"),
        ("test", "invalid sql", "error", "near \"invalid\": syntax error"),
    ];

    for (database, sql, level, message) in cases {
        let (status, body) = send(
            app().await,
            post(json!({ "database": database, "sql": sql })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "sql: {sql}");
        assert_eq!(body["database"], database);
        assert_eq!(body["level"], level, "sql: {sql}");
        assert_eq!(body["message"], message, "sql: {sql}");
    }
}

#[tokio::test]
async fn test_write_with_params() {
    let (_, body) = send(
        app().await,
        post(json!({
            "database": "test",
            "sql": "update one set count = :count where id = :id",
            "params": { "count": "7", "id": "1" },
        })),
    )
    .await;
    assert_eq!(body["message"], "1 row affected");
}

#[tokio::test]
async fn test_write_unknown_database() {
    let (status, body) = send(
        app().await,
        post(json!({ "database": "nope", "sql": "select 1" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Database not found");
}

#[tokio::test]
async fn test_bad_method() {
    let req = Request::delete("/-/write").body(Body::empty()).unwrap();
    let res = app().await.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
}
