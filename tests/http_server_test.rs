use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use quiz_books_graphql::domain::Book;
use quiz_books_graphql::server::create_server;
use quiz_books_graphql::storage::{AdminStorage, InMemoryStorage};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn graphql_post(query: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "query": query }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let app = create_server(Arc::new(InMemoryStorage::new()));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn post_graphql_executes_queries() {
    let storage = Arc::new(InMemoryStorage::new());
    let mut book = Book::new("Dune", "Frank Herbert");
    storage.create_book(&mut book).await.unwrap();
    let app = create_server(storage);

    let response = app
        .oneshot(graphql_post("{ allBooks { title author } }"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"],
        json!({ "allBooks": [{ "title": "Dune", "author": "Frank Herbert" }] })
    );
}

#[tokio::test]
async fn get_graphql_executes_query_string_requests() {
    let app = create_server(Arc::new(InMemoryStorage::new()));
    let response = app
        .oneshot(
            Request::get("/graphql?query=%7B%20allCategories%20%7B%20name%20%7D%20%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], json!({ "allCategories": [] }));
}

#[tokio::test]
async fn unknown_fields_come_back_as_graphql_errors() {
    let app = create_server(Arc::new(InMemoryStorage::new()));
    let response = app
        .oneshot(graphql_post("{ allAuthors { name } }"))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert!(body["errors"].as_array().is_some_and(|e| !e.is_empty()));
    assert!(body.get("data").map_or(true, Value::is_null));
}

#[tokio::test]
async fn graphiql_page_is_served() {
    let app = create_server(Arc::new(InMemoryStorage::new()));
    let response = app
        .oneshot(Request::get("/graphiql").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("/graphql"));
}
