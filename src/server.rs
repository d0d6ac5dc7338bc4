use crate::graphql::{create_schema, GraphQLSchema};
use crate::observability::metrics;
use crate::storage::Storage;
use axum::{
    http::Method,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "quiz-books-graphql",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GraphQL handler (supports GET and POST)
async fn graphql_handler(
    Extension(schema): Extension<GraphQLSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let started = Instant::now();
    let response = schema.execute(req.into_inner()).await;
    metrics::graphql::request_completed(started.elapsed(), response.is_err());
    response.into()
}

/// GraphiQL UI
async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

/// Build the router around an already constructed schema
pub fn create_router(schema: GraphQLSchema) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/graphql", post(graphql_handler).get(graphql_handler))
        .route("/graphiql", get(graphiql))
        .layer(Extension(schema))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Create the HTTP server with all routes, including GraphQL
pub fn create_server(storage: Arc<dyn Storage>) -> Router {
    create_router(create_schema(storage))
}

/// Start the HTTP server on the given address
pub async fn start_server(storage: Arc<dyn Storage>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_server(storage);

    info!("HTTP server running on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    info!("GraphQL:      http://{}/graphql", addr);
    info!("GraphiQL UI:  http://{}/graphiql", addr);

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
