// http server mode - a json api for running writes

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::{Level, Message, ParameterDescriptor, derive_parameters_or_empty};
use crate::{Databases, Error};

struct AppState {
    databases: Databases,
}

#[derive(Deserialize)]
struct FormQuery {
    database: Option<String>,
    #[serde(default)]
    sql: String,
}

#[derive(Serialize)]
struct FormResponse {
    databases: Vec<String>,
    database: String,
    tables: Vec<String>,
    sql: String,
    parameters: Vec<ParameterDescriptor>,
}

#[derive(Serialize)]
struct ParametersResponse {
    parameters: Vec<ParameterDescriptor>,
}

#[derive(Deserialize)]
struct WriteRequest {
    database: String,
    sql: String,
    #[serde(default)]
    params: HashMap<String, String>,
}

#[derive(Serialize)]
struct WriteResponse {
    database: String,
    level: Level,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: Error) -> ApiError {
    let status = match e {
        Error::DatabaseNotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidStatement(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let error = match e {
        Error::DatabaseNotFound(_) => "Database not found".to_string(),
        other => other.to_string(),
    };
    (status, Json(ErrorResponse { error }))
}

pub struct Server;

impl Server {
    /// Routes without a listener, handy for driving from tests.
    pub fn router(databases: Databases) -> Router {
        let state = Arc::new(AppState { databases });

        Router::new()
            .route("/health", get(health))
            .route("/-/write", get(form).post(write))
            .route("/-/write/derive-parameters", get(parameters))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(databases: Databases, host: &str, port: u16) -> Result<(), Error> {
        let app = Self::router(databases);

        let addr = format!("{host}:{port}");
        tracing::info!("server running at http://{addr}");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn form(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FormQuery>,
) -> Result<Json<FormResponse>, ApiError> {
    let db = state
        .databases
        .get_or_first(q.database.as_deref())
        .map_err(api_error)?;

    let tables = db.tables().await.map_err(api_error)?;
    let parameters = derive_parameters_or_empty(db, &q.sql)
        .await
        .map_err(api_error)?;

    Ok(Json(FormResponse {
        databases: state.databases.names().into_iter().map(String::from).collect(),
        database: db.name().to_string(),
        tables,
        sql: q.sql,
        parameters,
    }))
}

async fn parameters(
    State(state): State<Arc<AppState>>,
    Query(q): Query<FormQuery>,
) -> Result<Json<ParametersResponse>, ApiError> {
    let db = state
        .databases
        .get_or_first(q.database.as_deref())
        .map_err(api_error)?;

    let parameters = derive_parameters_or_empty(db, &q.sql)
        .await
        .map_err(api_error)?;

    Ok(Json(ParametersResponse { parameters }))
}

async fn write(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WriteRequest>,
) -> Result<Json<WriteResponse>, ApiError> {
    let db = state.databases.get(&req.database).map_err(api_error)?;

    let result = db.execute_write(&req.sql, &req.params).await;
    if let Err(e) = &result {
        tracing::warn!(database = %req.database, "write failed: {e}");
    }
    let message = Message::from_result(&result);

    Ok(Json(WriteResponse {
        database: req.database,
        level: message.level,
        message: message.text,
    }))
}
