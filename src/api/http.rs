use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::error::{SystemError, ValidationError, WatcherError};
use crate::logging::LogContext;
use crate::models::{Address, Transaction};
use crate::parser::Parser;

/// Client-visible failures. Rendered as plain text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid request method")]
    InvalidMethod,
    #[error("Invalid request body")]
    InvalidBody,
    #[error("Address is required")]
    MissingAddress,
    #[error("Address query parameter is required")]
    MissingAddressParam,
}

impl From<&ApiError> for StatusCode {
    fn from(error: &ApiError) -> Self {
        match error {
            ApiError::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::InvalidBody => StatusCode::BAD_REQUEST,
            ApiError::MissingAddress => StatusCode::BAD_REQUEST,
            ApiError::MissingAddressParam => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::EmptyAddress => ApiError::MissingAddress,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::from(&self), self.to_string()).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentBlockResponse {
    pub current_block: u64,
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub parser: Arc<dyn Parser>,
}

impl AppState {
    pub fn new(parser: Arc<dyn Parser>) -> Self {
        Self { parser }
    }
}

/// Route table for the public API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/current_block", get(get_current_block))
        .route("/subscribe", post(subscribe).fallback(invalid_method))
        .route("/transactions", get(get_transactions))
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// HTTP API server
pub struct ApiServer {
    parser: Arc<dyn Parser>,
    pub host: String,
    pub port: u16,
}

impl ApiServer {
    pub fn new(parser: Arc<dyn Parser>, host: &str, port: u16) -> Self {
        Self {
            parser,
            host: host.to_string(),
            port,
        }
    }

    /// Bind and serve until Ctrl-C
    pub async fn start(&self) -> Result<(), WatcherError> {
        let app = router(AppState::new(Arc::clone(&self.parser)));

        let addr = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| SystemError::Server(format!("Failed to bind to {}: {}", addr, e)))?;

        log::info!("Server is running on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| SystemError::Server(format!("Server error: {}", e)))?;

        log::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

/// GET /current_block
pub async fn get_current_block(State(state): State<AppState>) -> Json<CurrentBlockResponse> {
    let current_block = state.parser.get_current_block().await;
    Json(CurrentBlockResponse { current_block })
}

/// POST /subscribe
pub async fn subscribe(State(state): State<AppState>, body: Bytes) -> Result<Json<SubscribeResponse>, ApiError> {
    let request = parse_subscribe_body(&body).map_err(|e| {
        LogContext::new("http", "subscribe")
            .with_metadata("error", serde_json::json!(e))
            .debug("Rejected unparsable subscribe body");
        ApiError::InvalidBody
    })?;

    let address = Address::parse(request.address.as_deref().unwrap_or_default())?;
    state.parser.subscribe(address.as_str());

    Ok(Json(SubscribeResponse {
        message: "Address subscribed successfully".to_string(),
    }))
}

/// The body must be a JSON object; the struct derive alone would also take `["0x.."]`.
fn parse_subscribe_body(body: &[u8]) -> Result<SubscribeRequest, String> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err(format!("expected a JSON object, got {}", value));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// GET /transactions?address=
///
/// A repeated `address` parameter resolves to its first occurrence.
pub async fn get_transactions(
    Query(params): Query<Vec<(String, String)>>,
    State(state): State<AppState>,
) -> Result<Json<TransactionsResponse>, ApiError> {
    let address = match params.iter().find(|(key, _)| key == "address") {
        Some((_, address)) if !address.is_empty() => address.as_str(),
        _ => return Err(ApiError::MissingAddressParam),
    };

    let transactions = state.parser.get_transactions(address).await;
    Ok(Json(TransactionsResponse { transactions }))
}

async fn invalid_method() -> ApiError {
    ApiError::InvalidMethod
}
