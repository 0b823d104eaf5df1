//! HTTP server for on-demand conversion.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/convert`    | Upload a 3dVolreg matrix, get ITK    |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;

use super::logs::{log_error, log_info, log_success, LOG_BROADCASTER};
use super::types::{convert_upload, error_response, ConvertResponse};
use crate::config::ConverterConfig;
use crate::error::{PipelineError, ServerError};

/// Build the application router.
///
/// Handlers see the config through [`State`].
pub fn router(config: &ConverterConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/convert", post(upload_matrix))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(cors)
        .with_state(Arc::new(config.clone()))
}

/// Start the HTTP server
pub async fn start_server(config: ConverterConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 volreg2itk server running on http://localhost:{}", config.port);
    println!("   POST /api/convert - Upload 3dVolreg matrix");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "volreg2itk",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: multipart form with a `file` field
async fn upload_matrix(
    State(config): State<Arc<ConverterConfig>>,
    mut multipart: Multipart,
) -> Result<Json<ConvertResponse>, (StatusCode, Json<Value>)> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        reject(ServerError::BadRequest(format!("Multipart error: {}", e)))
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| reject(ServerError::BadRequest(format!("Read error: {}", e))))?
                    .to_vec(),
            );
        }
    }

    let bytes = file_data
        .ok_or_else(|| reject(ServerError::BadRequest("No file provided".to_string())))?;

    log_info(format!(
        "📄 Upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let response = convert_upload(&bytes, file_name, &config.suffix).map_err(reject)?;
    log_success(format!("{} transforms converted", response.transform_count));

    Ok(Json(response))
}

/// Map a server error onto a status code and JSON body.
fn reject(err: ServerError) -> (StatusCode, Json<Value>) {
    let status = status_for(&err);
    log_error(err.to_string());
    (status, Json(error_response(&err.to_string())))
}

fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(PipelineError::Conversion(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServerError::Pipeline(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
