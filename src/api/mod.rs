//! HTTP surface for an external controller
//!
//! The controller sets the node up, polls its status, collects outgoing
//! payloads and delivers payloads from other nodes:
//!
//! - `POST /api/setup` assigns id, role, the list of nodes and optionally
//!   the coordinator's id
//! - `GET /api/status` reports progress and whether data is waiting
//! - `GET /api/data` pops the next outgoing payload (204 when there is none)
//! - `POST /api/data` delivers a payload from another node

use crate::protocol::NodeIdentity;
use crate::round::{Phase, StatusHandle};
use crate::transport::controller::{ControllerTransport, SetupRequest};
use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

/// Header naming the node an outgoing payload is meant for
pub const DESTINATION_HEADER: &str = "x-destination";

/// Serves the controller API for one node
pub struct ApiServer {
    transport: ControllerTransport,
    status: StatusHandle,
    port: u16,
}

impl ApiServer {
    pub fn new(transport: ControllerTransport, status: StatusHandle, port: u16) -> Self {
        Self {
            transport,
            status,
            port,
        }
    }

    /// Bind and serve until the process stops
    pub async fn start(self) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting controller API on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router(self.transport, self.status)).await?;
        Ok(())
    }
}

#[derive(Clone)]
struct ApiState {
    transport: ControllerTransport,
    status: StatusHandle,
}

pub fn router(transport: ControllerTransport, status: StatusHandle) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/setup", post(setup))
        .route("/api/status", get(get_status))
        .route("/api/data", get(pop_data).post(push_data))
        .layer(CorsLayer::permissive())
        .with_state(ApiState { transport, status })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Outgoing data is waiting to be collected
    pub available: bool,
    /// The round ended and everything outgoing was collected
    pub finished: bool,
    pub message: String,
    pub phase: Phase,
    /// Target of the next outgoing payload; `None` means broadcast, or for a
    /// participant set up without a coordinator id, "the coordinator"
    pub destination: Option<String>,
    pub failed: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn setup(
    State(state): State<ApiState>,
    Json(request): Json<SetupRequest>,
) -> Result<Json<NodeIdentity>, (StatusCode, Json<ErrorBody>)> {
    state.transport.setup(request).await.map(Json).map_err(|e| {
        warn!("Rejected setup: {}", e);
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: e.to_string(),
            }),
        )
    })
}

async fn get_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let status = state.status.snapshot();
    let next = state.transport.peek_outgoing().await;
    Json(StatusResponse {
        available: next.is_some(),
        finished: status.finished && next.is_none(),
        message: status.message,
        phase: status.phase,
        destination: next.flatten(),
        failed: status.failed,
    })
}

async fn pop_data(State(state): State<ApiState>) -> Response {
    match state.transport.pop_outgoing().await {
        Some(outgoing) => {
            let mut headers = HeaderMap::new();
            if let Some(destination) = outgoing
                .destination
                .as_deref()
                .and_then(|d| HeaderValue::from_str(d).ok())
            {
                headers.insert(DESTINATION_HEADER, destination);
            }
            (StatusCode::OK, headers, outgoing.payload).into_response()
        }
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn push_data(State(state): State<ApiState>, body: Bytes) -> StatusCode {
    state.transport.push_incoming(body.to_vec()).await;
    StatusCode::OK
}
