//! Admin Surface: a thin `axum` JSON/HTTP veneer over Bridge Manager
//! operations. Handlers deserialize the request, call exactly one
//! manager/registry operation, and serialize the result — no business
//! logic lives here.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use futures::stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::admin::dto::{
    ConnectionView, CreateConnectionRequest, CreateConnectionResponse, CreateServerRequest,
    CreateServerResponse, EnvironmentRequest, ErrorBody, ServerView, UpdateServerRequest,
};
use crate::config::ConnectHints;
use crate::error::BridgeError;
use crate::ids::{ConnectionId, ServerId};
use crate::manager::BridgeManager;

/// Wraps a [`BridgeError`] so it can be returned directly from a
/// handler; converts to the `{error:{code, message}}` envelope at the
/// HTTP status implied by `BridgeError::http_status`.
pub struct ApiError(BridgeError);

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody::from(&self.0);
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Build the admin router over a shared [`BridgeManager`]. `tower-http`
/// tracing and timeout middleware wrap every route.
#[must_use]
pub fn router(manager: Arc<BridgeManager>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/servers", get(list_servers).post(create_server))
        .route(
            "/api/servers/{id}",
            get(get_server).put(update_server).delete(delete_server),
        )
        .route("/api/servers/{id}/start", post(start_server))
        .route("/api/servers/{id}/stop", post(stop_server))
        .route("/api/servers/{id}/environment", post(update_environment))
        .route("/api/servers/{id}/connections", get(connections_for_server))
        .route("/api/connections", get(list_connections).post(create_connection))
        .route("/api/connections/{id}", get(get_connection).delete(delete_connection))
        .route("/api/connections/{id}/disconnect", post(disconnect_connection))
        .route("/api/connections/{id}/reconnect", post(reconnect_connection))
        .route(
            "/api/connections/{id}/events",
            get(sse_stream).post(sse_inbound_post),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(manager)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_servers(State(manager): State<Arc<BridgeManager>>) -> Json<Vec<ServerView>> {
    Json(manager.servers().list().into_iter().map(ServerView::from).collect())
}

async fn get_server(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<Json<ServerView>> {
    let id = ServerId::from(id);
    Ok(Json(manager.servers().get(&id)?.into()))
}

async fn create_server(
    State(manager): State<Arc<BridgeManager>>,
    Json(body): Json<CreateServerRequest>,
) -> ApiResult<(StatusCode, Json<CreateServerResponse>)> {
    let id = ServerId::generate();
    let config = body.into_config(id.clone());
    manager.register_server(config)?;
    Ok((StatusCode::CREATED, Json(CreateServerResponse { id })))
}

async fn update_server(
    State(manager): State<Arc<BridgeManager>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateServerRequest>,
) -> ApiResult<Json<ServerView>> {
    let id = ServerId::from(id);
    let snapshot = manager.servers().update_config(&id, |config| {
        if let Some(name) = body.name {
            config.name = name;
        }
        if let Some(version) = body.version {
            config.version = version;
        }
        if let Some(command) = body.command {
            config.command = command;
        }
        if let Some(args) = body.args {
            config.args = args;
        }
        if body.working_dir.is_some() {
            config.working_dir = body.working_dir;
        }
        if let Some(env) = body.env {
            config.env = env;
        }
        if body.sse_options.is_some() {
            config.sse_options = body.sse_options;
        }
        if let Some(lifecycle) = body.lifecycle {
            config.lifecycle = lifecycle;
        }
    })?;
    Ok(Json(snapshot.into()))
}

async fn delete_server(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = ServerId::from(id);
    manager.stop_server(&id).await?;
    manager.unregister_server(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn start_server(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<Json<ServerView>> {
    let id = ServerId::from(id);
    Ok(Json(manager.start_server(&id).await?.into()))
}

async fn stop_server(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<Json<ServerView>> {
    let id = ServerId::from(id);
    Ok(Json(manager.stop_server(&id).await?.into()))
}

async fn update_environment(
    State(manager): State<Arc<BridgeManager>>,
    Path(id): Path<String>,
    Json(delta): Json<EnvironmentRequest>,
) -> ApiResult<Json<ServerView>> {
    let id = ServerId::from(id);
    manager.update_environment(&id, delta).await?;
    Ok(Json(manager.servers().get(&id)?.into()))
}

async fn connections_for_server(
    State(manager): State<Arc<BridgeManager>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ConnectionView>>> {
    let id = ServerId::from(id);
    manager.servers().get(&id)?; // 404 if the server itself doesn't exist
    Ok(Json(manager.connections_for_server(&id).into_iter().map(ConnectionView::from).collect()))
}

async fn list_connections(State(manager): State<Arc<BridgeManager>>) -> Json<Vec<ConnectionView>> {
    Json(manager.connections().list().into_iter().map(ConnectionView::from).collect())
}

async fn get_connection(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<Json<ConnectionView>> {
    let id = ConnectionId::from(id);
    Ok(Json(manager.connections().get(&id)?.into()))
}

async fn create_connection(
    State(manager): State<Arc<BridgeManager>>,
    Json(body): Json<CreateConnectionRequest>,
) -> ApiResult<(StatusCode, Json<CreateConnectionResponse>)> {
    let env_delta = body.env_delta.clone();
    let config = body.into_config();
    let hints = ConnectHints { env_delta };
    let id = manager.connect(config, hints).await?;
    Ok((StatusCode::CREATED, Json(CreateConnectionResponse { id })))
}

async fn delete_connection(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = ConnectionId::from(id);
    manager.disconnect(&id).await?;
    manager.connections().remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn disconnect_connection(State(manager): State<Arc<BridgeManager>>, Path(id): Path<String>) -> ApiResult<Json<ConnectionView>> {
    let id = ConnectionId::from(id);
    manager.disconnect(&id).await?;
    Ok(Json(manager.connections().get(&id)?.into()))
}

async fn reconnect_connection(
    State(manager): State<Arc<BridgeManager>>,
    Path(id): Path<String>,
) -> ApiResult<Json<CreateConnectionResponse>> {
    let id = ConnectionId::from(id);
    let new_id = manager.reconnect(&id).await?;
    Ok(Json(CreateConnectionResponse { id: new_id }))
}

/// `GET /api/connections/{id}/events`: the `text/event-stream` half of
/// an sse-transport connection's companion endpoint pair. Only
/// meaningful for connections whose `client_transport = sse`.
async fn sse_stream(
    State(manager): State<Arc<BridgeManager>>,
    Path(id): Path<String>,
) -> ApiResult<Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>>> {
    let id = ConnectionId::from(id);
    let rx = manager
        .sse_subscribe(&id)
        .ok_or_else(|| BridgeError::connection_not_found(&id))?;
    let stream = BroadcastStream::new(rx).filter_map(|frame| async move {
        match frame {
            Ok(frame) => serde_json::to_string(&frame).ok().map(|data| Ok(Event::default().data(data))),
            Err(_) => None,
        }
    });
    Ok(Sse::new(stream))
}

/// `POST /api/connections/{id}/events`: the companion POST half — feeds
/// a parsed body into the handler's client-side frame handler.
async fn sse_inbound_post(
    State(manager): State<Arc<BridgeManager>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<StatusCode> {
    let id = ConnectionId::from(id);
    manager.handle_inbound_sse_post(&id, body)?;
    Ok(StatusCode::ACCEPTED)
}
