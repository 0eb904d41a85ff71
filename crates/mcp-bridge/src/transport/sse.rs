//! SSE transport adapters.
//!
//! `SseClientAdapter` is used when the *bridge* plays client against a
//! remote MCP server: it opens a GET `text/event-stream` connection for
//! inbound frames and issues a companion POST per outbound frame.
//! `SseServerAdapter` is the inverse — used when a downstream client
//! plays client against *us*: it holds a broadcast sender that the
//! admin HTTP layer subscribes to for the GET stream and feeds from
//! the companion POST.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client as HttpClient;
use reqwest::header;
use tokio::sync::{Mutex as TokioMutex, broadcast};
use tracing::{debug, warn};

use super::{Adapter, CloseHandler, ErrorHandler, Frame, FrameHandler, Upcalls};
use crate::error::{BridgeError, BridgeResult};
use crate::ids::ConnectionId;

/// Where to reach a remote sse server.
#[derive(Debug, Clone)]
pub struct SseClientEndpoint {
    /// GET endpoint that serves the `text/event-stream`.
    pub stream_url: String,
    /// POST endpoint outbound frames are sent to.
    pub post_url: String,
    /// Extra headers applied to every request (auth, session correlation).
    pub headers: HashMap<String, String>,
}

/// Client-side sse adapter: the bridge connects outward to a remote server.
pub struct SseClientAdapter {
    endpoint: SseClientEndpoint,
    http: HttpClient,
    upcalls: Arc<Upcalls>,
    started: AtomicBool,
    stream_task: TokioMutex<Option<tokio::task::JoinHandle<()>>>,
}

impl SseClientAdapter {
    #[must_use]
    pub fn new(endpoint: SseClientEndpoint) -> Arc<Self> {
        Arc::new(Self {
            endpoint,
            http: HttpClient::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            upcalls: Arc::new(Upcalls::default()),
            started: AtomicBool::new(false),
            stream_task: TokioMutex::new(None),
        })
    }

    async fn run_stream(
        stream_url: String,
        headers: HashMap<String, String>,
        http: HttpClient,
        upcalls: Arc<Upcalls>,
    ) {
        let mut request = http
            .get(&stream_url)
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache");
        for (key, value) in &headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = match request.send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                upcalls.fire_error(format!("sse stream returned status {}", resp.status()));
                upcalls.fire_close();
                return;
            }
            Err(e) => {
                upcalls.fire_error(format!("sse stream connection failed: {e}"));
                upcalls.fire_close();
                return;
            }
        };

        debug!(url = %stream_url, "sse client stream established");
        let mut body = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    upcalls.fire_error(format!("sse stream read failed: {e}"));
                    break;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(pos) = buffer.find("\n\n") {
                let event = buffer[..pos].to_string();
                buffer = buffer[pos + 2..].to_string();
                Self::dispatch_event(&event, &upcalls);
            }
        }

        upcalls.fire_close();
    }

    fn dispatch_event(event: &str, upcalls: &Upcalls) {
        let mut data_lines = Vec::new();
        for line in event.lines() {
            if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.trim_start().to_string());
            }
        }
        if data_lines.is_empty() {
            return;
        }
        let joined = data_lines.join("\n");
        match serde_json::from_str::<Frame>(&joined) {
            Ok(frame) => upcalls.deliver_frame(frame),
            Err(e) => warn!("failed to parse sse event payload: {e}"),
        }
    }
}

#[async_trait]
impl Adapter for SseClientAdapter {
    async fn start(&self) -> BridgeResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let stream_url = self.endpoint.stream_url.clone();
        let headers = self.endpoint.headers.clone();
        let http = self.http.clone();
        let upcalls = Arc::clone(&self.upcalls);
        let handle = tokio::spawn(Self::run_stream(stream_url, headers, http, upcalls));
        *self.stream_task.lock().await = Some(handle);
        Ok(())
    }

    async fn send(&self, frame: Frame) -> BridgeResult<()> {
        let mut request = self
            .http
            .post(&self.endpoint.post_url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&frame);
        for (key, value) in &self.endpoint.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        let response = request
            .send()
            .await
            .map_err(|e| BridgeError::Transport(format!("sse post failed: {e}")))?;
        if !response.status().is_success() {
            return Err(BridgeError::Transport(format!(
                "sse post rejected with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn close(&self) -> BridgeResult<()> {
        if let Some(handle) = self.stream_task.lock().await.take() {
            handle.abort();
        }
        self.upcalls.fire_close();
        Ok(())
    }

    fn set_frame_handler(&self, handler: FrameHandler) {
        self.upcalls.set_frame_handler(handler);
    }

    fn set_error_handler(&self, handler: ErrorHandler) {
        self.upcalls.set_error_handler(handler);
    }

    fn set_close_handler(&self, handler: CloseHandler) {
        self.upcalls.set_close_handler(handler);
    }

    fn kind(&self) -> &'static str {
        "sse-client"
    }
}

/// Server-side sse adapter: a downstream client connects to us. The
/// admin HTTP layer owns the actual GET/POST routes; this adapter owns
/// the broadcast channel and upcall wiring a route handler plugs into.
/// Carries the connection id as its session identifier, since that's
/// the handle the admin surface already routes POST bodies by.
pub struct SseServerAdapter {
    session_id: ConnectionId,
    outbound: broadcast::Sender<Frame>,
    upcalls: Arc<Upcalls>,
    started: AtomicBool,
}

impl SseServerAdapter {
    #[must_use]
    pub fn new(session_id: ConnectionId) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(256);
        Arc::new(Self {
            session_id,
            outbound: tx,
            upcalls: Arc::new(Upcalls::default()),
            started: AtomicBool::new(false),
        })
    }

    /// The connection id this session is bound to — what the admin
    /// surface's GET/POST `/events` routes look it up by.
    #[must_use]
    pub fn session_id(&self) -> &ConnectionId {
        &self.session_id
    }

    /// Subscribe to the outbound broadcast stream. Called by the admin
    /// HTTP layer's GET handler for each new SSE connection.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.outbound.subscribe()
    }

    /// Deliver a frame received on the companion POST endpoint.
    pub fn deliver_post(&self, frame: Frame) {
        self.upcalls.deliver_frame(frame);
    }
}

#[async_trait]
impl Adapter for SseServerAdapter {
    async fn start(&self) -> BridgeResult<()> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, frame: Frame) -> BridgeResult<()> {
        // No subscribers yet (client hasn't opened the GET stream) is not
        // an error: the frame is simply not delivered to anyone.
        let _ = self.outbound.send(frame);
        Ok(())
    }

    async fn close(&self) -> BridgeResult<()> {
        self.upcalls.fire_close();
        Ok(())
    }

    fn set_frame_handler(&self, handler: FrameHandler) {
        self.upcalls.set_frame_handler(handler);
    }

    fn set_error_handler(&self, handler: ErrorHandler) {
        self.upcalls.set_error_handler(handler);
    }

    fn set_close_handler(&self, handler: CloseHandler) {
        self.upcalls.set_close_handler(handler);
    }

    fn kind(&self) -> &'static str {
        "sse-server"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn server_adapter_delivers_posted_frames() {
        let adapter = SseServerAdapter::new(ConnectionId::from("c1"));
        adapter.start().await.unwrap();

        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        adapter.set_frame_handler(Arc::new(move |frame| {
            received_clone.lock().unwrap().push(frame);
        }));

        adapter.deliver_post(serde_json::json!({"id": 1}));
        assert_eq!(received.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn server_adapter_broadcasts_to_subscribers() {
        let adapter = SseServerAdapter::new(ConnectionId::from("c1"));
        adapter.start().await.unwrap();

        let mut rx = adapter.subscribe();
        adapter.send(serde_json::json!({"hello": "there"})).await.unwrap();

        let frame = rx.recv().await.unwrap();
        assert_eq!(frame["hello"], "there");
    }

    #[tokio::test]
    async fn server_adapter_send_without_subscriber_is_not_an_error() {
        let adapter = SseServerAdapter::new(ConnectionId::from("c1"));
        adapter.start().await.unwrap();
        assert!(adapter.send(serde_json::json!({"x": 1})).await.is_ok());
    }

    #[test]
    fn server_adapter_exposes_its_session_id() {
        let adapter = SseServerAdapter::new(ConnectionId::from("c1"));
        assert_eq!(adapter.session_id(), &ConnectionId::from("c1"));
    }
}
