//! Handler: pairs one client-side adapter and one server-side adapter
//! and forwards frames between them for the lifetime of a connection.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::BridgeResult;
use crate::transport::{DynAdapter, Frame};

/// Which side triggered the handler's shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedBy {
    /// The server adapter closed or errored — the whole connection dies.
    Server,
    /// The client adapter closed — the handler stops, the server lives on.
    Client,
}

/// Pairs a client adapter and a server adapter and routes frames in
/// both directions for as long as the connection is alive. Frame
/// delivery is decoupled from the synchronous upcall that fires it: a
/// dedicated forwarding task per direction drains an unbounded channel
/// and awaits the destination's `send`, which both keeps per-direction
/// ordering and keeps the two directions from blocking each other.
pub struct Handler {
    client: DynAdapter,
    server: DynAdapter,
    stopped: AtomicBool,
    closed_once: AtomicBool,
}

impl Handler {
    #[must_use]
    pub fn new(client: DynAdapter, server: DynAdapter) -> Arc<Self> {
        Arc::new(Self {
            client,
            server,
            stopped: AtomicBool::new(false),
            closed_once: AtomicBool::new(false),
        })
    }

    /// Wires upcalls on both adapters, then starts the server before
    /// the client — this lets an sse-client adapter that opens a socket
    /// on `start()` find the backend already live. `on_closed` fires
    /// exactly once, whichever side closes first.
    pub async fn start(self: &Arc<Self>, on_closed: Arc<dyn Fn(ClosedBy) + Send + Sync>) -> BridgeResult<()> {
        let (c2s_tx, c2s_rx) = mpsc::unbounded_channel::<Frame>();
        let (s2c_tx, s2c_rx) = mpsc::unbounded_channel::<Frame>();

        self.client.set_frame_handler(Arc::new(move |frame| {
            let _ = c2s_tx.send(frame);
        }));
        self.server.set_frame_handler(Arc::new(move |frame| {
            let _ = s2c_tx.send(frame);
        }));

        spawn_forwarder(c2s_rx, Arc::clone(&self.server));
        spawn_forwarder(s2c_rx, Arc::clone(&self.client));

        let this = Arc::clone(self);
        let on_closed_for_server = Arc::clone(&on_closed);
        self.server.set_close_handler(Arc::new(move || {
            this.fire_closed(ClosedBy::Server, &on_closed_for_server);
        }));
        self.server
            .set_error_handler(Arc::new(|message| warn!("server adapter error: {message}")));

        let this = Arc::clone(self);
        self.client.set_close_handler(Arc::new(move || {
            this.fire_closed(ClosedBy::Client, &on_closed);
        }));
        self.client
            .set_error_handler(Arc::new(|message| warn!("client adapter error: {message}")));

        self.server.start().await?;
        self.client.start().await?;
        Ok(())
    }

    fn fire_closed(&self, by: ClosedBy, on_closed: &Arc<dyn Fn(ClosedBy) + Send + Sync>) {
        if self
            .closed_once
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            on_closed(by);
        }
    }

    /// Detach upcalls from both adapters and close the client adapter.
    /// Never closes the server adapter — that belongs to the
    /// Supervisor, which may still be serving other connections.
    pub async fn stop(&self) -> BridgeResult<()> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.client.set_frame_handler(Arc::new(|_| {}));
        self.client.set_error_handler(Arc::new(|_| {}));
        self.client.set_close_handler(Arc::new(|| {}));
        self.server.set_frame_handler(Arc::new(|_| {}));
        self.server.set_error_handler(Arc::new(|_| {}));
        self.server.set_close_handler(Arc::new(|| {}));
        self.client.close().await
    }
}

fn spawn_forwarder(mut rx: mpsc::UnboundedReceiver<Frame>, dest: DynAdapter) {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = dest.send(frame).await {
                warn!("frame forwarding to {} failed: {e}", dest.kind());
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::memory::MemoryAdapter;
    use std::sync::Mutex;

    #[tokio::test]
    async fn forwards_frames_both_directions_in_order() {
        let (client, client_peer) = MemoryAdapter::pair();
        let (server, server_peer) = MemoryAdapter::pair();
        client_peer.start().await.unwrap();
        server_peer.start().await.unwrap();

        let handler = Handler::new(client, server);
        handler.start(Arc::new(|_| {})).await.unwrap();

        let to_server = Arc::new(Mutex::new(Vec::new()));
        let to_server_clone = Arc::clone(&to_server);
        server_peer.set_frame_handler(Arc::new(move |frame| to_server_clone.lock().unwrap().push(frame)));

        let to_client = Arc::new(Mutex::new(Vec::new()));
        let to_client_clone = Arc::clone(&to_client);
        client_peer.set_frame_handler(Arc::new(move |frame| to_client_clone.lock().unwrap().push(frame)));

        client_peer.send(serde_json::json!({"n": 1})).await.unwrap();
        client_peer.send(serde_json::json!({"n": 2})).await.unwrap();
        server_peer.send(serde_json::json!({"reply": true})).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        let forwarded_to_server = to_server.lock().unwrap();
        assert_eq!(forwarded_to_server.len(), 2);
        assert_eq!(forwarded_to_server[0]["n"], 1);
        assert_eq!(forwarded_to_server[1]["n"], 2);
        assert_eq!(to_client.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn server_close_escalates_and_client_close_does_not() {
        let (client, client_peer) = MemoryAdapter::pair();
        let (server, server_peer) = MemoryAdapter::pair();
        client_peer.start().await.unwrap();
        server_peer.start().await.unwrap();

        let closed_by = Arc::new(Mutex::new(None));
        let closed_by_clone = Arc::clone(&closed_by);
        let handler = Handler::new(client, server);
        handler
            .start(Arc::new(move |by| *closed_by_clone.lock().unwrap() = Some(by)))
            .await
            .unwrap();

        server_peer.close().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(*closed_by.lock().unwrap(), Some(ClosedBy::Server));
    }
}
