//! Transport Adapter: a uniform interface over {stdio, sse, memory} for
//! sending, receiving, and closing a channel of opaque JSON-RPC frames.

pub mod memory;
pub mod sse;
pub mod stdio;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Notify, broadcast};

use crate::error::BridgeResult;

/// One opaque JSON-RPC 2.0 object. The bridge never parses into a typed
/// request/response/notification — it routes verbatim.
pub type Frame = Value;

/// Called with every inbound frame.
pub type FrameHandler = Arc<dyn Fn(Frame) + Send + Sync>;
/// Called once when the adapter hits an unrecoverable I/O error.
pub type ErrorHandler = Arc<dyn Fn(String) + Send + Sync>;
/// Called exactly once when the adapter finishes closing.
pub type CloseHandler = Arc<dyn Fn() + Send + Sync>;

/// Uniform capability set over the three transport variants.
///
/// Implementations must make `start()` idempotent, and must call the
/// close handler exactly once over the adapter's lifetime, even when
/// closing is triggered by an I/O error rather than an explicit
/// `close()` call.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Establish the underlying channel. Idempotent once started.
    async fn start(&self) -> BridgeResult<()>;

    /// Deliver one frame to the far side.
    async fn send(&self, frame: Frame) -> BridgeResult<()>;

    /// Release resources and signal `onClose` exactly once.
    async fn close(&self) -> BridgeResult<()>;

    /// Install the frame upcall. May be called before or after `start`;
    /// any frame received before a handler is installed must still be
    /// delivered once one is set (implementations buffer internally).
    fn set_frame_handler(&self, handler: FrameHandler);

    /// Install the error upcall.
    fn set_error_handler(&self, handler: ErrorHandler);

    /// Install the close upcall.
    fn set_close_handler(&self, handler: CloseHandler);

    /// Human-readable transport name, for logging and error messages.
    fn kind(&self) -> &'static str;
}

/// A boxed, shared handle to any adapter variant.
pub type DynAdapter = Arc<dyn Adapter>;

/// Shared upcall bookkeeping every adapter variant delegates to.
///
/// Buffers frames that arrive before a frame handler is installed so
/// the "late handler still sees early frames" guarantee in §4.2 holds
/// regardless of which adapter backs it. The close handler fires at
/// most once, even if `fire_close` is called multiple times (process
/// exit racing an explicit `close()`, for instance).
pub(crate) struct Upcalls {
    frame: std::sync::Mutex<Option<FrameHandler>>,
    pending: std::sync::Mutex<Vec<Frame>>,
    error: std::sync::Mutex<Option<ErrorHandler>>,
    close: std::sync::Mutex<Option<CloseHandler>>,
    closed: std::sync::atomic::AtomicBool,
}

impl Default for Upcalls {
    fn default() -> Self {
        Self {
            frame: std::sync::Mutex::new(None),
            pending: std::sync::Mutex::new(Vec::new()),
            error: std::sync::Mutex::new(None),
            close: std::sync::Mutex::new(None),
            closed: std::sync::atomic::AtomicBool::new(false),
        }
    }
}

impl Upcalls {
    pub(crate) fn set_frame_handler(&self, handler: FrameHandler) {
        let backlog = {
            let mut slot = self.frame.lock().unwrap_or_else(|e| e.into_inner());
            let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(handler.clone());
            std::mem::take(&mut *pending)
        };
        for frame in backlog {
            handler(frame);
        }
    }

    pub(crate) fn set_error_handler(&self, handler: ErrorHandler) {
        *self.error.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    pub(crate) fn set_close_handler(&self, handler: CloseHandler) {
        *self.close.lock().unwrap_or_else(|e| e.into_inner()) = Some(handler);
    }

    pub(crate) fn deliver_frame(&self, frame: Frame) {
        let handler = self.frame.lock().unwrap_or_else(|e| e.into_inner()).clone();
        match handler {
            Some(handler) => handler(frame),
            None => self
                .pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(frame),
        }
    }

    pub(crate) fn fire_error(&self, message: impl Into<String>) {
        if let Some(handler) = self.error.lock().unwrap_or_else(|e| e.into_inner()).clone() {
            handler(message.into());
        }
    }

    /// Fires the close handler exactly once over this adapter's lifetime.
    pub(crate) fn fire_close(&self) {
        if self
            .closed
            .compare_exchange(
                false,
                true,
                std::sync::atomic::Ordering::SeqCst,
                std::sync::atomic::Ordering::SeqCst,
            )
            .is_ok()
            && let Some(handler) = self.close.lock().unwrap_or_else(|e| e.into_inner()).clone()
        {
            handler();
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(std::sync::atomic::Ordering::SeqCst)
    }
}

/// The closed set of two-sided transport pairings the Handler supports.
/// Same-transport-on-both-sides is rejected — the bridge has nothing to
/// do in that case.
#[must_use]
pub fn is_supported_pairing(
    client: crate::config::TransportKind,
    server: crate::config::TransportKind,
) -> bool {
    use crate::config::TransportKind::{Memory, Sse, Stdio};
    matches!(
        (client, server),
        (Stdio, Sse) | (Sse, Stdio) | (Memory, Memory)
    )
}

/// Same check as [`is_supported_pairing`], as a `Result` for call sites
/// that want to fail fast with the domain error.
pub fn validate_pairing(
    client: crate::config::TransportKind,
    server: crate::config::TransportKind,
) -> BridgeResult<()> {
    if is_supported_pairing(client, server) {
        Ok(())
    } else {
        Err(crate::error::BridgeError::UnsupportedTransport(format!(
            "client={client} server={server}"
        )))
    }
}

/// Fans a single backend adapter out to any number of connection-scoped
/// subscribers, so one stdio child process or one outbound sse
/// connection can back several concurrent bridge connections — one
/// backend event pushed out to many open streams, generalized to every
/// transport variant instead of just sse.
///
/// The bridge forwards verbatim and does not multiplex sessions itself;
/// this only determines which local connections see which frames, not
/// how a shared backend disambiguates callers.
pub struct Fanout {
    inner: DynAdapter,
    frames: broadcast::Sender<Frame>,
    closed: Arc<Notify>,
    is_closed: Arc<AtomicBool>,
}

impl Fanout {
    /// Wrap an already-started backend adapter.
    #[must_use]
    pub fn wrap(inner: DynAdapter) -> Arc<Self> {
        let (frames, _rx) = broadcast::channel(1024);
        let closed = Arc::new(Notify::new());
        let is_closed = Arc::new(AtomicBool::new(false));

        let frames_tx = frames.clone();
        inner.set_frame_handler(Arc::new(move |frame| {
            let _ = frames_tx.send(frame);
        }));

        let closed_flag = Arc::clone(&is_closed);
        let notify = Arc::clone(&closed);
        inner.set_close_handler(Arc::new(move || {
            closed_flag.store(true, Ordering::SeqCst);
            notify.notify_waiters();
        }));

        Arc::new(Self { inner, frames, closed, is_closed })
    }

    /// Close the shared backend adapter itself. Only the Supervisor
    /// should call this — it tears down the connection every
    /// subscriber depends on.
    pub async fn close_backend(&self) -> BridgeResult<()> {
        self.inner.close().await
    }

    /// A connection-scoped view onto the shared backend. Implements
    /// `Adapter` itself; `close()` detaches the subscriber without
    /// touching the shared backend.
    #[must_use]
    pub fn subscriber(self: &Arc<Self>) -> DynAdapter {
        let subscriber = Arc::new(FanoutSubscriber {
            fanout: Arc::clone(self),
            upcalls: Arc::new(Upcalls::default()),
        });
        subscriber.spawn_pump();
        subscriber
    }
}

struct FanoutSubscriber {
    fanout: Arc<Fanout>,
    upcalls: Arc<Upcalls>,
}

impl FanoutSubscriber {
    fn spawn_pump(self: &Arc<Self>) {
        if self.fanout.is_closed.load(Ordering::SeqCst) {
            self.upcalls.fire_close();
            return;
        }
        let mut rx = self.fanout.frames.subscribe();
        let notify = Arc::clone(&self.fanout.closed);
        let upcalls = Arc::clone(&self.upcalls);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = rx.recv() => match frame {
                        Ok(frame) => upcalls.deliver_frame(frame),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    () = notify.notified() => break,
                }
            }
            upcalls.fire_close();
        });
    }
}

#[async_trait]
impl Adapter for FanoutSubscriber {
    async fn start(&self) -> BridgeResult<()> {
        Ok(())
    }

    async fn send(&self, frame: Frame) -> BridgeResult<()> {
        self.fanout.inner.send(frame).await
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
        self.fanout.inner.kind()
    }
}
