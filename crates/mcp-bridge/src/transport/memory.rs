//! In-memory paired adapter: a linked `{left, right}` pair that
//! mutually deliver frames via `tokio::mpsc` channels.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{Adapter, CloseHandler, ErrorHandler, Frame, FrameHandler, Upcalls};
use crate::error::{BridgeError, BridgeResult};

/// One half of a linked in-process channel pair.
pub struct MemoryAdapter {
    outbound: mpsc::UnboundedSender<Frame>,
    upcalls: Arc<Upcalls>,
    started: std::sync::atomic::AtomicBool,
}

impl MemoryAdapter {
    /// Create a linked pair. Each side's outbound channel feeds the
    /// other side's frame handler once both are started.
    #[must_use]
    pub fn pair() -> (Arc<Self>, Arc<Self>) {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();

        let left = Arc::new(Self {
            outbound: tx_b,
            upcalls: Arc::new(Upcalls::default()),
            started: std::sync::atomic::AtomicBool::new(false),
        });
        let right = Arc::new(Self {
            outbound: tx_a,
            upcalls: Arc::new(Upcalls::default()),
            started: std::sync::atomic::AtomicBool::new(false),
        });

        spawn_pump(rx_a, Arc::clone(&left));
        spawn_pump(rx_b, Arc::clone(&right));

        (left, right)
    }
}

fn spawn_pump(mut rx: mpsc::UnboundedReceiver<Frame>, owner: Arc<MemoryAdapter>) {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            owner.upcalls.deliver_frame(frame);
        }
        owner.upcalls.fire_close();
    });
}

#[async_trait]
impl Adapter for MemoryAdapter {
    async fn start(&self) -> BridgeResult<()> {
        self.started.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, frame: Frame) -> BridgeResult<()> {
        if self.upcalls.is_closed() {
            return Err(BridgeError::Transport("memory adapter closed".into()));
        }
        self.outbound
            .send(frame)
            .map_err(|_| BridgeError::Transport("memory adapter peer dropped".into()))
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
        "memory"
    }
}
