//! Stdio transport adapters.
//!
//! `StdioServerAdapter` spawns a child process from a `ServerConfig` and
//! pipes newline-delimited JSON frames over its standard streams.
//! `StdioClientAdapter` instead binds to *this* process's own
//! stdin/stdout, letting a wrapping shell or launcher act as the
//! client — the "already-spawned process owned elsewhere" is the
//! bridge binary itself.

use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex as TokioMutex;
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use super::{Adapter, CloseHandler, ErrorHandler, Frame, FrameHandler, Upcalls};
use crate::config::ServerConfig;
use crate::error::{BridgeError, BridgeResult};

/// 10 MiB line-size cap on newline-delimited frames.
const MAX_LINE_SIZE: usize = 10 * 1024 * 1024;

struct Pipes {
    stdin: ChildStdin,
    stdout: ChildStdout,
    stderr: Option<ChildStderr>,
}

/// Server-side stdio adapter: owns a spawned child process's pipes.
pub struct StdioServerAdapter {
    pipes: TokioMutex<Option<Pipes>>,
    stdin_tx: TokioMutex<Option<mpsc::UnboundedSender<Frame>>>,
    upcalls: Arc<Upcalls>,
    started: AtomicBool,
}

impl StdioServerAdapter {
    /// Spawn the child process declared by `config`. Returns the
    /// adapter plus the bare `Child` handle (stdio pipes already taken)
    /// so the caller — the Supervisor — can own process lifecycle
    /// (`wait()`, signal, kill) independently of frame routing.
    pub fn spawn(config: &ServerConfig) -> BridgeResult<(Arc<Self>, Child)> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &config.env {
            cmd.env(key, value);
        }

        let mut child = cmd.spawn().map_err(|e| BridgeError::ServerStartFailed {
            id: config.id.clone(),
            message: format!("failed to spawn '{}': {e}", config.command),
            cause: Some(Box::new(e)),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| BridgeError::ServerStartFailed {
            id: config.id.clone(),
            message: "child process has no stdin pipe".into(),
            cause: None,
        })?;
        let stdout = child.stdout.take().ok_or_else(|| BridgeError::ServerStartFailed {
            id: config.id.clone(),
            message: "child process has no stdout pipe".into(),
            cause: None,
        })?;
        let stderr = child.stderr.take();

        let adapter = Arc::new(Self {
            pipes: TokioMutex::new(Some(Pipes { stdin, stdout, stderr })),
            stdin_tx: TokioMutex::new(None),
            upcalls: Arc::new(Upcalls::default()),
            started: AtomicBool::new(false),
        });

        debug!(server = %config.id, command = %config.command, "spawned stdio server process");
        Ok((adapter, child))
    }
}

#[async_trait]
impl Adapter for StdioServerAdapter {
    async fn start(&self) -> BridgeResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let Pipes { stdin, stdout, stderr } = self
            .pipes
            .lock()
            .await
            .take()
            .ok_or_else(|| BridgeError::Transport("stdio server adapter already started".into()))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
        *self.stdin_tx.lock().await = Some(tx);

        // Writer task: serialize outbound frames as newline-delimited JSON.
        let upcalls_for_writer = Arc::clone(&self.upcalls);
        tokio::spawn(async move {
            let mut stdin = stdin;
            while let Some(frame) = rx.recv().await {
                let mut line = match serde_json::to_string(&frame) {
                    Ok(s) => s,
                    Err(e) => {
                        upcalls_for_writer.fire_error(format!("serialize frame: {e}"));
                        continue;
                    }
                };
                line.push('\n');
                if let Err(e) = stdin.write_all(line.as_bytes()).await {
                    upcalls_for_writer.fire_error(format!("stdin write failed: {e}"));
                    break;
                }
            }
        });

        // Reader task: one frame per line.
        let upcalls_for_reader = Arc::clone(&self.upcalls);
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) if line.len() > MAX_LINE_SIZE => {
                        upcalls_for_reader.fire_error("line exceeds maximum size".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<Frame>(trimmed) {
                            Ok(frame) => upcalls_for_reader.deliver_frame(frame),
                            Err(e) => {
                                warn!("failed to parse stdio frame: {e}");
                            }
                        }
                    }
                    Err(e) => {
                        upcalls_for_reader.fire_error(format!("stdout read failed: {e}"));
                        break;
                    }
                }
            }
            upcalls_for_reader.fire_close();
        });

        if let Some(stderr) = stderr {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr);
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => trace!(target: "mcp_bridge::child_stderr", "{}", line.trim_end()),
                    }
                }
            });
        }

        Ok(())
    }

    async fn send(&self, frame: Frame) -> BridgeResult<()> {
        let tx = self.stdin_tx.lock().await;
        match tx.as_ref() {
            Some(tx) => tx
                .send(frame)
                .map_err(|_| BridgeError::Transport("stdio server adapter writer gone".into())),
            None => Err(BridgeError::Transport("stdio server adapter not started".into())),
        }
    }

    async fn close(&self) -> BridgeResult<()> {
        *self.stdin_tx.lock().await = None;
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
        "stdio-server"
    }
}

/// Client-side stdio adapter: binds to this process's own standard
/// streams, so whatever launched the bridge binary acts as the client.
pub struct StdioClientAdapter {
    stdin_tx: TokioMutex<Option<mpsc::UnboundedSender<Frame>>>,
    upcalls: Arc<Upcalls>,
    started: AtomicBool,
}

impl StdioClientAdapter {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stdin_tx: TokioMutex::new(None),
            upcalls: Arc::new(Upcalls::default()),
            started: AtomicBool::new(false),
        })
    }
}

impl Default for StdioClientAdapter {
    fn default() -> Self {
        Self {
            stdin_tx: TokioMutex::new(None),
            upcalls: Arc::new(Upcalls::default()),
            started: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Adapter for StdioClientAdapter {
    async fn start(&self) -> BridgeResult<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<Frame>();
        *self.stdin_tx.lock().await = Some(tx);

        let upcalls_for_writer = Arc::clone(&self.upcalls);
        tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(frame) = rx.recv().await {
                let mut line = match serde_json::to_string(&frame) {
                    Ok(s) => s,
                    Err(e) => {
                        upcalls_for_writer.fire_error(format!("serialize frame: {e}"));
                        continue;
                    }
                };
                line.push('\n');
                if let Err(e) = stdout.write_all(line.as_bytes()).await {
                    upcalls_for_writer.fire_error(format!("stdout write failed: {e}"));
                    break;
                }
                let _ = stdout.flush().await;
            }
        });

        let upcalls_for_reader = Arc::clone(&self.upcalls);
        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => break,
                    Ok(_) if line.len() > MAX_LINE_SIZE => {
                        upcalls_for_reader.fire_error("line exceeds maximum size".to_string());
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<Frame>(trimmed) {
                            Ok(frame) => upcalls_for_reader.deliver_frame(frame),
                            Err(e) => warn!("failed to parse stdio frame: {e}"),
                        }
                    }
                    Err(e) => {
                        upcalls_for_reader.fire_error(format!("stdin read failed: {e}"));
                        break;
                    }
                }
            }
            upcalls_for_reader.fire_close();
        });

        Ok(())
    }

    async fn send(&self, frame: Frame) -> BridgeResult<()> {
        let tx = self.stdin_tx.lock().await;
        match tx.as_ref() {
            Some(tx) => tx
                .send(frame)
                .map_err(|_| BridgeError::Transport("stdio client adapter writer gone".into())),
            None => Err(BridgeError::Transport("stdio client adapter not started".into())),
        }
    }

    async fn close(&self) -> BridgeResult<()> {
        *self.stdin_tx.lock().await = None;
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
        "stdio-client"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LifecyclePolicy, TransportKind};
    use crate::ids::ServerId;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn cat_config() -> ServerConfig {
        ServerConfig {
            id: ServerId::from("echo-srv"),
            name: "echo".into(),
            version: "1.0.0".into(),
            command: "cat".into(),
            args: vec![],
            working_dir: None,
            env: HashMap::new(),
            transport: TransportKind::Stdio,
            sse_options: None,
            lifecycle: LifecyclePolicy::default(),
        }
    }

    #[tokio::test]
    async fn spawned_process_echoes_frames() {
        let config = cat_config();
        let (adapter, mut child) = StdioServerAdapter::spawn(&config).unwrap();
        adapter.start().await.unwrap();

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = Arc::clone(&received);
        adapter.set_frame_handler(Arc::new(move |frame| {
            received_clone.lock().unwrap().push(frame);
        }));

        adapter.send(serde_json::json!({"hello": "world"})).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(received.lock().unwrap().len(), 1);

        adapter.close().await.unwrap();
        let _ = child.kill().await;
    }

    #[test]
    fn env_passed_to_spawn() {
        let mut config = cat_config();
        config.env.insert("FOO".into(), "bar".into());
        assert_eq!(config.env.get("FOO"), Some(&"bar".to_string()));
    }
}
