//! TCP connection to a dvbv5 daemon.
//!
//! The public API is synchronous. Each connection owns a small tokio
//! runtime running the receiver task; callers block on their own
//! `PendingCall` until the receiver completes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use log::{debug, info, warn};
use parking_lot::Mutex;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

use dvbv5_protocol::{
    encode_request, ClientError, Command, DevChangeType, ProtocolError, WireReader,
    DAEMON_VERSION,
};

use crate::client::handles::HandleTable;
use crate::client::pending::{PendingCall, PendingCalls, Reply};
use crate::client::receiver::receive_loop;
use crate::config::ConnectionConfig;
use crate::file_log;

/// Callback for `dev_change` notifications; runs on the receiver thread and
/// must not block.
pub type DevChangeHandler = Arc<dyn Fn(&str, DevChangeType) + Send + Sync>;

/// State shared between callers and the receiver task.
pub(crate) struct Shared {
    pub(crate) pending: PendingCalls,
    pub(crate) handles: HandleTable,
    disconnected: AtomicBool,
    dev_change: Mutex<Option<DevChangeHandler>>,
}

impl Shared {
    pub(crate) fn new(ring_capacity: usize) -> Self {
        Self {
            pending: PendingCalls::new(),
            handles: HandleTable::new(ring_capacity),
            disconnected: AtomicBool::new(false),
            dev_change: Mutex::new(None),
        }
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Latch the disconnected state, fail every waiter and release all
    /// handles. Only the first call does anything.
    pub(crate) fn disconnect(&self) -> bool {
        if self.disconnected.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.pending.fail_all(ClientError::Disconnected);
        self.handles.close_all();
        true
    }

    pub(crate) fn dev_change_handler(&self) -> Option<DevChangeHandler> {
        self.dev_change.lock().clone()
    }

    pub(crate) fn set_dev_change_handler(&self, handler: Option<DevChangeHandler>) {
        *self.dev_change.lock() = handler;
    }
}

/// Write side of the socket plus the sequence counter it guards.
struct Writer {
    stream: Option<OwnedWriteHalf>,
    next_seq: i32,
}

impl Writer {
    /// Sequence numbers start at 1 and skip 0, which marks events.
    fn next_seq(&mut self) -> i32 {
        let seq = self.next_seq;
        self.next_seq = if seq >= i32::MAX { 1 } else { seq + 1 };
        seq
    }
}

/// A connection to one daemon.
pub struct Connection {
    config: ConnectionConfig,
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<Writer>,
    runtime: Mutex<Option<Runtime>>,
    receiver: Mutex<Option<JoinHandle<()>>>,
}

impl Connection {
    /// Connect and perform the version handshake.
    pub fn connect(config: ConnectionConfig) -> Result<Self, ClientError> {
        if let Some(path) = &config.log_file {
            crate::logging::init_file_logger(path);
        }
        file_log!(info, "Connecting to {}...", config.server_addr);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("dvbv5-remote")
            .enable_all()
            .build()
            .map_err(|e| {
                file_log!(error, "Failed to create runtime: {}", e);
                ClientError::ConnectionFailed(e.to_string())
            })?;

        let stream = runtime
            .block_on(async {
                tokio::time::timeout(config.connect_timeout, TcpStream::connect(&config.server_addr)).await
            })
            .map_err(|_| {
                file_log!(error, "TCP connect timeout after {:?}", config.connect_timeout);
                ClientError::ConnectionFailed(format!("timed out after {:?}", config.connect_timeout))
            })?
            .map_err(|e| {
                file_log!(error, "TCP connect failed: {}", e);
                ClientError::ConnectionFailed(e.to_string())
            })?;

        if config.tcp_nodelay {
            stream
                .set_nodelay(true)
                .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;
        }
        file_log!(info, "TCP connection established to {}", config.server_addr);

        let (reader, writer) = stream.into_split();
        let shared = Arc::new(Shared::new(config.ring_buffer_size));
        let receiver = runtime.spawn(receive_loop(reader, Arc::clone(&shared)));

        let conn = Self {
            config,
            shared,
            writer: tokio::sync::Mutex::new(Writer {
                stream: Some(writer),
                next_seq: 1,
            }),
            runtime: Mutex::new(Some(runtime)),
            receiver: Mutex::new(Some(receiver)),
        };

        conn.handshake()?;
        Ok(conn)
    }

    /// The daemon must report exactly our protocol version.
    fn handshake(&self) -> Result<(), ClientError> {
        let timeout = self.config.call_timeout.or(Some(self.config.connect_timeout));
        let reply = self.call_with_timeout(Command::DaemonGetVersion, Bytes::new(), timeout)?;
        let version = WireReader::new(reply.payload).get_str()?;

        if version != DAEMON_VERSION {
            file_log!(error, "Handshake failed: daemon reports '{}'", version);
            return Err(ProtocolError::VersionMismatch {
                expected: DAEMON_VERSION.to_string(),
                received: version,
            }
            .into());
        }

        file_log!(info, "Connected to {}", version);
        Ok(())
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        !self.shared.is_disconnected()
    }

    pub(crate) fn shared(&self) -> &Shared {
        &self.shared
    }

    pub fn set_dev_change_handler(&self, handler: Option<DevChangeHandler>) {
        self.shared.set_dev_change_handler(handler);
    }

    fn runtime_handle(&self) -> Result<Handle, ClientError> {
        self.runtime
            .lock()
            .as_ref()
            .map(|rt| rt.handle().clone())
            .ok_or(ClientError::Disconnected)
    }

    /// Send `command` with pre-encoded `args` and wait for its response.
    pub fn call(&self, command: Command, args: Bytes) -> Result<Reply, ClientError> {
        self.call_with_timeout(command, args, self.config.call_timeout)
    }

    fn call_with_timeout(
        &self,
        command: Command,
        args: Bytes,
        timeout: Option<Duration>,
    ) -> Result<Reply, ClientError> {
        if self.shared.is_disconnected() {
            return Err(ClientError::Disconnected);
        }

        let handle = self.runtime_handle()?;
        let call = handle.block_on(self.send(command, &args))?;

        let result = call.wait(timeout);
        match &result {
            Ok(reply) => debug!("#{} {}: retval {}", call.seq(), command, reply.retval),
            Err(ClientError::Timeout) => {
                self.shared.pending.remove(call.seq());
                warn!("#{} {}: no response within {:?}", call.seq(), command, timeout);
            }
            Err(e) => debug!("#{} {}: {}", call.seq(), command, e),
        }
        result
    }

    /// Register the call and write its frame in one piece.
    async fn send(&self, command: Command, args: &[u8]) -> Result<Arc<PendingCall>, ClientError> {
        let mut writer = self.writer.lock().await;
        let seq = writer.next_seq();
        let frame = encode_request(seq, command.as_str(), args)?;
        let call = self.shared.pending.register(seq, command.as_str())?;

        let Some(stream) = writer.stream.as_mut() else {
            self.shared.pending.remove(seq);
            return Err(ClientError::Disconnected);
        };

        let written = stream.write_all(&frame).await;
        if let Err(e) = written {
            self.shared.pending.remove(seq);
            drop(writer);
            file_log!(error, "Write of #{} {} failed: {}", seq, command, e);
            self.shared.disconnect();
            return Err(ClientError::Transport(e.to_string()));
        }

        Ok(call)
    }

    /// Tear the connection down. Pending calls fail with `Disconnected`.
    pub fn shutdown(&self) {
        let Some(runtime) = self.runtime.lock().take() else {
            return;
        };
        file_log!(info, "Shutting down connection to {}", self.config.server_addr);

        if self.shared.disconnect() {
            debug!("Pending calls failed on shutdown");
        }

        let stream = runtime.block_on(async { self.writer.lock().await.stream.take() });
        if let Some(task) = self.receiver.lock().take() {
            task.abort();
            let _ = runtime.block_on(async { tokio::time::timeout(Duration::from_millis(500), task).await });
        }
        drop(stream);

        runtime.shutdown_timeout(Duration::from_secs(1));
        info!("Connection to {} closed", self.config.server_addr);
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.shutdown();
    }
}
