//! Connection plumbing: framing on the socket, call correlation and
//! per-handle stream buffers.

pub mod buffer;
pub mod connection;
pub mod handles;
pub mod pending;
mod receiver;

pub use buffer::RingBuffer;
pub use connection::{Connection, DevChangeHandler};
pub use handles::{DeviceHandle, HandleKind, HandleTable};
pub use pending::{PendingCall, PendingCalls, Reply};
