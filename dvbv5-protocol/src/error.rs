//! Error types for the dvbv5 remote protocol.

use std::fmt;

use thiserror::Error;

/// Protocol-level errors raised while encoding or decoding frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The destination buffer has no room for the next field.
    #[error("Buffer too small: need {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    /// The source buffer ends before a declared field does.
    #[error("Truncated field: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A string or frame carries a negative length.
    #[error("Negative length: {0}")]
    NegativeLength(i32),

    /// Frame length prefix outside the accepted range.
    #[error("Frame too large: {0} bytes (max: {1})")]
    FrameTooLarge(usize, usize),

    /// A string field does not hold valid UTF-8.
    #[error("Invalid UTF-8 in string field: {0}")]
    InvalidUtf8(String),

    /// Unknown conversion character in a field format string.
    #[error("Invalid format specifier: {0:?}")]
    InvalidFormat(String),

    /// Unsolicited frame with a command name this client does not know.
    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    /// A record with a nonzero sequence number inside an event frame.
    #[error("Response #{0} embedded in an event frame")]
    EmbeddedResponse(i32),

    /// Daemon answered the handshake with a different version string.
    #[error("Protocol version mismatch: expected '{expected}', received '{received}'")]
    VersionMismatch { expected: String, received: String },
}

/// Client-side errors surfaced by connection and device operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// TCP connect or runtime setup failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Socket write or read failed; the connection is gone.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The connection was closed, locally or by the peer.
    #[error("Connection closed")]
    Disconnected,

    /// No response before the configured call deadline.
    #[error("Request timed out")]
    Timeout,

    /// Malformed or undecodable data.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Response carried our sequence number but a different command.
    #[error("Response #{seq}: expected '{expected}', got '{received}'")]
    CommandMismatch {
        seq: i32,
        expected: String,
        received: String,
    },

    /// A sequence number was registered twice.
    #[error("Sequence number {0} is already pending")]
    DuplicateSequence(i32),

    /// Daemon returned a negative result code.
    #[error("{command} failed: {code}")]
    Remote { command: String, code: RemoteErrno },

    /// The ring buffer dropped data since the last read.
    #[error("Ring buffer overflow, data was lost")]
    Overflow,

    /// Argument rejected before anything was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No open handle with this id.
    #[error("Unknown handle #{0}")]
    UnknownHandle(i32),

    /// Operation is not valid for this kind of handle.
    #[error("Operation {operation} is not supported on {kind} handle #{id}")]
    WrongHandleKind {
        operation: &'static str,
        kind: &'static str,
        id: i32,
    },
}

/// Negative result code returned by the daemon, as an errno value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteErrno(pub i32);

impl RemoteErrno {
    pub const EPERM: RemoteErrno = RemoteErrno(1);
    pub const ENOENT: RemoteErrno = RemoteErrno(2);
    pub const EIO: RemoteErrno = RemoteErrno(5);
    pub const EAGAIN: RemoteErrno = RemoteErrno(11);
    pub const ENOMEM: RemoteErrno = RemoteErrno(12);
    pub const EBUSY: RemoteErrno = RemoteErrno(16);
    pub const ENODEV: RemoteErrno = RemoteErrno(19);
    pub const EINVAL: RemoteErrno = RemoteErrno(22);
    pub const EOVERFLOW: RemoteErrno = RemoteErrno(75);
    pub const ETIMEDOUT: RemoteErrno = RemoteErrno(110);

    /// Build from a daemon retval; the sign is dropped.
    pub fn from_retval(retval: i32) -> Self {
        RemoteErrno(retval.checked_abs().unwrap_or(i32::MAX))
    }

    /// Symbolic name, when the value is a well-known errno.
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("EPERM"),
            2 => Some("ENOENT"),
            5 => Some("EIO"),
            11 => Some("EAGAIN"),
            12 => Some("ENOMEM"),
            16 => Some("EBUSY"),
            19 => Some("ENODEV"),
            22 => Some("EINVAL"),
            75 => Some("EOVERFLOW"),
            110 => Some("ETIMEDOUT"),
            _ => None,
        }
    }
}

impl fmt::Display for RemoteErrno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.0),
            None => write!(f, "error {}", self.0),
        }
    }
}

impl From<i32> for RemoteErrno {
    fn from(value: i32) -> Self {
        RemoteErrno::from_retval(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_from_retval() {
        assert_eq!(RemoteErrno::from_retval(-19), RemoteErrno::ENODEV);
        assert_eq!(RemoteErrno::from(-5), RemoteErrno::EIO);
        assert_eq!(RemoteErrno::from_retval(i32::MIN).0, i32::MAX);
    }

    #[test]
    fn test_errno_display() {
        assert_eq!(RemoteErrno::EOVERFLOW.to_string(), "EOVERFLOW (75)");
        assert_eq!(RemoteErrno(4242).to_string(), "error 4242");

        let err = ClientError::Remote {
            command: "dev_open".to_string(),
            code: RemoteErrno::EBUSY,
        };
        assert_eq!(err.to_string(), "dev_open failed: EBUSY (16)");
    }
}
