//! Table of remote device sessions opened over this connection.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use dvbv5_protocol::ClientError;

use crate::client::buffer::RingBuffer;

/// What kind of node a handle was opened on, derived from its sysname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Frontend,
    Demux,
    Dvr,
    Other,
}

impl HandleKind {
    /// `dvb0.frontend0` is a frontend, `dvb0.dvr0` a DVR, and so on.
    pub fn from_sysname(sysname: &str) -> Self {
        let node = sysname.rsplit('.').next().unwrap_or(sysname);
        if node.starts_with("frontend") {
            HandleKind::Frontend
        } else if node.starts_with("demux") {
            HandleKind::Demux
        } else if node.starts_with("dvr") {
            HandleKind::Dvr
        } else {
            HandleKind::Other
        }
    }

    /// Demux and DVR handles receive streamed data.
    pub fn is_streaming(self) -> bool {
        matches!(self, HandleKind::Demux | HandleKind::Dvr)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HandleKind::Frontend => "frontend",
            HandleKind::Demux => "demux",
            HandleKind::Dvr => "dvr",
            HandleKind::Other => "other",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device session opened on the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    id: i32,
    kind: HandleKind,
    sysname: String,
}

impl DeviceHandle {
    pub fn new(id: i32, sysname: &str) -> Self {
        Self {
            id,
            kind: HandleKind::from_sysname(sysname),
            sysname: sysname.to_string(),
        }
    }

    /// Daemon-side handle id.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    pub fn sysname(&self) -> &str {
        &self.sysname
    }

    /// Fail with `WrongHandleKind` unless this handle is one of `allowed`.
    pub fn require(&self, operation: &'static str, allowed: &[HandleKind]) -> Result<(), ClientError> {
        if allowed.contains(&self.kind) {
            return Ok(());
        }
        Err(ClientError::WrongHandleKind {
            operation,
            kind: self.kind.as_str(),
            id: self.id,
        })
    }
}

struct OpenHandle {
    handle: DeviceHandle,
    ring: Option<Arc<RingBuffer>>,
}

/// Open handles keyed by daemon id.
pub struct HandleTable {
    ring_capacity: usize,
    handles: Mutex<HashMap<i32, OpenHandle>>,
}

impl HandleTable {
    pub fn new(ring_capacity: usize) -> Self {
        Self {
            ring_capacity,
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Track a freshly opened handle, allocating a ring for streaming kinds.
    ///
    /// A stale entry with the same id is closed and replaced.
    pub fn insert(&self, handle: DeviceHandle) {
        let ring = handle
            .kind()
            .is_streaming()
            .then(|| Arc::new(RingBuffer::with_capacity(self.ring_capacity)));

        let previous = self
            .handles
            .lock()
            .insert(handle.id(), OpenHandle { handle, ring });
        if let Some(OpenHandle { ring: Some(ring), .. }) = previous {
            ring.close();
        }
    }

    /// Forget a handle and wake any reader blocked on its ring.
    pub fn remove(&self, id: i32) -> Option<DeviceHandle> {
        let entry = self.handles.lock().remove(&id)?;
        if let Some(ring) = &entry.ring {
            ring.close();
        }
        Some(entry.handle)
    }

    pub fn get(&self, id: i32) -> Option<DeviceHandle> {
        self.handles.lock().get(&id).map(|entry| entry.handle.clone())
    }

    pub fn contains(&self, id: i32) -> bool {
        self.handles.lock().contains_key(&id)
    }

    /// Ring buffer of a streaming handle.
    pub fn ring(&self, id: i32) -> Option<Arc<RingBuffer>> {
        self.handles.lock().get(&id).and_then(|entry| entry.ring.clone())
    }

    /// Close and drop every handle.
    pub fn close_all(&self) {
        let drained: Vec<_> = self.handles.lock().drain().map(|(_, entry)| entry).collect();
        for entry in drained {
            if let Some(ring) = entry.ring {
                ring.close();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_sysname() {
        assert_eq!(HandleKind::from_sysname("dvb0.frontend0"), HandleKind::Frontend);
        assert_eq!(HandleKind::from_sysname("dvb1.demux0"), HandleKind::Demux);
        assert_eq!(HandleKind::from_sysname("dvb0.dvr0"), HandleKind::Dvr);
        assert_eq!(HandleKind::from_sysname("dvb0.net0"), HandleKind::Other);
        assert_eq!(HandleKind::from_sysname("dvr"), HandleKind::Dvr);
    }

    #[test]
    fn test_require_kind() {
        let handle = DeviceHandle::new(3, "dvb0.demux0");
        assert!(handle.require("dmx_stop", &[HandleKind::Demux]).is_ok());
        assert_eq!(
            handle.require("fe_get_stats", &[HandleKind::Frontend]),
            Err(ClientError::WrongHandleKind {
                operation: "fe_get_stats",
                kind: "demux",
                id: 3
            })
        );
    }

    #[test]
    fn test_only_streaming_handles_get_a_ring() {
        let table = HandleTable::new(0);
        table.insert(DeviceHandle::new(1, "dvb0.frontend0"));
        table.insert(DeviceHandle::new(2, "dvb0.dvr0"));

        assert!(table.ring(1).is_none());
        assert!(table.ring(2).is_some());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_remove_closes_ring() {
        let table = HandleTable::new(0);
        table.insert(DeviceHandle::new(5, "dvb0.demux0"));
        let ring = table.ring(5).unwrap();

        let removed = table.remove(5).unwrap();
        assert_eq!(removed.sysname(), "dvb0.demux0");
        assert!(ring.is_closed());
        assert!(!table.contains(5));
        assert!(table.remove(5).is_none());
    }

    #[test]
    fn test_close_all() {
        let table = HandleTable::new(0);
        table.insert(DeviceHandle::new(1, "dvb0.demux0"));
        table.insert(DeviceHandle::new(2, "dvb0.dvr0"));
        let rings: Vec<_> = [1, 2].iter().map(|id| table.ring(*id).unwrap()).collect();

        table.close_all();
        assert!(table.is_empty());
        assert!(rings.iter().all(|ring| ring.is_closed()));
    }
}
