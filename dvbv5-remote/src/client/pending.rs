//! Registry of requests waiting for their response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};

use dvbv5_protocol::ClientError;

/// Successful response to a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub retval: i32,
    pub payload: Bytes,
}

/// One in-flight request.
///
/// The outcome slot is written exactly once, by the receiver or by
/// `fail_all`, and taken by the waiting caller.
#[derive(Debug)]
pub struct PendingCall {
    seq: i32,
    command: &'static str,
    outcome: Mutex<Option<Result<Reply, ClientError>>>,
    ready: Condvar,
}

impl PendingCall {
    fn new(seq: i32, command: &'static str) -> Self {
        Self {
            seq,
            command,
            outcome: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    pub fn seq(&self) -> i32 {
        self.seq
    }

    pub fn command(&self) -> &'static str {
        self.command
    }

    fn complete(&self, outcome: Result<Reply, ClientError>) -> bool {
        let mut slot = self.outcome.lock();
        if slot.is_some() {
            return false;
        }
        *slot = Some(outcome);
        self.ready.notify_all();
        true
    }

    /// Block until the call completes, or until `timeout` expires.
    pub fn wait(&self, timeout: Option<Duration>) -> Result<Reply, ClientError> {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut slot = self.outcome.lock();

        loop {
            if let Some(outcome) = slot.take() {
                return outcome;
            }
            match deadline {
                None => self.ready.wait(&mut slot),
                Some(deadline) => {
                    if self.ready.wait_until(&mut slot, deadline).timed_out() {
                        return slot.take().unwrap_or(Err(ClientError::Timeout));
                    }
                }
            }
        }
    }
}

/// What the receiver did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// The call with this seq expected another command; it was failed.
    Mismatch { expected: &'static str },
    /// No call is waiting on this seq.
    Unmatched,
}

#[derive(Debug, Default)]
struct Registry {
    calls: HashMap<i32, Arc<PendingCall>>,
    closed: Option<ClientError>,
}

/// Sequence-number keyed table of pending calls.
#[derive(Debug, Default)]
pub struct PendingCalls {
    inner: Mutex<Registry>,
}

impl PendingCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a call before its request is written.
    pub fn register(&self, seq: i32, command: &'static str) -> Result<Arc<PendingCall>, ClientError> {
        let mut registry = self.inner.lock();
        if let Some(err) = &registry.closed {
            return Err(err.clone());
        }
        if registry.calls.contains_key(&seq) {
            return Err(ClientError::DuplicateSequence(seq));
        }

        let call = Arc::new(PendingCall::new(seq, command));
        registry.calls.insert(seq, Arc::clone(&call));
        Ok(call)
    }

    /// Route a response to the call registered under `seq`.
    pub fn complete(&self, seq: i32, command: &str, retval: i32, payload: Bytes) -> Delivery {
        let call = match self.inner.lock().calls.remove(&seq) {
            Some(call) => call,
            None => return Delivery::Unmatched,
        };

        if call.command != command {
            call.complete(Err(ClientError::CommandMismatch {
                seq,
                expected: call.command.to_string(),
                received: command.to_string(),
            }));
            return Delivery::Mismatch {
                expected: call.command,
            };
        }

        call.complete(Ok(Reply { retval, payload }));
        Delivery::Delivered
    }

    /// Drop a call the caller stopped waiting for.
    pub fn remove(&self, seq: i32) {
        self.inner.lock().calls.remove(&seq);
    }

    /// Fail every pending call with `err` and refuse new ones.
    pub fn fail_all(&self, err: ClientError) {
        let calls: Vec<_> = {
            let mut registry = self.inner.lock();
            if registry.closed.is_none() {
                registry.closed = Some(err.clone());
            }
            registry.calls.drain().map(|(_, call)| call).collect()
        };

        for call in calls {
            call.complete(Err(err.clone()));
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_complete_wakes_waiter() {
        let calls = Arc::new(PendingCalls::new());
        let call = calls.register(1, "dev_open").unwrap();

        let registry = Arc::clone(&calls);
        let responder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            registry.complete(1, "dev_open", 3, Bytes::new())
        });

        let reply = call.wait(None).unwrap();
        assert_eq!(reply.retval, 3);
        assert_eq!(responder.join().unwrap(), Delivery::Delivered);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_duplicate_sequence_rejected() {
        let calls = PendingCalls::new();
        let _first = calls.register(4, "dev_close").unwrap();
        assert_eq!(
            calls.register(4, "dev_close").unwrap_err(),
            ClientError::DuplicateSequence(4)
        );
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_command_mismatch_fails_only_that_call() {
        let calls = PendingCalls::new();
        let a = calls.register(1, "dev_open").unwrap();
        let b = calls.register(2, "dev_close").unwrap();

        assert_eq!(
            calls.complete(1, "dev_close", 0, Bytes::new()),
            Delivery::Mismatch {
                expected: "dev_open"
            }
        );
        assert!(matches!(
            a.wait(None),
            Err(ClientError::CommandMismatch { seq: 1, .. })
        ));

        assert_eq!(calls.complete(2, "dev_close", 0, Bytes::new()), Delivery::Delivered);
        assert_eq!(b.wait(None).unwrap().retval, 0);
    }

    #[test]
    fn test_unmatched_response() {
        let calls = PendingCalls::new();
        assert_eq!(
            calls.complete(42, "dev_open", 0, Bytes::new()),
            Delivery::Unmatched
        );
    }

    #[test]
    fn test_fail_all() {
        let calls = PendingCalls::new();
        let waiters: Vec<_> = (1..=3).map(|seq| calls.register(seq, "fe_get_stats").unwrap()).collect();

        calls.fail_all(ClientError::Disconnected);

        for call in waiters {
            assert_eq!(call.wait(None), Err(ClientError::Disconnected));
        }
        assert_eq!(
            calls.register(9, "dev_open").unwrap_err(),
            ClientError::Disconnected
        );
    }

    #[test]
    fn test_wait_timeout() {
        let calls = PendingCalls::new();
        let call = calls.register(1, "dev_find").unwrap();
        assert_eq!(
            call.wait(Some(Duration::from_millis(10))),
            Err(ClientError::Timeout)
        );
    }
}
