//! Ring buffer for streamed demux/DVR data.

use std::collections::VecDeque;

use bytes::Bytes;
use parking_lot::{Condvar, Mutex};

use dvbv5_protocol::{ClientError, RemoteErrno, REMOTE_BUF_SIZE, RING_BUFFER_SIZE};

struct State {
    buf: Box<[u8]>,
    /// Read position.
    head: usize,
    /// Bytes available for reading.
    len: usize,
    /// Errors to report on the next reads, oldest first.
    pending: VecDeque<ClientError>,
    closed: bool,
}

impl State {
    fn copy_in(&mut self, data: &[u8]) {
        let capacity = self.buf.len();
        let tail = (self.head + self.len) % capacity;
        let first_chunk = data.len().min(capacity - tail);

        self.buf[tail..tail + first_chunk].copy_from_slice(&data[..first_chunk]);
        if first_chunk < data.len() {
            let second = data.len() - first_chunk;
            self.buf[..second].copy_from_slice(&data[first_chunk..]);
        }
        self.len += data.len();
    }

    fn copy_out(&mut self, count: usize) -> Bytes {
        let capacity = self.buf.len();
        let mut out = Vec::with_capacity(count);
        let first_chunk = count.min(capacity - self.head);

        out.extend_from_slice(&self.buf[self.head..self.head + first_chunk]);
        if first_chunk < count {
            out.extend_from_slice(&self.buf[..count - first_chunk]);
        }

        self.head = (self.head + count) % capacity;
        self.len -= count;
        Bytes::from(out)
    }
}

/// Fixed-capacity byte ring between the receiver and a reading caller.
///
/// The receiver never blocks on it: data that does not fit is dropped and
/// the loss is reported once by the next `read`.
pub struct RingBuffer {
    state: Mutex<State>,
    readable: Condvar,
}

impl RingBuffer {
    /// Create a ring buffer of `RING_BUFFER_SIZE` bytes.
    pub fn new() -> Self {
        Self::with_capacity(RING_BUFFER_SIZE)
    }

    /// Capacity is rounded up to a multiple of `REMOTE_BUF_SIZE`.
    pub fn with_capacity(capacity: usize) -> Self {
        let chunks = capacity.div_ceil(REMOTE_BUF_SIZE).max(1);
        let buf = vec![0u8; chunks * REMOTE_BUF_SIZE].into_boxed_slice();
        Self {
            state: Mutex::new(State {
                buf,
                head: 0,
                len: 0,
                pending: VecDeque::new(),
                closed: false,
            }),
            readable: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.state.lock().buf.len()
    }

    /// Get the number of bytes available for reading.
    pub fn available(&self) -> usize {
        self.state.lock().len
    }

    /// Get the number of bytes of free space for writing.
    pub fn free_space(&self) -> usize {
        let state = self.state.lock();
        state.buf.len() - state.len
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Write data to the buffer.
    ///
    /// Returns the number of bytes stored. A short write flags an overflow.
    pub fn write(&self, data: &[u8]) -> usize {
        let mut state = self.state.lock();
        if state.closed {
            return 0;
        }

        let free = state.buf.len() - state.len;
        let to_write = data.len().min(free);
        state.copy_in(&data[..to_write]);

        if to_write < data.len() && !state.pending.contains(&ClientError::Overflow) {
            state.pending.push_back(ClientError::Overflow);
        }

        self.readable.notify_all();
        to_write
    }

    /// Record a read error reported by the daemon for this stream.
    pub fn set_error(&self, retval: i32) {
        let mut state = self.state.lock();
        state.pending.push_back(ClientError::Remote {
            command: "data_read".to_string(),
            code: RemoteErrno::from_retval(retval),
        });
        self.readable.notify_all();
    }

    /// Read exactly `min(max_len, REMOTE_BUF_SIZE)` bytes, blocking until
    /// they are available.
    ///
    /// Each pending overflow or daemon error is returned instead of data,
    /// once and in arrival order.
    pub fn read(&self, max_len: usize) -> Result<Bytes, ClientError> {
        let mut state = self.state.lock();
        let wanted = max_len.min(REMOTE_BUF_SIZE).min(state.buf.len());

        loop {
            if let Some(err) = state.pending.pop_front() {
                return Err(err);
            }
            if state.len >= wanted {
                return Ok(state.copy_out(wanted));
            }
            if state.closed {
                return Err(ClientError::Disconnected);
            }
            self.readable.wait(&mut state);
        }
    }

    /// Discard buffered data and any pending error.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.head = 0;
        state.len = 0;
        state.pending.clear();
    }

    /// Stop accepting data and wake every blocked reader.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.readable.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_write_read() {
        let buffer = RingBuffer::new();

        let data = vec![0x47u8; 188 * 10]; // 10 TS packets
        let written = buffer.write(&data);
        assert_eq!(written, data.len());
        assert_eq!(buffer.available(), data.len());

        let read = buffer.read(1000).unwrap();
        assert_eq!(read.len(), 1000);
        assert_eq!(buffer.available(), data.len() - 1000);
    }

    #[test]
    fn test_capacity_rounding() {
        assert_eq!(RingBuffer::with_capacity(1).capacity(), REMOTE_BUF_SIZE);
        assert_eq!(
            RingBuffer::with_capacity(REMOTE_BUF_SIZE * 2 + 1).capacity(),
            REMOTE_BUF_SIZE * 3
        );
        assert_eq!(RingBuffer::new().capacity(), RING_BUFFER_SIZE);
    }

    #[test]
    fn test_wrap_around() {
        let buffer = RingBuffer::with_capacity(REMOTE_BUF_SIZE);
        let capacity = buffer.capacity();

        buffer.write(&vec![0xFFu8; capacity - 100]);
        buffer.read(capacity - 200).unwrap();

        let wrap_data: Vec<u8> = (0..300u32).map(|i| i as u8).collect();
        assert_eq!(buffer.write(&wrap_data), 300);

        let head = buffer.read(100).unwrap();
        assert!(head.iter().all(|&b| b == 0xFF));
        let wrapped = buffer.read(300).unwrap();
        assert_eq!(&wrapped[..], &wrap_data[..]);
    }

    #[test]
    fn test_overflow_reported_once() {
        let buffer = RingBuffer::with_capacity(REMOTE_BUF_SIZE);
        let capacity = buffer.capacity();

        assert_eq!(buffer.write(&vec![1u8; capacity - 10]), capacity - 10);
        assert_eq!(buffer.write(&[2u8; 20]), 10);
        assert_eq!(buffer.free_space(), 0);

        assert_eq!(buffer.read(188), Err(ClientError::Overflow));
        let data = buffer.read(188).unwrap();
        assert_eq!(data.len(), 188);
    }

    #[test]
    fn test_remote_error_reported_once() {
        let buffer = RingBuffer::new();
        buffer.write(&[0x47; 188]);
        buffer.set_error(-75);

        assert!(matches!(
            buffer.read(188),
            Err(ClientError::Remote { code: RemoteErrno::EOVERFLOW, .. })
        ));
        assert_eq!(buffer.read(188).unwrap().len(), 188);
    }

    #[test]
    fn test_overflow_not_hidden_by_remote_error() {
        let buffer = RingBuffer::with_capacity(REMOTE_BUF_SIZE);
        let capacity = buffer.capacity();

        buffer.write(&vec![1u8; capacity]);
        buffer.write(&[2u8; 188]);
        buffer.write(&[3u8; 188]);
        buffer.set_error(-5);

        assert_eq!(buffer.read(188), Err(ClientError::Overflow));
        assert!(matches!(
            buffer.read(188),
            Err(ClientError::Remote { code: RemoteErrno::EIO, .. })
        ));
        assert_eq!(buffer.read(188).unwrap().len(), 188);
    }

    #[test]
    fn test_read_blocks_until_enough() {
        let buffer = Arc::new(RingBuffer::new());
        let producer = Arc::clone(&buffer);

        let handle = thread::spawn(move || {
            for _ in 0..4 {
                thread::sleep(Duration::from_millis(5));
                producer.write(&[0x47; 94]);
            }
        });

        let data = buffer.read(376).unwrap();
        assert_eq!(data.len(), 376);
        handle.join().unwrap();
    }

    #[test]
    fn test_read_clamped() {
        let buffer = RingBuffer::new();
        buffer.write(&vec![0u8; REMOTE_BUF_SIZE * 2]);
        assert_eq!(buffer.read(usize::MAX).unwrap().len(), REMOTE_BUF_SIZE);
    }

    #[test]
    fn test_close_wakes_reader() {
        let buffer = Arc::new(RingBuffer::new());
        let closer = Arc::clone(&buffer);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            closer.close();
        });

        assert_eq!(buffer.read(188), Err(ClientError::Disconnected));
        handle.join().unwrap();
        assert_eq!(buffer.write(&[1, 2, 3]), 0);
    }

    #[test]
    fn test_clear() {
        let buffer = RingBuffer::new();

        buffer.write(&[1, 2, 3, 4, 5]);
        assert!(!buffer.is_empty());

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
