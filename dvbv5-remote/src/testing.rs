//! In-process fake daemon for connection and device tests.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;

use dvbv5_protocol::{
    decode_fields, decode_frame_length, encode_event, encode_reply, Event, Field, WireReader,
    WireWriter, DAEMON_VERSION, LENGTH_PREFIX_SIZE,
};

use crate::config::ConnectionConfig;

/// A request as received by the daemon.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub seq: i32,
    pub command: String,
    pub args: Bytes,
}

impl Request {
    /// The `index`-th argument, for requests made of `%i` fields only.
    pub fn int_arg(&self, index: usize) -> i32 {
        let mut reader = WireReader::new(self.args.clone());
        for _ in 0..index {
            reader.get_i32().unwrap();
        }
        reader.get_i32().unwrap()
    }

    pub fn fields(&self, format: &str) -> Vec<Field> {
        let (fields, tail) = decode_fields(format, self.args.clone()).unwrap();
        assert!(tail.is_empty(), "{} left {} bytes", format, tail.len());
        fields
    }

    /// Leading fields only, ignoring whatever follows.
    pub fn fields_prefix(&self, format: &str) -> Vec<Field> {
        decode_fields(format, self.args.clone()).unwrap().0
    }
}

/// The daemon side of one accepted connection.
pub(crate) struct Session {
    stream: TcpStream,
}

impl Session {
    pub fn read_request(&mut self) -> io::Result<Request> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        self.stream.read_exact(&mut prefix)?;
        let len = decode_frame_length(prefix)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;

        let mut reader = WireReader::new(Bytes::from(payload));
        let seq = reader.get_i32().unwrap();
        let command = reader.get_str().unwrap();
        Ok(Request {
            seq,
            command,
            args: reader.into_remaining(),
        })
    }

    /// Read the next request, checking its command name.
    pub fn expect(&mut self, command: &str) -> Request {
        let request = self.read_request().unwrap();
        assert_eq!(request.command, command);
        request
    }

    pub fn reply(&mut self, seq: i32, command: &str, retval: i32, body: &[u8]) {
        let frame = encode_reply(seq, command, retval, body).unwrap();
        self.send_raw(&frame);
    }

    pub fn send_event(&mut self, event: &Event) {
        let frame = encode_event(event).unwrap();
        self.send_raw(&frame);
    }

    pub fn send_raw(&mut self, bytes: &[u8]) {
        // the client may already be gone in teardown tests
        let _ = self.stream.write_all(bytes);
    }

    pub fn answer_handshake(&mut self) {
        let request = self.expect("daemon_get_version");
        let mut body = WireWriter::new();
        body.put_str(DAEMON_VERSION).unwrap();
        self.reply(request.seq, &request.command, 0, &body.freeze());
    }

    /// Wait for the client to close its side.
    pub fn expect_close(&mut self) {
        let mut buf = [0u8; 256];
        loop {
            match self.stream.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(_) => {}
            }
        }
    }
}

/// A listener that accepts one connection and runs `script` on it.
pub(crate) struct FakeDaemon {
    addr: SocketAddr,
    thread: Option<JoinHandle<()>>,
}

impl FakeDaemon {
    pub fn spawn<F>(script: F) -> Self
    where
        F: FnOnce(Session) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let thread = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
            script(Session { stream });
        });

        Self {
            addr,
            thread: Some(thread),
        }
    }

    pub fn config(&self) -> ConnectionConfig {
        ConnectionConfig {
            call_timeout: Some(Duration::from_secs(10)),
            ..ConnectionConfig::new(self.addr.to_string())
        }
    }

    /// Wait for the script, propagating its assertion failures.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if let Err(panic) = thread.join() {
                std::panic::resume_unwind(panic);
            }
        }
    }
}
