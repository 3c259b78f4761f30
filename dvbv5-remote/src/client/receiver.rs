//! Background reader: the only code that reads from the socket.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use log::{debug, error, trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt};

use dvbv5_protocol::{
    decode_events, decode_frame_length, decode_reply, ClientError, Event, ProtocolError,
    LENGTH_PREFIX_SIZE,
};

use crate::client::connection::Shared;
use crate::client::pending::Delivery;
use crate::file_log;
use crate::logging::log_daemon_message;

/// Disconnects when the receiver exits, including by panic or abort.
struct DisconnectOnExit(Arc<Shared>);

impl Drop for DisconnectOnExit {
    fn drop(&mut self) {
        self.0.disconnect();
    }
}

/// Read frames until the stream fails, then disconnect.
pub(crate) async fn receive_loop<R>(reader: R, shared: Arc<Shared>)
where
    R: AsyncRead + Unpin,
{
    let _guard = DisconnectOnExit(Arc::clone(&shared));
    match read_frames(reader, &shared).await {
        Ok(()) => file_log!(info, "Remote end disconnected"),
        Err(e) => file_log!(error, "Receiver stopped: {}", e),
    }
}

async fn read_frames<R>(mut reader: R, shared: &Shared) -> Result<(), ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];

    loop {
        if shared.is_disconnected() {
            return Ok(());
        }

        match reader.read_exact(&mut prefix).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(ClientError::Transport(e.to_string())),
        }
        let len = decode_frame_length(prefix)?;

        let mut payload = BytesMut::zeroed(len);
        reader
            .read_exact(&mut payload)
            .await
            .map_err(|e| ClientError::Transport(format!("short frame ({} bytes): {}", len, e)))?;

        dispatch(shared, payload.freeze())?;
    }
}

/// Route one frame payload. An error means the stream can no longer be
/// trusted.
pub(crate) fn dispatch(shared: &Shared, payload: Bytes) -> Result<(), ProtocolError> {
    let (header, body) = decode_reply(payload)?;

    if header.is_event() {
        for event in decode_events(header, body)? {
            handle_event(shared, event);
        }
        return Ok(());
    }

    let seq = header.seq;
    match shared
        .pending
        .complete(seq, &header.command, header.retval, body)
    {
        Delivery::Delivered => trace!("Response #{} ({}) delivered", seq, header.command),
        Delivery::Mismatch { expected } => error!(
            "msg #{}: expecting '{}', got '{}'",
            seq, expected, header.command
        ),
        Delivery::Unmatched => warn!("Unexpected response #{}: {}", seq, header.command),
    }
    Ok(())
}

fn handle_event(shared: &Shared, event: Event) {
    match event {
        Event::Log { level, message } => log_daemon_message(level, &message),
        Event::DeviceChange { sysname, change } => match shared.dev_change_handler() {
            Some(handler) => {
                let result = panic::catch_unwind(AssertUnwindSafe(|| handler(&sysname, change)));
                if let Err(e) = result {
                    file_log!(error, "Device change handler panicked on {}: {:?}", sysname, e);
                }
            }
            None => debug!("Device change ignored: {} {:?}", sysname, change),
        },
        Event::DataRead {
            handle,
            retval,
            data,
        } => {
            let Some(ring) = shared.handles.ring(handle) else {
                warn!("Received data for unknown handle #{}", handle);
                return;
            };
            if retval < 0 {
                debug!("Handle #{}: remote read error {}", handle, retval);
                ring.set_error(retval);
                return;
            }
            let written = ring.write(&data);
            if written < data.len() {
                warn!(
                    "Handle #{}: ring buffer full, dropped {} bytes",
                    handle,
                    data.len() - written
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use dvbv5_protocol::{encode_event, encode_reply, DevChangeType, RING_BUFFER_SIZE};

    use crate::client::handles::DeviceHandle;

    fn payload(frame: Bytes) -> Bytes {
        frame.slice(LENGTH_PREFIX_SIZE..)
    }

    fn data_frame(handle: i32, retval: i32, data: &[u8]) -> Bytes {
        payload(
            encode_event(&Event::DataRead {
                handle,
                retval,
                data: Bytes::copy_from_slice(data),
            })
            .unwrap(),
        )
    }

    #[test]
    fn test_data_goes_to_its_own_handle() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        shared.handles.insert(DeviceHandle::new(1, "dvb0.dvr0"));
        shared.handles.insert(DeviceHandle::new(2, "dvb1.dvr0"));
        let call = shared.pending.register(1, "dev_close").unwrap();

        dispatch(&shared, data_frame(1, 188, &[0xAA; 188])).unwrap();

        assert_eq!(shared.handles.ring(1).unwrap().available(), 188);
        assert!(shared.handles.ring(2).unwrap().is_empty());
        // the pending call with seq 1 is untouched
        assert_eq!(shared.pending.len(), 1);

        dispatch(&shared, payload(encode_reply(1, "dev_close", 0, &[]).unwrap())).unwrap();
        assert_eq!(call.wait(None).unwrap().retval, 0);
    }

    #[test]
    fn test_data_for_unknown_handle_is_dropped() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        dispatch(&shared, data_frame(9, 188, &[0x47; 188])).unwrap();
        assert!(!shared.is_disconnected());
    }

    #[test]
    fn test_remote_read_error_is_stored() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        shared.handles.insert(DeviceHandle::new(3, "dvb0.demux0"));

        dispatch(&shared, data_frame(3, -75, &[])).unwrap();
        let ring = shared.handles.ring(3).unwrap();
        assert!(matches!(ring.read(188), Err(ClientError::Remote { .. })));
    }

    #[test]
    fn test_device_change_handler() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        shared.set_dev_change_handler(Some(Arc::new(move |sysname: &str, change: DevChangeType| {
            assert_eq!(sysname, "dvb2.frontend0");
            assert_eq!(change, DevChangeType::Remove);
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let frame = encode_event(&Event::DeviceChange {
            sysname: "dvb2.frontend0".to_string(),
            change: DevChangeType::Remove,
        })
        .unwrap();
        dispatch(&shared, payload(frame)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_handler_keeps_receiver_alive() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        shared.set_dev_change_handler(Some(Arc::new(|_: &str, _: DevChangeType| {
            panic!("handler failure");
        })));
        let call = shared.pending.register(4, "dev_stop_monitor").unwrap();

        let frame = encode_event(&Event::DeviceChange {
            sysname: "dvb0.frontend0".to_string(),
            change: DevChangeType::Add,
        })
        .unwrap();
        assert!(dispatch(&shared, payload(frame)).is_ok());

        dispatch(&shared, payload(encode_reply(4, "dev_stop_monitor", 0, &[]).unwrap())).unwrap();
        assert_eq!(call.wait(None).unwrap().retval, 0);
        assert!(!shared.is_disconnected());
    }

    #[test]
    fn test_unknown_event_is_fatal() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        let frame = encode_reply(0, "dev_reboot", 0, &[]).unwrap();
        assert!(dispatch(&shared, payload(frame)).is_err());
    }

    #[test]
    fn test_unmatched_response_is_not_fatal() {
        let shared = Shared::new(RING_BUFFER_SIZE);
        let frame = encode_reply(77, "dev_open", 3, &[]).unwrap();
        assert!(dispatch(&shared, payload(frame)).is_ok());
    }
}
