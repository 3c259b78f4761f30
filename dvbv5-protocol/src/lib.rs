//! Wire protocol definitions for the dvbv5 remote device daemon.
//!
//! This crate defines the binary protocol spoken between a dvbv5 daemon,
//! which owns the DVB hardware, and remote clients.
//!
//! # Frame Format
//!
//! ```text
//! +--------+--------+--------+----------+--------+-------------+
//! | Length | Seq    | CmdLen | Command  | Retval |  Arguments  |
//! | i32 BE | i32 BE | i32 BE | (CmdLen) | i32 BE | (variable)  |
//! +--------+--------+--------+----------+--------+-------------+
//! ```
//!
//! Requests carry no `Retval`. Frames with sequence number 0 are
//! unsolicited events (`log`, `dev_change`, `data_read`).
//!
//! # Example
//!
//! ```rust
//! use dvbv5_protocol::{decode_fields, decode_frame_length, encode_request, Command, Field, WireWriter};
//!
//! let mut args = WireWriter::new();
//! args.put_str("dvb0.demux0").unwrap().put_i32(0).unwrap();
//! let frame = encode_request(1, Command::DevOpen.as_str(), &args.freeze()).unwrap();
//!
//! let len = decode_frame_length([frame[0], frame[1], frame[2], frame[3]]).unwrap();
//! assert_eq!(len, frame.len() - 4);
//!
//! let (fields, _) = decode_fields("%i%s%s%i", frame.slice(4..)).unwrap();
//! assert_eq!(fields[1], Field::from("dev_open"));
//! ```

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{
    decode_device_info, decode_events, decode_fields, decode_frame_length, decode_frontend_parms,
    decode_frontend_stats, decode_frontend_update, decode_reply, encode_device_info, encode_event,
    encode_fields, encode_frontend_parms, encode_frontend_stats, encode_frontend_update,
    encode_reply, encode_request, parse_format, Field, FieldKind, ReplyHeader, WireReader,
    WireWriter, LENGTH_PREFIX_SIZE,
};
pub use error::{ClientError, ProtocolError, RemoteErrno};
pub use types::{
    event_name, open_flags, stat_cmd, Command, DevChangeType, DeviceInfo, DeviceType, DmxOutput,
    DmxPesType, DtvProperty, ErrorCounters, Event, FrontendInfo, FrontendParms, FrontendStats,
    LayerStats, SectionFilter, DAEMON_VERSION, DMX_FILTER_SIZE, DTV_NUM_STATS_PROPS, EVENT_SEQ,
    MAX_DELIVERY_SYSTEMS, MAX_DTV_STATS, MAX_FRAME_SIZE, REMOTE_BUF_SIZE, RING_BUFFER_SIZE,
};
