//! Codec for encoding and decoding dvbv5 remote frames.
//!
//! Frame format:
//! ```text
//! +--------+--------+--------+----------+--------+-------------+
//! | Length | Seq    | CmdLen | Command  | Retval |  Arguments  |
//! | i32 BE | i32 BE | i32 BE | (CmdLen) | i32 BE | (variable)  |
//! +--------+--------+--------+----------+--------+-------------+
//! ```
//! `Retval` is only present in daemon-to-client frames. Arguments are a
//! sequence of fields described by a format string: `%s` (i32 length then
//! bytes), `%i` (i32) and `%lu` (u64), all big-endian.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::ProtocolError;
use crate::types::*;

/// Size of the length prefix in front of every frame.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Kind of a single wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `%s`: length-prefixed byte string.
    Str,
    /// `%i`: 32-bit signed integer.
    Int,
    /// `%lu`: 64-bit unsigned integer.
    Long,
}

/// A decoded (or to-be-encoded) wire field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Str(String),
    Int(i32),
    Long(u64),
}

impl Field {
    pub fn kind(&self) -> FieldKind {
        match self {
            Field::Str(_) => FieldKind::Str,
            Field::Int(_) => FieldKind::Int,
            Field::Long(_) => FieldKind::Long,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Field::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<u64> {
        match self {
            Field::Long(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Str(value.to_string())
    }
}

impl From<String> for Field {
    fn from(value: String) -> Self {
        Field::Str(value)
    }
}

impl From<i32> for Field {
    fn from(value: i32) -> Self {
        Field::Int(value)
    }
}

impl From<u64> for Field {
    fn from(value: u64) -> Self {
        Field::Long(value)
    }
}

/// Parse a format string such as `"%i%s%lu"` into field kinds.
pub fn parse_format(format: &str) -> Result<Vec<FieldKind>, ProtocolError> {
    let mut kinds = Vec::new();
    let mut rest = format;

    while !rest.is_empty() {
        let tag = rest
            .strip_prefix('%')
            .ok_or_else(|| ProtocolError::InvalidFormat(rest.to_string()))?;

        if let Some(tail) = tag.strip_prefix("lu") {
            kinds.push(FieldKind::Long);
            rest = tail;
        } else if let Some(tail) = tag.strip_prefix('i') {
            kinds.push(FieldKind::Int);
            rest = tail;
        } else if let Some(tail) = tag.strip_prefix('s') {
            kinds.push(FieldKind::Str);
            rest = tail;
        } else {
            return Err(ProtocolError::InvalidFormat(rest.to_string()));
        }
    }

    Ok(kinds)
}

/// Bounded big-endian field writer.
///
/// Every `put_*` either appends the whole field or fails with
/// `BufferTooSmall` and leaves the buffer untouched.
#[derive(Debug)]
pub struct WireWriter {
    buf: BytesMut,
    limit: usize,
}

impl WireWriter {
    /// Writer bounded by `REMOTE_BUF_SIZE`.
    pub fn new() -> Self {
        Self::with_limit(REMOTE_BUF_SIZE)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(limit.min(REMOTE_BUF_SIZE)),
            limit,
        }
    }

    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        let available = self.limit.saturating_sub(self.buf.len());
        if needed > available {
            return Err(ProtocolError::BufferTooSmall { needed, available });
        }
        Ok(())
    }

    pub fn put_i32(&mut self, value: i32) -> Result<&mut Self, ProtocolError> {
        self.ensure(4)?;
        self.buf.put_i32(value);
        Ok(self)
    }

    /// Unsigned values travel in an `%i` slot, bit for bit.
    pub fn put_u32(&mut self, value: u32) -> Result<&mut Self, ProtocolError> {
        self.ensure(4)?;
        self.buf.put_u32(value);
        Ok(self)
    }

    pub fn put_bool(&mut self, value: bool) -> Result<&mut Self, ProtocolError> {
        self.put_i32(i32::from(value))
    }

    pub fn put_u64(&mut self, value: u64) -> Result<&mut Self, ProtocolError> {
        self.ensure(8)?;
        self.buf.put_u64(value);
        Ok(self)
    }

    /// Length-prefixed byte string (`%s`).
    pub fn put_blob(&mut self, data: &[u8]) -> Result<&mut Self, ProtocolError> {
        let len = i32::try_from(data.len()).map_err(|_| ProtocolError::BufferTooSmall {
            needed: data.len(),
            available: i32::MAX as usize,
        })?;
        self.ensure(4 + data.len())?;
        self.buf.put_i32(len);
        self.buf.put_slice(data);
        Ok(self)
    }

    pub fn put_str(&mut self, value: &str) -> Result<&mut Self, ProtocolError> {
        self.put_blob(value.as_bytes())
    }

    /// Raw bytes with no length prefix.
    pub fn put_raw(&mut self, data: &[u8]) -> Result<&mut Self, ProtocolError> {
        self.ensure(data.len())?;
        self.buf.put_slice(data);
        Ok(self)
    }

    pub fn put_field(&mut self, field: &Field) -> Result<&mut Self, ProtocolError> {
        match field {
            Field::Str(s) => self.put_str(s),
            Field::Int(v) => self.put_i32(*v),
            Field::Long(v) => self.put_u64(*v),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Big-endian field reader over a received payload.
///
/// A failed `get_*` never consumes input.
#[derive(Debug, Clone)]
pub struct WireReader {
    buf: Bytes,
}

impl WireReader {
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn need(&self, expected: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() < expected {
            return Err(ProtocolError::Truncated {
                expected,
                actual: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn get_i32(&mut self) -> Result<i32, ProtocolError> {
        self.need(4)?;
        Ok(self.buf.get_i32())
    }

    pub fn get_u32(&mut self) -> Result<u32, ProtocolError> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn get_bool(&mut self) -> Result<bool, ProtocolError> {
        Ok(self.get_i32()? != 0)
    }

    pub fn get_u64(&mut self) -> Result<u64, ProtocolError> {
        self.need(8)?;
        Ok(self.buf.get_u64())
    }

    /// Length-prefixed byte string (`%s`).
    pub fn get_blob(&mut self) -> Result<Bytes, ProtocolError> {
        self.need(4)?;
        let mut prefix = &self.buf[..4];
        let len = prefix.get_i32();
        if len < 0 {
            return Err(ProtocolError::NegativeLength(len));
        }
        let len = len as usize;
        self.need(4 + len)?;
        self.buf.advance(4);
        Ok(self.buf.split_to(len))
    }

    pub fn get_str(&mut self) -> Result<String, ProtocolError> {
        let mut probe = self.clone();
        let bytes = probe.get_blob()?;
        let s = String::from_utf8(bytes.to_vec())
            .map_err(|e| ProtocolError::InvalidUtf8(e.to_string()))?;
        *self = probe;
        Ok(s)
    }

    pub fn get_field(&mut self, kind: FieldKind) -> Result<Field, ProtocolError> {
        match kind {
            FieldKind::Str => self.get_str().map(Field::Str),
            FieldKind::Int => self.get_i32().map(Field::Int),
            FieldKind::Long => self.get_u64().map(Field::Long),
        }
    }

    /// Decode a run of fields; on failure nothing is consumed.
    pub fn get_fields(&mut self, kinds: &[FieldKind]) -> Result<Vec<Field>, ProtocolError> {
        let mut probe = self.clone();
        let fields = kinds
            .iter()
            .map(|kind| probe.get_field(*kind))
            .collect::<Result<Vec<_>, _>>()?;
        *self = probe;
        Ok(fields)
    }

    /// Everything not consumed yet.
    pub fn into_remaining(self) -> Bytes {
        self.buf
    }
}

/// Encode `fields` according to `format`, bounded by `REMOTE_BUF_SIZE`.
pub fn encode_fields(format: &str, fields: &[Field]) -> Result<Bytes, ProtocolError> {
    let kinds = parse_format(format)?;
    if kinds.len() != fields.len() {
        return Err(ProtocolError::InvalidFormat(format!(
            "{} expects {} fields, got {}",
            format,
            kinds.len(),
            fields.len()
        )));
    }

    let mut writer = WireWriter::new();
    for (kind, field) in kinds.iter().zip(fields) {
        if *kind != field.kind() {
            return Err(ProtocolError::InvalidFormat(format!(
                "{}: {:?} does not match {:?}",
                format,
                field,
                kind
            )));
        }
        writer.put_field(field)?;
    }
    Ok(writer.freeze())
}

/// Decode the fields named by `format` from the front of `buf`.
///
/// Returns the fields and the unconsumed tail.
pub fn decode_fields(format: &str, buf: Bytes) -> Result<(Vec<Field>, Bytes), ProtocolError> {
    let kinds = parse_format(format)?;
    let mut reader = WireReader::new(buf);
    let fields = reader.get_fields(&kinds)?;
    Ok((fields, reader.into_remaining()))
}

fn frame(payload: Bytes) -> Bytes {
    let mut out = BytesMut::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    out.put_i32(payload.len() as i32);
    out.put_slice(&payload);
    out.freeze()
}

/// Encode a client request frame, length prefix included.
///
/// The payload (sequence number, command and arguments) must fit in
/// `REMOTE_BUF_SIZE`.
pub fn encode_request(seq: i32, command: &str, args: &[u8]) -> Result<Bytes, ProtocolError> {
    let mut writer = WireWriter::new();
    writer.put_i32(seq)?.put_str(command)?.put_raw(args)?;
    Ok(frame(writer.freeze()))
}

/// Encode a daemon frame (response or event), length prefix included.
pub fn encode_reply(
    seq: i32,
    command: &str,
    retval: i32,
    body: &[u8],
) -> Result<Bytes, ProtocolError> {
    let mut writer = WireWriter::with_limit(MAX_FRAME_SIZE);
    writer
        .put_i32(seq)?
        .put_str(command)?
        .put_i32(retval)?
        .put_raw(body)?;
    Ok(frame(writer.freeze()))
}

/// Validate a length prefix and return the payload size.
pub fn decode_frame_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> Result<usize, ProtocolError> {
    let len = i32::from_be_bytes(prefix);
    if len < 0 {
        return Err(ProtocolError::NegativeLength(len));
    }
    let len = len as usize;
    if len > MAX_FRAME_SIZE {
        return Err(ProtocolError::FrameTooLarge(len, MAX_FRAME_SIZE));
    }
    Ok(len)
}

/// Header of a daemon-to-client frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyHeader {
    pub seq: i32,
    pub command: String,
    pub retval: i32,
}

impl ReplyHeader {
    pub fn is_event(&self) -> bool {
        self.seq == EVENT_SEQ
    }
}

fn read_reply_header(reader: &mut WireReader) -> Result<ReplyHeader, ProtocolError> {
    let mut probe = reader.clone();
    let seq = probe.get_i32()?;
    let command = probe.get_str()?;
    let retval = probe.get_i32()?;
    *reader = probe;
    Ok(ReplyHeader {
        seq,
        command,
        retval,
    })
}

/// Split a daemon frame payload into its header and argument bytes.
pub fn decode_reply(payload: Bytes) -> Result<(ReplyHeader, Bytes), ProtocolError> {
    let mut reader = WireReader::new(payload);
    let header = read_reply_header(&mut reader)?;
    Ok((header, reader.into_remaining()))
}

/// Decode the records of an unsolicited frame.
///
/// `log` and `dev_change` records may be chained, each with its own header;
/// `data_read` takes the rest of the frame.
pub fn decode_events(header: ReplyHeader, body: Bytes) -> Result<Vec<Event>, ProtocolError> {
    let mut events = Vec::new();
    let mut header = header;
    let mut reader = WireReader::new(body);

    loop {
        if !header.is_event() {
            return Err(ProtocolError::EmbeddedResponse(header.seq));
        }

        match header.command.as_str() {
            event_name::LOG => {
                let message = reader.get_str()?;
                events.push(Event::Log {
                    level: header.retval,
                    message,
                });
            }
            event_name::DEV_CHANGE => {
                let sysname = reader.get_str()?;
                events.push(Event::DeviceChange {
                    sysname,
                    change: DevChangeType::from(header.retval),
                });
            }
            event_name::DATA_READ => {
                let handle = reader.get_i32()?;
                let data = reader.into_remaining();
                events.push(Event::DataRead {
                    handle,
                    retval: header.retval,
                    data,
                });
                return Ok(events);
            }
            other => return Err(ProtocolError::UnknownEvent(other.to_string())),
        }

        if reader.is_empty() {
            return Ok(events);
        }
        header = read_reply_header(&mut reader)?;
    }
}

/// Encode an unsolicited frame for `event`.
pub fn encode_event(event: &Event) -> Result<Bytes, ProtocolError> {
    let mut body = WireWriter::with_limit(MAX_FRAME_SIZE);
    let (name, retval) = match event {
        Event::Log { level, message } => {
            body.put_str(message)?;
            (event_name::LOG, *level)
        }
        Event::DeviceChange { sysname, change } => {
            body.put_str(sysname)?;
            (event_name::DEV_CHANGE, i32::from(*change))
        }
        Event::DataRead {
            handle,
            retval,
            data,
        } => {
            body.put_i32(*handle)?.put_raw(data)?;
            (event_name::DATA_READ, *retval)
        }
    };
    encode_reply(EVENT_SEQ, name, retval, &body.freeze())
}

/// Decode a `dev_seek_by_sysname` response body.
///
/// An empty body or an empty syspath means no such device.
pub fn decode_device_info(body: Bytes) -> Result<Option<DeviceInfo>, ProtocolError> {
    if body.is_empty() {
        return Ok(None);
    }

    let mut reader = WireReader::new(body);
    let syspath = reader.get_str()?;
    let path = reader.get_str()?;
    let sysname = reader.get_str()?;
    let raw_type = reader.get_i32()?;
    let bus_addr = reader.get_str()?;
    let bus_id = reader.get_str()?;
    let manufacturer = reader.get_str()?;
    let product = reader.get_str()?;
    let serial = reader.get_str()?;

    if syspath.is_empty() {
        return Ok(None);
    }

    let device_type = DeviceType::try_from(raw_type)
        .map_err(|v| ProtocolError::InvalidFormat(format!("device type {}", v)))?;

    Ok(Some(DeviceInfo {
        syspath,
        path,
        sysname,
        device_type,
        bus_addr,
        bus_id,
        manufacturer,
        product,
        serial,
    }))
}

pub fn encode_device_info(info: &DeviceInfo) -> Result<Bytes, ProtocolError> {
    let mut w = WireWriter::new();
    w.put_str(&info.syspath)?
        .put_str(&info.path)?
        .put_str(&info.sysname)?
        .put_i32(info.device_type.into())?
        .put_str(&info.bus_addr)?
        .put_str(&info.bus_id)?
        .put_str(&info.manufacturer)?
        .put_str(&info.product)?
        .put_str(&info.serial)?;
    Ok(w.freeze())
}

/// Decode an `fe_get_parms` response body.
pub fn decode_frontend_parms(body: Bytes) -> Result<FrontendParms, ProtocolError> {
    let mut r = WireReader::new(body);

    let info = FrontendInfo {
        name: r.get_str()?,
        frequency_min: r.get_u32()?,
        frequency_max: r.get_u32()?,
        frequency_stepsize: r.get_u32()?,
        frequency_tolerance: r.get_u32()?,
        symbol_rate_min: r.get_u32()?,
        symbol_rate_max: r.get_u32()?,
        symbol_rate_tolerance: r.get_u32()?,
    };

    let version = r.get_u32()?;
    let has_v5_stats = r.get_bool()?;
    let current_sys = r.get_i32()?;
    let num_systems = r.get_i32()?;
    let legacy_fe = r.get_bool()?;
    let abort = r.get_i32()?;
    let lna = r.get_i32()?;
    let lnb_name = r.get_str()?;
    let sat_number = r.get_i32()?;
    let freq_bpf = r.get_u32()?;
    let diseqc_wait = r.get_u32()?;
    let verbose = r.get_u32()?;
    let default_charset = r.get_str()?;
    let output_charset = r.get_str()?;

    let systems = (0..MAX_DELIVERY_SYSTEMS)
        .map(|_| r.get_i32())
        .collect::<Result<Vec<_>, _>>()?;

    let n_props = r.get_i32()?;
    if n_props < 0 {
        return Err(ProtocolError::NegativeLength(n_props));
    }
    let country = r.get_i32()?;
    let high_band = r.get_i32()?;
    let freq_offset = r.get_u32()?;

    let mut props = Vec::with_capacity((n_props as usize).min(r.remaining() / 8));
    for _ in 0..n_props {
        props.push(DtvProperty {
            cmd: r.get_u32()?,
            data: r.get_u32()?,
        });
    }

    Ok(FrontendParms {
        info,
        version,
        has_v5_stats,
        current_sys,
        num_systems,
        legacy_fe,
        abort,
        lna,
        lnb_name,
        sat_number,
        freq_bpf,
        diseqc_wait,
        verbose,
        default_charset,
        output_charset,
        systems,
        country,
        high_band,
        freq_offset,
        props,
    })
}

pub fn encode_frontend_parms(parms: &FrontendParms) -> Result<Bytes, ProtocolError> {
    let mut w = WireWriter::new();
    let info = &parms.info;
    w.put_str(&info.name)?
        .put_u32(info.frequency_min)?
        .put_u32(info.frequency_max)?
        .put_u32(info.frequency_stepsize)?
        .put_u32(info.frequency_tolerance)?
        .put_u32(info.symbol_rate_min)?
        .put_u32(info.symbol_rate_max)?
        .put_u32(info.symbol_rate_tolerance)?;

    w.put_u32(parms.version)?
        .put_bool(parms.has_v5_stats)?
        .put_i32(parms.current_sys)?
        .put_i32(parms.num_systems)?
        .put_bool(parms.legacy_fe)?
        .put_i32(parms.abort)?
        .put_i32(parms.lna)?
        .put_str(&parms.lnb_name)?
        .put_i32(parms.sat_number)?
        .put_u32(parms.freq_bpf)?
        .put_u32(parms.diseqc_wait)?
        .put_u32(parms.verbose)?
        .put_str(&parms.default_charset)?
        .put_str(&parms.output_charset)?;

    for i in 0..MAX_DELIVERY_SYSTEMS {
        w.put_i32(parms.systems.get(i).copied().unwrap_or(0))?;
    }

    w.put_i32(parms.props.len() as i32)?
        .put_i32(parms.country)?
        .put_i32(parms.high_band)?
        .put_u32(parms.freq_offset)?;
    for prop in &parms.props {
        w.put_u32(prop.cmd)?.put_u32(prop.data)?;
    }

    Ok(w.freeze())
}

/// Encode the writable subset of `parms` for `fe_set_parms`.
///
/// `lnb_name` is what goes on the wire, usually an LNB alias.
pub fn encode_frontend_update(parms: &FrontendParms, lnb_name: &str) -> Result<Bytes, ProtocolError> {
    let mut w = WireWriter::new();
    w.put_i32(parms.abort)?
        .put_i32(parms.lna)?
        .put_str(lnb_name)?
        .put_i32(parms.sat_number)?
        .put_u32(parms.freq_bpf)?
        .put_u32(parms.diseqc_wait)?
        .put_u32(parms.verbose)?
        .put_str(&parms.default_charset)?
        .put_str(&parms.output_charset)?
        .put_i32(parms.country)?;
    for prop in &parms.props {
        w.put_u32(prop.cmd)?.put_u32(prop.data)?;
    }
    Ok(w.freeze())
}

/// Decode an `fe_set_parms` request body into a copy of `base`.
pub fn decode_frontend_update(base: &FrontendParms, args: Bytes) -> Result<FrontendParms, ProtocolError> {
    let mut r = WireReader::new(args);
    let mut parms = base.clone();

    parms.abort = r.get_i32()?;
    parms.lna = r.get_i32()?;
    parms.lnb_name = r.get_str()?;
    parms.sat_number = r.get_i32()?;
    parms.freq_bpf = r.get_u32()?;
    parms.diseqc_wait = r.get_u32()?;
    parms.verbose = r.get_u32()?;
    parms.default_charset = r.get_str()?;
    parms.output_charset = r.get_str()?;
    parms.country = r.get_i32()?;

    parms.props.clear();
    while !r.is_empty() {
        parms.props.push(DtvProperty {
            cmd: r.get_u32()?,
            data: r.get_u32()?,
        });
    }

    Ok(parms)
}

fn read_counters(r: &mut WireReader) -> Result<ErrorCounters, ProtocolError> {
    Ok(ErrorCounters {
        pre_bit_count: r.get_u64()?,
        pre_bit_error: r.get_u64()?,
        post_bit_count: r.get_u64()?,
        post_bit_error: r.get_u64()?,
        block_count: r.get_u64()?,
        block_error: r.get_u64()?,
    })
}

fn write_counters(w: &mut WireWriter, c: &ErrorCounters) -> Result<(), ProtocolError> {
    w.put_u64(c.pre_bit_count)?
        .put_u64(c.pre_bit_error)?
        .put_u64(c.post_bit_count)?
        .put_u64(c.post_bit_error)?
        .put_u64(c.block_count)?
        .put_u64(c.block_error)?;
    Ok(())
}

/// Decode an `fe_get_stats` response body.
pub fn decode_frontend_stats(body: Bytes) -> Result<FrontendStats, ProtocolError> {
    let mut r = WireReader::new(body);
    let status = r.get_i32()?;

    let mut props = Vec::with_capacity(DTV_NUM_STATS_PROPS);
    for _ in 0..DTV_NUM_STATS_PROPS {
        props.push(DtvProperty {
            cmd: r.get_u32()?,
            data: r.get_u32()?,
        });
    }

    let mut layers = Vec::with_capacity(MAX_DTV_STATS);
    for _ in 0..MAX_DTV_STATS {
        let has_post_ber = r.get_bool()?;
        let has_pre_ber = r.get_bool()?;
        let has_per = r.get_bool()?;
        let prev = read_counters(&mut r)?;
        let cur = read_counters(&mut r)?;
        layers.push(LayerStats {
            has_post_ber,
            has_pre_ber,
            has_per,
            prev,
            cur,
        });
    }

    Ok(FrontendStats {
        status,
        props,
        layers,
    })
}

pub fn encode_frontend_stats(stats: &FrontendStats) -> Result<Bytes, ProtocolError> {
    let mut w = WireWriter::new();
    w.put_i32(stats.status)?;

    let empty = DtvProperty::default();
    for i in 0..DTV_NUM_STATS_PROPS {
        let prop = stats.props.get(i).unwrap_or(&empty);
        w.put_u32(prop.cmd)?.put_u32(prop.data)?;
    }

    let blank = LayerStats::default();
    for i in 0..MAX_DTV_STATS {
        let layer = stats.layers.get(i).unwrap_or(&blank);
        w.put_bool(layer.has_post_ber)?
            .put_bool(layer.has_pre_ber)?
            .put_bool(layer.has_per)?;
        write_counters(&mut w, &layer.prev)?;
        write_counters(&mut w, &layer.cur)?;
    }

    Ok(w.freeze())
}
