//! Message and record definitions for the dvbv5 remote protocol.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Version string the daemon must report during the handshake.
///
/// Protocol evolution is not negotiated: client and daemon have to match.
pub const DAEMON_VERSION: &str = "dvbv5-daemon version 1.1.0";

/// Maximum encoded request size, and maximum size of a single read.
pub const REMOTE_BUF_SIZE: usize = 87 * 188;

/// Largest inbound frame payload accepted from the daemon.
pub const MAX_FRAME_SIZE: usize = REMOTE_BUF_SIZE + 32;

/// Default capacity of a per-handle ring buffer.
pub const RING_BUFFER_SIZE: usize = REMOTE_BUF_SIZE * 32;

/// Number of delivery systems reported in the frontend parameters.
pub const MAX_DELIVERY_SYSTEMS: usize = 20;

/// Number of statistics properties reported by `fe_get_stats`.
pub const DTV_NUM_STATS_PROPS: usize = 13;

/// Number of layers carrying error counters in `fe_get_stats`.
pub const MAX_DTV_STATS: usize = 4;

/// Maximum section filter length accepted by the demux.
pub const DMX_FILTER_SIZE: usize = 16;

/// Sequence number of unsolicited frames.
pub const EVENT_SEQ: i32 = 0;

/// `open()` flags understood by the daemon.
pub mod open_flags {
    pub const O_RDONLY: i32 = 0o0;
    pub const O_WRONLY: i32 = 0o1;
    pub const O_RDWR: i32 = 0o2;
    pub const O_NONBLOCK: i32 = 0o4000;
}

/// Statistics property commands.
pub mod stat_cmd {
    pub const DTV_STAT_SIGNAL_STRENGTH: u32 = 62;
    pub const DTV_STAT_CNR: u32 = 63;
    pub const DTV_STAT_PRE_ERROR_BIT_COUNT: u32 = 64;
    pub const DTV_STAT_PRE_TOTAL_BIT_COUNT: u32 = 65;
    pub const DTV_STAT_POST_ERROR_BIT_COUNT: u32 = 66;
    pub const DTV_STAT_POST_TOTAL_BIT_COUNT: u32 = 67;
    pub const DTV_STAT_ERROR_BLOCK_COUNT: u32 = 68;
    pub const DTV_STAT_TOTAL_BLOCK_COUNT: u32 = 69;
    pub const DTV_STATUS: u32 = 512;
    pub const DTV_BER: u32 = 513;
    pub const DTV_PER: u32 = 514;
    pub const DTV_QUALITY: u32 = 515;
    pub const DTV_PRE_BER: u32 = 516;
}

/// Request commands.
///
/// The wire carries the string name; this enum is the closed set the
/// client is able to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    DaemonGetVersion,
    DevFind,
    DevStopMonitor,
    DevSeekBySysname,
    DevOpen,
    DevClose,
    DevDmxStop,
    DevSetBufsize,
    DevDmxSetPesFilter,
    DevDmxSetSectionFilter,
    DevDmxGetPmtPid,
    DevSetSys,
    FeGetParms,
    FeSetParms,
    FeGetStats,
}

impl Command {
    /// All commands, in daemon method-table order.
    pub const ALL: [Command; 15] = [
        Command::DaemonGetVersion,
        Command::DevFind,
        Command::DevStopMonitor,
        Command::DevSeekBySysname,
        Command::DevOpen,
        Command::DevClose,
        Command::DevDmxStop,
        Command::DevSetBufsize,
        Command::DevDmxSetPesFilter,
        Command::DevDmxSetSectionFilter,
        Command::DevDmxGetPmtPid,
        Command::DevSetSys,
        Command::FeGetParms,
        Command::FeSetParms,
        Command::FeGetStats,
    ];

    /// Wire name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::DaemonGetVersion => "daemon_get_version",
            Command::DevFind => "dev_find",
            Command::DevStopMonitor => "dev_stop_monitor",
            Command::DevSeekBySysname => "dev_seek_by_sysname",
            Command::DevOpen => "dev_open",
            Command::DevClose => "dev_close",
            Command::DevDmxStop => "dev_dmx_stop",
            Command::DevSetBufsize => "dev_set_bufsize",
            Command::DevDmxSetPesFilter => "dev_dmx_set_pesfilter",
            Command::DevDmxSetSectionFilter => "dev_dmx_set_section_filter",
            Command::DevDmxGetPmtPid => "dev_dmx_get_pmt_pid",
            Command::DevSetSys => "dev_set_sys",
            Command::FeGetParms => "fe_get_parms",
            Command::FeSetParms => "fe_set_parms",
            Command::FeGetStats => "fe_get_stats",
        }
    }

    /// Look a command up by its wire name.
    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL.iter().copied().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire names of unsolicited events.
pub mod event_name {
    pub const LOG: &str = "log";
    pub const DEV_CHANGE: &str = "dev_change";
    pub const DATA_READ: &str = "data_read";
}

/// Kind of device change reported by the daemon's monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DevChangeType {
    Add,
    Change,
    Remove,
    /// Value not known to this client.
    Unknown(i32),
}

impl From<i32> for DevChangeType {
    fn from(value: i32) -> Self {
        match value {
            0 => DevChangeType::Add,
            1 => DevChangeType::Change,
            2 => DevChangeType::Remove,
            other => DevChangeType::Unknown(other),
        }
    }
}

impl From<DevChangeType> for i32 {
    fn from(value: DevChangeType) -> Self {
        match value {
            DevChangeType::Add => 0,
            DevChangeType::Change => 1,
            DevChangeType::Remove => 2,
            DevChangeType::Unknown(other) => other,
        }
    }
}

/// An unsolicited frame (sequence number zero), decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Diagnostic line from the daemon, with its syslog level.
    Log { level: i32, message: String },
    /// A device node appeared, changed or disappeared.
    DeviceChange {
        sysname: String,
        change: DevChangeType,
    },
    /// Streamed data for an open demux/DVR handle.
    ///
    /// A negative `retval` is the daemon's read error; `data` is then empty.
    DataRead {
        handle: i32,
        retval: i32,
        data: Bytes,
    },
}

/// Type of a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DeviceType {
    Frontend = 0,
    Demux = 1,
    Dvr = 2,
    Net = 3,
    Ca = 4,
    CaSec = 5,
}

impl DeviceType {
    pub const ALL: [DeviceType; 6] = [
        DeviceType::Frontend,
        DeviceType::Demux,
        DeviceType::Dvr,
        DeviceType::Net,
        DeviceType::Ca,
        DeviceType::CaSec,
    ];

    /// Node name used in sysnames (`dvb0.frontend0`).
    pub fn node_name(self) -> &'static str {
        match self {
            DeviceType::Frontend => "frontend",
            DeviceType::Demux => "demux",
            DeviceType::Dvr => "dvr",
            DeviceType::Net => "net",
            DeviceType::Ca => "ca",
            DeviceType::CaSec => "sec",
        }
    }
}

impl TryFrom<i32> for DeviceType {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            0 => Ok(DeviceType::Frontend),
            1 => Ok(DeviceType::Demux),
            2 => Ok(DeviceType::Dvr),
            3 => Ok(DeviceType::Net),
            4 => Ok(DeviceType::Ca),
            5 => Ok(DeviceType::CaSec),
            _ => Err(value),
        }
    }
}

impl From<DeviceType> for i32 {
    fn from(value: DeviceType) -> Self {
        value as i32
    }
}

/// Device node properties as reported by `dev_seek_by_sysname`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub syspath: String,
    pub path: String,
    pub sysname: String,
    pub device_type: DeviceType,
    /// Bus address, e.g. `usb:3-1.1.4` or `pci:0000:01:00.0`.
    pub bus_addr: String,
    pub bus_id: String,
    pub manufacturer: String,
    pub product: String,
    pub serial: String,
}

/// PES type selector for `dmx_set_pes_filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DmxPesType(pub i32);

impl DmxPesType {
    pub const AUDIO0: DmxPesType = DmxPesType(0);
    pub const VIDEO0: DmxPesType = DmxPesType(1);
    pub const TELETEXT0: DmxPesType = DmxPesType(2);
    pub const SUBTITLE0: DmxPesType = DmxPesType(3);
    pub const PCR0: DmxPesType = DmxPesType(4);
    pub const OTHER: DmxPesType = DmxPesType(20);
}

/// Where the demux delivers filtered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum DmxOutput {
    Decoder = 0,
    Tap = 1,
    TsTap = 2,
    TsDemuxTap = 3,
}

/// Section filter parameters for `dmx_set_section_filter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionFilter {
    pub pid: i32,
    pub filter: Vec<u8>,
    pub mask: Vec<u8>,
    pub mode: Vec<u8>,
    pub flags: u32,
}

/// One `cmd`/`data` property pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DtvProperty {
    pub cmd: u32,
    pub data: u32,
}

/// Static frontend capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrontendInfo {
    pub name: String,
    pub frequency_min: u32,
    pub frequency_max: u32,
    pub frequency_stepsize: u32,
    pub frequency_tolerance: u32,
    pub symbol_rate_min: u32,
    pub symbol_rate_max: u32,
    pub symbol_rate_tolerance: u32,
}

/// Frontend parameters as carried by `fe_get_parms` / `fe_set_parms`.
///
/// The LNB crosses the wire only by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrontendParms {
    pub info: FrontendInfo,
    pub version: u32,
    pub has_v5_stats: bool,
    pub current_sys: i32,
    pub num_systems: i32,
    pub legacy_fe: bool,
    pub abort: i32,
    pub lna: i32,
    pub lnb_name: String,
    pub sat_number: i32,
    pub freq_bpf: u32,
    pub diseqc_wait: u32,
    pub verbose: u32,
    pub default_charset: String,
    pub output_charset: String,
    pub systems: Vec<i32>,
    pub country: i32,
    pub high_band: i32,
    pub freq_offset: u32,
    pub props: Vec<DtvProperty>,
}

impl FrontendParms {
    /// Current value of a tuning property, if present.
    pub fn prop(&self, cmd: u32) -> Option<u32> {
        self.props.iter().find(|p| p.cmd == cmd).map(|p| p.data)
    }

    /// Set a tuning property, replacing any previous value.
    pub fn set_prop(&mut self, cmd: u32, data: u32) {
        match self.props.iter_mut().find(|p| p.cmd == cmd) {
            Some(p) => p.data = data,
            None => self.props.push(DtvProperty { cmd, data }),
        }
    }
}

/// Bit/block error counters for one statistics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorCounters {
    pub pre_bit_count: u64,
    pub pre_bit_error: u64,
    pub post_bit_count: u64,
    pub post_bit_error: u64,
    pub block_count: u64,
    pub block_error: u64,
}

/// Per-layer statistics availability and counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayerStats {
    pub has_post_ber: bool,
    pub has_pre_ber: bool,
    pub has_per: bool,
    pub prev: ErrorCounters,
    pub cur: ErrorCounters,
}

/// Frontend signal statistics as carried by `fe_get_stats`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrontendStats {
    /// `fe_status` bits of the last status read.
    pub status: i32,
    pub props: Vec<DtvProperty>,
    pub layers: Vec<LayerStats>,
}

impl FrontendStats {
    /// Value of a statistics property, if present.
    pub fn prop(&self, cmd: u32) -> Option<u32> {
        self.props.iter().find(|p| p.cmd == cmd).map(|p| p.data)
    }

    /// True if the frontend reports a lock.
    pub fn has_lock(&self) -> bool {
        const FE_HAS_LOCK: i32 = 0x10;
        self.status & FE_HAS_LOCK != 0
    }
}
