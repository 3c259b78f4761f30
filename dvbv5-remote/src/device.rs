//! Typed device operations over a daemon connection.
//!
//! Every operation has the same shape: encode the arguments, run one call,
//! turn a negative retval into [`ClientError::Remote`] and decode whatever
//! the response carries.

use std::sync::Arc;

use bytes::Bytes;
use log::{debug, error, info, warn};
use parking_lot::Mutex;

use dvbv5_protocol::{
    decode_device_info, decode_frontend_parms, decode_frontend_stats, encode_frontend_update,
    ClientError, Command, DevChangeType, DeviceInfo, DeviceType, DmxOutput, DmxPesType,
    FrontendParms, FrontendStats, RemoteErrno, SectionFilter, WireWriter, DMX_FILTER_SIZE,
};

use crate::client::connection::{Connection, DevChangeHandler};
use crate::client::handles::{DeviceHandle, HandleKind};
use crate::client::pending::Reply;
use crate::config::ConnectionConfig;
use crate::lnb::{BuiltinLnbs, LnbCatalog, LnbDescriptor};

const STREAMING: &[HandleKind] = &[HandleKind::Demux, HandleKind::Dvr];
const DEMUX: &[HandleKind] = &[HandleKind::Demux];
const FRONTEND: &[HandleKind] = &[HandleKind::Frontend];

/// Frontend parameters together with the resolved LNB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendSettings {
    pub parms: FrontendParms,
    /// `None` when no LNB is configured or the name is unknown locally.
    pub lnb: Option<LnbDescriptor>,
}

impl FrontendSettings {
    /// The LNB name to send: the descriptor's alias, else the raw name.
    pub fn lnb_name(&self) -> &str {
        match &self.lnb {
            Some(lnb) => lnb.alias,
            None => &self.parms.lnb_name,
        }
    }
}

/// A dvbv5 daemon seen as a set of DVB devices.
pub struct RemoteDevice {
    conn: Connection,
    lnbs: Box<dyn LnbCatalog>,
    frontend: Mutex<Option<FrontendSettings>>,
}

impl RemoteDevice {
    /// Connect to the daemon named in `config`.
    pub fn connect(config: ConnectionConfig) -> Result<Self, ClientError> {
        Ok(Self::with_connection(Connection::connect(config)?))
    }

    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            lnbs: Box::new(BuiltinLnbs),
            frontend: Mutex::new(None),
        }
    }

    /// Use another LNB catalog for frontend parameter translation.
    pub fn with_lnb_catalog(mut self, lnbs: impl LnbCatalog + 'static) -> Self {
        self.lnbs = Box::new(lnbs);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_connected()
    }

    /// Run one call and reject negative retvals.
    fn call_checked(&self, command: Command, args: Bytes) -> Result<Reply, ClientError> {
        let reply = self.conn.call(command, args)?;
        if reply.retval < 0 {
            return Err(ClientError::Remote {
                command: command.as_str().to_string(),
                code: RemoteErrno::from_retval(reply.retval),
            });
        }
        Ok(reply)
    }

    /// Calls whose only result is the retval.
    fn call_ints(&self, command: Command, args: &[i32]) -> Result<i32, ClientError> {
        let mut w = WireWriter::new();
        for arg in args {
            w.put_i32(*arg)?;
        }
        Ok(self.call_checked(command, w.freeze())?.retval)
    }

    fn check_handle(
        &self,
        handle: &DeviceHandle,
        operation: &'static str,
        allowed: &[HandleKind],
    ) -> Result<(), ClientError> {
        if !self.conn.is_connected() {
            return Err(ClientError::Disconnected);
        }
        if !self.conn.shared().handles.contains(handle.id()) {
            return Err(ClientError::UnknownHandle(handle.id()));
        }
        handle.require(operation, allowed)
    }

    /// Start device discovery on the daemon.
    ///
    /// With a handler, the daemon also monitors hotplug and every
    /// `dev_change` event is passed to it on the receiver thread.
    pub fn find(&self, handler: Option<DevChangeHandler>) -> Result<i32, ClientError> {
        let enable_monitor = handler.is_some();
        self.conn.set_dev_change_handler(handler);

        match self.call_ints(Command::DevFind, &[i32::from(enable_monitor)]) {
            Ok(retval) => Ok(retval),
            Err(e) => {
                self.conn.set_dev_change_handler(None);
                Err(e)
            }
        }
    }

    pub fn stop_monitor(&self) -> Result<i32, ClientError> {
        let retval = self.call_checked(Command::DevStopMonitor, Bytes::new())?.retval;
        self.conn.set_dev_change_handler(None);
        Ok(retval)
    }

    /// Look up `dvb<adapter>.<type><num>` on the daemon.
    pub fn seek_by_sysname(
        &self,
        adapter: u32,
        num: u32,
        device_type: DeviceType,
    ) -> Result<Option<DeviceInfo>, ClientError> {
        let mut w = WireWriter::new();
        w.put_u32(adapter)?.put_u32(num)?.put_i32(device_type.into())?;

        let reply = self.conn.call(Command::DevSeekBySysname, w.freeze())?;
        if reply.retval < 0 {
            debug!(
                "dvb{}.{}{}: {}",
                adapter,
                device_type.node_name(),
                num,
                RemoteErrno::from_retval(reply.retval)
            );
            return Ok(None);
        }
        Ok(decode_device_info(reply.payload)?)
    }

    /// List every device node, adapter by adapter.
    ///
    /// Stops at the first adapter with no nodes at all.
    pub fn enumerate_devices(&self) -> Result<Vec<DeviceInfo>, ClientError> {
        let mut devices = Vec::new();

        for adapter in 0.. {
            let before = devices.len();
            for device_type in DeviceType::ALL {
                for num in 0.. {
                    match self.seek_by_sysname(adapter, num, device_type)? {
                        Some(info) => devices.push(info),
                        None => break,
                    }
                }
            }
            if devices.len() == before {
                break;
            }
        }

        debug!("Found {} device nodes", devices.len());
        Ok(devices)
    }

    /// Open a device node. Opening a frontend also fetches its parameters.
    pub fn open(&self, sysname: &str, flags: i32) -> Result<DeviceHandle, ClientError> {
        let mut w = WireWriter::new();
        w.put_str(sysname)?.put_i32(flags)?;

        let id = self.call_checked(Command::DevOpen, w.freeze())?.retval;
        let handle = DeviceHandle::new(id, sysname);
        self.conn.shared().handles.insert(handle.clone());
        info!("Opened {} as handle #{}", sysname, id);

        if handle.kind() == HandleKind::Frontend {
            if let Err(e) = self.fe_get_parms(&handle) {
                warn!("{}: can't read frontend parameters: {}", sysname, e);
            }
        }
        Ok(handle)
    }

    /// Close a handle. Local state is released even if the daemon fails.
    pub fn close(&self, handle: &DeviceHandle) -> Result<i32, ClientError> {
        let result = self.call_ints(Command::DevClose, &[handle.id()]);

        if self.conn.shared().handles.remove(handle.id()).is_none() {
            error!("Handle #{} was not open", handle.id());
        }
        if handle.kind() == HandleKind::Frontend {
            self.frontend.lock().take();
        }
        result
    }

    pub fn dmx_stop(&self, handle: &DeviceHandle) -> Result<i32, ClientError> {
        self.check_handle(handle, "dmx_stop", STREAMING)?;
        let retval = self.call_ints(Command::DevDmxStop, &[handle.id()])?;
        if let Some(ring) = self.conn.shared().handles.ring(handle.id()) {
            ring.clear();
        }
        Ok(retval)
    }

    pub fn set_bufsize(&self, handle: &DeviceHandle, size: i32) -> Result<i32, ClientError> {
        self.check_handle(handle, "set_bufsize", STREAMING)?;
        self.call_ints(Command::DevSetBufsize, &[handle.id(), size])
    }

    /// Read streamed data for a demux or DVR handle.
    ///
    /// Blocks until `min(max_len, REMOTE_BUF_SIZE)` bytes have arrived.
    pub fn read(&self, handle: &DeviceHandle, max_len: usize) -> Result<Bytes, ClientError> {
        self.check_handle(handle, "read", STREAMING)?;
        let ring = self
            .conn
            .shared()
            .handles
            .ring(handle.id())
            .ok_or(ClientError::UnknownHandle(handle.id()))?;
        ring.read(max_len)
    }

    pub fn dmx_set_pes_filter(
        &self,
        handle: &DeviceHandle,
        pid: i32,
        pes_type: DmxPesType,
        output: DmxOutput,
        bufsize: i32,
    ) -> Result<i32, ClientError> {
        self.check_handle(handle, "dmx_set_pes_filter", DEMUX)?;
        self.call_ints(
            Command::DevDmxSetPesFilter,
            &[handle.id(), pid, pes_type.0, output as i32, bufsize],
        )
    }

    pub fn dmx_set_section_filter(
        &self,
        handle: &DeviceHandle,
        filter: &SectionFilter,
    ) -> Result<i32, ClientError> {
        self.check_handle(handle, "dmx_set_section_filter", DEMUX)?;

        let size = filter.filter.len();
        if size > DMX_FILTER_SIZE {
            return Err(ClientError::InvalidArgument(format!(
                "section filter of {} bytes, max {}",
                size, DMX_FILTER_SIZE
            )));
        }
        if filter.mask.len() != size || filter.mode.len() != size {
            return Err(ClientError::InvalidArgument(format!(
                "filter/mask/mode lengths differ: {}/{}/{}",
                size,
                filter.mask.len(),
                filter.mode.len()
            )));
        }

        let mut w = WireWriter::new();
        w.put_i32(handle.id())?
            .put_i32(filter.pid)?
            .put_i32(size as i32)?
            .put_blob(&filter.filter)?
            .put_blob(&filter.mask)?
            .put_blob(&filter.mode)?
            .put_u32(filter.flags)?;
        Ok(self.call_checked(Command::DevDmxSetSectionFilter, w.freeze())?.retval)
    }

    /// PMT PID of service `sid`, as found by the daemon's demux.
    pub fn dmx_get_pmt_pid(&self, handle: &DeviceHandle, sid: i32) -> Result<i32, ClientError> {
        self.check_handle(handle, "dmx_get_pmt_pid", DEMUX)?;
        self.call_ints(Command::DevDmxGetPmtPid, &[handle.id(), sid])
    }

    pub fn fe_set_sys(&self, handle: &DeviceHandle, sys: i32) -> Result<i32, ClientError> {
        self.check_handle(handle, "fe_set_sys", FRONTEND)?;
        let retval = self.call_ints(Command::DevSetSys, &[sys])?;
        if let Some(settings) = self.frontend.lock().as_mut() {
            settings.parms.current_sys = sys;
        }
        Ok(retval)
    }

    /// Fetch the frontend parameters and resolve their LNB.
    pub fn fe_get_parms(&self, handle: &DeviceHandle) -> Result<FrontendSettings, ClientError> {
        self.check_handle(handle, "fe_get_parms", FRONTEND)?;
        let reply = self.call_checked(Command::FeGetParms, Bytes::new())?;
        let parms = decode_frontend_parms(reply.payload)?;

        let lnb = if parms.lnb_name.is_empty() {
            None
        } else {
            let found = self.lnbs.lookup(&parms.lnb_name);
            if found.is_none() {
                error!("Invalid LNBf: {}", parms.lnb_name);
            }
            found
        };

        let settings = FrontendSettings { parms, lnb };
        *self.frontend.lock() = Some(settings.clone());
        Ok(settings)
    }

    /// Push the writable frontend parameters and properties.
    pub fn fe_set_parms(
        &self,
        handle: &DeviceHandle,
        settings: &FrontendSettings,
    ) -> Result<i32, ClientError> {
        self.check_handle(handle, "fe_set_parms", FRONTEND)?;
        let args = encode_frontend_update(&settings.parms, settings.lnb_name())?;
        let retval = self.call_checked(Command::FeSetParms, args)?.retval;
        *self.frontend.lock() = Some(settings.clone());
        Ok(retval)
    }

    pub fn fe_get_stats(&self, handle: &DeviceHandle) -> Result<FrontendStats, ClientError> {
        self.check_handle(handle, "fe_get_stats", FRONTEND)?;
        let reply = self.call_checked(Command::FeGetStats, Bytes::new())?;
        Ok(decode_frontend_stats(reply.payload)?)
    }

    /// Frontend parameters as last read or written.
    pub fn cached_frontend(&self) -> Option<FrontendSettings> {
        self.frontend.lock().clone()
    }

    /// Close the connection. Blocked callers fail with `Disconnected`.
    pub fn shutdown(&self) {
        self.conn.shutdown();
        self.frontend.lock().take();
    }
}

/// Convenience for handlers built from closures.
pub fn dev_change_handler<F>(f: F) -> DevChangeHandler
where
    F: Fn(&str, DevChangeType) + Send + Sync + 'static,
{
    Arc::new(f)
}
