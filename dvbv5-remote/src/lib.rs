//! dvbv5-remote - client for the dvbv5 remote device daemon.
//!
//! A [`RemoteDevice`] talks to a `dvbv5-daemon` over one TCP connection and
//! exposes its DVB frontends, demuxes and DVR nodes as if they were local.
//! Calls are synchronous and may be issued from any number of threads;
//! streamed data for each open demux or DVR handle is buffered locally and
//! drained with [`RemoteDevice::read`].
//!
//! ```no_run
//! use dvbv5_remote::{config, RemoteDevice};
//! use dvbv5_protocol::open_flags;
//!
//! dvbv5_remote::logging::init();
//! let device = RemoteDevice::connect(config::load_config())?;
//! let dvr = device.open("dvb0.dvr0", open_flags::O_RDONLY)?;
//! let packets = device.read(&dvr, 188 * 87)?;
//! # Ok::<(), dvbv5_protocol::ClientError>(())
//! ```

pub mod client;
pub mod config;
pub mod device;
pub mod lnb;
#[macro_use]
pub mod logging;

#[cfg(test)]
mod testing;

pub use client::{Connection, DevChangeHandler, DeviceHandle, HandleKind};
pub use config::ConnectionConfig;
pub use device::{dev_change_handler, FrontendSettings, RemoteDevice};
pub use lnb::{builtin_lnbs, find_lnb, BuiltinLnbs, LnbCatalog, LnbDescriptor};
