//! Logging setup.
//!
//! Diagnostics go through the `log` facade. Connection lifecycle events are
//! also mirrored to an optional timestamped log file, and daemon-side log
//! lines are re-emitted under the `dvbv5_daemon` target.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use log::Level;
use once_cell::sync::OnceCell;

/// Target of log records forwarded from the daemon.
pub const DAEMON_TARGET: &str = "dvbv5_daemon";

/// Global log file handle.
static LOG_FILE: OnceCell<Mutex<File>> = OnceCell::new();

/// Install `env_logger` as the `log` backend. Safe to call more than once.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Open (append) the file mirror used by `file_log!`.
///
/// Only the first successful call has an effect.
pub fn init_file_logger(path: &Path) -> bool {
    if LOG_FILE.get().is_some() {
        return true;
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let _ = LOG_FILE.set(Mutex::new(file));

            log_message("========================================");
            log_message("dvbv5-remote log started");
            log_message(&format!("Log file: {:?}", path));
            log_message("========================================");
            true
        }
        Err(e) => {
            log::warn!("Cannot open log file {:?}: {}", path, e);
            false
        }
    }
}

/// Log a message to the file.
pub fn log_message(msg: &str) {
    if let Some(file_mutex) = LOG_FILE.get() {
        if let Ok(mut file) = file_mutex.lock() {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, msg);
            let _ = file.flush();
        }
    }
}

/// Log to both the `log` facade and the file mirror.
#[macro_export]
macro_rules! file_log {
    (trace, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::trace!("{}", msg);
        $crate::logging::log_message(&format!("[TRACE] {}", msg));
    }};
    (debug, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::debug!("{}", msg);
        $crate::logging::log_message(&format!("[DEBUG] {}", msg));
    }};
    (info, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::info!("{}", msg);
        $crate::logging::log_message(&format!("[INFO ] {}", msg));
    }};
    (warn, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::warn!("{}", msg);
        $crate::logging::log_message(&format!("[WARN ] {}", msg));
    }};
    (error, $($arg:tt)*) => {{
        let msg = format!($($arg)*);
        log::error!("{}", msg);
        $crate::logging::log_message(&format!("[ERROR] {}", msg));
    }};
}

/// Map a syslog priority (0 = emerg ... 7 = debug) to a `log` level.
pub fn daemon_level(priority: i32) -> Level {
    match priority {
        i32::MIN..=3 => Level::Error,
        4 => Level::Warn,
        5 | 6 => Level::Info,
        7 => Level::Debug,
        _ => Level::Trace,
    }
}

/// Re-emit a daemon `log` event.
pub fn log_daemon_message(priority: i32, message: &str) {
    let message = message.trim_end_matches('\n');
    log::log!(target: DAEMON_TARGET, daemon_level(priority), "{}", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_level() {
        assert_eq!(daemon_level(0), Level::Error);
        assert_eq!(daemon_level(3), Level::Error);
        assert_eq!(daemon_level(4), Level::Warn);
        assert_eq!(daemon_level(6), Level::Info);
        assert_eq!(daemon_level(7), Level::Debug);
        assert_eq!(daemon_level(42), Level::Trace);
    }

    #[test]
    fn test_log_message_without_file() {
        // no file configured: must be a no-op
        log_message("dropped");
        file_log!(info, "connected to {}", "127.0.0.1:12345");
    }
}
