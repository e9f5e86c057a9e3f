//! Session logger (writes all log output to a single file in the OS data directory).
//!
//! The file is **truncated at each launch**, so it only ever holds the most
//! recent session.
//!
//! Log location:
//!   Windows:  `%APPDATA%\ZPaint\zpaint.log`
//!   Linux:    `~/.local/share/ZPaint/zpaint.log`
//!   macOS:    `~/Library/Application Support/ZPaint/zpaint.log`
//!
//! Use the `log_info!` / `log_warn!` / `log_err!` macros anywhere in the crate.
//! Until [`init`] has run (unit tests, headless library use) every macro is a
//! silent no-op.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Severity tag written in front of every line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    pub fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }
}

/// Returns the path to the current session log file, if logging is active.
pub fn log_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}

/// Write a raw line. I/O errors are ignored so logging can never take the
/// paint session down with it.
pub fn write_line(line: &str) {
    if let Some(mutex) = LOG_FILE.get()
        && let Ok(mut file) = mutex.lock()
    {
        let _ = writeln!(file, "{}", line);
    }
}

/// Write a timestamped, level-tagged line.
pub fn write(level: Level, msg: &str) {
    if LOG_FILE.get().is_none() {
        return;
    }
    write_line(&format_line(&timestamp(), level, msg));
}

fn format_line(ts: &str, level: Level, msg: &str) -> String {
    format!("[{}] [{}] {}", ts, level.tag(), msg)
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Info, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Warn, &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_err {
    ($($arg:tt)*) => {
        $crate::logger::write($crate::logger::Level::Error, &format!($($arg)*))
    };
}

/// Initialise the session logger. Call once, before the first frame.
///
/// * Creates (or truncates) the log file.
/// * Installs a panic hook that mirrors the panic message into the log before
///   handing over to the previous hook.
pub fn init() {
    let path = data_dir().join("ZPaint").join("zpaint.log");

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path);

    match file {
        Ok(f) => {
            let _ = LOG_PATH.set(path.clone());
            let _ = LOG_FILE.set(Mutex::new(f));
        }
        Err(e) => {
            eprintln!("[logger] Failed to open log file {:?}: {}", path, e);
            return;
        }
    }

    write_line(&format!(
        "=== ZPaint session started (unix {}) ===",
        unix_seconds().unwrap_or_default()
    ));
    write_line(&format!("Log file: {}", path.display()));
    write_line("");

    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        write_line(&format_line(&timestamp(), Level::Panic, &info.to_string()));
        prev(info);
    }));
}

/// Platform data directory (without the app sub-folder).
fn data_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
    }
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support");
        }
    }
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from(".")
}

fn unix_seconds() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

/// HH:MM:SS within the current (UTC) day.
fn timestamp() -> String {
    match unix_seconds() {
        Some(secs) => clock(secs),
        None => "??:??:??".to_string(),
    }
}

fn clock(secs: u64) -> String {
    let h = (secs % 86400) / 3600;
    let m = (secs % 3600) / 60;
    let s = secs % 60;
    format!("{:02}:{:02}:{:02}", h, m, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_wraps_at_midnight() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(86399), "23:59:59");
        assert_eq!(clock(86400 + 3661), "01:01:01");
    }

    #[test]
    fn lines_carry_level_tag() {
        let line = format_line("12:00:00", Level::Warn, "bad color");
        assert_eq!(line, "[12:00:00] [WARN] bad color");
    }

    #[test]
    fn macros_are_silent_before_init() {
        // Must not panic or create files when the logger was never initialised.
        log_info!("tool switched to {}", "pencil");
        log_err!("export failed: {}", 42);
    }
}
