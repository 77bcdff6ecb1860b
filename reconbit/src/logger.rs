use chrono::Local;
use std::fmt;
use std::sync::OnceLock;

static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

fn emit(level: &str, args: fmt::Arguments) {
    let now = Local::now();
    println!("[{}] {} {}", now.format("%Y-%m-%d %H:%M:%S"), level, args);
}

/// Debug output is off unless `RECONBIT_DEBUG` is set to anything but `0`/`false`.
pub fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| {
        std::env::var("RECONBIT_DEBUG")
            .map(|v| !matches!(v.as_str(), "" | "0" | "false"))
            .unwrap_or(false)
    })
}

pub fn debug(args: fmt::Arguments) {
    if debug_enabled() {
        emit("DEBUG", args);
    }
}

pub fn info(args: fmt::Arguments) {
    emit("INFO", args);
}

pub fn warn(args: fmt::Arguments) {
    emit("WARN", args);
}

pub fn error(args: fmt::Arguments) {
    emit("ERROR", args);
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::logger::debug(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::logger::info(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::logger::warn(format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::logger::error(format_args!($($arg)*))
    };
}
