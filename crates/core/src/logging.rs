//! Category-based logging for the instruction core.
//!
//! Levels are stored per category in atomics so that a disabled log statement
//! costs one relaxed load. Messages are built lazily from a closure and only
//! when they are going to be written.
//!
//! # Configuration
//!
//! Levels can be set programmatically through [`LogConfig::global`] or read from
//! the environment with [`LogConfig::apply_env`]:
//!
//! - `EMU_LOG_LEVEL`: global level (`off`, `error`, `warn`, `info`, `debug`, `trace` or `0`-`5`)
//! - `EMU_LOG_CPU`: level for instruction execution
//! - `EMU_LOG_MMU`: level for memory unit events
//! - `EMU_LOG_RATE`: maximum messages per second per category
//!
//! # Usage
//!
//! ```rust
//! use gbz80_core::logging::{log, LogCategory, LogLevel};
//!
//! log(LogCategory::Cpu, LogLevel::Trace, || {
//!     format!("CPU: RES 0,B at PC={:04X}", 0x0150)
//! });
//! ```

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Sender};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn from_u8(val: u8) -> Self {
        match val {
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Components that emit log output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    /// Instruction execution
    Cpu,
    /// Memory unit resets, readiness and unready accesses
    Mmu,
}

const CATEGORY_COUNT: usize = 2;

impl LogCategory {
    fn index(self) -> usize {
        match self {
            LogCategory::Cpu => 0,
            LogCategory::Mmu => 1,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding a logging lock leaves the data usable.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Window {
    timestamps: VecDeque<Instant>,
    dropped: usize,
    last_drop_report: Option<Instant>,
}

/// Sliding one-second window limiting messages per category.
struct RateLimiter {
    max_per_second: AtomicUsize,
    windows: Mutex<[Window; CATEGORY_COUNT]>,
}

impl RateLimiter {
    fn new(max_per_second: usize) -> Self {
        Self {
            max_per_second: AtomicUsize::new(max_per_second),
            windows: Mutex::new(Default::default()),
        }
    }

    /// Returns whether the message may be written, and how many messages were
    /// dropped since the last report if a report is due.
    fn should_allow(&self, category: LogCategory) -> (bool, Option<usize>) {
        let now = Instant::now();
        let second = Duration::from_secs(1);
        let mut windows = lock(&self.windows);
        let window = &mut windows[category.index()];

        while let Some(&front) = window.timestamps.front() {
            if now.duration_since(front) > second {
                window.timestamps.pop_front();
            } else {
                break;
            }
        }

        if window.timestamps.len() < self.max_per_second.load(Ordering::Relaxed) {
            window.timestamps.push_back(now);
            if window.dropped > 0 {
                let dropped = std::mem::take(&mut window.dropped);
                window.last_drop_report = Some(now);
                return (true, Some(dropped));
            }
            return (true, None);
        }

        window.dropped += 1;
        let report_due = window
            .last_drop_report
            .map_or(true, |last| now.duration_since(last) >= second);
        if report_due {
            window.last_drop_report = Some(now);
            (false, Some(std::mem::take(&mut window.dropped)))
        } else {
            (false, None)
        }
    }
}

/// Global logging configuration
pub struct LogConfig {
    global_level: AtomicU8,
    levels: [AtomicU8; CATEGORY_COUNT],
    log_sender: Mutex<Option<Sender<String>>>,
    log_writer: Mutex<Option<JoinHandle<()>>>,
    file_logging_enabled: AtomicBool,
    rate_limiter: RateLimiter,
}

impl LogConfig {
    /// All logging off, 60 messages per second per category
    fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            levels: [
                AtomicU8::new(LogLevel::Off as u8),
                AtomicU8::new(LogLevel::Off as u8),
            ],
            log_sender: Mutex::new(None),
            log_writer: Mutex::new(None),
            file_logging_enabled: AtomicBool::new(false),
            rate_limiter: RateLimiter::new(60),
        }
    }

    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<LogConfig> = OnceLock::new();
        INSTANCE.get_or_init(LogConfig::new)
    }

    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level as u8, Ordering::Relaxed);
    }

    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.levels[category.index()].store(level as u8, Ordering::Relaxed);
    }

    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.levels[category.index()].load(Ordering::Relaxed))
    }

    /// A category level other than `Off` overrides the global level.
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        if level == LogLevel::Off {
            return false;
        }
        match self.get_level(category) {
            LogLevel::Off => level <= self.get_global_level(),
            category_level => level <= category_level,
        }
    }

    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        self.set_level(LogCategory::Cpu, LogLevel::Off);
        self.set_level(LogCategory::Mmu, LogLevel::Off);
    }

    pub fn set_rate_limit(&self, max_logs_per_second: usize) {
        self.rate_limiter
            .max_per_second
            .store(max_logs_per_second, Ordering::Relaxed);
    }

    pub fn get_rate_limit(&self) -> usize {
        self.rate_limiter.max_per_second.load(Ordering::Relaxed)
    }

    /// Read `EMU_LOG_LEVEL`, `EMU_LOG_CPU`, `EMU_LOG_MMU` and `EMU_LOG_RATE`.
    ///
    /// Unset or unparsable variables leave the current setting untouched.
    pub fn apply_env(&self) {
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars<F>(&self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = |name: &str| lookup(name).and_then(|v| LogLevel::from_str(&v));

        if let Some(level) = level("EMU_LOG_LEVEL") {
            self.set_global_level(level);
        }
        if let Some(level) = level("EMU_LOG_CPU") {
            self.set_level(LogCategory::Cpu, level);
        }
        if let Some(level) = level("EMU_LOG_MMU") {
            self.set_level(LogCategory::Mmu, level);
        }
        if let Some(rate) = lookup("EMU_LOG_RATE").and_then(|v| v.trim().parse().ok()) {
            self.set_rate_limit(rate);
        }
    }

    /// Send output to `path` instead of stderr.
    ///
    /// Writes happen on a background thread so logging never stalls emulation.
    /// A previously configured file is closed first.
    pub fn set_log_file(&self, path: PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let (sender, receiver) = channel::<String>();
        self.clear_log_file();

        let writer = thread::Builder::new()
            .name("log-writer".to_string())
            .spawn(move || {
                while let Ok(message) = receiver.recv() {
                    let _ = writeln!(file, "{}", message);
                    let _ = file.flush();
                }
            })?;

        *lock(&self.log_sender) = Some(sender);
        *lock(&self.log_writer) = Some(writer);
        self.file_logging_enabled.store(true, Ordering::Relaxed);
        Ok(())
    }

    /// Stop file logging and return to stderr.
    ///
    /// Blocks until the writer thread has flushed every queued message.
    pub fn clear_log_file(&self) {
        self.file_logging_enabled.store(false, Ordering::Relaxed);
        *lock(&self.log_sender) = None;
        let writer = lock(&self.log_writer).take();
        if let Some(writer) = writer {
            let _ = writer.join();
        }
    }

    fn write_message(&self, message: String) {
        if self.file_logging_enabled.load(Ordering::Relaxed) {
            if let Some(sender) = lock(&self.log_sender).as_ref() {
                if let Err(unsent) = sender.send(message) {
                    eprintln!("{}", unsent.0);
                }
                return;
            }
        }
        eprintln!("{}", message);
    }
}

/// Log a message if `category` is enabled at `level`.
///
/// `message_fn` only runs when the message will actually be written. Output is
/// limited per category; dropped messages are summarised once per second.
pub fn log<F>(category: LogCategory, level: LogLevel, message_fn: F)
where
    F: FnOnce() -> String,
{
    let config = LogConfig::global();
    if !config.should_log(category, level) {
        return;
    }

    let (allowed, dropped) = config.rate_limiter.should_allow(category);
    if let Some(count) = dropped.filter(|&n| n > 0) {
        config.write_message(format!(
            "[{:?}] WARNING: Rate limit exceeded, {} log message(s) dropped in the last second",
            category, count
        ));
    }
    if allowed {
        config.write_message(message_fn());
    }
}
