// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

use std::{
    fmt::Display,
    sync::{
        Mutex, OnceLock,
        atomic::Ordering,
        mpsc::{Receiver, SendError, Sender},
    },
};

use chrono::{DateTime, SecondsFormat, Utc};
use log::{Level, LevelFilter, Log, STATIC_MAX_LEVEL, set_boxed_logger, set_max_level};
use ustr::Ustr;

pub use super::config::LoggerConfig;
use super::{LOGGING_BYPASSED, LOGGING_COLORED, LOGGING_GUARDS_ACTIVE, LOGGING_INITIALIZED};
use crate::logging::writer::{LogWriter, StderrWriter, StdoutWriter};

const LOGGING: &str = "logging";

/// Global log sender which allows multiple log guards per process.
static LOGGER_TX: OnceLock<Sender<LogEvent>> = OnceLock::new();

/// Global handle to the logging thread, only one thread exists per process.
static LOGGER_HANDLE: Mutex<Option<std::thread::JoinHandle<()>>> = Mutex::new(None);

/// A logger which hands records to a dedicated writer thread over an MPSC channel.
///
/// Book mutations log from inside hot paths, so formatting and I/O happen on the
/// `logging` thread rather than on the caller.
#[derive(Debug)]
pub struct Logger {
    /// Configuration for logging levels and behavior.
    pub config: LoggerConfig,
    max_level: LevelFilter,
    tx: Sender<LogEvent>,
}

/// Represents a type of log event.
#[derive(Debug)]
pub enum LogEvent {
    /// A log line event.
    Log(LogLine),
    /// A command to flush all logger buffers.
    Flush,
    /// A command to close the logger.
    Close,
}

/// Represents a log event which includes a message.
#[derive(Clone, Debug)]
pub struct LogLine {
    /// The timestamp for the event.
    pub timestamp: DateTime<Utc>,
    /// The log level for the event.
    pub level: Level,
    /// The module path the event originated from.
    pub component: Ustr,
    /// The log message content.
    pub message: String,
}

impl Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.component, self.message)
    }
}

/// A log line with cached plain and colored renderings.
#[derive(Clone, Debug)]
pub struct LogLineWrapper {
    line: LogLine,
    cache: Option<String>,
    colored: Option<String>,
}

impl LogLineWrapper {
    /// Creates a new [`LogLineWrapper`] instance.
    #[must_use]
    pub const fn new(line: LogLine) -> Self {
        Self {
            line,
            cache: None,
            colored: None,
        }
    }

    /// Returns the plain log message string, caching the result.
    pub fn get_string(&mut self) -> &str {
        self.cache.get_or_insert_with(|| {
            format!(
                "{} [{}] {}: {}\n",
                format_timestamp(&self.line.timestamp),
                self.line.level,
                self.line.component,
                self.line.message,
            )
        })
    }

    /// Returns the log message string with ANSI color codes, caching the result.
    pub fn get_colored(&mut self) -> &str {
        self.colored.get_or_insert_with(|| {
            format!(
                "\x1b[1m{}\x1b[0m {}[{}] {}: {}\x1b[0m\n",
                format_timestamp(&self.line.timestamp),
                level_ansi(self.line.level),
                self.line.level,
                self.line.component,
                self.line.message,
            )
        })
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

const fn level_ansi(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[1;31m",
        Level::Warn => "\x1b[1;33m",
        Level::Info => "",
        Level::Debug => "\x1b[94m",
        Level::Trace => "\x1b[90m",
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        !LOGGING_BYPASSED.load(Ordering::Relaxed)
            && (metadata.level() == Level::Error || metadata.level() <= self.max_level)
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let line = LogLine {
                timestamp: Utc::now(),
                level: record.level(),
                component: Ustr::from(record.metadata().target()),
                message: format!("{}", record.args()),
            };
            if let Err(SendError(LogEvent::Log(line))) = self.tx.send(LogEvent::Log(line)) {
                eprintln!("Error sending log event (receiver closed): {line}");
            }
        }
    }

    fn flush(&self) {
        if LOGGING_BYPASSED.load(Ordering::Relaxed) {
            return;
        }

        if let Err(e) = self.tx.send(LogEvent::Flush) {
            eprintln!("Error sending flush log event: {e}");
        }
    }
}

impl Logger {
    /// Initializes the logger based on the `DEPTHBOOK_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the environment variable or parsing the configuration fails.
    pub fn init_with_env() -> anyhow::Result<LogGuard> {
        let config = LoggerConfig::from_env()?;
        Self::init_with_config(config)
    }

    /// Initializes the logger with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the logger fails to register or initialize the background thread.
    pub fn init_with_config(config: LoggerConfig) -> anyhow::Result<LogGuard> {
        if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
            return LogGuard::new()
                .ok_or_else(|| anyhow::anyhow!("Logging already initialized but sender missing"));
        }

        let (tx, rx) = std::sync::mpsc::channel::<LogEvent>();

        let max_level = effective_max_level(&config);
        let logger = Self {
            config: config.clone(),
            max_level,
            tx: tx.clone(),
        };

        set_boxed_logger(Box::new(logger))?;

        if LOGGER_TX.set(tx).is_err() {
            debug_assert!(
                false,
                "LOGGER_TX already set - re-initialization not supported"
            );
        }

        let is_colored = config.is_colored;
        let print_config = config.print_config;
        if print_config {
            println!("STATIC_MAX_LEVEL={STATIC_MAX_LEVEL}");
            println!("Logger initialized with {config:?}");
        }

        let handle = std::thread::Builder::new()
            .name(LOGGING.to_string())
            .spawn(move || Self::handle_messages(config, max_level, rx))?;

        if let Ok(mut handle_guard) = LOGGER_HANDLE.lock() {
            debug_assert!(
                handle_guard.is_none(),
                "LOGGER_HANDLE already set - re-initialization not supported"
            );
            *handle_guard = Some(handle);
        }

        LOGGING_BYPASSED.store(false, Ordering::SeqCst);
        set_max_level(max_level);

        if print_config {
            println!("Logger set as `log` implementation with max level {max_level}");
        }

        LOGGING_INITIALIZED.store(true, Ordering::SeqCst);
        LOGGING_COLORED.store(is_colored, Ordering::SeqCst);

        LogGuard::new()
            .ok_or_else(|| anyhow::anyhow!("Failed to create LogGuard from global sender"))
    }

    fn handle_messages(config: LoggerConfig, max_level: LevelFilter, rx: Receiver<LogEvent>) {
        let LoggerConfig {
            stdout_level,
            module_level,
            log_modules_only,
            is_colored,
            print_config: _,
        } = config;

        // Longest prefix first
        let mut module_filters_sorted: Vec<(Ustr, LevelFilter)> =
            module_level.into_iter().collect();
        module_filters_sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let mut stdout_writer = StdoutWriter::new(max_level, is_colored);
        let mut stderr_writer = StderrWriter::new(is_colored);

        let process_line = |line: LogLine,
                            stdout_writer: &mut StdoutWriter,
                            stderr_writer: &mut StderrWriter| {
            if should_filter_log(
                &line.component,
                line.level,
                &module_filters_sorted,
                stdout_level,
                log_modules_only,
            ) {
                return;
            }

            let mut wrapper = LogLineWrapper::new(line);

            if stderr_writer.enabled(&wrapper.line) {
                if is_colored {
                    stderr_writer.write(wrapper.get_colored());
                } else {
                    stderr_writer.write(wrapper.get_string());
                }
            }

            if stdout_writer.enabled(&wrapper.line) {
                if is_colored {
                    stdout_writer.write(wrapper.get_colored());
                } else {
                    stdout_writer.write(wrapper.get_string());
                }
            }
        };

        while let Ok(event) = rx.recv() {
            match event {
                LogEvent::Log(line) => process_line(line, &mut stdout_writer, &mut stderr_writer),
                LogEvent::Flush => {
                    stdout_writer.flush();
                    stderr_writer.flush();
                }
                LogEvent::Close => {
                    // Drain events which raced with shutdown
                    while let Ok(event) = rx.try_recv() {
                        if let LogEvent::Log(line) = event {
                            process_line(line, &mut stdout_writer, &mut stderr_writer);
                        }
                    }

                    stdout_writer.flush();
                    stderr_writer.flush();
                    break;
                }
            }
        }
    }
}

/// Returns the most verbose level any destination or module filter accepts.
#[must_use]
pub fn effective_max_level(config: &LoggerConfig) -> LevelFilter {
    config
        .module_level
        .values()
        .copied()
        .fold(config.stdout_level, |a, b| a.max(b))
        .max(LevelFilter::Error)
}

/// Determines if a log line should be filtered out.
///
/// A module filter (longest matching prefix of `component`) overrides `default_level`.
/// Without a matching module filter, errors always pass unless `log_modules_only` is set.
///
/// The `module_filters_sorted` slice must be pre-sorted by descending path length.
#[must_use]
pub fn should_filter_log(
    component: &Ustr,
    line_level: Level,
    module_filters_sorted: &[(Ustr, LevelFilter)],
    default_level: LevelFilter,
    log_modules_only: bool,
) -> bool {
    let module_filter = module_filters_sorted
        .iter()
        .find(|(path, _)| component.starts_with(path.as_str()))
        .map(|(_, level)| *level);

    match module_filter {
        Some(filter_level) => line_level > filter_level,
        None => log_modules_only || (line_level != Level::Error && line_level > default_level),
    }
}

/// Gracefully shuts down the logging subsystem.
///
/// Safe to call multiple times. Thread join is skipped if called from the logging thread.
pub(crate) fn shutdown_graceful() {
    LOGGING_BYPASSED.store(true, Ordering::SeqCst);
    log::set_max_level(LevelFilter::Off);

    if let Some(tx) = LOGGER_TX.get() {
        let _ = tx.send(LogEvent::Close);
    }

    join_logging_thread();
    LOGGING_INITIALIZED.store(false, Ordering::SeqCst);
}

fn join_logging_thread() {
    if let Ok(mut handle_guard) = LOGGER_HANDLE.lock()
        && let Some(handle) = handle_guard.take()
        && handle.thread().id() != std::thread::current().id()
    {
        let _ = handle.join();
    }
}

/// A guard that keeps the logging thread alive.
///
/// Dropping a guard while others remain flushes the writers. Dropping the last guard closes the
/// channel, drains pending lines and joins the logging thread. At most 255 guards may be alive.
#[derive(Debug)]
pub struct LogGuard {
    tx: Sender<LogEvent>,
}

impl LogGuard {
    /// Creates a new [`LogGuard`] instance from the global logger.
    ///
    /// Returns `None` if logging has not been initialized or 255 guards are already active.
    #[must_use]
    pub fn new() -> Option<Self> {
        let tx = LOGGER_TX.get()?;
        LOGGING_GUARDS_ACTIVE
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_add(1)
            })
            .ok()?;

        Some(Self { tx: tx.clone() })
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let previous_count = LOGGING_GUARDS_ACTIVE
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
                count.checked_sub(1)
            })
            .unwrap_or(0);

        if previous_count == 1 && LOGGING_GUARDS_ACTIVE.load(Ordering::SeqCst) == 0 {
            LOGGING_BYPASSED.store(true, Ordering::SeqCst);
            log::set_max_level(LevelFilter::Off);

            let _ = self.tx.send(LogEvent::Close);
            join_logging_thread();

            LOGGING_INITIALIZED.store(false, Ordering::SeqCst);
        } else {
            let _ = self.tx.send(LogEvent::Flush);
        }
    }
}
