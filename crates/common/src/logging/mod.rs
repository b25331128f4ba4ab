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

//! The logging subsystem for the depth book cache.
//!
//! Records emitted through the `log` facade are shipped over an MPSC channel to a dedicated
//! `logging` thread which formats and writes them (errors to stderr, everything else to
//! stdout). The thread lives as long as at least one [`LogGuard`] is alive; dropping the last
//! guard drains pending lines and joins the thread.
//!
//! Configuration comes from a [`LoggerConfig`], usually parsed from the `DEPTHBOOK_LOG`
//! environment variable.

pub mod config;
pub mod logger;
pub mod writer;

use std::{
    collections::HashMap,
    env,
    str::FromStr,
    sync::{
        OnceLock,
        atomic::{AtomicBool, AtomicU8, Ordering},
    },
};

use ahash::AHashMap;
use log::LevelFilter;
use ustr::Ustr;

pub use self::{
    config::{LOG_ENV_VAR, LoggerConfig},
    logger::{LogGuard, Logger},
};

static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);
static LOGGING_BYPASSED: AtomicBool = AtomicBool::new(false);
static LOGGING_COLORED: AtomicBool = AtomicBool::new(true);
static LOGGING_GUARDS_ACTIVE: AtomicU8 = AtomicU8::new(0);
static LAZY_GUARD: OnceLock<Option<LogGuard>> = OnceLock::new();

/// Returns whether the logger is initialized.
pub fn logging_is_initialized() -> bool {
    LOGGING_INITIALIZED.load(Ordering::Relaxed)
}

/// Returns whether the logger is using ANSI colors.
pub fn logging_is_colored() -> bool {
    LOGGING_COLORED.load(Ordering::Relaxed)
}

/// Ensures logging is initialized on first use.
///
/// If `DEPTHBOOK_LOG` is set and valid the logger uses it, otherwise it logs at INFO to stdout.
/// The guard is held for the remainder of the process.
///
/// Returns `true` if logging is available.
pub fn ensure_logging_initialized() -> bool {
    if LOGGING_INITIALIZED.load(Ordering::SeqCst) {
        return true;
    }

    LAZY_GUARD.get_or_init(|| {
        let config = env::var(LOG_ENV_VAR)
            .ok()
            .and_then(|spec| LoggerConfig::from_spec(&spec).ok())
            .unwrap_or_default();

        Logger::init_with_config(config).ok()
    });

    LOGGING_INITIALIZED.load(Ordering::SeqCst)
}

/// Sets the logging subsystem to bypass mode.
pub fn logging_set_bypass() {
    LOGGING_BYPASSED.store(true, Ordering::Relaxed);
}

/// Shuts down the logging subsystem: stops accepting records, drains and joins the thread.
pub fn logging_shutdown() {
    logger::shutdown_graceful();
}

/// Initializes logging with the given configuration.
///
/// Should be called once, early in the life of the process. Keep the returned guard alive for
/// as long as records should be written.
///
/// # Errors
///
/// Returns an error if the logging subsystem fails to initialize.
pub fn init_logging(config: LoggerConfig) -> anyhow::Result<LogGuard> {
    Logger::init_with_config(config)
}

/// Parses a string into a [`LevelFilter`], accepting `WARNING` as an alias for `WARN`.
///
/// # Errors
///
/// Returns an error if the provided string is not a valid `LevelFilter`.
pub fn parse_level_filter_str(s: &str) -> anyhow::Result<LevelFilter> {
    let mut log_level_str = s.to_uppercase();
    if log_level_str == "WARNING" {
        log_level_str = "WARN".to_string();
    }
    LevelFilter::from_str(&log_level_str)
        .map_err(|_| anyhow::anyhow!("Invalid log level string: '{s}'"))
}

/// Parses module-specific log levels from a JSON value map.
///
/// # Errors
///
/// Returns an error if a value in the map is not a string or is not a valid log level.
pub fn parse_module_levels(
    original_map: Option<HashMap<String, serde_json::Value>>,
) -> anyhow::Result<AHashMap<Ustr, LevelFilter>> {
    let Some(map) = original_map else {
        return Ok(AHashMap::new());
    };

    let mut new_map = AHashMap::new();
    for (key, value) in map {
        let s = value.as_str().ok_or_else(|| {
            anyhow::anyhow!("Module log level for '{key}' must be a string, was: {value}")
        })?;
        new_map.insert(Ustr::from(&key), parse_level_filter_str(s)?);
    }
    Ok(new_map)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("DEBUG", LevelFilter::Debug)]
    #[case("DeBuG", LevelFilter::Debug)]
    #[case("info", LevelFilter::Info)]
    #[case("WARNING", LevelFilter::Warn)]
    #[case("warning", LevelFilter::Warn)]
    #[case("warn", LevelFilter::Warn)]
    #[case("ERROR", LevelFilter::Error)]
    #[case("off", LevelFilter::Off)]
    #[case("TRACE", LevelFilter::Trace)]
    fn test_parse_level_filter_str_case_insensitive(
        #[case] input: &str,
        #[case] expected: LevelFilter,
    ) {
        assert_eq!(parse_level_filter_str(input).unwrap(), expected);
    }

    #[rstest]
    #[case("INVALID")]
    #[case("WARNINGG")]
    #[case("")]
    fn test_parse_level_filter_str_invalid_returns_error(#[case] invalid_input: &str) {
        let result = parse_level_filter_str(invalid_input);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Invalid log level")
        );
    }

    #[rstest]
    fn test_parse_module_levels_valid() {
        let mut map = HashMap::new();
        map.insert(
            "depthbook_model".to_string(),
            serde_json::Value::String("DEBUG".to_string()),
        );
        map.insert(
            "depthbook_common::dispatch".to_string(),
            serde_json::Value::String("warning".to_string()),
        );

        let result = parse_module_levels(Some(map)).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[&Ustr::from("depthbook_model")], LevelFilter::Debug);
        assert_eq!(
            result[&Ustr::from("depthbook_common::dispatch")],
            LevelFilter::Warn
        );
    }

    #[rstest]
    fn test_parse_module_levels_non_string_value_returns_error() {
        let mut map = HashMap::new();
        map.insert(
            "depthbook_model".to_string(),
            serde_json::Value::Number(123.into()),
        );

        let result = parse_module_levels(Some(map));

        assert!(result.unwrap_err().to_string().contains("must be a string"));
    }

    #[rstest]
    fn test_parse_module_levels_none_returns_empty() {
        assert!(parse_module_levels(None).unwrap().is_empty());
    }

    #[rstest]
    fn test_init_logging_guard_lifecycle() {
        let config = LoggerConfig::from_spec("stdout=Off;is_colored=false").unwrap();
        let guard = init_logging(config).unwrap();
        assert!(logging_is_initialized());
        assert!(!logging_is_colored());

        let second = LogGuard::new();
        assert!(second.is_some());
        drop(second);
        assert!(logging_is_initialized());

        log::error!("Written to stderr before shutdown");
        drop(guard);
        assert!(!logging_is_initialized());
    }
}
