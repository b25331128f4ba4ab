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

//! Logging configuration types and parsing.
//!
//! # Spec String Format
//!
//! The `DEPTHBOOK_LOG` environment variable uses a semicolon-separated format:
//!
//! ```text
//! stdout=Info;depthbook_model::orderbook=Debug;is_colored
//! ```
//!
//! ## Supported Keys
//!
//! | Key                | Type      | Description                                  |
//! |--------------------|-----------|----------------------------------------------|
//! | `stdout`           | Log level | Maximum level for stdout output.             |
//! | `is_colored`       | Boolean   | Enable ANSI colors (default: true).          |
//! | `print_config`     | Boolean   | Print config to stdout at startup.           |
//! | `log_modules_only` | Boolean   | Only log modules with explicit filters.      |
//! | `<module::path>`   | Log level | Module-specific log level (prefix match).    |
//!
//! Log levels are case-insensitive. Boolean keys accept a bare flag (`is_colored`) or an
//! explicit value, where `false`, `0` and `no` disable the flag.

use std::{env, str::FromStr};

use ahash::AHashMap;
use log::LevelFilter;
use ustr::Ustr;

/// The environment variable read by [`LoggerConfig::from_env`].
pub const LOG_ENV_VAR: &str = "DEPTHBOOK_LOG";

/// Configuration for the depth book logger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Maximum log level for stdout output.
    pub stdout_level: LevelFilter,
    /// Per-module path log level overrides (prefix match on the record target).
    pub module_level: AHashMap<Ustr, LevelFilter>,
    /// Log only modules with explicit level filters.
    pub log_modules_only: bool,
    /// Use ANSI color codes in output.
    pub is_colored: bool,
    /// Print configuration to stdout at startup.
    pub print_config: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            stdout_level: LevelFilter::Info,
            module_level: AHashMap::new(),
            log_modules_only: false,
            is_colored: true,
            print_config: false,
        }
    }
}

impl LoggerConfig {
    /// Creates a new [`LoggerConfig`] instance.
    #[must_use]
    pub const fn new(
        stdout_level: LevelFilter,
        module_level: AHashMap<Ustr, LevelFilter>,
        log_modules_only: bool,
        is_colored: bool,
        print_config: bool,
    ) -> Self {
        Self {
            stdout_level,
            module_level,
            log_modules_only,
            is_colored,
            print_config,
        }
    }

    /// Parses a configuration from a spec string.
    ///
    /// # Errors
    ///
    /// Returns an error if the spec string contains invalid syntax or log levels.
    pub fn from_spec(spec: &str) -> anyhow::Result<Self> {
        let mut config = Self::default();

        for kv in spec.split(';') {
            let kv = kv.trim();
            if kv.is_empty() {
                continue;
            }

            let Some((k, v)) = kv.split_once('=') else {
                match kv.to_lowercase().as_str() {
                    "log_modules_only" => config.log_modules_only = true,
                    "is_colored" => config.is_colored = true,
                    "print_config" => config.print_config = true,
                    _ => anyhow::bail!("Invalid spec pair: {kv}"),
                }
                continue;
            };

            let k = k.trim();
            let v = v.trim();

            match k.to_lowercase().as_str() {
                "is_colored" => config.is_colored = parse_bool_value(v),
                "log_modules_only" => config.log_modules_only = parse_bool_value(v),
                "print_config" => config.print_config = parse_bool_value(v),
                "stdout" => config.stdout_level = parse_level(v)?,
                _ => {
                    if k.is_empty() {
                        anyhow::bail!("Invalid spec pair: {kv}");
                    }
                    config.module_level.insert(Ustr::from(k), parse_level(v)?);
                }
            }
        }

        Ok(config)
    }

    /// Parses configuration from the `DEPTHBOOK_LOG` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or contains invalid syntax.
    pub fn from_env() -> anyhow::Result<Self> {
        let spec = env::var(LOG_ENV_VAR)?;
        Self::from_spec(&spec)
    }
}

fn parse_bool_value(v: &str) -> bool {
    !matches!(v.to_lowercase().as_str(), "false" | "0" | "no")
}

fn parse_level(v: &str) -> anyhow::Result<LevelFilter> {
    LevelFilter::from_str(v).map_err(|_| anyhow::anyhow!("Invalid log level: {v}"))
}
