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

//! Configuration for the feed dispatcher.

use serde::{Deserialize, Serialize};

/// The window size applied to newly subscribed pairs until their initial paint arrives.
pub const DEFAULT_WINDOW_SIZE: u32 = 10;

const fn default_true() -> bool {
    true
}

const fn default_window_size() -> u32 {
    DEFAULT_WINDOW_SIZE
}

/// Configuration for a [`BookDispatcher`](crate::dispatch::BookDispatcher).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatcherConfig {
    /// If the session should be asked to re-subscribe when a sequence gap is detected.
    #[serde(default = "default_true")]
    pub resubscribe_on_gap: bool,
    /// The window size applied to a pair between subscription and its initial paint.
    #[serde(default = "default_window_size")]
    pub default_window_size: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            resubscribe_on_gap: true,
            default_window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl DispatcherConfig {
    /// Parses a configuration from a JSON string, applying defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is malformed or carries unknown fields.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_default() {
        let config = DispatcherConfig::default();
        assert!(config.resubscribe_on_gap);
        assert_eq!(config.default_window_size, DEFAULT_WINDOW_SIZE);
    }

    #[rstest]
    #[case("{}", true, DEFAULT_WINDOW_SIZE)]
    #[case(r#"{"resubscribe_on_gap": false}"#, false, DEFAULT_WINDOW_SIZE)]
    #[case(r#"{"default_window_size": 20}"#, true, 20)]
    #[case(
        r#"{"resubscribe_on_gap": false, "default_window_size": 5}"#,
        false,
        5
    )]
    fn test_from_json(
        #[case] json: &str,
        #[case] resubscribe_on_gap: bool,
        #[case] default_window_size: u32,
    ) {
        let config = DispatcherConfig::from_json(json).unwrap();
        assert_eq!(config.resubscribe_on_gap, resubscribe_on_gap);
        assert_eq!(config.default_window_size, default_window_size);
    }

    #[rstest]
    fn test_to_json() {
        let config = DispatcherConfig {
            resubscribe_on_gap: false,
            default_window_size: 3,
        };
        assert_eq!(
            config.to_json().unwrap(),
            r#"{"resubscribe_on_gap":false,"default_window_size":3}"#
        );
    }

    #[rstest]
    #[case(r#"{"resubscribe_on_gap": "yes"}"#)]
    #[case(r#"{"window": 5}"#)]
    #[case("not json")]
    fn test_from_json_invalid(#[case] json: &str) {
        assert!(DispatcherConfig::from_json(json).is_err());
    }
}
