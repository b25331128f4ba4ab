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

//! Opaque correlation handles for routing feed events to books.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

static NEXT_CORRELATION_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies one market-depth subscription and the book pair it feeds.
///
/// The handle is a plain owned integer, so feed callbacks never hold a reference into
/// book storage. Values produced by [`CorrelationId::generate`] are unique per process
/// and never zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(u64);

impl CorrelationId {
    /// Creates a new [`CorrelationId`] from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Generates the next process-unique [`CorrelationId`].
    #[must_use]
    pub fn generate() -> Self {
        Self(NEXT_CORRELATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw handle value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for CorrelationId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CID-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_generate_is_unique() {
        let ids: HashSet<CorrelationId> = (0..1_000).map(|_| CorrelationId::generate()).collect();
        assert_eq!(ids.len(), 1_000);
        assert!(ids.iter().all(|id| id.value() != 0));
    }

    #[rstest]
    fn test_from_raw() {
        let id = CorrelationId::from(42);
        assert_eq!(id, CorrelationId::new(42));
        assert_eq!(id.value(), 42);
    }

    #[rstest]
    fn test_display() {
        assert_eq!(CorrelationId::new(7).to_string(), "CID-7");
    }

    #[rstest]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&CorrelationId::new(99)).unwrap();
        assert_eq!(json, "99");
        let id: CorrelationId = serde_json::from_str(&json).unwrap();
        assert_eq!(id.value(), 99);
    }
}
