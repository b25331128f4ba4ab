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

//! Book entries: the per-position values held by a market-depth book.

use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use depthbook_core::formatting::{Separable, format_price};
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::enums::BookFlavor;

/// The flavor-specific part of a [`BookEntry`].
pub trait EntryPayload: Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// The book flavor this payload belongs to.
    const FLAVOR: BookFlavor;

    /// Returns the broker mnemonic keying this entry, if the flavor has one.
    fn broker(&self) -> Option<Ustr> {
        None
    }
}

/// Payload of a by-order entry: the broker quoting the order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderPayload {
    pub broker: Ustr,
}

impl OrderPayload {
    /// Creates a new [`OrderPayload`] instance.
    #[must_use]
    pub fn new(broker: &str) -> Self {
        Self {
            broker: Ustr::from(broker),
        }
    }
}

impl EntryPayload for OrderPayload {
    const FLAVOR: BookFlavor = BookFlavor::ByOrder;

    fn broker(&self) -> Option<Ustr> {
        Some(self.broker)
    }
}

/// Payload of a by-level entry: the number of orders aggregated at the level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelPayload {
    pub order_count: u32,
}

impl LevelPayload {
    /// Creates a new [`LevelPayload`] instance.
    #[must_use]
    pub const fn new(order_count: u32) -> Self {
        Self { order_count }
    }
}

impl EntryPayload for LevelPayload {
    const FLAVOR: BookFlavor = BookFlavor::ByLevel;
}

/// One position of a market-depth book.
///
/// Entries built through [`BookEntry::new`] are valid. [`BookEntry::default`] yields an
/// invalid placeholder, used to pad a side when the feed addresses a position beyond its
/// current length. Validity is fixed at construction: a slot changes state only by being
/// assigned a whole new entry. Validity is not part of the serialized form, and a
/// deserialized entry is valid like one built through [`BookEntry::new`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookEntry<P: EntryPayload> {
    /// The quoted price, zero for synthetic or cleared entries.
    pub price: f64,
    /// The feed-supplied time, opaque to the book.
    pub time: String,
    /// The quantity at this position.
    pub size: u32,
    /// The flavor-specific payload.
    pub payload: P,
    #[serde(skip, default = "deserialized_is_valid")]
    valid: bool,
}

const fn deserialized_is_valid() -> bool {
    true
}

/// An entry of a by-order book.
pub type ByOrderEntry = BookEntry<OrderPayload>;

/// An entry of a by-level book.
pub type ByLevelEntry = BookEntry<LevelPayload>;

impl<P: EntryPayload> BookEntry<P> {
    /// Creates a new valid [`BookEntry`] instance.
    #[must_use]
    pub fn new(price: f64, time: impl Into<String>, size: u32, payload: P) -> Self {
        Self {
            price,
            time: time.into(),
            size,
            payload,
            valid: true,
        }
    }

    /// Returns whether the entry was constructed with real data.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns whether the entry signals absence rather than a quote (zero price and size).
    #[must_use]
    pub fn is_tombstone(&self) -> bool {
        self.price == 0.0 && self.size == 0
    }

    /// Returns the broker mnemonic keying this entry, if the flavor has one.
    #[must_use]
    pub fn broker(&self) -> Option<Ustr> {
        self.payload.broker()
    }

    /// Formats the price with the given display precision.
    #[must_use]
    pub fn price_display(&self, max_decimals: u32) -> String {
        format_price(self.price, max_decimals)
    }
}

impl ByOrderEntry {
    /// Creates a new valid by-order entry quoted by `broker`.
    #[must_use]
    pub fn by_order(price: f64, time: impl Into<String>, size: u32, broker: &str) -> Self {
        Self::new(price, time, size, OrderPayload::new(broker))
    }
}

impl ByLevelEntry {
    /// Creates a new valid by-level entry aggregating `order_count` orders.
    #[must_use]
    pub fn by_level(price: f64, time: impl Into<String>, size: u32, order_count: u32) -> Self {
        Self::new(price, time, size, LevelPayload::new(order_count))
    }
}

impl Display for ByOrderEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.valid {
            return write!(f, "-");
        }
        write!(
            f,
            "{} x {} @ {} ({})",
            self.size.separate_with_commas(),
            self.payload.broker,
            self.price,
            self.time,
        )
    }
}

impl Display for ByLevelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.valid {
            return write!(f, "-");
        }
        write!(
            f,
            "{} @ {} [{} orders] ({})",
            self.size.separate_with_commas(),
            self.price,
            self.payload.order_count,
            self.time,
        )
    }
}
