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

//! Enumerations for the market-depth book model.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, FromRepr};

/// The side of a market-depth book.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookSide {
    /// The buy side, best position holds the highest price.
    Bid = 1,
    /// The sell side, best position holds the lowest price.
    Ask = 2,
}

impl BookSide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

/// A table-mutation command carried by a market-depth tick.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TableCommand {
    /// Insert at a position, pushing inferior entries down.
    Add = 1,
    /// Remove a position, compacting the side.
    Del = 2,
    /// Remove every entry on the side (flush).
    #[strum(serialize = "DELALL")]
    DelAll = 3,
    /// Remove a position and everything better than it.
    #[strum(serialize = "DELBETTER")]
    DelBetter = 4,
    /// Remove every entry on the side (side reset).
    #[strum(serialize = "DELSIDE")]
    DelSide = 5,
    /// Execute against a position, removing everything better than it.
    Exec = 6,
    /// Modify a position in place.
    Mod = 7,
    /// Replace a position in place, extending the side if needed.
    Replace = 8,
    /// Clear a position in place without collapsing the side.
    ReplaceClear = 9,
    /// Replace or remove the entry quoted by a broker.
    ReplaceByBroker = 10,
    /// Remove every entry on the side (recovery).
    #[strum(serialize = "CLEARALL")]
    ClearAll = 11,
}

impl TableCommand {
    /// Returns whether the command addresses a specific feed position.
    #[must_use]
    pub const fn is_positional(&self) -> bool {
        !matches!(
            self,
            Self::DelAll | Self::DelSide | Self::ClearAll | Self::ReplaceByBroker
        )
    }

    /// Returns whether the command requires entry data.
    #[must_use]
    pub const fn requires_entry(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Exec | Self::Mod | Self::Replace | Self::ReplaceByBroker
        )
    }
}

/// The flavor of a market-depth book, determining the per-position payload.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookFlavor {
    /// Market by order: one entry per order, keyed by broker for top-of-book feeds.
    ByOrder = 1,
    /// Market by level: one entry per price level with an order count.
    ByLevel = 2,
}

/// The feed-health state of a book pair.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Display,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    AsRefStr,
    FromRepr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedHealthState {
    /// Sequence continuity holds.
    #[default]
    Normal = 1,
    /// A sequence jump was observed outside of a retransmission.
    GapDetected = 2,
    /// The feed is replaying ask-side ticks.
    RetransmittingAsk = 3,
    /// The feed is replaying bid-side ticks.
    RetransmittingBid = 4,
}
