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

//! Position-indexed market-depth books.
//!
//! A [`PositionIndexedBook`] caches one side of a book as positions (0 = best) mutated by the
//! feed's table commands. A [`DualSidedBookSet`] pairs a bid and an ask side with the
//! [`FeedHealth`] tracker deciding when the feed must be re-subscribed.

pub mod book;
pub mod error;
pub mod health;
pub mod pair;

#[cfg(any(test, feature = "stubs"))]
pub mod stubs;

// Re-exports
pub use crate::orderbook::{
    book::{ByLevelBook, ByOrderBook, PositionIndexedBook},
    error::{BookError, InvalidBookOperation},
    health::{FeedHealth, FeedHealthEvent},
    pair::{ByLevelBookSet, ByOrderBookSet, DualSidedBookSet},
};
