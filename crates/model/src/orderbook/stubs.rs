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

//! Helper functions for stubbing market-depth books in tests.

use rstest::fixture;
use ustr::Ustr;

use crate::{
    data::{
        entry::{ByLevelEntry, ByOrderEntry, EntryPayload, LevelPayload},
        tick::{BookTick, InitialPaint},
    },
    enums::{BookSide, TableCommand},
    orderbook::{
        book::{ByLevelBook, ByOrderBook, PositionIndexedBook},
        pair::{ByLevelBookSet, ByOrderBookSet},
    },
};

/// The window size used by stub books.
pub const STUB_WINDOW_SIZE: u32 = 5;

/// Creates a valid by-level entry identified by its price.
#[must_use]
pub fn level_entry(price: f64) -> ByLevelEntry {
    ByLevelEntry::by_level(price, "09:30:00.000", 100, 1)
}

/// Creates a valid by-order entry.
#[must_use]
pub fn order_entry(price: f64, size: u32, broker: &str) -> ByOrderEntry {
    ByOrderEntry::by_order(price, "09:30:00.000", size, broker)
}

/// Creates a by-level tick carrying [`level_entry`] at the 1-based feed `position`.
#[must_use]
pub fn level_tick(
    side: BookSide,
    command: TableCommand,
    position: u32,
    price: f64,
) -> BookTick<LevelPayload> {
    BookTick::new(side, command, position, level_entry(price))
}

/// Returns the prices held by `book`, `None` for placeholders.
#[must_use]
pub fn prices<P: EntryPayload>(book: &PositionIndexedBook<P>) -> Vec<Option<f64>> {
    book.snapshot(None)
        .into_iter()
        .map(|entry| entry.map(|entry| entry.price))
        .collect()
}

#[fixture]
pub fn stub_level_book() -> ByLevelBook {
    let book = ByLevelBook::new(BookSide::Bid);
    book.configure(STUB_WINDOW_SIZE, Ustr::from("MBL"), 2);
    book
}

#[fixture]
pub fn stub_order_book() -> ByOrderBook {
    let book = ByOrderBook::new(BookSide::Ask);
    book.configure(STUB_WINDOW_SIZE, Ustr::from("MBO"), 2);
    book
}

#[fixture]
pub fn stub_level_set() -> ByLevelBookSet {
    let set = ByLevelBookSet::new();
    set.initial_paint(InitialPaint::new(STUB_WINDOW_SIZE, "MBL", 2));
    set
}

#[fixture]
pub fn stub_order_set() -> ByOrderBookSet {
    let set = ByOrderBookSet::new();
    set.initial_paint(InitialPaint::new(STUB_WINDOW_SIZE, "MBO", 2));
    set
}
