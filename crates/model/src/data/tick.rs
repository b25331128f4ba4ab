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

//! Feed-side messages driving a market-depth book pair.

use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::{
    data::entry::{BookEntry, EntryPayload},
    enums::{BookSide, TableCommand},
    orderbook::BookError,
};

/// Converts a 1-based feed position into the book's 0-based position.
///
/// This is the only place feed positions are translated; every book operation is 0-based.
///
/// # Errors
///
/// Returns [`BookError::InvalidPosition`] if `position` is zero.
pub fn to_book_position(command: TableCommand, position: u32) -> Result<usize, BookError> {
    match position.checked_sub(1) {
        Some(pos) => Ok(pos as usize),
        None => Err(BookError::InvalidPosition(command)),
    }
}

/// A single market-depth update for one side of a book.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookTick<P: EntryPayload> {
    /// The side the command applies to.
    pub side: BookSide,
    /// The table command.
    pub command: TableCommand,
    /// The 1-based feed position (ignored by non-positional commands).
    pub position: u32,
    /// The entry data, required by ADD, EXEC, MOD, REPLACE and REPLACE_BY_BROKER.
    pub entry: Option<BookEntry<P>>,
    /// The feed sequence number, if the feed supplies one.
    pub sequence: Option<u64>,
    /// Whether the tick is part of a retransmission.
    pub is_retransmission: bool,
}

impl<P: EntryPayload> BookTick<P> {
    /// Creates a new [`BookTick`] carrying entry data.
    #[must_use]
    pub fn new(side: BookSide, command: TableCommand, position: u32, entry: BookEntry<P>) -> Self {
        Self {
            side,
            command,
            position,
            entry: Some(entry),
            sequence: None,
            is_retransmission: false,
        }
    }

    /// Creates a new [`BookTick`] for a command which carries no entry data.
    #[must_use]
    pub fn without_entry(side: BookSide, command: TableCommand, position: u32) -> Self {
        Self {
            side,
            command,
            position,
            entry: None,
            sequence: None,
            is_retransmission: false,
        }
    }

    /// Sets the feed sequence number.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Marks the tick as part of a retransmission.
    #[must_use]
    pub fn retransmitted(mut self) -> Self {
        self.is_retransmission = true;
        self
    }

    /// Returns the 0-based book position addressed by this tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is positional and the feed position is zero.
    pub fn book_position(&self) -> Result<usize, BookError> {
        to_book_position(self.command, self.position)
    }

    /// Takes the entry data, failing if the command requires one which is absent.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::MissingEntry`] if no entry is attached.
    pub fn take_entry(&mut self) -> Result<BookEntry<P>, BookError> {
        self.entry.take().ok_or(BookError::MissingEntry(self.command))
    }
}

/// The initial paint of a book pair, sent once per subscription before incremental ticks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialPaint<P: EntryPayload> {
    /// The maximum depth retained per side, shared by both sides.
    pub window_size: u32,
    /// The descriptive book type label, shared by both sides.
    pub book_type: Ustr,
    /// The display precision hint for prices.
    pub max_decimals: u32,
    /// Bid entries by 0-based position; `None` leaves a placeholder.
    pub bids: Vec<Option<BookEntry<P>>>,
    /// Ask entries by 0-based position; `None` leaves a placeholder.
    pub asks: Vec<Option<BookEntry<P>>>,
}

impl<P: EntryPayload> InitialPaint<P> {
    /// Creates a new [`InitialPaint`] without any seeded entries.
    #[must_use]
    pub fn new(window_size: u32, book_type: &str, max_decimals: u32) -> Self {
        Self {
            window_size,
            book_type: Ustr::from(book_type),
            max_decimals,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }

    /// Returns the seeded entries for `side`.
    #[must_use]
    pub fn entries(&self, side: BookSide) -> &[Option<BookEntry<P>>] {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }
}
