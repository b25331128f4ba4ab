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

//! A position-indexed, window-bounded cache for one side of a market-depth book.

use std::fmt::Display;

use parking_lot::Mutex;
use ustr::Ustr;

use crate::{
    data::entry::{BookEntry, EntryPayload, LevelPayload, OrderPayload},
    enums::{BookSide, TableCommand},
    orderbook::{BookError, InvalidBookOperation},
};

/// The lock-protected contents of a [`PositionIndexedBook`].
///
/// Helpers here assume the caller already holds the lock, so public operations never
/// re-enter it.
#[derive(Clone, Debug, Default)]
struct BookState<P: EntryPayload> {
    entries: Vec<BookEntry<P>>,
    window_size: u32,
    book_type: Ustr,
    max_decimals: u32,
}

impl<P: EntryPayload> BookState<P> {
    fn window(&self) -> usize {
        self.window_size as usize
    }

    fn pad_to(&mut self, len: usize) {
        if self.entries.len() < len {
            self.entries.resize_with(len, BookEntry::default);
        }
    }

    fn truncate_to_window(&mut self) {
        let window = self.window();
        if self.entries.len() > window {
            self.entries.truncate(window);
        }
    }

    fn check_position(&self, command: TableCommand, pos: usize) -> Result<(), BookError> {
        if pos < self.entries.len() {
            Ok(())
        } else {
            Err(BookError::PositionOutOfRange {
                command,
                position: pos,
                len: self.entries.len(),
            })
        }
    }

    fn delete_by_broker(&mut self, broker: Ustr) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.is_valid() && entry.broker() == Some(broker))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }
}

/// One side of a market-depth book, addressed by 0-based position (0 = best).
///
/// The side holds at most `window_size` positions after any operation which can grow it.
/// Slots never go missing: positions the feed skipped over hold invalid placeholders, which
/// [`PositionIndexedBook::get_entry`] reports as absent.
///
/// # Thread Safety
///
/// Every public operation, reads included, holds the side's own lock for its whole duration
/// and no more. A reader walking positions one call at a time may observe a mutation
/// applied between two calls; use [`PositionIndexedBook::snapshot`] for a consistent view.
#[derive(Debug)]
pub struct PositionIndexedBook<P: EntryPayload> {
    /// The side of the book.
    pub side: BookSide,
    state: Mutex<BookState<P>>,
}

/// One side of a by-order book.
pub type ByOrderBook = PositionIndexedBook<OrderPayload>;

/// One side of a by-level book.
pub type ByLevelBook = PositionIndexedBook<LevelPayload>;

impl<P: EntryPayload> Display for PositionIndexedBook<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        write!(
            f,
            "{}(side={}, flavor={}, book_type={}, window_size={}, size={})",
            stringify!(PositionIndexedBook),
            self.side,
            P::FLAVOR,
            state.book_type,
            state.window_size,
            state.entries.len(),
        )
    }
}

impl<P: EntryPayload> PositionIndexedBook<P> {
    /// Creates a new empty [`PositionIndexedBook`] instance.
    ///
    /// The window size is zero until [`Self::configure`] runs, so nothing is retained
    /// before the initial paint.
    #[must_use]
    pub fn new(side: BookSide) -> Self {
        Self {
            side,
            state: Mutex::new(BookState::default()),
        }
    }

    /// Sets the window size, book type and display precision from the initial paint.
    ///
    /// Existing entries beyond the new window are dropped.
    pub fn configure(&self, window_size: u32, book_type: Ustr, max_decimals: u32) {
        let mut state = self.state.lock();
        state.window_size = window_size;
        state.book_type = book_type;
        state.max_decimals = max_decimals;
        state.truncate_to_window();
    }

    /// Returns the maximum number of retained positions.
    #[must_use]
    pub fn window_size(&self) -> u32 {
        self.state.lock().window_size
    }

    /// Returns the book type label.
    #[must_use]
    pub fn book_type(&self) -> Ustr {
        self.state.lock().book_type
    }

    /// Returns the display precision hint for prices.
    #[must_use]
    pub fn max_decimals(&self) -> u32 {
        self.state.lock().max_decimals
    }

    /// Inserts `entry` at `pos`, shifting the entries at `pos` and beyond one position back.
    ///
    /// A position beyond the current length first extends the side with placeholders up to
    /// `pos + 1`, so the entry lands at `pos` followed by one placeholder. Adding at exactly the
    /// current length appends. The side is then truncated to the window, so an entry added at
    /// or beyond the window is not retained.
    pub fn add(&self, pos: usize, entry: BookEntry<P>) {
        let mut state = self.state.lock();
        let window = state.window();

        if pos >= window {
            log::debug!(
                "ADD at position {pos} beyond window_size={window} on {} side, entry dropped",
                self.side
            );
            state.pad_to(window);
            state.truncate_to_window();
            return;
        }

        if pos > state.entries.len() {
            state.pad_to(pos + 1);
        }
        state.entries.insert(pos, entry);
        state.truncate_to_window();
    }

    /// Removes the entry at `pos`, shifting later entries up.
    ///
    /// Does nothing if `pos` is beyond the current length.
    pub fn del(&self, pos: usize) {
        let mut state = self.state.lock();
        if pos < state.entries.len() {
            state.entries.remove(pos);
        } else {
            log::debug!(
                "DEL at position {pos} ignored on {} side (len={})",
                self.side,
                state.entries.len()
            );
        }
    }

    /// Removes every entry on the side (flush).
    pub fn del_all(&self) {
        self.state.lock().entries.clear();
    }

    /// Removes every entry on the side (recovery).
    ///
    /// Identical in effect to [`Self::del_all`]; kept as its own operation so the reason for
    /// a clear stays visible at the call site.
    pub fn clear_all(&self) {
        self.state.lock().entries.clear();
    }

    /// Removes every entry on the side (side reset).
    ///
    /// Identical in effect to [`Self::del_all`].
    pub fn del_side(&self) {
        self.state.lock().entries.clear();
    }

    /// Removes the entry at `pos` and every better entry (positions `0..=pos`).
    ///
    /// A position beyond the current length clears the side.
    pub fn del_better(&self, pos: usize) {
        let mut state = self.state.lock();
        let end = pos.saturating_add(1).min(state.entries.len());
        state.entries.drain(..end);
    }

    /// Replaces the entry at `pos` with `entry` and removes every better entry, leaving the
    /// executed entry at position 0.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::PositionOutOfRange`] if `pos` is beyond the current length.
    pub fn exec(&self, pos: usize, entry: BookEntry<P>) -> Result<(), BookError> {
        let mut state = self.state.lock();
        state.check_position(TableCommand::Exec, pos)?;
        state.entries[pos] = entry;
        state.entries.drain(..pos);
        Ok(())
    }

    /// Replaces the entry at `pos` in place, without shifting.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::PositionOutOfRange`] if `pos` is beyond the current length: the
    /// feed only modifies existing positions, so this means the cache has desynchronized.
    pub fn modify(&self, pos: usize, entry: BookEntry<P>) -> Result<(), BookError> {
        let mut state = self.state.lock();
        state.check_position(TableCommand::Mod, pos)?;
        state.entries[pos] = entry;
        Ok(())
    }

    /// Replaces the entry at `pos` in place, padding with placeholders if the side is shorter.
    ///
    /// The side is then truncated to the window.
    pub fn replace(&self, pos: usize, entry: BookEntry<P>) {
        let mut state = self.state.lock();
        let window = state.window();

        if pos >= window {
            log::debug!(
                "REPLACE at position {pos} beyond window_size={window} on {} side, entry dropped",
                self.side
            );
            state.pad_to(window);
            state.truncate_to_window();
            return;
        }

        state.pad_to(pos + 1);
        state.entries[pos] = entry;
        state.truncate_to_window();
    }

    /// Resets the entry at `pos` to a placeholder, keeping the side's length.
    ///
    /// Does nothing if `pos` is beyond the current length.
    pub fn replace_clear(&self, pos: usize) {
        let mut state = self.state.lock();
        let len = state.entries.len();
        if pos < len {
            state.entries[pos] = BookEntry::default();
        } else {
            log::debug!(
                "REPLACE_CLEAR at position {pos} ignored on {} side (len={len})",
                self.side
            );
        }
    }

    /// Replaces the entry quoted by the same broker, or appends it if the broker has none.
    ///
    /// A tombstone entry (zero price and size) removes the broker's entry instead, which is a
    /// no-op if the broker has none.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBookOperation::ReplaceByBroker`] if the book flavor has no broker key.
    pub fn replace_by_broker(&self, entry: BookEntry<P>) -> Result<(), BookError> {
        let Some(broker) = entry.broker() else {
            return Err(InvalidBookOperation::ReplaceByBroker(P::FLAVOR).into());
        };

        let mut state = self.state.lock();

        if entry.is_tombstone() {
            state.delete_by_broker(broker);
            return Ok(());
        }

        let existing = state
            .entries
            .iter()
            .position(|existing| existing.is_valid() && existing.broker() == Some(broker));

        match existing {
            Some(index) => state.entries[index] = entry,
            None => {
                state.entries.push(entry);
                state.truncate_to_window();
            }
        }

        Ok(())
    }

    /// Removes the first entry quoted by `broker`.
    ///
    /// Returns whether an entry was removed; a missing broker is not an error.
    pub fn delete_by_broker(&self, broker: Ustr) -> bool {
        self.state.lock().delete_by_broker(broker)
    }

    /// Returns the number of positions currently held, placeholders included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns whether the side holds no positions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Returns the entry at `pos` if the position exists and holds real data.
    #[must_use]
    pub fn get_entry(&self, pos: usize) -> Option<BookEntry<P>> {
        self.state
            .lock()
            .entries
            .get(pos)
            .filter(|entry| entry.is_valid())
            .cloned()
    }

    /// Returns the best entry, if position 0 holds real data.
    #[must_use]
    pub fn top(&self) -> Option<BookEntry<P>> {
        self.get_entry(0)
    }

    /// Returns up to `depth` positions (all if `None`) taken under a single lock.
    ///
    /// Placeholders are returned as `None`.
    #[must_use]
    pub fn snapshot(&self, depth: Option<usize>) -> Vec<Option<BookEntry<P>>> {
        self.state
            .lock()
            .entries
            .iter()
            .take(depth.unwrap_or(usize::MAX))
            .map(|entry| entry.is_valid().then(|| entry.clone()))
            .collect()
    }
}
