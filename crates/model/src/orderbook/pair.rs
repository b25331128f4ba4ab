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

//! A bid/ask pair of position-indexed books sharing one mutation protocol.

use std::{
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use ustr::Ustr;

use crate::{
    data::{
        entry::{EntryPayload, LevelPayload, OrderPayload},
        tick::{BookTick, InitialPaint},
    },
    enums::{BookFlavor, BookSide, FeedHealthState, TableCommand},
    orderbook::{
        BookError,
        book::PositionIndexedBook,
        health::{FeedHealth, FeedHealthEvent},
    },
};

/// Both sides of one market-depth book together with its feed-health state.
///
/// Window size, book type and display precision are shared by the pair: they are set once by
/// the initial paint and copied to both sides. The sides lock independently, and the health
/// tracker has its own lock which is never held while a side is mutated.
#[derive(Debug)]
pub struct DualSidedBookSet<P: EntryPayload> {
    bids: PositionIndexedBook<P>,
    asks: PositionIndexedBook<P>,
    health: Mutex<FeedHealth>,
    update_count: AtomicU64,
}

/// A by-order book pair.
pub type ByOrderBookSet = DualSidedBookSet<OrderPayload>;

/// A by-level book pair.
pub type ByLevelBookSet = DualSidedBookSet<LevelPayload>;

impl<P: EntryPayload> Default for DualSidedBookSet<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: EntryPayload> Display for DualSidedBookSet<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}(flavor={}, book_type={}, window_size={}, bids={}, asks={}, health={}, update_count={})",
            stringify!(DualSidedBookSet),
            P::FLAVOR,
            self.book_type(),
            self.window_size(),
            self.bids.size(),
            self.asks.size(),
            self.health_state(),
            self.update_count(),
        )
    }
}

impl<P: EntryPayload> DualSidedBookSet<P> {
    /// Creates a new empty [`DualSidedBookSet`] awaiting its initial paint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: PositionIndexedBook::new(BookSide::Bid),
            asks: PositionIndexedBook::new(BookSide::Ask),
            health: Mutex::new(FeedHealth::new()),
            update_count: AtomicU64::new(0),
        }
    }

    /// Returns the book flavor of the pair.
    #[must_use]
    pub const fn flavor(&self) -> BookFlavor {
        P::FLAVOR
    }

    /// Returns the bid side.
    #[must_use]
    pub const fn bids(&self) -> &PositionIndexedBook<P> {
        &self.bids
    }

    /// Returns the ask side.
    #[must_use]
    pub const fn asks(&self) -> &PositionIndexedBook<P> {
        &self.asks
    }

    /// Returns the book for `side`.
    #[must_use]
    pub const fn side(&self, side: BookSide) -> &PositionIndexedBook<P> {
        match side {
            BookSide::Bid => &self.bids,
            BookSide::Ask => &self.asks,
        }
    }

    /// Returns the window size shared by both sides.
    #[must_use]
    pub fn window_size(&self) -> u32 {
        self.bids.window_size()
    }

    /// Returns the book type label shared by both sides.
    #[must_use]
    pub fn book_type(&self) -> Ustr {
        self.bids.book_type()
    }

    /// Returns the display precision hint shared by both sides.
    #[must_use]
    pub fn max_decimals(&self) -> u32 {
        self.bids.max_decimals()
    }

    /// Returns the number of ticks applied since creation.
    #[must_use]
    pub fn update_count(&self) -> u64 {
        self.update_count.load(Ordering::Relaxed)
    }

    /// Returns a copy of the feed-health tracker.
    #[must_use]
    pub fn health(&self) -> FeedHealth {
        self.health.lock().clone()
    }

    /// Returns the current feed-health state.
    #[must_use]
    pub fn health_state(&self) -> FeedHealthState {
        self.health.lock().state()
    }

    /// Applies the initial paint: configures both sides, replaces their contents with the
    /// painted entries and resets feed health.
    pub fn initial_paint(&self, paint: InitialPaint<P>) {
        log::info!(
            "Initial paint: flavor={}, book_type={}, window_size={}, bids={}, asks={}",
            P::FLAVOR,
            paint.book_type,
            paint.window_size,
            paint.bids.len(),
            paint.asks.len(),
        );

        let InitialPaint {
            window_size,
            book_type,
            max_decimals,
            bids,
            asks,
        } = paint;

        for (book, entries) in [(&self.bids, bids), (&self.asks, asks)] {
            book.configure(window_size, book_type, max_decimals);
            book.clear_all();
            for (pos, entry) in entries.into_iter().enumerate() {
                if let Some(entry) = entry {
                    book.replace(pos, entry);
                }
            }
        }

        self.health.lock().reset();
    }

    /// Feeds the tick's sequence number to the health tracker.
    ///
    /// Ticks without a sequence number leave the health state untouched.
    pub fn observe(&self, tick: &BookTick<P>) -> Option<FeedHealthEvent> {
        let sequence = tick.sequence?;
        let book_type = self.book_type();
        self.health
            .lock()
            .on_sequence(book_type, tick.side, sequence, tick.is_retransmission)
    }

    /// Applies the tick's command to the book for its side.
    ///
    /// The feed's 1-based position is converted here, once, for positional commands.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A positional command carries feed position 0.
    /// - A data command carries no entry.
    /// - MOD or EXEC targets a position the side does not hold.
    /// - REPLACE_BY_BROKER is sent to a by-level pair.
    pub fn apply_command(&self, mut tick: BookTick<P>) -> Result<(), BookError> {
        let book = self.side(tick.side);

        match tick.command {
            TableCommand::Add => book.add(tick.book_position()?, tick.take_entry()?),
            TableCommand::Del => book.del(tick.book_position()?),
            TableCommand::DelAll => book.del_all(),
            TableCommand::DelBetter => book.del_better(tick.book_position()?),
            TableCommand::DelSide => book.del_side(),
            TableCommand::Exec => book.exec(tick.book_position()?, tick.take_entry()?)?,
            TableCommand::Mod => book.modify(tick.book_position()?, tick.take_entry()?)?,
            TableCommand::Replace => book.replace(tick.book_position()?, tick.take_entry()?),
            TableCommand::ReplaceClear => book.replace_clear(tick.book_position()?),
            TableCommand::ReplaceByBroker => book.replace_by_broker(tick.take_entry()?)?,
            TableCommand::ClearAll => book.clear_all(),
        }

        self.update_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Observes and applies a single tick.
    ///
    /// A health event never prevents the command from being applied. The sequence is recorded
    /// even when the command is rejected, but the event is then dropped with the error: callers
    /// that must act on a gap regardless call [`Self::observe`] and [`Self::apply_command`].
    ///
    /// # Errors
    ///
    /// Returns an error if the command violates the book contract (see [`Self::apply_command`]).
    pub fn apply(&self, tick: BookTick<P>) -> Result<Option<FeedHealthEvent>, BookError> {
        let event = self.observe(&tick);
        self.apply_command(tick)?;
        Ok(event)
    }

    /// Observes and applies a multi-tick update in order, returning the health events raised.
    ///
    /// # Errors
    ///
    /// Returns the first contract violation; ticks after it are not applied.
    pub fn apply_batch(
        &self,
        ticks: impl IntoIterator<Item = BookTick<P>>,
    ) -> Result<Vec<FeedHealthEvent>, BookError> {
        let mut events = Vec::new();
        for tick in ticks {
            if let Some(event) = self.apply(tick)? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Marks the start of a retransmission for `side`.
    pub fn begin_retransmission(&self, side: BookSide) {
        log::debug!("Retransmission started for {side} side");
        self.health.lock().begin_retransmission(side);
    }

    /// Marks the end of a retransmission for `side`.
    pub fn end_retransmission(&self, side: BookSide) -> Option<FeedHealthEvent> {
        log::debug!("Retransmission completed for {side} side");
        self.health.lock().end_retransmission(side)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use ustr::Ustr;

    use crate::{
        data::{
            entry::{ByLevelEntry, LevelPayload},
            tick::{BookTick, InitialPaint},
        },
        enums::{BookFlavor, BookSide, FeedHealthState, TableCommand},
        orderbook::{
            BookError, InvalidBookOperation,
            health::FeedHealthEvent,
            pair::{ByLevelBookSet, ByOrderBookSet},
            stubs::{
                level_entry, level_tick, order_entry, prices, stub_level_set, stub_order_set,
            },
        },
    };

    #[rstest]
    fn test_new_pair_awaits_paint() {
        let set = ByLevelBookSet::new();
        assert_eq!(set.flavor(), BookFlavor::ByLevel);
        assert_eq!(set.window_size(), 0);
        assert_eq!(set.health_state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_initial_paint_is_shared_across_sides() {
        let set = ByLevelBookSet::new();
        let mut paint = InitialPaint::new(10, "MBL", 3);
        paint.bids = vec![Some(level_entry(100.0)), None, Some(level_entry(98.0))];
        paint.asks = vec![Some(level_entry(101.0))];
        set.initial_paint(paint);

        for side in [BookSide::Bid, BookSide::Ask] {
            assert_eq!(set.side(side).window_size(), 10);
            assert_eq!(set.side(side).book_type(), Ustr::from("MBL"));
            assert_eq!(set.side(side).max_decimals(), 3);
        }
        assert_eq!(prices(set.bids()), vec![Some(100.0), None, Some(98.0)]);
        assert_eq!(prices(set.asks()), vec![Some(101.0)]);
    }

    #[rstest]
    fn test_initial_paint_replaces_previous_contents(stub_level_set: ByLevelBookSet) {
        stub_level_set
            .apply(level_tick(BookSide::Bid, TableCommand::Add, 1, 100.0))
            .unwrap();
        stub_level_set.initial_paint(InitialPaint::new(5, "MBL", 2));
        assert!(stub_level_set.bids().is_empty());
    }

    #[rstest]
    fn test_ticks_route_to_their_side(stub_level_set: ByLevelBookSet) {
        stub_level_set
            .apply(level_tick(BookSide::Bid, TableCommand::Add, 1, 100.0))
            .unwrap();
        stub_level_set
            .apply(level_tick(BookSide::Ask, TableCommand::Add, 1, 101.0))
            .unwrap();
        stub_level_set
            .apply(level_tick(BookSide::Ask, TableCommand::Add, 1, 100.5))
            .unwrap();

        assert_eq!(prices(stub_level_set.bids()), vec![Some(100.0)]);
        assert_eq!(prices(stub_level_set.asks()), vec![Some(100.5), Some(101.0)]);
        assert_eq!(stub_level_set.update_count(), 3);
    }

    #[rstest]
    fn test_feed_positions_are_one_based(stub_level_set: ByLevelBookSet) {
        for (i, price) in [100.0, 99.0, 98.0].into_iter().enumerate() {
            stub_level_set
                .apply(level_tick(BookSide::Bid, TableCommand::Replace, i as u32 + 1, price))
                .unwrap();
        }

        stub_level_set
            .apply(level_tick(BookSide::Bid, TableCommand::Mod, 2, 42.0))
            .unwrap();
        assert_eq!(
            prices(stub_level_set.bids()),
            vec![Some(100.0), Some(42.0), Some(98.0)]
        );

        stub_level_set
            .apply(BookTick::without_entry(BookSide::Bid, TableCommand::Del, 1))
            .unwrap();
        assert_eq!(prices(stub_level_set.bids()), vec![Some(42.0), Some(98.0)]);
    }

    #[rstest]
    fn test_full_command_vocabulary(stub_level_set: ByLevelBookSet) {
        let bid = |command, position, price| level_tick(BookSide::Bid, command, position, price);
        let clear = |command| BookTick::<LevelPayload>::without_entry(BookSide::Bid, command, 0);

        stub_level_set
            .apply_batch([
                bid(TableCommand::Add, 1, 100.0),
                bid(TableCommand::Add, 2, 99.0),
                bid(TableCommand::Add, 3, 98.0),
                bid(TableCommand::Add, 4, 97.0),
            ])
            .unwrap();

        stub_level_set
            .apply(bid(TableCommand::Exec, 2, 99.5))
            .unwrap();
        assert_eq!(
            prices(stub_level_set.bids()),
            vec![Some(99.5), Some(98.0), Some(97.0)]
        );

        stub_level_set
            .apply(BookTick::without_entry(BookSide::Bid, TableCommand::DelBetter, 1))
            .unwrap();
        assert_eq!(prices(stub_level_set.bids()), vec![Some(98.0), Some(97.0)]);

        stub_level_set
            .apply(BookTick::without_entry(BookSide::Bid, TableCommand::ReplaceClear, 2))
            .unwrap();
        assert_eq!(prices(stub_level_set.bids()), vec![Some(98.0), None]);

        for command in [TableCommand::DelAll, TableCommand::DelSide, TableCommand::ClearAll] {
            stub_level_set.apply(bid(TableCommand::Add, 1, 1.0)).unwrap();
            stub_level_set.apply(clear(command)).unwrap();
            assert!(stub_level_set.bids().is_empty(), "{command} should clear the side");
        }
    }

    #[rstest]
    fn test_positional_command_with_zero_position(stub_level_set: ByLevelBookSet) {
        let result = stub_level_set.apply(level_tick(BookSide::Bid, TableCommand::Add, 0, 1.0));
        assert_eq!(result, Err(BookError::InvalidPosition(TableCommand::Add)));
        assert_eq!(stub_level_set.update_count(), 0);
    }

    #[rstest]
    fn test_data_command_without_entry(stub_level_set: ByLevelBookSet) {
        let result =
            stub_level_set.apply(BookTick::without_entry(BookSide::Ask, TableCommand::Mod, 1));
        assert_eq!(result, Err(BookError::MissingEntry(TableCommand::Mod)));
    }

    #[rstest]
    fn test_mod_on_missing_position_propagates(stub_level_set: ByLevelBookSet) {
        let result = stub_level_set.apply(level_tick(BookSide::Ask, TableCommand::Mod, 3, 1.0));
        assert_eq!(
            result,
            Err(BookError::PositionOutOfRange {
                command: TableCommand::Mod,
                position: 2,
                len: 0,
            })
        );
    }

    #[rstest]
    fn test_replace_by_broker_on_level_pair(stub_level_set: ByLevelBookSet) {
        let result = stub_level_set.apply(level_tick(
            BookSide::Bid,
            TableCommand::ReplaceByBroker,
            0,
            1.0,
        ));
        assert_eq!(
            result,
            Err(BookError::InvalidOperation(
                InvalidBookOperation::ReplaceByBroker(BookFlavor::ByLevel)
            ))
        );
    }

    #[rstest]
    fn test_replace_by_broker_ignores_position(stub_order_set: ByOrderBookSet) {
        let tick = BookTick::new(
            BookSide::Ask,
            TableCommand::ReplaceByBroker,
            0,
            order_entry(101.0, 5, "GSCO"),
        );
        stub_order_set.apply(tick).unwrap();

        let tombstone = BookTick::new(
            BookSide::Ask,
            TableCommand::ReplaceByBroker,
            0,
            order_entry(0.0, 0, "GSCO"),
        );
        stub_order_set.apply(tombstone.clone()).unwrap();
        stub_order_set.apply(tombstone).unwrap();
        assert!(stub_order_set.asks().is_empty());
    }

    #[rstest]
    fn test_gap_does_not_block_command(stub_level_set: ByLevelBookSet) {
        stub_level_set
            .apply(level_tick(BookSide::Bid, TableCommand::Add, 1, 100.0).with_sequence(1))
            .unwrap();

        let event = stub_level_set
            .apply(level_tick(BookSide::Bid, TableCommand::Add, 1, 101.0).with_sequence(5))
            .unwrap();

        assert_eq!(
            event,
            Some(FeedHealthEvent::GapDetected {
                book_type: Ustr::from("MBL"),
                expected: 2,
                received: 5,
            })
        );
        assert_eq!(stub_level_set.health_state(), FeedHealthState::GapDetected);
        assert_eq!(stub_level_set.bids().size(), 2);
    }

    #[rstest]
    fn test_observe_reports_gap_of_rejected_tick(stub_level_set: ByLevelBookSet) {
        stub_level_set
            .apply(level_tick(BookSide::Bid, TableCommand::Add, 1, 100.0).with_sequence(1))
            .unwrap();
        let tick = level_tick(BookSide::Bid, TableCommand::Mod, 2, 99.5).with_sequence(3);

        assert_eq!(
            stub_level_set.observe(&tick),
            Some(FeedHealthEvent::GapDetected {
                book_type: Ustr::from("MBL"),
                expected: 2,
                received: 3,
            })
        );
        assert_eq!(
            stub_level_set.apply_command(tick),
            Err(BookError::PositionOutOfRange {
                command: TableCommand::Mod,
                position: 1,
                len: 1,
            })
        );
        assert_eq!(stub_level_set.health_state(), FeedHealthState::GapDetected);
        assert_eq!(stub_level_set.update_count(), 1);
    }

    #[rstest]
    fn test_retransmission_recovers(stub_level_set: ByLevelBookSet) {
        stub_level_set
            .apply_batch([
                level_tick(BookSide::Ask, TableCommand::Add, 1, 101.0).with_sequence(10),
                level_tick(BookSide::Ask, TableCommand::Add, 1, 100.5).with_sequence(12),
            ])
            .unwrap();
        assert_eq!(stub_level_set.health_state(), FeedHealthState::GapDetected);

        stub_level_set.begin_retransmission(BookSide::Ask);
        stub_level_set
            .apply(
                level_tick(BookSide::Ask, TableCommand::Replace, 1, 100.5)
                    .with_sequence(11)
                    .retransmitted(),
            )
            .unwrap();
        assert_eq!(
            stub_level_set.end_retransmission(BookSide::Ask),
            Some(FeedHealthEvent::Recovered)
        );
        assert_eq!(stub_level_set.health_state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_initial_paint_resets_health(stub_level_set: ByLevelBookSet) {
        stub_level_set
            .apply_batch([
                level_tick(BookSide::Bid, TableCommand::Add, 1, 1.0).with_sequence(1),
                level_tick(BookSide::Bid, TableCommand::Add, 1, 2.0).with_sequence(3),
            ])
            .unwrap();
        stub_level_set.initial_paint(InitialPaint::new(5, "MBL", 2));
        assert_eq!(stub_level_set.health_state(), FeedHealthState::Normal);
        assert_eq!(stub_level_set.health().last_sequence(Ustr::from("MBL")), None);
    }

    #[rstest]
    fn test_apply_batch_stops_at_first_violation(stub_level_set: ByLevelBookSet) {
        let result = stub_level_set.apply_batch([
            level_tick(BookSide::Bid, TableCommand::Add, 1, 100.0),
            level_tick(BookSide::Bid, TableCommand::Mod, 5, 1.0),
            level_tick(BookSide::Bid, TableCommand::Add, 1, 101.0),
        ]);
        assert!(result.is_err());
        assert_eq!(prices(stub_level_set.bids()), vec![Some(100.0)]);
    }

    #[rstest]
    fn test_display(stub_level_set: ByLevelBookSet) {
        let entry = ByLevelEntry::by_level(100.0, "t", 1, 1);
        stub_level_set
            .apply(BookTick::new(BookSide::Bid, TableCommand::Add, 1, entry))
            .unwrap();
        assert_eq!(
            stub_level_set.to_string(),
            "DualSidedBookSet(flavor=BY_LEVEL, book_type=MBL, window_size=5, bids=1, asks=0, health=NORMAL, update_count=1)"
        );
    }
}
