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

//! Feed-health tracking for a market-depth book pair.
//!
//! The tracker watches sequence continuity and retransmission signals. It never mutates book
//! entries: a detected gap is surfaced as a [`FeedHealthEvent`] so the owner of the feed
//! session can re-subscribe, while ticks keep being applied.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::enums::{BookSide, FeedHealthState};

/// A change in feed health which the session owner may act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedHealthEvent {
    /// A sequence number jumped outside of a retransmission.
    GapDetected {
        book_type: Ustr,
        expected: u64,
        received: u64,
    },
    /// A retransmission completed without a further gap.
    Recovered,
}

/// Sequence and retransmission state for one book pair.
#[derive(Clone, Debug, Default)]
pub struct FeedHealth {
    last_sequence: AHashMap<Ustr, u64>,
    retransmitting_bid: bool,
    retransmitting_ask: bool,
    gap_detected: bool,
    further_gap: bool,
}

impl FeedHealth {
    /// Creates a new [`FeedHealth`] in the normal state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    ///
    /// A detected gap takes precedence over retransmission, and bid retransmission over ask.
    #[must_use]
    pub const fn state(&self) -> FeedHealthState {
        if self.gap_detected {
            FeedHealthState::GapDetected
        } else if self.retransmitting_bid {
            FeedHealthState::RetransmittingBid
        } else if self.retransmitting_ask {
            FeedHealthState::RetransmittingAsk
        } else {
            FeedHealthState::Normal
        }
    }

    /// Returns whether a gap was detected and not yet repaired.
    #[must_use]
    pub const fn is_gap_detected(&self) -> bool {
        self.gap_detected
    }

    /// Returns whether `side` is being retransmitted.
    #[must_use]
    pub const fn is_retransmitting(&self, side: BookSide) -> bool {
        match side {
            BookSide::Bid => self.retransmitting_bid,
            BookSide::Ask => self.retransmitting_ask,
        }
    }

    /// Returns the last sequence number seen for `book_type`.
    #[must_use]
    pub fn last_sequence(&self, book_type: Ustr) -> Option<u64> {
        self.last_sequence.get(&book_type).copied()
    }

    const fn any_retransmitting(&self) -> bool {
        self.retransmitting_bid || self.retransmitting_ask
    }

    /// Records the sequence number of a tick for `book_type`.
    ///
    /// Returns [`FeedHealthEvent::GapDetected`] when the sequence jumps by more than one and
    /// neither the tick nor its side is flagged as retransmission. Sequence numbers never move
    /// backwards; a regression outside of a retransmission is logged and otherwise ignored.
    pub fn on_sequence(
        &mut self,
        book_type: Ustr,
        side: BookSide,
        sequence: u64,
        is_retransmission: bool,
    ) -> Option<FeedHealthEvent> {
        let retransmitting = is_retransmission || self.is_retransmitting(side);

        let Some(last) = self.last_sequence(book_type) else {
            self.last_sequence.insert(book_type, sequence);
            return None;
        };

        if sequence <= last {
            if !retransmitting {
                log::warn!(
                    "Sequence did not advance for book_type={book_type}: last={last}, received={sequence}"
                );
            }
            return None;
        }

        self.last_sequence.insert(book_type, sequence);

        if sequence - last == 1 || retransmitting {
            return None;
        }

        if self.gap_detected && self.any_retransmitting() {
            self.further_gap = true;
        }
        self.gap_detected = true;

        let expected = last + 1;
        log::warn!(
            "Sequence gap detected for book_type={book_type}: expected={expected}, received={sequence}"
        );

        Some(FeedHealthEvent::GapDetected {
            book_type,
            expected,
            received: sequence,
        })
    }

    /// Marks the start of a retransmission for `side`.
    pub fn begin_retransmission(&mut self, side: BookSide) {
        if !self.any_retransmitting() {
            self.further_gap = false;
        }

        match side {
            BookSide::Bid => self.retransmitting_bid = true,
            BookSide::Ask => self.retransmitting_ask = true,
        }
    }

    /// Marks the end of a retransmission for `side`.
    ///
    /// Returns [`FeedHealthEvent::Recovered`] if this completes every outstanding
    /// retransmission while a gap was flagged and no further gap was seen meanwhile.
    pub fn end_retransmission(&mut self, side: BookSide) -> Option<FeedHealthEvent> {
        match side {
            BookSide::Bid => self.retransmitting_bid = false,
            BookSide::Ask => self.retransmitting_ask = false,
        }

        if self.any_retransmitting() || !self.gap_detected {
            return None;
        }

        if self.further_gap {
            self.further_gap = false;
            log::warn!("Retransmission completed with a further gap, still awaiting recovery");
            return None;
        }

        self.gap_detected = false;
        Some(FeedHealthEvent::Recovered)
    }

    /// Returns to the normal state, forgetting all sequence numbers.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn mbl() -> Ustr {
        Ustr::from("MBL")
    }

    #[rstest]
    fn test_new_is_normal() {
        let health = FeedHealth::new();
        assert_eq!(health.state(), FeedHealthState::Normal);
        assert!(!health.is_gap_detected());
    }

    #[rstest]
    fn test_contiguous_sequences(mbl: Ustr) {
        let mut health = FeedHealth::new();
        for sequence in 1..=10 {
            assert!(health.on_sequence(mbl, BookSide::Bid, sequence, false).is_none());
        }
        assert_eq!(health.last_sequence(mbl), Some(10));
        assert_eq!(health.state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_gap_detected(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 1, false);

        let event = health.on_sequence(mbl, BookSide::Ask, 4, false);
        assert_eq!(
            event,
            Some(FeedHealthEvent::GapDetected {
                book_type: mbl,
                expected: 2,
                received: 4,
            })
        );
        assert_eq!(health.state(), FeedHealthState::GapDetected);
        assert_eq!(health.last_sequence(mbl), Some(4));
    }

    #[rstest]
    fn test_jump_flagged_as_retransmission_is_not_gap(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 1, false);
        assert!(health.on_sequence(mbl, BookSide::Bid, 9, true).is_none());
        assert_eq!(health.state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_jump_on_retransmitting_side_is_not_gap(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Ask, 1, false);
        health.begin_retransmission(BookSide::Ask);
        assert_eq!(health.state(), FeedHealthState::RetransmittingAsk);

        assert!(health.on_sequence(mbl, BookSide::Ask, 5, false).is_none());
        assert!(health.on_sequence(mbl, BookSide::Bid, 9, false).is_some());
    }

    #[rstest]
    fn test_sequences_tracked_per_book_type(mbl: Ustr) {
        let mbo = Ustr::from("MBO");
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 100, false);
        health.on_sequence(mbo, BookSide::Bid, 7, false);

        assert!(health.on_sequence(mbl, BookSide::Bid, 101, false).is_none());
        assert!(health.on_sequence(mbo, BookSide::Bid, 8, false).is_none());
        assert_eq!(health.last_sequence(mbo), Some(8));
    }

    #[rstest]
    fn test_regression_is_ignored(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 10, false);
        assert!(health.on_sequence(mbl, BookSide::Bid, 3, false).is_none());
        assert_eq!(health.last_sequence(mbl), Some(10));
        assert_eq!(health.state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_recovery_after_retransmission(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 1, false);
        health.on_sequence(mbl, BookSide::Bid, 3, false);

        health.begin_retransmission(BookSide::Bid);
        health.begin_retransmission(BookSide::Ask);
        assert_eq!(health.state(), FeedHealthState::GapDetected);
        assert!(health.is_retransmitting(BookSide::Bid));

        assert!(health.end_retransmission(BookSide::Bid).is_none());
        assert_eq!(
            health.end_retransmission(BookSide::Ask),
            Some(FeedHealthEvent::Recovered)
        );
        assert_eq!(health.state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_further_gap_blocks_recovery(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 1, false);
        health.on_sequence(mbl, BookSide::Bid, 3, false);

        health.begin_retransmission(BookSide::Ask);
        assert!(health.on_sequence(mbl, BookSide::Bid, 6, false).is_some());
        assert!(health.end_retransmission(BookSide::Ask).is_none());
        assert_eq!(health.state(), FeedHealthState::GapDetected);

        health.begin_retransmission(BookSide::Bid);
        assert_eq!(
            health.end_retransmission(BookSide::Bid),
            Some(FeedHealthEvent::Recovered)
        );
    }

    #[rstest]
    fn test_end_without_gap_is_silent() {
        let mut health = FeedHealth::new();
        health.begin_retransmission(BookSide::Bid);
        assert_eq!(health.state(), FeedHealthState::RetransmittingBid);
        assert!(health.end_retransmission(BookSide::Bid).is_none());
        assert_eq!(health.state(), FeedHealthState::Normal);
    }

    #[rstest]
    fn test_reset(mbl: Ustr) {
        let mut health = FeedHealth::new();
        health.on_sequence(mbl, BookSide::Bid, 1, false);
        health.on_sequence(mbl, BookSide::Bid, 5, false);
        health.reset();
        assert_eq!(health.state(), FeedHealthState::Normal);
        assert_eq!(health.last_sequence(mbl), None);
    }
}
