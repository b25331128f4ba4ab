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

//! Routes feed events to book pairs and drives re-subscription on feed gaps.

use std::sync::Arc;

use depthbook_core::CorrelationId;
use depthbook_model::{
    data::{BookTick, EntryPayload, InitialPaint},
    enums::BookSide,
    orderbook::{DualSidedBookSet, FeedHealthEvent},
};
use ustr::Ustr;

use crate::{config::DispatcherConfig, registry::BookRegistry, session::MarketDataSession};

/// An event delivered by the market-data session for one subscription.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent<P: EntryPayload> {
    /// The full book image sent on (re-)subscription.
    InitialPaint(InitialPaint<P>),
    /// A single table command.
    Tick(BookTick<P>),
    /// A multi-tick update, applied in order.
    TickBatch(Vec<BookTick<P>>),
    /// The session started retransmitting one side.
    RetransmissionBegin(BookSide),
    /// The session finished retransmitting one side.
    RetransmissionEnd(BookSide),
}

/// Applies session events to the registered book pairs.
///
/// The dispatcher owns the registry. Subscriptions are created through
/// [`BookDispatcher::subscribe`], which assigns the [`CorrelationId`] the session must tag its
/// events with; events for handles that are not (or no longer) registered are dropped.
#[derive(Debug)]
pub struct BookDispatcher<P: EntryPayload, S: MarketDataSession> {
    config: DispatcherConfig,
    registry: BookRegistry<P>,
    session: S,
}

impl<P: EntryPayload, S: MarketDataSession> BookDispatcher<P, S> {
    /// Creates a new [`BookDispatcher`] instance.
    #[must_use]
    pub fn new(config: DispatcherConfig, session: S) -> Self {
        Self {
            config,
            registry: BookRegistry::new(),
            session,
        }
    }

    /// Returns the dispatcher configuration.
    #[must_use]
    pub const fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Returns the registry of subscribed pairs.
    #[must_use]
    pub const fn registry(&self) -> &BookRegistry<P> {
        &self.registry
    }

    /// Returns the market-data session.
    #[must_use]
    pub const fn session(&self) -> &S {
        &self.session
    }

    /// Returns the pair registered under `correlation_id`, if any.
    #[must_use]
    pub fn book(&self, correlation_id: CorrelationId) -> Option<Arc<DualSidedBookSet<P>>> {
        self.registry.get(&correlation_id)
    }

    /// Registers a new pair for `topic` and subscribes the session to it.
    ///
    /// Until its initial paint arrives the pair is bounded by the configured default window.
    ///
    /// # Errors
    ///
    /// Returns an error if the session rejects the subscription, in which case nothing stays
    /// registered.
    pub fn subscribe(&self, topic: &str) -> anyhow::Result<CorrelationId> {
        let correlation_id = CorrelationId::generate();
        let book = Arc::new(DualSidedBookSet::<P>::new());
        for side in [BookSide::Bid, BookSide::Ask] {
            book.side(side)
                .configure(self.config.default_window_size, Ustr::default(), 0);
        }

        self.registry
            .insert(correlation_id, Ustr::from(topic), book);

        if let Err(e) = self.session.subscribe(correlation_id, topic) {
            self.registry.remove(&correlation_id);
            log::error!("Failed to subscribe {topic}: {e}");
            return Err(e);
        }

        log::info!("Subscribed {topic} ({}) as {correlation_id}", P::FLAVOR);
        Ok(correlation_id)
    }

    /// Unsubscribes `correlation_id` and removes its pair.
    ///
    /// Returns `false` if nothing was registered under `correlation_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails to unsubscribe. The pair is removed regardless.
    pub fn unsubscribe(&self, correlation_id: CorrelationId) -> anyhow::Result<bool> {
        let Some(route) = self.registry.remove(&correlation_id) else {
            log::warn!("Cannot unsubscribe {correlation_id}: not registered");
            return Ok(false);
        };

        self.session.unsubscribe(correlation_id)?;
        log::info!("Unsubscribed {} ({correlation_id})", route.topic);
        Ok(true)
    }

    /// Unsubscribes every registered pair, stopping at the first session failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the session fails to unsubscribe.
    pub fn unsubscribe_all(&self) -> anyhow::Result<()> {
        for correlation_id in self.registry.correlation_ids() {
            self.unsubscribe(correlation_id)?;
        }
        Ok(())
    }

    /// Applies `event` to the pair registered under `correlation_id`.
    ///
    /// Returns the feed-health events the update raised. Events for unknown handles are
    /// ignored. A gap asks the session to re-subscribe when `resubscribe_on_gap` is set, even
    /// when the tick carrying it is then rejected; a failed re-subscribe is logged and does not
    /// fail the update.
    ///
    /// # Errors
    ///
    /// Returns the [`BookError`](depthbook_model::orderbook::BookError) of the first tick
    /// which violates the book contract. Ticks of a batch before it remain applied.
    pub fn handle(
        &self,
        correlation_id: CorrelationId,
        event: FeedEvent<P>,
    ) -> anyhow::Result<Vec<FeedHealthEvent>> {
        let Some(book) = self.registry.get(&correlation_id) else {
            log::debug!("Dropping event for unknown {correlation_id}");
            return Ok(Vec::new());
        };

        let mut health_events = Vec::new();

        match event {
            FeedEvent::InitialPaint(paint) => book.initial_paint(paint),
            FeedEvent::Tick(tick) => {
                if let Some(health_event) = self.apply_tick(correlation_id, &book, tick)? {
                    health_events.push(health_event);
                }
            }
            FeedEvent::TickBatch(ticks) => {
                for tick in ticks {
                    if let Some(health_event) = self.apply_tick(correlation_id, &book, tick)? {
                        health_events.push(health_event);
                    }
                }
            }
            FeedEvent::RetransmissionBegin(side) => book.begin_retransmission(side),
            FeedEvent::RetransmissionEnd(side) => {
                if let Some(health_event) = book.end_retransmission(side) {
                    self.on_health_event(correlation_id, health_event);
                    health_events.push(health_event);
                }
            }
        }

        Ok(health_events)
    }

    fn apply_tick(
        &self,
        correlation_id: CorrelationId,
        book: &DualSidedBookSet<P>,
        tick: BookTick<P>,
    ) -> anyhow::Result<Option<FeedHealthEvent>> {
        let (side, command, position) = (tick.side, tick.command, tick.position);

        // Act on the sequence first: a gap often shows up as the tick that fails
        let health_event = book.observe(&tick);
        if let Some(health_event) = health_event {
            self.on_health_event(correlation_id, health_event);
        }

        if let Err(e) = book.apply_command(tick) {
            log::error!(
                "Rejected {command} at position {position} on {side} side for {correlation_id}: {e}"
            );
            return Err(e.into());
        }

        Ok(health_event)
    }

    fn on_health_event(&self, correlation_id: CorrelationId, event: FeedHealthEvent) {
        match event {
            FeedHealthEvent::GapDetected { .. } => {
                if !self.config.resubscribe_on_gap {
                    return;
                }
                log::warn!("Re-subscribing {correlation_id} after sequence gap");
                if let Err(e) = self.session.resubscribe(correlation_id) {
                    log::error!("Failed to re-subscribe {correlation_id}: {e}");
                }
            }
            FeedHealthEvent::Recovered => {
                log::info!("Feed recovered for {correlation_id}");
            }
        }
    }
}
