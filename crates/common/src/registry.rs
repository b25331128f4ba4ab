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

//! Correlation-keyed routing from feed events to book pairs.

use std::sync::Arc;

use dashmap::DashMap;
use depthbook_core::CorrelationId;
use depthbook_model::{data::EntryPayload, orderbook::DualSidedBookSet};
use ustr::Ustr;

/// A registered pair together with the topic it was subscribed under.
#[derive(Debug)]
pub struct BookRoute<P: EntryPayload> {
    pub topic: Ustr,
    pub book: Arc<DualSidedBookSet<P>>,
}

impl<P: EntryPayload> Clone for BookRoute<P> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic,
            book: Arc::clone(&self.book),
        }
    }
}

/// Maps correlation handles to the book pairs they feed.
///
/// Lookups and removals may race with each other from any thread. A pair handed out by
/// [`BookRegistry::get`] stays alive until the caller drops it, even if it was removed meanwhile.
#[derive(Debug)]
pub struct BookRegistry<P: EntryPayload> {
    routes: DashMap<CorrelationId, BookRoute<P>>,
}

impl<P: EntryPayload> Default for BookRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: EntryPayload> BookRegistry<P> {
    /// Creates a new empty [`BookRegistry`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
        }
    }

    /// Registers `book` under `correlation_id`.
    ///
    /// Returns the previously registered route if one existed.
    pub fn insert(
        &self,
        correlation_id: CorrelationId,
        topic: Ustr,
        book: Arc<DualSidedBookSet<P>>,
    ) -> Option<BookRoute<P>> {
        self.routes
            .insert(correlation_id, BookRoute { topic, book })
    }

    /// Returns the pair registered under `correlation_id`, if any.
    #[must_use]
    pub fn get(&self, correlation_id: &CorrelationId) -> Option<Arc<DualSidedBookSet<P>>> {
        self.routes
            .get(correlation_id)
            .map(|route| Arc::clone(&route.book))
    }

    /// Returns the topic registered under `correlation_id`, if any.
    #[must_use]
    pub fn topic(&self, correlation_id: &CorrelationId) -> Option<Ustr> {
        self.routes.get(correlation_id).map(|route| route.topic)
    }

    /// Returns the correlation handle of the first route subscribed under `topic`, if any.
    #[must_use]
    pub fn find_topic(&self, topic: &str) -> Option<CorrelationId> {
        self.routes
            .iter()
            .find(|route| route.topic.as_str() == topic)
            .map(|route| *route.key())
    }

    /// Removes the route registered under `correlation_id`.
    pub fn remove(&self, correlation_id: &CorrelationId) -> Option<BookRoute<P>> {
        self.routes
            .remove(correlation_id)
            .map(|(_, route)| route)
    }

    /// Returns `true` if a route is registered under `correlation_id`.
    #[must_use]
    pub fn contains(&self, correlation_id: &CorrelationId) -> bool {
        self.routes.contains_key(correlation_id)
    }

    /// Returns the registered correlation handles.
    #[must_use]
    pub fn correlation_ids(&self) -> Vec<CorrelationId> {
        self.routes.iter().map(|route| *route.key()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Removes every route.
    pub fn clear(&self) {
        self.routes.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use depthbook_model::orderbook::{ByLevelBookSet, stubs::stub_level_set};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_new_registry_is_empty() {
        let registry = BookRegistry::<depthbook_model::data::LevelPayload>::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get(&CorrelationId::new(1)).is_none());
    }

    #[rstest]
    fn test_insert_get_and_remove(stub_level_set: ByLevelBookSet) {
        let registry = BookRegistry::new();
        let id = CorrelationId::new(7);
        let book = Arc::new(stub_level_set);

        assert!(
            registry
                .insert(id, Ustr::from("ESZ4"), Arc::clone(&book))
                .is_none()
        );
        assert!(registry.contains(&id));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.topic(&id), Some(Ustr::from("ESZ4")));
        assert_eq!(registry.find_topic("ESZ4"), Some(id));
        assert_eq!(registry.find_topic("NQZ4"), None);

        let routed = registry.get(&id).unwrap();
        assert!(Arc::ptr_eq(&routed, &book));

        let removed = registry.remove(&id).unwrap();
        assert_eq!(removed.topic, Ustr::from("ESZ4"));
        assert!(registry.is_empty());
        assert!(registry.remove(&id).is_none());

        // Outstanding handles stay usable after removal
        assert_eq!(routed.window_size(), book.window_size());
    }

    #[rstest]
    fn test_insert_replaces_existing_route() {
        let registry = BookRegistry::new();
        let id = CorrelationId::new(1);
        registry.insert(id, Ustr::from("ESZ4"), Arc::new(ByLevelBookSet::new()));

        let previous = registry.insert(id, Ustr::from("NQZ4"), Arc::new(ByLevelBookSet::new()));

        assert_eq!(previous.unwrap().topic, Ustr::from("ESZ4"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.topic(&id), Some(Ustr::from("NQZ4")));
    }

    #[rstest]
    fn test_clear() {
        let registry = BookRegistry::new();
        for value in 1..=3 {
            registry.insert(
                CorrelationId::new(value),
                Ustr::from("ESZ4"),
                Arc::new(ByLevelBookSet::new()),
            );
        }
        let mut ids = registry.correlation_ids();
        ids.sort();
        assert_eq!(
            ids,
            vec![
                CorrelationId::new(1),
                CorrelationId::new(2),
                CorrelationId::new(3)
            ]
        );

        registry.clear();

        assert!(registry.is_empty());
    }

    #[rstest]
    fn test_concurrent_insert_and_lookup() {
        let registry = Arc::new(BookRegistry::<depthbook_model::data::LevelPayload>::new());

        let handles: Vec<_> = (0..4_u64)
            .map(|worker| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..100_u64 {
                        let id = CorrelationId::new(worker * 1_000 + i);
                        registry.insert(id, Ustr::from("ESZ4"), Arc::new(DualSidedBookSet::new()));
                        assert!(registry.get(&id).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 400);
    }
}
