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

//! The market-data session seam.

use depthbook_core::CorrelationId;

/// A live market-data session which delivers depth feeds for subscribed topics.
///
/// Each subscription is identified by the [`CorrelationId`] the dispatcher assigns, and the
/// session tags every event it emits for that topic with the same handle.
pub trait MarketDataSession {
    /// Subscribes to the depth feed for `topic`.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscribe request fails.
    fn subscribe(&self, correlation_id: CorrelationId, topic: &str) -> anyhow::Result<()>;

    /// Re-subscribes the feed behind `correlation_id`, requesting a fresh initial paint.
    ///
    /// # Errors
    ///
    /// Returns an error if the re-subscribe request fails.
    fn resubscribe(&self, correlation_id: CorrelationId) -> anyhow::Result<()>;

    /// Unsubscribes the feed behind `correlation_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the unsubscribe request fails.
    fn unsubscribe(&self, correlation_id: CorrelationId) -> anyhow::Result<()> {
        log::warn!("unsubscribe not implemented for {correlation_id}");
        Ok(())
    }
}
