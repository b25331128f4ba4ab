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

//! Market-depth book model.
//!
//! The `depthbook-model` crate holds the position-indexed order-book cache fed by a live
//! market-depth stream:
//!
//! - [`data`]: book entries (by-order and by-level) and feed ticks.
//! - [`enums`]: sides, table commands, flavors and feed-health states.
//! - [`orderbook`]: the per-side book, the bid/ask pair and feed-health tracking.
//!
//! # Feature flags
//!
//! - `stubs`: enables `rstest` fixtures for testing downstream crates.

pub mod data;
pub mod enums;
pub mod orderbook;
