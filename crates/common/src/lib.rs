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

//! Logging, book routing and feed dispatch for the depth book cache.
//!
//! The `depthbook-common` crate sits between a market-data session and the books held in
//! `depthbook-model`:
//!
//! - [`logging`]: a `log` backend writing from a dedicated thread.
//! - [`session`]: the market-data session seam.
//! - [`registry`]: correlation-keyed routing to book pairs.
//! - [`dispatch`]: applies feed events and drives re-subscription.
//! - [`config`]: dispatcher configuration.

pub mod config;
pub mod dispatch;
pub mod logging;
pub mod registry;
pub mod session;
