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

//! Error types for market-depth book operations.

use crate::enums::{BookFlavor, TableCommand};

/// An operation the book flavor does not support.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidBookOperation {
    #[error("Invalid book operation: cannot replace by broker for {0} book")]
    ReplaceByBroker(BookFlavor),
}

/// A contract violation between the feed and the book cache.
///
/// These indicate the cache has desynchronized from the feed. They are never absorbed by the
/// book; benign conditions (deleting beyond the side, missing broker) do not produce errors.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
pub enum BookError {
    #[error("Position out of range for {command}: position={position}, len={len}")]
    PositionOutOfRange {
        command: TableCommand,
        position: usize,
        len: usize,
    },
    #[error("Invalid feed position 0 for {0} (feed positions are 1-based)")]
    InvalidPosition(TableCommand),
    #[error("Missing entry data for {0}")]
    MissingEntry(TableCommand),
    #[error(transparent)]
    InvalidOperation(#[from] InvalidBookOperation),
}
