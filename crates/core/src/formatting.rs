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

//! Number formatting utilities for book prices and sizes.

/// Upper bound on decimals rendered for a price, matching `f64` significance.
pub const MAX_PRICE_DECIMALS: u32 = 9;

fn separate_with(s: &str, sep: char) -> String {
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (int_part, dec_part) = match digits.find('.') {
        Some(pos) => digits.split_at(pos),
        None => (digits, ""),
    };

    let mut result = String::with_capacity(s.len() + int_part.len() / 3);
    if neg {
        result.push('-');
    }

    let len = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (len - i).is_multiple_of(3) {
            result.push(sep);
        }
        result.push(c);
    }

    result.push_str(dec_part);
    result
}

/// Extension trait for formatting numbers with thousands separators.
pub trait Separable {
    /// Formats the number with commas as thousands separators.
    fn separate_with_commas(&self) -> String;
}

macro_rules! impl_separable {
    ($($t:ty),*) => {
        $(
            impl Separable for $t {
                fn separate_with_commas(&self) -> String {
                    separate_with(&self.to_string(), ',')
                }
            }
        )*
    };
}

impl_separable!(u32, u64, usize, i64, f64);

/// Formats a book price with exactly `max_decimals` decimal places.
///
/// The precision hint is clamped to [`MAX_PRICE_DECIMALS`]. Non-finite values are
/// rendered as-is.
#[must_use]
pub fn format_price(value: f64, max_decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let precision = max_decimals.min(MAX_PRICE_DECIMALS) as usize;
    separate_with(&format!("{value:.precision$}"), ',')
}
