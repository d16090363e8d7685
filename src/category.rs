// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Category share tracking.
//!
//! A worker on the category queue keeps a running histogram over the fixed
//! merchandise category set and derives percentage shares on every update.
//! The histogram is a live monitoring statistic: it is never persisted and is
//! lost on worker restart.

use crate::error::EventError;
use std::fmt;
use std::str::FromStr;

/// Fixed merchandise category set, shared with the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Electronics,
    Clothing,
    Books,
    HomeAndGarden,
    SportsAndOutdoors,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Electronics,
        Self::Clothing,
        Self::Books,
        Self::HomeAndGarden,
        Self::SportsAndOutdoors,
    ];

    /// Wire label, exactly as the producer publishes it.
    pub fn label(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Books => "Books",
            Self::HomeAndGarden => "Home & Garden",
            Self::SportsAndOutdoors => "Sports & Outdoors",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for Category {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.label() == s)
            .ok_or_else(|| EventError::UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One category's row in a share snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryShare {
    pub category: Category,
    pub count: u64,
    /// Percentage of all accepted category events, 0..=100.
    pub percent: f64,
}

/// Running histogram of category occurrences for one worker.
///
/// # Invariants
///
/// - Every count is non-negative and only ever grows.
/// - The sum of counts equals the number of accepted category events.
/// - Percentages sum to 100 (within float rounding) whenever any event has
///   been accepted; no percentages exist before that.
#[derive(Debug, Default)]
pub struct CategoryAggregator {
    counts: [u64; Category::ALL.len()],
}

impl CategoryAggregator {
    /// Creates an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of accepted category events.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Count for one category.
    pub fn count(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    /// Records one category occurrence and returns the updated shares.
    ///
    /// Recording is deliberately not idempotent: every accepted event
    /// increments its category.
    ///
    /// # Errors
    ///
    /// [`EventError::UnknownCategory`] if the label is outside the fixed set;
    /// the histogram is left untouched.
    pub fn record(&mut self, label: &str) -> Result<Vec<CategoryShare>, EventError> {
        let category: Category = label.parse()?;
        self.counts[category.index()] += 1;
        let shares = self.shares();
        self.assert_invariants(&shares);
        Ok(shares)
    }

    /// Percentage share per category; empty while no event has been accepted.
    pub fn shares(&self) -> Vec<CategoryShare> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }
        Category::ALL
            .iter()
            .map(|&category| {
                let count = self.count(category);
                CategoryShare {
                    category,
                    count,
                    percent: (count as f64 / total as f64) * 100.0,
                }
            })
            .collect()
    }

    fn assert_invariants(&self, shares: &[CategoryShare]) {
        let sum: f64 = shares.iter().map(|share| share.percent).sum();
        debug_assert!(
            shares.is_empty() || (sum - 100.0).abs() < 1e-6,
            "Invariant violated: shares sum to {sum}, not 100"
        );
    }
}
