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

//! Category aggregator public API tests.

use storestream::{Category, CategoryAggregator, CategoryShare, EventError};

fn share_for(shares: &[CategoryShare], category: Category) -> CategoryShare {
    *shares
        .iter()
        .find(|share| share.category == category)
        .expect("every known category appears in the snapshot")
}

#[test]
fn counts_and_percentages_after_three_events() {
    let mut aggregator = CategoryAggregator::new();
    aggregator.record("Electronics").unwrap();
    aggregator.record("Electronics").unwrap();
    let shares = aggregator.record("Books").unwrap();

    let electronics = share_for(&shares, Category::Electronics);
    assert_eq!(electronics.count, 2);
    assert!((electronics.percent - 66.67).abs() < 0.01);

    let books = share_for(&shares, Category::Books);
    assert_eq!(books.count, 1);
    assert!((books.percent - 33.33).abs() < 0.01);

    let sum: f64 = shares.iter().map(|share| share.percent).sum();
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn snapshot_covers_the_whole_fixed_set() {
    let mut aggregator = CategoryAggregator::new();
    let shares = aggregator.record("Clothing").unwrap();

    assert_eq!(shares.len(), Category::ALL.len());
    assert_eq!(share_for(&shares, Category::Electronics).count, 0);
    assert_eq!(share_for(&shares, Category::Electronics).percent, 0.0);
    assert_eq!(share_for(&shares, Category::Clothing).percent, 100.0);
}

#[test]
fn unknown_category_is_rejected_without_side_effects() {
    let mut aggregator = CategoryAggregator::new();

    let result = aggregator.record("Toys");
    assert_eq!(result, Err(EventError::UnknownCategory("Toys".to_string())));
    assert_eq!(aggregator.total(), 0);
    assert!(aggregator.shares().is_empty());
}

#[test]
fn unknown_category_leaves_existing_counts_alone() {
    let mut aggregator = CategoryAggregator::new();
    aggregator.record("Books").unwrap();

    assert!(aggregator.record("Groceries").is_err());
    assert_eq!(aggregator.total(), 1);
    assert_eq!(aggregator.count(Category::Books), 1);
}

#[test]
fn no_percentages_before_the_first_event() {
    let aggregator = CategoryAggregator::new();
    assert_eq!(aggregator.total(), 0);
    assert!(aggregator.shares().is_empty());
}

#[test]
fn recording_is_monotonic_not_idempotent() {
    let mut aggregator = CategoryAggregator::new();
    aggregator.record("Books").unwrap();
    aggregator.record("Books").unwrap();

    // Each event increments; replaying a category is not a no-op.
    assert_eq!(aggregator.count(Category::Books), 2);
    assert_eq!(aggregator.total(), 2);
}

#[test]
fn labels_round_trip_through_parsing() {
    for category in Category::ALL {
        assert_eq!(category.label().parse::<Category>(), Ok(category));
    }
}

#[test]
fn labels_with_ampersands_parse() {
    assert_eq!(
        "Home & Garden".parse::<Category>(),
        Ok(Category::HomeAndGarden)
    );
    assert_eq!(
        "Sports & Outdoors".parse::<Category>(),
        Ok(Category::SportsAndOutdoors)
    );
}

#[test]
fn parsing_is_case_sensitive() {
    assert!("books".parse::<Category>().is_err());
    assert!("ELECTRONICS".parse::<Category>().is_err());
}
