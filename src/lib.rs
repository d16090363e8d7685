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

//! # storestream
//!
//! Consumer-side processing for a small retail event pipeline: a producer
//! publishes synthetic transaction events onto per-field RabbitMQ queues
//! (payment method, payment amount, category), and independent workers apply
//! stateful business rules to each stream.
//!
//! ## Core Components
//!
//! - [`decode`] / [`Event`]: typed decoding of raw queue payloads
//! - [`DiscountEngine`]: store-card discount rule and purchase-alert trigger
//! - [`CategoryAggregator`]: running category histogram with percentage shares
//! - [`Worker`]: per-queue dispatch of decoded events to the owning engine
//! - [`QueueConsumer`]: durable-queue consume loop with manual acks and
//!   prefetch = 1
//! - [`AlertNotifier`]: delivery boundary for alerts (the shipped
//!   [`LogNotifier`] logs them)
//!
//! ## Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use storestream::{CategoryAggregator, DiscountEngine};
//!
//! let mut discounts = DiscountEngine::new();
//! discounts.observe_amount(dec!(500.00), None).unwrap();
//!
//! // Store-card usage: 10% off the last observed price, alert at >= 425.00.
//! let alert = discounts.check_method("Store Card").unwrap().unwrap();
//! assert!(alert.body.contains("450.00"));
//!
//! let mut categories = CategoryAggregator::new();
//! let shares = categories.record("Books").unwrap();
//! assert_eq!(shares.iter().map(|s| s.count).sum::<u64>(), 1);
//! ```
//!
//! ## Concurrency
//!
//! All per-queue state is owned by a single worker and mutated strictly
//! sequentially; concurrency comes from running more worker processes against
//! the same queue, never from sharing state.

mod base;
pub mod category;
pub mod consumer;
pub mod discount;
pub mod error;
mod event;
mod notify;
mod worker;

pub use base::QueueKind;
pub use category::{Category, CategoryAggregator, CategoryShare};
pub use consumer::{ConsumerState, QueueConsumer};
pub use discount::{DISCOUNT_METHOD, Discount, DiscountEngine};
pub use error::EventError;
pub use event::{Event, decode};
pub use notify::{AlertMessage, AlertNotifier, LogNotifier};
pub use worker::Worker;
