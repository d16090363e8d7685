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

//! Store-card discount rule and alert trigger.
//!
//! The engine holds the most recently observed reference price and applies a
//! 10% reduction to it whenever the discount-eligible payment method is seen.
//! Discounted prices at or above the alert threshold produce an
//! [`AlertMessage`].
//!
//! All arithmetic stays in [`Decimal`] with no mid-computation rounding;
//! two-decimal half-up rounding happens only when a price is formatted for
//! output.

use crate::error::EventError;
use crate::notify::AlertMessage;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

/// Payment method that triggers the price-reduction rule.
pub const DISCOUNT_METHOD: &str = "Store Card";

/// Fraction taken off the reference price for eligible purchases.
const DISCOUNT_RATE: Decimal = dec!(0.10);

/// Discounted prices at or above this trigger an alert.
const ALERT_THRESHOLD: Decimal = dec!(425.00);

const ALERT_SUBJECT: &str = "Store Card Purchase Alert";

/// A computed price reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discount {
    pub original: Decimal,
    pub discounted: Decimal,
}

/// Stateful discount engine, one per worker.
///
/// The reference price is last-write-wins over the amounts this worker has
/// seen, in broker delivery order. It is owned exclusively by its worker;
/// workers never share price state.
#[derive(Debug, Default)]
pub struct DiscountEngine {
    reference_price: Option<Decimal>,
}

impl DiscountEngine {
    /// Creates an engine with no observed price.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently observed reference price, if any.
    pub fn reference_price(&self) -> Option<Decimal> {
        self.reference_price
    }

    /// Folds one amount observation into the engine.
    ///
    /// The reference price is overwritten unconditionally, even on the error
    /// path. When the observation itself was paid with the eligible method,
    /// the discount is computed against the price known *before* this
    /// overwrite: the rule models "discount on the last observed price at the
    /// time of this card usage", not on the purchase itself.
    ///
    /// # Errors
    ///
    /// [`EventError::NoReferencePrice`] when the eligible method is seen
    /// before any prior price was observed.
    pub fn observe_amount(
        &mut self,
        amount: Decimal,
        method: Option<&str>,
    ) -> Result<Option<AlertMessage>, EventError> {
        let prior = self.reference_price.replace(amount);
        match method {
            Some(method) if method == DISCOUNT_METHOD => Self::evaluate(prior),
            _ => Ok(None),
        }
    }

    /// Discount check for a standalone payment-method observation.
    ///
    /// Non-eligible methods are a no-op.
    ///
    /// # Errors
    ///
    /// [`EventError::NoReferencePrice`] when no price has been observed yet.
    pub fn check_method(&self, method: &str) -> Result<Option<AlertMessage>, EventError> {
        if method != DISCOUNT_METHOD {
            return Ok(None);
        }
        Self::evaluate(self.reference_price)
    }

    fn evaluate(reference: Option<Decimal>) -> Result<Option<AlertMessage>, EventError> {
        let original = reference.ok_or(EventError::NoReferencePrice)?;
        let discount = Discount {
            original,
            discounted: original * (Decimal::ONE - DISCOUNT_RATE),
        };
        debug!(
            original = %discount.original,
            discounted = %discount.discounted,
            "discount computed"
        );
        Ok(alert_for(&discount))
    }
}

/// Builds the purchase alert when the discounted price crosses the threshold.
fn alert_for(discount: &Discount) -> Option<AlertMessage> {
    if discount.discounted < ALERT_THRESHOLD {
        return None;
    }
    Some(AlertMessage {
        subject: ALERT_SUBJECT.to_string(),
        body: format!(
            "A Store Card has been used. The original price was ${}. The discounted price is ${}.",
            money(discount.original),
            money(discount.discounted),
        ),
    })
}

/// Two-decimal half-up money formatting, applied only at output time.
pub fn money(value: Decimal) -> String {
    format!(
        "{:.2}",
        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}
