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

//! Event decoding.
//!
//! Each queue carries plain-text payloads. [`decode`] turns one payload into a
//! typed [`Event`] or rejects it whole; a payload is never partially accepted.
//! Decoding is pure: the same bytes always produce the same result.

use crate::base::QueueKind;
use crate::error::EventError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str;

/// One decoded message from a per-field queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    Method {
        method: String,
    },
    Amount {
        timestamp: String,
        amount: Decimal,
        /// Payment method attached to this purchase, when the publisher
        /// includes one. The current wire format carries no method field, so
        /// amount events decoded off the wire always have `None` here.
        method: Option<String>,
    },
    Category {
        timestamp: String,
        category: String,
    },
}

impl Event {
    /// Queue this event kind belongs to.
    pub fn queue(&self) -> QueueKind {
        match self {
            Self::Method { .. } => QueueKind::Method,
            Self::Amount { .. } => QueueKind::Amount,
            Self::Category { .. } => QueueKind::Category,
        }
    }

    /// Event timestamp, absent for method events.
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Self::Method { .. } => None,
            Self::Amount { timestamp, .. } | Self::Category { timestamp, .. } => Some(timestamp),
        }
    }
}

/// Decodes one raw payload according to its queue's wire format.
///
/// # Wire formats
///
/// | Queue | Payload |
/// |-------|---------|
/// | method | the method string, verbatim |
/// | amount | `timestamp,amount` (amount: non-negative decimal) |
/// | category | `timestamp,category` |
///
/// Category membership is not checked here; an unknown label is the
/// aggregator's [`EventError::UnknownCategory`], not a decode failure.
///
/// # Errors
///
/// [`EventError::MalformedPayload`] for non-UTF-8 bytes, an empty method,
/// a wrong comma-field count, or a non-numeric/negative amount.
pub fn decode(queue: QueueKind, payload: &[u8]) -> Result<Event, EventError> {
    let text = str::from_utf8(payload)
        .map_err(|_| EventError::MalformedPayload("payload is not valid UTF-8".into()))?;

    match queue {
        QueueKind::Method => {
            if text.trim().is_empty() {
                return Err(EventError::MalformedPayload("empty method".into()));
            }
            Ok(Event::Method {
                method: text.to_string(),
            })
        }
        QueueKind::Amount => {
            let (timestamp, raw_amount) = split_two(text)?;
            let amount: Decimal = raw_amount.trim().parse().map_err(|_| {
                EventError::MalformedPayload(format!("amount is not numeric: {raw_amount:?}"))
            })?;
            if amount < Decimal::ZERO {
                return Err(EventError::MalformedPayload(format!(
                    "negative amount: {amount}"
                )));
            }
            Ok(Event::Amount {
                timestamp: timestamp.to_string(),
                amount,
                method: None,
            })
        }
        QueueKind::Category => {
            let (timestamp, category) = split_two(text)?;
            if category.trim().is_empty() {
                return Err(EventError::MalformedPayload("empty category".into()));
            }
            Ok(Event::Category {
                timestamp: timestamp.to_string(),
                category: category.to_string(),
            })
        }
    }
}

/// Splits into exactly two comma-separated fields.
fn split_two(text: &str) -> Result<(&str, &str), EventError> {
    let fields: Vec<&str> = text.split(',').collect();
    match fields.as_slice() {
        [first, second] => Ok((*first, *second)),
        other => Err(EventError::MalformedPayload(format!(
            "expected 2 comma-separated fields, got {}",
            other.len()
        ))),
    }
}
