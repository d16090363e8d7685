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

//! Error types for per-message event processing.

use thiserror::Error;

/// Recoverable per-message processing errors.
///
/// Every variant is terminal for the message that raised it, never for the
/// consumer loop: the loop logs the error and still acknowledges the delivery,
/// since redelivery would reproduce the same input. Broker connection failures
/// are the only fatal errors and are reported separately by the consumer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    /// Payload did not match the queue's wire format
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Category label outside the fixed known set
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Discount requested before any reference price was observed
    #[error("no reference price observed yet")]
    NoReferencePrice,

    /// Alert notifier refused or failed delivery
    #[error("alert notifier failed: {0}")]
    Notifier(String),
}

#[cfg(test)]
mod tests {
    use super::EventError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            EventError::MalformedPayload("expected 2 fields, got 3".into()).to_string(),
            "malformed payload: expected 2 fields, got 3"
        );
        assert_eq!(
            EventError::UnknownCategory("Toys".into()).to_string(),
            "unknown category: Toys"
        );
        assert_eq!(
            EventError::NoReferencePrice.to_string(),
            "no reference price observed yet"
        );
        assert_eq!(
            EventError::Notifier("smtp unreachable".into()).to_string(),
            "alert notifier failed: smtp unreachable"
        );
    }

    #[test]
    fn errors_are_cloneable() {
        let error = EventError::NoReferencePrice;
        let cloned = error.clone();
        assert_eq!(error, cloned);
    }
}
