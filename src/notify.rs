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

//! Alert delivery boundary.
//!
//! The pipeline decides *when* to alert and *what* to send; an
//! [`AlertNotifier`] implementation decides how the alert travels. Delivery is
//! fire-and-forget: a failed send is logged by the worker and never retried,
//! and it never stops the consumer loop.

use crate::error::EventError;
use tracing::warn;

/// Immutable alert content handed to the notifier, then discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

/// Delivery side of the alerting boundary.
pub trait AlertNotifier: Send {
    /// Delivers one alert.
    ///
    /// # Errors
    ///
    /// [`EventError::Notifier`] when delivery fails; the caller logs and
    /// drops the error.
    fn send(&self, alert: &AlertMessage) -> Result<(), EventError>;
}

/// Notifier that emits alerts into the log stream.
///
/// The default transport: the trigger condition and content matter here, the
/// channel does not.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    fn send(&self, alert: &AlertMessage) -> Result<(), EventError> {
        warn!(subject = %alert.subject, body = %alert.body, "purchase alert");
        Ok(())
    }
}
