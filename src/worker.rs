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

//! Per-delivery dispatch.
//!
//! A [`Worker`] owns every piece of mutable state its queue needs: the
//! discount engine, the category histogram, and the alert notifier. Nothing is
//! shared across workers, so processing needs no locks; within one worker a
//! message is fully handled before the next arrives.

use crate::base::QueueKind;
use crate::category::CategoryAggregator;
use crate::discount::{self, DiscountEngine};
use crate::error::EventError;
use crate::event::{self, Event};
use crate::notify::{AlertMessage, AlertNotifier, LogNotifier};
use tracing::{info, warn};

/// One queue's worth of processing state.
pub struct Worker {
    queue: QueueKind,
    discounts: DiscountEngine,
    categories: CategoryAggregator,
    notifier: Box<dyn AlertNotifier>,
}

impl Worker {
    /// Creates a worker with the default log-based notifier.
    pub fn new(queue: QueueKind) -> Self {
        Self::with_notifier(queue, Box::new(LogNotifier))
    }

    /// Creates a worker with a caller-supplied notifier.
    pub fn with_notifier(queue: QueueKind, notifier: Box<dyn AlertNotifier>) -> Self {
        Self {
            queue,
            discounts: DiscountEngine::new(),
            categories: CategoryAggregator::new(),
            notifier,
        }
    }

    pub fn queue(&self) -> QueueKind {
        self.queue
    }

    pub fn discounts(&self) -> &DiscountEngine {
        &self.discounts
    }

    pub fn categories(&self) -> &CategoryAggregator {
        &self.categories
    }

    /// Processes one delivery payload: decode, then dispatch.
    ///
    /// # Errors
    ///
    /// Every error this returns is terminal for the message only; the caller
    /// logs it and acknowledges the delivery regardless.
    pub fn handle(&mut self, payload: &[u8]) -> Result<(), EventError> {
        let event = event::decode(self.queue, payload)?;
        self.process(event)
    }

    /// Applies one decoded event to the owning engine.
    pub fn process(&mut self, event: Event) -> Result<(), EventError> {
        match event {
            Event::Method { method } => {
                info!(queue = %self.queue, %method, "payment method received");
                let alert = self.discounts.check_method(&method)?;
                self.dispatch_alert(alert);
            }
            Event::Amount {
                timestamp,
                amount,
                method,
            } => {
                info!(
                    queue = %self.queue,
                    %timestamp,
                    amount = %discount::money(amount),
                    "purchase received"
                );
                let alert = self.discounts.observe_amount(amount, method.as_deref())?;
                self.dispatch_alert(alert);
            }
            Event::Category {
                timestamp,
                category,
            } => {
                info!(queue = %self.queue, %timestamp, %category, "category received");
                let shares = self.categories.record(&category)?;
                for share in &shares {
                    let percent = format!("{:.2}%", share.percent);
                    info!(
                        queue = %self.queue,
                        category = %share.category,
                        count = share.count,
                        percent = %percent,
                        "category share"
                    );
                }
            }
        }
        Ok(())
    }

    /// Fire-and-forget alert handoff; notifier failures never stop the loop.
    fn dispatch_alert(&self, alert: Option<AlertMessage>) {
        let Some(alert) = alert else {
            return;
        };
        if let Err(error) = self.notifier.send(&alert) {
            warn!(%error, subject = %alert.subject, "alert delivery failed");
        }
    }
}
