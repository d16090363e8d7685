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

//! Worker dispatch tests: decode, dispatch, and alert handoff.
//!
//! The consumer loop acknowledges every delivery whether `handle` returns
//! `Ok` or `Err`; these tests pin down which results are errors (and so are
//! logged-then-acked) and which state changes each payload causes.

use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use storestream::{
    AlertMessage, AlertNotifier, Category, Event, EventError, QueueKind, Worker,
};

/// Notifier double that records every alert it is handed.
#[derive(Default, Clone)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<AlertMessage>>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl AlertNotifier for RecordingNotifier {
    fn send(&self, alert: &AlertMessage) -> Result<(), EventError> {
        self.sent.lock().unwrap().push(alert.clone());
        Ok(())
    }
}

/// Notifier double whose delivery always fails.
struct FailingNotifier;

impl AlertNotifier for FailingNotifier {
    fn send(&self, _alert: &AlertMessage) -> Result<(), EventError> {
        Err(EventError::Notifier("smtp unreachable".to_string()))
    }
}

fn recording_worker(queue: QueueKind) -> (Worker, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let worker = Worker::with_notifier(queue, Box::new(notifier.clone()));
    (worker, notifier)
}

fn amount_event(amount: rust_decimal::Decimal, method: Option<&str>) -> Event {
    Event::Amount {
        timestamp: "2023-10-04 12:00:00".to_string(),
        amount,
        method: method.map(str::to_string),
    }
}

#[test]
fn method_payload_is_processed_verbatim() {
    let (mut worker, notifier) = recording_worker(QueueKind::Method);

    worker.handle(b"PayPal").unwrap();
    assert!(notifier.sent().is_empty());
}

#[test]
fn store_card_method_without_price_is_recoverable() {
    let (mut worker, notifier) = recording_worker(QueueKind::Method);

    let result = worker.handle(b"Store Card");
    assert_eq!(result, Err(EventError::NoReferencePrice));
    assert!(notifier.sent().is_empty());
}

#[test]
fn amount_payloads_update_price_state() {
    let (mut worker, _notifier) = recording_worker(QueueKind::Amount);

    worker.handle(b"2023-10-04 12:00:00,150.00").unwrap();
    worker.handle(b"2023-10-04 12:01:00,500.00").unwrap();

    assert_eq!(worker.discounts().reference_price(), Some(dec!(500.00)));
}

#[test]
fn malformed_amount_payloads_are_errors() {
    let (mut worker, _notifier) = recording_worker(QueueKind::Amount);

    for payload in [&b"12.34"[..], b"t,12.34,extra", b"t,twelve", b""] {
        let result = worker.handle(payload);
        assert!(
            matches!(result, Err(EventError::MalformedPayload(_))),
            "payload {payload:?} should be malformed"
        );
    }

    // None of them touched the price state.
    assert_eq!(worker.discounts().reference_price(), None);
}

#[test]
fn amount_then_store_card_produces_an_alert() {
    let (mut worker, notifier) = recording_worker(QueueKind::Amount);

    worker.process(amount_event(dec!(500.00), None)).unwrap();
    worker
        .process(Event::Method {
            method: "Store Card".to_string(),
        })
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Store Card Purchase Alert");
    assert!(sent[0].body.contains("500.00"));
    assert!(sent[0].body.contains("450.00"));
}

#[test]
fn store_card_amount_event_alerts_against_the_prior_price() {
    let (mut worker, notifier) = recording_worker(QueueKind::Amount);

    worker.process(amount_event(dec!(500.00), None)).unwrap();
    worker
        .process(amount_event(dec!(20.00), Some("Store Card")))
        .unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("450.00"));
    assert_eq!(worker.discounts().reference_price(), Some(dec!(20.00)));
}

#[test]
fn below_threshold_discount_sends_nothing() {
    let (mut worker, notifier) = recording_worker(QueueKind::Amount);

    worker.process(amount_event(dec!(100.00), None)).unwrap();
    worker
        .process(Event::Method {
            method: "Store Card".to_string(),
        })
        .unwrap();

    assert!(notifier.sent().is_empty());
}

#[test]
fn notifier_failure_is_swallowed() {
    let mut worker = Worker::with_notifier(QueueKind::Amount, Box::new(FailingNotifier));

    worker.process(amount_event(dec!(500.00), None)).unwrap();
    let result = worker.process(Event::Method {
        method: "Store Card".to_string(),
    });

    // Alert delivery failed, but the message itself processed fine.
    assert_eq!(result, Ok(()));
}

#[test]
fn category_payloads_update_the_histogram() {
    let (mut worker, _notifier) = recording_worker(QueueKind::Category);

    worker.handle(b"t,Electronics").unwrap();
    worker.handle(b"t,Electronics").unwrap();
    worker.handle(b"t,Books").unwrap();

    assert_eq!(worker.categories().count(Category::Electronics), 2);
    assert_eq!(worker.categories().count(Category::Books), 1);
    assert_eq!(worker.categories().total(), 3);
}

#[test]
fn unknown_category_is_an_error_and_a_no_op() {
    let (mut worker, _notifier) = recording_worker(QueueKind::Category);

    let result = worker.handle(b"t,Toys");
    assert_eq!(
        result,
        Err(EventError::UnknownCategory("Toys".to_string()))
    );
    assert_eq!(worker.categories().total(), 0);

    worker.handle(b"t,Books").unwrap();
    assert_eq!(worker.categories().total(), 1);
}

#[test]
fn one_bad_message_does_not_poison_the_worker() {
    let (mut worker, notifier) = recording_worker(QueueKind::Amount);

    assert!(worker.handle(b"garbage").is_err());
    worker.handle(b"t,500.00").unwrap();
    worker
        .process(Event::Method {
            method: "Store Card".to_string(),
        })
        .unwrap();

    assert_eq!(notifier.sent().len(), 1);
}
