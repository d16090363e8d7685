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

//! Broker consumer loop.
//!
//! One consumer serves one durable queue with a prefetch window of a single
//! message: a delivery is fully decoded, processed, and acknowledged before
//! the broker hands over the next. Scaling is by running more worker
//! processes against the same queue; the broker round-robins between them.
//!
//! Acknowledgment policy: every delivery is acknowledged exactly once,
//! including decode and business-rule failures. There is no negative
//! acknowledgment or requeue path; redelivery would reproduce the same
//! unprocessable input.

use crate::worker::Worker;
use anyhow::{Context, Result};
use futures::StreamExt;
use lapin::options::{
    BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};
use std::fmt;
use tracing::{debug, info, warn};

/// AMQP reply code for a clean, deliberate close.
const CLOSE_OK: u16 = 200;

/// Lifecycle of one consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Connecting,
    Ready,
    Consuming,
    Draining,
    Closed,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Consuming => "consuming",
            Self::Draining => "draining",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// How the consume loop ended.
enum Exit {
    /// Operator interrupt; clean shutdown.
    Interrupted,
    /// Channel setup, delivery stream, or acknowledgment failure.
    Broker(anyhow::Error),
}

/// Blocking-style consumer for one queue, driving one [`Worker`].
pub struct QueueConsumer {
    worker: Worker,
    state: ConsumerState,
}

impl QueueConsumer {
    pub fn new(worker: Worker) -> Self {
        Self {
            worker,
            state: ConsumerState::Connecting,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConsumerState {
        self.state
    }

    /// Runs the consumer until operator interrupt or broker failure.
    ///
    /// The broker connection is closed exactly once on every exit path after
    /// a successful connect. Returns `Ok(())` only for a clean
    /// operator-initiated shutdown.
    ///
    /// # Errors
    ///
    /// Connection establishment failure, and any broker error mid-consumption
    /// (channel setup, delivery stream, acknowledgment). All are fatal for
    /// this worker process; restart policy belongs to the supervisor.
    pub async fn run(mut self, uri: &str) -> Result<()> {
        let queue = self.worker.queue();
        info!(%queue, %uri, "connecting to broker");
        let connection = Connection::connect(uri, ConnectionProperties::default())
            .await
            .with_context(|| format!("connection to broker at {uri} failed"))?;

        let exit = self.consume(&connection).await;

        self.transition(ConsumerState::Draining);
        info!(%queue, "closing broker connection");
        if let Err(error) = connection.close(CLOSE_OK, "goodbye").await {
            warn!(%error, "broker connection did not close cleanly");
        }
        self.transition(ConsumerState::Closed);

        match exit {
            Exit::Interrupted => {
                info!(%queue, "shutdown complete");
                Ok(())
            }
            Exit::Broker(error) => Err(error),
        }
    }

    async fn consume(&mut self, connection: &Connection) -> Exit {
        let queue = self.worker.queue();
        let channel = match self.setup_channel(connection).await {
            Ok(channel) => channel,
            Err(error) => return Exit::Broker(error),
        };
        self.transition(ConsumerState::Ready);

        let tag = format!("storestream-{queue}");
        let mut deliveries = match channel
            .basic_consume(
                queue.queue_name(),
                &tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
        {
            Ok(consumer) => consumer,
            Err(error) => {
                return Exit::Broker(anyhow::Error::new(error).context("registering consumer failed"));
            }
        };

        self.transition(ConsumerState::Consuming);
        info!(%queue, "ready for work, press CTRL+C to exit");

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!(%queue, "interrupt received, stopping");
                    return Exit::Interrupted;
                }
                next = deliveries.next() => {
                    let delivery = match next {
                        Some(Ok(delivery)) => delivery,
                        Some(Err(error)) => {
                            return Exit::Broker(
                                anyhow::Error::new(error).context("delivery stream failed"),
                            );
                        }
                        None => {
                            return Exit::Broker(anyhow::anyhow!(
                                "broker closed the delivery stream"
                            ));
                        }
                    };

                    // Recoverable errors are terminal for this message only:
                    // log and fall through to the acknowledgment.
                    if let Err(error) = self.worker.handle(&delivery.data) {
                        warn!(%queue, %error, "message dropped");
                    }
                    if let Err(error) = delivery.ack(BasicAckOptions::default()).await {
                        return Exit::Broker(
                            anyhow::Error::new(error).context("acknowledgment failed"),
                        );
                    }
                }
            }
        }
    }

    async fn setup_channel(&self, connection: &Connection) -> Result<Channel> {
        let queue = self.worker.queue();
        let channel = connection
            .create_channel()
            .await
            .context("channel creation failed")?;

        // Must match the producer's declaration: a durable queue survives a
        // broker restart.
        channel
            .queue_declare(
                queue.queue_name(),
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await
            .with_context(|| format!("declaring queue {queue} failed"))?;

        // One unacknowledged message per worker: strict per-worker ordering
        // and one-message failure isolation, traded against throughput.
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .context("setting prefetch limit failed")?;

        Ok(channel)
    }

    fn transition(&mut self, next: ConsumerState) {
        debug!(from = %self.state, to = %next, "consumer state change");
        self.state = next;
    }
}
