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

use clap::Parser;
use std::process;
use storestream::{QueueConsumer, QueueKind, Worker};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Queue worker - consume one per-field event queue
///
/// Each worker serves exactly one queue. Start more instances of the same
/// worker to scale out; the broker distributes messages round-robin among
/// them.
#[derive(Parser, Debug)]
#[command(name = "storestream-worker")]
#[command(about = "Consumes one transaction event queue and applies its business rules", long_about = None)]
struct Args {
    /// Which queue to serve
    #[arg(value_enum)]
    queue: QueueKind,

    /// AMQP URI of the broker
    #[arg(long, env = "AMQP_ADDR", default_value = "amqp://127.0.0.1:5672/%2f")]
    uri: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    let consumer = QueueConsumer::new(Worker::new(args.queue));
    if let Err(e) = consumer.run(&args.uri).await {
        error!("worker failed: {e:#}");
        process::exit(1);
    }
}
