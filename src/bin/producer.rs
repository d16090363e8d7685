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

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use csv::{ReaderBuilder, Trim};
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use rand::Rng;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process;
use storestream::{Category, QueueKind};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Payment methods the store accepts; only "Store Card" carries a discount.
const METHODS: [&str; 6] = [
    "Credit Card",
    "Debit Card",
    "PayPal",
    "Apple Pay",
    "Google Wallet",
    "Store Card",
];

/// Event producer - publish transaction events to the per-field queues
///
/// Reads transactions from a CSV file, or generates synthetic ones, and fans
/// each transaction out as one message per queue: the raw method string, a
/// `timestamp,amount` pair, and a `timestamp,category` pair.
#[derive(Parser, Debug)]
#[command(name = "storestream-producer")]
#[command(about = "Publishes transaction events onto the per-field queues", long_about = None)]
struct Args {
    /// CSV file of transactions
    ///
    /// Expected header: Payment Method,Payment Amount,Category,Timestamp
    #[arg(long, value_name = "FILE", conflicts_with = "generate")]
    input: Option<PathBuf>,

    /// Number of synthetic transactions to generate instead of reading a file
    #[arg(long, default_value_t = 1000)]
    generate: usize,

    /// AMQP URI of the broker
    #[arg(long, env = "AMQP_ADDR", default_value = "amqp://127.0.0.1:5672/%2f")]
    uri: String,
}

/// One retail transaction, fanned out to the three per-field queues.
#[derive(Debug, Clone, Deserialize)]
struct Transaction {
    #[serde(rename = "Payment Method")]
    method: String,
    #[serde(rename = "Payment Amount")]
    amount: Decimal,
    #[serde(rename = "Category")]
    category: String,
    #[serde(rename = "Timestamp")]
    timestamp: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("producer failed: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let transactions = match &args.input {
        Some(path) => read_transactions(path)?,
        None => generate_transactions(args.generate),
    };

    let connection = Connection::connect(&args.uri, ConnectionProperties::default())
        .await
        .with_context(|| format!("connection to broker at {} failed", args.uri))?;
    let channel = connection
        .create_channel()
        .await
        .context("channel creation failed")?;

    for queue in QueueKind::ALL {
        // Same durable declaration the workers make.
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
    }

    info!(count = transactions.len(), "publishing transactions");
    for transaction in &transactions {
        publish(&channel, QueueKind::Method, transaction.method.clone()).await?;
        publish(
            &channel,
            QueueKind::Amount,
            format!("{},{}", transaction.timestamp, transaction.amount),
        )
        .await?;
        publish(
            &channel,
            QueueKind::Category,
            format!("{},{}", transaction.timestamp, transaction.category),
        )
        .await?;
    }
    info!(count = transactions.len(), "all transactions published");

    connection
        .close(200, "done")
        .await
        .context("closing connection failed")?;
    Ok(())
}

async fn publish(channel: &Channel, queue: QueueKind, payload: String) -> Result<()> {
    channel
        .basic_publish(
            // Default exchange routes directly by queue name.
            "",
            queue.queue_name(),
            BasicPublishOptions::default(),
            payload.as_bytes(),
            // Persistent delivery, matching the durable queues.
            BasicProperties::default().with_delivery_mode(2),
        )
        .await
        .with_context(|| format!("publishing to {queue} failed"))?
        .await
        .with_context(|| format!("publish confirmation on {queue} failed"))?;
    Ok(())
}

fn read_transactions(path: &Path) -> Result<Vec<Transaction>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {} failed", path.display()))?;

    let mut transactions = Vec::new();
    for result in reader.deserialize::<Transaction>() {
        transactions.push(result.context("malformed transaction row")?);
    }
    Ok(transactions)
}

/// Synthesizes transactions in the same shape the CSV generator produces:
/// random method and category, amounts between $10.00 and $500.00, timestamps
/// from the past year, sorted by timestamp.
fn generate_transactions(count: usize) -> Vec<Transaction> {
    let mut rng = rand::rng();
    let mut transactions: Vec<Transaction> = (0..count)
        .map(|_| {
            let minutes = rng.random_range(0..60 * 24 * 365);
            let timestamp = Utc::now() - Duration::minutes(minutes);
            Transaction {
                method: METHODS[rng.random_range(0..METHODS.len())].to_string(),
                amount: Decimal::new(rng.random_range(1_000..=50_000), 2),
                category: Category::ALL[rng.random_range(0..Category::ALL.len())]
                    .label()
                    .to_string(),
                timestamp: timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            }
        })
        .collect();
    transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    transactions
}
