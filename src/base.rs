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

//! Queue identity for the three per-field event streams.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three per-field queues fed by the producer.
///
/// Each worker process serves exactly one of these. The variant decides both
/// the broker queue name and how payloads are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum QueueKind {
    /// Raw payment-method strings.
    Method,
    /// `timestamp,amount` purchase amounts.
    Amount,
    /// `timestamp,category` merchandise categories.
    Category,
}

impl QueueKind {
    pub const ALL: [QueueKind; 3] = [Self::Method, Self::Amount, Self::Category];

    /// Broker-side queue name, shared with the producer's declarations.
    pub fn queue_name(self) -> &'static str {
        match self {
            Self::Method => "01-method",
            Self::Amount => "02-amount",
            Self::Category => "03-category",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.queue_name())
    }
}
