// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Ticket bridge core.
//!
//! Models a token bridge between two ledgers that communicate only
//! through opaque, content addressed value tokens (tickets) and
//! asynchronous outbox messages. Four roles make up the protocol:
//!     * The token vault ("Ticketer") custodies deposited fungible
//!       tokens and issues tickets 1:1 against them.
//!     * The routing context relay attaches metadata to an otherwise
//!       opaque ticket transfer, single use per sender.
//!     * The rollup mock emulates the L2 custodian: an inbox crediting
//!       deposits and an outbox with execute-once messages.
//!     * The release router converts an executed outbox message back
//!       into a vault redemption on L1.
//!
//! The [bridge::Bridge] aggregate ties the roles together and models
//! the host ledger's serial, all-or-nothing operation groups; the
//! individual components carry no locking of their own.

pub mod bridge;
pub mod error;
pub mod relay;
pub mod rollup;
pub mod router;
pub mod ticket;
pub mod ticket_table;
pub mod ticketer;
pub mod token;

#[cfg(test)]
mod test_utils;


pub use bridge::Bridge;
pub use error::BridgeError;
pub use relay::{BurnRouting, DepositRouting, ReleaseRouting, RoutingRelay};
pub use rollup::{OutboxMessage, OutboxMessageStatus, RollupMock, DEPOSIT_FALLBACK_ACCOUNT};
pub use router::ReleaseRouter;
pub use ticket::{Ticket, TicketContent};
pub use ticket_table::TicketTable;
pub use ticketer::{TicketIssued, Ticketer, TokensReleased};
pub use token::{TokenDescriptor, TokenLedger};
