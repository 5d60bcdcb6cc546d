// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Bridge specific errors.
//!
//! Three groups, reported as distinct variants so that callers can tell
//! them apart:
//!     * Precondition violations: bad amounts, missing balances or
//!       allowances, unrecognized tickets and tokens.
//!     * Protocol state violations: replaying or front-running the
//!       outbox, presenting a foreign ticket to a router.
//!     * Internal consistency failures: unreachable through any valid
//!       call sequence, e.g. a vault reserve underflow.

use primitive_types::{H160, H256};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    #[error("Amount must be positive")]
    ZeroAmount,

    #[error("Insufficient token balance of {0}")]
    InsufficientTokenBalance(H160),

    #[error("{operator} is not an approved operator for tokens of {owner}")]
    NotOperator { owner: H160, operator: H160 },

    #[error("Insufficient ticket balance of {0}")]
    InsufficientTicketBalance(H160),

    #[error("Unknown ticket kind {0}")]
    UnknownTicketKind(H256),

    #[error("Token is not registered in the vault")]
    UnknownToken,

    #[error("Unknown outbox message #{0}")]
    UnknownMessage(u64),

    #[error("Outbox message #{0} has already been executed")]
    AlreadyExecuted(u64),

    #[error("No contract at router address {0}")]
    UnknownRouter(H160),

    #[error("Ticket issuer {0} is not honored by this router")]
    UnauthorizedTicketKind(H160),

    #[error("Invalid routing data: {0}")]
    InvalidRoutingData(&'static str),

    #[error("Ledger balance overflow")]
    BalanceOverflow,

    #[error("Internal consistency failure: {0}")]
    InvariantViolation(&'static str),
}
