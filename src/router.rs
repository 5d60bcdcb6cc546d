// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Release router.
//!
//! L1 side dispatcher invoked by outbox message execution. The router
//! address recorded in a message is caller supplied data, so the
//! router independently checks that the presented ticket kind is its
//! own vault's issuance before honoring the amount. On success it
//! re-enters the vault and releases the underlying tokens to the
//! receiver decoded from the routing payload.
//!
//! A failed release propagates; the outbox message stays executed and
//! recovery is out of protocol.

use primitive_types::{H160, U256};

use crate::error::BridgeError;
use crate::ticket::Ticket;
use crate::ticket_table::TicketTable;
use crate::ticketer::{Ticketer, TokensReleased};
use crate::token::TokenLedger;

#[derive(Debug, Clone)]
pub struct ReleaseRouter {
    address: H160,
    vault: H160,
}

impl ReleaseRouter {
    /// A router honors exactly one vault's tickets.
    pub fn new(address: H160, vault: H160) -> Self {
        ReleaseRouter { address, vault }
    }

    pub fn address(&self) -> H160 {
        self.address
    }

    /// First 20 bytes of the routing payload are the receiver address;
    /// any trailing bytes are router identifying data and ignored here.
    pub fn decode_receiver(routing_data: &[u8]) -> Result<H160, BridgeError> {
        if routing_data.len() < 20 {
            return Err(BridgeError::InvalidRoutingData(
                "expected at least 20 bytes of receiver address",
            ));
        }
        Ok(H160::from_slice(&routing_data[..20]))
    }

    /// Converts an executed outbox message into a vault redemption:
    /// burns `amount` of the ticket held by `holder` and pays the
    /// underlying tokens to the decoded receiver.
    #[allow(clippy::too_many_arguments)]
    pub fn release(
        &self,
        ticket: &Ticket,
        amount: U256,
        routing_data: &[u8],
        holder: H160,
        ticketer: &mut Ticketer,
        tokens: &mut TokenLedger,
        table: &mut TicketTable,
    ) -> Result<TokensReleased, BridgeError> {
        if ticket.ticketer != self.vault {
            return Err(BridgeError::UnauthorizedTicketKind(ticket.ticketer));
        }
        let receiver = Self::decode_receiver(routing_data)?;
        ticketer.release(ticket, amount, holder, receiver, tokens, table)
    }
}
