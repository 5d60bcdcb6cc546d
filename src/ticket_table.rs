// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Global ticket table.
//!
//! Maintains the L1 ledger that tracks ownership of issued tickets.
//! Balances are keyed by (ticket hash, owner) and mutated only through
//! checked mint, burn and transfer operations, so totals are conserved
//! by construction. The table also keeps a hash to kind registry so a
//! ticket hash stays resolvable to its issuer and content.

use std::collections::HashMap;

use primitive_types::{H160, H256, U256};

use crate::error::BridgeError;
use crate::ticket::Ticket;

#[derive(Debug, Clone, Default)]
pub struct TicketTable {
    balances: HashMap<(H256, H160), U256>,
    tickets: HashMap<H256, Ticket>,
}

impl TicketTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increases ticket balance of `owner`, registering the kind on
    /// first sight.
    pub fn ticket_balance_add(
        &mut self,
        ticket: &Ticket,
        owner: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        let ticket_hash = ticket.hash();
        self.tickets
            .entry(ticket_hash)
            .or_insert_with(|| ticket.clone());
        self.credit(&ticket_hash, owner, amount)
    }

    /// Decreases ticket balance of `owner`.
    pub fn ticket_balance_remove(
        &mut self,
        ticket_hash: &H256,
        owner: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        let balance = self.ticket_balance(ticket_hash, owner);
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientTicketBalance(*owner))?;
        self.balances.insert((*ticket_hash, *owner), new_balance);
        Ok(())
    }

    /// Moves `amount` between two owners; total supply is unchanged.
    pub fn ticket_transfer(
        &mut self,
        ticket_hash: &H256,
        from: &H160,
        to: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        if !self.tickets.contains_key(ticket_hash) {
            return Err(BridgeError::UnknownTicketKind(*ticket_hash));
        }
        self.ticket_balance_remove(ticket_hash, from, amount)?;
        self.credit(ticket_hash, to, amount)
    }

    pub fn ticket_balance(&self, ticket_hash: &H256, owner: &H160) -> U256 {
        self.balances
            .get(&(*ticket_hash, *owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn ticket(&self, ticket_hash: &H256) -> Option<&Ticket> {
        self.tickets.get(ticket_hash)
    }

    /// Sum of all balances of a kind, across owners.
    pub fn total_supply(&self, ticket_hash: &H256) -> U256 {
        self.balances
            .iter()
            .filter(|((hash, _), _)| hash == ticket_hash)
            .fold(U256::zero(), |acc, (_, balance)| {
                acc.saturating_add(*balance)
            })
    }

    fn credit(
        &mut self,
        ticket_hash: &H256,
        owner: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        let balance = self.ticket_balance(ticket_hash, owner);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(BridgeError::BalanceOverflow)?;
        self.balances.insert((*ticket_hash, *owner), new_balance);
        Ok(())
    }
}
