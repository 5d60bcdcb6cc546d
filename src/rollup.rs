// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Rollup mock.
//!
//! Emulates the L2 side custodian on the L1 ledger:
//!     * The inbox credits incoming ticket deposits to an internal L2
//!       ledger keyed by the address recovered from the deposit
//!       routing context. A deposit arriving without context is still
//!       credited, to a ledger visible fallback account, it is never
//!       silently dropped.
//!     * The outbox is an append only message store with an execute
//!       once state machine: `Created -> Executed`, no cancellation,
//!       no other states. Creation debits the caller's L2 balance
//!       immediately, so the same balance cannot back two pending
//!       messages. Execution is permissionless and may happen at any
//!       later point, exactly once.
//!
//! Executed messages stay in the store marked `Executed` so replays
//! and unknown ids remain distinguishable failures.

use std::collections::{BTreeMap, HashMap};

use primitive_types::{H160, H256, U256};
use tracing::{debug, info};

use crate::error::BridgeError;
use crate::relay::DepositRouting;
use crate::ticket::Ticket;

/// Owner of deposits that arrived without routing context.
pub const DEPOSIT_FALLBACK_ACCOUNT: H160 = H160([0u8; 20]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxMessageStatus {
    Created,
    Executed,
}

/// An asynchronous L2 to L1 message. `routing_data` is an opaque byte
/// string owned entirely by `router`; the rollup never decodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboxMessage {
    pub id: u64,
    pub ticket: Ticket,
    pub amount: U256,
    pub routing_data: Vec<u8>,
    pub router: H160,
    pub status: OutboxMessageStatus,
}

#[derive(Debug, Clone)]
pub struct RollupMock {
    address: H160,
    ledger: HashMap<(H256, H160), U256>,
    messages: BTreeMap<u64, OutboxMessage>,
    next_message_id: u64,
}

impl RollupMock {
    pub fn new(address: H160) -> Self {
        RollupMock {
            address,
            ledger: HashMap::new(),
            messages: BTreeMap::new(),
            next_message_id: 0,
        }
    }

    pub fn address(&self) -> H160 {
        self.address
    }

    /// Credits an incoming ticket deposit to the L2 ledger. Returns
    /// the credited L2 address.
    pub fn receive_deposit(
        &mut self,
        ticket: &Ticket,
        amount: U256,
        routing: Option<&DepositRouting>,
    ) -> Result<H160, BridgeError> {
        let l2_address = match routing {
            Some(routing) => routing.l2_address,
            None => DEPOSIT_FALLBACK_ACCOUNT,
        };
        self.credit(&ticket.hash(), &l2_address, amount)?;
        debug!(%ticket, %amount, %l2_address, "deposit credited on L2 ledger");
        Ok(l2_address)
    }

    /// Moves an L2 balance between two L2 addresses.
    pub fn l2_transfer(
        &mut self,
        ticket_hash: &H256,
        from: &H160,
        to: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        self.debit(ticket_hash, from, amount)?;
        self.credit(ticket_hash, to, amount)
    }

    /// Burns `amount` of the caller's L2 balance and records a new
    /// outbox message in `Created` state. The debit happens here, at
    /// creation, not at execution.
    pub fn create_outbox_message(
        &mut self,
        ticket: Ticket,
        amount: U256,
        routing_data: Vec<u8>,
        router: H160,
        caller: H160,
    ) -> Result<u64, BridgeError> {
        self.debit(&ticket.hash(), &caller, amount)?;

        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.insert(
            id,
            OutboxMessage {
                id,
                ticket,
                amount,
                routing_data,
                router,
                status: OutboxMessageStatus::Created,
            },
        );
        info!(id, %amount, %router, "outbox message created");
        Ok(id)
    }

    /// Transitions a message to `Executed` and hands its record back
    /// to the caller for dispatch. Permissionless. Fails with
    /// [BridgeError::UnknownMessage] for ids that were never created
    /// and [BridgeError::AlreadyExecuted] on replay; the second
    /// execution is a hard failure, never a no-op.
    pub fn execute_outbox_message(&mut self, id: u64) -> Result<OutboxMessage, BridgeError> {
        let message = self
            .messages
            .get_mut(&id)
            .ok_or(BridgeError::UnknownMessage(id))?;
        if message.status == OutboxMessageStatus::Executed {
            return Err(BridgeError::AlreadyExecuted(id));
        }
        message.status = OutboxMessageStatus::Executed;
        info!(id, "outbox message executed");
        Ok(message.clone())
    }

    pub fn get_message(&self, id: u64) -> Option<&OutboxMessage> {
        self.messages.get(&id)
    }

    pub fn next_message_id(&self) -> u64 {
        self.next_message_id
    }

    pub fn l2_balance(&self, ticket_hash: &H256, owner: &H160) -> U256 {
        self.ledger
            .get(&(*ticket_hash, *owner))
            .copied()
            .unwrap_or_default()
    }

    fn credit(
        &mut self,
        ticket_hash: &H256,
        owner: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        let balance = self.l2_balance(ticket_hash, owner);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(BridgeError::BalanceOverflow)?;
        self.ledger.insert((*ticket_hash, *owner), new_balance);
        Ok(())
    }

    fn debit(
        &mut self,
        ticket_hash: &H256,
        owner: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        let balance = self.l2_balance(ticket_hash, owner);
        let new_balance = balance
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientTicketBalance(*owner))?;
        self.ledger.insert((*ticket_hash, *owner), new_balance);
        Ok(())
    }
}
