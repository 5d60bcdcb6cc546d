// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Token vault ("Ticketer").
//!
//! Custodies deposited fungible tokens and issues tickets 1:1 against
//! them:
//!     * `deposit` pulls approved tokens in, registers the token on
//!       first sight under a fresh monotonic token id, and mints a
//!       ticket of the corresponding kind to the depositor.
//!     * `release` burns presented tickets of the vault's own issuance
//!       and pays the underlying tokens out to a receiver.
//!
//! The registry is append only: once a token id is allocated the
//! mapping never changes and is never deleted. For every registered
//! token the reserved collateral always equals the total supply of the
//! matching ticket kind; a reserve underflow is therefore an internal
//! consistency failure, not a caller error.

use std::collections::HashMap;

use primitive_types::{H160, U256};
use tracing::debug;

use crate::error::BridgeError;
use crate::ticket::{token_info_bytes, Ticket, TicketContent};
use crate::ticket_table::TicketTable;
use crate::token::{TokenDescriptor, TokenLedger};

/// Token standard tag packed into the ticket metadata.
const TOKEN_TYPE: &str = "FA2";

/// Result of a successful deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketIssued {
    pub ticket: Ticket,
    pub amount: U256,
    pub depositor: H160,
}

/// Result of a successful release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokensReleased {
    pub token: TokenDescriptor,
    pub amount: U256,
    pub receiver: H160,
}

#[derive(Debug, Clone)]
struct VaultEntry {
    token: TokenDescriptor,
    content: TicketContent,
    reserved: U256,
}

#[derive(Debug, Clone)]
pub struct Ticketer {
    address: H160,
    token_ids: HashMap<TokenDescriptor, U256>,
    entries: HashMap<U256, VaultEntry>,
    next_token_id: U256,
}

impl Ticketer {
    pub fn new(address: H160) -> Self {
        Ticketer {
            address,
            token_ids: HashMap::new(),
            entries: HashMap::new(),
            next_token_id: U256::zero(),
        }
    }

    pub fn address(&self) -> H160 {
        self.address
    }

    pub fn get_token_id(&self, token: &TokenDescriptor) -> Option<U256> {
        self.token_ids.get(token).copied()
    }

    /// The ticket kind this vault issues for a registered token.
    pub fn ticket_for(&self, token: &TokenDescriptor) -> Option<Ticket> {
        let token_id = self.get_token_id(token)?;
        let entry = self.entries.get(&token_id)?;
        Some(Ticket::new(self.address, entry.content.clone()))
    }

    pub fn reserved_balance(&self, token_id: U256) -> U256 {
        self.entries
            .get(&token_id)
            .map(|entry| entry.reserved)
            .unwrap_or_default()
    }

    /// Locks `amount` underlying tokens and mints the matching ticket
    /// to the depositor. Requires the depositor to have approved this
    /// vault as operator beforehand.
    pub fn deposit(
        &mut self,
        token: &TokenDescriptor,
        amount: U256,
        depositor: H160,
        tokens: &mut TokenLedger,
        table: &mut TicketTable,
    ) -> Result<TicketIssued, BridgeError> {
        if amount.is_zero() {
            return Err(BridgeError::ZeroAmount);
        }

        tokens.transfer(token, depositor, self.address, amount, self.address)?;

        let token_id = self.register(token);
        // Reserve and mint are computed in the same checked step so the
        // 1:1 backing invariant cannot be broken halfway.
        let entry = self
            .entries
            .get(&token_id)
            .ok_or(BridgeError::InvariantViolation("vault entry missing"))?;
        let new_reserved = entry
            .reserved
            .checked_add(amount)
            .ok_or(BridgeError::BalanceOverflow)?;
        let ticket = Ticket::new(self.address, entry.content.clone());
        table.ticket_balance_add(&ticket, &depositor, amount)?;
        self.entries
            .get_mut(&token_id)
            .ok_or(BridgeError::InvariantViolation("vault entry missing"))?
            .reserved = new_reserved;

        debug!(%ticket, %amount, %depositor, "minted ticket against deposit");
        Ok(TicketIssued {
            ticket,
            amount,
            depositor,
        })
    }

    /// Burns `amount` of a presented ticket from `holder` and releases
    /// the underlying tokens to `receiver`.
    pub fn release(
        &mut self,
        ticket: &Ticket,
        amount: U256,
        holder: H160,
        receiver: H160,
        tokens: &mut TokenLedger,
        table: &mut TicketTable,
    ) -> Result<TokensReleased, BridgeError> {
        let ticket_hash = ticket.hash();
        if ticket.ticketer != self.address {
            return Err(BridgeError::UnknownTicketKind(ticket_hash));
        }
        let token_id = ticket.content.token_id;
        let entry = self.entries.get(&token_id).ok_or(BridgeError::UnknownToken)?;
        // Content equality is byte for byte: a ticket claiming this
        // vault as issuer but carrying alien content is not honored.
        if entry.content != ticket.content {
            return Err(BridgeError::UnknownTicketKind(ticket_hash));
        }
        let token = entry.token.clone();
        let reserved = entry.reserved;

        table.ticket_balance_remove(&ticket_hash, &holder, amount)?;
        // The burn above bounds `amount` by the holder's balance, which
        // is itself bounded by the total issued supply, so the reserve
        // cannot underflow through any valid call sequence.
        let new_reserved = reserved
            .checked_sub(amount)
            .ok_or(BridgeError::InvariantViolation("vault reserve underflow"))?;
        self.entries
            .get_mut(&token_id)
            .ok_or(BridgeError::InvariantViolation("vault entry missing"))?
            .reserved = new_reserved;
        tokens.transfer(&token, self.address, receiver, amount, self.address)?;

        debug!(%ticket, %amount, %receiver, "burned ticket and released tokens");
        Ok(TokensReleased {
            token,
            amount,
            receiver,
        })
    }

    fn register(&mut self, token: &TokenDescriptor) -> U256 {
        if let Some(token_id) = self.token_ids.get(token) {
            return *token_id;
        }
        let token_id = self.next_token_id;
        self.next_token_id += U256::one();
        let content = TicketContent {
            token_id,
            token_info: token_info_bytes(&token.contract, TOKEN_TYPE, token.token_id),
        };
        self.token_ids.insert(token.clone(), token_id);
        self.entries.insert(
            token_id,
            VaultEntry {
                token: token.clone(),
                content,
                reserved: U256::zero(),
            },
        );
        token_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Ticketer, TokenLedger, TicketTable, TokenDescriptor, H160) {
        let vault = H160([0xAA; 20]);
        let alice = H160([1; 20]);
        let token = TokenDescriptor {
            contract: H160([0x42; 20]),
            token_id: U256::zero(),
        };
        let mut tokens = TokenLedger::new();
        tokens.mint(&token, &alice, U256::from(1000)).unwrap();
        tokens.add_operator(&token, alice, vault);
        (Ticketer::new(vault), tokens, TicketTable::new(), token, alice)
    }

    #[test]
    fn deposit_mints_ticket_and_reserves_collateral() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();

        let issued = ticketer
            .deposit(&token, U256::from(100), alice, &mut tokens, &mut table)
            .unwrap();

        assert_eq!(ticketer.get_token_id(&token), Some(U256::zero()));
        assert_eq!(ticketer.reserved_balance(U256::zero()), 100.into());
        assert_eq!(tokens.balance(&token, &ticketer.address()), 100.into());
        assert_eq!(
            table.ticket_balance(&issued.ticket.hash(), &alice),
            100.into()
        );
    }

    #[test]
    fn first_deposit_of_each_token_allocates_monotonic_ids() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        let other = TokenDescriptor {
            contract: H160([0x43; 20]),
            token_id: U256::from(7),
        };
        tokens.mint(&other, &alice, U256::from(10)).unwrap();
        tokens.add_operator(&other, alice, ticketer.address());

        ticketer
            .deposit(&token, U256::from(1), alice, &mut tokens, &mut table)
            .unwrap();
        ticketer
            .deposit(&other, U256::from(1), alice, &mut tokens, &mut table)
            .unwrap();
        ticketer
            .deposit(&token, U256::from(1), alice, &mut tokens, &mut table)
            .unwrap();

        assert_eq!(ticketer.get_token_id(&token), Some(U256::zero()));
        assert_eq!(ticketer.get_token_id(&other), Some(U256::one()));
        assert_eq!(ticketer.reserved_balance(U256::zero()), 2.into());
    }

    #[test]
    fn zero_amount_deposit_is_rejected() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        assert_eq!(
            ticketer.deposit(&token, U256::zero(), alice, &mut tokens, &mut table),
            Err(BridgeError::ZeroAmount)
        );
    }

    #[test]
    fn deposit_without_approval_is_rejected() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        tokens.remove_operator(&token, alice, ticketer.address());
        assert_eq!(
            ticketer.deposit(&token, U256::from(10), alice, &mut tokens, &mut table),
            Err(BridgeError::NotOperator {
                owner: alice,
                operator: ticketer.address()
            })
        );
    }

    #[test]
    fn release_pays_out_and_shrinks_reserve() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        let boris = H160([2; 20]);

        let issued = ticketer
            .deposit(&token, U256::from(100), alice, &mut tokens, &mut table)
            .unwrap();
        let released = ticketer
            .release(
                &issued.ticket,
                U256::from(30),
                alice,
                boris,
                &mut tokens,
                &mut table,
            )
            .unwrap();

        assert_eq!(released.receiver, boris);
        assert_eq!(ticketer.reserved_balance(U256::zero()), 70.into());
        assert_eq!(tokens.balance(&token, &boris), 30.into());
        assert_eq!(
            table.ticket_balance(&issued.ticket.hash(), &alice),
            70.into()
        );
    }

    #[test]
    fn release_of_foreign_ticket_is_rejected() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        ticketer
            .deposit(&token, U256::from(100), alice, &mut tokens, &mut table)
            .unwrap();

        let foreign = Ticket::new(
            H160([0xBB; 20]),
            TicketContent {
                token_id: U256::zero(),
                token_info: vec![],
            },
        );
        assert_eq!(
            ticketer.release(
                &foreign,
                U256::from(1),
                alice,
                alice,
                &mut tokens,
                &mut table
            ),
            Err(BridgeError::UnknownTicketKind(foreign.hash()))
        );
    }

    #[test]
    fn release_of_unregistered_token_id_is_rejected() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        ticketer
            .deposit(&token, U256::from(100), alice, &mut tokens, &mut table)
            .unwrap();

        let unregistered = Ticket::new(
            ticketer.address(),
            TicketContent {
                token_id: U256::from(9),
                token_info: vec![],
            },
        );
        assert_eq!(
            ticketer.release(
                &unregistered,
                U256::from(1),
                alice,
                alice,
                &mut tokens,
                &mut table
            ),
            Err(BridgeError::UnknownToken)
        );
    }

    #[test]
    fn release_more_than_held_is_rejected() {
        let (mut ticketer, mut tokens, mut table, token, alice) = setup();
        let issued = ticketer
            .deposit(&token, U256::from(10), alice, &mut tokens, &mut table)
            .unwrap();

        assert_eq!(
            ticketer.release(
                &issued.ticket,
                U256::from(11),
                alice,
                alice,
                &mut tokens,
                &mut table
            ),
            Err(BridgeError::InsufficientTicketBalance(alice))
        );
        // Nothing was burned or paid out.
        assert_eq!(
            table.ticket_balance(&issued.ticket.hash(), &alice),
            10.into()
        );
        assert_eq!(ticketer.reserved_balance(U256::zero()), 10.into());
    }
}
