// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Fungible token ledger.
//!
//! Models the external FA2 style token contracts the vault custodies:
//! per owner balances keyed by (token contract, token id) and an
//! operator table implementing the transfer approval mechanism the
//! vault relies on as a deposit precondition. Everything else about
//! the token standard (metadata, batching, pause) is out of scope.

use std::collections::{HashMap, HashSet};

use primitive_types::{H160, U256};

use crate::error::BridgeError;

/// Identity of an underlying fungible token: the contract holding its
/// ledger and the token id inside that contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenDescriptor {
    pub contract: H160,
    pub token_id: U256,
}

#[derive(Debug, Clone, Default)]
pub struct TokenLedger {
    balances: HashMap<(TokenDescriptor, H160), U256>,
    operators: HashSet<(TokenDescriptor, H160, H160)>,
}

impl TokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an owner balance, the equivalent of originating the token
    /// contract with a pre-filled ledger.
    pub fn mint(
        &mut self,
        token: &TokenDescriptor,
        owner: &H160,
        amount: U256,
    ) -> Result<(), BridgeError> {
        let balance = self.balance(token, owner);
        let new_balance = balance
            .checked_add(amount)
            .ok_or(BridgeError::BalanceOverflow)?;
        self.balances.insert((token.clone(), *owner), new_balance);
        Ok(())
    }

    /// Approves `operator` to move tokens of `owner`.
    pub fn add_operator(&mut self, token: &TokenDescriptor, owner: H160, operator: H160) {
        self.operators.insert((token.clone(), owner, operator));
    }

    pub fn remove_operator(&mut self, token: &TokenDescriptor, owner: H160, operator: H160) {
        self.operators.remove(&(token.clone(), owner, operator));
    }

    /// Moves tokens between owners. The caller must either be the
    /// owner or one of its approved operators.
    pub fn transfer(
        &mut self,
        token: &TokenDescriptor,
        from: H160,
        to: H160,
        amount: U256,
        caller: H160,
    ) -> Result<(), BridgeError> {
        if caller != from && !self.operators.contains(&(token.clone(), from, caller)) {
            return Err(BridgeError::NotOperator {
                owner: from,
                operator: caller,
            });
        }
        let from_balance = self.balance(token, &from);
        let new_from = from_balance
            .checked_sub(amount)
            .ok_or(BridgeError::InsufficientTokenBalance(from))?;
        let to_balance = self.balance(token, &to);
        let new_to = to_balance
            .checked_add(amount)
            .ok_or(BridgeError::BalanceOverflow)?;
        self.balances.insert((token.clone(), from), new_from);
        self.balances.insert((token.clone(), to), new_to);
        Ok(())
    }

    pub fn balance(&self, token: &TokenDescriptor, owner: &H160) -> U256 {
        self.balances
            .get(&(token.clone(), *owner))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_token() -> TokenDescriptor {
        TokenDescriptor {
            contract: H160([0x42; 20]),
            token_id: U256::zero(),
        }
    }

    #[test]
    fn owner_can_transfer_own_tokens() {
        let mut ledger = TokenLedger::new();
        let token = dummy_token();
        let (alice, boris) = (H160([1; 20]), H160([2; 20]));

        ledger.mint(&token, &alice, U256::from(100)).unwrap();
        ledger
            .transfer(&token, alice, boris, U256::from(40), alice)
            .unwrap();

        assert_eq!(ledger.balance(&token, &alice), 60.into());
        assert_eq!(ledger.balance(&token, &boris), 40.into());
    }

    #[test]
    fn transfer_requires_operator_approval() {
        let mut ledger = TokenLedger::new();
        let token = dummy_token();
        let (alice, vault) = (H160([1; 20]), H160([0xAA; 20]));

        ledger.mint(&token, &alice, U256::from(100)).unwrap();
        assert_eq!(
            ledger.transfer(&token, alice, vault, U256::from(10), vault),
            Err(BridgeError::NotOperator {
                owner: alice,
                operator: vault
            })
        );

        ledger.add_operator(&token, alice, vault);
        ledger
            .transfer(&token, alice, vault, U256::from(10), vault)
            .unwrap();
        assert_eq!(ledger.balance(&token, &vault), 10.into());
    }

    #[test]
    fn transfer_fails_on_insufficient_balance() {
        let mut ledger = TokenLedger::new();
        let token = dummy_token();
        let (alice, boris) = (H160([1; 20]), H160([2; 20]));

        ledger.mint(&token, &alice, U256::from(5)).unwrap();
        assert_eq!(
            ledger.transfer(&token, alice, boris, U256::from(6), alice),
            Err(BridgeError::InsufficientTokenBalance(alice))
        );
        assert_eq!(ledger.balance(&token, &alice), 5.into());
    }
}
