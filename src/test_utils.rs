// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

use primitive_types::{H160, U256};

use crate::bridge::Bridge;
use crate::token::TokenDescriptor;

pub fn alice() -> H160 {
    H160([0xA1; 20])
}

pub fn boris() -> H160 {
    H160([0xB0; 20])
}

pub fn alice_l2() -> H160 {
    H160([0x02; 20])
}

pub fn boris_l2() -> H160 {
    H160([0x03; 20])
}

pub fn dummy_token() -> TokenDescriptor {
    TokenDescriptor {
        contract: H160([0x42; 20]),
        token_id: U256::zero(),
    }
}

/// A bridge with one token contract and 1000 units minted to alice.
pub fn dummy_bridge() -> (Bridge, TokenDescriptor) {
    let mut bridge = Bridge::new(H160([0xAA; 20]), H160([0xCC; 20]), H160([0xDD; 20]));
    let token = dummy_token();
    bridge
        .tokens
        .mint(&token, &alice(), U256::from(1000))
        .unwrap();
    (bridge, token)
}
