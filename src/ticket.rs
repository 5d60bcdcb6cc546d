// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Ticket identity.
//!
//! A ticket kind is the pair of its issuer address and its canonically
//! encoded content. Two tickets are the same kind iff both are byte
//! equal; content is never reinterpreted structurally once encoded.
//! The 32 byte ticket hash derived from the pair is used as ledger key
//! everywhere else in the crate.

use std::fmt;

use primitive_types::{H160, H256, U256};
use rlp::{Decodable, DecoderError, Encodable, Rlp, RlpStream};
use sha3::{Digest, Keccak256};

/// Ticket payload: token identifier plus opaque packed token metadata.
///
/// `token_info` carries whatever the issuer packed at registration time
/// (see [token_info_bytes]); the bridge never decodes it, it only
/// participates in kind equality and hashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketContent {
    pub token_id: U256,
    pub token_info: Vec<u8>,
}

impl TicketContent {
    /// Canonical byte encoding of the content.
    pub fn to_bytes(&self) -> Vec<u8> {
        rlp::encode(self).to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecoderError> {
        rlp::decode(bytes)
    }
}

impl Encodable for TicketContent {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(2);
        s.append(&self.token_id);
        s.append(&self.token_info);
    }
}

impl Decodable for TicketContent {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        Ok(TicketContent {
            token_id: rlp.val_at(0)?,
            token_info: rlp.val_at(1)?,
        })
    }
}

/// A ticket kind: issuer plus content.
///
/// The fungible amount is tracked separately by the ticket ledger,
/// tickets of the same kind aggregate like an account balance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub ticketer: H160,
    pub content: TicketContent,
}

impl Ticket {
    pub fn new(ticketer: H160, content: TicketContent) -> Self {
        Ticket { ticketer, content }
    }

    /// Unique ticket kind digest: Keccak256 over issuer and canonical
    /// content bytes.
    pub fn hash(&self) -> H256 {
        let mut bytes = self.ticketer.as_bytes().to_vec();
        bytes.extend_from_slice(&self.content.to_bytes());
        keccak256_hash(&bytes)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ticket {} issued by {} (content 0x{})",
            self.hash(),
            self.ticketer,
            hex::encode(self.content.to_bytes())
        )
    }
}

pub fn keccak256_hash(bytes: &[u8]) -> H256 {
    H256(Keccak256::digest(bytes).into())
}

/// Packed token metadata triple: originating contract, token standard
/// name, and the token id inside that contract.
pub fn token_info_bytes(contract: &H160, token_type: &str, token_id: U256) -> Vec<u8> {
    let mut s = RlpStream::new_list(3);
    s.append(contract);
    s.append(&token_type.as_bytes().to_vec());
    s.append(&token_id);
    s.out().to_vec()
}
