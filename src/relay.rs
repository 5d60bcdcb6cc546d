// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Routing context relay.
//!
//! Plain accounts cannot attach free form data to a ticket transfer:
//! the transfer carries only kind, amount and destination. The relay
//! works around that with a two phase protocol: the sender first
//! records a routing payload under its own address, and the next
//! ticket receiving call from that sender consumes it.
//!
//! The context table holds at most one live entry per sender and an
//! entry is deleted on consumption. Both phases MUST be submitted in
//! the same atomic operation group, otherwise a later unrelated call
//! could consume or observe a stale payload; the bridge aggregate only
//! exposes combined set-and-transfer operations for this reason.
//!
//! Three payload shapes ride on the same contract: deposit routing
//! (L1 to L2), burn routing (L2 to L1) and release routing (direct L1
//! redeem).

use std::collections::HashMap;

use primitive_types::H160;
use tracing::debug;

/// Single use per-sender context table, generic over the payload the
/// specialization attaches.
#[derive(Debug, Clone)]
pub struct RoutingRelay<P> {
    context: HashMap<H160, P>,
}

impl<P> Default for RoutingRelay<P> {
    fn default() -> Self {
        RoutingRelay {
            context: HashMap::new(),
        }
    }
}

impl<P> RoutingRelay<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `payload` for `sender`, overwriting any previous entry.
    pub fn set_context(&mut self, sender: H160, payload: P) {
        debug!(%sender, "routing context set");
        self.context.insert(sender, payload);
    }

    /// Consumes and returns the context of `sender`, if any. Absence
    /// is not an error here; the consuming component decides whether a
    /// missing payload is acceptable.
    pub fn take_context(&mut self, sender: &H160) -> Option<P> {
        self.context.remove(sender)
    }

    pub fn peek_context(&self, sender: &H160) -> Option<&P> {
        self.context.get(sender)
    }
}

/// L1 to L2 deposit routing: which L2 address to credit, and where to
/// refund on L2 failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRouting {
    pub refund_address: H160,
    pub l2_address: H160,
}

/// L2 to L1 burn routing: raw routing bytes owned by the target router
/// plus the router address itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnRouting {
    pub routing_data: Vec<u8>,
    pub router: H160,
}

/// Direct L1 redeem routing: who receives the released tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRouting {
    pub receiver: H160,
}
