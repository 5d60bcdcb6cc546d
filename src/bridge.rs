// SPDX-FileCopyrightText: 2023 PK Lab <contact@pklab.io>
//
// SPDX-License-Identifier: MIT

//! Bridge aggregate and end-to-end flows.
//!
//! Wires the vault, relays, rollup mock and release router together
//! and models the host ledger's execution discipline: every submitted
//! operation group is applied all-or-nothing, in order, with no
//! concurrency. A group that fails half way leaves no observable
//! effect, which is exactly what the routing relay's two phase
//! protocol depends on.
//!
//! The flows exposed here are the combined operations callers are
//! expected to use: each one sets the routing context and performs the
//! ticket transfer inside a single group, so a well behaved caller can
//! never leave a stale context behind. The underlying components stay
//! public for tests and contract style callers.

use primitive_types::{H160, U256};
use tracing::info;

use crate::error::BridgeError;
use crate::relay::{BurnRouting, DepositRouting, ReleaseRouting, RoutingRelay};
use crate::rollup::RollupMock;
use crate::router::ReleaseRouter;
use crate::ticket::Ticket;
use crate::ticket_table::TicketTable;
use crate::ticketer::{Ticketer, TokensReleased};
use crate::token::{TokenDescriptor, TokenLedger};

#[derive(Debug, Clone)]
pub struct Bridge {
    pub tokens: TokenLedger,
    pub tickets: TicketTable,
    pub ticketer: Ticketer,
    pub rollup: RollupMock,
    pub router: ReleaseRouter,
    pub deposit_relay: RoutingRelay<DepositRouting>,
    pub burn_relay: RoutingRelay<BurnRouting>,
    pub release_relay: RoutingRelay<ReleaseRouting>,
}

impl Bridge {
    pub fn new(ticketer_address: H160, rollup_address: H160, router_address: H160) -> Self {
        Bridge {
            tokens: TokenLedger::new(),
            tickets: TicketTable::new(),
            ticketer: Ticketer::new(ticketer_address),
            rollup: RollupMock::new(rollup_address),
            router: ReleaseRouter::new(router_address, ticketer_address),
            deposit_relay: RoutingRelay::new(),
            burn_relay: RoutingRelay::new(),
            release_relay: RoutingRelay::new(),
        }
    }

    /// Runs `group` as one atomic operation group: on any failure the
    /// whole bridge state is restored and no effect is observable.
    pub fn atomic<T>(
        &mut self,
        group: impl FnOnce(&mut Bridge) -> Result<T, BridgeError>,
    ) -> Result<T, BridgeError> {
        let snapshot = self.clone();
        match group(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                *self = snapshot;
                Err(err)
            }
        }
    }

    /// Full L1 to L2 deposit leg in one group: approve the vault, lock
    /// tokens, set deposit routing and forward the minted ticket to
    /// the rollup through the relay. Returns the credited L2 address.
    pub fn deposit_to_rollup(
        &mut self,
        depositor: H160,
        token: &TokenDescriptor,
        amount: U256,
        routing: DepositRouting,
    ) -> Result<H160, BridgeError> {
        self.atomic(|bridge| {
            bridge
                .tokens
                .add_operator(token, depositor, bridge.ticketer.address());
            let issued =
                bridge
                    .ticketer
                    .deposit(token, amount, depositor, &mut bridge.tokens, &mut bridge.tickets)?;
            bridge.deposit_relay.set_context(depositor, routing);
            bridge.send_ticket_to_rollup(depositor, &issued.ticket, amount)
        })
    }

    /// Plain ticket send to the rollup through the deposit relay: the
    /// transfer itself carries no metadata, whatever context the
    /// sender recorded earlier is consumed here. Without context the
    /// rollup credits its fallback account.
    pub fn send_ticket_to_rollup(
        &mut self,
        sender: H160,
        ticket: &Ticket,
        amount: U256,
    ) -> Result<H160, BridgeError> {
        self.tickets.ticket_transfer(
            &ticket.hash(),
            &sender,
            &self.rollup.address(),
            amount,
        )?;
        let routing = self.deposit_relay.take_context(&sender);
        self.rollup.receive_deposit(ticket, amount, routing.as_ref())
    }

    /// L2 to L1 withdrawal request in one group: records burn routing
    /// for the caller and burns the caller's L2 balance into a new
    /// outbox message targeting the bridge router. Returns the message
    /// id; the release itself happens later, on execution.
    pub fn withdraw_to_l1(
        &mut self,
        caller: H160,
        ticket: &Ticket,
        amount: U256,
        routing_data: Vec<u8>,
    ) -> Result<u64, BridgeError> {
        let router = self.router.address();
        self.atomic(|bridge| {
            bridge.burn_relay.set_context(
                caller,
                BurnRouting {
                    routing_data,
                    router,
                },
            );
            bridge.burn_l2_tickets(caller, ticket, amount)
        })
    }

    /// L2 burn entrypoint: consumes the caller's burn context and
    /// turns the balance into an outbox message. A burn arriving
    /// without context cannot be routed and is rejected; the group it
    /// belongs to unwinds.
    pub fn burn_l2_tickets(
        &mut self,
        caller: H160,
        ticket: &Ticket,
        amount: U256,
    ) -> Result<u64, BridgeError> {
        let routing = self
            .burn_relay
            .take_context(&caller)
            .ok_or(BridgeError::InvalidRoutingData("missing burn context"))?;
        self.rollup.create_outbox_message(
            ticket.clone(),
            amount,
            routing.routing_data,
            routing.router,
            caller,
        )
    }

    /// Permissionless outbox execution. The attempt is consumed even
    /// when the downstream release fails: the message stays executed
    /// and the error propagates.
    pub fn execute_outbox_message(&mut self, id: u64) -> Result<TokensReleased, BridgeError> {
        let message = self.rollup.execute_outbox_message(id)?;
        if message.router != self.router.address() {
            return Err(BridgeError::UnknownRouter(message.router));
        }
        let holder = self.rollup.address();
        let released = self.router.release(
            &message.ticket,
            message.amount,
            &message.routing_data,
            holder,
            &mut self.ticketer,
            &mut self.tokens,
            &mut self.tickets,
        )?;
        info!(id, amount = %released.amount, receiver = %released.receiver, "withdrawal completed");
        Ok(released)
    }

    /// Direct L1 redeem in one group: a ticket holder routes its own
    /// tickets back into the vault via the release relay and the
    /// underlying tokens go to `receiver`.
    pub fn redeem_tickets(
        &mut self,
        holder: H160,
        ticket: &Ticket,
        amount: U256,
        receiver: H160,
    ) -> Result<TokensReleased, BridgeError> {
        self.atomic(|bridge| {
            bridge
                .release_relay
                .set_context(holder, ReleaseRouting { receiver });
            bridge.send_ticket_to_ticketer(holder, ticket, amount)
        })
    }

    /// Plain ticket send into the vault's release entrypoint through
    /// the release relay. A missing payload is acceptable on this leg:
    /// the tokens are refunded to the sender.
    pub fn send_ticket_to_ticketer(
        &mut self,
        holder: H160,
        ticket: &Ticket,
        amount: U256,
    ) -> Result<TokensReleased, BridgeError> {
        let receiver = self
            .release_relay
            .take_context(&holder)
            .map(|routing| routing.receiver)
            .unwrap_or(holder);
        self.ticketer.release(
            ticket,
            amount,
            holder,
            receiver,
            &mut self.tokens,
            &mut self.tickets,
        )
    }

    /// Plain L1 ticket transfer between two accounts.
    pub fn transfer_tickets(
        &mut self,
        from: H160,
        to: H160,
        ticket: &Ticket,
        amount: U256,
    ) -> Result<(), BridgeError> {
        self.tickets
            .ticket_transfer(&ticket.hash(), &from, &to, amount)
    }
}
