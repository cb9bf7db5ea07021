//! Events emitted by the lending agent program.
//! The bridge relayer consumes `MessageSent`; indexers consume the rest.

use anchor_lang::prelude::*;

use crate::ledger::LedgerOp;
use crate::message::ActionKind;

#[event]
pub struct AgentInitialized {
    pub agent: Pubkey,
    pub owner: Pubkey,
    pub chain_id: u64,
    pub bridge_endpoint: Pubkey,
}

#[event]
pub struct ReserveInitialized {
    pub agent: Pubkey,
    pub reserve: Pubkey,
    pub mint: Pubkey,
    pub vault: Pubkey,
}

#[event]
pub struct AllowlistUpdated {
    pub agent: Pubkey,
    pub entries: u32,
    pub timestamp: i64,
}

#[event]
pub struct MessageSent {
    pub message_id: [u8; 32],
    pub destination_chain: u64,
    pub destination_agent: Pubkey,
    pub action: ActionKind,
    pub asset: Pubkey,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u64,
    /// Encoded instruction the relayer must deliver verbatim.
    pub data: Vec<u8>,
    pub timestamp: i64,
}

#[event]
pub struct LedgerMutated {
    pub reserve: Pubkey,
    pub holder: Pubkey,
    pub op: LedgerOp,
    pub amount: u64,
    /// Reserve liquidity after the mutation.
    pub liquidity: u64,
    pub timestamp: i64,
}

/// A remote agent asked this agent to fund a borrow. The owner decides
/// whether to answer with `borrow_to_chain`.
#[event]
pub struct BorrowRequested {
    pub message_id: [u8; 32],
    pub origin_chain: u64,
    pub origin_agent: Pubkey,
    pub asset: Pubkey,
    pub amount: u64,
    pub on_behalf_of: Pubkey,
    pub available_liquidity: u64,
    pub timestamp: i64,
}

#[event]
pub struct InstructionApplied {
    pub message_id: [u8; 32],
    pub origin_chain: u64,
    pub origin_agent: Pubkey,
    pub action: ActionKind,
    pub timestamp: i64,
}
