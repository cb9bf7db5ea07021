//! Program state accounts for the cross-chain lending agent.
//!
//! One agent per chain. The agent owns an allowlist of remote agents it
//! accepts instructions from and one reserve per asset that acts as the
//! local lending pool, with a ledger entry account per holder. In-flight
//! cross-chain operations are not stored here; the bridge carries them.

use anchor_lang::prelude::*;

use crate::message::ActionKind;

/// Upper bound on (chain, agent) pairs a single allowlist can hold.
pub const MAX_ALLOWLIST_ENTRIES: usize = 32;

/// Bridge fee schedule. The fee is charged in lamports unless the agent is
/// configured with a fee mint.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSchedule {
    /// Flat fee per message.
    pub base_fee: u64,
    /// Fee per byte of instruction payload.
    pub fee_per_byte: u64,
    /// Fee on attached token value in basis points (0..=10000).
    pub token_fee_bps: u16,
}

impl FeeSchedule {
    pub const LEN: usize = 8 + 8 + 2;
}

/// Deploy-time configuration. Not re-configurable afterwards.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct AgentConfig {
    /// Chain selector the bridge uses for this chain.
    pub chain_id: u64,
    /// The only signer allowed to deliver inbound messages.
    pub bridge_endpoint: Pubkey,
    /// Receiver of bridge fees.
    pub fee_collector: Pubkey,
    /// Pay fees in this SPL token instead of lamports.
    pub fee_mint: Option<Pubkey>,
    pub fee_schedule: FeeSchedule,
}

/// The per-chain agent. Single instance per program.
#[account]
#[derive(Default)]
pub struct Agent {
    /// Authority that manages the allowlist, reserves and outbound borrows.
    pub owner: Pubkey,
    pub chain_id: u64,
    pub bridge_endpoint: Pubkey,
    pub fee_collector: Pubkey,
    pub fee_mint: Option<Pubkey>,
    pub fee_schedule: FeeSchedule,
    /// Next nonce to assign to an outbound message.
    pub next_nonce: u64,
    pub bump: u8,
}

impl Agent {
    pub const SEED_PREFIX: &'static [u8] = b"agent";
    pub const LEN: usize = 32 + 8 + 32 + 32 + (1 + 32) + FeeSchedule::LEN + 8 + 1;

    /// Resolves the zero-sentinel beneficiary to the agent itself.
    pub fn beneficiary(agent: &Pubkey, on_behalf_of: &Pubkey) -> Pubkey {
        if *on_behalf_of == Pubkey::default() {
            *agent
        } else {
            *on_behalf_of
        }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllowlistEntry {
    pub chain_id: u64,
    pub agent: Pubkey,
}

impl AllowlistEntry {
    pub const LEN: usize = 8 + 32;
}

/// Remote agents permitted to trigger inbound actions. Absent means denied.
#[account]
#[derive(Default)]
pub struct Allowlist {
    pub agent: Pubkey,
    pub entries: Vec<AllowlistEntry>,
    pub bump: u8,
}

impl Allowlist {
    pub const SEED_PREFIX: &'static [u8] = b"allowlist";
    pub const LEN: usize = 32 + (4 + MAX_ALLOWLIST_ENTRIES * AllowlistEntry::LEN) + 1;
}

/// Balance sheet of one holder within a reserve. One account per
/// (reserve, holder), created by whoever first credits or debits the holder.
#[account]
#[derive(Default, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub reserve: Pubkey,
    pub holder: Pubkey,
    pub deposited: u64,
    pub borrowed: u64,
    pub bump: u8,
}

impl LedgerEntry {
    pub const SEED_PREFIX: &'static [u8] = b"ledger";
    pub const LEN: usize = 32 + 32 + 8 + 8 + 1;
}

/// One reserve per asset. Holds the vault; holders' balances live in their
/// own `LedgerEntry` accounts.
#[account]
#[derive(Default)]
pub struct Reserve {
    pub agent: Pubkey,
    pub mint: Pubkey,
    /// Token account owned by this reserve PDA.
    pub vault: Pubkey,
    /// Tokens the reserve can lend or pay out. Tracks the vault balance.
    pub liquidity: u64,
    pub bump: u8,
}

impl Reserve {
    pub const SEED_PREFIX: &'static [u8] = b"reserve";
    pub const LEN: usize = 32 + 32 + 32 + 8 + 1;
}

/// Marker for an inbound message that was applied. Its existence is the
/// replay guard: a second delivery of the same id cannot re-create it.
#[account]
#[derive(Default)]
pub struct MessageReceipt {
    pub message_id: [u8; 32],
    pub source_chain: u64,
    pub sender: Pubkey,
    pub action: ActionKind,
    pub applied_at: i64,
}

impl MessageReceipt {
    pub const SEED_PREFIX: &'static [u8] = b"receipt";
    pub const LEN: usize = 32 + 8 + 32 + 1 + 8;
}
