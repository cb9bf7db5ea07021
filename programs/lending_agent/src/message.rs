//! Wire format of agent-to-agent instructions.
//!
//! The bridge treats the payload as opaque bytes. Each payload is
//! self-describing (it names its origin) so the receiving agent can process
//! it without any knowledge of earlier messages.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hashv;

use crate::errors::AgentError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InterestRateMode {
    #[default]
    Stable,
    Variable,
}

/// Parameters of a supply, borrow or repay. Built once per call and passed
/// by value; `on_behalf_of == Pubkey::default()` means the agent itself.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReserveRequest {
    pub asset: Pubkey,
    pub amount: u64,
    pub on_behalf_of: Pubkey,
    pub interest_rate_mode: InterestRateMode,
    pub referral_code: u16,
}

impl ReserveRequest {
    /// Same request denominated in another chain's address for the asset.
    pub fn with_asset(self, asset: Pubkey) -> Self {
        Self { asset, ..self }
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionKind {
    /// Ask the remote agent to fund a borrow. Carries no tokens.
    #[default]
    BorrowRequest,
    /// Borrowed tokens delivered to the destination agent.
    BorrowFulfill,
    /// Repayment tokens delivered to the agent holding the debt.
    Repay,
}

impl ActionKind {
    pub fn carries_tokens(&self) -> bool {
        !matches!(self, ActionKind::BorrowRequest)
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrossChainInstruction {
    pub action: ActionKind,
    pub reserve: ReserveRequest,
    pub origin_agent: Pubkey,
    pub origin_chain: u64,
}

impl CrossChainInstruction {
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.try_to_vec()
            .map_err(|_| error!(AgentError::MalformedInstruction))
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        Self::try_from_slice(data).map_err(|_| error!(AgentError::MalformedInstruction))
    }
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAmount {
    pub mint: Pubkey,
    pub amount: u64,
}

/// Message as handed over by the bridge endpoint on delivery.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Id assigned by the sending agent; also the replay key. Must equal
    /// `message_id(source_chain, sender, <this chain>, <this agent>, nonce, data)`.
    pub message_id: [u8; 32],
    pub source_chain: u64,
    /// Agent that sent the message on the source chain.
    pub sender: Pubkey,
    /// Sender's outbound nonce for this message.
    pub nonce: u64,
    pub data: Vec<u8>,
    pub token_amounts: Vec<TokenAmount>,
}

/// Identifier of an outbound message, correlatable on the bridge explorer.
pub fn message_id(
    origin_chain: u64,
    origin_agent: &Pubkey,
    destination_chain: u64,
    destination_agent: &Pubkey,
    nonce: u64,
    payload: &[u8],
) -> [u8; 32] {
    hashv(&[
        b"message",
        &origin_chain.to_le_bytes(),
        origin_agent.as_ref(),
        &destination_chain.to_le_bytes(),
        destination_agent.as_ref(),
        &nonce.to_le_bytes(),
        payload,
    ])
    .to_bytes()
}
