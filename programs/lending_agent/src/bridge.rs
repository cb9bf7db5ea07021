//! Adapter over the external message bridge.
//!
//! Outbound: quote, charge and number a message, then hand it to the relayer
//! through `MessageSent` with any tokens parked in the bridge custody
//! account. Inbound: only the configured bridge endpoint may deliver, the
//! message id must be the one the sender derived for this destination, and a
//! delivery must describe its own origin consistently with the envelope.

use anchor_lang::prelude::*;

use crate::errors::AgentError;
use crate::message::{message_id, CrossChainInstruction, InboundMessage, TokenAmount};
use crate::state::Agent;

/// A message accepted for sending.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub message_id: [u8; 32],
    pub nonce: u64,
    pub fee: u64,
    pub payload: Vec<u8>,
}

/// A delivered message, decoded and checked against its envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub instruction: CrossChainInstruction,
    pub token: Option<TokenAmount>,
}

/// Fee to deliver `instruction` with `token_amounts` attached. The schedule
/// is the same for every destination chain.
pub fn quote_fee(
    agent: &Agent,
    _destination_chain: u64,
    instruction: &CrossChainInstruction,
    token_amounts: &[TokenAmount],
) -> Result<u64> {
    let payload = instruction.encode()?;
    agent.fee_schedule.quote(payload.len(), token_amounts)
}

/// Validates the fee, consumes a nonce and derives the message id. Moving
/// the fee and tokens is left to the caller.
pub fn prepare_send(
    agent: &mut Agent,
    agent_key: &Pubkey,
    destination_chain: u64,
    destination_agent: &Pubkey,
    instruction: &CrossChainInstruction,
    token: Option<TokenAmount>,
    fee_payment: u64,
) -> Result<Dispatch> {
    let token_amounts: Vec<TokenAmount> = token.into_iter().collect();
    check_tokens(instruction, &token_amounts)?;

    let payload = instruction.encode()?;
    let fee = agent.fee_schedule.quote(payload.len(), &token_amounts)?;
    require!(fee_payment >= fee, AgentError::InsufficientFee);

    let nonce = agent.next_nonce;
    agent.next_nonce = nonce.checked_add(1).ok_or(AgentError::MathOverflow)?;

    Ok(Dispatch {
        message_id: message_id(
            agent.chain_id,
            agent_key,
            destination_chain,
            destination_agent,
            nonce,
            &payload,
        ),
        nonce,
        fee,
        payload,
    })
}

/// Only the bridge endpoint configured at initialization may deliver.
pub fn authenticate(agent: &Agent, caller: &Pubkey) -> Result<()> {
    require_keys_eq!(*caller, agent.bridge_endpoint, AgentError::Unauthorized);
    Ok(())
}

/// Checks the envelope against its id and decodes the payload. The id binds
/// origin, destination, nonce and payload, so one sent message has exactly
/// one receipt address here.
pub fn open(agent: &Agent, agent_key: &Pubkey, message: &InboundMessage) -> Result<Delivery> {
    let expected = message_id(
        message.source_chain,
        &message.sender,
        agent.chain_id,
        agent_key,
        message.nonce,
        &message.data,
    );
    require!(
        expected == message.message_id,
        AgentError::MessageIdMismatch
    );

    let instruction = CrossChainInstruction::decode(&message.data)?;
    require!(
        instruction.origin_chain == message.source_chain
            && instruction.origin_agent == message.sender,
        AgentError::OriginMismatch
    );
    check_tokens(&instruction, &message.token_amounts)?;

    Ok(Delivery {
        instruction,
        token: message.token_amounts.first().copied(),
    })
}

fn check_tokens(
    instruction: &CrossChainInstruction,
    token_amounts: &[TokenAmount],
) -> Result<()> {
    if instruction.action.carries_tokens() {
        require!(token_amounts.len() == 1, AgentError::MissingTokenTransfer);
        require!(token_amounts[0].amount > 0, AgentError::ZeroAmount);
    } else {
        require!(token_amounts.is_empty(), AgentError::UnexpectedTokenTransfer);
    }
    Ok(())
}
