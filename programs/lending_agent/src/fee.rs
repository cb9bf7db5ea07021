//! Bridge delivery fee.

use anchor_lang::prelude::*;

use crate::errors::AgentError;
use crate::message::TokenAmount;
use crate::state::{Agent, FeeSchedule};

pub const MAX_BPS: u16 = 10_000;

impl FeeSchedule {
    /// `base + per_byte * payload_len + bps of attached token value`.
    /// Non-decreasing in every token amount.
    pub fn quote(&self, payload_len: usize, token_amounts: &[TokenAmount]) -> Result<u64> {
        let per_byte = self
            .fee_per_byte
            .checked_mul(payload_len as u64)
            .ok_or(AgentError::MathOverflow)?;
        let token_value = token_amounts
            .iter()
            .try_fold(0u128, |acc, t| acc.checked_add(t.amount as u128))
            .ok_or(AgentError::MathOverflow)?;
        let token_fee = u64::try_from(token_value * self.token_fee_bps as u128 / MAX_BPS as u128)
            .map_err(|_| AgentError::MathOverflow)?;

        self.base_fee
            .checked_add(per_byte)
            .and_then(|f| f.checked_add(token_fee))
            .ok_or_else(|| error!(AgentError::MathOverflow))
    }
}

/// Fields of an SPL token account that fee routing looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenBalance {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeRoute {
    /// Nothing to charge.
    Waived,
    /// System transfer from the payer to the fee collector.
    Lamports,
    /// SPL transfer between the two fee token accounts.
    Token,
}

/// Checks the accounts a caller supplied for paying `fee` and picks how it
/// is paid. Runs before any CPI so a bad account set moves nothing.
pub fn route_fee(
    agent: &Agent,
    fee_collector: &Pubkey,
    payer: &Pubkey,
    payer_lamports: u64,
    payer_fee_token: Option<TokenBalance>,
    collector_fee_token: Option<TokenBalance>,
    fee: u64,
) -> Result<FeeRoute> {
    require_keys_eq!(
        *fee_collector,
        agent.fee_collector,
        AgentError::InvalidFeeAccount
    );
    if fee == 0 {
        return Ok(FeeRoute::Waived);
    }

    let Some(fee_mint) = agent.fee_mint else {
        require!(payer_lamports >= fee, AgentError::InsufficientFee);
        return Ok(FeeRoute::Lamports);
    };
    let (Some(from), Some(to)) = (payer_fee_token, collector_fee_token) else {
        return err!(AgentError::InvalidFeeAccount);
    };
    require!(
        from.mint == fee_mint && from.owner == *payer,
        AgentError::InvalidFeeAccount
    );
    require!(
        to.mint == fee_mint && to.owner == agent.fee_collector,
        AgentError::InvalidFeeAccount
    );
    require!(from.amount >= fee, AgentError::InsufficientFee);
    Ok(FeeRoute::Token)
}
