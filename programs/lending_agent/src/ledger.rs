//! Reserve bookkeeping: a lending-pool stand-in without interest accrual.
//!
//! Token movement happens in the instruction handlers; these methods only
//! keep `liquidity` and the holder's entry consistent with it. Every method
//! either applies fully or leaves both accounts untouched.

use anchor_lang::prelude::*;

use crate::errors::AgentError;
use crate::state::{LedgerEntry, Reserve};

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerOp {
    Deposit,
    Withdraw,
    Borrow,
    Repay,
}

impl LedgerEntry {
    /// Binds a freshly created entry to its PDA seeds. No-op once bound.
    pub fn open(&mut self, reserve: Pubkey, holder: Pubkey, bump: u8) {
        if self.holder == Pubkey::default() {
            self.reserve = reserve;
            self.holder = holder;
            self.bump = bump;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.deposited == 0 && self.borrowed == 0
    }
}

impl Reserve {
    /// Credit a holder. The tokens must already sit in the vault.
    pub fn deposit(&mut self, entry: &mut LedgerEntry, amount: u64) -> Result<()> {
        require!(amount > 0, AgentError::ZeroAmount);
        let liquidity = self
            .liquidity
            .checked_add(amount)
            .ok_or(AgentError::MathOverflow)?;
        let deposited = entry
            .deposited
            .checked_add(amount)
            .ok_or(AgentError::MathOverflow)?;

        entry.deposited = deposited;
        self.liquidity = liquidity;
        Ok(())
    }

    pub fn withdraw(&mut self, entry: &mut LedgerEntry, amount: u64) -> Result<()> {
        require!(amount > 0, AgentError::ZeroAmount);
        require!(
            entry.deposited >= amount,
            AgentError::InsufficientBalance
        );
        require!(
            self.liquidity >= amount,
            AgentError::InsufficientLiquidity
        );

        entry.deposited -= amount;
        self.liquidity -= amount;
        Ok(())
    }

    /// Take `amount` out of the pool as debt of the entry's holder.
    pub fn borrow(&mut self, entry: &mut LedgerEntry, amount: u64) -> Result<()> {
        require!(amount > 0, AgentError::ZeroAmount);
        require!(
            self.liquidity >= amount,
            AgentError::InsufficientLiquidity
        );
        let borrowed = entry
            .borrowed
            .checked_add(amount)
            .ok_or(AgentError::MathOverflow)?;

        entry.borrowed = borrowed;
        self.liquidity -= amount;
        Ok(())
    }

    /// Return borrowed tokens. The tokens must already sit in the vault.
    pub fn repay(&mut self, entry: &mut LedgerEntry, amount: u64) -> Result<()> {
        require!(amount > 0, AgentError::ZeroAmount);
        require!(entry.borrowed >= amount, AgentError::RepayExceedsDebt);
        let liquidity = self
            .liquidity
            .checked_add(amount)
            .ok_or(AgentError::MathOverflow)?;

        entry.borrowed -= amount;
        self.liquidity = liquidity;
        Ok(())
    }

    pub fn apply(&mut self, op: LedgerOp, entry: &mut LedgerEntry, amount: u64) -> Result<()> {
        match op {
            LedgerOp::Deposit => self.deposit(entry, amount),
            LedgerOp::Withdraw => self.withdraw(entry, amount),
            LedgerOp::Borrow => self.borrow(entry, amount),
            LedgerOp::Repay => self.repay(entry, amount),
        }
    }
}

/// Precondition of every vault, custody and fee token transfer.
pub fn check_transfer(balance: u64, amount: u64) -> Result<()> {
    require!(amount > 0, AgentError::ZeroAmount);
    require!(balance >= amount, AgentError::TransferFailed);
    Ok(())
}
