use anchor_lang::error::Error;
use anchor_lang::prelude::*;

use crate::errors::AgentError;
use crate::state::{Agent, Allowlist, FeeSchedule, LedgerEntry, Reserve};

pub fn error_code(err: &Error) -> Option<u32> {
    match err {
        Error::AnchorError(e) => Some(e.error_code_number),
        Error::ProgramError(_) => None,
    }
}

#[track_caller]
pub fn assert_agent_error(err: Error, expected: AgentError) {
    assert_eq!(error_code(&err), error_code(&Error::from(expected)), "{err:?}");
}

/// Empty ledger entry already bound to `holder`.
pub fn entry_for(holder: &Pubkey) -> LedgerEntry {
    let mut entry = LedgerEntry::default();
    entry.open(Pubkey::new_unique(), *holder, 255);
    entry
}

/// Reserve whose whole liquidity is supplied by the returned lender entry.
pub fn funded_reserve(amount: u64) -> (Reserve, LedgerEntry) {
    let mut reserve = Reserve {
        mint: Pubkey::new_unique(),
        ..Reserve::default()
    };
    let mut lender = entry_for(&Pubkey::new_unique());
    if amount > 0 {
        reserve.deposit(&mut lender, amount).unwrap();
    }
    (reserve, lender)
}

pub fn agent(chain_id: u64, bridge_endpoint: Pubkey) -> Agent {
    Agent {
        owner: Pubkey::new_unique(),
        chain_id,
        bridge_endpoint,
        fee_collector: Pubkey::new_unique(),
        fee_mint: None,
        fee_schedule: FeeSchedule {
            base_fee: 5_000,
            fee_per_byte: 10,
            token_fee_bps: 30,
        },
        next_nonce: 0,
        bump: 255,
    }
}

pub fn allowlist_with(chain_id: u64, remote: Pubkey) -> Allowlist {
    let mut allowlist = Allowlist::default();
    allowlist
        .set_allowed(&[chain_id], &[vec![remote]], &[vec![true]])
        .unwrap();
    allowlist
}
