//! Which remote (chain, agent) pairs may trigger inbound actions.
//!
//! A bridge delivery has no native caller identity, so authorization is a
//! plain lookup on the origin the message claims and the bridge vouches for.

use anchor_lang::prelude::*;

use crate::errors::AgentError;
use crate::state::{Allowlist, AllowlistEntry, MAX_ALLOWLIST_ENTRIES};

impl Allowlist {
    pub fn is_allowed(&self, chain_id: u64, agent: &Pubkey) -> bool {
        self.entries
            .iter()
            .any(|e| e.chain_id == chain_id && e.agent == *agent)
    }

    /// Batch update. For each `chains[i]`, pairs `agents[i][j]` with
    /// `allowed[i][j]`. The batch is validated up front and applied whole.
    pub fn set_allowed(
        &mut self,
        chains: &[u64],
        agents: &[Vec<Pubkey>],
        allowed: &[Vec<bool>],
    ) -> Result<()> {
        require!(
            chains.len() == agents.len() && chains.len() == allowed.len(),
            AgentError::LengthMismatch
        );
        require!(
            agents.iter().zip(allowed).all(|(a, f)| a.len() == f.len()),
            AgentError::LengthMismatch
        );

        let mut entries = self.entries.clone();
        for ((chain_id, agents), flags) in chains.iter().zip(agents).zip(allowed) {
            for (agent, allow) in agents.iter().zip(flags) {
                let entry = AllowlistEntry {
                    chain_id: *chain_id,
                    agent: *agent,
                };
                let present = entries.contains(&entry);
                match (*allow, present) {
                    (true, false) => entries.push(entry),
                    (false, true) => entries.retain(|e| *e != entry),
                    _ => {}
                }
            }
        }
        require!(
            entries.len() <= MAX_ALLOWLIST_ENTRIES,
            AgentError::AllowlistFull
        );

        self.entries = entries;
        Ok(())
    }
}
