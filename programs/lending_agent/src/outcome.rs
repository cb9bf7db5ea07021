//! Results of a cross-chain action. The local chain only knows whether the
//! message left, never whether it landed.

use anchor_lang::prelude::*;

use crate::state::MessageReceipt;

/// Returned synchronously by every cross-chain action once the message has
/// been handed to the bridge.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub message_id: [u8; 32],
    pub nonce: u64,
    pub fee_paid: u64,
}

/// What an observer of the destination chain can say about a dispatched
/// message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteOutcome {
    Applied,
    /// The bridge reports that execution on the destination reverted.
    Rejected,
    /// Not delivered yet, or delivered and not reported.
    Unknown,
}

impl RemoteOutcome {
    /// `receipt` is the destination's `MessageReceipt` for the message id,
    /// if it exists; `execution_failed` is the bridge's delivery report.
    pub fn observe(
        message_id: &[u8; 32],
        receipt: Option<&MessageReceipt>,
        execution_failed: bool,
    ) -> Self {
        match receipt {
            Some(r) if r.message_id == *message_id => RemoteOutcome::Applied,
            _ if execution_failed => RemoteOutcome::Rejected,
            _ => RemoteOutcome::Unknown,
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, RemoteOutcome::Unknown)
    }
}
