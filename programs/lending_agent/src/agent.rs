//! Orchestration of the agent's actions.
//!
//! Outbound actions turn a `ReserveRequest` into a ledger mutation and/or a
//! `CrossChainInstruction`. Inbound messages are planned into exactly one
//! effect after authentication, decoding and the allowlist check. Nothing
//! here depends on another message having arrived first.

use anchor_lang::prelude::*;

use crate::bridge::{self, Delivery};
use crate::errors::AgentError;
use crate::ledger::LedgerOp;
use crate::message::{
    ActionKind, CrossChainInstruction, InboundMessage, ReserveRequest, TokenAmount,
};
use crate::state::{Agent, Allowlist, LedgerEntry, Reserve};

/// What an accepted inbound message does on this chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InboundEffect {
    /// Surface the request to the owner; no funds move.
    BorrowRequested { request: ReserveRequest },
    /// Move the delivered tokens into the reserve and book them.
    Ledger {
        op: LedgerOp,
        holder: Pubkey,
        amount: u64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InboundPlan {
    pub instruction: CrossChainInstruction,
    pub effect: InboundEffect,
}

fn outbound(
    agent: &Agent,
    agent_key: &Pubkey,
    action: ActionKind,
    reserve: ReserveRequest,
) -> CrossChainInstruction {
    CrossChainInstruction {
        action,
        reserve,
        origin_agent: *agent_key,
        origin_chain: agent.chain_id,
    }
}

/// The entry passed in must be the beneficiary's.
fn check_holder(entry: &LedgerEntry, holder: &Pubkey) -> Result<()> {
    require_keys_eq!(entry.holder, *holder, AgentError::HolderMismatch);
    Ok(())
}

/// Books a supply into `reserve`. Returns the credited holder.
pub fn supply(
    reserve: &mut Reserve,
    entry: &mut LedgerEntry,
    agent_key: &Pubkey,
    request: &ReserveRequest,
) -> Result<Pubkey> {
    require_keys_eq!(request.asset, reserve.mint, AgentError::AssetMismatch);
    let holder = Agent::beneficiary(agent_key, &request.on_behalf_of);
    check_holder(entry, &holder)?;
    reserve.deposit(entry, request.amount)?;
    Ok(holder)
}

/// Debits a deposit. The holder signs for their own entry; the agent's own
/// entry is withdrawn by the owner.
pub fn withdraw(
    agent: &Agent,
    agent_key: &Pubkey,
    reserve: &mut Reserve,
    entry: &mut LedgerEntry,
    signer: &Pubkey,
    amount: u64,
) -> Result<()> {
    let authorized = *signer == entry.holder
        || (entry.holder == *agent_key && *signer == agent.owner);
    require!(authorized, AgentError::Unauthorized);
    reserve.withdraw(entry, amount)
}

pub fn borrow_from_chain(
    agent: &Agent,
    agent_key: &Pubkey,
    request: &ReserveRequest,
) -> Result<CrossChainInstruction> {
    require!(request.amount > 0, AgentError::ZeroAmount);
    Ok(outbound(agent, agent_key, ActionKind::BorrowRequest, *request))
}

/// Borrows from the local reserve and returns the instruction plus the
/// tokens that must travel with it.
pub fn borrow_to_chain(
    agent: &Agent,
    agent_key: &Pubkey,
    reserve: &mut Reserve,
    entry: &mut LedgerEntry,
    request: &ReserveRequest,
) -> Result<(CrossChainInstruction, Pubkey, TokenAmount)> {
    require_keys_eq!(request.asset, reserve.mint, AgentError::AssetMismatch);
    let holder = Agent::beneficiary(agent_key, &request.on_behalf_of);
    check_holder(entry, &holder)?;
    reserve.borrow(entry, request.amount)?;

    let token = TokenAmount {
        mint: reserve.mint,
        amount: request.amount,
    };
    Ok((
        outbound(agent, agent_key, ActionKind::BorrowFulfill, *request),
        holder,
        token,
    ))
}

/// `request.asset` is the local mint of the tokens being sent and
/// `remote_asset` is the mint the debt is booked in on the remote chain; the
/// instruction is re-denominated in `remote_asset` so the receiving agent can
/// match its own reserve. Clients that put the remote asset inside `request`
/// and pass the local token separately get `AssetMismatch`.
pub fn repay_to_chain(
    agent: &Agent,
    agent_key: &Pubkey,
    local_mint: &Pubkey,
    request: &ReserveRequest,
    remote_asset: &Pubkey,
) -> Result<(CrossChainInstruction, TokenAmount)> {
    require_keys_eq!(request.asset, *local_mint, AgentError::AssetMismatch);
    require!(request.amount > 0, AgentError::ZeroAmount);

    let token = TokenAmount {
        mint: *local_mint,
        amount: request.amount,
    };
    let reserve = request.with_asset(*remote_asset);
    Ok((outbound(agent, agent_key, ActionKind::Repay, reserve), token))
}

/// Authenticates, decodes and authorizes a delivery against the reserve the
/// bridge supplied. Delivered token amounts are denominated in local mints.
pub fn plan_inbound(
    agent: &Agent,
    agent_key: &Pubkey,
    allowlist: &Allowlist,
    caller: &Pubkey,
    reserve: &Reserve,
    message: &InboundMessage,
) -> Result<InboundPlan> {
    bridge::authenticate(agent, caller)?;
    let Delivery { instruction, token } = bridge::open(agent, agent_key, message)?;
    require!(
        allowlist.is_allowed(message.source_chain, &message.sender),
        AgentError::UnauthorizedOrigin
    );

    let holder = Agent::beneficiary(agent_key, &instruction.reserve.on_behalf_of);
    let effect = match (instruction.action, token) {
        (ActionKind::BorrowRequest, _) => {
            require_keys_eq!(
                instruction.reserve.asset,
                reserve.mint,
                AgentError::AssetMismatch
            );
            InboundEffect::BorrowRequested {
                request: instruction.reserve,
            }
        }
        (ActionKind::BorrowFulfill, Some(token)) => {
            require_keys_eq!(token.mint, reserve.mint, AgentError::AssetMismatch);
            InboundEffect::Ledger {
                op: LedgerOp::Deposit,
                holder,
                amount: token.amount,
            }
        }
        (ActionKind::Repay, Some(token)) => {
            require_keys_eq!(
                instruction.reserve.asset,
                reserve.mint,
                AgentError::AssetMismatch
            );
            require_keys_eq!(token.mint, reserve.mint, AgentError::AssetMismatch);
            InboundEffect::Ledger {
                op: LedgerOp::Repay,
                holder,
                amount: token.amount,
            }
        }
        (_, None) => return err!(AgentError::MissingTokenTransfer),
    };

    Ok(InboundPlan { instruction, effect })
}

/// Books an accepted delivery against the beneficiary's entry. Token
/// movement is the caller's job.
pub fn apply_inbound(
    reserve: &mut Reserve,
    entry: &mut LedgerEntry,
    plan: &InboundPlan,
) -> Result<()> {
    match plan.effect {
        InboundEffect::BorrowRequested { .. } => Ok(()),
        InboundEffect::Ledger { op, holder, amount } => {
            check_holder(entry, &holder)?;
            reserve.apply(op, entry, amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{message_id, InterestRateMode};
    use crate::test_utils::{agent, allowlist_with, assert_agent_error, entry_for, funded_reserve};

    const SEPOLIA: u64 = 16_015_286_601_757_825_753;
    const BSC_TESTNET: u64 = 13_264_668_187_771_770_619;

    struct Node {
        key: Pubkey,
        endpoint: Pubkey,
        agent: Agent,
    }

    fn node(chain_id: u64) -> Node {
        let endpoint = Pubkey::new_unique();
        Node {
            key: Pubkey::new_unique(),
            endpoint,
            agent: agent(chain_id, endpoint),
        }
    }

    fn request(asset: Pubkey, amount: u64) -> ReserveRequest {
        ReserveRequest {
            asset,
            amount,
            on_behalf_of: Pubkey::default(),
            interest_rate_mode: InterestRateMode::Stable,
            referral_code: 0,
        }
    }

    fn message(
        to: &Node,
        ix: &CrossChainInstruction,
        tokens: Vec<TokenAmount>,
    ) -> InboundMessage {
        let data = ix.encode().unwrap();
        let id = message_id(
            ix.origin_chain,
            &ix.origin_agent,
            to.agent.chain_id,
            &to.key,
            0,
            &data,
        );
        InboundMessage {
            message_id: id,
            source_chain: ix.origin_chain,
            sender: ix.origin_agent,
            nonce: 0,
            data,
            token_amounts: tokens,
        }
    }

    fn plan(
        to: &Node,
        allowlist: &Allowlist,
        reserve: &Reserve,
        message: &InboundMessage,
    ) -> Result<InboundPlan> {
        plan_inbound(&to.agent, &to.key, allowlist, &to.endpoint, reserve, message)
    }

    #[test]
    fn supply_credits_agent_when_on_behalf_of_is_zero() {
        let local = node(SEPOLIA);
        let (mut reserve, _) = funded_reserve(0);
        let mut entry = entry_for(&local.key);
        let mint = reserve.mint;

        let holder = supply(&mut reserve, &mut entry, &local.key, &request(mint, 10)).unwrap();

        assert_eq!(holder, local.key);
        assert_eq!(entry.deposited, 10);
    }

    #[test]
    fn supply_into_someone_elses_entry_is_rejected() {
        let local = node(SEPOLIA);
        let (mut reserve, _) = funded_reserve(0);
        let mut stranger = entry_for(&Pubkey::new_unique());
        let mint = reserve.mint;

        let err = supply(&mut reserve, &mut stranger, &local.key, &request(mint, 10)).unwrap_err();

        assert_agent_error(err, AgentError::HolderMismatch);
        assert!(stranger.is_settled());
        assert_eq!(reserve.liquidity, 0);
    }

    #[test]
    fn supply_of_foreign_asset_is_rejected() {
        let local = node(SEPOLIA);
        let (mut reserve, _) = funded_reserve(0);
        let mut entry = entry_for(&local.key);

        let foreign = request(Pubkey::new_unique(), 10);
        let err = supply(&mut reserve, &mut entry, &local.key, &foreign).unwrap_err();

        assert_agent_error(err, AgentError::AssetMismatch);
        assert_eq!(reserve.liquidity, 0);
    }

    #[test]
    fn beneficiary_withdraws_their_own_supply() {
        let local = node(SEPOLIA);
        let (mut reserve, _) = funded_reserve(0);
        let user = Pubkey::new_unique();
        let mut entry = entry_for(&user);
        let mut req = request(reserve.mint, 700);
        req.on_behalf_of = user;
        supply(&mut reserve, &mut entry, &local.key, &req).unwrap();

        for outsider in [local.agent.owner, Pubkey::new_unique()] {
            let err = withdraw(&local.agent, &local.key, &mut reserve, &mut entry, &outsider, 1)
                .unwrap_err();
            assert_agent_error(err, AgentError::Unauthorized);
        }

        withdraw(&local.agent, &local.key, &mut reserve, &mut entry, &user, 700).unwrap();
        assert!(entry.is_settled());
        assert_eq!(reserve.liquidity, 0);
    }

    #[test]
    fn owner_withdraws_the_agents_own_supply() {
        let local = node(SEPOLIA);
        let (mut reserve, _) = funded_reserve(0);
        let mut entry = entry_for(&local.key);
        let mint = reserve.mint;
        supply(&mut reserve, &mut entry, &local.key, &request(mint, 50)).unwrap();

        let owner = local.agent.owner;
        withdraw(&local.agent, &local.key, &mut reserve, &mut entry, &owner, 20).unwrap();

        assert_eq!(entry.deposited, 30);
        assert_eq!(reserve.liquidity, 30);
    }

    #[test]
    fn borrow_to_chain_books_debt_and_attaches_tokens() {
        let local = node(SEPOLIA);
        let (mut reserve, _) = funded_reserve(10_000);
        let mut entry = entry_for(&local.key);
        let mint = reserve.mint;

        let req = request(mint, 1_000);
        let (ix, holder, token) =
            borrow_to_chain(&local.agent, &local.key, &mut reserve, &mut entry, &req).unwrap();

        assert_eq!(ix.action, ActionKind::BorrowFulfill);
        assert_eq!(ix.origin_agent, local.key);
        assert_eq!(ix.origin_chain, SEPOLIA);
        assert_eq!(holder, local.key);
        assert_eq!(token.amount, 1_000);
        assert_eq!(reserve.liquidity, 9_000);
        assert_eq!(entry.borrowed, 1_000);
    }

    #[test]
    fn repay_to_chain_is_denominated_in_remote_asset() {
        let local = node(BSC_TESTNET);
        let local_mint = Pubkey::new_unique();
        let remote_mint = Pubkey::new_unique();
        let req = request(local_mint, 400);

        let (ix, token) =
            repay_to_chain(&local.agent, &local.key, &local_mint, &req, &remote_mint).unwrap();

        assert_eq!(ix.action, ActionKind::Repay);
        assert_eq!(ix.reserve.asset, remote_mint);
        assert_eq!(token.mint, local_mint);
    }

    #[test]
    fn repay_to_chain_with_assets_swapped_is_rejected() {
        let local = node(BSC_TESTNET);
        let local_mint = Pubkey::new_unique();
        let remote_mint = Pubkey::new_unique();
        let req = request(remote_mint, 400);

        let err =
            repay_to_chain(&local.agent, &local.key, &local_mint, &req, &local_mint).unwrap_err();

        assert_agent_error(err, AgentError::AssetMismatch);
    }

    #[test]
    fn unlisted_origin_is_rejected_before_any_effect() {
        let origin = node(SEPOLIA);
        let receiver = node(BSC_TESTNET);
        let (reserve, _) = funded_reserve(0);
        let mint = reserve.mint;

        let ix = CrossChainInstruction {
            action: ActionKind::BorrowFulfill,
            reserve: request(Pubkey::new_unique(), 1_000),
            origin_agent: origin.key,
            origin_chain: SEPOLIA,
        };
        let msg = message(&receiver, &ix, vec![TokenAmount { mint, amount: 1_000 }]);
        let allowlist = allowlist_with(SEPOLIA, Pubkey::new_unique());

        let err = plan(&receiver, &allowlist, &reserve, &msg).unwrap_err();

        assert_agent_error(err, AgentError::UnauthorizedOrigin);
        assert_eq!(reserve.liquidity, 0);
    }

    #[test]
    fn non_bridge_caller_is_unauthorized_whatever_the_payload() {
        let receiver = node(BSC_TESTNET);
        let (reserve, _) = funded_reserve(0);
        let origin = node(SEPOLIA);
        let allowlist = allowlist_with(SEPOLIA, origin.key);

        let valid = CrossChainInstruction {
            action: ActionKind::BorrowRequest,
            reserve: request(reserve.mint, 1),
            origin_agent: origin.key,
            origin_chain: SEPOLIA,
        };
        let mut garbage = message(&receiver, &valid, vec![]);
        garbage.data = vec![1, 2, 3];

        for msg in [message(&receiver, &valid, vec![]), garbage] {
            let err = plan_inbound(
                &receiver.agent,
                &receiver.key,
                &allowlist,
                &Pubkey::new_unique(),
                &reserve,
                &msg,
            )
            .unwrap_err();
            assert_agent_error(err, AgentError::Unauthorized);
        }
    }

    #[test]
    fn borrow_request_moves_no_funds() {
        let receiver = node(BSC_TESTNET);
        let (mut reserve, mut lender) = funded_reserve(5_000);
        let origin = node(SEPOLIA);
        let allowlist = allowlist_with(SEPOLIA, origin.key);
        let mint = reserve.mint;

        let ix = borrow_from_chain(&origin.agent, &origin.key, &request(mint, 30)).unwrap();
        let plan = plan(&receiver, &allowlist, &reserve, &message(&receiver, &ix, vec![])).unwrap();
        apply_inbound(&mut reserve, &mut lender, &plan).unwrap();

        assert!(matches!(plan.effect, InboundEffect::BorrowRequested { .. }));
        assert_eq!(reserve.liquidity, 5_000);
        assert_eq!(lender.deposited, 5_000);
    }

    #[test]
    fn fulfill_credits_beneficiary_with_delivered_amount() {
        let receiver = node(BSC_TESTNET);
        let (mut reserve, _) = funded_reserve(0);
        let origin = node(SEPOLIA);
        let allowlist = allowlist_with(SEPOLIA, origin.key);
        let user = Pubkey::new_unique();
        let mint = reserve.mint;

        let mut req = request(Pubkey::new_unique(), 1_000);
        req.on_behalf_of = user;
        let ix = CrossChainInstruction {
            action: ActionKind::BorrowFulfill,
            reserve: req,
            origin_agent: origin.key,
            origin_chain: SEPOLIA,
        };
        let msg = message(&receiver, &ix, vec![TokenAmount { mint, amount: 1_000 }]);
        let plan = plan(&receiver, &allowlist, &reserve, &msg).unwrap();

        let mut agents_entry = entry_for(&receiver.key);
        assert_agent_error(
            apply_inbound(&mut reserve, &mut agents_entry, &plan).unwrap_err(),
            AgentError::HolderMismatch,
        );

        let mut users_entry = entry_for(&user);
        apply_inbound(&mut reserve, &mut users_entry, &plan).unwrap();
        assert_eq!(users_entry.deposited, 1_000);
        assert!(agents_entry.is_settled());
        assert_eq!(reserve.liquidity, 1_000);
    }

    #[test]
    fn fulfill_after_many_small_supplies_still_lands() {
        let receiver = node(BSC_TESTNET);
        let (mut reserve, _) = funded_reserve(0);
        let origin = node(SEPOLIA);
        let allowlist = allowlist_with(SEPOLIA, origin.key);
        let mint = reserve.mint;

        for _ in 0..32 {
            let stranger = Pubkey::new_unique();
            let mut entry = entry_for(&stranger);
            let mut req = request(mint, 1);
            req.on_behalf_of = stranger;
            supply(&mut reserve, &mut entry, &receiver.key, &req).unwrap();
        }

        let ix = CrossChainInstruction {
            action: ActionKind::BorrowFulfill,
            reserve: request(Pubkey::new_unique(), 1_000),
            origin_agent: origin.key,
            origin_chain: SEPOLIA,
        };
        let msg = message(&receiver, &ix, vec![TokenAmount { mint, amount: 1_000 }]);
        let plan = plan(&receiver, &allowlist, &reserve, &msg).unwrap();
        let mut entry = entry_for(&receiver.key);
        apply_inbound(&mut reserve, &mut entry, &plan).unwrap();

        assert_eq!(entry.deposited, 1_000);
        assert_eq!(reserve.liquidity, 1_032);
    }

    #[test]
    fn repay_in_wrong_denomination_is_rejected() {
        let receiver = node(BSC_TESTNET);
        let (mut reserve, _) = funded_reserve(1_000);
        let mut debtor = entry_for(&receiver.key);
        reserve.borrow(&mut debtor, 500).unwrap();
        let origin = node(SEPOLIA);
        let allowlist = allowlist_with(SEPOLIA, origin.key);
        let mint = reserve.mint;

        // Sender forgot to re-denominate: asset is still its local mint.
        let ix = CrossChainInstruction {
            action: ActionKind::Repay,
            reserve: request(Pubkey::new_unique(), 100),
            origin_agent: origin.key,
            origin_chain: SEPOLIA,
        };
        let msg = message(&receiver, &ix, vec![TokenAmount { mint, amount: 100 }]);

        let err = plan(&receiver, &allowlist, &reserve, &msg).unwrap_err();

        assert_agent_error(err, AgentError::AssetMismatch);
        assert_eq!(debtor.borrowed, 500);
    }
}
