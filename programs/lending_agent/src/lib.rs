//! # Cross-Chain Lending Agent Program
//!
//! One agent per chain. A user supplies collateral to the agent's reserve on
//! one chain and borrows or repays on another; the agents talk through an
//! external message bridge they do not implement.
//!
//! ## Protocol
//! - Outbound actions (`borrow_from_chain`, `borrow_to_chain`,
//!   `repay_to_chain`) charge the bridge fee, park attached tokens in the
//!   bridge custody account and emit `MessageSent`. They return a
//!   `DispatchReceipt`; whether the remote side applied the message is
//!   observed on the remote chain, never here.
//! - Inbound messages arrive through `on_receive`, signed by the bridge
//!   endpoint fixed at initialization. The origin (chain, agent) must be on
//!   the allowlist. Each message is self-describing and applied on its own;
//!   delivery order carries no meaning.
//! - A `MessageReceipt` per applied message id rejects duplicate deliveries.
//!   The id is recomputed from the envelope, so a message cannot be
//!   redelivered under a fresh id.
//! - Each holder's balance lives in its own `LedgerEntry` PDA, created on
//!   first credit or debit by whoever pays for that instruction.
//!
//! ## Security
//! - Anchor account validation and constraints
//! - Owner role for allowlist, reserves and outbound borrows
//! - Holder signature for withdrawing a holder's own deposit
//! - Bridge endpoint role for inbound delivery
//! - Reserve vaults owned by reserve PDAs; only this program moves them

pub mod agent;
pub mod allowlist;
pub mod bridge;
pub mod errors;
pub mod events;
pub mod fee;
pub mod ledger;
pub mod message;
pub mod outcome;
pub mod state;

#[cfg(test)]
mod test_utils;

use anchor_lang::prelude::*;
use anchor_lang::system_program;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use agent::InboundEffect;
use errors::*;
use events::*;
use fee::{FeeRoute, TokenBalance, MAX_BPS};
use ledger::LedgerOp;
use message::{CrossChainInstruction, InboundMessage, ReserveRequest, TokenAmount};
use outcome::DispatchReceipt;
use state::{Agent, AgentConfig, Allowlist, LedgerEntry, MessageReceipt, Reserve};

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod lending_agent {
    use super::*;

    /// Create the agent and its empty allowlist. Called once per chain; the
    /// configuration cannot change afterwards.
    pub fn initialize_agent(ctx: Context<InitializeAgent>, config: AgentConfig) -> Result<()> {
        require!(
            config.fee_schedule.token_fee_bps <= MAX_BPS,
            AgentError::InvalidFeeRate
        );

        let agent = &mut ctx.accounts.agent;
        agent.owner = ctx.accounts.owner.key();
        agent.chain_id = config.chain_id;
        agent.bridge_endpoint = config.bridge_endpoint;
        agent.fee_collector = config.fee_collector;
        agent.fee_mint = config.fee_mint;
        agent.fee_schedule = config.fee_schedule;
        agent.next_nonce = 0;
        agent.bump = ctx.bumps.agent;

        let allowlist = &mut ctx.accounts.allowlist;
        allowlist.agent = agent.key();
        allowlist.entries = Vec::new();
        allowlist.bump = ctx.bumps.allowlist;

        emit!(AgentInitialized {
            agent: agent.key(),
            owner: agent.owner,
            chain_id: agent.chain_id,
            bridge_endpoint: agent.bridge_endpoint,
        });

        Ok(())
    }

    /// Open the local pool for one mint. The vault must already exist and be
    /// owned by the reserve PDA.
    pub fn initialize_reserve(ctx: Context<InitializeReserve>) -> Result<()> {
        let reserve = &mut ctx.accounts.reserve;
        reserve.agent = ctx.accounts.agent.key();
        reserve.mint = ctx.accounts.mint.key();
        reserve.vault = ctx.accounts.vault.key();
        reserve.liquidity = 0;
        reserve.bump = ctx.bumps.reserve;

        emit!(ReserveInitialized {
            agent: reserve.agent,
            reserve: reserve.key(),
            mint: reserve.mint,
            vault: reserve.vault,
        });

        Ok(())
    }

    /// Deposit the caller's tokens for `request.on_behalf_of`, or for the
    /// agent when that is the zero key. Purely local. `holder` must be that
    /// beneficiary; its ledger entry is created on first use at the caller's
    /// expense.
    pub fn supply(ctx: Context<Supply>, request: ReserveRequest) -> Result<()> {
        let agent_key = ctx.accounts.agent.key();
        let reserve_key = ctx.accounts.reserve.key();
        ctx.accounts
            .entry
            .open(reserve_key, ctx.accounts.holder.key(), ctx.bumps.entry);

        transfer_tokens(
            &ctx.accounts.token_program,
            &ctx.accounts.user_token,
            &ctx.accounts.vault,
            ctx.accounts.user.to_account_info(),
            None,
            request.amount,
        )?;

        let reserve = &mut ctx.accounts.reserve;
        let holder = agent::supply(reserve, &mut ctx.accounts.entry, &agent_key, &request)?;

        emit!(LedgerMutated {
            reserve: reserve_key,
            holder,
            op: LedgerOp::Deposit,
            amount: request.amount,
            liquidity: reserve.liquidity,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Pay out part of a deposit to a token account of the signer. The
    /// holder signs for their own entry; the owner signs for the agent's.
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        let agent_key = ctx.accounts.agent.key();
        agent::withdraw(
            &ctx.accounts.agent,
            &agent_key,
            &mut ctx.accounts.reserve,
            &mut ctx.accounts.entry,
            &ctx.accounts.signer.key(),
            amount,
        )?;

        let mint = ctx.accounts.reserve.mint;
        let bump = ctx.accounts.reserve.bump;
        let seeds = &[
            Reserve::SEED_PREFIX,
            agent_key.as_ref(),
            mint.as_ref(),
            &[bump],
        ];
        let signer: &[&[&[u8]]] = &[&seeds[..]];
        transfer_tokens(
            &ctx.accounts.token_program,
            &ctx.accounts.vault,
            &ctx.accounts.recipient_token,
            ctx.accounts.reserve.to_account_info(),
            Some(signer),
            amount,
        )?;

        emit!(LedgerMutated {
            reserve: ctx.accounts.reserve.key(),
            holder: ctx.accounts.entry.holder,
            op: LedgerOp::Withdraw,
            amount,
            liquidity: ctx.accounts.reserve.liquidity,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Ask `remote_agent` on `remote_chain` to fund a borrow. Informational:
    /// no tokens travel and nothing changes locally. Owner-only.
    pub fn borrow_from_chain(
        ctx: Context<BorrowFromChain>,
        request: ReserveRequest,
        remote_agent: Pubkey,
        remote_chain: u64,
        fee_payment: u64,
    ) -> Result<DispatchReceipt> {
        let agent_key = ctx.accounts.agent.key();
        let instruction = agent::borrow_from_chain(&ctx.accounts.agent, &agent_key, &request)?;
        let dispatch = bridge::prepare_send(
            &mut ctx.accounts.agent,
            &agent_key,
            remote_chain,
            &remote_agent,
            &instruction,
            None,
            fee_payment,
        )?;

        ctx.accounts.fees.pay(
            &ctx.accounts.agent,
            &ctx.accounts.owner,
            &ctx.accounts.token_program,
            &ctx.accounts.system_program,
            dispatch.fee,
        )?;

        announce(&dispatch, remote_chain, &remote_agent, &instruction)
    }

    /// Borrow from the local reserve and ship the tokens to
    /// `destination_agent`, which deposits them for the beneficiary.
    /// Owner-only. The debt is booked on `holder`'s entry, which must be the
    /// request's beneficiary.
    pub fn borrow_to_chain(
        ctx: Context<BorrowToChain>,
        request: ReserveRequest,
        destination_chain: u64,
        destination_agent: Pubkey,
        fee_payment: u64,
    ) -> Result<DispatchReceipt> {
        let agent_key = ctx.accounts.agent.key();
        let reserve_key = ctx.accounts.reserve.key();
        ctx.accounts
            .entry
            .open(reserve_key, ctx.accounts.holder.key(), ctx.bumps.entry);
        let (instruction, holder, token) = agent::borrow_to_chain(
            &ctx.accounts.agent,
            &agent_key,
            &mut ctx.accounts.reserve,
            &mut ctx.accounts.entry,
            &request,
        )?;
        let dispatch = bridge::prepare_send(
            &mut ctx.accounts.agent,
            &agent_key,
            destination_chain,
            &destination_agent,
            &instruction,
            Some(token),
            fee_payment,
        )?;

        ctx.accounts.fees.pay(
            &ctx.accounts.agent,
            &ctx.accounts.owner,
            &ctx.accounts.token_program,
            &ctx.accounts.system_program,
            dispatch.fee,
        )?;

        let mint = ctx.accounts.reserve.mint;
        let bump = ctx.accounts.reserve.bump;
        let seeds = &[
            Reserve::SEED_PREFIX,
            agent_key.as_ref(),
            mint.as_ref(),
            &[bump],
        ];
        let signer: &[&[&[u8]]] = &[&seeds[..]];
        transfer_tokens(
            &ctx.accounts.token_program,
            &ctx.accounts.vault,
            &ctx.accounts.bridge_custody,
            ctx.accounts.reserve.to_account_info(),
            Some(signer),
            token.amount,
        )?;

        emit!(LedgerMutated {
            reserve: reserve_key,
            holder,
            op: LedgerOp::Borrow,
            amount: token.amount,
            liquidity: ctx.accounts.reserve.liquidity,
            timestamp: Clock::get()?.unix_timestamp,
        });

        announce(&dispatch, destination_chain, &destination_agent, &instruction)
    }

    /// Send the caller's local tokens to `remote_agent` to repay debt held
    /// there. `request.asset` is the local mint of `user_token`;
    /// `remote_asset` is the asset's address on the remote chain, which the
    /// outbound instruction carries. Swapping the two fails with
    /// `AssetMismatch`.
    pub fn repay_to_chain(
        ctx: Context<RepayToChain>,
        request: ReserveRequest,
        remote_agent: Pubkey,
        remote_chain: u64,
        remote_asset: Pubkey,
        fee_payment: u64,
    ) -> Result<DispatchReceipt> {
        let agent_key = ctx.accounts.agent.key();
        let (instruction, token) = agent::repay_to_chain(
            &ctx.accounts.agent,
            &agent_key,
            &ctx.accounts.user_token.mint,
            &request,
            &remote_asset,
        )?;
        let dispatch = bridge::prepare_send(
            &mut ctx.accounts.agent,
            &agent_key,
            remote_chain,
            &remote_agent,
            &instruction,
            Some(token),
            fee_payment,
        )?;

        ctx.accounts.fees.pay(
            &ctx.accounts.agent,
            &ctx.accounts.user,
            &ctx.accounts.token_program,
            &ctx.accounts.system_program,
            dispatch.fee,
        )?;

        transfer_tokens(
            &ctx.accounts.token_program,
            &ctx.accounts.user_token,
            &ctx.accounts.bridge_custody,
            ctx.accounts.user.to_account_info(),
            None,
            token.amount,
        )?;

        announce(&dispatch, remote_chain, &remote_agent, &instruction)
    }

    /// Batch allowlist update: for each chain, pairs the i-th agent with the
    /// i-th flag. Owner-only.
    pub fn set_allowed_borrower(
        ctx: Context<SetAllowedBorrower>,
        chains: Vec<u64>,
        agents: Vec<Vec<Pubkey>>,
        allowed: Vec<Vec<bool>>,
    ) -> Result<()> {
        let allowlist = &mut ctx.accounts.allowlist;
        allowlist.set_allowed(&chains, &agents, &allowed)?;

        emit!(AllowlistUpdated {
            agent: ctx.accounts.agent.key(),
            entries: allowlist.entries.len() as u32,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Bridge fee for a message, returned as instruction return data.
    pub fn quote_fee(
        ctx: Context<QuoteFee>,
        destination_chain: u64,
        instruction: CrossChainInstruction,
        token_amounts: Vec<TokenAmount>,
    ) -> Result<u64> {
        bridge::quote_fee(
            &ctx.accounts.agent,
            destination_chain,
            &instruction,
            &token_amounts,
        )
    }

    /// Bridge callback. Only the configured bridge endpoint may call it, and
    /// only once per message id. `holder` is the beneficiary named in the
    /// payload; its entry is only touched by token-carrying actions.
    pub fn on_receive(ctx: Context<OnReceive>, message: InboundMessage) -> Result<()> {
        let agent_key = ctx.accounts.agent.key();
        let reserve_key = ctx.accounts.reserve.key();
        ctx.accounts
            .entry
            .open(reserve_key, ctx.accounts.holder.key(), ctx.bumps.entry);
        let plan = agent::plan_inbound(
            &ctx.accounts.agent,
            &agent_key,
            &ctx.accounts.allowlist,
            &ctx.accounts.bridge_endpoint.key(),
            &ctx.accounts.reserve,
            &message,
        )?;
        let clock = Clock::get()?;

        match plan.effect {
            InboundEffect::BorrowRequested { request } => {
                emit!(BorrowRequested {
                    message_id: message.message_id,
                    origin_chain: message.source_chain,
                    origin_agent: message.sender,
                    asset: request.asset,
                    amount: request.amount,
                    on_behalf_of: request.on_behalf_of,
                    available_liquidity: ctx.accounts.reserve.liquidity,
                    timestamp: clock.unix_timestamp,
                });
            }
            InboundEffect::Ledger { op, holder, amount } => {
                transfer_tokens(
                    &ctx.accounts.token_program,
                    &ctx.accounts.bridge_custody,
                    &ctx.accounts.vault,
                    ctx.accounts.bridge_endpoint.to_account_info(),
                    None,
                    amount,
                )?;

                let reserve = &mut ctx.accounts.reserve;
                agent::apply_inbound(reserve, &mut ctx.accounts.entry, &plan)?;

                emit!(LedgerMutated {
                    reserve: reserve_key,
                    holder,
                    op,
                    amount,
                    liquidity: reserve.liquidity,
                    timestamp: clock.unix_timestamp,
                });
            }
        }

        let receipt = &mut ctx.accounts.receipt;
        receipt.message_id = message.message_id;
        receipt.source_chain = message.source_chain;
        receipt.sender = message.sender;
        receipt.action = plan.instruction.action;
        receipt.applied_at = clock.unix_timestamp;

        msg!(
            "applied {:?} from chain {}",
            plan.instruction.action,
            message.source_chain
        );
        emit!(InstructionApplied {
            message_id: message.message_id,
            origin_chain: message.source_chain,
            origin_agent: message.sender,
            action: plan.instruction.action,
            timestamp: clock.unix_timestamp,
        });

        Ok(())
    }
}

/// Publish a dispatched message to the relayer.
fn announce(
    dispatch: &bridge::Dispatch,
    destination_chain: u64,
    destination_agent: &Pubkey,
    instruction: &CrossChainInstruction,
) -> Result<DispatchReceipt> {
    emit!(MessageSent {
        message_id: dispatch.message_id,
        destination_chain,
        destination_agent: *destination_agent,
        action: instruction.action,
        asset: instruction.reserve.asset,
        amount: instruction.reserve.amount,
        fee: dispatch.fee,
        nonce: dispatch.nonce,
        data: dispatch.payload.clone(),
        timestamp: Clock::get()?.unix_timestamp,
    });

    Ok(DispatchReceipt {
        message_id: dispatch.message_id,
        nonce: dispatch.nonce,
        fee_paid: dispatch.fee,
    })
}

fn transfer_tokens<'info>(
    token_program: &Program<'info, Token>,
    from: &Account<'info, TokenAccount>,
    to: &Account<'info, TokenAccount>,
    authority: AccountInfo<'info>,
    signer: Option<&[&[&[u8]]]>,
    amount: u64,
) -> Result<()> {
    ledger::check_transfer(from.amount, amount)?;

    let cpi_accounts = Transfer {
        from: from.to_account_info(),
        to: to.to_account_info(),
        authority,
    };
    let cpi_program = token_program.to_account_info();
    let cpi_ctx = match signer {
        Some(signer) => CpiContext::new_with_signer(cpi_program, cpi_accounts, signer),
        None => CpiContext::new(cpi_program, cpi_accounts),
    };
    token::transfer(cpi_ctx, amount).map_err(|_| error!(AgentError::TransferFailed))
}

// --- Account structs and validation ---

/// Bridge fee destination. Lamports go to `fee_collector`; when the agent
/// has a fee mint, the two token accounts are required instead.
#[derive(Accounts)]
pub struct FeePayment<'info> {
    /// CHECK: compared against agent.fee_collector before any transfer
    #[account(mut)]
    pub fee_collector: UncheckedAccount<'info>,

    #[account(mut)]
    pub payer_fee_token: Option<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub collector_fee_token: Option<Account<'info, TokenAccount>>,
}

fn token_balance(account: &Account<'_, TokenAccount>) -> TokenBalance {
    TokenBalance {
        mint: account.mint,
        owner: account.owner,
        amount: account.amount,
    }
}

impl<'info> FeePayment<'info> {
    pub fn pay(
        &self,
        agent: &Agent,
        payer: &Signer<'info>,
        token_program: &Program<'info, Token>,
        system_program: &Program<'info, System>,
        fee: u64,
    ) -> Result<()> {
        let route = fee::route_fee(
            agent,
            &self.fee_collector.key(),
            &payer.key(),
            payer.to_account_info().lamports(),
            self.payer_fee_token.as_ref().map(token_balance),
            self.collector_fee_token.as_ref().map(token_balance),
            fee,
        )?;

        match (route, &self.payer_fee_token, &self.collector_fee_token) {
            (FeeRoute::Waived, _, _) => Ok(()),
            (FeeRoute::Lamports, _, _) => system_program::transfer(
                CpiContext::new(
                    system_program.to_account_info(),
                    system_program::Transfer {
                        from: payer.to_account_info(),
                        to: self.fee_collector.to_account_info(),
                    },
                ),
                fee,
            )
            .map_err(|_| error!(AgentError::InsufficientFee)),
            (FeeRoute::Token, Some(from), Some(to)) => transfer_tokens(
                token_program,
                from,
                to,
                payer.to_account_info(),
                None,
                fee,
            ),
            (FeeRoute::Token, _, _) => err!(AgentError::InvalidFeeAccount),
        }
    }
}

#[derive(Accounts)]
pub struct InitializeAgent<'info> {
    #[account(
        init,
        payer = owner,
        space = 8 + Agent::LEN,
        seeds = [Agent::SEED_PREFIX],
        bump
    )]
    pub agent: Account<'info, Agent>,

    #[account(
        init,
        payer = owner,
        space = 8 + Allowlist::LEN,
        seeds = [Allowlist::SEED_PREFIX, agent.key().as_ref()],
        bump
    )]
    pub allowlist: Account<'info, Allowlist>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct InitializeReserve<'info> {
    #[account(
        seeds = [Agent::SEED_PREFIX],
        bump = agent.bump,
        has_one = owner @ AgentError::Unauthorized
    )]
    pub agent: Account<'info, Agent>,

    #[account(
        init,
        payer = owner,
        space = 8 + Reserve::LEN,
        seeds = [Reserve::SEED_PREFIX, agent.key().as_ref(), mint.key().as_ref()],
        bump
    )]
    pub reserve: Account<'info, Reserve>,

    pub mint: Account<'info, Mint>,

    #[account(
        constraint = vault.mint == mint.key() @ AgentError::InvalidTokenAccount,
        constraint = vault.owner == reserve.key() @ AgentError::InvalidTokenAccount
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Supply<'info> {
    #[account(seeds = [Agent::SEED_PREFIX], bump = agent.bump)]
    pub agent: Account<'info, Agent>,

    #[account(
        mut,
        seeds = [Reserve::SEED_PREFIX, agent.key().as_ref(), reserve.mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Account<'info, Reserve>,

    /// CHECK: beneficiary key only; matched against the request in the handler
    pub holder: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = user,
        space = 8 + LedgerEntry::LEN,
        seeds = [LedgerEntry::SEED_PREFIX, reserve.key().as_ref(), holder.key().as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(
        mut,
        constraint = vault.key() == reserve.vault @ AgentError::InvalidTokenAccount
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token.mint == reserve.mint @ AgentError::AssetMismatch,
        constraint = user_token.owner == user.key() @ AgentError::InvalidTokenAccount
    )]
    pub user_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(seeds = [Agent::SEED_PREFIX], bump = agent.bump)]
    pub agent: Account<'info, Agent>,

    #[account(
        mut,
        seeds = [Reserve::SEED_PREFIX, agent.key().as_ref(), reserve.mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Account<'info, Reserve>,

    #[account(
        mut,
        seeds = [LedgerEntry::SEED_PREFIX, reserve.key().as_ref(), entry.holder.as_ref()],
        bump = entry.bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(
        mut,
        constraint = vault.key() == reserve.vault @ AgentError::InvalidTokenAccount
    )]
    pub vault: Account<'info, TokenAccount>,

    /// The holder, or the agent owner for the agent's own entry.
    pub signer: Signer<'info>,

    #[account(
        mut,
        constraint = recipient_token.mint == reserve.mint @ AgentError::AssetMismatch,
        constraint = recipient_token.owner == signer.key() @ AgentError::InvalidTokenAccount
    )]
    pub recipient_token: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct BorrowFromChain<'info> {
    #[account(
        mut,
        seeds = [Agent::SEED_PREFIX],
        bump = agent.bump,
        has_one = owner @ AgentError::Unauthorized
    )]
    pub agent: Account<'info, Agent>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub fees: FeePayment<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct BorrowToChain<'info> {
    #[account(
        mut,
        seeds = [Agent::SEED_PREFIX],
        bump = agent.bump,
        has_one = owner @ AgentError::Unauthorized
    )]
    pub agent: Account<'info, Agent>,

    #[account(
        mut,
        seeds = [Reserve::SEED_PREFIX, agent.key().as_ref(), reserve.mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Account<'info, Reserve>,

    /// CHECK: beneficiary key only; matched against the request in the handler
    pub holder: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = owner,
        space = 8 + LedgerEntry::LEN,
        seeds = [LedgerEntry::SEED_PREFIX, reserve.key().as_ref(), holder.key().as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(
        mut,
        constraint = vault.key() == reserve.vault @ AgentError::InvalidTokenAccount
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Token account the bridge takes custody from.
    #[account(
        mut,
        constraint = bridge_custody.owner == agent.bridge_endpoint
            @ AgentError::InvalidTokenAccount,
        constraint = bridge_custody.mint == reserve.mint @ AgentError::AssetMismatch
    )]
    pub bridge_custody: Account<'info, TokenAccount>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub fees: FeePayment<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RepayToChain<'info> {
    #[account(mut, seeds = [Agent::SEED_PREFIX], bump = agent.bump)]
    pub agent: Account<'info, Agent>,

    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        mut,
        constraint = user_token.owner == user.key() @ AgentError::InvalidTokenAccount
    )]
    pub user_token: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = bridge_custody.owner == agent.bridge_endpoint
            @ AgentError::InvalidTokenAccount,
        constraint = bridge_custody.mint == user_token.mint @ AgentError::AssetMismatch
    )]
    pub bridge_custody: Account<'info, TokenAccount>,

    pub fees: FeePayment<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetAllowedBorrower<'info> {
    #[account(
        seeds = [Agent::SEED_PREFIX],
        bump = agent.bump,
        has_one = owner @ AgentError::Unauthorized
    )]
    pub agent: Account<'info, Agent>,

    #[account(
        mut,
        seeds = [Allowlist::SEED_PREFIX, agent.key().as_ref()],
        bump = allowlist.bump
    )]
    pub allowlist: Account<'info, Allowlist>,

    pub owner: Signer<'info>,
}

#[derive(Accounts)]
pub struct QuoteFee<'info> {
    #[account(seeds = [Agent::SEED_PREFIX], bump = agent.bump)]
    pub agent: Account<'info, Agent>,
}

#[derive(Accounts)]
#[instruction(message: InboundMessage)]
pub struct OnReceive<'info> {
    #[account(seeds = [Agent::SEED_PREFIX], bump = agent.bump)]
    pub agent: Account<'info, Agent>,

    /// Must be the endpoint fixed at initialization. Checked before the
    /// receipt is created so a foreign caller always sees `Unauthorized`.
    #[account(
        mut,
        constraint = bridge_endpoint.key() == agent.bridge_endpoint @ AgentError::Unauthorized
    )]
    pub bridge_endpoint: Signer<'info>,

    #[account(
        seeds = [Allowlist::SEED_PREFIX, agent.key().as_ref()],
        bump = allowlist.bump
    )]
    pub allowlist: Account<'info, Allowlist>,

    #[account(
        mut,
        seeds = [Reserve::SEED_PREFIX, agent.key().as_ref(), reserve.mint.as_ref()],
        bump = reserve.bump
    )]
    pub reserve: Account<'info, Reserve>,

    /// CHECK: beneficiary key only; matched against the payload in the handler
    pub holder: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = bridge_endpoint,
        space = 8 + LedgerEntry::LEN,
        seeds = [LedgerEntry::SEED_PREFIX, reserve.key().as_ref(), holder.key().as_ref()],
        bump
    )]
    pub entry: Account<'info, LedgerEntry>,

    #[account(
        mut,
        constraint = vault.key() == reserve.vault @ AgentError::InvalidTokenAccount
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = bridge_custody.owner == agent.bridge_endpoint
            @ AgentError::InvalidTokenAccount,
        constraint = bridge_custody.mint == reserve.mint @ AgentError::AssetMismatch
    )]
    pub bridge_custody: Account<'info, TokenAccount>,

    #[account(
        init,
        payer = bridge_endpoint,
        space = 8 + MessageReceipt::LEN,
        seeds = [MessageReceipt::SEED_PREFIX, message.message_id.as_ref()],
        bump
    )]
    pub receipt: Account<'info, MessageReceipt>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}
