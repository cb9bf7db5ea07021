//! Program errors.

use anchor_lang::prelude::*;

#[error_code]
pub enum AgentError {
    #[msg("Insufficient available liquidity in reserve")]
    InsufficientLiquidity,

    #[msg("Fee payment is below the quoted bridge fee")]
    InsufficientFee,

    #[msg("Unauthorized: owner or bridge endpoint required")]
    Unauthorized,

    #[msg("Message origin (chain, agent) is not allow-listed")]
    UnauthorizedOrigin,

    #[msg("Token transfer rejected by the token program")]
    TransferFailed,

    #[msg("Allowlist batch lists differ in length")]
    LengthMismatch,

    #[msg("Holder deposit balance is too low")]
    InsufficientBalance,

    #[msg("Repay amount exceeds outstanding debt")]
    RepayExceedsDebt,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Ledger entry belongs to another holder")]
    HolderMismatch,

    #[msg("Allowlist has no room for another entry")]
    AllowlistFull,

    #[msg("Message payload is not a valid instruction")]
    MalformedInstruction,

    #[msg("Instruction origin does not match the bridge envelope")]
    OriginMismatch,

    #[msg("Message id does not match the delivered envelope")]
    MessageIdMismatch,

    #[msg("Asset does not match the reserve mint")]
    AssetMismatch,

    #[msg("Instruction kind does not carry tokens")]
    UnexpectedTokenTransfer,

    #[msg("Instruction kind requires exactly one token transfer")]
    MissingTokenTransfer,

    #[msg("Fee accounts do not match the agent configuration")]
    InvalidFeeAccount,

    #[msg("Token account does not belong to this reserve or bridge")]
    InvalidTokenAccount,

    #[msg("Fee rate must be between 0 and 10000 bps")]
    InvalidFeeRate,

    #[msg("Arithmetic overflow")]
    MathOverflow,
}
