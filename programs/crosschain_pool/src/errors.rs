//! Program errors. Explicit codes improve auditability and client handling.

use anchor_lang::prelude::*;

#[error_code]
pub enum PoolError {
    #[msg("Pool or protocol is paused")]
    PoolPaused,

    #[msg("Caller is not the pool's execution context")]
    DirectCallNotAllowed,

    #[msg("Recipient or output token address is null")]
    NullAddress,

    #[msg("Destination chain must differ from the local chain")]
    SameChainTransfer,

    #[msg("Only the configured bridge transport may call this")]
    UnauthorizedCaller,

    #[msg("Unauthorized: admin required")]
    UnauthorizedAdmin,

    #[msg("Token is not eligible for cross-chain transfer")]
    UnsupportedCrossChainToken,

    #[msg("The native pseudo-token cannot be refunded through the escrow")]
    UnsupportedToken,

    #[msg("Source NAV deviates from local NAV beyond the allowed tolerance")]
    NavDeviationExceeded,

    #[msg("Observed balance delta does not match the expected transfer amount")]
    NavManipulationDetected,

    #[msg("Failed to unwrap the wrapped native token")]
    UnwrapFailed,

    #[msg("Decimal rescaling overflowed the representable range")]
    DecimalScalingOverflow,

    #[msg("Delivered amount does not match the amount declared in the message")]
    AmountMismatch,

    #[msg("Message payload could not be decoded")]
    InvalidMessage,

    #[msg("Insufficient liquidity in the pool vault")]
    InsufficientLiquidity,

    #[msg("Arithmetic overflow")]
    MathOverflow,

    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("A relay batch is already in flight for this pool")]
    RelayBatchActive,

    #[msg("No relay batch is in flight for this pool")]
    NoRelayBatch,

    #[msg("Token has no registered holding in this pool")]
    HoldingNotFound,

    #[msg("Pool holding registry is full")]
    HoldingLimitReached,

    #[msg("Oracle account does not match the token")]
    InvalidOracle,

    #[msg("Token account does not belong to the pool")]
    InvalidVault,
}
