//! Program state accounts for the cross-chain pool.
//!
//! One `Pool` per chain-local instance of the fund. Value moved between
//! instances is tracked in a signed virtual ledger rather than minted or
//! burned, so each instance's per-share value (NAV) survives transit.

use anchor_lang::prelude::*;

use crate::message::OperationType;

/// Upper bound on distinct token holdings a pool can register.
pub const MAX_HOLDINGS: usize = 16;

/// Global protocol config. Single instance per program.
/// Holds admin and bridge transport authority for access control.
#[account]
#[derive(Default)]
pub struct Config {
    /// Authority that can register tokens/oracles, pause pools, and apply
    /// the logged ledger override.
    pub admin: Pubkey,
    /// The recognized bridge transport. Sole caller of `handle_incoming`
    /// and the relay-batch instructions; custodian of outgoing value.
    pub bridge: Pubkey,
    /// Chain id of this deployment, compared against transfer destinations.
    pub local_chain_id: u64,
    /// Protocol-level pause: no deposits, withdrawals, or new intents.
    pub paused: bool,
    /// Bump used to derive the config PDA.
    pub bump: u8,
}

impl Config {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 1 + 1;
}

/// One registered token the pool may hold, with its slice of the virtual
/// ledger. `virtual_balance` is denominated in base-token units and is
/// mutated only by the intent initiator, the message handler, and the
/// logged admin override.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default, Debug, PartialEq)]
pub struct Holding {
    pub mint: Pubkey,
    pub decimals: u8,
    pub virtual_balance: i128,
}

/// In-flight relay batch bookkeeping. While `active`, the pool's
/// user-facing NAV-mutating entry points are locked out; `finalize` compares
/// the observed vault delta against `expected_amount`.
#[derive(AnchorSerialize, AnchorDeserialize, InitSpace, Clone, Copy, Default, Debug)]
pub struct RelayBatch {
    pub active: bool,
    pub mint: Pubkey,
    pub expected_amount: u64,
    pub vault_snapshot: u64,
}

/// Chain-local pool instance.
///
/// `last_nav` is the stored unit value, scaled by `10^decimals`. It is the
/// divisor-free fallback whenever `share supply + virtual_supply` is not
/// positive, and the pricing basis for deposits and redemptions.
#[account]
#[derive(InitSpace, Default)]
pub struct Pool {
    /// Config this pool belongs to (for admin/bridge checks).
    pub config: Pubkey,
    /// The pool's authorized execution context. Intents may only be
    /// initiated from here.
    pub manager: Pubkey,
    /// Base valuation mint. All ledger values are in this token's units.
    pub base_mint: Pubkey,
    /// Share mint. Real supply lives on the mint; minted on deposit,
    /// burned on withdraw.
    pub share_mint: Pubkey,
    /// The pool's base-token vault.
    pub vault: Pubkey,
    /// Base/share precision.
    pub decimals: u8,
    /// Stored NAV per share, scaled by 10^decimals.
    pub last_nav: u64,
    /// Signed offset to the real share supply in NAV division.
    pub virtual_supply: i128,
    /// Lamports held from unwrapped wrapped-native deliveries, valued as
    /// part of the wrapped-native holding.
    pub native_lamports: u64,
    /// Registered holdings and their virtual balances.
    #[max_len(MAX_HOLDINGS)]
    pub holdings: Vec<Holding>,
    /// Relay-batch lock and snapshot.
    pub relay: RelayBatch,
    /// Pool paused: no deposits, withdraws, or new intents.
    pub paused: bool,
    /// PDA bump for this pool.
    pub bump: u8,
}

/// Per-(pool, operation type) refund holding entity. Receives failed or
/// expired transfer refunds from the bridge; `refund_vault` forwards its
/// balance back through the message handler's normal apply path.
///
/// Address is the PDA of `["escrow", pool, operation]` — a pure function of
/// pool and operation type.
#[account]
pub struct Escrow {
    pub pool: Pubkey,
    pub operation: OperationType,
    pub bump: u8,
}

impl Escrow {
    pub const LEN: usize = 8 + 32 + 1 + 1;
}

/// Cross-chain eligibility record. Existence of the PDA is the allow-list
/// membership check for `handle_incoming`'s Transfer branch and for
/// `refund_vault`.
#[account]
#[derive(Default)]
pub struct SupportedToken {
    pub mint: Pubkey,
    pub decimals: u8,
    pub bump: u8,
}

impl SupportedToken {
    pub const LEN: usize = 8 + 32 + 1 + 1;
}

/// Per-mint price mailbox written by the out-of-scope oracle process.
/// `price` is base-token units per one whole token (10^decimals units).
#[account]
#[derive(Default)]
pub struct OraclePrice {
    pub mint: Pubkey,
    pub price: u64,
    pub decimals: u8,
    pub bump: u8,
}

impl OraclePrice {
    pub const LEN: usize = 8 + 32 + 8 + 1 + 1;
}
