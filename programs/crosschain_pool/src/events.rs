//! Events emitted by the cross-chain pool program.
//! Relayers and indexers consume these for cross-chain coordination.

use anchor_lang::prelude::*;

use crate::message::{OperationType, OutboundMessage};

/// An outgoing cross-chain intent. The bridge transport reads the wire
/// record from this event and composes the destination-side message.
#[event]
pub struct TransferInitiated {
    pub pool: Pubkey,
    pub input_mint: Pubkey,
    /// Output token on the destination chain (opaque; 32 bytes).
    pub output_token: [u8; 32],
    /// Recipient on destination chain (opaque; 32 bytes).
    pub recipient: [u8; 32],
    pub input_amount: u64,
    pub output_amount: u64,
    pub destination_chain_id: u64,
    /// Base-token value locked into the virtual ledger (zero for Sync).
    pub value_locked: u128,
    /// The send-side wire record handed to the transport.
    pub message: OutboundMessage,
    /// Source pool NAV and precision, read by the transport for Sync.
    pub source_nav: u64,
    pub source_decimals: u8,
    pub execution_fee: u64,
    pub deadline: i64,
    pub timestamp: i64,
}

/// A Transfer-mode delivery absorbed by the virtual ledger.
#[event]
pub struct TransferReceived {
    pub pool: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    /// Base-token value of the delivery at the local oracle rate.
    pub value: u128,
    pub source_chain_id: u64,
    pub virtual_balance_after: i128,
    pub virtual_supply_after: i128,
    pub timestamp: i64,
}

/// A Sync-mode delivery applied as an ordinary deposit.
#[event]
pub struct SyncReceived {
    pub pool: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub source_chain_id: u64,
    /// Source NAV normalized to local precision.
    pub source_nav: u64,
    pub local_nav: u64,
    pub nav_tolerance_bps: u16,
    pub timestamp: i64,
}

/// An escrow balance forwarded back into the pool.
#[event]
pub struct VaultRefunded {
    pub pool: Pubkey,
    pub escrow: Pubkey,
    pub mint: Pubkey,
    pub amount: u64,
    pub operation: OperationType,
    pub timestamp: i64,
}

/// The pool was re-valued and its stored NAV updated.
#[event]
pub struct NavUpdated {
    pub pool: Pubkey,
    pub total_value: u128,
    pub effective_supply: i128,
    pub nav: u64,
    pub timestamp: i64,
}

/// A relay batch passed (and cleared) the manipulation check.
#[event]
pub struct RelayBatchFinalized {
    pub pool: Pubkey,
    pub mint: Pubkey,
    pub expected_amount: u64,
    pub observed_amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct Deposited {
    pub pool: Pubkey,
    pub depositor: Pubkey,
    pub amount: u64,
    pub shares_minted: u64,
    pub timestamp: i64,
}

#[event]
pub struct Withdrawn {
    pub pool: Pubkey,
    pub withdrawer: Pubkey,
    pub amount: u64,
    pub shares_burned: u64,
    pub timestamp: i64,
}

/// Administrative ledger override. Bypasses the economic invariant, so the
/// full adjustment is logged for off-chain audit.
#[event]
pub struct VirtualLedgerAdjusted {
    pub pool: Pubkey,
    pub mint: Pubkey,
    pub delta_balance: i128,
    pub delta_supply: i128,
    pub authority: Pubkey,
    pub timestamp: i64,
}
