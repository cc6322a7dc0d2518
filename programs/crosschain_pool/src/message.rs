//! Wire records carried by the bridge transport, plus decimal normalization.
//!
//! A message exists only for the duration of one cross-chain hop. The send
//! side emits the lighter `OutboundMessage`; the transport composes the full
//! `InboundMessage` for the destination from it plus source-pool state, so
//! the destination leg never queries the source chain live.

use anchor_lang::prelude::*;

use crate::errors::PoolError;

/// Basis-point denominator for NAV tolerance comparisons.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// The two cross-chain operation kinds.
///
/// Transfer moves value without moving NAV on either chain at the moment of
/// transit: the virtual ledger absorbs the transferred value. Sync is allowed
/// to move NAV on both chains, gated by an explicit tolerance check.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperationType {
    Transfer,
    Sync,
}

/// Relayer/timing parameters passed through to the transport unmodified.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct RelayParams {
    /// Fee paid to the relayer executing the destination leg, in native units.
    pub execution_fee: u64,
    /// Unix timestamp after which the transport may expire the transfer.
    pub deadline: i64,
}

/// Send-side record embedded in the intent handed to the bridge transport.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug)]
pub struct OutboundMessage {
    pub operation: OperationType,
    pub nav_tolerance_bps: u16,
    pub should_unwrap_on_destination: bool,
    /// Native value accompanying the send (relayer execution fee).
    pub source_native_amount: u64,
}

/// Receive-side record decoded by `handle_incoming`.
///
/// Composed by the transport from the outbound record plus source-pool
/// state. `source_nav` is only meaningful for Sync; the Transfer branch
/// never reads it.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Debug)]
pub struct InboundMessage {
    pub operation: OperationType,
    pub source_chain_id: u64,
    pub source_nav: u64,
    pub source_decimals: u8,
    pub nav_tolerance_bps: u16,
    pub should_unwrap_native: bool,
    /// Amount in source-chain precision; cross-checked against delivery.
    pub source_amount: u64,
}

impl InboundMessage {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Self::try_from_slice(payload).map_err(|_| error!(PoolError::InvalidMessage))
    }
}

/// Rescale `value` from `from` decimals to `to` decimals.
///
/// Up-scaling is checked; down-scaling divides, rounding toward zero. The
/// dropped remainder is strictly less than one destination-side unit.
pub fn scale_decimals(value: u128, from: u8, to: u8) -> Result<u128> {
    if from == to {
        return Ok(value);
    }
    if to > from {
        let factor = 10u128
            .checked_pow((to - from) as u32)
            .ok_or(PoolError::DecimalScalingOverflow)?;
        return value
            .checked_mul(factor)
            .ok_or(error!(PoolError::DecimalScalingOverflow));
    }
    let factor = 10u128
        .checked_pow((from - to) as u32)
        .ok_or(PoolError::DecimalScalingOverflow)?;
    Ok(value / factor)
}

/// Relative-deviation check: `|source - local| / local <= tolerance_bps / 10000`,
/// evaluated in multiplied form so a zero divisor never occurs.
pub fn nav_within_tolerance(source_nav: u64, local_nav: u64, tolerance_bps: u16) -> bool {
    let source = source_nav as u128;
    let local = local_nav as u128;
    let deviation = source.abs_diff(local);
    deviation * BPS_DENOMINATOR <= tolerance_bps as u128 * local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_identity() {
        assert_eq!(scale_decimals(1_234, 6, 6).unwrap(), 1_234);
    }

    #[test]
    fn scale_up_and_down() {
        assert_eq!(scale_decimals(5, 6, 9).unwrap(), 5_000);
        assert_eq!(scale_decimals(5_000, 9, 6).unwrap(), 5);
        // Down-scaling rounds toward zero.
        assert_eq!(scale_decimals(5_999, 9, 6).unwrap(), 5);
    }

    #[test]
    fn scale_up_overflow() {
        assert!(scale_decimals(u128::MAX / 10, 0, 6).is_err());
    }

    #[test]
    fn tolerance_boundary() {
        // 1% deviation against 100 bps: exactly at the limit passes.
        assert!(nav_within_tolerance(1_010_000, 1_000_000, 100));
        assert!(!nav_within_tolerance(1_010_001, 1_000_000, 100));
        // Symmetric on the low side.
        assert!(nav_within_tolerance(990_000, 1_000_000, 100));
        assert!(!nav_within_tolerance(989_999, 1_000_000, 100));
    }

    #[test]
    fn tolerance_zero_local_nav() {
        assert!(!nav_within_tolerance(1, 0, 10_000));
        assert!(nav_within_tolerance(0, 0, 0));
    }

    #[test]
    fn inbound_decode_rejects_garbage() {
        assert!(InboundMessage::decode(&[0xff; 4]).is_err());
        // Trailing bytes after a well-formed record are also rejected.
        let msg = InboundMessage {
            operation: OperationType::Sync,
            source_chain_id: 1,
            source_nav: 1_000_000,
            source_decimals: 6,
            nav_tolerance_bps: 50,
            should_unwrap_native: false,
            source_amount: 42,
        };
        let mut bytes = msg.try_to_vec().unwrap();
        assert_eq!(InboundMessage::decode(&bytes).unwrap(), msg);
        bytes.push(0);
        assert!(InboundMessage::decode(&bytes).is_err());
    }
}
