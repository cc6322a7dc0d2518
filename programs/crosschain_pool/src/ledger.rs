//! The virtual-balance ledger and NAV arithmetic.
//!
//! The ledger is the single owned mutation surface for cross-chain value
//! accounting: signed per-holding balances plus one signed supply offset,
//! all in base-token units. Adjustments are applied in the same instruction
//! as the token movement they represent, never ahead of or behind it.

use anchor_lang::prelude::*;
use anchor_spl::token::spl_token::native_mint;
use anchor_spl::token::TokenAccount;

use crate::errors::PoolError;
use crate::state::{Holding, OraclePrice, Pool, MAX_HOLDINGS};

/// `a * b / denominator` in u128, erroring on overflow or a zero divisor.
pub fn mul_div(a: u128, b: u128, denominator: u128) -> Result<u128> {
    a.checked_mul(b)
        .and_then(|p| p.checked_div(denominator))
        .ok_or(error!(PoolError::MathOverflow))
}

pub fn pow10(decimals: u8) -> Result<u128> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or(error!(PoolError::MathOverflow))
}

/// Base-token value of `amount` of a token at the oracle rate.
pub fn token_value(amount: u64, oracle: &OraclePrice) -> Result<u128> {
    mul_div(amount as u128, oracle.price as u128, pow10(oracle.decimals)?)
}

impl Pool {
    /// NAV scaling unit, `10^decimals`.
    pub fn unit(&self) -> Result<u128> {
        pow10(self.decimals)
    }

    pub fn holding(&self, mint: &Pubkey) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.mint == *mint)
    }

    fn holding_mut(&mut self, mint: &Pubkey) -> Result<&mut Holding> {
        self.holdings
            .iter_mut()
            .find(|h| h.mint == *mint)
            .ok_or(error!(PoolError::HoldingNotFound))
    }

    /// Register a holding slot for `mint` if not already present.
    pub fn ensure_holding(&mut self, mint: Pubkey, decimals: u8) -> Result<()> {
        if self.holding(&mint).is_some() {
            return Ok(());
        }
        require!(self.holdings.len() < MAX_HOLDINGS, PoolError::HoldingLimitReached);
        self.holdings.push(Holding {
            mint,
            decimals,
            virtual_balance: 0,
        });
        Ok(())
    }

    /// Apply a signed delta to a holding's virtual balance. Returns the
    /// new balance.
    pub fn adjust_virtual_balance(&mut self, mint: &Pubkey, delta: i128) -> Result<i128> {
        let holding = self.holding_mut(mint)?;
        holding.virtual_balance = holding
            .virtual_balance
            .checked_add(delta)
            .ok_or(PoolError::MathOverflow)?;
        Ok(holding.virtual_balance)
    }

    /// Apply a signed delta to the virtual supply. Returns the new value.
    pub fn adjust_virtual_supply(&mut self, delta: i128) -> Result<i128> {
        self.virtual_supply = self
            .virtual_supply
            .checked_add(delta)
            .ok_or(PoolError::MathOverflow)?;
        Ok(self.virtual_supply)
    }

    pub fn virtual_balance_total(&self) -> Result<i128> {
        let mut total: i128 = 0;
        for holding in &self.holdings {
            total = total
                .checked_add(holding.virtual_balance)
                .ok_or(PoolError::MathOverflow)?;
        }
        Ok(total)
    }

    /// `real_supply + virtual_supply`, saturating at the i128 bounds.
    pub fn effective_supply(&self, real_supply: u64) -> i128 {
        (real_supply as i128).saturating_add(self.virtual_supply)
    }

    /// NAV per share for the given total value. Falls back to the stored
    /// NAV whenever the effective supply is not positive: the effective
    /// supply is never used as a divisor in that case.
    pub fn nav(&self, total_value: u128, real_supply: u64) -> Result<u64> {
        let effective = self.effective_supply(real_supply);
        if effective <= 0 {
            return Ok(self.last_nav);
        }
        let nav = mul_div(total_value, self.unit()?, effective as u128)?;
        u64::try_from(nav).map_err(|_| error!(PoolError::MathOverflow))
    }

    /// Send-side Transfer accounting: lock in the outgoing value at
    /// today's rate so the source NAV stays insensitive to the asset's
    /// later price action.
    pub fn lock_outbound_value(&mut self, mint: &Pubkey, value: u128) -> Result<i128> {
        let delta = i128::try_from(value).map_err(|_| error!(PoolError::MathOverflow))?;
        self.adjust_virtual_balance(mint, delta)
    }

    /// Receive-side Transfer accounting: absorb a delivery worth `value`
    /// base units so NAV is unaffected at the moment of transit.
    ///
    /// A pool with no positive effective supply (a fresh chain-local
    /// instance) cannot offset value against a divisor it does not have;
    /// there the supply side of the ledger absorbs the delivery instead,
    /// priced at the stored NAV, which keeps NAV defined at receipt and
    /// lets it track the received asset afterwards.
    pub fn absorb_inbound_value(
        &mut self,
        mint: &Pubkey,
        value: u128,
        real_supply: u64,
    ) -> Result<()> {
        if self.effective_supply(real_supply) > 0 {
            let delta = i128::try_from(value).map_err(|_| error!(PoolError::MathOverflow))?;
            self.adjust_virtual_balance(mint, delta.checked_neg().ok_or(PoolError::MathOverflow)?)?;
        } else {
            let shares = mul_div(value, self.unit()?, self.last_nav as u128)?;
            let delta = i128::try_from(shares).map_err(|_| error!(PoolError::MathOverflow))?;
            self.adjust_virtual_supply(delta)?;
        }
        Ok(())
    }
}

/// Sum the pool's physical holdings at oracle rates plus its signed virtual
/// balances, clamped at zero.
///
/// `accounts` must carry, for each registered holding in order, the pool's
/// token account for that mint followed by the mint's oracle price account.
pub fn total_pool_value<'info>(
    pool: &Pool,
    pool_key: &Pubkey,
    accounts: &'info [AccountInfo<'info>],
) -> Result<u128> {
    require!(
        accounts.len() >= pool.holdings.len() * 2,
        PoolError::InvalidVault
    );
    let mut physical: u128 = 0;
    for (i, holding) in pool.holdings.iter().enumerate() {
        let vault: Account<TokenAccount> = Account::try_from(&accounts[i * 2])?;
        let oracle: Account<OraclePrice> = Account::try_from(&accounts[i * 2 + 1])?;
        require!(vault.mint == holding.mint, PoolError::InvalidVault);
        require!(vault.owner == *pool_key, PoolError::InvalidVault);
        require!(oracle.mint == holding.mint, PoolError::InvalidOracle);

        let mut balance = vault.amount as u128;
        if holding.mint == native_mint::ID {
            // Unwrapped lamports count toward the wrapped-native holding.
            balance = balance
                .checked_add(pool.native_lamports as u128)
                .ok_or(PoolError::MathOverflow)?;
        }
        let value = mul_div(balance, oracle.price as u128, pow10(holding.decimals)?)?;
        physical = physical.checked_add(value).ok_or(PoolError::MathOverflow)?;
    }

    let total = i128::try_from(physical)
        .map_err(|_| error!(PoolError::MathOverflow))?
        .checked_add(pool.virtual_balance_total()?)
        .ok_or(PoolError::MathOverflow)?;
    Ok(total.max(0) as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: u64 = 1_000_000; // 6 decimals

    fn test_pool() -> Pool {
        let mut pool = Pool::default();
        pool.decimals = 6;
        pool.last_nav = UNIT; // 1.0
        pool.ensure_holding(Pubkey::new_unique(), 6).unwrap();
        pool
    }

    #[test]
    fn mul_div_basics() {
        assert_eq!(mul_div(10, 3, 2).unwrap(), 15);
        assert!(mul_div(u128::MAX, 2, 1).is_err());
        assert!(mul_div(1, 1, 0).is_err());
    }

    #[test]
    fn adjust_requires_registered_holding() {
        let mut pool = test_pool();
        let unknown = Pubkey::new_unique();
        assert!(pool.adjust_virtual_balance(&unknown, 1).is_err());
    }

    #[test]
    fn holding_registry_caps_out() {
        let mut pool = test_pool();
        for _ in 1..MAX_HOLDINGS {
            pool.ensure_holding(Pubkey::new_unique(), 6).unwrap();
        }
        assert!(pool.ensure_holding(Pubkey::new_unique(), 6).is_err());
        // Re-registering an existing mint is a no-op, not a failure.
        let existing = pool.holdings[0].mint;
        pool.ensure_holding(existing, 6).unwrap();
    }

    #[test]
    fn nav_falls_back_when_effective_supply_not_positive() {
        let mut pool = test_pool();
        pool.last_nav = 3 * UNIT;
        // Zero real shares, zero virtual supply.
        assert_eq!(pool.nav(999 * UNIT as u128, 0).unwrap(), 3 * UNIT);
        // Negative effective supply.
        pool.virtual_supply = -10;
        assert_eq!(pool.nav(999 * UNIT as u128, 5).unwrap(), 3 * UNIT);
    }

    #[test]
    fn nav_divides_effective_supply() {
        let mut pool = test_pool();
        // 150 value units over 100 real + 50 virtual shares = 1.0.
        pool.virtual_supply = 50 * UNIT as i128;
        let nav = pool
            .nav(150 * UNIT as u128, 100 * UNIT)
            .unwrap();
        assert_eq!(nav, UNIT);
    }

    #[test]
    fn outbound_lock_is_nav_neutral() {
        let mut pool = test_pool();
        let mint = pool.holdings[0].mint;
        let real_supply = 100 * UNIT;
        let physical_before = 100 * UNIT as u128;
        let nav_before = pool
            .nav(physical_before, real_supply)
            .unwrap();

        // Send 40 units of value: physical drops, ledger locks it in.
        let sent = 40 * UNIT as u128;
        pool.lock_outbound_value(&mint, sent).unwrap();
        let total_after =
            (physical_before - sent) + pool.virtual_balance_total().unwrap() as u128;
        assert_eq!(pool.nav(total_after, real_supply).unwrap(), nav_before);
    }

    #[test]
    fn inbound_absorb_is_nav_neutral() {
        let mut pool = test_pool();
        let mint = pool.holdings[0].mint;
        let real_supply = 100 * UNIT;
        let physical_before = 100 * UNIT as u128;
        let nav_before = pool.nav(physical_before, real_supply).unwrap();

        let delivered = 25 * UNIT as u128;
        pool.absorb_inbound_value(&mint, delivered, real_supply)
            .unwrap();
        assert_eq!(pool.holdings[0].virtual_balance, -(delivered as i128));
        let total_after = (physical_before + delivered)
            .checked_add_signed(pool.virtual_balance_total().unwrap())
            .unwrap();
        assert_eq!(pool.nav(total_after, real_supply).unwrap(), nav_before);
    }

    #[test]
    fn send_receive_pair_nets_to_zero() {
        let mut source = test_pool();
        let mut destination = test_pool();
        let source_mint = source.holdings[0].mint;
        let dest_mint = destination.holdings[0].mint;
        let value = 1_000 * UNIT as u128;

        source.lock_outbound_value(&source_mint, value).unwrap();
        destination
            .absorb_inbound_value(&dest_mint, value, 50 * UNIT)
            .unwrap();

        let net = source.virtual_balance_total().unwrap()
            + destination.virtual_balance_total().unwrap();
        assert_eq!(net, 0);
    }

    #[test]
    fn fresh_instance_receives_via_virtual_supply() {
        let mut pool = test_pool();
        pool.last_nav = 2 * UNIT; // 2.0 per share
        let mint = pool.holdings[0].mint;

        // No real shares: the supply side absorbs the delivery.
        let delivered = 100 * UNIT as u128;
        pool.absorb_inbound_value(&mint, delivered, 0).unwrap();
        assert_eq!(pool.holdings[0].virtual_balance, 0);
        assert_eq!(pool.virtual_supply, 50 * UNIT as i128);

        // Neutral at receipt...
        assert_eq!(pool.nav(delivered, 0).unwrap(), 2 * UNIT);
        // ...and a later price move of the received asset shows up in NAV.
        let appreciated = delivered + delivered * 64 / 100;
        assert!(pool.nav(appreciated, 0).unwrap() > 2 * UNIT);
    }

    #[test]
    fn custody_chain_realizes_price_moves() {
        // Source sends one unit of a non-base asset worth 100; the asset
        // then appreciates 64% before either side recomputes NAV.
        let mut source = test_pool();
        let mut destination = test_pool();
        let asset = Pubkey::new_unique();
        source.ensure_holding(asset, 6).unwrap();
        destination.ensure_holding(asset, 6).unwrap();
        let real_supply = 1_000 * UNIT;
        let sent_value = 100 * UNIT as u128;

        source.lock_outbound_value(&asset, sent_value).unwrap();
        destination
            .absorb_inbound_value(&asset, sent_value, real_supply)
            .unwrap();

        // Source: physical dropped by the locked value, ledger holds it at
        // the send-time rate. A later price move changes nothing at all.
        let source_physical = 1_000 * UNIT as u128 - sent_value;
        let source_total = source_physical
            .checked_add_signed(source.virtual_balance_total().unwrap())
            .unwrap();
        let source_nav = source.nav(source_total, real_supply).unwrap();
        assert_eq!(source_nav, UNIT);

        // Destination: custody of the appreciated asset, offset by the
        // fixed negative ledger entry. NAV rises by the appreciation's
        // share of pool value, and only by that.
        let appreciated = sent_value + sent_value * 64 / 100;
        let dest_total = (1_000 * UNIT as u128 + appreciated)
            .checked_add_signed(destination.virtual_balance_total().unwrap())
            .unwrap();
        let dest_nav = destination.nav(dest_total, real_supply).unwrap();
        assert!(dest_nav > UNIT);
        assert_eq!(dest_total, (1_000 * UNIT as u128) + sent_value * 64 / 100);
    }

    #[test]
    fn refund_unwinds_the_send_leg() {
        let mut pool = test_pool();
        let mint = pool.holdings[0].mint;
        let real_supply = 100 * UNIT;
        let value = 100 * UNIT as u128;

        pool.lock_outbound_value(&mint, value).unwrap();
        assert_eq!(pool.holdings[0].virtual_balance, value as i128);
        // The refund re-enters through the same absorb path.
        pool.absorb_inbound_value(&mint, value, real_supply).unwrap();
        assert_eq!(pool.holdings[0].virtual_balance, 0);
    }
}
