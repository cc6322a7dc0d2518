//! # Cross-Chain Pool Program
//!
//! Production Solana program for an investment pool that exists independently
//! on several chains and moves assets between its chain-local instances
//! without corrupting per-share value (NAV). Value in transit is recorded in
//! a signed virtual ledger: the source chain locks in the outgoing value at
//! the current oracle rate, the destination absorbs the delivery, and a
//! completed pair nets toward zero in base-token units. The chain holding
//! physical custody realizes the asset's subsequent gains or losses.
//!
//! ## Security
//! - Anchor account validation and constraints
//! - Role-based access (admin, bridge transport, pool manager)
//! - Escrow refund path shares the handler's apply path, so refunds cannot
//!   desynchronize the ledger
//! - Relay batches are balance-checked on finalize; a mismatch aborts the
//!   whole transaction (`NavManipulationDetected`)
//! - No re-entrancy (single CPI per instruction; relay lock gates user-facing
//!   NAV mutation while a batch is in flight)

pub mod errors;
pub mod events;
pub mod ledger;
pub mod message;
pub mod state;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use anchor_spl::token::{
    self, spl_token::native_mint, Burn, CloseAccount, Mint, MintTo, Token, TokenAccount, Transfer,
};

use errors::PoolError;
use events::*;
use ledger::{mul_div, token_value, total_pool_value};
use message::{
    nav_within_tolerance, scale_decimals, InboundMessage, OperationType, OutboundMessage,
    RelayParams,
};
use state::{Config, Escrow, OraclePrice, Pool, SupportedToken};

declare_id!("XPoo111111111111111111111111111111111111111");

/// Arguments for `initiate_transfer`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct TransferArgs {
    pub operation: OperationType,
    pub input_amount: u64,
    /// Minimum amount expected on the destination chain.
    pub output_amount: u64,
    pub destination_chain_id: u64,
    /// Output token on the destination chain (opaque; 32 bytes).
    pub output_token: [u8; 32],
    /// Recipient on the destination chain (opaque; 32 bytes).
    pub recipient: [u8; 32],
    pub nav_tolerance_bps: u16,
    pub should_unwrap_on_destination: bool,
    /// Timing/relayer parameters, passed through to the transport unmodified.
    pub relay: RelayParams,
}

#[program]
pub mod crosschain_pool {
    use super::*;

    /// Initialize global protocol config. Must be called once before any
    /// pool. Admin manages registries and pauses; the bridge authority is
    /// the only caller accepted by `handle_incoming` and the relay batch
    /// instructions.
    pub fn initialize_config(ctx: Context<InitializeConfig>, local_chain_id: u64) -> Result<()> {
        let config = &mut ctx.accounts.config;
        config.admin = ctx.accounts.admin.key();
        config.bridge = ctx.accounts.bridge.key();
        config.local_chain_id = local_chain_id;
        config.paused = false;
        config.bump = ctx.bumps.config;
        Ok(())
    }

    /// Create a chain-local pool instance for one base valuation mint.
    /// Vault and share mint must exist and be owned by the pool PDA. The
    /// initial NAV prices the first deposits and is the stored fallback
    /// while the pool has no positive effective supply.
    pub fn initialize_pool(ctx: Context<InitializePool>, initial_nav: u64) -> Result<()> {
        require!(initial_nav > 0, PoolError::ZeroAmount);

        let decimals = ctx.accounts.base_mint.decimals;
        let pool = &mut ctx.accounts.pool;
        pool.config = ctx.accounts.config.key();
        pool.manager = ctx.accounts.manager.key();
        pool.base_mint = ctx.accounts.base_mint.key();
        pool.share_mint = ctx.accounts.share_mint.key();
        pool.vault = ctx.accounts.vault.key();
        pool.decimals = decimals;
        pool.last_nav = initial_nav;
        pool.virtual_supply = 0;
        pool.native_lamports = 0;
        pool.holdings = Vec::new();
        pool.relay = Default::default();
        pool.paused = false;
        pool.bump = ctx.bumps.pool;
        pool.ensure_holding(ctx.accounts.base_mint.key(), decimals)?;

        Ok(())
    }

    /// Mark a mint as eligible for cross-chain transfers. Admin-only.
    pub fn add_supported_token(ctx: Context<AddSupportedToken>) -> Result<()> {
        let record = &mut ctx.accounts.supported_token;
        record.mint = ctx.accounts.mint.key();
        record.decimals = ctx.accounts.mint.decimals;
        record.bump = ctx.bumps.supported_token;
        Ok(())
    }

    /// Create the price mailbox for a mint. Admin-only; the out-of-scope
    /// oracle process keeps it current via `set_oracle_price`.
    pub fn register_oracle(ctx: Context<RegisterOracle>, price: u64) -> Result<()> {
        let oracle = &mut ctx.accounts.oracle;
        oracle.mint = ctx.accounts.mint.key();
        oracle.price = price;
        oracle.decimals = ctx.accounts.mint.decimals;
        oracle.bump = ctx.bumps.oracle;
        Ok(())
    }

    /// Update a mint's price (base-token units per whole token). Admin-only.
    pub fn set_oracle_price(ctx: Context<SetOraclePrice>, price: u64) -> Result<()> {
        ctx.accounts.oracle.price = price;
        Ok(())
    }

    /// Instantiate the escrow for `(pool, operation)` on first use. The
    /// address is a pure function of pool and operation type; anyone can
    /// re-derive it, only the manager can instantiate it.
    pub fn create_escrow(ctx: Context<CreateEscrow>, operation: OperationType) -> Result<()> {
        let escrow = &mut ctx.accounts.escrow;
        escrow.pool = ctx.accounts.pool.key();
        escrow.operation = operation;
        escrow.bump = ctx.bumps.escrow;
        Ok(())
    }

    /// Return the deterministic escrow address for this pool and operation
    /// type. Restricted to the pool's execution context; meant for
    /// privileged tooling, not arbitrary callers.
    pub fn resolve_escrow_address(
        ctx: Context<ResolveEscrowAddress>,
        operation: OperationType,
    ) -> Result<Pubkey> {
        let (address, _) = Pubkey::find_program_address(
            &[
                b"escrow",
                ctx.accounts.pool.key().as_ref(),
                &[operation as u8],
            ],
            &crate::ID,
        );
        Ok(address)
    }

    /// Deposit base tokens and receive shares priced at the stored NAV.
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        let pool = &ctx.accounts.pool;
        require!(!ctx.accounts.config.paused, PoolError::PoolPaused);
        require!(!pool.paused, PoolError::PoolPaused);
        require!(!pool.relay.active, PoolError::RelayBatchActive);
        require!(amount > 0, PoolError::ZeroAmount);

        let shares = mul_div(amount as u128, pool.unit()?, pool.last_nav as u128)?;
        let shares = u64::try_from(shares).map_err(|_| error!(PoolError::MathOverflow))?;
        require!(shares > 0, PoolError::ZeroAmount);

        // Pull base tokens from the depositor into the vault.
        token::transfer(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.depositor_base_account.to_account_info(),
                    to: ctx.accounts.vault.to_account_info(),
                    authority: ctx.accounts.depositor.to_account_info(),
                },
            ),
            amount,
        )?;

        // Mint shares to the depositor.
        let base_mint = ctx.accounts.pool.base_mint;
        let pool_bump = ctx.accounts.pool.bump;
        let seeds = &[b"pool".as_ref(), base_mint.as_ref(), &[pool_bump]];
        let signer = &[&seeds[..]];
        token::mint_to(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                MintTo {
                    mint: ctx.accounts.share_mint.to_account_info(),
                    to: ctx.accounts.depositor_share_account.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer,
            ),
            shares,
        )?;

        emit!(Deposited {
            pool: ctx.accounts.pool.key(),
            depositor: ctx.accounts.depositor.key(),
            amount,
            shares_minted: shares,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Burn shares and withdraw base tokens at the stored NAV.
    pub fn withdraw(ctx: Context<Withdraw>, shares: u64) -> Result<()> {
        let pool = &ctx.accounts.pool;
        require!(!ctx.accounts.config.paused, PoolError::PoolPaused);
        require!(!pool.paused, PoolError::PoolPaused);
        require!(!pool.relay.active, PoolError::RelayBatchActive);
        require!(shares > 0, PoolError::ZeroAmount);

        let amount = mul_div(shares as u128, pool.last_nav as u128, pool.unit()?)?;
        let amount = u64::try_from(amount).map_err(|_| error!(PoolError::MathOverflow))?;
        require!(amount > 0, PoolError::ZeroAmount);
        require!(
            ctx.accounts.vault.amount >= amount,
            PoolError::InsufficientLiquidity
        );

        token::burn(
            CpiContext::new(
                ctx.accounts.token_program.to_account_info(),
                Burn {
                    mint: ctx.accounts.share_mint.to_account_info(),
                    from: ctx.accounts.withdrawer_share_account.to_account_info(),
                    authority: ctx.accounts.withdrawer.to_account_info(),
                },
            ),
            shares,
        )?;

        let base_mint = ctx.accounts.pool.base_mint;
        let pool_bump = ctx.accounts.pool.bump;
        let seeds = &[b"pool".as_ref(), base_mint.as_ref(), &[pool_bump]];
        let signer = &[&seeds[..]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.vault.to_account_info(),
                    to: ctx.accounts.withdrawer_base_account.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer,
            ),
            amount,
        )?;

        emit!(Withdrawn {
            pool: ctx.accounts.pool.key(),
            withdrawer: ctx.accounts.withdrawer.key(),
            amount,
            shares_burned: shares,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Re-value the pool and store the current NAV.
    ///
    /// Remaining accounts: for each registered holding, in order, the
    /// pool's token account for that mint followed by the mint's oracle
    /// price account.
    pub fn recompute_nav<'info>(
        ctx: Context<'_, '_, 'info, 'info, RecomputeNav<'info>>,
    ) -> Result<()> {
        require!(
            !ctx.accounts.pool.relay.active,
            PoolError::RelayBatchActive
        );

        let pool_key = ctx.accounts.pool.key();
        let real_supply = ctx.accounts.share_mint.supply;
        let total = total_pool_value(&ctx.accounts.pool, &pool_key, ctx.remaining_accounts)?;
        let nav = ctx.accounts.pool.nav(total, real_supply)?;

        let pool = &mut ctx.accounts.pool;
        pool.last_nav = nav;

        emit!(NavUpdated {
            pool: pool_key,
            total_value: total,
            effective_supply: pool.effective_supply(real_supply),
            nav,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Build and dispatch a cross-chain transfer intent.
    ///
    /// Transfer mode locks the outgoing value into the virtual ledger at
    /// the current oracle rate, so this chain's NAV stays insensitive to
    /// the asset's later price action. Sync mode makes no ledger
    /// adjustment; the intent embeds the pool's current NAV and precision
    /// for destination-side validation. Value movement and message
    /// delivery are delegated to the bridge transport.
    pub fn initiate_transfer(ctx: Context<InitiateTransfer>, args: TransferArgs) -> Result<()> {
        let config = &ctx.accounts.config;
        require!(!config.paused, PoolError::PoolPaused);
        require!(!ctx.accounts.pool.paused, PoolError::PoolPaused);
        require!(!ctx.accounts.pool.relay.active, PoolError::RelayBatchActive);
        require!(args.input_amount > 0, PoolError::ZeroAmount);
        require!(
            args.output_token != [0u8; 32] && args.recipient != [0u8; 32],
            PoolError::NullAddress
        );
        require!(
            args.destination_chain_id != config.local_chain_id,
            PoolError::SameChainTransfer
        );
        require!(
            ctx.accounts.pool_input_account.amount >= args.input_amount,
            PoolError::InsufficientLiquidity
        );

        let input_mint = ctx.accounts.input_mint.key();
        let value_locked = match args.operation {
            OperationType::Transfer => {
                let value = token_value(args.input_amount, &ctx.accounts.input_oracle)?;
                let pool = &mut ctx.accounts.pool;
                pool.ensure_holding(input_mint, ctx.accounts.input_mint.decimals)?;
                pool.lock_outbound_value(&input_mint, value)?;
                value
            }
            OperationType::Sync => 0,
        };

        // Hand custody of the outgoing tokens to the bridge transport.
        let base_mint = ctx.accounts.pool.base_mint;
        let pool_bump = ctx.accounts.pool.bump;
        let seeds = &[b"pool".as_ref(), base_mint.as_ref(), &[pool_bump]];
        let signer = &[&seeds[..]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.pool_input_account.to_account_info(),
                    to: ctx.accounts.bridge_custody.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer,
            ),
            args.input_amount,
        )?;

        let outbound = OutboundMessage {
            operation: args.operation,
            nav_tolerance_bps: args.nav_tolerance_bps,
            should_unwrap_on_destination: args.should_unwrap_on_destination,
            source_native_amount: args.relay.execution_fee,
        };

        emit!(TransferInitiated {
            pool: ctx.accounts.pool.key(),
            input_mint,
            output_token: args.output_token,
            recipient: args.recipient,
            input_amount: args.input_amount,
            output_amount: args.output_amount,
            destination_chain_id: args.destination_chain_id,
            value_locked,
            message: outbound,
            source_nav: ctx.accounts.pool.last_nav,
            source_decimals: ctx.accounts.pool.decimals,
            execution_fee: args.relay.execution_fee,
            deadline: args.relay.deadline,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Apply an incoming cross-chain delivery. Only the configured bridge
    /// transport may call this, after delivering `amount` of `mint` to the
    /// pool.
    ///
    /// Remaining accounts: as for `recompute_nav`, covering every holding
    /// registered after this call (a first delivery of a new mint appends
    /// its holding at the end).
    pub fn handle_incoming<'info>(
        ctx: Context<'_, '_, 'info, 'info, HandleIncoming<'info>>,
        amount: u64,
        payload: Vec<u8>,
    ) -> Result<()> {
        require!(amount > 0, PoolError::ZeroAmount);
        let message = InboundMessage::decode(&payload)?;

        let pool_key = ctx.accounts.pool.key();
        let mint_key = ctx.accounts.mint.key();

        // Unwrap the wrapped-native delivery if the message asks for it.
        // Failure here is fatal to the whole call.
        if message.should_unwrap_native && mint_key == native_mint::ID {
            let wrapped = ctx
                .accounts
                .wrapped_native_account
                .as_ref()
                .ok_or(PoolError::UnwrapFailed)?;
            require!(
                wrapped.mint == native_mint::ID && wrapped.owner == pool_key,
                PoolError::UnwrapFailed
            );
            let base_mint = ctx.accounts.pool.base_mint;
            let pool_bump = ctx.accounts.pool.bump;
            let seeds = &[b"pool".as_ref(), base_mint.as_ref(), &[pool_bump]];
            let signer = &[&seeds[..]];
            token::close_account(CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                CloseAccount {
                    account: wrapped.to_account_info(),
                    destination: ctx.accounts.pool.to_account_info(),
                    authority: ctx.accounts.pool.to_account_info(),
                },
                signer,
            ))?;
            let pool = &mut ctx.accounts.pool;
            pool.native_lamports = pool
                .native_lamports
                .checked_add(amount)
                .ok_or(PoolError::MathOverflow)?;
        }

        // Normalize source-side fields to local precision, then cross-check
        // the declared amount against what was delivered.
        let pool_decimals = ctx.accounts.pool.decimals;
        let declared = scale_decimals(
            message.source_amount as u128,
            message.source_decimals,
            pool_decimals,
        )?;
        require!(declared == amount as u128, PoolError::AmountMismatch);

        let value = token_value(amount, &ctx.accounts.oracle)?;
        let real_supply = ctx.accounts.share_mint.supply;

        match message.operation {
            OperationType::Transfer => {
                let record = ctx
                    .accounts
                    .supported_token
                    .as_ref()
                    .ok_or(PoolError::UnsupportedCrossChainToken)?;
                require!(record.mint == mint_key, PoolError::UnsupportedCrossChainToken);

                let pool = &mut ctx.accounts.pool;
                pool.ensure_holding(mint_key, ctx.accounts.mint.decimals)?;
                pool.absorb_inbound_value(&mint_key, value, real_supply)?;

                emit!(TransferReceived {
                    pool: pool_key,
                    mint: mint_key,
                    amount,
                    value,
                    source_chain_id: message.source_chain_id,
                    virtual_balance_after: pool
                        .holding(&mint_key)
                        .map(|h| h.virtual_balance)
                        .unwrap_or_default(),
                    virtual_supply_after: pool.virtual_supply,
                    timestamp: Clock::get()?.unix_timestamp,
                });
            }
            OperationType::Sync => {
                {
                    let pool = &mut ctx.accounts.pool;
                    pool.ensure_holding(mint_key, ctx.accounts.mint.decimals)?;
                }
                // The delivery is already in the vault; value the pool as
                // it stood before it to compare NAVs at arrival.
                let total =
                    total_pool_value(&ctx.accounts.pool, &pool_key, ctx.remaining_accounts)?;
                let local_nav = ctx
                    .accounts
                    .pool
                    .nav(total.saturating_sub(value), real_supply)?;
                let source_nav = scale_decimals(
                    message.source_nav as u128,
                    message.source_decimals,
                    pool_decimals,
                )?;
                let source_nav = u64::try_from(source_nav)
                    .map_err(|_| error!(PoolError::DecimalScalingOverflow))?;
                require!(
                    nav_within_tolerance(source_nav, local_nav, message.nav_tolerance_bps),
                    PoolError::NavDeviationExceeded
                );

                emit!(SyncReceived {
                    pool: pool_key,
                    mint: mint_key,
                    amount,
                    source_chain_id: message.source_chain_id,
                    source_nav,
                    local_nav,
                    nav_tolerance_bps: message.nav_tolerance_bps,
                    timestamp: Clock::get()?.unix_timestamp,
                });
            }
        }

        // Re-value and store NAV. For Transfer this nets out the delivery;
        // for Sync it realizes the intended NAV movement.
        let total = total_pool_value(&ctx.accounts.pool, &pool_key, ctx.remaining_accounts)?;
        let nav = ctx.accounts.pool.nav(total, real_supply)?;
        let pool = &mut ctx.accounts.pool;
        pool.last_nav = nav;

        emit!(NavUpdated {
            pool: pool_key,
            total_value: total,
            effective_supply: pool.effective_supply(real_supply),
            nav,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Open a relay batch: snapshot the target vault and lock the pool's
    /// user-facing NAV-mutating entry points for the duration of the
    /// transaction. Bridge-only.
    pub fn begin_relay_batch(ctx: Context<RelayBatchGuard>, expected_amount: u64) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        require!(!pool.relay.active, PoolError::RelayBatchActive);

        pool.relay.active = true;
        pool.relay.mint = ctx.accounts.target_account.mint;
        pool.relay.expected_amount = expected_amount;
        pool.relay.vault_snapshot = ctx.accounts.target_account.amount;

        Ok(())
    }

    /// Close a relay batch. The observed balance delta on the target vault
    /// must equal the expected transferred amount; any unexplained delta
    /// aborts the entire transaction, leaving no partial ledger mutation
    /// behind. Bridge-only.
    pub fn finalize_relay_batch(ctx: Context<RelayBatchGuard>) -> Result<()> {
        let observed = {
            let pool = &ctx.accounts.pool;
            require!(pool.relay.active, PoolError::NoRelayBatch);
            require!(
                ctx.accounts.target_account.mint == pool.relay.mint,
                PoolError::InvalidVault
            );
            ctx.accounts
                .target_account
                .amount
                .checked_sub(pool.relay.vault_snapshot)
                .ok_or(PoolError::NavManipulationDetected)?
        };
        let pool = &mut ctx.accounts.pool;
        require!(
            observed == pool.relay.expected_amount,
            PoolError::NavManipulationDetected
        );

        emit!(RelayBatchFinalized {
            pool: pool.key(),
            mint: pool.relay.mint,
            expected_amount: pool.relay.expected_amount,
            observed_amount: observed,
            timestamp: Clock::get()?.unix_timestamp,
        });

        pool.relay = Default::default();

        Ok(())
    }

    /// Forward an escrow's entire balance of a token back into the pool,
    /// tagged with the escrow's own operation type. Permissionless: any
    /// caller may trigger the forwarding, typically a relayer. A failed
    /// forwarding leaves the funds in the escrow, recoverable by a later
    /// call.
    ///
    /// Remaining accounts: as for `recompute_nav`.
    pub fn refund_vault<'info>(ctx: Context<'_, '_, 'info, 'info, RefundVault<'info>>) -> Result<()> {
        require!(
            !ctx.accounts.pool.relay.active,
            PoolError::RelayBatchActive
        );
        let mint_key = ctx.accounts.mint.key();
        require!(mint_key != native_mint::ID, PoolError::UnsupportedToken);
        let record = ctx
            .accounts
            .supported_token
            .as_ref()
            .ok_or(PoolError::UnsupportedCrossChainToken)?;
        require!(record.mint == mint_key, PoolError::UnsupportedCrossChainToken);

        let amount = ctx.accounts.escrow_token_account.amount;
        require!(amount > 0, PoolError::ZeroAmount);

        let pool_key = ctx.accounts.pool.key();
        let operation = ctx.accounts.escrow.operation;
        let escrow_bump = ctx.accounts.escrow.bump;
        let seeds = &[
            b"escrow".as_ref(),
            pool_key.as_ref(),
            &[operation as u8],
            &[escrow_bump],
        ];
        let signer = &[&seeds[..]];
        token::transfer(
            CpiContext::new_with_signer(
                ctx.accounts.token_program.to_account_info(),
                Transfer {
                    from: ctx.accounts.escrow_token_account.to_account_info(),
                    to: ctx.accounts.pool_token_account.to_account_info(),
                    authority: ctx.accounts.escrow.to_account_info(),
                },
                signer,
            ),
            amount,
        )?;

        // Route the refunded value through the same apply path as a
        // bridge-delivered transfer of this operation type.
        let value = token_value(amount, &ctx.accounts.oracle)?;
        let real_supply = ctx.accounts.share_mint.supply;
        {
            let pool = &mut ctx.accounts.pool;
            pool.ensure_holding(mint_key, ctx.accounts.mint.decimals)?;
            match operation {
                OperationType::Transfer => {
                    pool.absorb_inbound_value(&mint_key, value, real_supply)?;
                }
                // Sync refunds land as an ordinary deposit: NAV moves,
                // symmetric to the original outgoing impact.
                OperationType::Sync => {}
            }
        }

        let total = total_pool_value(&ctx.accounts.pool, &pool_key, ctx.remaining_accounts)?;
        let nav = ctx.accounts.pool.nav(total, real_supply)?;
        let pool = &mut ctx.accounts.pool;
        pool.last_nav = nav;

        emit!(VaultRefunded {
            pool: pool_key,
            escrow: ctx.accounts.escrow.key(),
            mint: mint_key,
            amount,
            operation,
            timestamp: Clock::get()?.unix_timestamp,
        });
        emit!(NavUpdated {
            pool: pool_key,
            total_value: total,
            effective_supply: pool.effective_supply(real_supply),
            nav,
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Apply a logged administrative adjustment to the virtual ledger.
    /// Bypasses the economic invariant; admin-only, and every use is
    /// emitted for off-chain audit.
    pub fn admin_adjust_virtual_ledger(
        ctx: Context<AdminAdjustVirtualLedger>,
        mint: Pubkey,
        delta_balance: i128,
        delta_supply: i128,
    ) -> Result<()> {
        let pool = &mut ctx.accounts.pool;
        if delta_balance != 0 {
            pool.adjust_virtual_balance(&mint, delta_balance)?;
        }
        if delta_supply != 0 {
            pool.adjust_virtual_supply(delta_supply)?;
        }

        emit!(VirtualLedgerAdjusted {
            pool: pool.key(),
            mint,
            delta_balance,
            delta_supply,
            authority: ctx.accounts.admin.key(),
            timestamp: Clock::get()?.unix_timestamp,
        });

        Ok(())
    }

    /// Pause pool: no deposits, withdrawals, or new intents. Admin-only
    /// (circuit breaker).
    pub fn pause_pool(ctx: Context<PauseResumePool>) -> Result<()> {
        ctx.accounts.pool.paused = true;
        Ok(())
    }

    /// Resume pool after pause. Admin-only.
    pub fn resume_pool(ctx: Context<PauseResumePool>) -> Result<()> {
        ctx.accounts.pool.paused = false;
        Ok(())
    }
}

// --- Account structs and validation ---

#[derive(Accounts)]
pub struct InitializeConfig<'info> {
    #[account(
        init,
        payer = admin,
        space = Config::LEN,
        seeds = [b"config"],
        bump
    )]
    pub config: Account<'info, Config>,

    #[account(mut)]
    pub admin: Signer<'info>,

    /// Bridge transport authority (sole caller of `handle_incoming` and
    /// the relay-batch instructions).
    /// CHECK: bridge pubkey stored in config
    pub bridge: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct InitializePool<'info> {
    #[account(
        init,
        payer = manager,
        space = 8 + Pool::INIT_SPACE,
        seeds = [b"pool", base_mint.key().as_ref()],
        bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(mut)]
    pub manager: Signer<'info>,

    pub config: Account<'info, Config>,

    pub base_mint: Account<'info, Mint>,

    #[account(
        constraint = vault.mint == base_mint.key() @ PoolError::InvalidVault,
        constraint = vault.owner == pool.key() @ PoolError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        constraint = share_mint.key() != base_mint.key() @ PoolError::InvalidVault,
        constraint = share_mint.decimals == base_mint.decimals @ PoolError::InvalidVault,
        constraint = share_mint.mint_authority == COption::Some(pool.key()) @ PoolError::InvalidVault
    )]
    pub share_mint: Account<'info, Mint>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct AddSupportedToken<'info> {
    #[account(
        init,
        payer = admin,
        space = SupportedToken::LEN,
        seeds = [b"supported_token", mint.key().as_ref()],
        bump
    )]
    pub supported_token: Account<'info, SupportedToken>,

    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        constraint = config.admin == admin.key() @ PoolError::UnauthorizedAdmin
    )]
    pub config: Account<'info, Config>,

    pub mint: Account<'info, Mint>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct RegisterOracle<'info> {
    #[account(
        init,
        payer = admin,
        space = OraclePrice::LEN,
        seeds = [b"oracle_price", mint.key().as_ref()],
        bump
    )]
    pub oracle: Account<'info, OraclePrice>,

    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        constraint = config.admin == admin.key() @ PoolError::UnauthorizedAdmin
    )]
    pub config: Account<'info, Config>,

    pub mint: Account<'info, Mint>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SetOraclePrice<'info> {
    #[account(
        mut,
        seeds = [b"oracle_price", oracle.mint.as_ref()],
        bump = oracle.bump
    )]
    pub oracle: Account<'info, OraclePrice>,

    pub admin: Signer<'info>,

    #[account(
        constraint = config.admin == admin.key() @ PoolError::UnauthorizedAdmin
    )]
    pub config: Account<'info, Config>,
}

#[derive(Accounts)]
#[instruction(operation: OperationType)]
pub struct CreateEscrow<'info> {
    #[account(
        init,
        payer = manager,
        space = Escrow::LEN,
        seeds = [b"escrow", pool.key().as_ref(), &[operation as u8]],
        bump
    )]
    pub escrow: Account<'info, Escrow>,

    #[account(mut)]
    pub manager: Signer<'info>,

    #[account(
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.manager == manager.key() @ PoolError::DirectCallNotAllowed
    )]
    pub pool: Account<'info, Pool>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct ResolveEscrowAddress<'info> {
    pub manager: Signer<'info>,

    #[account(
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.manager == manager.key() @ PoolError::DirectCallNotAllowed
    )]
    pub pool: Account<'info, Pool>,
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    pub config: Account<'info, Config>,

    #[account(mut)]
    pub depositor: Signer<'info>,

    #[account(
        mut,
        constraint = depositor_base_account.mint == pool.base_mint,
        constraint = depositor_base_account.owner == depositor.key()
    )]
    pub depositor_base_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = depositor_share_account.mint == pool.share_mint,
        constraint = depositor_share_account.owner == depositor.key()
    )]
    pub depositor_share_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault.key() == pool.vault @ PoolError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = share_mint.key() == pool.share_mint @ PoolError::InvalidVault
    )]
    pub share_mint: Account<'info, Mint>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    pub config: Account<'info, Config>,

    #[account(mut)]
    pub withdrawer: Signer<'info>,

    #[account(
        mut,
        constraint = withdrawer_share_account.mint == pool.share_mint,
        constraint = withdrawer_share_account.owner == withdrawer.key()
    )]
    pub withdrawer_share_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = withdrawer_base_account.mint == pool.base_mint,
        constraint = withdrawer_base_account.owner == withdrawer.key()
    )]
    pub withdrawer_base_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = vault.key() == pool.vault @ PoolError::InvalidVault
    )]
    pub vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = share_mint.key() == pool.share_mint @ PoolError::InvalidVault
    )]
    pub share_mint: Account<'info, Mint>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct RecomputeNav<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        constraint = share_mint.key() == pool.share_mint @ PoolError::InvalidVault
    )]
    pub share_mint: Account<'info, Mint>,
}

#[derive(Accounts)]
pub struct InitiateTransfer<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    pub config: Account<'info, Config>,

    #[account(
        constraint = pool.manager == manager.key() @ PoolError::DirectCallNotAllowed
    )]
    pub manager: Signer<'info>,

    pub input_mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = pool_input_account.mint == input_mint.key() @ PoolError::InvalidVault,
        constraint = pool_input_account.owner == pool.key() @ PoolError::InvalidVault
    )]
    pub pool_input_account: Account<'info, TokenAccount>,

    #[account(
        seeds = [b"oracle_price", input_mint.key().as_ref()],
        bump = input_oracle.bump,
        constraint = input_oracle.mint == input_mint.key() @ PoolError::InvalidOracle
    )]
    pub input_oracle: Account<'info, OraclePrice>,

    /// Custody account of the bridge transport for the outgoing tokens.
    #[account(
        mut,
        constraint = bridge_custody.mint == input_mint.key() @ PoolError::InvalidVault,
        constraint = bridge_custody.owner == config.bridge @ PoolError::InvalidVault
    )]
    pub bridge_custody: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct HandleIncoming<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    pub config: Account<'info, Config>,

    #[account(
        constraint = config.bridge == bridge.key() @ PoolError::UnauthorizedCaller
    )]
    pub bridge: Signer<'info>,

    /// Mint of the delivered token.
    pub mint: Account<'info, Mint>,

    #[account(
        constraint = share_mint.key() == pool.share_mint @ PoolError::InvalidVault
    )]
    pub share_mint: Account<'info, Mint>,

    #[account(
        seeds = [b"oracle_price", mint.key().as_ref()],
        bump = oracle.bump,
        constraint = oracle.mint == mint.key() @ PoolError::InvalidOracle
    )]
    pub oracle: Account<'info, OraclePrice>,

    /// Cross-chain eligibility record; required by the Transfer branch.
    pub supported_token: Option<Account<'info, SupportedToken>>,

    /// Wrapped-native delivery account, closed into pool lamports when the
    /// message requests unwrapping.
    #[account(mut)]
    pub wrapped_native_account: Option<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct RelayBatchGuard<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    pub config: Account<'info, Config>,

    #[account(
        constraint = config.bridge == bridge.key() @ PoolError::UnauthorizedCaller
    )]
    pub bridge: Signer<'info>,

    #[account(
        constraint = target_account.owner == pool.key() @ PoolError::InvalidVault
    )]
    pub target_account: Account<'info, TokenAccount>,
}

#[derive(Accounts)]
pub struct RefundVault<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    pub config: Account<'info, Config>,

    /// Any caller may trigger the forwarding; typically a relayer.
    pub caller: Signer<'info>,

    #[account(
        seeds = [b"escrow", pool.key().as_ref(), &[escrow.operation as u8]],
        bump = escrow.bump,
        constraint = escrow.pool == pool.key() @ PoolError::InvalidVault
    )]
    pub escrow: Account<'info, Escrow>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        constraint = escrow_token_account.mint == mint.key() @ PoolError::InvalidVault,
        constraint = escrow_token_account.owner == escrow.key() @ PoolError::InvalidVault
    )]
    pub escrow_token_account: Account<'info, TokenAccount>,

    #[account(
        mut,
        constraint = pool_token_account.mint == mint.key() @ PoolError::InvalidVault,
        constraint = pool_token_account.owner == pool.key() @ PoolError::InvalidVault
    )]
    pub pool_token_account: Account<'info, TokenAccount>,

    #[account(
        constraint = share_mint.key() == pool.share_mint @ PoolError::InvalidVault
    )]
    pub share_mint: Account<'info, Mint>,

    #[account(
        seeds = [b"oracle_price", mint.key().as_ref()],
        bump = oracle.bump,
        constraint = oracle.mint == mint.key() @ PoolError::InvalidOracle
    )]
    pub oracle: Account<'info, OraclePrice>,

    /// Cross-chain eligibility record; refunds of unlisted tokens are
    /// rejected.
    pub supported_token: Option<Account<'info, SupportedToken>>,

    pub token_program: Program<'info, Token>,
}

#[derive(Accounts)]
pub struct AdminAdjustVirtualLedger<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        constraint = config.admin == admin.key() @ PoolError::UnauthorizedAdmin
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}

#[derive(Accounts)]
pub struct PauseResumePool<'info> {
    #[account(
        mut,
        seeds = [b"pool", pool.base_mint.as_ref()],
        bump = pool.bump,
        constraint = pool.config == config.key()
    )]
    pub pool: Account<'info, Pool>,

    #[account(
        constraint = config.admin == admin.key() @ PoolError::UnauthorizedAdmin
    )]
    pub config: Account<'info, Config>,

    pub admin: Signer<'info>,
}
