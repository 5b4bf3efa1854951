//! Funded pool fixture shared by the engine scenarios.

#![allow(dead_code)]

use std::fs::File;

use anyhow::Result;
use arth_pool::prelude::*;
use serde_json::from_reader;

pub const ETH: u128 = 1_000_000_000_000_000_000;

/// Starting balance of every token for each user.
pub const FUNDING: u128 = 1_000_000_000 * ETH;

pub const START_HEIGHT: u64 = 100;

pub type Pool = CollateralPool<Ledger, Roles>;

pub fn key(b: u8) -> Pubkey {
  Pubkey::new_from_array([b; 32])
}

pub fn owner() -> Pubkey {
  key(1)
}

pub fn timelock() -> Pubkey {
  key(2)
}

pub fn admin() -> Pubkey {
  key(3)
}

pub fn pool_account() -> Pubkey {
  key(10)
}

pub fn alice() -> Pubkey {
  key(20)
}

pub fn bob() -> Pubkey {
  key(21)
}

pub fn load_config() -> Result<PoolConfig> {
  let path = format!(
    "{}/tests/data/pool-config.json",
    env!("CARGO_MANIFEST_DIR")
  );
  let file = File::open(path)?;
  Ok(from_reader::<_, PoolConfig>(file)?)
}

/// Prices, ratio and height a test drives between calls.
pub struct Env {
  pub prices: PriceSnapshot,
  pub ratio: UFix64<N6>,
  pub clock: BlockClock,
}

impl Env {
  pub fn ctx(&self, caller: Pubkey) -> CallContext<'_, PriceSnapshot, UFix64<N6>, BlockClock> {
    CallContext::new(caller, &self.clock, &self.prices, &self.ratio)
  }

  pub fn advance(&mut self, blocks: u64) {
    self.clock = self.clock.advance(blocks, 12 * i64::try_from(blocks).unwrap_or(0));
  }
}

pub struct Harness {
  pub pool: Pool,
  pub env: Env,
}

impl Harness {
  /// Fully collateralized pool with every asset at 1.0 and two funded users
  /// who have approved the pool for collateral and fee tokens.
  pub fn new(config: PoolConfig) -> Result<Harness> {
    let mut tokens = TokenSet::<Ledger>::default();
    for user in [alice(), bob()] {
      tokens.collateral.mint(&user, FUNDING)?;
      tokens.share.mint(&user, FUNDING)?;
      tokens.fee.mint(&user, FUNDING)?;
      tokens.collateral.approve(&user, &pool_account(), u128::MAX);
      tokens.fee.approve(&user, &pool_account(), u128::MAX);
    }
    let mut roles = Roles::new(owner(), timelock());
    roles.add_admin(&owner(), admin())?;
    let params = PoolParameters::try_from(config)?;
    let pool = CollateralPool::new(pool_account(), params, roles, tokens)?;
    Ok(Harness {
      pool,
      env: Env {
        prices: PriceSnapshot::new(UFix64::one(), UFix64::one(), UFix64::one()),
        ratio: UFix64::one(),
        clock: BlockClock::new(START_HEIGHT, 1_700_000_000),
      },
    })
  }

  pub fn from_fixture() -> Result<Harness> {
    Harness::new(load_config()?)
  }

  /// Fixture with minting, redemption and stability fees switched off.
  pub fn fee_free() -> Result<Harness> {
    Harness::new(PoolConfig {
      minting_fee: 0,
      redemption_fee: 0,
      stability_fee: 0,
      ..load_config()?
    })
  }

  pub fn pool_collateral(&self) -> u128 {
    self.pool.tokens().collateral.balance_of(&pool_account())
  }

  /// Every ledger's balances add up to its supply.
  pub fn assert_ledgers_consistent(&self) {
    let tokens = self.pool.tokens();
    for ledger in [&tokens.stable, &tokens.share, &tokens.collateral, &tokens.fee] {
      assert_eq!(ledger.sum_of_balances(), ledger.total_supply());
    }
  }
}
