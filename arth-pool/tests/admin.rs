mod common;

use anyhow::Result;
use arth_core::error::CoreError::{InvalidParameters, PriceUnavailable, Unauthorized};
use arth_pool::prelude::*;
use common::{admin, alice, bob, owner, timelock, Harness, ETH};

#[test]
fn pause_toggles_require_governance() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  let by_admin = h.pool.toggle(&admin(), Operation::Mint);
  let by_user = h.pool.toggle(&alice(), Operation::Redeem);
  assert!(by_admin.is_err_and(|e| e == Unauthorized.into()));
  assert!(by_user.is_err_and(|e| e == Unauthorized.into()));

  assert!(h.pool.toggle(&timelock(), Operation::Buyback)?);
  assert!(h.pool.pause_flags().buyback_paused);
  assert!(!h.pool.pause_flags().mint_paused);
  assert!(!h.pool.toggle(&owner(), Operation::Buyback)?);
  Ok(())
}

#[test]
fn admin_tier_setters() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  h.pool.set_stability_fee(&admin(), UFix64::new(25_000))?;
  let stranger = h.pool.set_stability_fee(&alice(), UFix64::zero());
  assert!(stranger.is_err_and(|e| e == Unauthorized.into()));
  let full = h.pool.set_stability_fee(&owner(), UFix64::one());
  assert!(full.is_err_and(|e| e == InvalidParameters.into()));

  let estimate =
    h.pool.estimate_stability_fee(&h.env.prices, &h.env.clock, 100 * ETH)?;
  assert_eq!(estimate, 2_500_000_000_000_000_000);
  h.env.prices.fee_token = UFix64::new(2_000_000);
  let estimate =
    h.pool.estimate_stability_fee(&h.env.prices, &h.env.clock, 100 * ETH)?;
  assert_eq!(estimate, 1_250_000_000_000_000_000);

  h.pool.set_buyback_buffer(&timelock(), UFix64::new(100_000))?;
  assert_eq!(h.pool.parameters().buyback_buffer()?, UFix64::new(100_000));
  Ok(())
}

#[test]
fn set_parameters_from_json() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  let config: PoolConfig = serde_json::from_str(
    r#"{ "mintingFee": 3000, "redemptionDelayBlocks": 5 }"#,
  )?;
  let by_admin = h.pool.set_parameters(&admin(), config.clone());
  assert!(by_admin.is_err_and(|e| e == Unauthorized.into()));
  h.pool.set_parameters(&owner(), config)?;
  assert_eq!(h.pool.parameters().minting_fee()?, UFix64::new(3_000));
  assert_eq!(h.pool.parameters().redemption_delay_blocks, 5);
  assert_eq!(PoolConfig::from(h.pool.parameters()).redemption_fee, 1_000);
  Ok(())
}

#[test]
fn set_parameters_validates() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  let full_fee = PoolConfig {
    redemption_fee: 1_000_000,
    ..common::load_config()?
  };
  let decimals = PoolConfig {
    collateral_decimals: 6,
    ..common::load_config()?
  };
  let fee = h.pool.set_parameters(&owner(), full_fee);
  let dec = h.pool.set_parameters(&owner(), decimals);
  assert!(fee.is_err_and(|e| e == InvalidParameters.into()));
  assert!(dec.is_err_and(|e| e == InvalidParameters.into()));
  assert_eq!(PoolConfig::from(h.pool.parameters()), common::load_config()?);
  Ok(())
}

#[test]
fn price_override_lifecycle() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  h.env.prices.collateral = UFix64::zero();
  let by_user = h.pool.set_price_override(&alice(), UFix64::new(990_000));
  let zero = h.pool.set_price_override(&owner(), UFix64::zero());
  assert!(by_user.is_err_and(|e| e == Unauthorized.into()));
  assert!(zero.is_err_and(|e| e == InvalidParameters.into()));

  h.pool.set_price_override(&owner(), UFix64::new(990_000))?;
  let price = h.pool.collateral_price(&h.env.prices, &h.env.clock)?;
  assert_eq!(price, UFix64::new(990_000));
  // A live oracle price wins over the override
  h.env.prices.collateral = UFix64::new(1_010_000);
  let price = h.pool.collateral_price(&h.env.prices, &h.env.clock)?;
  assert_eq!(price, UFix64::new(1_010_000));

  h.env.prices.collateral = UFix64::zero();
  h.pool.clear_price_override(&timelock())?;
  let cleared = h.pool.collateral_price(&h.env.prices, &h.env.clock);
  assert!(cleared.is_err_and(|e| e == PriceUnavailable.into()));
  Ok(())
}

#[test]
fn role_changes_through_authority() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  let escalate = h.pool.authority_mut().add_admin(&alice(), alice());
  assert!(escalate.is_err_and(|e| e == Unauthorized.into()));
  h.pool.authority_mut().add_admin(&owner(), bob())?;
  h.pool.set_buyback_buffer(&bob(), UFix64::new(200_000))?;
  h.pool.authority_mut().remove_admin(&timelock(), &bob())?;
  let removed = h.pool.set_buyback_buffer(&bob(), UFix64::zero());
  assert!(removed.is_err_and(|e| e == Unauthorized.into()));
  h.pool.authority_mut().set_owner(&owner(), alice())?;
  assert!(h.pool.authority().can_govern(&alice()));
  assert!(!h.pool.authority().can_govern(&owner()));
  Ok(())
}

#[test]
fn views() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  h.pool.mint_1t1(&h.env.ctx(alice()), 10 * ETH, 0)?;
  assert_eq!(h.pool.global_collateral_ratio(&h.env.ratio)?, UFix64::one());
  assert_eq!(h.pool.available_collateral()?, 10 * ETH);
  assert_eq!(
    h.pool.target_collateral_value(&UFix64::<N6>::new(500_000))?,
    4_995_000_000_000_000_000
  );
  h.env.prices.collateral = UFix64::new(1_100_000);
  assert_eq!(
    h.pool.collateral_gmu_balance(&h.env.prices, &h.env.clock)?,
    11 * ETH
  );
  assert_eq!(h.pool.share_price(&h.env.prices, &h.env.clock)?, UFix64::one());
  assert_eq!(h.pool.fee_token_price(&h.env.prices, &h.env.clock)?, UFix64::one());
  h.env.prices.share = UFix64::zero();
  let share = h.pool.share_price(&h.env.prices, &h.env.clock);
  assert!(share.is_err_and(|e| e == PriceUnavailable.into()));
  assert!(!h.pool.pending_redemption(&alice()).is_outstanding());
  Ok(())
}

#[test]
fn ratio_controller_drives_pool_bands() -> Result<()> {
  let mut h = Harness::from_fixture()?;
  let mut ratio = CollateralRatioState::new(owner());
  h.pool.mint(&CallContext::new(alice(), &h.env.clock, &h.env.prices, &ratio), ETH, 0, 0)?;
  ratio.set(&owner(), UFix64::new(600_000))?;
  let ctx = CallContext::new(alice(), &h.env.clock, &h.env.prices, &ratio);
  let receipt = h.pool.mint_fractional(&ctx, 6 * ETH, 4 * ETH, 0)?;
  assert_eq!(receipt.quote.share_burned, 4 * ETH);
  assert_eq!(RatioBand::of(ratio.collateral_ratio()?)?, RatioBand::Fractional(UFix64::new(600_000)));
  Ok(())
}
