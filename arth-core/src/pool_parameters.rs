use anchor_lang::prelude::*;
use fix::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CoreError::InvalidParameters;
use crate::token_math::{pow10, TOKEN_DECIMALS};

/// Host-facing pool configuration, rates in parts per million.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolConfig {
  pub minting_fee: u64,
  pub redemption_fee: u64,
  pub buyback_fee: u64,
  pub recollat_fee: u64,
  pub stability_fee: u64,
  pub bonus_rate: u64,
  pub buyback_buffer: u64,
  pub collateral_ceiling: u128,
  pub redemption_delay_blocks: u64,
  pub collateral_decimals: u8,
}

impl Default for PoolConfig {
  fn default() -> Self {
    PoolConfig {
      minting_fee: 1_000,
      redemption_fee: 1_000,
      buyback_fee: 1_000,
      recollat_fee: 1_000,
      stability_fee: 10_000,
      bonus_rate: 0,
      buyback_buffer: 0,
      collateral_ceiling: u128::MAX,
      redemption_delay_blocks: 1,
      collateral_decimals: TOKEN_DECIMALS,
    }
  }
}

/// Validated, persistable pool parameters.
#[derive(Clone, Copy, Debug, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct PoolParameters {
  minting_fee: UFixValue64,
  redemption_fee: UFixValue64,
  buyback_fee: UFixValue64,
  recollat_fee: UFixValue64,
  stability_fee: UFixValue64,
  bonus_rate: UFixValue64,
  buyback_buffer: UFixValue64,
  pub collateral_ceiling: u128,
  pub redemption_delay_blocks: u64,
  pub collateral_decimals: u8,
}

impl Default for PoolParameters {
  fn default() -> Self {
    PoolParameters::from_config_unchecked(&PoolConfig::default())
  }
}

impl TryFrom<PoolConfig> for PoolParameters {
  type Error = anchor_lang::error::Error;

  fn try_from(config: PoolConfig) -> Result<PoolParameters> {
    let params = PoolParameters::from_config_unchecked(&config);
    params.validate()?;
    Ok(params)
  }
}

impl From<&PoolParameters> for PoolConfig {
  fn from(params: &PoolParameters) -> PoolConfig {
    PoolConfig {
      minting_fee: params.minting_fee.bits,
      redemption_fee: params.redemption_fee.bits,
      buyback_fee: params.buyback_fee.bits,
      recollat_fee: params.recollat_fee.bits,
      stability_fee: params.stability_fee.bits,
      bonus_rate: params.bonus_rate.bits,
      buyback_buffer: params.buyback_buffer.bits,
      collateral_ceiling: params.collateral_ceiling,
      redemption_delay_blocks: params.redemption_delay_blocks,
      collateral_decimals: params.collateral_decimals,
    }
  }
}

fn ppm(bits: u64) -> UFixValue64 {
  UFix64::<N6>::new(bits).into()
}

impl PoolParameters {
  fn from_config_unchecked(config: &PoolConfig) -> PoolParameters {
    PoolParameters {
      minting_fee: ppm(config.minting_fee),
      redemption_fee: ppm(config.redemption_fee),
      buyback_fee: ppm(config.buyback_fee),
      recollat_fee: ppm(config.recollat_fee),
      stability_fee: ppm(config.stability_fee),
      bonus_rate: ppm(config.bonus_rate),
      buyback_buffer: ppm(config.buyback_buffer),
      collateral_ceiling: config.collateral_ceiling,
      redemption_delay_blocks: config.redemption_delay_blocks,
      collateral_decimals: config.collateral_decimals,
    }
  }

  pub fn minting_fee(&self) -> Result<UFix64<N6>> {
    self.minting_fee.try_into()
  }

  pub fn redemption_fee(&self) -> Result<UFix64<N6>> {
    self.redemption_fee.try_into()
  }

  pub fn buyback_fee(&self) -> Result<UFix64<N6>> {
    self.buyback_fee.try_into()
  }

  pub fn recollat_fee(&self) -> Result<UFix64<N6>> {
    self.recollat_fee.try_into()
  }

  pub fn stability_fee(&self) -> Result<UFix64<N6>> {
    self.stability_fee.try_into()
  }

  pub fn bonus_rate(&self) -> Result<UFix64<N6>> {
    self.bonus_rate.try_into()
  }

  pub fn buyback_buffer(&self) -> Result<UFix64<N6>> {
    self.buyback_buffer.try_into()
  }

  /// Decimals the collateral lacks relative to 18-decimal tokens.
  pub fn missing_decimals(&self) -> Result<u8> {
    TOKEN_DECIMALS
      .checked_sub(self.collateral_decimals)
      .ok_or(InvalidParameters.into())
  }

  /// Multiplier lifting collateral base units to 18 decimals.
  pub fn collateral_scale(&self) -> Result<u128> {
    pow10(self.missing_decimals()?).ok_or(InvalidParameters.into())
  }

  /// Replaces the stability fee, keeping it below 100%.
  pub fn set_stability_fee(&mut self, fee: UFix64<N6>) -> Result<()> {
    if fee < UFix64::one() {
      self.stability_fee = fee.into();
      Ok(())
    } else {
      Err(InvalidParameters.into())
    }
  }

  /// Replaces the buyback buffer, at most 100%.
  pub fn set_buyback_buffer(&mut self, buffer: UFix64<N6>) -> Result<()> {
    if buffer <= UFix64::one() {
      self.buyback_buffer = buffer.into();
      Ok(())
    } else {
      Err(InvalidParameters.into())
    }
  }

  /// Fees must be less than 100%, the buffer at most 100%, and
  /// collateral decimals no more than 18.
  pub fn validate(&self) -> Result<()> {
    let one = UFix64::<N6>::one();
    let fees = [
      self.minting_fee()?,
      self.redemption_fee()?,
      self.buyback_fee()?,
      self.recollat_fee()?,
      self.stability_fee()?,
    ];
    let recollat_fee = self.recollat_fee()?;
    let recollat_multiplier = one
      .checked_add(&self.bonus_rate()?)
      .and_then(|m| m.checked_sub(&recollat_fee))
      .filter(|m| *m > UFix64::zero());
    if fees.iter().all(|fee| *fee < one)
      && self.buyback_buffer()? <= one
      && recollat_multiplier.is_some()
      && self.collateral_decimals <= TOKEN_DECIMALS
    {
      Ok(())
    } else {
      Err(InvalidParameters.into())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_validate() -> Result<()> {
    let params = PoolParameters::default();
    params.validate()?;
    assert_eq!(params.minting_fee()?, UFix64::new(1_000));
    assert_eq!(params.stability_fee()?, UFix64::new(10_000));
    assert_eq!(params.redemption_delay_blocks, 1);
    assert_eq!(params.collateral_scale()?, 1);
    Ok(())
  }

  #[test]
  fn config_roundtrip_through_parameters() -> Result<()> {
    let config = PoolConfig {
      collateral_decimals: 6,
      collateral_ceiling: 2_000_000_000_000_000_000,
      ..PoolConfig::default()
    };
    let params = PoolParameters::try_from(config.clone())?;
    assert_eq!(params.missing_decimals()?, 12);
    assert_eq!(params.collateral_scale()?, 1_000_000_000_000);
    assert_eq!(PoolConfig::from(&params), config);
    Ok(())
  }

  #[test]
  fn rejects_full_fee() {
    let config = PoolConfig {
      redemption_fee: 1_000_000,
      ..PoolConfig::default()
    };
    let out = PoolParameters::try_from(config);
    assert!(out.is_err_and(|e| e == InvalidParameters.into()));
  }

  #[test]
  fn rejects_wide_decimals() {
    let config = PoolConfig {
      collateral_decimals: 19,
      ..PoolConfig::default()
    };
    let out = PoolParameters::try_from(config);
    assert!(out.is_err_and(|e| e == InvalidParameters.into()));
  }

  #[test]
  fn rejects_buffer_over_one() {
    let config = PoolConfig {
      buyback_buffer: 1_000_001,
      ..PoolConfig::default()
    };
    assert!(PoolParameters::try_from(config).is_err());
  }

  #[test]
  fn setters_validate() -> Result<()> {
    let mut params = PoolParameters::default();
    params.set_stability_fee(UFix64::new(25_000))?;
    params.set_buyback_buffer(UFix64::one())?;
    assert_eq!(params.stability_fee()?, UFix64::new(25_000));
    assert_eq!(params.buyback_buffer()?, UFix64::one());
    let fee = params.set_stability_fee(UFix64::one());
    let buffer = params.set_buyback_buffer(UFix64::new(1_000_001));
    assert!(fee.is_err_and(|e| e == InvalidParameters.into()));
    assert!(buffer.is_err_and(|e| e == InvalidParameters.into()));
    Ok(())
  }

  #[test]
  fn config_from_json() -> anyhow::Result<()> {
    let json = r#"{
      "mintingFee": 3000,
      "stabilityFee": 0,
      "collateralCeiling": 2000000000000000000,
      "redemptionDelayBlocks": 3,
      "collateralDecimals": 8
    }"#;
    let config: PoolConfig = serde_json::from_str(json)?;
    assert_eq!(config.redemption_fee, 1_000);
    let params = PoolParameters::try_from(config)?;
    assert_eq!(params.minting_fee()?, UFix64::new(3_000));
    assert_eq!(params.redemption_delay_blocks, 3);
    assert_eq!(params.collateral_decimals, 8);
    Ok(())
  }
}
