use anchor_lang::prelude::error_code;

#[error_code]
pub enum CoreError {
  // `pause`
  #[msg("Minting is paused.")]
  MintPaused = 7000,
  #[msg("Redeeming is paused.")]
  RedeemPaused,
  #[msg("Recollateralize is paused.")]
  RecollateralizePaused,
  #[msg("Buyback is paused.")]
  BuybackPaused,
  // `auth`
  #[msg("Caller is not the owner, an admin, or the governance timelock.")]
  Unauthorized,
  #[msg("Caller is not the designated collateral ratio controller.")]
  NotRatioController,
  // `collateral_ratio`
  #[msg("Collateral ratio must be == 1.")]
  RequiresFullCollateral,
  #[msg("Collateral ratio must be == 0.")]
  RequiresAlgorithmic,
  #[msg("Collateral ratio must be between .000001 and .999999.")]
  RequiresFractional,
  #[msg("Collateral ratio must not exceed 1.")]
  CollateralRatioOutOfBounds,
  #[msg("Input not accepted at the current collateral ratio.")]
  InputOutOfBand,
  // `pool`
  #[msg("Pool collateral ceiling reached.")]
  CeilingExceeded,
  #[msg("Not enough collateral in pool.")]
  InsufficientPoolCollateral,
  #[msg("No excess collateral to buy back.")]
  NoExcessCollateral,
  #[msg("Pool collateral is at or above target, no recollateralization needed.")]
  NoCollateralShortfall,
  #[msg("Amount must be greater than zero.")]
  InvalidAmount,
  #[msg("Not enough share token supplied for the current collateral ratio.")]
  ShareUndersupplied,
  // `slippage`
  #[msg("Slippage limit reached [stable].")]
  SlippageStable,
  #[msg("Slippage limit reached [collateral].")]
  SlippageCollateral,
  #[msg("Slippage limit reached [share].")]
  SlippageShare,
  // `redemption`
  #[msg("Redemption delay has not elapsed.")]
  ClaimNotReady,
  #[msg("No pending redemption for account.")]
  ClaimNotFound,
  #[msg("Overflow while accumulating pending redemption.")]
  ClaimOverflow,
  // `ledger`
  #[msg("Account balance too low.")]
  InsufficientBalance,
  #[msg("Spender allowance too low.")]
  InsufficientAllowance,
  #[msg("Token supply overflow.")]
  SupplyOverflow,
  // `oracle`
  #[msg("Oracle reported the unset price and no override is active.")]
  PriceUnavailable,
  #[msg("Oracle yielded a negative price which can't be unsigned.")]
  OracleNegativePrice,
  #[msg("Oracle round is older than the configured max age.")]
  OracleStale,
  #[msg("Oracle decimals are out of range.")]
  OracleDecimals,
  #[msg("Arithmetic error while composing oracle prices.")]
  PriceComposition,
  #[msg("TWAP period has not elapsed since the last update.")]
  TwapPeriodNotElapsed,
  #[msg("TWAP has no observations yet.")]
  TwapUninitialized,
  #[msg("Arithmetic error while computing TWAP quote.")]
  TwapArithmetic,
  #[msg("Operation is not supported by this feed kind.")]
  FeedKindMismatch,
  // `pool_parameters`
  #[msg("Pool parameters failed validation.")]
  InvalidParameters,
  // `fee_controller`
  #[msg("Arithmetic error during fee extraction.")]
  FeeExtraction,
  #[msg("Arithmetic error while computing stability fee.")]
  StabilityFee,
  // `conversion`
  #[msg("Arithmetic error in conversion from collateral to GMU value.")]
  CollateralToValue,
  #[msg("Arithmetic error in conversion from GMU value to collateral.")]
  ValueToCollateral,
  #[msg("Arithmetic error in conversion from share token to GMU value.")]
  ShareToValue,
  #[msg("Arithmetic error in conversion from GMU value to share token.")]
  ValueToShare,
  // `exchange_math`
  #[msg("Arithmetic error while computing mint amounts.")]
  MintArithmetic,
  #[msg("Arithmetic error while computing redeem amounts.")]
  RedeemArithmetic,
  // `rebalance_math`
  #[msg("Arithmetic error while computing target collateral value.")]
  TargetCollateralValue,
  #[msg("Arithmetic error while computing recollateralize amounts.")]
  RecollateralizeArithmetic,
  #[msg("Arithmetic error while computing buyback amounts.")]
  BuybackArithmetic,
}
