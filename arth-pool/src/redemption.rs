use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use arth_core::error::CoreError::{ClaimNotFound, ClaimNotReady, ClaimOverflow};

/// Per-account claim created by redemption requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize, InitSpace)]
pub struct PendingRedemption {
  pub collateral_owed: u128,
  pub share_owed: u128,
  pub request_height: u64,
  pub collected: bool,
}

impl PendingRedemption {
  /// Uncollected with something owed.
  #[must_use]
  pub fn is_outstanding(&self) -> bool {
    !self.collected && (self.collateral_owed > 0 || self.share_owed > 0)
  }

  /// First height at which the claim can be collected.
  #[must_use]
  pub fn ready_at(&self, delay_blocks: u64) -> u64 {
    self.request_height.saturating_add(delay_blocks)
  }

  /// Adds a new request into this claim. The delay restarts at `height`.
  pub fn accumulate(
    &self,
    collateral_owed: u128,
    share_owed: u128,
    height: u64,
  ) -> Result<PendingRedemption> {
    let base = if self.collected {
      PendingRedemption::default()
    } else {
      *self
    };
    Ok(PendingRedemption {
      collateral_owed: base
        .collateral_owed
        .checked_add(collateral_owed)
        .ok_or(ClaimOverflow)?,
      share_owed: base.share_owed.checked_add(share_owed).ok_or(ClaimOverflow)?,
      request_height: height,
      collected: false,
    })
  }
}

/// A claim change validated against the ledger but not yet written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagedClaim {
  pub account: Pubkey,
  /// Record as it will be stored.
  pub record: PendingRedemption,
  /// Amounts moving with this change.
  pub collateral: u128,
  pub share: u128,
  unclaimed_collateral: u128,
  unclaimed_share: u128,
}

/// Pending-claim table with aggregate unclaimed totals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RedemptionLedger {
  claims: BTreeMap<Pubkey, PendingRedemption>,
  unclaimed_collateral: u128,
  unclaimed_share: u128,
}

impl RedemptionLedger {
  #[must_use]
  pub fn new() -> RedemptionLedger {
    RedemptionLedger::default()
  }

  /// Current record for an account, empty if it never redeemed.
  #[must_use]
  pub fn pending(&self, account: &Pubkey) -> PendingRedemption {
    self.claims.get(account).copied().unwrap_or_default()
  }

  #[must_use]
  pub fn unclaimed_collateral(&self) -> u128 {
    self.unclaimed_collateral
  }

  #[must_use]
  pub fn unclaimed_share(&self) -> u128 {
    self.unclaimed_share
  }

  /// Validates accumulating a request into `account`'s claim.
  pub fn stage_request(
    &self,
    account: &Pubkey,
    collateral_owed: u128,
    share_owed: u128,
    height: u64,
  ) -> Result<StagedClaim> {
    let record = self
      .pending(account)
      .accumulate(collateral_owed, share_owed, height)?;
    Ok(StagedClaim {
      account: *account,
      record,
      collateral: collateral_owed,
      share: share_owed,
      unclaimed_collateral: self
        .unclaimed_collateral
        .checked_add(collateral_owed)
        .ok_or(ClaimOverflow)?,
      unclaimed_share: self
        .unclaimed_share
        .checked_add(share_owed)
        .ok_or(ClaimOverflow)?,
    })
  }

  /// Validates collecting `account`'s claim at `height`.
  ///
  /// # Errors
  /// * No outstanding claim
  /// * Delay not yet elapsed, reporting current and ready heights
  pub fn stage_collect(
    &self,
    account: &Pubkey,
    height: u64,
    delay_blocks: u64,
  ) -> Result<StagedClaim> {
    let claim = self.pending(account);
    if !claim.is_outstanding() {
      return Err(ClaimNotFound.into());
    }
    require_gte!(height, claim.ready_at(delay_blocks), ClaimNotReady);
    Ok(StagedClaim {
      account: *account,
      record: PendingRedemption {
        collateral_owed: 0,
        share_owed: 0,
        request_height: claim.request_height,
        collected: true,
      },
      collateral: claim.collateral_owed,
      share: claim.share_owed,
      unclaimed_collateral: self
        .unclaimed_collateral
        .checked_sub(claim.collateral_owed)
        .ok_or(ClaimOverflow)?,
      unclaimed_share: self
        .unclaimed_share
        .checked_sub(claim.share_owed)
        .ok_or(ClaimOverflow)?,
    })
  }

  /// Writes a staged change.
  pub fn commit(&mut self, staged: StagedClaim) {
    self.claims.insert(staged.account, staged.record);
    self.unclaimed_collateral = staged.unclaimed_collateral;
    self.unclaimed_share = staged.unclaimed_share;
  }
}
