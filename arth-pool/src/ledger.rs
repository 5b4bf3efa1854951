//! Token ledger capability and an in-memory implementation.
//!
//! The pool never owns token contracts. It drives four ledgers (stable,
//! share, collateral, fee token) through [`TokenLedger`], and applies every
//! call's movements through [`TokenSet::atomically`] so a failing transfer
//! leaves all four untouched. Each movement is journaled as it lands and
//! unwound in reverse on failure, so a rollback costs the movements made,
//! not the size of the ledgers.

use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use arth_core::error::CoreError::{
  InsufficientAllowance, InsufficientBalance, SupplyOverflow,
};

/// Balance, supply and movement operations of a fungible token.
pub trait TokenLedger {
  fn balance_of(&self, account: &Pubkey) -> u128;
  fn total_supply(&self) -> u128;
  fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128;
  fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128);
  fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()>;
  fn transfer_from(
    &mut self,
    spender: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()>;
  fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()>;
  fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()>;
  fn burn_from(&mut self, spender: &Pubkey, from: &Pubkey, amount: u128) -> Result<()>;
}

/// Map-backed ledger keeping `sum(balances) == supply`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
  balances: BTreeMap<Pubkey, u128>,
  allowances: BTreeMap<(Pubkey, Pubkey), u128>,
  supply: u128,
}

impl Ledger {
  #[must_use]
  pub fn new() -> Ledger {
    Ledger::default()
  }

  /// Sum of every balance, equal to supply after each operation.
  #[must_use]
  pub fn sum_of_balances(&self) -> u128 {
    self.balances.values().sum()
  }

  fn debit(&mut self, account: &Pubkey, amount: u128) -> Result<()> {
    let balance = self.balance_of(account);
    let next = balance.checked_sub(amount).ok_or_else(|| {
      error!(InsufficientBalance).with_values((balance, amount))
    })?;
    if next == 0 {
      self.balances.remove(account);
    } else {
      self.balances.insert(*account, next);
    }
    Ok(())
  }

  fn credit(&mut self, account: &Pubkey, amount: u128) -> Result<()> {
    if amount == 0 {
      return Ok(());
    }
    let next = self
      .balance_of(account)
      .checked_add(amount)
      .ok_or(SupplyOverflow)?;
    self.balances.insert(*account, next);
    Ok(())
  }

  fn require_balance(&self, account: &Pubkey, amount: u128) -> Result<()> {
    let balance = self.balance_of(account);
    if balance < amount {
      return Err(error!(InsufficientBalance).with_values((balance, amount)));
    }
    Ok(())
  }

  /// Spends allowance only once the owner's balance covers `amount`.
  fn spend_allowance(
    &mut self,
    owner: &Pubkey,
    spender: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    let allowed = self.allowance(owner, spender);
    let next = allowed.checked_sub(amount).ok_or_else(|| {
      error!(InsufficientAllowance).with_values((allowed, amount))
    })?;
    self.require_balance(owner, amount)?;
    self.approve(owner, spender, next);
    Ok(())
  }
}

impl TokenLedger for Ledger {
  fn balance_of(&self, account: &Pubkey) -> u128 {
    self.balances.get(account).copied().unwrap_or_default()
  }

  fn total_supply(&self) -> u128 {
    self.supply
  }

  fn allowance(&self, owner: &Pubkey, spender: &Pubkey) -> u128 {
    self
      .allowances
      .get(&(*owner, *spender))
      .copied()
      .unwrap_or_default()
  }

  fn approve(&mut self, owner: &Pubkey, spender: &Pubkey, amount: u128) {
    if amount == 0 {
      self.allowances.remove(&(*owner, *spender));
    } else {
      self.allowances.insert((*owner, *spender), amount);
    }
  }

  fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
    self.require_balance(from, amount)?;
    if from != to && self.balance_of(to).checked_add(amount).is_none() {
      return Err(SupplyOverflow.into());
    }
    self.debit(from, amount)?;
    self.credit(to, amount)
  }

  fn transfer_from(
    &mut self,
    spender: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    self.spend_allowance(from, spender, amount)?;
    self.transfer(from, to, amount)
  }

  fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
    self.supply = self.supply.checked_add(amount).ok_or(SupplyOverflow)?;
    self.credit(to, amount)
  }

  fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()> {
    self.debit(from, amount)?;
    self.supply = self.supply.checked_sub(amount).ok_or(SupplyOverflow)?;
    Ok(())
  }

  fn burn_from(&mut self, spender: &Pubkey, from: &Pubkey, amount: u128) -> Result<()> {
    self.spend_allowance(from, spender, amount)?;
    self.burn(from, amount)
  }
}

/// The four ledgers a pool call touches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenSet<L> {
  pub stable: L,
  pub share: L,
  pub collateral: L,
  pub fee: L,
}

impl<L: TokenLedger> TokenSet<L> {
  #[must_use]
  pub fn new(stable: L, share: L, collateral: L, fee: L) -> TokenSet<L> {
    TokenSet {
      stable,
      share,
      collateral,
      fee,
    }
  }

  /// Runs `apply` against the ledgers, unwinding its movements if it fails.
  ///
  /// # Errors
  /// * The first failing movement, after every earlier one is reverted
  pub fn atomically<T>(
    &mut self,
    apply: impl FnOnce(&mut Batch<'_, L>) -> Result<T>,
  ) -> Result<T> {
    let mut batch = Batch {
      stable: Journaled::new(&mut self.stable),
      share: Journaled::new(&mut self.share),
      collateral: Journaled::new(&mut self.collateral),
      fee: Journaled::new(&mut self.fee),
    };
    match apply(&mut batch) {
      Ok(out) => Ok(out),
      Err(err) => {
        batch.revert()?;
        Err(err)
      }
    }
  }
}

/// A movement already applied to a ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Movement {
  Transfer {
    from: Pubkey,
    to: Pubkey,
    amount: u128,
  },
  TransferFrom {
    spender: Pubkey,
    from: Pubkey,
    to: Pubkey,
    amount: u128,
  },
  Mint {
    to: Pubkey,
    amount: u128,
  },
  Burn {
    from: Pubkey,
    amount: u128,
  },
  BurnFrom {
    spender: Pubkey,
    from: Pubkey,
    amount: u128,
  },
}

impl Movement {
  fn revert<L: TokenLedger>(self, ledger: &mut L) -> Result<()> {
    match self {
      Movement::Transfer { from, to, amount } => ledger.transfer(&to, &from, amount),
      Movement::TransferFrom {
        spender,
        from,
        to,
        amount,
      } => {
        ledger.transfer(&to, &from, amount)?;
        restore_allowance(ledger, &from, &spender, amount);
        Ok(())
      }
      Movement::Mint { to, amount } => ledger.burn(&to, amount),
      Movement::Burn { from, amount } => ledger.mint(&from, amount),
      Movement::BurnFrom {
        spender,
        from,
        amount,
      } => {
        ledger.mint(&from, amount)?;
        restore_allowance(ledger, &from, &spender, amount);
        Ok(())
      }
    }
  }
}

fn restore_allowance<L: TokenLedger>(
  ledger: &mut L,
  owner: &Pubkey,
  spender: &Pubkey,
  amount: u128,
) {
  let allowed = ledger.allowance(owner, spender).saturating_add(amount);
  ledger.approve(owner, spender, allowed);
}

/// Ledger handle that records every movement it applies.
pub struct Journaled<'a, L> {
  ledger: &'a mut L,
  applied: Vec<Movement>,
}

impl<'a, L: TokenLedger> Journaled<'a, L> {
  fn new(ledger: &'a mut L) -> Journaled<'a, L> {
    Journaled {
      ledger,
      applied: Vec::new(),
    }
  }

  #[must_use]
  pub fn balance_of(&self, account: &Pubkey) -> u128 {
    self.ledger.balance_of(account)
  }

  pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
    self.ledger.transfer(from, to, amount)?;
    self.applied.push(Movement::Transfer {
      from: *from,
      to: *to,
      amount,
    });
    Ok(())
  }

  pub fn transfer_from(
    &mut self,
    spender: &Pubkey,
    from: &Pubkey,
    to: &Pubkey,
    amount: u128,
  ) -> Result<()> {
    self.ledger.transfer_from(spender, from, to, amount)?;
    self.applied.push(Movement::TransferFrom {
      spender: *spender,
      from: *from,
      to: *to,
      amount,
    });
    Ok(())
  }

  pub fn mint(&mut self, to: &Pubkey, amount: u128) -> Result<()> {
    self.ledger.mint(to, amount)?;
    self.applied.push(Movement::Mint { to: *to, amount });
    Ok(())
  }

  pub fn burn(&mut self, from: &Pubkey, amount: u128) -> Result<()> {
    self.ledger.burn(from, amount)?;
    self.applied.push(Movement::Burn {
      from: *from,
      amount,
    });
    Ok(())
  }

  pub fn burn_from(&mut self, spender: &Pubkey, from: &Pubkey, amount: u128) -> Result<()> {
    self.ledger.burn_from(spender, from, amount)?;
    self.applied.push(Movement::BurnFrom {
      spender: *spender,
      from: *from,
      amount,
    });
    Ok(())
  }

  fn revert(&mut self) -> Result<()> {
    while let Some(movement) = self.applied.pop() {
      movement.revert(self.ledger)?;
    }
    Ok(())
  }
}

/// Journaled handles to the four ledgers for the span of one call.
pub struct Batch<'a, L> {
  pub stable: Journaled<'a, L>,
  pub share: Journaled<'a, L>,
  pub collateral: Journaled<'a, L>,
  pub fee: Journaled<'a, L>,
}

impl<L: TokenLedger> Batch<'_, L> {
  fn revert(&mut self) -> Result<()> {
    self.stable.revert()?;
    self.share.revert()?;
    self.collateral.revert()?;
    self.fee.revert()
  }
}
