use anchor_lang::prelude::*;
use arth_core::error::CoreError::Unauthorized;

/// Role checks consulted by every privileged pool call.
pub trait AuthorizationPolicy {
  /// Owner or governance timelock.
  fn can_govern(&self, caller: &Pubkey) -> bool;
  /// Owner, an admin, or governance timelock.
  fn can_administer(&self, caller: &Pubkey) -> bool;
}

pub fn require_governance<A: AuthorizationPolicy>(
  policy: &A,
  caller: &Pubkey,
) -> Result<()> {
  if policy.can_govern(caller) {
    Ok(())
  } else {
    Err(Unauthorized.into())
  }
}

pub fn require_admin<A: AuthorizationPolicy>(
  policy: &A,
  caller: &Pubkey,
) -> Result<()> {
  if policy.can_administer(caller) {
    Ok(())
  } else {
    Err(Unauthorized.into())
  }
}

/// Owner, timelock and admin set of a pool.
#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct Roles {
  owner: Pubkey,
  timelock: Pubkey,
  admins: Vec<Pubkey>,
}

impl Roles {
  #[must_use]
  pub fn new(owner: Pubkey, timelock: Pubkey) -> Roles {
    Roles {
      owner,
      timelock,
      admins: Vec::new(),
    }
  }

  #[must_use]
  pub fn owner(&self) -> Pubkey {
    self.owner
  }

  #[must_use]
  pub fn timelock(&self) -> Pubkey {
    self.timelock
  }

  #[must_use]
  pub fn admins(&self) -> &[Pubkey] {
    &self.admins
  }

  pub fn set_owner(&mut self, caller: &Pubkey, owner: Pubkey) -> Result<()> {
    require_governance(&*self, caller)?;
    self.owner = owner;
    Ok(())
  }

  pub fn set_timelock(&mut self, caller: &Pubkey, timelock: Pubkey) -> Result<()> {
    require_governance(&*self, caller)?;
    self.timelock = timelock;
    Ok(())
  }

  /// Adds an admin, ignoring duplicates.
  pub fn add_admin(&mut self, caller: &Pubkey, admin: Pubkey) -> Result<()> {
    require_governance(&*self, caller)?;
    if !self.admins.contains(&admin) {
      self.admins.push(admin);
    }
    Ok(())
  }

  pub fn remove_admin(&mut self, caller: &Pubkey, admin: &Pubkey) -> Result<()> {
    require_governance(&*self, caller)?;
    self.admins.retain(|a| a != admin);
    Ok(())
  }
}

impl AuthorizationPolicy for Roles {
  fn can_govern(&self, caller: &Pubkey) -> bool {
    *caller == self.owner || *caller == self.timelock
  }

  fn can_administer(&self, caller: &Pubkey) -> bool {
    self.can_govern(caller) || self.admins.contains(caller)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(b: u8) -> Pubkey {
    Pubkey::new_from_array([b; 32])
  }

  #[test]
  fn tiers() -> Result<()> {
    let (owner, timelock, admin, stranger) = (key(1), key(2), key(3), key(4));
    let mut roles = Roles::new(owner, timelock);
    roles.add_admin(&timelock, admin)?;
    assert!(roles.can_govern(&owner) && roles.can_govern(&timelock));
    assert!(!roles.can_govern(&admin));
    assert!(roles.can_administer(&admin));
    assert!(!roles.can_administer(&stranger));
    assert!(require_admin(&roles, &admin).is_ok());
    let denied = require_governance(&roles, &admin);
    assert!(denied.is_err_and(|e| e == Unauthorized.into()));
    Ok(())
  }

  #[test]
  fn role_management_requires_governance() -> Result<()> {
    let (owner, timelock, admin) = (key(1), key(2), key(3));
    let mut roles = Roles::new(owner, timelock);
    roles.add_admin(&owner, admin)?;
    roles.add_admin(&owner, admin)?;
    assert_eq!(roles.admins(), &[admin]);
    let escalate = roles.set_owner(&admin, admin);
    assert!(escalate.is_err_and(|e| e == Unauthorized.into()));
    roles.set_timelock(&owner, key(9))?;
    assert!(!roles.can_govern(&timelock));
    roles.remove_admin(&key(9), &admin)?;
    assert!(roles.admins().is_empty());
    roles.set_owner(&owner, key(5))?;
    assert_eq!(roles.owner(), key(5));
    Ok(())
  }
}
