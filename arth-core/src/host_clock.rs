use anchor_lang::prelude::*;

/// Abstracts the host's notion of time: discrete block heights plus a unix
/// timestamp for oracle freshness.
pub trait HostClock {
  fn height(&self) -> u64;
  fn unix_timestamp(&self) -> i64;
}

impl HostClock for Clock {
  fn height(&self) -> u64 {
    self.slot
  }

  fn unix_timestamp(&self) -> i64 {
    self.unix_timestamp
  }
}

/// Plain clock for hosts that track heights themselves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct BlockClock {
  pub height: u64,
  pub timestamp: i64,
}

impl BlockClock {
  #[must_use]
  pub fn new(height: u64, timestamp: i64) -> BlockClock {
    BlockClock { height, timestamp }
  }

  /// Moves forward by `blocks` heights and `secs` seconds.
  #[must_use]
  pub fn advance(self, blocks: u64, secs: i64) -> BlockClock {
    BlockClock {
      height: self.height.saturating_add(blocks),
      timestamp: self.timestamp.saturating_add(secs),
    }
  }
}

impl HostClock for BlockClock {
  fn height(&self) -> u64 {
    self.height
  }

  fn unix_timestamp(&self) -> i64 {
    self.timestamp
  }
}
