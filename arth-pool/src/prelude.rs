//! Common imports for driving a pool.

pub use anchor_lang::prelude::{Pubkey, Result};
pub use arth_core::collateral_ratio::{CollateralRatioState, RatioBand, RatioSource};
pub use arth_core::host_clock::{BlockClock, HostClock};
pub use arth_core::pool_parameters::{PoolConfig, PoolParameters};
pub use arth_core::price_resolver::{PriceResolver, PriceSnapshot, PriceSource};
pub use fix::prelude::*;

pub use crate::auth::{AuthorizationPolicy, Roles};
pub use crate::context::CallContext;
pub use crate::ledger::{Batch, Ledger, TokenLedger, TokenSet};
pub use crate::pause::{Operation, PauseFlags};
pub use crate::pool::{CollateralPool, CollectReceipt, MintReceipt, RedeemReceipt};
pub use crate::redemption::PendingRedemption;
