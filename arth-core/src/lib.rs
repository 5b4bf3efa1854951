#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod collateral_ratio;
pub mod conversion;
pub mod error;
pub mod exchange_math;
pub mod fee_controller;
pub mod host_clock;
pub mod oracle;
pub mod pool_parameters;
pub mod price_resolver;
pub mod rebalance_math;
pub mod reference_feed;
pub mod slippage;
pub mod token_math;
