#![allow(clippy::missing_errors_doc)]
#![allow(clippy::wildcard_imports)]

pub mod auth;
pub mod context;
pub mod ledger;
pub mod pause;
pub mod pool;
pub mod prelude;
pub mod redemption;
