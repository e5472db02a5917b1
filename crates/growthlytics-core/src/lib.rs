pub mod analytics;
pub mod config;
pub mod error;
pub mod install;
pub mod ledger;
pub mod normalize;
