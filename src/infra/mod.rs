pub mod abi;
pub mod blockchain;
pub mod checkout;
pub mod config;
pub mod contracts;
pub mod loaders;
pub mod marketplace;
pub mod metrics;
