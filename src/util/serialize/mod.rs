mod chain;
mod hex;
mod u256;

pub use {self::chain::ChainId, self::hex::Hex, self::u256::U256};
