mod chain;

pub use {
    self::chain::{ChainId, UnsupportedChain},
    alloy::primitives::{Address, B256, U256},
};

/// A contract address.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ContractAddress(pub Address);

impl From<Address> for ContractAddress {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// An ERC20 token address.
///
/// https://eips.ethereum.org/EIPS/eip-20
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TokenAddress(pub Address);

impl TokenAddress {
    /// Whether this address is the sentinel for the chain's native currency.
    /// Sales contracts use the zero address to mean "pay in the native token".
    pub fn is_native(&self) -> bool {
        self.0 == Address::ZERO
    }

    pub fn native() -> Self {
        Self(Address::ZERO)
    }
}

impl From<Address> for TokenAddress {
    fn from(inner: Address) -> Self {
        Self(inner)
    }
}

/// An Ether amount in wei.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ether(pub U256);

impl From<U256> for Ether {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

/// The hash of a broadcast transaction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TxHash(pub B256);

impl From<B256> for TxHash {
    fn from(inner: B256) -> Self {
        Self(inner)
    }
}
