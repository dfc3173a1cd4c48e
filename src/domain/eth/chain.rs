/// A supported Ethereum Chain ID.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChainId {
    Mainnet = 1,
    Optimism = 10,
    Bnb = 56,
    Gnosis = 100,
    Polygon = 137,
    Base = 8453,
    ArbitrumOne = 42161,
    Avalanche = 43114,
}

impl ChainId {
    pub fn new(value: u64) -> Result<Self, UnsupportedChain> {
        match value {
            1 => Ok(Self::Mainnet),
            10 => Ok(Self::Optimism),
            56 => Ok(Self::Bnb),
            100 => Ok(Self::Gnosis),
            137 => Ok(Self::Polygon),
            8453 => Ok(Self::Base),
            42161 => Ok(Self::ArbitrumOne),
            43114 => Ok(Self::Avalanche),
            _ => Err(UnsupportedChain),
        }
    }

    /// Returns the chain ID as a numeric value.
    pub fn value(self) -> u64 {
        self as u64
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unsupported chain")]
pub struct UnsupportedChain;
