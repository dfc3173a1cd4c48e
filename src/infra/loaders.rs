//! Read-only data loading capabilities the buy flow depends on.
//!
//! Implementations are external collaborators (indexer, metadata and token
//! API clients); the flow only cares that each query loads independently and
//! reports its own failures. Caching, batching and retry policy all belong
//! to the implementation, not to this interface.

use crate::domain::{
    eth,
    purchase::{CollectionInfo, MarketplaceKind, OrderId},
};

/// A listed order on a secondary marketplace.
#[derive(Clone, Debug)]
pub struct Order {
    pub id: OrderId,
    pub marketplace: MarketplaceKind,
    pub token_id: eth::U256,
    /// The unit price in raw units of `currency`.
    pub price_amount: eth::U256,
    pub currency: eth::TokenAddress,
    /// How many units of the order are still available to fill.
    pub quantity_available: u64,
}

/// Metadata of a payment currency.
#[derive(Clone, Debug)]
pub struct Currency {
    pub address: eth::TokenAddress,
    pub symbol: String,
    pub decimals: u8,
    pub native: bool,
}

/// Display metadata of a single collectible.
#[derive(Clone, Debug)]
pub struct TokenMetadata {
    pub name: String,
    pub image: Option<String>,
    pub decimals: Option<u8>,
}

/// A currency balance of some account.
#[derive(Clone, Debug)]
pub struct Balance {
    pub raw: eth::U256,
    pub formatted: String,
}

/// The read queries required before a purchase can proceed. Each query is
/// independently cacheable and independently loading/erroring.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DataLoaders: Send + Sync {
    async fn collection(
        &self,
        chain: eth::ChainId,
        address: eth::ContractAddress,
    ) -> Result<CollectionInfo, Error>;

    async fn order(
        &self,
        chain: eth::ChainId,
        collection: eth::ContractAddress,
        order_id: OrderId,
        marketplace: MarketplaceKind,
    ) -> Result<Order, Error>;

    async fn currency(
        &self,
        chain: eth::ChainId,
        address: eth::TokenAddress,
    ) -> Result<Currency, Error>;

    async fn token_metadata(
        &self,
        chain: eth::ChainId,
        collection: eth::ContractAddress,
        token_id: eth::U256,
    ) -> Result<TokenMetadata, Error>;

    async fn balance(
        &self,
        chain: eth::ChainId,
        owner: eth::Address,
        currency: eth::TokenAddress,
    ) -> Result<Balance, Error>;
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
    /// The transport failed. The `retryable` flag is set by the collaborator
    /// that owns the transport.
    #[error("loader transport error (retryable: {retryable}): {message}")]
    Network { retryable: bool, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("loader error: {0}")]
    Other(String),
}
