//! The hosted payment modal backend. An external provider renders its own
//! payment UI (card rails, onramp) and executes the prepared transaction on
//! the buyer's behalf once payment settles.

use crate::domain::eth;

/// A collectible line item shown in the provider's UI.
#[derive(Clone, Debug)]
pub struct CollectibleItem {
    pub token_id: eth::U256,
    pub quantity: u64,
    /// The raw unit price in the payment currency.
    pub price: eth::U256,
}

#[derive(Clone, Debug)]
pub struct Params {
    pub chain: eth::ChainId,
    pub collectibles: Vec<CollectibleItem>,
    /// The currency the target contract is paid in.
    pub currency: eth::TokenAddress,
    /// The raw total the provider must cover, fees included.
    pub price: eth::U256,
    /// The contract the provider calls after collecting payment.
    pub target_contract: eth::ContractAddress,
    /// The prepared calldata for that call.
    pub tx_data: Vec<u8>,
    /// The account that receives the purchased collectibles.
    pub recipient: eth::Address,
}

/// A provider-hosted payment modal supplied by the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PaymentModal: Send + Sync {
    /// Opens the provider's modal. Resolves once the provider has accepted
    /// the parameters; payment and execution continue in the provider's UI.
    async fn open(&self, params: Params) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("payment provider rejected the purchase: {0}")]
    Rejected(String),
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
}
