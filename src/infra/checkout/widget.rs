//! The inline swap widget backend. The host embeds a widget that swaps
//! whatever the buyer holds into the payment currency and then executes the
//! prepared calldata in the same flow.

use crate::domain::eth;

/// Everything the widget needs to take over the purchase.
#[derive(Clone, Debug)]
pub struct Params {
    pub to_chain: eth::ChainId,
    /// The contract the widget must call after swapping.
    pub to_address: eth::ContractAddress,
    /// The currency the swap must produce.
    pub to_token: eth::TokenAddress,
    /// The prepared calldata the widget executes once funded.
    pub to_calldata: Vec<u8>,
    /// The exact amount of `to_token` the calldata requires.
    pub to_amount: eth::U256,
}

/// An embedded swap-and-execute widget supplied by the host.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SwapWidget: Send + Sync {
    /// Hands the purchase over to the widget. Resolves once the widget has
    /// accepted the parameters and taken over the UI, not when the purchase
    /// completes.
    async fn open(&self, params: Params) -> Result<(), Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("swap widget rejected the handoff: {0}")]
    Rejected(String),
    #[error("swap widget unavailable: {0}")]
    Unavailable(String),
}
