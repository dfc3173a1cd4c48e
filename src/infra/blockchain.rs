//! The capability for reading contract state. The buy flow never talks to an
//! RPC node directly; it goes through this trait so tests can substitute
//! canned responses and hosts can plug in whatever transport they already
//! run.

use {
    crate::{domain::eth, infra::contracts::IERC20},
    alloy::sol_types::SolCall,
};

/// Executes read-only contract calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ContractReader: Send + Sync {
    /// Executes an `eth_call` against the given contract and returns the raw
    /// return data.
    async fn call(
        &self,
        chain: eth::ChainId,
        to: eth::ContractAddress,
        calldata: Vec<u8>,
    ) -> Result<Vec<u8>, Error>;
}

/// Reads the current ERC-20 allowance granted by `owner` to `spender`.
pub async fn allowance(
    reader: &dyn ContractReader,
    chain: eth::ChainId,
    token: eth::TokenAddress,
    owner: eth::Address,
    spender: eth::ContractAddress,
) -> Result<eth::U256, Error> {
    let calldata = IERC20::allowanceCall {
        owner,
        spender: spender.0,
    }
    .abi_encode();
    let output = reader
        .call(chain, eth::ContractAddress(token.0), calldata)
        .await?;
    IERC20::allowanceCall::abi_decode_returns(&output)
        .map_err(|err| Error::Decode(format!("allowance({token:?}): {err}")))
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport failed before the call reached the node. The
    /// `retryable` flag is set by the transport, never guessed here.
    #[error("rpc transport error (retryable: {retryable}): {message}")]
    Network { retryable: bool, message: String },
    /// The node executed the call and it reverted.
    #[error("contract call reverted: {0}")]
    Reverted(String),
    /// The call succeeded but returned data of an unexpected shape.
    #[error("failed to decode call output: {0}")]
    Decode(String),
}
