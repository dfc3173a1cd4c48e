//! The direct send backend. The buyer already holds the payment currency, so
//! the prepared steps are submitted to their wallet as-is.

use crate::domain::eth;

/// A transaction ready for wallet submission.
#[derive(Clone, Debug)]
pub struct Transaction {
    pub chain: eth::ChainId,
    pub to: eth::ContractAddress,
    pub data: Vec<u8>,
    pub value: eth::Ether,
}

/// Submits transactions through the buyer's wallet.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TransactionSender: Send + Sync {
    /// Prompts the wallet to sign and submit the transaction. Resolves with
    /// the transaction hash once submitted.
    async fn send(&self, tx: Transaction) -> Result<eth::TxHash, Error>;

    /// Waits until the transaction is mined and reports whether it
    /// succeeded.
    async fn wait_for_receipt(&self, chain: eth::ChainId, hash: eth::TxHash)
    -> Result<bool, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The buyer dismissed the wallet prompt.
    #[error("transaction rejected in wallet")]
    Rejected,
    #[error("wallet transport error: {0}")]
    Network(String),
    /// The transaction was mined but reverted.
    #[error("transaction {0:?} reverted on chain")]
    Reverted(eth::TxHash),
}
