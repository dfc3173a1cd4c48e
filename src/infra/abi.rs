//! Runtime detection of the sales contract ABI version.
//!
//! Two differently shaped interfaces of the same sales-contract family are
//! deployed in the wild, and nothing on-chain announces which one a given
//! address implements. The resolver finds out by issuing a speculative read
//! of the V1-shaped sale-details function and falling back to the V0 shape
//! only when that fails. Probes are sent without retries so that an ABI
//! mismatch is distinguished quickly from a transient transport failure;
//! retrying belongs to the transport, not here.

use {
    crate::{
        domain::{eth, purchase::TokenStandard},
        infra::{
            blockchain::{self, ContractReader},
            contracts,
        },
    },
    alloy::sol_types::SolCall,
    std::sync::Arc,
};

/// The detected shape of a deployed sales contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SalesContractVersion {
    V0,
    V1,
}

const CACHE_SIZE: u64 = 100;

/// Detects and caches sales contract versions per `(chain, contract)`.
pub struct Resolver {
    reader: Arc<dyn ContractReader>,
    cache: moka::future::Cache<(eth::ChainId, eth::ContractAddress), SalesContractVersion>,
}

impl Resolver {
    pub fn new(reader: Arc<dyn ContractReader>) -> Self {
        Self {
            reader,
            cache: moka::future::Cache::new(CACHE_SIZE),
        }
    }

    /// Resolves the ABI version of the sales contract at `contract`. Results
    /// are cached for the lifetime of the purchase flow; the same contract is
    /// never re-probed unless [`Resolver::invalidate`] is called.
    pub async fn resolve(
        &self,
        chain: eth::ChainId,
        contract: eth::ContractAddress,
        standard: TokenStandard,
    ) -> Result<SalesContractVersion, Error> {
        let key = (chain, contract);
        if let Some(version) = self.cache.get(&key).await {
            return Ok(version);
        }

        let version = self.probe(chain, contract, standard).await?;
        self.cache.insert(key, version).await;
        Ok(version)
    }

    /// Drops a cached resolution so the next [`Resolver::resolve`] probes
    /// again.
    pub async fn invalidate(&self, chain: eth::ChainId, contract: eth::ContractAddress) {
        self.cache.invalidate(&(chain, contract)).await;
    }

    async fn probe(
        &self,
        chain: eth::ChainId,
        contract: eth::ContractAddress,
        standard: TokenStandard,
    ) -> Result<SalesContractVersion, Error> {
        let v1 = match self
            .probe_version(chain, contract, standard, SalesContractVersion::V1)
            .await
        {
            Ok(()) => return Ok(SalesContractVersion::V1),
            Err(err) => err,
        };

        match self
            .probe_version(chain, contract, standard, SalesContractVersion::V0)
            .await
        {
            Ok(()) => {
                tracing::debug!(?contract, "V1 probe failed; contract resolved as V0");
                Ok(SalesContractVersion::V0)
            }
            Err(v0) => Err(Error::Unresolved {
                contract,
                method: probe_method(standard, SalesContractVersion::V1),
                v1: Box::new(v1),
                v0: Box::new(v0),
            }),
        }
    }

    /// Issues one speculative sale-details read with the given version's
    /// shape. The probe only passes if the call succeeds *and* the returned
    /// data decodes as that shape; for ERC-721 contracts both versions share
    /// the function name and differ only in the return layout.
    async fn probe_version(
        &self,
        chain: eth::ChainId,
        contract: eth::ContractAddress,
        standard: TokenStandard,
        version: SalesContractVersion,
    ) -> Result<(), ProbeError> {
        use {SalesContractVersion::*, TokenStandard::*, contracts::*};

        let calldata = match (standard, version) {
            (Erc1155, V1) => IERC1155SaleV1::tokenSaleDetailsCall {
                tokenId: eth::U256::ZERO,
            }
            .abi_encode(),
            (Erc1155, V0) => IERC1155SaleV0::globalSaleDetailsCall {}.abi_encode(),
            (Erc721, V1) => IERC721SaleV1::saleDetailsCall {}.abi_encode(),
            (Erc721, V0) => IERC721SaleV0::saleDetailsCall {}.abi_encode(),
        };

        let output = self.reader.call(chain, contract, calldata).await?;
        match (standard, version) {
            (Erc1155, V1) => {
                IERC1155SaleV1::tokenSaleDetailsCall::abi_decode_returns(&output).map(|_| ())
            }
            (Erc1155, V0) => {
                IERC1155SaleV0::globalSaleDetailsCall::abi_decode_returns(&output).map(|_| ())
            }
            (Erc721, V1) => IERC721SaleV1::saleDetailsCall::abi_decode_returns(&output).map(|_| ()),
            (Erc721, V0) => IERC721SaleV0::saleDetailsCall::abi_decode_returns(&output).map(|_| ()),
        }
        .map_err(ProbeError::Shape)
    }
}

fn probe_method(standard: TokenStandard, version: SalesContractVersion) -> &'static str {
    match (standard, version) {
        (TokenStandard::Erc1155, SalesContractVersion::V1) => "tokenSaleDetails",
        (TokenStandard::Erc1155, SalesContractVersion::V0) => "globalSaleDetails",
        (TokenStandard::Erc721, _) => "saleDetails",
    }
}

/// A single failed probe.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error(transparent)]
    Read(#[from] blockchain::Error),
    #[error("unexpected return shape: {0}")]
    Shape(alloy::sol_types::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Both probe shapes were rejected by the deployed contract. Carries
    /// both underlying failures.
    #[error("could not determine sales contract version for {contract:?} via {method}")]
    Unresolved {
        contract: eth::ContractAddress,
        method: &'static str,
        v1: Box<ProbeError>,
        v0: Box<ProbeError>,
    },
}
