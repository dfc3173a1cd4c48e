//! End-to-end tests of the buy flow against mocked collaborators.

pub mod market;
pub mod mock;
pub mod shop;

use {
    crate::{
        domain::{
            eth,
            flow::{BuyFlow, Error, Handlers, Success},
            price::FeeConfig,
            purchase::{CollectionInfo, TokenStandard},
        },
        infra::{
            self,
            blockchain::MockContractReader,
            loaders::MockDataLoaders,
            marketplace,
        },
    },
    std::sync::{Arc, Mutex},
};

pub const CHAIN: eth::ChainId = eth::ChainId::Polygon;

pub fn buyer() -> eth::Address {
    eth::Address::repeat_byte(0x22)
}

pub fn collection_address() -> eth::ContractAddress {
    eth::ContractAddress(eth::Address::repeat_byte(0x11))
}

pub fn currency_address() -> eth::TokenAddress {
    eth::TokenAddress(eth::Address::repeat_byte(0x33))
}

pub fn sales_contract() -> eth::ContractAddress {
    eth::ContractAddress(eth::Address::repeat_byte(0x44))
}

pub fn collection(standard: TokenStandard) -> CollectionInfo {
    CollectionInfo {
        address: collection_address(),
        chain: CHAIN,
        token_standard: standard,
        decimals: 0,
    }
}

/// Builds a flow wired up to the given mocks. `endpoint` is only contacted
/// by market purchases.
pub fn flow(
    endpoint: reqwest::Url,
    fees: Vec<FeeConfig>,
    loaders: MockDataLoaders,
    reader: MockContractReader,
) -> BuyFlow {
    BuyFlow::new(
        &infra::config::Config {
            chain_id: CHAIN,
            marketplace: marketplace::Config { endpoint },
            fees,
        },
        Arc::new(loaders),
        Arc::new(reader),
    )
}

/// An endpoint for tests that never reach the marketplace API.
pub fn unused_endpoint() -> reqwest::Url {
    "http://localhost:1/".parse().unwrap()
}

/// Records every completion callback the flow fires.
#[derive(Clone, Default)]
pub struct Recorder {
    successes: Arc<Mutex<Vec<Success>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> (Self, Handlers) {
        let recorder = Self::default();
        let handlers = Handlers {
            on_success: {
                let successes = recorder.successes.clone();
                Arc::new(move |success| successes.lock().unwrap().push(success))
            },
            on_error: {
                let errors = recorder.errors.clone();
                Arc::new(move |error: &Error| errors.lock().unwrap().push(error.to_string()))
            },
        };
        (recorder, handlers)
    }

    pub fn successes(&self) -> Vec<Success> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}
