//! DTOs for the marketplace transaction-generation API.

use {
    crate::{domain::eth, domain::purchase, util::serialize},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
};

/// A request to the `generate-buy-transaction` endpoint.
#[serde_as]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBuyTransaction {
    pub collection_address: eth::Address,

    /// The account that will execute the returned steps.
    pub buyer: eth::Address,

    pub marketplace: Marketplace,

    pub orders: Vec<Order>,

    /// Raw fee amounts to collect on top of the order price, in the order's
    /// currency.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub additional_fees: Vec<String>,
}

#[serde_as]
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,

    #[serde_as(as = "serialize::U256")]
    pub quantity: eth::U256,

    #[serde_as(as = "serialize::U256")]
    pub token_id: eth::U256,
}

/// The marketplace identifier in the API's wire vocabulary.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marketplace {
    SequenceMarketplaceV1,
    SequenceMarketplaceV2,
    Opensea,
    LooksRare,
    Blur,
}

impl From<purchase::MarketplaceKind> for Marketplace {
    fn from(kind: purchase::MarketplaceKind) -> Self {
        match kind {
            purchase::MarketplaceKind::SequenceMarketplaceV1 => Self::SequenceMarketplaceV1,
            purchase::MarketplaceKind::SequenceMarketplaceV2 => Self::SequenceMarketplaceV2,
            purchase::MarketplaceKind::Opensea => Self::Opensea,
            purchase::MarketplaceKind::LooksRare => Self::LooksRare,
            purchase::MarketplaceKind::Blur => Self::Blur,
        }
    }
}

/// The response of the `generate-buy-transaction` endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Steps {
    pub steps: Vec<Step>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: StepId,

    pub to: eth::Address,

    #[serde_as(as = "serialize::Hex")]
    pub data: Vec<u8>,

    #[serde_as(as = "serialize::U256")]
    #[serde(default)]
    pub value: eth::U256,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
pub enum StepId {
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "tokenApproval")]
    TokenApproval,
    #[serde(rename = "signEIP712")]
    Signature,
    #[serde(other)]
    Unknown,
}

/// A structured error returned by the marketplace API.
#[derive(Clone, Debug, Deserialize, thiserror::Error)]
#[error("marketplace API error {code}: {msg}")]
pub struct Error {
    pub code: i64,
    pub msg: String,
}
