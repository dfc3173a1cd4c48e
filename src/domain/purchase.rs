//! The domain objects describing an incoming purchase request and its
//! classification.

use {
    crate::{domain::eth, util::serialize},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    std::fmt::{self, Display, Formatter},
};

/// A user-supplied purchase request.
///
/// The two shapes are distinguished exclusively by the literal `type` tag.
/// Classification never infers the shape from which optional fields happen to
/// be present, so a malformed request carrying fields of both shapes still
/// classifies by its tag alone.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PurchaseRequest {
    /// Buys an existing listed order on a secondary marketplace.
    #[serde(rename = "market")]
    Market(MarketPurchase),
    /// Mints a new token directly from a primary sales contract.
    #[serde(rename = "shop")]
    Shop(ShopPurchase),
}

impl PurchaseRequest {
    /// Classifies the request. This is a pure function of the discriminator
    /// tag.
    pub fn classify(&self) -> Classification {
        match self {
            Self::Market(_) => Classification::MarketBuy,
            Self::Shop(_) => Classification::PrimarySale,
        }
    }

    pub fn chain(&self) -> eth::ChainId {
        match self {
            Self::Market(market) => market.chain,
            Self::Shop(shop) => shop.chain,
        }
    }

    pub fn collection(&self) -> eth::ContractAddress {
        match self {
            Self::Market(market) => eth::ContractAddress(market.collection),
            Self::Shop(shop) => eth::ContractAddress(shop.collection),
        }
    }
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketPurchase {
    #[serde_as(as = "serialize::ChainId")]
    #[serde(rename = "chainId")]
    pub chain: eth::ChainId,
    #[serde(rename = "collectionAddress")]
    pub collection: eth::Address,
    pub order_id: OrderId,
    pub marketplace: MarketplaceKind,
    #[serde_as(as = "serialize::U256")]
    pub collectible_id: eth::U256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPurchase {
    #[serde_as(as = "serialize::ChainId")]
    #[serde(rename = "chainId")]
    pub chain: eth::ChainId,
    #[serde(rename = "collectionAddress")]
    pub collection: eth::Address,
    #[serde(rename = "salesContractAddress")]
    pub sales_contract: eth::Address,
    pub items: Vec<ShopItem>,
    pub price: ShopPrice,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    #[serde_as(as = "Option<serialize::U256>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<eth::U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
}

/// The advertised unit price of a primary sale, as a decimal string in the
/// given currency.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopPrice {
    pub amount: String,
    #[serde(rename = "currencyAddress")]
    pub currency: eth::Address,
}

/// The classification of a purchase request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Classification {
    /// A purchase of an existing order on a secondary marketplace.
    MarketBuy,
    /// A mint from a primary sales contract.
    PrimarySale,
}

/// The identifier of a listed order on a marketplace.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct OrderId(pub String);

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The marketplace an order was listed on.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketplaceKind {
    SequenceMarketplaceV1,
    SequenceMarketplaceV2,
    Opensea,
    LooksRare,
    Blur,
}

/// The token standard of a collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenStandard {
    /// Single-unit tokens; the purchase quantity is always 1.
    Erc721,
    /// Multi-unit tokens; the purchase quantity is user-selected.
    Erc1155,
}

impl TokenStandard {
    /// Whether the buy flow needs the user to pick a quantity. When this is
    /// `false` the flow silently locks the quantity to 1.
    pub fn requires_quantity_input(self) -> bool {
        match self {
            Self::Erc721 => false,
            Self::Erc1155 => true,
        }
    }
}

/// Collection-level data required before a purchase can proceed.
#[derive(Clone, Copy, Debug)]
pub struct CollectionInfo {
    pub address: eth::ContractAddress,
    pub chain: eth::ChainId,
    pub token_standard: TokenStandard,
    pub decimals: u8,
}
