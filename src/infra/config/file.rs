use {
    crate::{
        domain::{eth, price},
        infra::marketplace,
        util::serialize,
    },
    bigdecimal::BigDecimal,
    serde::Deserialize,
    serde_with::serde_as,
    std::path::Path,
};

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Config {
    /// The chain purchases are executed on.
    #[serde_as(as = "serialize::ChainId")]
    chain_id: eth::ChainId,

    /// The base URL of the marketplace transaction-generation API.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    marketplace_endpoint: reqwest::Url,

    /// The fees collected on top of every purchase, applied independently
    /// against the subtotal.
    #[serde(default)]
    fee: Vec<Fee>,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct Fee {
    kind: FeeKind,

    /// The fee percentage. May be negative, which acts as a discount.
    #[serde_as(as = "serde_with::DisplayFromStr")]
    percentage: BigDecimal,

    label: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
enum FeeKind {
    Platform,
    Royalty,
    Gas,
    Custom,
}

impl From<FeeKind> for price::FeeKind {
    fn from(kind: FeeKind) -> Self {
        match kind {
            FeeKind::Platform => Self::Platform,
            FeeKind::Royalty => Self::Royalty,
            FeeKind::Gas => Self::Gas,
            FeeKind::Custom => Self::Custom,
        }
    }
}

/// Load the checkout configuration from a TOML file.
///
/// # Panics
///
/// This method panics if the config is invalid or on I/O errors.
pub async fn load(path: &Path) -> super::Config {
    let data = tokio::fs::read_to_string(path)
        .await
        .unwrap_or_else(|e| panic!("I/O error while reading {path:?}: {e:?}"));
    let config: Config = toml::de::from_str(&data)
        .unwrap_or_else(|e| panic!("TOML syntax error while reading {path:?}: {e:?}"));
    super::Config {
        chain_id: config.chain_id,
        marketplace: marketplace::Config {
            endpoint: config.marketplace_endpoint,
        },
        fees: config
            .fee
            .into_iter()
            .map(|fee| price::FeeConfig {
                kind: fee.kind.into(),
                percentage: fee.percentage,
                label: fee.label,
            })
            .collect(),
    }
}
