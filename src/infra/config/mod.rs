pub mod file;

use crate::{domain::eth, domain::price, infra::marketplace};

#[derive(Clone, Debug)]
pub struct Config {
    /// The chain purchases are executed on.
    pub chain_id: eth::ChainId,

    /// The marketplace transaction-generation API.
    pub marketplace: marketplace::Config,

    /// The fees collected on top of every purchase.
    pub fees: Vec<price::FeeConfig>,
}
