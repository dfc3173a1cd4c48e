//! Bindings to the marketplace transaction-generation API. The API turns an
//! order reference into the list of on-chain steps required to buy it.

use crate::util;

pub mod dto;

/// The path of the transaction-generation endpoint, relative to the
/// configured API base URL.
const GENERATE_BUY_TRANSACTION: &str = "generateBuyTransaction";

pub struct Client {
    client: reqwest::Client,
    config: Config,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// The base URL for the marketplace API.
    pub endpoint: reqwest::Url,
}

impl Client {
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Requests the step list for buying the given orders. Remote and
    /// network-suspending; transport and API failures are reported
    /// separately so callers can tell a retryable outage from a rejected
    /// request.
    pub async fn generate_buy_transaction(
        &self,
        request: &dto::GenerateBuyTransaction,
    ) -> Result<dto::Steps, Error> {
        tracing::debug!(?request, "generating buy transaction");
        let steps = util::http::roundtrip!(
            <dto::Steps, dto::Error>;
            self.client
                .post(util::url::join(&self.config.endpoint, GENERATE_BUY_TRANSACTION))
                .json(request)
        )
        .await?;
        Ok(steps)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("api error {0}")]
    Api(#[from] dto::Error),
    #[error(transparent)]
    Http(util::http::Error),
}

impl Error {
    /// Whether the failure is worth retrying. Only transport-level failures
    /// carry a retryable flag; API rejections never do.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Api(_) => false,
            Self::Http(err) => err.retryable(),
        }
    }
}

impl From<util::http::RoundtripError<dto::Error>> for Error {
    fn from(err: util::http::RoundtripError<dto::Error>) -> Self {
        match err {
            util::http::RoundtripError::Http(err) => Self::Http(err),
            util::http::RoundtripError::Api(err) => Self::Api(err),
        }
    }
}
