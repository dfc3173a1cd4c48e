//! A thin wrapper around [`reqwest`] that decodes API responses into either
//! the expected success DTO or the API's structured error DTO, so callers can
//! map remote failures into their own error taxonomy without re-parsing
//! response bodies.

use serde::de::DeserializeOwned;

/// A transport-level HTTP error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP status {0}: {1}")]
    Status(reqwest::StatusCode, String),
    #[error("failed to decode response body: {0}; body: {1}")]
    Decode(serde_json::Error, String),
    #[error(transparent)]
    Network(reqwest::Error),
}

impl Error {
    /// Whether the failure is worth retrying at a higher layer. The flag is
    /// derived from the transport, never guessed from response contents.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Status(status, _) => {
                status.is_server_error() || *status == reqwest::StatusCode::TOO_MANY_REQUESTS
            }
            Self::Decode(..) => false,
            Self::Network(err) => err.is_timeout() || err.is_connect(),
        }
    }
}

/// The result of a [`roundtrip_impl`] that failed either at the transport
/// level or with a well-formed API error body.
#[derive(Debug, thiserror::Error)]
pub enum RoundtripError<E> {
    #[error(transparent)]
    Http(Error),
    #[error("API error")]
    Api(E),
}

/// Executes an HTTP request and decodes the response body as `T`, falling
/// back to the API error type `E` when the body does not match. Call sites
/// use the `roundtrip!` macro, which makes both DTO types explicit.
pub async fn roundtrip_impl<T, E>(request: reqwest::RequestBuilder) -> Result<T, RoundtripError<E>>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    let response = request
        .send()
        .await
        .map_err(|err| RoundtripError::Http(Error::Network(err)))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| RoundtripError::Http(Error::Network(err)))?;
    tracing::trace!(%status, %body, "received API response");

    match serde_json::from_str::<T>(&body) {
        Ok(result) => Ok(result),
        Err(decode) => {
            if let Ok(err) = serde_json::from_str::<E>(&body) {
                return Err(RoundtripError::Api(err));
            }
            if !status.is_success() {
                return Err(RoundtripError::Http(Error::Status(status, body)));
            }
            Err(RoundtripError::Http(Error::Decode(decode, body)))
        }
    }
}

macro_rules! roundtrip {
    (<$ok:ty, $err:ty>; $request:expr) => {
        $crate::util::http::roundtrip_impl::<$ok, $err>($request)
    };
}
pub(crate) use roundtrip;
