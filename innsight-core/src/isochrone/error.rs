use thiserror::Error;

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Timeouts and connection-level failures.
    Network,
    /// HTTP error statuses and unparseable bodies.
    Upstream,
    /// An explicit error payload from the routing API.
    FatalApi,
}

/// Errors from [`crate::IsochroneProvider::fetch_isochrones`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request exceeded its timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was called.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The connection could not be established or was dropped.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Endpoint that was called.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The routing service answered with an error status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("malformed response body: {message}")]
    MalformedResponse {
        /// Decoder error description.
        message: String,
    },
    /// A retryable HTTP status persisted for every attempt.
    #[error("upstream temporary failure ({status}): {message}")]
    UpstreamTemporaryFailure {
        /// Status code of the final attempt.
        status: u16,
        /// Response body of the final attempt.
        message: String,
    },
    /// The response body stayed unparseable for every attempt.
    #[error("invalid response format: {message}")]
    InvalidResponseFormat {
        /// Decoder error of the final attempt.
        message: String,
    },
    /// The routing API returned an explicit `error` object.
    #[error("routing API error {}: {message}", .code.map_or_else(|| "-".to_owned(), |c| c.to_string()))]
    Api {
        /// Numeric error code, when supplied.
        code: Option<i64>,
        /// Error message or the raw error payload.
        message: String,
    },
}

impl FetchError {
    /// Classify the error as network, upstream or fatal API failure.
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => FetchErrorKind::Network,
            Self::Http { .. }
            | Self::MalformedResponse { .. }
            | Self::UpstreamTemporaryFailure { .. }
            | Self::InvalidResponseFormat { .. } => FetchErrorKind::Upstream,
            Self::Api { .. } => FetchErrorKind::FatalApi,
        }
    }

    /// Report whether another attempt could plausibly succeed.
    ///
    /// Timeouts, connection failures, HTTP 429, HTTP 5xx and malformed bodies
    /// are transient. Everything else fails fast.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } | Self::MalformedResponse { .. } => true,
            Self::Http { status, .. } => *status == 429 || (*status >= 500 && *status < 600),
            Self::UpstreamTemporaryFailure { .. }
            | Self::InvalidResponseFormat { .. }
            | Self::Api { .. } => false,
        }
    }

    /// Report whether stale cached data may stand in for this failure.
    ///
    /// Only transport and upstream failures qualify; an explicit API error
    /// describes a bad request and is never masked.
    #[must_use]
    pub const fn permits_fallback(&self) -> bool {
        !matches!(self.kind(), FetchErrorKind::FatalApi)
    }

    /// Re-wrap a retryable failure once the attempt budget is spent.
    ///
    /// HTTP failures become [`FetchError::UpstreamTemporaryFailure`] and
    /// parse failures become [`FetchError::InvalidResponseFormat`]; network
    /// failures are returned unchanged.
    #[must_use]
    pub fn into_exhausted(self) -> Self {
        match self {
            Self::Http {
                status, message, ..
            } => Self::UpstreamTemporaryFailure { status, message },
            Self::MalformedResponse { message } => Self::InvalidResponseFormat { message },
            other => other,
        }
    }
}

/// Errors surfaced once the fallback cache has had its chance to recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsochroneError {
    /// The fetch failed and no cached result exists for the request.
    #[error("isochrone request failed and no cache available: {source}")]
    Unavailable {
        /// Failure reported by the fetcher.
        #[source]
        source: FetchError,
    },
    /// The routing API rejected the request outright.
    #[error("isochrone request rejected: {source}")]
    Rejected {
        /// Failure reported by the fetcher.
        #[source]
        source: FetchError,
    },
}

impl IsochroneError {
    /// Borrow the underlying fetch failure.
    #[must_use]
    pub const fn fetch_error(&self) -> &FetchError {
        match self {
            Self::Unavailable { source } | Self::Rejected { source } => source,
        }
    }
}
