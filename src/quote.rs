use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://api.quotable.io/random";
pub const DEFAULT_MAX_LENGTH: usize = 80;

const USER_AGENT: &str = concat!("ago-type/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub content: String,
    pub author: Option<String>,
}

impl Quote {
    pub fn new(content: impl Into<String>, author: Option<String>) -> Self {
        Self {
            content: content.into(),
            author,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuoteRequest {
    /// upper bound on the quote length in characters
    pub max_length: Option<usize>,
}

#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("quote service responded with status {0}")]
    Status(u16),
    #[error("malformed quote response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("quote response has no content")]
    MissingContent,
    #[error("invalid quote endpoint `{endpoint}`: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
}

/// Asynchronous-by-thread source of new target texts
pub trait QuoteProvider: Send + Sync + 'static {
    fn fetch(&self, request: &QuoteRequest) -> Result<Quote, QuoteError>;
}

// Wire shape; every field optional so a missing `content` maps to our own error
#[derive(Debug, Deserialize)]
struct RawQuote {
    content: Option<String>,
    author: Option<String>,
}

/// Decode a provider response body into a playable quote
pub fn parse_quote(body: &[u8]) -> Result<Quote, QuoteError> {
    let raw: RawQuote = serde_json::from_slice(body)?;
    let content = raw
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(QuoteError::MissingContent)?;
    let author = raw.author.filter(|a| !a.trim().is_empty());

    Ok(Quote { content, author })
}

/// Blocking client for quotable-compatible `/random` endpoints
#[derive(Debug, Clone)]
pub struct QuotableClient {
    client: Client,
    endpoint: String,
}

impl QuotableClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, QuoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, request: &QuoteRequest) -> Result<Url, QuoteError> {
        let invalid = |source| QuoteError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            source,
        };

        match request.max_length {
            Some(max) => {
                Url::parse_with_params(&self.endpoint, &[("maxLength", max.to_string())])
                    .map_err(invalid)
            }
            None => Url::parse(&self.endpoint).map_err(invalid),
        }
    }
}

impl QuoteProvider for QuotableClient {
    fn fetch(&self, request: &QuoteRequest) -> Result<Quote, QuoteError> {
        let url = self.request_url(request)?;
        tracing::debug!(%url, "fetching quote");

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Status(status.as_u16()));
        }

        let body = response.bytes()?;
        parse_quote(&body)
    }
}

/// Serves the same text on every request
#[derive(Debug, Clone)]
pub struct FixedQuoteProvider {
    quote: Quote,
}

impl FixedQuoteProvider {
    pub fn new(quote: Quote) -> Self {
        Self { quote }
    }
}

impl QuoteProvider for FixedQuoteProvider {
    fn fetch(&self, _request: &QuoteRequest) -> Result<Quote, QuoteError> {
        Ok(self.quote.clone())
    }
}
