use crate::models::{Pokemon, Query};
use anyhow::{Context, Result, bail};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Message shown for any non-success HTTP status
pub const NOT_FOUND_MESSAGE: &str = "Pokémon not found";

/// Errors that can occur while looking up a record
///
/// The `Display` form of each variant is exactly what the window shows.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Pokémon not found")]
    NotFound { status: StatusCode },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    #[error("Cannot build a request URL from API base: {0}")]
    InvalidBaseUrl(String),
}

/// Source of creature records
///
/// [`PokeApiClient`] is the production implementation; tests substitute
/// scripted sources to control responses and their timing.
pub trait PokemonSource: Send + Sync {
    /// Fetch the record for `query`. One call issues at most one request.
    fn fetch_pokemon(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Pokemon, LookupError>> + Send;
}

#[derive(Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    #[serde(default)]
    sprites: Option<SpriteSet>,
    #[serde(default)]
    types: Vec<TypeSlot>,
}

#[derive(Debug, Deserialize)]
struct SpriteSet {
    #[serde(default)]
    front_default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

impl From<PokemonResponse> for Pokemon {
    fn from(response: PokemonResponse) -> Self {
        Pokemon {
            id: response.id,
            name: response.name,
            sprite_url: response.sprites.and_then(|s| s.front_default),
            types: response.types.into_iter().map(|t| t.kind.name).collect(),
        }
    }
}

/// Parse a PokeAPI `pokemon` response body
pub fn parse_pokemon(body: &[u8]) -> Result<Pokemon, LookupError> {
    let response: PokemonResponse = serde_json::from_slice(body)?;
    Ok(response.into())
}

/// HTTP client for the PokeAPI `pokemon` endpoint
///
/// The base URL is parsed once at construction; each lookup appends the
/// query's normalized form as a single percent-encoded path segment.
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl PokeApiClient {
    /// Create a client with its own connection pool
    ///
    /// # Arguments
    /// * `base_url` - Endpoint prefix (e.g., "https://pokeapi.co/api/v2/pokemon/")
    /// * `timeout` - Per-request timeout; `None` keeps the transport default
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Self::with_client(base_url, client)
    }

    /// Create a client on top of an existing `reqwest::Client`
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL cannot carry a path: {}", base_url);
        }

        Ok(Self { client, base_url })
    }

    /// Full request URL for `query`
    ///
    /// The segment is appended as text and the result parsed as a whole, so
    /// `?` and `#` in a search term start a query or fragment and inner spaces
    /// become `%20`.
    pub fn endpoint(&self, query: &Query) -> Result<Url, LookupError> {
        let base = self.base_url.as_str();
        let separator = if base.ends_with('/') { "" } else { "/" };
        let raw = format!("{}{}{}", base, separator, query.path_segment());

        Url::parse(&raw).map_err(|_| LookupError::InvalidBaseUrl(self.base_url.to_string()))
    }

    /// Underlying HTTP client, shared with the sprite loader
    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl PokemonSource for PokeApiClient {
    async fn fetch_pokemon(&self, query: &Query) -> Result<Pokemon, LookupError> {
        let url = self.endpoint(query)?;
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Lookup for '{}' answered {}", query, status);
            return Err(LookupError::NotFound { status });
        }

        let body = response.bytes().await?;
        parse_pokemon(&body)
    }
}
