use crate::config::ApiConfig;
use crate::error::{PokedexError, Result};
use crate::model::PokemonSummary;
use crate::pokemon::{RawEvolutionChain, RawPokemon, RawSpecies, ResourceList, TypeResponse, normalize};
use crate::types::PokemonType;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Transport seam: one GET returning a JSON document.
///
/// Implementations translate transport failures into [`PokedexError::Network`]
/// and non-success statuses into [`PokedexError::Api`]. No retries.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// `reqwest`-backed transport sharing one connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            PokedexError::Config(format!("HTTP client: {}", e))
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        tracing::debug!("Fetching {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            tracing::error!("Failed to make HTTP request to {}: {}", url, e);
            PokedexError::Network(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("API request to {} failed with status: {}", url, status);
            return Err(PokedexError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                url: url.to_string(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::error!("Failed to parse JSON response from {}: {}", url, e);
            PokedexError::Parse(format!("JSON parsing failed: {}", e))
        })
    }
}

/// PokeAPI endpoints on top of a [`Fetch`] transport.
#[derive(Clone)]
pub struct PokeApi {
    fetcher: Arc<dyn Fetch>,
    base_url: String,
}

impl PokeApi {
    pub fn new(fetcher: Arc<dyn Fetch>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), config.base()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn pokemon_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}/", self.base_url, id)
    }

    pub async fn fetch_resource(&self, url: &str) -> Result<Value> {
        self.fetcher.fetch_json(url).await
    }

    async fn fetch_as<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let value = self.fetch_resource(url).await?;
        serde_json::from_value(value).map_err(|e| {
            tracing::error!("Unexpected response shape from {}: {}", url, e);
            PokedexError::Parse(format!("{}: {}", url, e))
        })
    }

    /// One page of the unfiltered catalog.
    pub async fn list_page(&self, offset: usize, limit: usize) -> Result<ResourceList> {
        let url = format!("{}/pokemon?offset={}&limit={}", self.base_url, offset, limit);
        self.fetch_as(&url).await
    }

    /// Every member URL of one type, in API order. PokeAPI does not paginate this.
    pub async fn type_member_urls(&self, pokemon_type: PokemonType) -> Result<Vec<String>> {
        let url = format!("{}/type/{}", self.base_url, pokemon_type.as_str());
        let response: TypeResponse = self.fetch_as(&url).await?;
        tracing::debug!(
            "Type {} has {} members",
            pokemon_type,
            response.pokemon.len()
        );
        Ok(response
            .pokemon
            .into_iter()
            .map(|member| member.pokemon.url)
            .collect())
    }

    pub async fn pokemon(&self, id: u32) -> Result<RawPokemon> {
        self.fetch_as(&self.pokemon_url(id)).await
    }

    pub async fn species(&self, id: u32) -> Result<RawSpecies> {
        let url = format!("{}/pokemon-species/{}/", self.base_url, id);
        self.fetch_as(&url).await
    }

    pub async fn evolution_chain(&self, url: &str) -> Result<RawEvolutionChain> {
        self.fetch_as(url).await
    }

    pub async fn fetch_summary(&self, url: &str) -> Result<PokemonSummary> {
        let raw: RawPokemon = self.fetch_as(url).await?;
        tracing::debug!("Fetched Pokémon: {} (ID: {})", raw.name, raw.id);
        Ok(normalize(&raw))
    }

    pub async fn summary_by_id(&self, id: u32) -> Result<PokemonSummary> {
        self.fetch_summary(&self.pokemon_url(id)).await
    }

    /// Fetch every URL concurrently. The result is in input order and the
    /// whole call fails if any single fetch fails.
    pub async fn resolve_summaries(&self, urls: &[String]) -> Result<Vec<PokemonSummary>> {
        let summaries = try_join_all(urls.iter().map(|url| self.fetch_summary(url))).await?;
        tracing::debug!("Resolved {} summaries", summaries.len());
        Ok(summaries)
    }

    /// A page of the unfiltered catalog resolved to summaries.
    pub async fn page_summaries(&self, offset: usize, limit: usize) -> Result<Vec<PokemonSummary>> {
        let page = self.list_page(offset, limit).await?;
        let urls: Vec<String> = page.results.into_iter().map(|r| r.url).collect();
        self.resolve_summaries(&urls).await
    }
}
