use crate::config::SearchConfig;
use crate::error::{PokedexError, Result};
use crate::gateway::PokeApi;
use crate::listing::{ListingController, Transition};
use crate::model::{PokemonSummary, name_matches};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "results", rename_all = "snake_case")]
pub enum SearchOutcome {
    Matches(Vec<PokemonSummary>),
    /// Nothing matched. Not an error.
    Empty,
    /// Query shorter than the minimum; nothing was fetched.
    Invalid,
    /// A newer query was issued while this one ran; drop the result.
    Superseded,
    /// The listing was loading; the committed search did not run.
    Busy,
}

impl SearchOutcome {
    fn from_results(results: Vec<PokemonSummary>) -> Self {
        if results.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Matches(results)
        }
    }
}

/// Name search over the loaded listing with a catalog-wide fallback.
pub struct SearchEngine {
    api: PokeApi,
    listing: Arc<ListingController>,
    config: SearchConfig,
    latest: AtomicU64,
}

impl SearchEngine {
    pub fn new(api: PokeApi, listing: Arc<ListingController>, config: SearchConfig) -> Self {
        Self {
            api,
            listing,
            config,
            latest: AtomicU64::new(0),
        }
    }

    /// Trimmed query, or a validation error when it is too short.
    pub fn validate_query(&self, query: &str) -> Result<String> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.config.min_query_len {
            return Err(PokedexError::Validation(format!(
                "enter at least {} letters",
                self.config.min_query_len
            )));
        }
        Ok(trimmed.to_string())
    }

    pub fn is_query_valid(&self, query: &str) -> bool {
        self.validate_query(query).is_ok()
    }

    fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Debounced dropdown suggestions. Every call supersedes the previous
    /// one, including calls with an invalid query.
    pub async fn suggest(&self, query: &str) -> Result<SearchOutcome> {
        let ticket = self.issue();
        let Ok(query) = self.validate_query(query) else {
            return Ok(SearchOutcome::Invalid);
        };

        tokio::time::sleep(self.config.debounce()).await;
        if !self.is_current(ticket) {
            tracing::debug!("Suggestion for '{}' superseded before fetching", query);
            return Ok(SearchOutcome::Superseded);
        }

        // a stale query is superseded whether its fetch succeeded or not
        let results = self.search(&query, self.config.suggestion_limit).await;
        if !self.is_current(ticket) {
            tracing::warn!("Discarding stale suggestions for '{}'", query);
            return Ok(SearchOutcome::Superseded);
        }
        Ok(SearchOutcome::from_results(results?))
    }

    /// Full search that replaces the listing and switches it to search mode.
    pub async fn commit(&self, query: &str) -> Result<SearchOutcome> {
        // hides any pending dropdown result
        self.issue();
        let Ok(query) = self.validate_query(query) else {
            return Ok(SearchOutcome::Invalid);
        };

        let transition = self
            .listing
            .replace_with_search(self.search(&query, self.config.commit_limit))
            .await
            .inspect_err(|e| tracing::error!("Search for '{}' failed: {}", query, e))?;

        Ok(match transition {
            Transition::Updated(state) => SearchOutcome::Matches(state.items),
            Transition::Exhausted => {
                tracing::info!("No Pokémon match '{}'", query);
                SearchOutcome::Empty
            }
            Transition::Busy | Transition::Rejected(_) => SearchOutcome::Busy,
        })
    }

    /// A picked suggestion: reuse the loaded summary or fetch it by id.
    pub async fn select_suggestion(&self, id: u32) -> Result<PokemonSummary> {
        match self.listing.find_loaded(id) {
            Some(summary) => Ok(summary),
            None => self.api.summary_by_id(id).await,
        }
    }

    /// Local matches first; only when there are none, filter the first
    /// `candidate_pool` catalog names and resolve up to `limit` of them.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PokemonSummary>> {
        let mut local = self.listing.matching_loaded(query);
        if !local.is_empty() {
            tracing::debug!("'{}' matched {} loaded Pokémon", query, local.len());
            local.truncate(limit);
            return Ok(local);
        }

        let candidates = self.api.list_page(0, self.config.candidate_pool).await?;
        let urls: Vec<String> = candidates
            .results
            .into_iter()
            .filter(|candidate| name_matches(&candidate.name, query))
            .take(limit)
            .map(|candidate| candidate.url)
            .collect();
        tracing::debug!("'{}' matched {} catalog entries", query, urls.len());

        if urls.is_empty() {
            return Ok(Vec::new());
        }
        self.api.resolve_summaries(&urls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListingConfig;
    use crate::listing::Filter;
    use crate::testing::{BASE, FakePokeApi, fake_api};
    use std::time::Duration;

    fn engine(page_size: usize, debounce_ms: u64) -> (Arc<FakePokeApi>, Arc<SearchEngine>) {
        let (fake, api) = fake_api();
        let listing = Arc::new(ListingController::new(
            api.clone(),
            ListingConfig {
                page_size,
                all_total_pages: 50,
            },
        ));
        let config = SearchConfig {
            debounce_ms,
            ..SearchConfig::default()
        };
        (fake, Arc::new(SearchEngine::new(api, listing, config)))
    }

    fn names(outcome: &SearchOutcome) -> Vec<&str> {
        match outcome {
            SearchOutcome::Matches(results) => results.iter().map(|p| p.name.as_str()).collect(),
            other => panic!("expected matches, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_query_is_invalid_without_network() {
        let (fake, engine) = engine(5, 0);
        assert_eq!(engine.suggest("pi").await.unwrap(), SearchOutcome::Invalid);
        assert_eq!(engine.suggest("  pi  ").await.unwrap(), SearchOutcome::Invalid);
        assert_eq!(engine.commit("pi").await.unwrap(), SearchOutcome::Invalid);
        assert_eq!(fake.call_count(), 0);
        assert!(matches!(
            engine.validate_query("pi"),
            Err(PokedexError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_local_match_needs_no_network() {
        let (fake, engine) = engine(30, 0);
        engine.listing.load_initial().await.unwrap();
        fake.reset_calls();

        let outcome = engine.suggest("pik").await.unwrap();
        assert_eq!(names(&outcome), vec!["pikachu"]);
        assert_eq!(fake.call_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_to_catalog() {
        let (fake, engine) = engine(5, 0);

        let outcome = engine.suggest("CHAR").await.unwrap();
        assert_eq!(names(&outcome), vec!["charmander", "charmeleon", "charizard"]);

        let calls = fake.calls();
        assert_eq!(calls[0], format!("{}/pokemon?offset=0&limit=1000", BASE));
        assert_eq!(calls.len(), 4);
    }

    #[tokio::test]
    async fn test_suggestions_are_capped() {
        let (_fake, engine) = engine(5, 0);
        let outcome = engine.suggest("nido").await.unwrap();
        assert_eq!(
            names(&outcome),
            vec!["nidoran-f", "nidorina", "nidoqueen", "nidoran-m", "nidorino"]
        );
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let (_fake, engine) = engine(5, 0);
        assert_eq!(engine.suggest("mewtwo").await.unwrap(), SearchOutcome::Empty);
        assert_eq!(engine.commit("mewtwo").await.unwrap(), SearchOutcome::Empty);
        assert_eq!(engine.listing.state().selected_filter, Filter::All);
    }

    #[tokio::test]
    async fn test_stale_suggestion_is_discarded() {
        let (fake, engine) = engine(5, 0);
        fake.delay(&format!("{}/pokemon/25/", BASE), Duration::from_millis(150));

        let background = engine.clone();
        let pika = tokio::spawn(async move { background.suggest("pika").await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let latest = engine.suggest("char").await.unwrap();
        assert_eq!(names(&latest), vec!["charmander", "charmeleon", "charizard"]);

        assert_eq!(pika.await.unwrap().unwrap(), SearchOutcome::Superseded);
    }

    #[tokio::test]
    async fn test_stale_suggestion_failure_is_discarded() {
        let (fake, engine) = engine(5, 0);
        let pikachu = format!("{}/pokemon/25/", BASE);
        fake.delay(&pikachu, Duration::from_millis(150));
        fake.fail(&pikachu, PokedexError::Network("connection reset".into()));

        let background = engine.clone();
        let pika = tokio::spawn(async move { background.suggest("pika").await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let latest = engine.suggest("char").await.unwrap();
        assert_eq!(names(&latest), vec!["charmander", "charmeleon", "charizard"]);
        assert_eq!(pika.await.unwrap().unwrap(), SearchOutcome::Superseded);
    }

    #[tokio::test]
    async fn test_current_suggestion_failure_surfaces() {
        let (fake, engine) = engine(5, 0);
        fake.fail(
            &format!("{}/pokemon/25/", BASE),
            PokedexError::Network("connection reset".into()),
        );
        let err = engine.suggest("pika").await.unwrap_err();
        assert_eq!(err, PokedexError::Network("connection reset".into()));
    }

    #[tokio::test]
    async fn test_debounce_skips_superseded_fetch() {
        let (fake, engine) = engine(5, 50);

        let background = engine.clone();
        let first = tokio::spawn(async move { background.suggest("bulb").await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = engine.suggest("squirt").await.unwrap();
        assert_eq!(names(&second), vec!["squirtle"]);
        assert_eq!(first.await.unwrap().unwrap(), SearchOutcome::Superseded);

        // one catalog fetch plus one resolve, all for the second query
        assert_eq!(fake.call_count(), 2);
    }

    #[tokio::test]
    async fn test_commit_replaces_listing() {
        let (_fake, engine) = engine(5, 0);
        engine.listing.load_initial().await.unwrap();

        let outcome = engine.commit("saur").await.unwrap();
        assert_eq!(names(&outcome), vec!["bulbasaur", "ivysaur", "venusaur"]);

        let state = engine.listing.state();
        assert_eq!(state.selected_filter, Filter::Search);
        assert_eq!(state.items.len(), 3);
        assert_eq!(state.total_pages, 1);
    }

    #[tokio::test]
    async fn test_commit_failure_surfaces_error() {
        let (fake, engine) = engine(5, 0);
        fake.fail(
            &format!("{}/pokemon?offset=0&limit=1000", BASE),
            PokedexError::Network("dns failure".into()),
        );
        let err = engine.commit("mew").await.unwrap_err();
        assert_eq!(err, PokedexError::Network("dns failure".into()));
        assert!(!engine.listing.state().is_loading);
    }

    #[tokio::test]
    async fn test_select_suggestion() {
        let (fake, engine) = engine(5, 0);
        engine.listing.load_initial().await.unwrap();
        fake.reset_calls();

        assert_eq!(engine.select_suggestion(3).await.unwrap().name, "venusaur");
        assert_eq!(fake.call_count(), 0);

        assert_eq!(engine.select_suggestion(25).await.unwrap().name, "pikachu");
        assert_eq!(fake.calls(), vec![format!("{}/pokemon/25/", BASE)]);
    }
}
