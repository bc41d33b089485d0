use crate::config::ListingConfig;
use crate::error::{PokedexError, Result};
use crate::gateway::PokeApi;
use crate::model::PokemonSummary;
use crate::types::PokemonType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// What the listing currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    All,
    Type(PokemonType),
    /// Set only by a committed search; not paginated.
    Search,
}

impl Filter {
    /// Parse a filter control value: `"all"` or a type name.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            other => PokemonType::from_name(other)
                .map(Filter::Type)
                .ok_or_else(|| PokedexError::Validation(format!("unknown filter '{}'", value))),
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => f.write_str("all"),
            Filter::Type(t) => write!(f, "{}", t),
            Filter::Search => f.write_str("search"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingState {
    pub items: Vec<PokemonSummary>,
    pub is_loading: bool,
    pub selected_filter: Filter,
    pub next_offset: usize,
    pub current_page: usize,
    pub total_pages: usize,
}

impl ListingState {
    pub fn has_previous_page(&self) -> bool {
        self.selected_filter != Filter::Search && self.current_page > 1
    }

    pub fn has_next_page(&self) -> bool {
        match self.selected_filter {
            Filter::All => true,
            Filter::Search => false,
            Filter::Type(_) => self.current_page < self.total_pages,
        }
    }
}

/// Result of a controller transition that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "state", rename_all = "snake_case")]
pub enum Transition {
    Updated(ListingState),
    /// The request succeeded but there was nothing to add; state is unchanged.
    Exhausted,
    /// Another transition is in flight; nothing was fetched.
    Busy,
    /// The transition is not valid in the current state; nothing was fetched.
    Rejected(String),
}

struct Inner {
    state: ListingState,
    // Full member list of the active type filter. PokeAPI has no paging for
    // type listings, so load-more and page navigation slice this.
    type_members: Option<Arc<Vec<String>>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears `is_loading` when the transition finishes or its future is dropped.
struct LoadingGuard<'a> {
    inner: &'a Mutex<Inner>,
    released: bool,
}

impl LoadingGuard<'_> {
    /// Releases the flag first so snapshots taken by `apply` are not loading.
    fn finish<R>(mut self, apply: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = lock(self.inner);
        inner.state.is_loading = false;
        self.released = true;
        apply(&mut inner)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            lock(self.inner).state.is_loading = false;
        }
    }
}

/// Where the next batch of summaries comes from.
enum Source {
    Catalog { offset: usize },
    TypeSlice { members: Arc<Vec<String>>, offset: usize },
}

pub struct ListingController {
    api: PokeApi,
    config: ListingConfig,
    inner: Mutex<Inner>,
}

impl ListingController {
    pub fn new(api: PokeApi, config: ListingConfig) -> Self {
        let state = ListingState {
            items: Vec::new(),
            is_loading: false,
            selected_filter: Filter::All,
            next_offset: 0,
            current_page: 1,
            total_pages: config.all_total_pages,
        };
        Self {
            api,
            config,
            inner: Mutex::new(Inner {
                state,
                type_members: None,
            }),
        }
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ListingState {
        lock(&self.inner).state.clone()
    }

    pub fn find_loaded(&self, id: u32) -> Option<PokemonSummary> {
        lock(&self.inner).state.items.iter().find(|p| p.id == id).cloned()
    }

    /// Loaded items whose name contains `query`, in listing order.
    pub fn matching_loaded(&self, query: &str) -> Vec<PokemonSummary> {
        lock(&self.inner)
            .state
            .items
            .iter()
            .filter(|p| p.matches(query))
            .cloned()
            .collect()
    }

    /// Take the loading flag if it is free and `plan` accepts the current state.
    fn begin<T>(
        &self,
        plan: impl FnOnce(&Inner) -> std::result::Result<T, Transition>,
    ) -> std::result::Result<(LoadingGuard<'_>, T), Transition> {
        let mut inner = lock(&self.inner);
        if inner.state.is_loading {
            tracing::debug!("Listing busy, ignoring transition");
            return Err(Transition::Busy);
        }
        let planned = plan(&inner)?;
        inner.state.is_loading = true;
        Ok((
            LoadingGuard {
                inner: &self.inner,
                released: false,
            },
            planned,
        ))
    }

    async fn fetch(&self, source: Source) -> Result<Vec<PokemonSummary>> {
        let page_size = self.config.page_size;
        match source {
            Source::Catalog { offset } => self.api.page_summaries(offset, page_size).await,
            Source::TypeSlice { members, offset } => {
                let urls = slice_page(&members, offset, page_size);
                self.api.resolve_summaries(urls).await
            }
        }
    }

    fn total_pages_for(&self, member_count: usize) -> usize {
        member_count.div_ceil(self.config.page_size).max(1)
    }

    /// First page of the unfiltered catalog. Only valid while nothing is loaded.
    pub async fn load_initial(&self) -> Result<Transition> {
        let (guard, ()) = match self.begin(|inner| {
            if inner.state.items.is_empty() {
                Ok(())
            } else {
                Err(Transition::Rejected("listing is already loaded".into()))
            }
        }) {
            Ok(started) => started,
            Err(transition) => return Ok(transition),
        };

        let items = self.fetch(Source::Catalog { offset: 0 }).await.inspect_err(|e| {
            tracing::error!("Failed to load initial page: {}", e);
        })?;

        let page_size = self.config.page_size;
        let total_pages = self.config.all_total_pages;
        Ok(guard.finish(|inner| {
            inner.type_members = None;
            let state = &mut inner.state;
            state.items = dedup_by_id(items);
            state.selected_filter = Filter::All;
            state.next_offset = page_size;
            state.current_page = 1;
            state.total_pages = total_pages;
            tracing::info!("Loaded initial page with {} Pokémon", state.items.len());
            Transition::Updated(state.clone())
        }))
    }

    /// Replace the listing with page one of `filter`.
    pub async fn select_filter(&self, filter: Filter) -> Result<Transition> {
        let (guard, ()) = match self.begin(|_| match filter {
            Filter::Search => Err(Transition::Rejected(
                "search results are produced by the search engine".into(),
            )),
            _ => Ok(()),
        }) {
            Ok(started) => started,
            Err(transition) => return Ok(transition),
        };

        let (items, members) = match filter {
            Filter::Type(pokemon_type) => {
                let members = Arc::new(self.api.type_member_urls(pokemon_type).await.inspect_err(
                    |e| tracing::error!("Failed to load members of type {}: {}", pokemon_type, e),
                )?);
                let items = self
                    .fetch(Source::TypeSlice {
                        members: members.clone(),
                        offset: 0,
                    })
                    .await?;
                (items, Some(members))
            }
            _ => (self.fetch(Source::Catalog { offset: 0 }).await?, None),
        };

        let total_pages = match &members {
            Some(members) => self.total_pages_for(members.len()),
            None => self.config.all_total_pages,
        };
        let page_size = self.config.page_size;
        Ok(guard.finish(|inner| {
            inner.type_members = members;
            let state = &mut inner.state;
            state.items = dedup_by_id(items);
            state.selected_filter = filter;
            state.next_offset = page_size;
            state.current_page = 1;
            state.total_pages = total_pages;
            tracing::info!("Filter {} selected, {} Pokémon shown", filter, state.items.len());
            Transition::Updated(state.clone())
        }))
    }

    /// Append the next page at `next_offset`.
    pub async fn load_more(&self) -> Result<Transition> {
        let (guard, source) = match self.begin(|inner| self.source_at(inner, inner.state.next_offset)) {
            Ok(started) => started,
            Err(transition) => return Ok(transition),
        };

        let items = self.fetch(source).await.inspect_err(|e| {
            tracing::error!("Failed to load more Pokémon: {}", e);
        })?;

        let page_size = self.config.page_size;
        Ok(guard.finish(|inner| {
            let state = &mut inner.state;
            let seen: HashSet<u32> = state.items.iter().map(|p| p.id).collect();
            let fresh: Vec<PokemonSummary> = dedup_by_id(items)
                .into_iter()
                .filter(|p| !seen.contains(&p.id))
                .collect();
            // an all-duplicate page adds nothing either
            if fresh.is_empty() {
                tracing::info!("No more Pokémon to load for filter {}", state.selected_filter);
                return Transition::Exhausted;
            }
            tracing::debug!("Appending {} Pokémon", fresh.len());
            state.items.extend(fresh);
            state.next_offset += page_size;
            Transition::Updated(state.clone())
        }))
    }

    /// Replace the listing with exactly page `page` (1-based).
    pub async fn navigate_to_page(&self, page: usize) -> Result<Transition> {
        let page_size = self.config.page_size;
        let (guard, source) = match self.begin(|inner| {
            if page < 1 || page > inner.state.total_pages {
                return Err(Transition::Rejected(format!(
                    "page {} is outside 1..={}",
                    page, inner.state.total_pages
                )));
            }
            self.source_at(inner, (page - 1) * page_size)
        }) {
            Ok(started) => started,
            Err(transition) => return Ok(transition),
        };

        let items = self.fetch(source).await.inspect_err(|e| {
            tracing::error!("Failed to load page {}: {}", page, e);
        })?;

        Ok(guard.finish(|inner| {
            if items.is_empty() {
                return Transition::Exhausted;
            }
            let state = &mut inner.state;
            state.items = dedup_by_id(items);
            state.current_page = page;
            state.next_offset = page * page_size;
            tracing::info!("Navigated to page {}", page);
            Transition::Updated(state.clone())
        }))
    }

    pub async fn next_page(&self) -> Result<Transition> {
        let page = self.state().current_page + 1;
        self.navigate_to_page(page).await
    }

    pub async fn previous_page(&self) -> Result<Transition> {
        let page = self.state().current_page.saturating_sub(1);
        self.navigate_to_page(page).await
    }

    /// Leave search mode and reload page one of the catalog.
    pub async fn clear_search(&self) -> Result<Transition> {
        self.select_filter(Filter::All).await
    }

    /// Run a committed search under the loading flag and show its results.
    /// An empty result leaves the listing untouched and reports `Exhausted`.
    pub async fn replace_with_search<F>(&self, search: F) -> Result<Transition>
    where
        F: Future<Output = Result<Vec<PokemonSummary>>>,
    {
        let (guard, ()) = match self.begin(|_| Ok(())) {
            Ok(started) => started,
            Err(transition) => return Ok(transition),
        };

        let results = search.await?;

        Ok(guard.finish(|inner| {
            if results.is_empty() {
                return Transition::Exhausted;
            }
            inner.type_members = None;
            let state = &mut inner.state;
            state.items = dedup_by_id(results);
            state.selected_filter = Filter::Search;
            state.next_offset = 0;
            state.current_page = 1;
            state.total_pages = 1;
            tracing::info!("Showing {} search results", state.items.len());
            Transition::Updated(state.clone())
        }))
    }

    fn source_at(&self, inner: &Inner, offset: usize) -> std::result::Result<Source, Transition> {
        match inner.state.selected_filter {
            Filter::Search => Err(Transition::Rejected("search results are not paginated".into())),
            Filter::All => Ok(Source::Catalog { offset }),
            Filter::Type(pokemon_type) => match &inner.type_members {
                Some(members) => Ok(Source::TypeSlice {
                    members: members.clone(),
                    offset,
                }),
                None => Err(Transition::Rejected(format!(
                    "type {} has not been selected",
                    pokemon_type
                ))),
            },
        }
    }
}

fn slice_page(members: &[String], offset: usize, page_size: usize) -> &[String] {
    let start = offset.min(members.len());
    let end = offset.saturating_add(page_size).min(members.len());
    &members[start..end]
}

fn dedup_by_id(items: Vec<PokemonSummary>) -> Vec<PokemonSummary> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|p| seen.insert(p.id)).collect()
}
