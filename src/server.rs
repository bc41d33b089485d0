//! JSON HTTP surface over the listing, search, detail and team operations.

use crate::config::Config;
use crate::detail::{DetailResolver, DetailView};
use crate::error::{PokedexError, Result};
use crate::gateway::PokeApi;
use crate::listing::{Filter, ListingController, ListingState, Transition};
use crate::model::PokemonSummary;
use crate::search::{SearchEngine, SearchOutcome};
use crate::team::{TeamReport, TeamRoster, analyze};
use axum::{
    Json, Router, debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

struct AppError(PokedexError);

impl From<PokedexError> for AppError {
    fn from(err: PokedexError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PokedexError::Network(_) | PokedexError::Api { .. } => StatusCode::BAD_GATEWAY,
            PokedexError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::debug!("Responding {} to: {}", status, self.0);
        let body = json!({
            "error": self.0.to_string(),
            "retryable": self.0.is_retryable(),
        });
        (status, Json(body)).into_response()
    }
}

type HandlerResult<T> = std::result::Result<Json<T>, AppError>;

pub struct AppState {
    listing: Arc<ListingController>,
    search: SearchEngine,
    detail: DetailResolver,
}

impl AppState {
    pub fn new(api: PokeApi, config: &Config) -> Self {
        let listing = Arc::new(ListingController::new(api.clone(), config.listing.clone()));
        let search = SearchEngine::new(api.clone(), listing.clone(), config.search.clone());
        let detail = DetailResolver::new(api, config.api.description_language.clone());
        Self {
            listing,
            search,
            detail,
        }
    }

    /// State backed by the HTTP transport described in `config.api`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(PokeApi::from_config(&config.api)?, config))
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/listing", get(get_listing_handler))
        .route("/listing/initial", post(load_initial_handler))
        .route("/listing/filter/{filter}", post(select_filter_handler))
        .route("/listing/more", post(load_more_handler))
        .route("/listing/page/{page}", post(navigate_handler))
        .route("/listing/clear", post(clear_search_handler))
        .route("/search/suggest", get(suggest_handler))
        .route("/search", post(commit_search_handler))
        .route("/pokemon/{id}", get(get_pokemon_handler))
        .route("/pokemon/{id}/detail", get(get_detail_handler))
        .route("/team/analyze", post(analyze_team_handler))
        .with_state(state)
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

#[debug_handler]
async fn get_listing_handler(State(app_state): State<Arc<AppState>>) -> Json<ListingState> {
    Json(app_state.listing.state())
}

#[debug_handler]
async fn load_initial_handler(State(app_state): State<Arc<AppState>>) -> HandlerResult<Transition> {
    Ok(Json(app_state.listing.load_initial().await?))
}

#[debug_handler]
async fn select_filter_handler(
    State(app_state): State<Arc<AppState>>,
    Path(filter): Path<String>,
) -> HandlerResult<Transition> {
    let filter = Filter::parse(&filter)?;
    Ok(Json(app_state.listing.select_filter(filter).await?))
}

#[debug_handler]
async fn load_more_handler(State(app_state): State<Arc<AppState>>) -> HandlerResult<Transition> {
    Ok(Json(app_state.listing.load_more().await?))
}

#[debug_handler]
async fn navigate_handler(
    State(app_state): State<Arc<AppState>>,
    Path(page): Path<usize>,
) -> HandlerResult<Transition> {
    Ok(Json(app_state.listing.navigate_to_page(page).await?))
}

#[debug_handler]
async fn clear_search_handler(State(app_state): State<Arc<AppState>>) -> HandlerResult<Transition> {
    Ok(Json(app_state.listing.clear_search().await?))
}

#[debug_handler]
async fn suggest_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> HandlerResult<SearchOutcome> {
    Ok(Json(app_state.search.suggest(&params.q).await?))
}

#[debug_handler]
async fn commit_search_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> HandlerResult<SearchOutcome> {
    Ok(Json(app_state.search.commit(&params.q).await?))
}

#[debug_handler]
async fn get_pokemon_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<PokemonSummary> {
    Ok(Json(app_state.search.select_suggestion(id).await?))
}

#[debug_handler]
async fn get_detail_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<u32>,
) -> HandlerResult<DetailView> {
    Ok(Json(app_state.detail.load(id).await?))
}

#[debug_handler]
async fn analyze_team_handler(Json(members): Json<Vec<PokemonSummary>>) -> HandlerResult<TeamReport> {
    let roster = TeamRoster::try_from(members)?;
    Ok(Json(analyze(&roster)?))
}
