pub mod config;
pub mod detail;
pub mod error;
pub mod evolution;
pub mod gateway;
pub mod listing;
pub mod model;
pub mod pokemon;
pub mod search;
pub mod server;
pub mod team;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use detail::{DetailResolver, DetailView};
pub use error::{PokedexError, Result};
pub use evolution::{EvolutionLine, flatten_evolution_tree};
pub use gateway::{Fetch, HttpFetcher, PokeApi};
pub use listing::{Filter, ListingController, ListingState, Transition};
pub use model::{EvolutionNode, PokemonDetail, PokemonSummary};
pub use search::{SearchEngine, SearchOutcome};
pub use team::{TeamReport, TeamRoster, analyze};
pub use types::PokemonType;
