use crate::error::Result;
use crate::evolution::{EvolutionLine, flatten_evolution_tree};
use crate::gateway::PokeApi;
use crate::model::PokemonDetail;
use crate::pokemon::normalize_detail;
use serde::{Deserialize, Serialize};

/// Everything the detail modal shows for one Pokémon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailView {
    pub detail: PokemonDetail,
    pub evolutions: EvolutionLine,
}

impl DetailView {
    /// Whether `id` is the Pokémon this view was loaded for.
    pub fn is_current(&self, id: u32) -> bool {
        self.detail.id() == id
    }
}

#[derive(Clone)]
pub struct DetailResolver {
    api: PokeApi,
    language: String,
}

impl DetailResolver {
    pub fn new(api: PokeApi, language: impl Into<String>) -> Self {
        Self {
            api,
            language: language.into(),
        }
    }

    /// Fetch detail and species concurrently, then the evolution chain.
    /// Detail or species failing fails the load; a failing chain only marks
    /// the evolutions as unavailable.
    pub async fn load(&self, id: u32) -> Result<DetailView> {
        tracing::debug!("Loading detail for Pokémon ID: {}", id);
        let (raw, species) = tokio::try_join!(self.api.pokemon(id), self.api.species(id))?;
        let detail = normalize_detail(&raw, &species, &self.language);

        let evolutions = match &species.evolution_chain {
            Some(chain) => match self.load_evolutions(&chain.url).await {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Evolution chain for #{} unavailable: {}", id, e);
                    EvolutionLine::Unavailable(e.to_string())
                }
            },
            None => EvolutionLine::NoEvolutions,
        };

        if let EvolutionLine::Chain(nodes) = &evolutions {
            let occurrences = nodes.iter().filter(|n| n.id == species.id).count();
            if occurrences != 1 {
                tracing::warn!(
                    "Species #{} appears {} times in its own evolution chain",
                    species.id,
                    occurrences
                );
            }
        }

        tracing::info!("Loaded detail for {} (ID: {})", detail.summary.name, id);
        Ok(DetailView { detail, evolutions })
    }

    pub async fn load_evolutions(&self, chain_url: &str) -> Result<EvolutionLine> {
        let chain = self.api.evolution_chain(chain_url).await?;
        let nodes = flatten_evolution_tree(&chain.chain)?;
        Ok(EvolutionLine::from_nodes(nodes))
    }

    /// Switch the view to another stage of the chain. Selecting the stage
    /// already shown does nothing.
    pub async fn select_evolution(&self, current_id: u32, node_id: u32) -> Result<Option<DetailView>> {
        if node_id == current_id {
            return Ok(None);
        }
        self.load(node_id).await.map(Some)
    }
}
