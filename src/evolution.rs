use crate::error::{PokedexError, Result};
use crate::model::EvolutionNode;
use crate::pokemon::ChainLink;
use serde::{Deserialize, Serialize};

/// Evolution data ready for a linear display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum EvolutionLine {
    /// Two or more stages in pre-order.
    Chain(Vec<EvolutionNode>),
    NoEvolutions,
    /// The chain could not be loaded; the rest of the detail still is.
    Unavailable(String),
}

impl EvolutionLine {
    pub fn from_nodes(nodes: Vec<EvolutionNode>) -> Self {
        if nodes.len() <= 1 {
            EvolutionLine::NoEvolutions
        } else {
            EvolutionLine::Chain(nodes)
        }
    }

    pub fn nodes(&self) -> &[EvolutionNode] {
        match self {
            EvolutionLine::Chain(nodes) => nodes,
            EvolutionLine::NoEvolutions | EvolutionLine::Unavailable(_) => &[],
        }
    }
}

/// Numeric id from a resource URL such as `.../pokemon-species/133/`.
pub fn id_from_url(url: &str) -> Result<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| PokedexError::Parse(format!("no numeric id in resource url '{}'", url)))
}

/// Pre-order walk: each stage before its evolutions, siblings in API order.
///
/// A species id seen twice is reported as [`PokedexError::EvolutionCycle`].
pub fn flatten_evolution_tree(root: &ChainLink) -> Result<Vec<EvolutionNode>> {
    flatten_from(root, Vec::new())
}

fn flatten_from(link: &ChainLink, flattened: Vec<EvolutionNode>) -> Result<Vec<EvolutionNode>> {
    let id = id_from_url(&link.species.url)?;
    if flattened.iter().any(|node| node.id == id) {
        tracing::error!("Evolution chain revisits {} (#{})", link.species.name, id);
        return Err(PokedexError::EvolutionCycle(id));
    }

    let mut flattened = flattened;
    flattened.push(EvolutionNode {
        id,
        name: link.species.name.clone(),
    });

    link.evolves_to
        .iter()
        .try_fold(flattened, |acc, child| flatten_from(child, acc))
}
