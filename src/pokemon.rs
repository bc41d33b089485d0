// pokemon.rs
// Raw PokeAPI response shapes and their normalization into domain records.
// Every nested field that PokeAPI may omit or null is defaulted so a
// well-formed record never fails to decode.

use crate::model::{BaseStat, PokemonDetail, PokemonSummary, SpeciesInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RawPokemon {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub base_experience: Option<u32>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<PokemonTypeSlot>,
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    #[serde(default)]
    pub moves: Vec<PokemonMove>,
    #[serde(default)]
    pub species: Option<NamedAPIResource>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct NamedAPIResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Sprites {
    #[serde(default)]
    pub front_default: Option<String>,
    #[serde(default)]
    pub other: Option<OtherSprites>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OtherSprites {
    #[serde(rename = "official-artwork", default)]
    pub official_artwork: Option<Artwork>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Artwork {
    #[serde(default)]
    pub front_default: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonTypeSlot {
    #[serde(default)]
    pub slot: u8,
    pub r#type: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonStat {
    pub base_stat: u32,
    #[serde(default)]
    pub effort: u32,
    pub stat: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PokemonMove {
    pub r#move: NamedAPIResource,
}

/// `/pokemon?offset=&limit=` page.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ResourceList {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<NamedAPIResource>,
}

/// `/type/{name}` response, reduced to its member list.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TypeResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pokemon: Vec<TypeMember>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TypeMember {
    #[serde(default)]
    pub slot: u8,
    pub pokemon: NamedAPIResource,
}

/// `/pokemon-species/{id}` response.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RawSpecies {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorText>,
    #[serde(default)]
    pub evolution_chain: Option<ApiResource>,
    #[serde(default = "genderless")]
    pub gender_rate: i8,
    #[serde(default)]
    pub egg_groups: Vec<NamedAPIResource>,
    #[serde(default)]
    pub hatch_counter: Option<u32>,
    #[serde(default)]
    pub capture_rate: u32,
}

fn genderless() -> i8 {
    -1
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlavorText {
    pub flavor_text: String,
    pub language: NamedAPIResource,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ApiResource {
    pub url: String,
}

/// `/evolution-chain/{id}` response.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RawEvolutionChain {
    #[serde(default)]
    pub id: u32,
    pub chain: ChainLink,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChainLink {
    pub species: NamedAPIResource,
    #[serde(default)]
    pub evolves_to: Vec<ChainLink>,
}

impl RawPokemon {
    #[cfg(test)]
    fn from_value(value: serde_json::Value) -> crate::error::Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    fn artwork_url(&self) -> Option<String> {
        self.sprites
            .other
            .as_ref()
            .and_then(|other| other.official_artwork.as_ref())
            .and_then(|artwork| artwork.front_default.clone())
    }

    fn type_names(&self) -> Vec<String> {
        let mut slots: Vec<&PokemonTypeSlot> = self.types.iter().collect();
        slots.sort_by_key(|t| t.slot);
        slots.into_iter().map(|t| t.r#type.name.clone()).collect()
    }
}

/// Reduce a raw record to the summary used by listings, search and the roster.
pub fn normalize(raw: &RawPokemon) -> PokemonSummary {
    PokemonSummary {
        id: raw.id,
        name: raw.name.clone(),
        image_url: raw.artwork_url(),
        types: raw.type_names(),
    }
}

/// Combine a raw record and its species metadata into the modal detail.
pub fn normalize_detail(raw: &RawPokemon, species: &RawSpecies, language: &str) -> PokemonDetail {
    PokemonDetail {
        summary: normalize(raw),
        height_dm: raw.height,
        weight_hg: raw.weight,
        base_experience: raw.base_experience,
        stats: raw
            .stats
            .iter()
            .map(|s| BaseStat {
                name: s.stat.name.clone(),
                base_value: s.base_stat,
            })
            .collect(),
        moves: raw.moves.iter().map(|m| m.r#move.name.clone()).collect(),
        species: SpeciesInfo {
            description: species.description(language),
            gender_rate: species.gender_rate,
            egg_groups: species.egg_groups.iter().map(|g| g.name.clone()).collect(),
            hatch_counter: species.hatch_counter,
            capture_rate: species.capture_rate,
        },
    }
}

impl RawSpecies {
    /// First flavor text in `language`, with form feeds and newlines flattened.
    pub fn description(&self, language: &str) -> Option<String> {
        self.flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == language)
            .map(|entry| {
                entry
                    .flavor_text
                    .replace(['\n', '\u{000C}'], " ")
            })
    }
}
