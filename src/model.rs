use serde::{Deserialize, Serialize};

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// Highest base stat value used to scale stat bars.
pub const MAX_BASE_STAT: u32 = 255;

/// Minimal record shown in grids, suggestions and the team roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonSummary {
    pub id: u32,
    pub name: String,
    pub image_url: Option<String>,
    pub types: Vec<String>,
}

impl PokemonSummary {
    pub fn primary_type(&self) -> Option<&str> {
        self.types.first().map(String::as_str)
    }

    /// Case-insensitive substring match on the name.
    pub fn matches(&self, query: &str) -> bool {
        name_matches(&self.name, query)
    }
}

pub(crate) fn name_matches(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStat {
    pub name: String,
    pub base_value: u32,
}

impl BaseStat {
    /// Bar fill in percent, capped at 100.
    pub fn percent_of_max(&self) -> f32 {
        (self.base_value as f32 / MAX_BASE_STAT as f32 * 100.0).min(100.0)
    }
}

/// Breeding and flavor data from the species endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub description: Option<String>,
    /// -1 for genderless, otherwise eighths female.
    pub gender_rate: i8,
    pub egg_groups: Vec<String>,
    pub hatch_counter: Option<u32>,
    pub capture_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenderRatio {
    Genderless,
    Split { male_percent: f32, female_percent: f32 },
}

pub const MISSING_DESCRIPTION: &str = "No description available.";

impl SpeciesInfo {
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or(MISSING_DESCRIPTION)
    }

    pub fn gender_ratio(&self) -> GenderRatio {
        if self.gender_rate < 0 {
            return GenderRatio::Genderless;
        }
        let female = self.gender_rate.min(8) as f32;
        GenderRatio::Split {
            male_percent: (8.0 - female) / 8.0 * 100.0,
            female_percent: female / 8.0 * 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub summary: PokemonSummary,
    /// Decimetres, as delivered by the API.
    pub height_dm: u32,
    /// Hectograms, as delivered by the API.
    pub weight_hg: u32,
    pub base_experience: Option<u32>,
    pub stats: Vec<BaseStat>,
    pub moves: Vec<String>,
    pub species: SpeciesInfo,
}

impl PokemonDetail {
    pub fn id(&self) -> u32 {
        self.summary.id
    }

    pub fn height_m(&self) -> f32 {
        self.height_dm as f32 / 10.0
    }

    pub fn weight_kg(&self) -> f32 {
        self.weight_hg as f32 / 10.0
    }

    /// Height formatted with one decimal, e.g. "0.7 m".
    pub fn height_display(&self) -> String {
        format!("{:.1} m", self.height_m())
    }

    pub fn weight_display(&self) -> String {
        format!("{:.1} kg", self.weight_kg())
    }

    pub fn moves_preview(&self, limit: usize) -> &[String] {
        &self.moves[..self.moves.len().min(limit)]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionNode {
    pub id: u32,
    pub name: String,
}

impl EvolutionNode {
    pub fn image_url(&self) -> String {
        format!("{}/{}.png", ARTWORK_BASE, self.id)
    }
}
