use thiserror::Error;

// Failures surfaced by the core. Empty search results and an exhausted
// listing are outcomes, not errors, and never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PokedexError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("PokeAPI error: {status} - {status_text} ({url})")]
    Api {
        status: u16,
        status_text: String,
        url: String,
    },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Evolution chain revisits species #{0}")]
    EvolutionCycle(u32),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PokedexError>;

impl PokedexError {
    /// Network and API failures are the ones a retry affordance makes sense for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PokedexError::Network(_) | PokedexError::Api { .. })
    }
}

impl From<reqwest::Error> for PokedexError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PokedexError::Parse(err.to_string())
        } else {
            PokedexError::Network(err.to_string())
        }
    }
}

impl From<toml::de::Error> for PokedexError {
    fn from(err: toml::de::Error) -> Self {
        PokedexError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PokedexError {
    fn from(err: serde_json::Error) -> Self {
        PokedexError::Parse(err.to_string())
    }
}
