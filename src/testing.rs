//! In-memory PokeAPI stand-in for unit tests.

use crate::error::{PokedexError, Result};
use crate::gateway::{Fetch, PokeApi};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) const BASE: &str = "https://pokeapi.test/api/v2";

const CATALOG: [(&str, &[&str]); 60] = [
    ("bulbasaur", &["grass", "poison"]),
    ("ivysaur", &["grass", "poison"]),
    ("venusaur", &["grass", "poison"]),
    ("charmander", &["fire"]),
    ("charmeleon", &["fire"]),
    ("charizard", &["fire", "flying"]),
    ("squirtle", &["water"]),
    ("wartortle", &["water"]),
    ("blastoise", &["water"]),
    ("caterpie", &["bug"]),
    ("metapod", &["bug"]),
    ("butterfree", &["bug", "flying"]),
    ("weedle", &["bug", "poison"]),
    ("kakuna", &["bug", "poison"]),
    ("beedrill", &["bug", "poison"]),
    ("pidgey", &["normal", "flying"]),
    ("pidgeotto", &["normal", "flying"]),
    ("pidgeot", &["normal", "flying"]),
    ("rattata", &["normal"]),
    ("raticate", &["normal"]),
    ("spearow", &["normal", "flying"]),
    ("fearow", &["normal", "flying"]),
    ("ekans", &["poison"]),
    ("arbok", &["poison"]),
    ("pikachu", &["electric"]),
    ("raichu", &["electric"]),
    ("sandshrew", &["ground"]),
    ("sandslash", &["ground"]),
    ("nidoran-f", &["poison"]),
    ("nidorina", &["poison"]),
    ("nidoqueen", &["poison", "ground"]),
    ("nidoran-m", &["poison"]),
    ("nidorino", &["poison"]),
    ("nidoking", &["poison", "ground"]),
    ("clefairy", &["fairy"]),
    ("clefable", &["fairy"]),
    ("vulpix", &["fire"]),
    ("ninetales", &["fire"]),
    ("jigglypuff", &["normal", "fairy"]),
    ("wigglytuff", &["normal", "fairy"]),
    ("zubat", &["poison", "flying"]),
    ("golbat", &["poison", "flying"]),
    ("oddish", &["grass", "poison"]),
    ("gloom", &["grass", "poison"]),
    ("vileplume", &["grass", "poison"]),
    ("paras", &["bug", "grass"]),
    ("parasect", &["bug", "grass"]),
    ("venonat", &["bug", "poison"]),
    ("venomoth", &["bug", "poison"]),
    ("diglett", &["ground"]),
    ("dugtrio", &["ground"]),
    ("meowth", &["normal"]),
    ("persian", &["normal"]),
    ("psyduck", &["water"]),
    ("golduck", &["water"]),
    ("mankey", &["fighting"]),
    ("primeape", &["fighting"]),
    ("growlithe", &["fire"]),
    ("arcanine", &["fire"]),
    ("poliwag", &["water"]),
];

const CHAINS: [&[u32]; 4] = [&[1, 2, 3], &[4, 5, 6], &[7, 8, 9], &[25, 26]];

/// Synthesizes PokeAPI responses from a fixed 60-entry catalog, with
/// per-URL latency and failure injection and a call log.
#[derive(Default)]
pub(crate) struct FakePokeApi {
    delays: Mutex<HashMap<String, Duration>>,
    failures: Mutex<HashMap<String, PokedexError>>,
    stubs: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<String>>,
}

impl FakePokeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(url.to_string(), delay);
    }

    pub fn fail(&self, url: &str, err: PokedexError) {
        self.failures.lock().unwrap().insert(url.to_string(), err);
    }

    /// Serve `body` for `url` instead of the synthesized response.
    pub fn stub(&self, url: &str, body: Value) {
        self.stubs.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn heal(&self, url: &str) {
        self.failures.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn respond(&self, url: &str) -> Option<Value> {
        let rest = url.strip_prefix(BASE)?;
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["pokemon"] => {
                let params: HashMap<&str, usize> = query
                    .split('&')
                    .filter_map(|pair| pair.split_once('='))
                    .filter_map(|(k, v)| v.parse().ok().map(|v| (k, v)))
                    .collect();
                let offset = params.get("offset").copied().unwrap_or(0);
                let limit = params.get("limit").copied().unwrap_or(20);
                let results: Vec<Value> = (offset..CATALOG.len().min(offset + limit))
                    .map(|idx| resource(idx as u32 + 1))
                    .collect();
                Some(json!({ "count": CATALOG.len(), "next": null, "results": results }))
            }
            ["pokemon", id] => id.parse().ok().and_then(pokemon_json),
            ["pokemon-species", id] => id.parse().ok().and_then(species_json),
            ["evolution-chain", id] => id.parse().ok().and_then(chain_json),
            ["type", name] => {
                let members: Vec<Value> = (1..=CATALOG.len() as u32)
                    .filter(|id| CATALOG[*id as usize - 1].1.contains(name))
                    .map(|id| json!({ "slot": 1, "pokemon": resource(id) }))
                    .collect();
                if members.is_empty() {
                    None
                } else {
                    Some(json!({ "name": name, "pokemon": members }))
                }
            }
            _ => None,
        }
    }
}

#[async_trait]
impl Fetch for FakePokeApi {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        let delay = self.delays.lock().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = self.failures.lock().unwrap().get(url).cloned();
        if let Some(err) = failure {
            return Err(err);
        }
        let stubbed = self.stubs.lock().unwrap().get(url).cloned();
        if let Some(body) = stubbed {
            return Ok(body);
        }
        self.respond(url).ok_or_else(|| PokedexError::Api {
            status: 404,
            status_text: "Not Found".into(),
            url: url.to_string(),
        })
    }
}

pub(crate) fn fake_api() -> (Arc<FakePokeApi>, PokeApi) {
    let fake = Arc::new(FakePokeApi::new());
    let api = PokeApi::new(fake.clone(), BASE);
    (fake, api)
}

fn name_of(id: u32) -> Option<&'static str> {
    CATALOG.get((id as usize).checked_sub(1)?).map(|(name, _)| *name)
}

pub(crate) fn resource(id: u32) -> Value {
    json!({
        "name": name_of(id).unwrap_or("unknown"),
        "url": format!("{}/pokemon/{}/", BASE, id),
    })
}

fn pokemon_json(id: u32) -> Option<Value> {
    let (name, types) = CATALOG.get((id as usize).checked_sub(1)?)?;
    let types: Vec<Value> = types
        .iter()
        .enumerate()
        .map(|(slot, t)| json!({ "slot": slot + 1, "type": { "name": t, "url": "" } }))
        .collect();
    let stats: Vec<Value> = ["hp", "attack", "defense", "special-attack", "special-defense", "speed"]
        .iter()
        .enumerate()
        .map(|(i, stat)| json!({ "base_stat": 40 + i as u32 * 5, "effort": 0, "stat": { "name": stat, "url": "" } }))
        .collect();
    Some(json!({
        "id": id,
        "name": name,
        "base_experience": 60 + id,
        "height": 7,
        "weight": 69,
        "sprites": {
            "front_default": null,
            "other": { "official-artwork": { "front_default": format!("https://img.test/{}.png", id) } }
        },
        "types": types,
        "stats": stats,
        "moves": [
            { "move": { "name": "tackle", "url": "" } },
            { "move": { "name": "growl", "url": "" } }
        ]
    }))
}

fn chain_id_of(id: u32) -> u32 {
    CHAINS
        .iter()
        .position(|chain| chain.contains(&id))
        .map(|idx| idx as u32 + 1)
        .unwrap_or(1000 + id)
}

fn species_json(id: u32) -> Option<Value> {
    let name = name_of(id)?;
    let gender_rate = if id == 25 { 4 } else { 1 };
    Some(json!({
        "id": id,
        "name": name,
        "flavor_text_entries": [
            { "flavor_text": format!("{} is\nfound\u{000C}everywhere.", name), "language": { "name": "en", "url": "" } },
            { "flavor_text": format!("{} ist überall.", name), "language": { "name": "de", "url": "" } }
        ],
        "evolution_chain": { "url": format!("{}/evolution-chain/{}/", BASE, chain_id_of(id)) },
        "gender_rate": gender_rate,
        "egg_groups": [{ "name": "monster", "url": "" }],
        "hatch_counter": 20,
        "capture_rate": 45
    }))
}

fn species_link(id: u32) -> Value {
    json!({
        "name": name_of(id).unwrap_or("unknown"),
        "url": format!("{}/pokemon-species/{}/", BASE, id),
    })
}

fn chain_json(chain_id: u32) -> Option<Value> {
    let members: Vec<u32> = match chain_id {
        1..=4 => CHAINS[chain_id as usize - 1].to_vec(),
        id if id > 1000 => vec![id - 1000],
        _ => return None,
    };
    let mut link: Option<Value> = None;
    for id in members.iter().rev() {
        let evolves_to: Vec<Value> = link.take().into_iter().collect();
        link = Some(json!({ "species": species_link(*id), "evolves_to": evolves_to }));
    }
    let chain = link?;
    Some(json!({ "id": chain_id, "chain": chain }))
}
