//! Team roster and the type-effectiveness analysis run over it.

use crate::error::{PokedexError, Result};
use crate::model::PokemonSummary;
use crate::types::PokemonType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MAX_TEAM_SIZE: usize = 6;

/// Up to six Pokémon, unique by id, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PokemonSummary>", into = "Vec<PokemonSummary>")]
pub struct TeamRoster {
    members: Vec<PokemonSummary>,
}

impl TeamRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pokemon: PokemonSummary) -> Result<()> {
        if self.is_full() {
            return Err(PokedexError::Validation(format!(
                "team is already full ({}/{})",
                self.members.len(),
                MAX_TEAM_SIZE
            )));
        }
        if self.contains(pokemon.id) {
            return Err(PokedexError::Validation(format!(
                "{} is already in the team",
                pokemon.name
            )));
        }
        tracing::debug!("Added {} to the team", pokemon.name);
        self.members.push(pokemon);
        Ok(())
    }

    pub fn remove(&mut self, id: u32) -> Option<PokemonSummary> {
        let index = self.members.iter().position(|p| p.id == id)?;
        Some(self.members.remove(index))
    }

    pub fn contains(&self, id: u32) -> bool {
        self.members.iter().any(|p| p.id == id)
    }

    pub fn members(&self) -> &[PokemonSummary] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= MAX_TEAM_SIZE
    }
}

impl TryFrom<Vec<PokemonSummary>> for TeamRoster {
    type Error = PokedexError;

    fn try_from(members: Vec<PokemonSummary>) -> Result<Self> {
        let mut roster = TeamRoster::new();
        for member in members {
            roster.add(member)?;
        }
        Ok(roster)
    }
}

impl From<TeamRoster> for Vec<PokemonSummary> {
    fn from(roster: TeamRoster) -> Self {
        roster.members
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Bucket by the average multiplier per team member.
    fn from_average(average: f32) -> Self {
        if average >= 4.0 {
            Severity::Critical
        } else if average >= 2.0 {
            Severity::High
        } else if average >= 1.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedMember {
    pub name: String,
    pub multiplier: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weakness {
    pub attacking: PokemonType,
    /// Sum of the super-effective multipliers across the team.
    pub score: f32,
    pub severity: Severity,
    pub affected: Vec<AffectedMember>,
}

/// How many distinct team types resist (or are immune to) one attacking type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub count: usize,
    pub types: Vec<PokemonType>,
}

impl Tally {
    fn record(&mut self, defending: PokemonType) {
        self.count += 1;
        self.types.push(defending);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub defending: PokemonType,
    pub effectiveness: f32,
    pub covering_types: Vec<PokemonType>,
    pub covered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Weakness,
    Coverage,
    Diversity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamReport {
    /// In type order; see [`TeamReport::weaknesses_by_score`].
    pub weaknesses: Vec<Weakness>,
    pub resistances: BTreeMap<PokemonType, Tally>,
    pub immunities: BTreeMap<PokemonType, Tally>,
    pub coverage: Vec<Coverage>,
    pub coverage_percent: u32,
    pub recommendations: Vec<Recommendation>,
}

impl TeamReport {
    pub fn weakness(&self, attacking: PokemonType) -> Option<&Weakness> {
        self.weaknesses.iter().find(|w| w.attacking == attacking)
    }

    pub fn weaknesses_by_score(&self) -> Vec<&Weakness> {
        let mut sorted: Vec<&Weakness> = self.weaknesses.iter().collect();
        sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
        sorted
    }

    pub fn covered_count(&self) -> usize {
        self.coverage.iter().filter(|c| c.covered).count()
    }

    pub fn uncovered(&self) -> Vec<PokemonType> {
        self.coverage
            .iter()
            .filter(|c| !c.covered)
            .map(|c| c.defending)
            .collect()
    }
}

/// Known types of one member; unknown names are skipped.
fn member_types(member: &PokemonSummary) -> Vec<PokemonType> {
    member
        .types
        .iter()
        .filter_map(|name| {
            let parsed = PokemonType::from_name(name);
            if parsed.is_none() {
                tracing::warn!("Skipping unknown type '{}' of {}", name, member.name);
            }
            parsed
        })
        .collect()
}

/// Analyze weaknesses, resistances, offensive coverage and give advice.
/// Pure: depends only on the roster and the static charts.
pub fn analyze(roster: &TeamRoster) -> Result<TeamReport> {
    if roster.is_empty() {
        return Err(PokedexError::Validation(
            "add Pokémon to the team before analyzing it".into(),
        ));
    }

    let typed: Vec<(&PokemonSummary, Vec<PokemonType>)> = roster
        .members()
        .iter()
        .map(|member| (member, member_types(member)))
        .collect();

    let mut team_types: Vec<PokemonType> = Vec::new();
    for (_, types) in &typed {
        for t in types {
            if !team_types.contains(t) {
                team_types.push(*t);
            }
        }
    }

    let weaknesses = weaknesses(&typed);
    let (resistances, immunities) = resistances(&team_types);
    let coverage = coverage(&team_types);
    let covered = coverage.iter().filter(|c| c.covered).count();
    let coverage_percent = (covered as f32 / PokemonType::ALL.len() as f32 * 100.0).round() as u32;
    let recommendations = recommendations(&weaknesses, &coverage, team_types.len());

    tracing::debug!(
        "Analyzed team of {}: {} weaknesses, {}% coverage",
        roster.len(),
        weaknesses.len(),
        coverage_percent
    );

    Ok(TeamReport {
        weaknesses,
        resistances,
        immunities,
        coverage,
        coverage_percent,
        recommendations,
    })
}

fn weaknesses(typed: &[(&PokemonSummary, Vec<PokemonType>)]) -> Vec<Weakness> {
    let team_size = typed.len() as f32;
    PokemonType::all()
        .iter()
        .filter_map(|attacking| {
            let affected: Vec<AffectedMember> = typed
                .iter()
                .filter_map(|(member, types)| {
                    let multiplier = attacking.multiplier_against(types);
                    (multiplier > 1.0).then(|| AffectedMember {
                        name: member.name.clone(),
                        multiplier,
                    })
                })
                .collect();
            let score: f32 = affected.iter().map(|a| a.multiplier).sum();
            (score > 0.0).then(|| Weakness {
                attacking: *attacking,
                score,
                severity: Severity::from_average(score / team_size),
                affected,
            })
        })
        .collect()
}

type Tallies = BTreeMap<PokemonType, Tally>;

/// Tallied per distinct team type, so two grass members resist water once.
fn resistances(team_types: &[PokemonType]) -> (Tallies, Tallies) {
    let mut resistances = Tallies::new();
    let mut immunities = Tallies::new();
    for defending in team_types {
        let relations = defending.relations();
        for resisted in relations.resists {
            resistances.entry(*resisted).or_default().record(*defending);
        }
        for immune in relations.immune_to {
            immunities.entry(*immune).or_default().record(*defending);
        }
    }
    (resistances, immunities)
}

/// Best team attacker per defending type. Ties are only collected above 1x,
/// so an uncovered entry names the first attacker reaching its best value.
fn coverage(team_types: &[PokemonType]) -> Vec<Coverage> {
    PokemonType::all()
        .iter()
        .map(|defending| {
            let mut best = 0.0_f32;
            let mut covering: Vec<PokemonType> = Vec::new();
            for attacking in team_types {
                let effectiveness = attacking.offensive_effectiveness(*defending);
                if effectiveness > best {
                    best = effectiveness;
                    covering = vec![*attacking];
                } else if effectiveness == best && effectiveness > 1.0 {
                    covering.push(*attacking);
                }
            }
            Coverage {
                defending: *defending,
                effectiveness: best,
                covering_types: covering,
                covered: best > 1.0,
            }
        })
        .collect()
}

fn recommendations(
    weaknesses: &[Weakness],
    coverage: &[Coverage],
    distinct_types: usize,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let critical: Vec<&str> = weaknesses
        .iter()
        .filter(|w| w.severity == Severity::Critical)
        .map(|w| w.attacking.as_str())
        .collect();
    if !critical.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Weakness,
            priority: Priority::High,
            message: format!(
                "Critical weakness against: {}. Consider Pokémon that resist these types.",
                critical.join(", ")
            ),
        });
    }

    let uncovered = coverage.iter().filter(|c| !c.covered).count();
    if uncovered > 12 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Coverage,
            priority: Priority::Medium,
            message: "Poor offensive coverage. Consider more varied attacking types.".into(),
        });
    }

    if distinct_types < 3 {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Diversity,
            priority: Priority::Medium,
            message: "The team has little type diversity. Add Pokémon with different types."
                .into(),
        });
    }

    recommendations
}
