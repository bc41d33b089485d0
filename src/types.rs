//! Elemental types and the static relationship tables used by the team analyzer.
//!
//! The charts here are an illustrative simplification, not official game data.

use serde::{Deserialize, Serialize};

/// The 18 categorical types, in PokeAPI order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PokemonType {
    Normal = 0,
    Fire = 1,
    Water = 2,
    Electric = 3,
    Grass = 4,
    Ice = 5,
    Fighting = 6,
    Poison = 7,
    Ground = 8,
    Flying = 9,
    Psychic = 10,
    Bug = 11,
    Rock = 12,
    Ghost = 13,
    Dragon = 14,
    Dark = 15,
    Steel = 16,
    Fairy = 17,
}

use PokemonType::*;

impl PokemonType {
    pub const ALL: [PokemonType; 18] = [
        Normal, Fire, Water, Electric, Grass, Ice, Fighting, Poison, Ground, Flying, Psychic, Bug,
        Rock, Ghost, Dragon, Dark, Steel, Fairy,
    ];

    pub fn all() -> &'static [PokemonType] {
        &Self::ALL
    }

    /// Parse an API type name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// The lowercase name PokeAPI uses in URLs and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Normal => "normal",
            Fire => "fire",
            Water => "water",
            Electric => "electric",
            Grass => "grass",
            Ice => "ice",
            Fighting => "fighting",
            Poison => "poison",
            Ground => "ground",
            Flying => "flying",
            Psychic => "psychic",
            Bug => "bug",
            Rock => "rock",
            Ghost => "ghost",
            Dragon => "dragon",
            Dark => "dark",
            Steel => "steel",
            Fairy => "fairy",
        }
    }

    /// Defensive relations of this type when it is being attacked.
    pub fn relations(&self) -> &'static TypeRelations {
        &TYPE_RELATIONS[*self as usize]
    }

    /// Incoming damage multiplier of `attacking` against this single defending type.
    pub fn defensive_multiplier(&self, attacking: PokemonType) -> f32 {
        let relations = self.relations();
        if relations.immune_to.contains(&attacking) {
            0.0
        } else if relations.resists.contains(&attacking) {
            0.5
        } else if relations.weak_against.contains(&attacking) {
            2.0
        } else {
            1.0
        }
    }

    /// Product of the per-type multipliers for a one- or two-typed defender.
    pub fn multiplier_against(&self, defenders: &[PokemonType]) -> f32 {
        defenders
            .iter()
            .map(|d| d.defensive_multiplier(*self))
            .product()
    }

    /// Effectiveness of this type's attacks using the reduced offensive chart.
    /// Attacking types without an entry are neutral against everything.
    pub fn offensive_effectiveness(&self, defending: PokemonType) -> f32 {
        let Some(entry) = OFFENSIVE_CHART.iter().find(|e| e.attacking == *self) else {
            return 1.0;
        };
        if entry.no_effect.contains(&defending) {
            0.0
        } else if entry.super_effective.contains(&defending) {
            2.0
        } else if entry.not_very_effective.contains(&defending) {
            0.5
        } else {
            1.0
        }
    }
}

impl std::fmt::Display for PokemonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PokemonType {
    type Err = crate::error::PokedexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| crate::error::PokedexError::Validation(format!("unknown type '{}'", s)))
    }
}

/// Defensive row of the relationship table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeRelations {
    /// Attacking types dealing double damage.
    pub weak_against: &'static [PokemonType],
    /// Attacking types dealing half damage.
    pub resists: &'static [PokemonType],
    /// Attacking types dealing no damage.
    pub immune_to: &'static [PokemonType],
}

/// Indexed by `PokemonType as usize`.
pub static TYPE_RELATIONS: [TypeRelations; 18] = [
    // normal
    TypeRelations { weak_against: &[Fighting], resists: &[], immune_to: &[Ghost] },
    // fire
    TypeRelations {
        weak_against: &[Water, Ground, Rock],
        resists: &[Fire, Grass, Ice, Bug, Steel, Fairy],
        immune_to: &[],
    },
    // water
    TypeRelations {
        weak_against: &[Electric, Grass],
        resists: &[Fire, Water, Ice, Steel],
        immune_to: &[],
    },
    // electric
    TypeRelations { weak_against: &[Ground], resists: &[Electric, Flying, Steel], immune_to: &[] },
    // grass
    TypeRelations {
        weak_against: &[Fire, Ice, Poison, Flying, Bug],
        resists: &[Water, Electric, Grass, Ground],
        immune_to: &[],
    },
    // ice
    TypeRelations { weak_against: &[Fire, Fighting, Rock, Steel], resists: &[Ice], immune_to: &[] },
    // fighting
    TypeRelations {
        weak_against: &[Flying, Psychic, Fairy],
        resists: &[Bug, Rock, Dark],
        immune_to: &[],
    },
    // poison
    TypeRelations {
        weak_against: &[Ground, Psychic],
        resists: &[Grass, Fighting, Poison, Bug, Fairy],
        immune_to: &[],
    },
    // ground
    TypeRelations {
        weak_against: &[Water, Grass, Ice],
        resists: &[Poison, Rock],
        immune_to: &[Electric],
    },
    // flying
    TypeRelations {
        weak_against: &[Electric, Ice, Rock],
        resists: &[Grass, Fighting, Bug],
        immune_to: &[Ground],
    },
    // psychic
    TypeRelations { weak_against: &[Bug, Ghost, Dark], resists: &[Fighting, Psychic], immune_to: &[] },
    // bug
    TypeRelations {
        weak_against: &[Fire, Flying, Rock],
        resists: &[Grass, Fighting, Ground],
        immune_to: &[],
    },
    // rock
    TypeRelations {
        weak_against: &[Water, Grass, Fighting, Ground, Steel],
        resists: &[Normal, Fire, Poison, Flying],
        immune_to: &[],
    },
    // ghost
    TypeRelations {
        weak_against: &[Ghost, Dark],
        resists: &[Poison, Bug],
        immune_to: &[Normal, Fighting],
    },
    // dragon
    TypeRelations {
        weak_against: &[Ice, Dragon, Fairy],
        resists: &[Fire, Water, Electric, Grass],
        immune_to: &[],
    },
    // dark
    TypeRelations {
        weak_against: &[Fighting, Bug, Fairy],
        resists: &[Ghost, Dark],
        immune_to: &[Psychic],
    },
    // steel
    TypeRelations {
        weak_against: &[Fire, Fighting, Ground],
        resists: &[Normal, Grass, Ice, Flying, Psychic, Bug, Rock, Dragon, Steel, Fairy],
        immune_to: &[Poison],
    },
    // fairy
    TypeRelations {
        weak_against: &[Poison, Steel],
        resists: &[Fighting, Bug, Dark],
        immune_to: &[Dragon],
    },
];

/// Row of the reduced offensive chart.
#[derive(Debug, Clone, Copy)]
pub struct OffensiveEntry {
    pub attacking: PokemonType,
    pub super_effective: &'static [PokemonType],
    pub not_very_effective: &'static [PokemonType],
    pub no_effect: &'static [PokemonType],
}

pub static OFFENSIVE_CHART: [OffensiveEntry; 8] = [
    OffensiveEntry {
        attacking: Fire,
        super_effective: &[Grass, Ice, Bug, Steel],
        not_very_effective: &[Fire, Water, Rock, Dragon],
        no_effect: &[],
    },
    OffensiveEntry {
        attacking: Water,
        super_effective: &[Fire, Ground, Rock],
        not_very_effective: &[Water, Grass, Dragon],
        no_effect: &[],
    },
    OffensiveEntry {
        attacking: Grass,
        super_effective: &[Water, Ground, Rock],
        not_very_effective: &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
        no_effect: &[],
    },
    OffensiveEntry {
        attacking: Electric,
        super_effective: &[Water, Flying],
        not_very_effective: &[Grass, Electric, Dragon],
        no_effect: &[Ground],
    },
    OffensiveEntry {
        attacking: Psychic,
        super_effective: &[Fighting, Poison],
        not_very_effective: &[Psychic, Steel],
        no_effect: &[Dark],
    },
    OffensiveEntry {
        attacking: Ice,
        super_effective: &[Grass, Ground, Flying, Dragon],
        not_very_effective: &[Fire, Water, Ice, Steel],
        no_effect: &[],
    },
    OffensiveEntry {
        attacking: Dragon,
        super_effective: &[Dragon],
        not_very_effective: &[Steel],
        no_effect: &[Fairy],
    },
    OffensiveEntry {
        attacking: Fighting,
        super_effective: &[Normal, Ice, Rock, Dark, Steel],
        not_very_effective: &[Poison, Flying, Psychic, Bug, Fairy],
        no_effect: &[Ghost],
    },
];
