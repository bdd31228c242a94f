use serde::{Deserialize, Serialize};

/// A cell coordinate on the dungeon grid. `z` is a discrete dungeon level,
/// not a continuous height. Field order is z-major so the derived `Ord`
/// iterates level by level in BTree collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub z: i32,
    pub y: i32,
    pub x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Hero,
    Guard,
    Monster,
    Boss,
}

/// Where the generator bound an enemy in the room topology. Room-bound
/// enemies become reachable when their room is conquered; passage guardians
/// when either endpoint room is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyPlacement {
    Room { room_id: usize },
    Passage { r1: usize, r2: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameError {
    GameOver,
    NoPendingCombat,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    GameStarted,
    LevelEntered { level: u32 },
    EnemyDefeated { kind: EntityKind, gained_hp: i32, hero_hp: i32 },
    HeroDefeated { kind: EntityKind },
    ExitReached,
    NoWinnableFights { hero_hp: i32 },
}

impl LogEvent {
    /// Player-facing rendering of the event, used by the CLI.
    pub fn message(&self) -> String {
        match self {
            Self::GameStarted => "Game started! Welcome to Vigor.".to_string(),
            Self::LevelEntered { level } => format!("Welcome to level {level}!"),
            Self::EnemyDefeated { kind, gained_hp, hero_hp } => {
                format!("Defeated {kind:?}! Gained {gained_hp} HP. Current HP: {hero_hp}")
            }
            Self::HeroDefeated { kind } => format!("Defeated by {kind:?}... Game over."),
            Self::ExitReached => "You reached the exit! Victory!".to_string(),
            Self::NoWinnableFights { hero_hp } => {
                format!("Game over: no reachable enemy you can defeat (your HP: {hero_hp})")
            }
        }
    }
}
