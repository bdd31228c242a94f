use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{EnemyPlacement, EntityKind, LogEvent, Pos};

/// Most recent log entries kept per game, newest first.
pub const MAX_LOG_ENTRIES: usize = 10;

/// Static terrain data for a single cell. `kind` is a free-form string so
/// editor-authored variants (`stairs_up`, `wall_mossy`, ...) stay recognizable
/// through substring/prefix checks; the core only ever asks the predicates
/// below. `texture` is cosmetic and ignored by all logic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: String,
    pub walkable: bool,
    #[serde(default)]
    pub texture: String,
}

impl Tile {
    pub fn floor() -> Self {
        Self { kind: "floor".to_string(), walkable: true, texture: "stone_floor".to_string() }
    }

    pub fn wall() -> Self {
        Self { kind: "wall".to_string(), walkable: false, texture: "stone_floor".to_string() }
    }

    pub fn exit() -> Self {
        Self { kind: "exit".to_string(), walkable: true, texture: "stone_floor".to_string() }
    }

    pub fn is_stairs(&self) -> bool {
        self.kind.contains("stairs")
    }

    pub fn is_exit(&self) -> bool {
        self.kind == "exit"
    }

    pub fn is_wall(&self) -> bool {
        self.kind.starts_with("wall")
    }
}

/// Immutable (per tick) three-dimensional tile store. A cell holds either no
/// tile (void) or exactly one tile; lookups outside the grid return `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMap {
    pub width: usize,
    pub height: usize,
    pub levels: usize,
    tiles: Vec<Option<Tile>>,
}

impl GridMap {
    pub fn new(width: usize, height: usize, levels: usize) -> Self {
        Self { width, height, levels, tiles: vec![None; width * height * levels] }
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && pos.z >= 0
            && (pos.x as usize) < self.width
            && (pos.y as usize) < self.height
            && (pos.z as usize) < self.levels
    }

    pub fn tile_at(&self, pos: Pos) -> Option<&Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.tiles[self.index(pos)].as_ref()
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Tile) {
        if !self.in_bounds(pos) {
            return;
        }
        let index = self.index(pos);
        self.tiles[index] = Some(tile);
    }

    pub fn clear_tile(&mut self, pos: Pos) {
        if !self.in_bounds(pos) {
            return;
        }
        let index = self.index(pos);
        self.tiles[index] = None;
    }

    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos).is_some_and(|tile| tile.walkable)
    }

    fn index(&self, pos: Pos) -> usize {
        ((pos.z as usize) * self.height + (pos.y as usize)) * self.width + (pos.x as usize)
    }
}

/// A positioned actor. Exactly one entity per game has `EntityKind::Hero`;
/// every other entity is an enemy. `placement` carries the generator's
/// topology binding and is absent on hand-authored maps.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Pos,
    pub hp: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<EnemyPlacement>,
}

#[derive(Debug)]
pub enum StateError {
    MissingHero,
    MultipleHeroes,
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHero => write!(f, "game state requires exactly one hero entity, found none"),
            Self::MultipleHeroes => write!(f, "game state requires exactly one hero entity, found several"),
        }
    }
}

/// Live state of one run. The map and topology metadata are read-only after
/// construction; only entity positions/hp and the bookkeeping fields change.
#[derive(Clone, Debug)]
pub struct GameState {
    pub map: GridMap,
    pub hero: Entity,
    /// Enemies in load order. Order is part of the contract: feasibility
    /// tie-breaks keep the first enemy encountered in this order.
    pub enemies: Vec<Entity>,
    /// Cells the hero has observed so far; pathfinding for player intents is
    /// gated to this set.
    pub observed: BTreeSet<Pos>,
    /// Newest-first event log, truncated to `MAX_LOG_ENTRIES`.
    pub log: VecDeque<LogEvent>,
    pub game_over: bool,
    pub victory: bool,
    pub current_level: u32,
    /// Position of an enemy the hero stepped onto, awaiting combat resolution.
    pub pending_combat: Option<Pos>,
}

impl GameState {
    /// Split a roster into hero and enemies. Fails fast when the hero count
    /// is not exactly one; this is the boundary where malformed input stops.
    pub fn new(map: GridMap, entities: Vec<Entity>, level: u32) -> Result<Self, StateError> {
        let mut hero = None;
        let mut enemies = Vec::with_capacity(entities.len());
        for entity in entities {
            if entity.kind == EntityKind::Hero {
                if hero.is_some() {
                    return Err(StateError::MultipleHeroes);
                }
                hero = Some(entity);
            } else {
                enemies.push(entity);
            }
        }
        let Some(hero) = hero else {
            return Err(StateError::MissingHero);
        };

        Ok(Self {
            map,
            hero,
            enemies,
            observed: BTreeSet::new(),
            log: VecDeque::new(),
            game_over: false,
            victory: false,
            current_level: level,
            pending_combat: None,
        })
    }

    pub fn enemy_at(&self, pos: Pos) -> Option<&Entity> {
        self.enemies.iter().find(|enemy| enemy.position == pos)
    }

    pub fn remove_enemy_at(&mut self, pos: Pos) -> Option<Entity> {
        let index = self.enemies.iter().position(|enemy| enemy.position == pos)?;
        Some(self.enemies.remove(index))
    }

    pub fn push_log(&mut self, event: LogEvent) {
        self.log.push_front(event);
        self.log.truncate(MAX_LOG_ENTRIES);
    }
}
