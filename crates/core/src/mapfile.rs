//! JSON map files.
//!
//! The on-disk format is a single JSON document:
//! - `width`, `height`, `levels`: grid dimensions.
//! - `tiles`: flat list of cells that hold a tile, each with explicit
//!   coordinates; absent cells are void.
//! - `entities`: the roster, hero included, with optional topology bindings.
//! - `rooms`, `passages`: the generator's topology metadata, kept so a file
//!   can be re-validated without regenerating it. Optional for hand-authored
//!   maps.
//!
//! Loading validates dimensions, bounds, duplicates, and the hero count
//! before anything is returned; a half-valid map never escapes this module.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mapgen::{GeneratedMap, Passage, Room};
use crate::state::{Entity, GridMap, Tile};
use crate::types::{EntityKind, Pos};

// ---------------------------------------------------------------------------
// File format structs
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
struct TileRecord {
    x: i32,
    y: i32,
    z: i32,
    kind: String,
    walkable: bool,
    #[serde(default)]
    texture: String,
}

#[derive(Serialize, Deserialize)]
struct MapFile {
    width: usize,
    height: usize,
    levels: usize,
    tiles: Vec<TileRecord>,
    entities: Vec<Entity>,
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    passages: Vec<Passage>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum MapFileError {
    Io(io::Error),
    Parse { message: String },
    InvalidDimensions { width: usize, height: usize, levels: usize },
    TileOutOfBounds { x: i32, y: i32, z: i32 },
    DuplicateTile { x: i32, y: i32, z: i32 },
    EntityOutOfBounds { x: i32, y: i32, z: i32 },
    MissingHero,
    MultipleHeroes,
}

impl fmt::Display for MapFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "map file I/O error: {error}"),
            Self::Parse { message } => write!(f, "invalid map JSON: {message}"),
            Self::InvalidDimensions { width, height, levels } => {
                write!(f, "map dimensions must be positive, got {width}x{height}x{levels}")
            }
            Self::TileOutOfBounds { x, y, z } => {
                write!(f, "tile at ({x}, {y}, {z}) lies outside the declared dimensions")
            }
            Self::DuplicateTile { x, y, z } => {
                write!(f, "cell ({x}, {y}, {z}) holds more than one tile")
            }
            Self::EntityOutOfBounds { x, y, z } => {
                write!(f, "entity at ({x}, {y}, {z}) lies outside the declared dimensions")
            }
            Self::MissingHero => write!(f, "map declares no hero entity"),
            Self::MultipleHeroes => write!(f, "map declares more than one hero entity"),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A fully validated map bundle ready for `Game::new`.
#[derive(Debug)]
pub struct LoadedMap {
    pub map: GridMap,
    pub entities: Vec<Entity>,
    pub rooms: Vec<Room>,
    pub passages: Vec<Passage>,
}

pub fn load_map(path: &Path) -> Result<LoadedMap, MapFileError> {
    let content = fs::read_to_string(path).map_err(MapFileError::Io)?;
    parse_map(&content)
}

pub fn parse_map(json: &str) -> Result<LoadedMap, MapFileError> {
    let file: MapFile =
        serde_json::from_str(json).map_err(|e| MapFileError::Parse { message: e.to_string() })?;

    if file.width == 0 || file.height == 0 || file.levels == 0 {
        return Err(MapFileError::InvalidDimensions {
            width: file.width,
            height: file.height,
            levels: file.levels,
        });
    }

    let mut map = GridMap::new(file.width, file.height, file.levels);
    for record in file.tiles {
        let pos = Pos { z: record.z, y: record.y, x: record.x };
        if !map.in_bounds(pos) {
            return Err(MapFileError::TileOutOfBounds { x: record.x, y: record.y, z: record.z });
        }
        if map.tile_at(pos).is_some() {
            return Err(MapFileError::DuplicateTile { x: record.x, y: record.y, z: record.z });
        }
        map.set_tile(
            pos,
            Tile { kind: record.kind, walkable: record.walkable, texture: record.texture },
        );
    }

    let mut hero_count = 0;
    for entity in &file.entities {
        if !map.in_bounds(entity.position) {
            return Err(MapFileError::EntityOutOfBounds {
                x: entity.position.x,
                y: entity.position.y,
                z: entity.position.z,
            });
        }
        if entity.kind == EntityKind::Hero {
            hero_count += 1;
        }
    }
    match hero_count {
        0 => return Err(MapFileError::MissingHero),
        1 => {}
        _ => return Err(MapFileError::MultipleHeroes),
    }

    Ok(LoadedMap {
        map,
        entities: file.entities,
        rooms: file.rooms,
        passages: file.passages,
    })
}

// ---------------------------------------------------------------------------
// Saving
// ---------------------------------------------------------------------------

/// Write a generated dungeon as pretty-printed JSON.
pub fn save_map(path: &Path, generated: &GeneratedMap) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut tiles = Vec::new();
    for z in 0..generated.map.levels as i32 {
        for y in 0..generated.map.height as i32 {
            for x in 0..generated.map.width as i32 {
                if let Some(tile) = generated.map.tile_at(Pos { z, y, x }) {
                    tiles.push(TileRecord {
                        x,
                        y,
                        z,
                        kind: tile.kind.clone(),
                        walkable: tile.walkable,
                        texture: tile.texture.clone(),
                    });
                }
            }
        }
    }

    let file = MapFile {
        width: generated.map.width,
        height: generated.map.height,
        levels: generated.map.levels,
        tiles,
        entities: generated.entities.clone(),
        rooms: generated.rooms.clone(),
        passages: generated.passages.clone(),
    };

    let json = serde_json::to_string_pretty(&file).map_err(io::Error::other)?;
    fs::write(path, json)
}
