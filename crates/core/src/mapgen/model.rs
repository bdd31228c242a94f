//! Public data model for generated dungeons: rooms, passages, and the
//! finished map bundle handed to the game and the map file writer.

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::state::{Entity, GridMap};
use crate::types::{EnemyPlacement, EntityKind, Pos};

/// An axis-aligned rectangular room. Ids are assigned in final order: id 0 is
/// the hero's spawn room and the highest id is the exit room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: usize,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    pub fn center(&self) -> Pos {
        Pos { z: 0, y: self.y + self.height / 2, x: self.x + self.width / 2 }
    }

    pub fn intersects(&self, other: &Room) -> bool {
        self.x <= other.right()
            && self.right() >= other.x
            && self.y <= other.bottom()
            && self.bottom() >= other.y
    }
}

/// A chokepoint corridor cell: single-width (walls on both perpendicular
/// sides) and carved between exactly two rooms. At most one guardian enemy
/// is bound to a passage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub x: i32,
    pub y: i32,
    pub r1: usize,
    pub r2: usize,
}

/// Everything one successful generation attempt produces. The grid and the
/// topology metadata describe the same dungeon at two granularities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedMap {
    pub map: GridMap,
    pub entities: Vec<Entity>,
    pub rooms: Vec<Room>,
    pub passages: Vec<Passage>,
}

impl GeneratedMap {
    /// Canonical byte encoding of the whole bundle, for fingerprinting and
    /// byte-identity assertions in determinism tests.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.map.width as u32).to_le_bytes());
        bytes.extend((self.map.height as u32).to_le_bytes());
        bytes.extend((self.map.levels as u32).to_le_bytes());
        for z in 0..self.map.levels {
            for y in 0..self.map.height {
                for x in 0..self.map.width {
                    let pos = Pos { z: z as i32, y: y as i32, x: x as i32 };
                    match self.map.tile_at(pos) {
                        None => bytes.push(0),
                        Some(tile) => {
                            bytes.push(1);
                            bytes.push(u8::from(tile.walkable));
                            bytes.extend((tile.kind.len() as u32).to_le_bytes());
                            bytes.extend(tile.kind.as_bytes());
                        }
                    }
                }
            }
        }

        bytes.extend((self.entities.len() as u32).to_le_bytes());
        for entity in &self.entities {
            bytes.push(match entity.kind {
                EntityKind::Hero => 0,
                EntityKind::Guard => 1,
                EntityKind::Monster => 2,
                EntityKind::Boss => 3,
            });
            bytes.extend(entity.position.x.to_le_bytes());
            bytes.extend(entity.position.y.to_le_bytes());
            bytes.extend(entity.position.z.to_le_bytes());
            bytes.extend(entity.hp.to_le_bytes());
            match entity.placement {
                None => bytes.push(0),
                Some(EnemyPlacement::Room { room_id }) => {
                    bytes.push(1);
                    bytes.extend((room_id as u32).to_le_bytes());
                }
                Some(EnemyPlacement::Passage { r1, r2 }) => {
                    bytes.push(2);
                    bytes.extend((r1 as u32).to_le_bytes());
                    bytes.extend((r2 as u32).to_le_bytes());
                }
            }
        }

        bytes.extend((self.rooms.len() as u32).to_le_bytes());
        for room in &self.rooms {
            bytes.extend((room.id as u32).to_le_bytes());
            bytes.extend(room.x.to_le_bytes());
            bytes.extend(room.y.to_le_bytes());
            bytes.extend(room.width.to_le_bytes());
            bytes.extend(room.height.to_le_bytes());
        }

        bytes.extend((self.passages.len() as u32).to_le_bytes());
        for passage in &self.passages {
            bytes.extend(passage.x.to_le_bytes());
            bytes.extend(passage.y.to_le_bytes());
            bytes.extend((passage.r1 as u32).to_le_bytes());
            bytes.extend((passage.r2 as u32).to_le_bytes());
        }

        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}
