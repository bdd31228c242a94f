//! Enemy placement over a carved layout: passage guardians, bosses, and
//! room monsters. Hp ranges drive the progressive-conquest difficulty curve.

use std::collections::BTreeSet;

use rand_chacha::ChaCha8Rng;

use crate::state::{Entity, GridMap};
use crate::types::{EnemyPlacement, EntityKind, Pos};

use super::generator::roll_range;
use super::model::{Passage, Room};

const EXIT_BOSS_HP: (i32, i32) = (200, 400);
const MID_BOSS_HP: (i32, i32) = (100, 250);
const GUARD_HP: (i32, i32) = (10, 60);
const MONSTER_HP: (i32, i32) = (5, 40);

const MID_BOSS_CHANCE_PERCENT: i32 = 20;
const GUARD_CHANCE_PERCENT: i32 = 80;

const MIN_MONSTERS_PER_ROOM: i32 = 2;
const MAX_MONSTERS_PER_ROOM: i32 = 4;

pub(super) struct SpawnContext<'a> {
    pub map: &'a GridMap,
    pub rooms: &'a [Room],
    pub passages: &'a [Passage],
}

/// Place enemies into `entities` (which already carries the hero, so
/// occupancy checks see it). One guardian at most per passage cell; every
/// passage into the exit room gets a boss so the endgame is always gated.
pub(super) fn place_enemies(
    context: &SpawnContext<'_>,
    rng: &mut ChaCha8Rng,
    entities: &mut Vec<Entity>,
) {
    let exit_room_id = context.rooms.len() - 1;
    let room_count = context.rooms.len();

    let mut used_cells: BTreeSet<(i32, i32)> = BTreeSet::new();
    for passage in context.passages {
        if !used_cells.insert((passage.x, passage.y)) {
            continue;
        }

        let guards_exit = passage.r1 == exit_room_id || passage.r2 == exit_room_id;
        let interior = passage.r1 > 2 && passage.r2 < room_count.saturating_sub(2);

        let (kind, hp) = if guards_exit {
            (EntityKind::Boss, roll_range(rng, EXIT_BOSS_HP.0, EXIT_BOSS_HP.1))
        } else if interior && roll_range(rng, 0, 100) < MID_BOSS_CHANCE_PERCENT {
            (EntityKind::Boss, roll_range(rng, MID_BOSS_HP.0, MID_BOSS_HP.1))
        } else if roll_range(rng, 0, 100) < GUARD_CHANCE_PERCENT {
            (EntityKind::Guard, roll_range(rng, GUARD_HP.0, GUARD_HP.1))
        } else {
            continue;
        };

        entities.push(Entity {
            kind,
            position: Pos { z: 0, y: passage.y, x: passage.x },
            hp,
            placement: Some(EnemyPlacement::Passage { r1: passage.r1, r2: passage.r2 }),
        });
    }

    for room in context.rooms {
        let monster_count = roll_range(rng, MIN_MONSTERS_PER_ROOM, MAX_MONSTERS_PER_ROOM);
        for _ in 0..monster_count {
            let x = roll_range(rng, room.x, room.right());
            let y = roll_range(rng, room.y, room.bottom());
            let pos = Pos { z: 0, y, x };
            if !is_free_floor(context.map, entities, pos) {
                continue;
            }
            entities.push(Entity {
                kind: EntityKind::Monster,
                position: pos,
                hp: roll_range(rng, MONSTER_HP.0, MONSTER_HP.1),
                placement: Some(EnemyPlacement::Room { room_id: room.id }),
            });
        }
    }
}

fn is_free_floor(map: &GridMap, entities: &[Entity], pos: Pos) -> bool {
    let Some(tile) = map.tile_at(pos) else {
        return false;
    };
    if tile.kind != "floor" || !tile.walkable {
        return false;
    }
    !entities.iter().any(|entity| entity.position == pos)
}
