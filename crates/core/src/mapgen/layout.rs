//! Room placement, corridor carving, and chokepoint detection.
//! Works on level 0 of the grid; rooms never touch the outer border.

use rand_chacha::ChaCha8Rng;

use crate::state::{GridMap, Tile};
use crate::types::Pos;

use super::generator::roll_range;
use super::model::{Passage, Room};

const MAX_ROOMS: usize = 15;
const ROOM_PLACEMENT_ATTEMPTS: usize = 500;
const MIN_ROOM_SIDE: i32 = 5;
const MAX_ROOM_SIDE: i32 = 9;

/// Carve up to [`MAX_ROOMS`] non-overlapping rooms into a wall-filled grid.
/// Ids are provisional creation-order ids; `assign_start_and_exit` renumbers.
pub(super) fn carve_rooms(map: &mut GridMap, rng: &mut ChaCha8Rng) -> Vec<Room> {
    let mut rooms: Vec<Room> = Vec::new();
    let mut attempts = 0;
    while rooms.len() < MAX_ROOMS && attempts < ROOM_PLACEMENT_ATTEMPTS {
        attempts += 1;
        let width = roll_range(rng, MIN_ROOM_SIDE, MAX_ROOM_SIDE);
        let height = roll_range(rng, MIN_ROOM_SIDE, MAX_ROOM_SIDE);
        let x = roll_range(rng, 1, map.width as i32 - width - 1);
        let y = roll_range(rng, 1, map.height as i32 - height - 1);
        let candidate = Room { id: rooms.len(), x, y, width, height };

        if rooms.iter().any(|existing| candidate.intersects(existing)) {
            continue;
        }

        for ry in candidate.y..=candidate.bottom() {
            for rx in candidate.x..=candidate.right() {
                map.set_tile(Pos { z: 0, y: ry, x: rx }, Tile::floor());
            }
        }
        rooms.push(candidate);
    }
    rooms
}

/// Connect consecutive rooms with L-shaped corridors (horizontal leg through
/// the first center's row, vertical leg through the second center's column).
/// Every newly carved single-width cell is recorded as a passage between the
/// two rooms being connected.
pub(super) fn connect_rooms(map: &mut GridMap, rooms: &[Room]) -> Vec<Passage> {
    let mut passages = Vec::new();
    for pair in rooms.windows(2) {
        let from = pair[0].center();
        let to = pair[1].center();
        carve_horizontal(map, from.x, to.x, from.y, pair[0].id, pair[1].id, &mut passages);
        carve_vertical(map, from.y, to.y, to.x, pair[0].id, pair[1].id, &mut passages);
    }
    passages
}

fn carve_horizontal(
    map: &mut GridMap,
    x1: i32,
    x2: i32,
    y: i32,
    r1: usize,
    r2: usize,
    passages: &mut Vec<Passage>,
) {
    for x in x1.min(x2)..=x1.max(x2) {
        carve_corridor_cell(map, x, y, r1, r2, passages);
    }
}

fn carve_vertical(
    map: &mut GridMap,
    y1: i32,
    y2: i32,
    x: i32,
    r1: usize,
    r2: usize,
    passages: &mut Vec<Passage>,
) {
    for y in y1.min(y2)..=y1.max(y2) {
        carve_corridor_cell(map, x, y, r1, r2, passages);
    }
}

fn carve_corridor_cell(
    map: &mut GridMap,
    x: i32,
    y: i32,
    r1: usize,
    r2: usize,
    passages: &mut Vec<Passage>,
) {
    let pos = Pos { z: 0, y, x };
    if !map.tile_at(pos).is_some_and(Tile::is_wall) {
        return;
    }
    map.set_tile(pos, Tile::floor());
    if is_narrow(map, x, y) {
        passages.push(Passage { x, y, r1, r2 });
    }
}

/// A corridor cell is a chokepoint when it still has walls on both horizontal
/// sides or both vertical sides at the moment it is carved.
fn is_narrow(map: &GridMap, x: i32, y: i32) -> bool {
    let wall_at = |x: i32, y: i32| {
        map.tile_at(Pos { z: 0, y, x }).is_none_or(|tile| tile.is_wall())
    };
    let horizontal_walls = wall_at(x - 1, y) && wall_at(x + 1, y);
    let vertical_walls = wall_at(x, y - 1) && wall_at(x, y + 1);
    horizontal_walls || vertical_walls
}

/// Pick the two rooms whose centers are farthest apart as spawn and exit,
/// move them to the first and last slots, renumber every room to its final
/// slot index, and remap passage endpoints through the same permutation.
/// After this, id 0 is the spawn room and the highest id is the exit room,
/// consistently across rooms, passages, and later enemy placements.
pub(super) fn assign_start_and_exit(rooms: &mut Vec<Room>, passages: &mut [Passage]) {
    debug_assert!(rooms.len() >= 2, "start/exit assignment needs at least two rooms");
    let mut best = (0usize, rooms.len() - 1);
    let mut best_distance = -1_i64;
    for i in 0..rooms.len() {
        for j in (i + 1)..rooms.len() {
            let a = rooms[i].center();
            let b = rooms[j].center();
            let dx = (a.x - b.x) as i64;
            let dy = (a.y - b.y) as i64;
            let distance = dx * dx + dy * dy;
            if distance > best_distance {
                best_distance = distance;
                best = (i, j);
            }
        }
    }

    // The search guarantees start_index < exit_index, so removing the exit
    // first leaves the start index valid.
    let (start_index, exit_index) = best;
    let exit_room = rooms.remove(exit_index);
    let start_room = rooms.remove(start_index);
    rooms.insert(0, start_room);
    rooms.push(exit_room);

    // old creation id -> final slot id
    let mut remap = vec![0usize; rooms.len()];
    for (slot, room) in rooms.iter().enumerate() {
        remap[room.id] = slot;
    }
    for room in rooms.iter_mut() {
        room.id = remap[room.id];
    }
    for passage in passages.iter_mut() {
        passage.r1 = remap[passage.r1];
        passage.r2 = remap[passage.r2];
    }
}

#[cfg(test)]
mod tests {
    use rand_chacha::rand_core::SeedableRng;

    use super::*;

    fn wall_grid(width: usize, height: usize) -> GridMap {
        let mut map = GridMap::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                map.set_tile(Pos { z: 0, y: y as i32, x: x as i32 }, Tile::wall());
            }
        }
        map
    }

    #[test]
    fn carved_rooms_do_not_overlap_and_stay_off_the_border() {
        let mut map = wall_grid(41, 41);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rooms = carve_rooms(&mut map, &mut rng);
        assert!(rooms.len() >= 5, "expected a dense layout, got {} rooms", rooms.len());

        for (i, left) in rooms.iter().enumerate() {
            assert!(left.x >= 1 && left.y >= 1);
            assert!(left.right() < map.width as i32 - 1);
            assert!(left.bottom() < map.height as i32 - 1);
            for right in &rooms[i + 1..] {
                assert!(!left.intersects(right), "rooms {left:?} and {right:?} overlap");
            }
        }
    }

    #[test]
    fn corridors_record_single_width_cells_as_passages() {
        let mut map = wall_grid(21, 9);
        let rooms = vec![
            Room { id: 0, x: 1, y: 2, width: 5, height: 5 },
            Room { id: 1, x: 14, y: 2, width: 5, height: 5 },
        ];
        for room in &rooms {
            for y in room.y..=room.bottom() {
                for x in room.x..=room.right() {
                    map.set_tile(Pos { z: 0, y, x }, Tile::floor());
                }
            }
        }

        let passages = connect_rooms(&mut map, &rooms);
        assert!(!passages.is_empty(), "a straight corridor between rooms must be narrow");
        for passage in &passages {
            assert_eq!((passage.r1, passage.r2), (0, 1));
            let above = map.tile_at(Pos { z: 0, y: passage.y - 1, x: passage.x });
            let below = map.tile_at(Pos { z: 0, y: passage.y + 1, x: passage.x });
            let left = map.tile_at(Pos { z: 0, y: passage.y, x: passage.x - 1 });
            let right = map.tile_at(Pos { z: 0, y: passage.y, x: passage.x + 1 });
            let vertical = above.is_some_and(Tile::is_wall) && below.is_some_and(Tile::is_wall);
            let horizontal = left.is_some_and(Tile::is_wall) && right.is_some_and(Tile::is_wall);
            assert!(vertical || horizontal, "passage at ({}, {}) is not narrow", passage.x, passage.y);
        }
    }

    #[test]
    fn start_and_exit_are_renumbered_to_first_and_last() {
        let mut rooms = vec![
            Room { id: 0, x: 18, y: 18, width: 5, height: 5 },
            Room { id: 1, x: 1, y: 1, width: 5, height: 5 },
            Room { id: 2, x: 34, y: 34, width: 5, height: 5 },
            Room { id: 3, x: 20, y: 12, width: 5, height: 5 },
        ];
        let mut passages = vec![
            Passage { x: 10, y: 3, r1: 0, r2: 1 },
            Passage { x: 30, y: 30, r1: 0, r2: 2 },
        ];
        assign_start_and_exit(&mut rooms, &mut passages);

        // The farthest pair is the (1,1) and (34,34) rooms.
        assert_eq!(rooms.first().map(|room| (room.x, room.y)), Some((1, 1)));
        assert_eq!(rooms.last().map(|room| (room.x, room.y)), Some((34, 34)));
        for (slot, room) in rooms.iter().enumerate() {
            assert_eq!(room.id, slot, "ids must equal final slot order");
        }

        // The old-id references were remapped through the same permutation.
        let old_room_0_new_id = rooms
            .iter()
            .find(|room| (room.x, room.y) == (18, 18))
            .map(|room| room.id)
            .expect("room still present");
        assert_eq!(passages[0].r1, old_room_0_new_id);
        assert_eq!(passages[0].r2, 0);
        assert_eq!(passages[1].r2, rooms.len() - 1);
    }
}
