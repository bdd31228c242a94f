//! Three-dimensional tactical pathfinding over the tile grid.
//! Routes honor stairs junctions, overhangs, fog-of-war gating, and enemy
//! blocking. An unreachable goal is a normal `None`, never an error.

use std::collections::BTreeSet;

use crate::state::{Entity, GridMap, Tile};
use crate::types::Pos;

struct Node {
    pos: Pos,
    g: u32,
    h: u32,
    parent: Option<usize>,
}

/// A* from `start` to `goal`, both inclusive in the returned sequence.
///
/// Step cost is uniform; the heuristic is Manhattan distance plus a heavy
/// per-level penalty, which biases routes toward staying on one level. The
/// open list is scanned linearly and the first node with minimal `f = g + h`
/// wins, with no secondary key — path shape is deterministic for identical
/// inputs and callers may rely on that.
///
/// Enemies block traversal except when standing on `goal` itself, so a route
/// may end on an enemy (that engagement is the caller's business). With
/// `visible` supplied, candidates outside the set are untraversable; the
/// start cell is always traversable.
pub fn find_path(
    map: &GridMap,
    start: Pos,
    goal: Pos,
    enemies: &[Entity],
    visible: Option<&BTreeSet<Pos>>,
) -> Option<Vec<Pos>> {
    let mut nodes = vec![Node { pos: start, g: 0, h: heuristic(start, goal), parent: None }];
    let mut open: Vec<usize> = vec![0];
    let mut closed: BTreeSet<Pos> = BTreeSet::new();

    while !open.is_empty() {
        let mut best_slot = 0;
        for slot in 1..open.len() {
            let candidate = &nodes[open[slot]];
            let best = &nodes[open[best_slot]];
            if candidate.g + candidate.h < best.g + best.h {
                best_slot = slot;
            }
        }
        let current = open.remove(best_slot);
        let current_pos = nodes[current].pos;

        if current_pos == goal {
            return Some(reconstruct(&nodes, current));
        }
        closed.insert(current_pos);

        let tentative_g = nodes[current].g + 1;
        for neighbor in neighbors(map, current_pos, goal, enemies, visible) {
            if closed.contains(&neighbor) {
                continue;
            }
            match open.iter().copied().find(|&index| nodes[index].pos == neighbor) {
                Some(index) => {
                    if tentative_g < nodes[index].g {
                        nodes[index].g = tentative_g;
                        nodes[index].parent = Some(current);
                    }
                }
                None => {
                    nodes.push(Node {
                        pos: neighbor,
                        g: tentative_g,
                        h: heuristic(neighbor, goal),
                        parent: Some(current),
                    });
                    open.push(nodes.len() - 1);
                }
            }
        }
    }

    None
}

fn reconstruct(nodes: &[Node], goal_index: usize) -> Vec<Pos> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        path.push(nodes[index].pos);
        cursor = nodes[index].parent;
    }
    path.reverse();
    path
}

/// Valid moves out of `from`, in a fixed generation order so open-list
/// insertion order (and therefore tie-breaking) is reproducible.
fn neighbors(
    map: &GridMap,
    from: Pos,
    goal: Pos,
    enemies: &[Entity],
    visible: Option<&BTreeSet<Pos>>,
) -> Vec<Pos> {
    const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

    let mut candidates = Vec::new();
    for (dx, dy) in DIRECTIONS {
        let nx = from.x + dx;
        let ny = from.y + dy;
        if nx < 0 || nx >= map.width as i32 || ny < 0 || ny >= map.height as i32 {
            continue;
        }

        // A tile hanging one level above blocks horizontal entry unless it is
        // a stairs tile, independent of walkability at this level.
        let above = Pos { z: from.z + 1, y: ny, x: nx };
        let blocked_from_above = map.tile_at(above).is_some_and(|tile| !tile.is_stairs());

        let level_pos = Pos { z: from.z, y: ny, x: nx };
        if !blocked_from_above && map.is_walkable(level_pos) {
            if map.tile_at(level_pos).is_some_and(Tile::is_stairs) {
                // A stairs tile is a three-way junction: one up, one down,
                // or stay on this level.
                let up = Pos { z: from.z + 1, y: ny, x: nx };
                if up.z < map.levels as i32 && map.is_walkable(up) {
                    candidates.push(up);
                }
                let down = Pos { z: from.z - 1, y: ny, x: nx };
                if down.z >= 0 && map.is_walkable(down) {
                    candidates.push(down);
                }
            }
            candidates.push(level_pos);
        }

        // A walkable stairs tile one level up or down can be stepped onto
        // directly from an adjacent cell, even when this level's cell is not
        // walkable.
        let up = Pos { z: from.z + 1, y: ny, x: nx };
        if up.z < map.levels as i32
            && map.tile_at(up).is_some_and(Tile::is_stairs)
            && map.is_walkable(up)
        {
            candidates.push(up);
        }
        let down = Pos { z: from.z - 1, y: ny, x: nx };
        if down.z >= 0
            && map.tile_at(down).is_some_and(Tile::is_stairs)
            && map.is_walkable(down)
        {
            candidates.push(down);
        }
    }

    let mut seen = BTreeSet::new();
    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !seen.insert(candidate) {
            continue;
        }
        if visible.is_some_and(|set| !set.contains(&candidate)) {
            continue;
        }
        if candidate != goal && enemies.iter().any(|enemy| enemy.position == candidate) {
            continue;
        }
        unique.push(candidate);
    }
    unique
}

fn heuristic(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y) + 10 * a.z.abs_diff(b.z)
}
