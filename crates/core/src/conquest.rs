//! Progressive-conquest feasibility in two granularities.
//!
//! The game's core mechanic is monotone: defeating an enemy whose hp the hero
//! can match transfers that hp to the hero, so reach and strength only ever
//! grow. Two checkers exploit that property at different resolutions:
//!
//! - [`any_winnable_fight`] answers "can the hero still make progress this
//!   turn" on the live tile grid. It is a one-move lookahead: it does not
//!   verify that winning the best available fight leaves the rest of the game
//!   winnable, so a doomed run can survive this check for a few more moves.
//! - [`layout_is_feasible`] proves or refutes completability of a whole
//!   generated layout on the abstract room/passage graph, by running the
//!   greedy weakest-reachable-first conquest to a fixed point.
//!
//! The two deliberately differ in strictness: live combat coin-flips hp ties
//! in the hero's favor half the time, so the live check counts ties as
//! winnable, while the generator refuses to rely on coin luck and requires
//! strictly smaller enemy hp. Both are pure functions of their snapshots.

use std::collections::BTreeSet;

use crate::game::pathfinding::find_path;
use crate::mapgen::{Passage, Room};
use crate::state::{Entity, GridMap};
use crate::types::{EnemyPlacement, EntityKind};

/// True while at least one enemy is both currently beatable
/// (`hero.hp >= enemy.hp`) and physically reachable on the grid. Fog-of-war
/// is ignored: losing sight of the last beatable enemy is not a loss.
///
/// Enemies are visited in roster order and the full roster blocks the route,
/// except that the target itself may terminate the path.
pub fn any_winnable_fight(map: &GridMap, hero: &Entity, enemies: &[Entity]) -> bool {
    enemies.iter().any(|enemy| {
        hero.hp >= enemy.hp
            && find_path(map, hero.position, enemy.position, enemies, None).is_some()
    })
}

/// Greedy completability proof for a generated layout.
///
/// Starting from room 0 with `start_hp`, repeatedly defeat the reachable
/// enemy with minimum hp (first in input order on ties) as long as that
/// minimum is strictly below the hero's accumulated hp; conquering a passage
/// guardian opens both endpoint rooms. The layout is feasible iff the exit
/// room (highest id) ends up visited.
///
/// Greedy suffices: defeating any beatable enemy only grows hp and the
/// visited set and removes no future option, so taking the weakest first
/// dominates every other order.
pub fn layout_is_feasible(
    rooms: &[Room],
    passages: &[Passage],
    enemies: &[Entity],
    start_hp: i32,
) -> bool {
    if rooms.is_empty() {
        return false;
    }
    debug_assert!(
        passages.iter().all(|passage| passage.r1 < rooms.len() && passage.r2 < rooms.len()),
        "passage endpoints must name existing rooms"
    );
    debug_assert!(
        enemies.iter().all(|enemy| match enemy.placement {
            Some(EnemyPlacement::Room { room_id }) => room_id < rooms.len(),
            Some(EnemyPlacement::Passage { r1, r2 }) => r1 < rooms.len() && r2 < rooms.len(),
            None => true,
        }),
        "enemy placements must name existing rooms"
    );

    let exit_room = rooms.len() - 1;
    let mut hp = start_hp;
    let mut visited: BTreeSet<usize> = BTreeSet::from([0]);
    let mut alive: Vec<&Entity> =
        enemies.iter().filter(|enemy| enemy.kind != EntityKind::Hero).collect();

    loop {
        let mut weakest: Option<usize> = None;
        for (index, enemy) in alive.iter().enumerate() {
            let reachable = match enemy.placement {
                Some(EnemyPlacement::Room { room_id }) => visited.contains(&room_id),
                Some(EnemyPlacement::Passage { r1, r2 }) => {
                    visited.contains(&r1) || visited.contains(&r2)
                }
                None => false,
            };
            if !reachable {
                continue;
            }
            let replaces = match weakest {
                None => true,
                Some(best) => enemy.hp < alive[best].hp,
            };
            if replaces {
                weakest = Some(index);
            }
        }

        let Some(weakest) = weakest else { break };
        if alive[weakest].hp >= hp {
            break;
        }

        let defeated = alive.remove(weakest);
        hp += defeated.hp;
        if let Some(EnemyPlacement::Passage { r1, r2 }) = defeated.placement {
            visited.insert(r1);
            visited.insert(r2);
        }
    }

    visited.contains(&exit_room)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Tile;
    use crate::types::Pos;

    fn rooms(count: usize) -> Vec<Room> {
        (0..count)
            .map(|id| Room { id, x: (id * 10) as i32, y: 1, width: 5, height: 5 })
            .collect()
    }

    fn passage(r1: usize, r2: usize) -> Passage {
        Passage { x: (r1 * 10 + 7) as i32, y: 3, r1, r2 }
    }

    fn passage_guard(hp: i32, r1: usize, r2: usize) -> Entity {
        Entity {
            kind: EntityKind::Guard,
            position: Pos { z: 0, y: 3, x: (r1 * 10 + 7) as i32 },
            hp,
            placement: Some(EnemyPlacement::Passage { r1, r2 }),
        }
    }

    fn room_monster(hp: i32, room_id: usize) -> Entity {
        Entity {
            kind: EntityKind::Monster,
            position: Pos { z: 0, y: 2, x: (room_id * 10 + 2) as i32 },
            hp,
            placement: Some(EnemyPlacement::Room { room_id }),
        }
    }

    #[test]
    fn beatable_guardian_makes_two_room_layout_feasible() {
        let rooms = rooms(2);
        let passages = vec![passage(0, 1)];
        let enemies = vec![passage_guard(5, 0, 1)];
        assert!(layout_is_feasible(&rooms, &passages, &enemies, 10));
    }

    #[test]
    fn overpowering_guardian_makes_two_room_layout_infeasible() {
        let rooms = rooms(2);
        let passages = vec![passage(0, 1)];
        let enemies = vec![passage_guard(15, 0, 1)];
        assert!(!layout_is_feasible(&rooms, &passages, &enemies, 10));
    }

    #[test]
    fn hp_ties_do_not_count_at_generation_time() {
        let rooms = rooms(2);
        let passages = vec![passage(0, 1)];
        let enemies = vec![passage_guard(10, 0, 1)];
        assert!(
            !layout_is_feasible(&rooms, &passages, &enemies, 10),
            "a guardian equal to the hero would need a coin flip; the generator refuses"
        );
    }

    #[test]
    fn conquest_chains_through_absorbed_hp() {
        let rooms = rooms(3);
        let passages = vec![passage(0, 1), passage(1, 2)];
        // 10 -> eat 4 -> 14 -> eat 13 -> 27 -> eat 26 -> exit open.
        let enemies = vec![
            passage_guard(13, 0, 1),
            passage_guard(26, 1, 2),
            room_monster(4, 0),
        ];
        assert!(layout_is_feasible(&rooms, &passages, &enemies, 10));

        // Raising the first guardian past everything reachable dead-ends the run.
        let stuck = vec![
            passage_guard(20, 0, 1),
            passage_guard(26, 1, 2),
            room_monster(4, 0),
        ];
        assert!(!layout_is_feasible(&rooms, &passages, &stuck, 10));
    }

    #[test]
    fn verdict_is_invariant_under_enemy_input_order() {
        let rooms = rooms(3);
        let passages = vec![passage(0, 1), passage(1, 2)];
        let base = vec![
            room_monster(4, 0),
            room_monster(9, 0),
            passage_guard(13, 0, 1),
            room_monster(30, 1),
            passage_guard(55, 1, 2),
        ];
        let expected = layout_is_feasible(&rooms, &passages, &base, 10);
        assert!(expected);

        let mut rotated = base.clone();
        for _ in 0..base.len() {
            let front = rotated.remove(0);
            rotated.push(front);
            assert_eq!(
                layout_is_feasible(&rooms, &passages, &rotated, 10),
                expected,
                "defeat order among simultaneously beatable enemies must not change the verdict"
            );
        }

        let mut reversed = base;
        reversed.reverse();
        assert_eq!(layout_is_feasible(&rooms, &passages, &reversed, 10), expected);
    }

    #[test]
    fn unbound_enemies_never_become_reachable() {
        let rooms = rooms(2);
        let passages = vec![passage(0, 1)];
        let mut drifter = room_monster(1, 0);
        drifter.placement = None;
        assert!(!layout_is_feasible(&rooms, &passages, &[drifter], 10));
    }

    #[test]
    fn empty_room_graph_is_infeasible() {
        assert!(!layout_is_feasible(&[], &[], &[], 10));
    }

    fn open_grid(width: usize, height: usize) -> GridMap {
        let mut map = GridMap::new(width, height, 1);
        for y in 0..height {
            for x in 0..width {
                map.set_tile(Pos { z: 0, y: y as i32, x: x as i32 }, Tile::floor());
            }
        }
        map
    }

    fn hero_at(pos: Pos, hp: i32) -> Entity {
        Entity { kind: EntityKind::Hero, position: pos, hp, placement: None }
    }

    fn monster_at(pos: Pos, hp: i32) -> Entity {
        Entity { kind: EntityKind::Monster, position: pos, hp, placement: None }
    }

    #[test]
    fn winnable_while_a_beatable_enemy_is_reachable() {
        let map = open_grid(5, 5);
        let hero = hero_at(Pos { z: 0, y: 0, x: 0 }, 10);
        let enemies = vec![
            monster_at(Pos { z: 0, y: 4, x: 4 }, 40),
            monster_at(Pos { z: 0, y: 0, x: 3 }, 10),
        ];
        assert!(
            any_winnable_fight(&map, &hero, &enemies),
            "an hp tie is still a winnable fight at runtime"
        );
    }

    #[test]
    fn lost_when_every_enemy_is_too_strong() {
        let map = open_grid(5, 5);
        let hero = hero_at(Pos { z: 0, y: 0, x: 0 }, 10);
        let enemies = vec![
            monster_at(Pos { z: 0, y: 4, x: 4 }, 11),
            monster_at(Pos { z: 0, y: 0, x: 3 }, 99),
        ];
        assert!(!any_winnable_fight(&map, &hero, &enemies));
    }

    #[test]
    fn lost_when_beatable_enemies_are_walled_off() {
        let mut map = open_grid(5, 5);
        for y in 0..5 {
            map.set_tile(Pos { z: 0, y, x: 2 }, Tile::wall());
        }
        let hero = hero_at(Pos { z: 0, y: 2, x: 0 }, 50);
        let enemies = vec![monster_at(Pos { z: 0, y: 2, x: 4 }, 5)];
        assert!(!any_winnable_fight(&map, &hero, &enemies));
    }

    #[test]
    fn lost_when_a_stronger_enemy_blocks_the_only_route_to_a_weaker_one() {
        let mut map = open_grid(5, 3);
        for x in 0..5 {
            map.set_tile(Pos { z: 0, y: 0, x }, Tile::wall());
            map.set_tile(Pos { z: 0, y: 2, x }, Tile::wall());
        }
        let hero = hero_at(Pos { z: 0, y: 1, x: 0 }, 10);
        let enemies = vec![
            monster_at(Pos { z: 0, y: 1, x: 2 }, 80),
            monster_at(Pos { z: 0, y: 1, x: 4 }, 5),
        ];
        assert!(
            !any_winnable_fight(&map, &hero, &enemies),
            "the weak enemy is beatable but the strong one seals the corridor"
        );
    }
}
