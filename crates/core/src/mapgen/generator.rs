//! Generation orchestration: carve, connect, populate, validate, retry.
//! A whole attempt is discarded whenever the carved layout fails the
//! progressive-conquest feasibility proof, up to a fixed attempt budget.

use std::fmt;

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

use crate::conquest::layout_is_feasible;
use crate::state::{Entity, GridMap, Tile};
use crate::types::{EntityKind, Pos};

use super::layout::{assign_start_and_exit, carve_rooms, connect_rooms};
use super::model::GeneratedMap;
use super::spawns::{SpawnContext, place_enemies};

/// Hp the hero spawns with; the feasibility proof simulates from this value.
pub const STARTING_HERO_HP: i32 = 10;

/// Whole-layout retries before generation gives up.
pub const GENERATION_ATTEMPT_BUDGET: usize = 200;

const GRID_WIDTH: usize = 41;
const GRID_HEIGHT: usize = 41;
const GRID_LEVELS: usize = 1;
const MIN_ROOM_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No attempt within the budget produced a completable layout.
    BudgetExhausted { attempts: usize },
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BudgetExhausted { attempts } => {
                write!(f, "could not produce a feasible map in {attempts} attempts")
            }
        }
    }
}

pub struct MapGenerator {
    run_seed: u64,
    width: usize,
    height: usize,
    levels: usize,
}

impl MapGenerator {
    pub fn new(run_seed: u64) -> Self {
        Self { run_seed, width: GRID_WIDTH, height: GRID_HEIGHT, levels: GRID_LEVELS }
    }

    pub fn generate(&self) -> Result<GeneratedMap, GenerationError> {
        self.generate_with_attempts().map(|(generated, _)| generated)
    }

    /// Like [`Self::generate`], also reporting how many attempts were used.
    pub fn generate_with_attempts(&self) -> Result<(GeneratedMap, usize), GenerationError> {
        for attempt in 0..GENERATION_ATTEMPT_BUDGET {
            let mut rng =
                ChaCha8Rng::seed_from_u64(derive_attempt_seed(self.run_seed, attempt as u64));
            if let Some(generated) = self.attempt(&mut rng) {
                return Ok((generated, attempt + 1));
            }
        }
        Err(GenerationError::BudgetExhausted { attempts: GENERATION_ATTEMPT_BUDGET })
    }

    fn attempt(&self, rng: &mut ChaCha8Rng) -> Option<GeneratedMap> {
        let mut map = GridMap::new(self.width, self.height, self.levels);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                map.set_tile(Pos { z: 0, y, x }, Tile::wall());
            }
        }

        let mut rooms = carve_rooms(&mut map, rng);
        if rooms.len() < MIN_ROOM_COUNT {
            return None;
        }

        let mut passages = connect_rooms(&mut map, &rooms);
        assign_start_and_exit(&mut rooms, &mut passages);

        let spawn_room = rooms.first().expect("room count checked above");
        let mut entities = vec![Entity {
            kind: EntityKind::Hero,
            position: spawn_room.center(),
            hp: STARTING_HERO_HP,
            placement: None,
        }];

        let exit_room = rooms.last().expect("room count checked above");
        map.set_tile(exit_room.center(), Tile::exit());

        place_enemies(
            &SpawnContext { map: &map, rooms: &rooms, passages: &passages },
            rng,
            &mut entities,
        );

        if !layout_is_feasible(&rooms, &passages, &entities, STARTING_HERO_HP) {
            return None;
        }

        Some(GeneratedMap { map, entities, rooms, passages })
    }
}

/// Per-attempt RNG seed derived from the run seed. Integer-only avalanche so
/// a run seed fans out into independent attempt streams deterministically.
fn derive_attempt_seed(run_seed: u64, attempt: u64) -> u64 {
    let mut mixed = run_seed ^ attempt.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

/// Uniform roll in `min..=max`.
pub(super) fn roll_range(rng: &mut ChaCha8Rng, min: i32, max: i32) -> i32 {
    debug_assert!(min <= max);
    let span = (max - min + 1) as u64;
    min + (rng.next_u64() % span) as i32
}
