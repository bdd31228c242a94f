//! Procedural dungeon generation split into coherent submodules.

pub mod model;

mod generator;
mod layout;
mod spawns;

pub use generator::{
    GENERATION_ATTEMPT_BUDGET, GenerationError, MapGenerator, STARTING_HERO_HP,
};
pub use model::{GeneratedMap, Passage, Room};

/// Generate a feasible dungeon for `run_seed`, or report that the attempt
/// budget was exhausted.
pub fn generate_map(run_seed: u64) -> Result<GeneratedMap, GenerationError> {
    MapGenerator::new(run_seed).generate()
}

#[cfg(test)]
mod tests {
    use super::{MapGenerator, generate_map};

    #[test]
    fn generate_map_matches_map_generator_output() {
        let seed = 123_u64;
        let from_helper = generate_map(seed).expect("feasible map");
        let from_generator = MapGenerator::new(seed).generate().expect("feasible map");
        assert_eq!(from_helper, from_generator);
    }
}
