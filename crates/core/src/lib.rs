pub mod conquest;
pub mod game;
pub mod mapfile;
pub mod mapgen;
pub mod state;
pub mod types;

pub use conquest::{any_winnable_fight, layout_is_feasible};
pub use game::pathfinding::find_path;
pub use game::{CombatReport, Game, MoveOutcome, VIEW_RADIUS};
pub use mapfile::{LoadedMap, MapFileError, load_map, parse_map, save_map};
pub use mapgen::{
    GENERATION_ATTEMPT_BUDGET, GeneratedMap, GenerationError, MapGenerator, Passage, Room,
    STARTING_HERO_HP, generate_map,
};
pub use state::{Entity, GameState, GridMap, StateError, Tile};
pub use types::*;
