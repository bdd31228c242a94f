//! Combat is a single hp comparison; ties go to a coin flip.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

use crate::types::CombatOutcome;

pub(super) fn resolve(hero_hp: i32, enemy_hp: i32, rng: &mut ChaCha8Rng) -> CombatOutcome {
    if hero_hp > enemy_hp {
        CombatOutcome::Victory
    } else if hero_hp < enemy_hp {
        CombatOutcome::Defeat
    } else if rng.next_u32() & 1 == 1 {
        CombatOutcome::Victory
    } else {
        CombatOutcome::Defeat
    }
}
