//! Observed-tile bookkeeping. The hero reveals a square radius on the
//! current level as they move; the observed set is the fog-of-war input for
//! player-intent pathfinding.

use std::collections::BTreeSet;

use crate::state::GridMap;
use crate::types::Pos;

pub(super) fn reveal_radius(
    observed: &mut BTreeSet<Pos>,
    map: &GridMap,
    center: Pos,
    radius: i32,
) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let pos = Pos { z: center.z, y: center.y + dy, x: center.x + dx };
            if map.tile_at(pos).is_some() {
                observed.insert(pos);
            }
        }
    }
}
