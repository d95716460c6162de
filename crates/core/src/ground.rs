//! Picks the height a teleported player lands at.

use crate::host::{EntityKind, LayerMask, PhysicsWorld};
use crate::player::WorldPos;
use tracing::trace;

/// How far above the terrain the downward ray starts.
pub const RAYCAST_HEIGHT: f32 = 200.0;

/// Layers a player can stand on: large vehicles, solids and water.
pub const LANDING_MASK: LayerMask = LayerMask::VEHICLE_LARGE
    .union(LayerMask::SOLID)
    .union(LayerMask::WATER);

/// Returns the y coordinate to land at for the column `(x, z)`.
///
/// A cargo ship deck is always used as-is, even below the terrain sample,
/// because ships float over terrain that sits higher than sea level. Any other
/// hit is never allowed to put the player below the terrain surface.
pub fn resolve_landing_height(world: &(impl PhysicsWorld + ?Sized), x: f32, z: f32) -> f32 {
    let terrain_y = world.terrain_height(x, z);
    let origin = WorldPos::new(x, terrain_y + RAYCAST_HEIGHT, z);

    let Some(hit) = world.raycast_down(origin, f32::MAX, LANDING_MASK) else {
        return terrain_y;
    };
    trace!(
        "Landing ray at ({}, {}) hit {:?} at y={}",
        x, z, hit.entity, hit.point.y
    );

    if hit.entity == Some(EntityKind::CargoShip) {
        return hit.point.y;
    }
    hit.point.y.max(terrain_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RayHit;
    use std::cell::Cell;

    struct Column {
        terrain: f32,
        hit: Option<RayHit>,
        last_ray: Cell<Option<(WorldPos, LayerMask)>>,
    }

    impl Column {
        fn new(terrain: f32, hit: Option<(f32, Option<EntityKind>)>) -> Column {
            Column {
                terrain,
                hit: hit.map(|(y, entity)| RayHit {
                    point: WorldPos::new(150.0, y, 300.0),
                    entity,
                }),
                last_ray: Cell::new(None),
            }
        }
    }

    impl PhysicsWorld for Column {
        fn terrain_height(&self, _x: f32, _z: f32) -> f32 {
            self.terrain
        }

        fn raycast_down(
            &self,
            origin: WorldPos,
            _max_distance: f32,
            mask: LayerMask,
        ) -> Option<RayHit> {
            self.last_ray.set(Some((origin, mask)));
            self.hit
        }
    }

    #[test]
    fn no_hit_uses_terrain() {
        let world = Column::new(50.0, None);
        assert_eq!(resolve_landing_height(&world, 150.0, 300.0), 50.0);
    }

    #[test]
    fn ray_starts_above_terrain_with_landing_mask() {
        let world = Column::new(50.0, None);
        resolve_landing_height(&world, 150.0, 300.0);
        let (origin, mask) = world.last_ray.get().unwrap();
        assert_eq!(origin, WorldPos::new(150.0, 250.0, 300.0));
        assert!(mask.contains(LayerMask::SOLID | LayerMask::WATER | LayerMask::VEHICLE_LARGE));
        assert!(!mask.contains(LayerMask::TERRAIN));
    }

    #[test]
    fn roof_above_terrain() {
        let world = Column::new(50.0, Some((120.0, Some(EntityKind::Building))));
        assert_eq!(resolve_landing_height(&world, 150.0, 300.0), 120.0);
    }

    #[test]
    fn solid_below_terrain_is_clamped() {
        let world = Column::new(50.0, Some((47.5, None)));
        assert_eq!(resolve_landing_height(&world, 150.0, 300.0), 50.0);
    }

    #[test]
    fn cargo_ship_deck_below_terrain() {
        let world = Column::new(50.0, Some((30.0, Some(EntityKind::CargoShip))));
        assert_eq!(resolve_landing_height(&world, 150.0, 300.0), 30.0);
    }

    #[test]
    fn other_vehicles_are_clamped() {
        let world = Column::new(50.0, Some((30.0, Some(EntityKind::Vehicle))));
        assert_eq!(resolve_landing_height(&world, 150.0, 300.0), 50.0);
    }
}
