//! Headless collision sandbox
//!
//! Exercises the spatial engine without a renderer: loads a cube model,
//! builds a small scene, fires a projectile down the Z axis, and steps
//! the frame loop until the projectile hits its target or flies past.

use spatial_engine::prelude::*;

/// Unit cube, triangulated.
const CUBE_OBJ: &str = "\
v -1 -1 -1
v 1 -1 -1
v 1 1 -1
v -1 1 -1
v -1 -1 1
v 1 -1 1
v 1 1 1
v -1 1 1
f 1 2 3
f 1 3 4
f 5 7 6
f 5 8 7
f 1 6 2
f 1 5 6
f 4 3 7
f 4 7 8
f 1 4 8
f 1 8 5
f 2 6 7
f 2 7 3
";

/// Flies forward each frame and removes itself plus whatever it strikes.
struct Projectile {
    speed: f32,
}

impl Behavior for Projectile {
    fn update(&mut self, id: EntityId, registry: &mut SceneRegistry, delta: f32) {
        if let Some(entity) = registry.get_mut(id) {
            entity.move_local(Vec3::new(0.0, 0.0, -self.speed * delta));
        }
        match registry.collides(id, &["floor"]) {
            Ok(Some(other)) => {
                log::info!("projectile {id:?} struck {other:?}");
                registry.remove(other);
                registry.remove(id);
            }
            Ok(None) => {}
            Err(err) => log::warn!("collision query failed: {err}"),
        }
    }
}

fn main() {
    env_logger::init();

    log::info!("parsing cube model...");
    let model = match Model::parse(CUBE_OBJ) {
        Ok(model) => model,
        Err(err) => {
            log::error!("model load failed: {err}");
            return;
        }
    };
    let (bound_min, bound_max) = model
        .bounds()
        .unwrap_or((Vec3::zeros(), Vec3::zeros()));
    log::info!(
        "cube: {} attribute slots, {} faces, bounds {bound_min:?}..{bound_max:?}",
        model.attribute_count(),
        model.face_count(),
    );

    let mut registry = SceneRegistry::new();

    let mut floor = SpatialEntity::new()
        .with_bounding_box(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))
        .with_tag("floor");
    floor.set_position(Vec3::new(0.0, -2.0, 0.0));
    floor.set_axis_aligned(true);
    registry.add_body(floor);

    let mut target = SpatialEntity::new()
        .with_bounding_box(bound_min, bound_max)
        .with_tag("crate");
    target.set_position(Vec3::new(0.0, 0.0, -10.0));
    target.turn(30.0, Vec3::y(), false);
    let target_id = registry.add_body(target);

    // Line of sight check before firing
    let sight = registry.raycast(Vec3::zeros(), Vec3::new(0.0, 0.0, -50.0), &["floor"]);
    match sight {
        Some(distance) => log::info!("target sighted at distance {distance:.2}"),
        None => log::warn!("nothing downrange"),
    }

    let projectile = SpatialEntity::new()
        .with_bounding_box(Vec3::new(-0.1, -0.1, -0.1), Vec3::new(0.1, 0.1, 0.1))
        .with_tag("bullet")
        .with_behavior(Box::new(Projectile { speed: 20.0 }));
    registry.add_body(projectile);

    let delta = 1.0 / 60.0;
    for frame in 0..240 {
        registry.update(delta);
        registry.collect_garbage();
        if registry.get(target_id).is_none() {
            log::info!("target destroyed on frame {frame}");
            break;
        }
    }

    registry.log_entities();
    log::info!("sandbox done, {} entities remain", registry.len());
}
