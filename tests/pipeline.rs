//! End-to-end pipeline test: a small game-like scene driving the world tick
//! by tick through the public surface — owner-authoritative movement,
//! double-dispatched reactions, penetration resolution, and out-of-pipeline
//! geometry queries.

use clash::{dispatch, Aabb, Fp, Hit, Obb, Pose, Profile, React, Vec2, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Player,
    Wall,
    Projectile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Body {
    id: usize,
    kind: Kind,
}

impl Profile for Body {
    fn can_interact(&self, other: &Body) -> bool {
        // projectiles fly through each other
        !(self.kind == Kind::Projectile && other.kind == Kind::Projectile)
    }
}

/// The game state the collision engine is a collaborator of: it owns the
/// positions, the world only mirrors them.
struct Game {
    player_pos: Vec2,
    projectile_pos: Vec2,
    projectile_alive: bool,
    player_hits_taken: usize,
    wall_impacts: usize,
}

impl React<Body> for Game {
    fn on_collision(&mut self, world: &mut World<Body>, me: Hit<Body>, peer: Hit<Body>) {
        match (me.profile.kind, peer.profile.kind) {
            (Kind::Player, Kind::Wall) => {
                // hard push-out, mirrored back onto the owner
                if world.separate(me.key, peer.key, 1.0).is_some() {
                    if let Some(collider) = world.get(me.key) {
                        self.player_pos = collider.pose().pos;
                    }
                }
            }
            _ => {}
        }
    }

    fn on_enter(&mut self, world: &mut World<Body>, me: Hit<Body>, peer: Hit<Body>) {
        match (me.profile.kind, peer.profile.kind) {
            (Kind::Projectile, Kind::Wall) => {
                // projectiles die on their first wall contact, removing
                // their collider from inside the reaction
                world.remove(me.key);
                self.projectile_alive = false;
                self.wall_impacts += 1;
            }
            (Kind::Player, Kind::Projectile) => {
                self.player_hits_taken += 1;
            }
            _ => {}
        }
    }
}

#[test]
fn player_cannot_push_through_a_wall() {
    let mut world = World::new(Aabb::new(-500.0, -500.0, 500.0, 500.0), 8).unwrap();
    let mut game = Game {
        player_pos: Vec2::new(0.0, 0.0),
        projectile_pos: Vec2::new(0.0, -1000.0), // parked out of the way
        projectile_alive: false,
        player_hits_taken: 0,
        wall_impacts: 0,
    };

    world.insert(
        Body { id: 0, kind: Kind::Player },
        Pose::new(game.player_pos, 0.0),
        10.0,
        10.0,
    );
    // wall face at x = 50
    world.insert(
        Body { id: 1, kind: Kind::Wall },
        Pose::new(Vec2::new(55.0, 0.0), 0.0),
        10.0,
        200.0,
    );

    // walk right at 4 units per tick, well past the wall
    for _ in 0..40 {
        game.player_pos.x += 4.0;
        let player_pos = game.player_pos;
        let events = world.step(|body, pose| {
            if body.kind == Kind::Player {
                pose.pos = player_pos;
            }
        });
        dispatch(&mut world, &events, &mut game);
    }

    // the wall stopped the player at its face (within resolution slack)
    assert!(game.player_pos.x <= 45.0 + 1e-2);
    assert!(game.player_pos.x > 40.0);
}

#[test]
fn projectile_damages_player_and_dies_on_the_wall() {
    let mut world = World::new(Aabb::new(-500.0, -500.0, 500.0, 500.0), 8).unwrap();
    let mut game = Game {
        player_pos: Vec2::new(0.0, 0.0),
        projectile_pos: Vec2::new(-60.0, 0.0),
        projectile_alive: true,
        player_hits_taken: 0,
        wall_impacts: 0,
    };

    world.insert(
        Body { id: 0, kind: Kind::Player },
        Pose::new(game.player_pos, 0.0),
        10.0,
        10.0,
    );
    world.insert(
        Body { id: 1, kind: Kind::Wall },
        Pose::new(Vec2::new(40.0, 0.0), 0.0),
        10.0,
        200.0,
    );
    world.insert(
        Body { id: 2, kind: Kind::Projectile },
        Pose::new(game.projectile_pos, 0.0),
        4.0,
        4.0,
    );

    for _ in 0..30 {
        if game.projectile_alive {
            game.projectile_pos.x += 5.0;
        }
        let projectile_pos = game.projectile_pos;
        let events = world.step(|body, pose| {
            if body.kind == Kind::Projectile {
                pose.pos = projectile_pos;
            }
        });
        dispatch(&mut world, &events, &mut game);
    }

    // passed through the player (one enter, no repeat), then died on the wall
    assert_eq!(game.player_hits_taken, 1);
    assert_eq!(game.wall_impacts, 1);
    assert!(!game.projectile_alive);
    // only the player and the wall remain registered
    assert_eq!(world.len(), 2);
}

#[test]
fn grid_cells_classify_against_wall_geometry() {
    // the pathfinding-style collaborator: classify cells as blocked by
    // testing raw rectangles against registered collider geometry, without
    // joining the tick pipeline
    let mut world = World::new(Aabb::new(-500.0, -500.0, 500.0, 500.0), 8).unwrap();
    let wall = world.insert(
        Body { id: 0, kind: Kind::Wall },
        Pose::new(Vec2::new(32.0, 32.0), std::f64::consts::FRAC_PI_4 as Fp),
        40.0,
        8.0,
    );
    let wall_obb = world.get(wall).unwrap().obb();

    let cell = 16.0;
    let mut blocked = Vec::new();
    for gy in 0..4 {
        for gx in 0..4 {
            let center = Vec2::new((gx as Fp + 0.5) * cell, (gy as Fp + 0.5) * cell);
            let probe = Obb::new(center.x, center.y, cell, cell, 0.0);
            if probe.obb_test(&wall_obb) {
                blocked.push((gx, gy));
            }
        }
    }

    // the diagonal wall crosses the middle of the 4x4 patch
    assert!(blocked.contains(&(1, 1)));
    assert!(blocked.contains(&(2, 2)));
    assert!(!blocked.contains(&(3, 0)));
    assert!(!blocked.contains(&(0, 3)));
    assert!(blocked.len() < 16);
}
