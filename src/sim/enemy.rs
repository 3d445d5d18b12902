//! Enemy spawning, orbital motion, and retirement
//!
//! Enemies ride a circular orbit around the sea center and sweep past the
//! plane. Each frame every in-use enemy advances its angle, gets its position
//! recomputed from polar state, and is checked for the two retirement
//! conditions: collision with the plane (which ends the run) or passing
//! behind the camera (silent recycle).

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::particle::ParticleField;
use super::pool::{Pool, Pooled};
use super::state::{GameState, GameStatus};
use super::tween::{Tween, TweenChannel, TweenFinish, TweenScheduler};
use crate::consts::*;
use crate::orbit_position;
use crate::scene::{NodeId, SceneGraph};

/// One orbiting enemy. Position is polar: angle plus a fixed orbit radius,
/// with a depth offset used only in first-person mode.
#[derive(Debug)]
pub struct Enemy {
    node: NodeId,
    pub angle: f32,
    pub orbit_distance: f32,
    pub depth_offset: f32,
}

impl Enemy {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            angle: 0.0,
            orbit_distance: 0.0,
            depth_offset: 0.0,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Pooled for Enemy {
    fn reset(&mut self) {
        self.angle = 0.0;
        self.orbit_distance = 0.0;
        self.depth_offset = 0.0;
    }
}

/// Should a new wave spawn at this distance?
pub fn wave_due(distance: f32, spawn_interval: f32, last_spawn_distance: f32) -> bool {
    let floored = distance.floor();
    let interval = (spawn_interval.floor() as i64).max(1);
    (floored as i64) % interval == 0 && floored > last_spawn_distance
}

/// Per-enemy outcome of one update scan; retirements are applied after the
/// scan so indices stay stable while iterating.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Fate {
    Keep,
    Collision,
    Exit,
}

/// Holder for all live enemies and their recycle pool
#[derive(Debug)]
pub struct EnemyField {
    pub pool: Pool<Enemy>,
    enemy_color: u32,
}

impl EnemyField {
    pub fn new(enemy_color: u32) -> Self {
        Self {
            pool: Pool::new(),
            enemy_color,
        }
    }

    pub fn enemy_color(&self) -> u32 {
        self.enemy_color
    }

    /// Recolor the pool's visuals when the theme changes
    pub fn set_enemy_color(&mut self, color: u32, scene: &mut SceneGraph) {
        self.enemy_color = color;
        for enemy in self.pool.in_use().iter().chain(self.pool.free()) {
            if let Some(node) = scene.node_mut(enemy.node) {
                node.color = color;
            }
        }
    }

    /// Spawn a wave of enemies staggered along the orbit
    pub fn spawn_wave(
        &mut self,
        count: usize,
        scene: &mut SceneGraph,
        rng: &mut Pcg32,
    ) {
        for i in 0..count {
            let color = self.enemy_color;
            let mut enemy = self.pool.acquire(|| Enemy::new(scene.create_node(color)));
            enemy.angle = -(i as f32) * 0.1;
            enemy.orbit_distance = 600.0 + rng.random_range(0.0..150.0) + 25.0;
            enemy.depth_offset = rng.random_range(-2.0..2.0);

            let start = orbit_position(enemy.angle, enemy.orbit_distance);
            if let Some(node) = scene.node_mut(enemy.node) {
                node.position.x = start.x;
                node.position.y = start.y;
                node.color = color;
            }
            scene.attach(enemy.node);
            self.pool.activate(enemy);
        }
        log::debug!("spawned {count} enemies, {} pooled", self.pool.free().len());
    }

    /// Advance every enemy one frame and retire those that collide or exit.
    ///
    /// Runs every frame regardless of game status; the status machine is only
    /// signaled on a collision while Playing.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        state: &mut GameState,
        scene: &mut SceneGraph,
        tweens: &mut TweenScheduler,
        mut particles: Option<&mut ParticleField>,
        plane_position: Vec3,
        fps_mode: bool,
        delta_ms: f32,
        rng: &mut Pcg32,
    ) {
        let mut fates = vec![Fate::Keep; self.pool.in_use().len()];

        for (i, enemy) in self.pool.in_use_mut().iter_mut().enumerate() {
            enemy.angle += state.speed * delta_ms * state.tuning.enemy_speed_factor;
            if enemy.angle > TAU {
                enemy.angle -= TAU;
            }

            let Some(node) = scene.node_mut(enemy.node) else {
                continue;
            };
            let on_orbit = orbit_position(enemy.angle, enemy.orbit_distance);
            node.position.x = on_orbit.x;
            node.position.y = on_orbit.y;

            if fps_mode {
                // Real-time depth oscillation: bounce at the band edges
                if !(-ENEMY_DEPTH_BAND..=ENEMY_DEPTH_BAND).contains(&node.position.z) {
                    enemy.depth_offset = -enemy.depth_offset;
                }
                node.position.z += enemy.depth_offset;
            } else if node.position.z != 0.0 {
                // Ease leftover depth back to the third-person plane
                tweens.schedule(
                    Tween::new(TweenChannel::NodePosition(enemy.node), ENEMY_DEPTH_SETTLE_MS)
                        .key("z", node.position.z, 0.0)
                        .finish(TweenFinish::SnapDepth(enemy.node)),
                );
            }

            node.rotation.z += rng.random::<f32>() * 0.1;
            node.rotation.y += rng.random::<f32>() * 0.1;

            let distance_to_plane = (plane_position - node.position).length();
            if distance_to_plane < state.tuning.collision_tolerance {
                fates[i] = Fate::Collision;
            } else if enemy.angle > PI {
                fates[i] = Fate::Exit;
            }
        }

        // Apply retirements highest index first; earlier indices stay valid.
        for i in (0..fates.len()).rev() {
            match fates[i] {
                Fate::Keep => {}
                Fate::Exit => self.retire(i, scene),
                Fate::Collision => {
                    let Some((position, color)) = self
                        .pool
                        .in_use()
                        .get(i)
                        .and_then(|e| scene.node(e.node))
                        .map(|n| (n.position, n.color))
                    else {
                        self.retire(i, scene);
                        continue;
                    };

                    let diff = plane_position - position;
                    state.collision_speed =
                        diff.normalize_or_zero() * state.tuning.recoil_force;

                    if let Some(particles) = particles.as_deref_mut() {
                        particles.spawn_burst(
                            position,
                            ENEMY_WAVE_SIZE,
                            color,
                            3.0,
                            scene,
                            tweens,
                            rng,
                        );
                    }
                    tweens.schedule(
                        Tween::new(TweenChannel::AmbientIntensity, LIGHT_FADE_MS)
                            .key("intensity", AMBIENT_FLASH, AMBIENT_REST),
                    );

                    if state.status == GameStatus::Playing {
                        log::info!("plane hit an enemy at distance {:.0}", state.distance);
                        state.set_status(GameStatus::Failed);
                    }
                    self.retire(i, scene);
                }
            }
        }
    }

    fn retire(&mut self, index: usize, scene: &mut SceneGraph) {
        if let Some(enemy) = self.pool.take_at(index) {
            scene.detach(enemy.node());
            self.pool.release(enemy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn harness() -> (GameState, SceneGraph, TweenScheduler, Pcg32) {
        (
            GameState::new(),
            SceneGraph::new(),
            TweenScheduler::new(),
            Pcg32::seed_from_u64(7),
        )
    }

    const FAR_AWAY: Vec3 = Vec3::new(10_000.0, 10_000.0, 0.0);

    #[test]
    fn test_spawn_wave_staggers_angles() {
        let (_, mut scene, _, mut rng) = harness();
        let mut field = EnemyField::new(0xf25346);
        field.spawn_wave(15, &mut scene, &mut rng);

        assert_eq!(field.pool.in_use().len(), 15);
        for (i, enemy) in field.pool.in_use().iter().enumerate() {
            assert!((enemy.angle - (-(i as f32) * 0.1)).abs() < 0.001);
            assert!((625.0..=775.0).contains(&enemy.orbit_distance));
            assert!((-2.0..=2.0).contains(&enemy.depth_offset));
            assert!(scene.node(enemy.node()).unwrap().attached);
        }
    }

    #[test]
    fn test_angle_wraps_into_range() {
        let (mut state, mut scene, mut tweens, mut rng) = harness();
        state.speed = 0.0005;
        let mut field = EnemyField::new(0);
        let mut enemy = Enemy::new(scene.create_node(0));
        enemy.angle = TAU - 0.001;
        enemy.orbit_distance = 700.0;
        scene.attach(enemy.node());
        field.pool.activate(enemy);

        field.update(
            &mut state, &mut scene, &mut tweens, None, FAR_AWAY, false, 16.0, &mut rng,
        );

        let angle = field.pool.in_use()[0].angle;
        assert!((0.0..TAU).contains(&angle));
    }

    #[test]
    fn test_collision_retires_and_fails_same_frame() {
        let (mut state, mut scene, mut tweens, mut rng) = harness();
        state.set_status(GameStatus::Playing);
        let mut field = EnemyField::new(0xf25346);
        let mut particles = ParticleField::new();

        let mut enemy = Enemy::new(scene.create_node(0xf25346));
        enemy.angle = 0.5;
        enemy.orbit_distance = 700.0;
        scene.attach(enemy.node());
        field.pool.activate(enemy);

        // Plane a few units off the enemy's post-update position
        let plane = orbit_position(0.5, 700.0) + Vec3::new(5.0, 0.0, 0.0);
        field.update(
            &mut state,
            &mut scene,
            &mut tweens,
            Some(&mut particles),
            plane,
            false,
            16.0,
            &mut rng,
        );

        assert_eq!(field.pool.in_use().len(), 0);
        assert_eq!(field.pool.free().len(), 1);
        assert_eq!(state.status, GameStatus::Failed);
        assert!(state.collision_speed.length() > 0.0);
        // Burst spawned at the impact point
        assert_eq!(particles.pool.in_use().len(), ENEMY_WAVE_SIZE);
        assert!(tweens.active() > 0);
    }

    #[test]
    fn test_exit_retires_silently() {
        let (mut state, mut scene, mut tweens, mut rng) = harness();
        state.set_status(GameStatus::Playing);
        let mut field = EnemyField::new(0);

        let mut enemy = Enemy::new(scene.create_node(0));
        enemy.angle = PI + 0.2;
        enemy.orbit_distance = 700.0;
        scene.attach(enemy.node());
        field.pool.activate(enemy);

        field.update(
            &mut state, &mut scene, &mut tweens, None, FAR_AWAY, false, 16.0, &mut rng,
        );

        assert_eq!(field.pool.in_use().len(), 0);
        assert_eq!(field.pool.free().len(), 1);
        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.collision_speed, Vec3::ZERO);
    }

    #[test]
    fn test_multiple_retirements_one_frame() {
        let (mut state, mut scene, mut tweens, mut rng) = harness();
        let mut field = EnemyField::new(0);
        for angle in [PI + 0.1, 0.4, PI + 0.3] {
            let mut enemy = Enemy::new(scene.create_node(0));
            enemy.angle = angle;
            enemy.orbit_distance = 700.0;
            scene.attach(enemy.node());
            field.pool.activate(enemy);
        }

        field.update(
            &mut state, &mut scene, &mut tweens, None, FAR_AWAY, false, 16.0, &mut rng,
        );

        // Both exited enemies retired, the survivor kept its slot
        assert_eq!(field.pool.in_use().len(), 1);
        assert_eq!(field.pool.free().len(), 2);
        assert!((field.pool.in_use()[0].angle - 0.4).abs() < 0.01);
    }

    #[test]
    fn test_depth_settles_via_tween_in_third_person() {
        let (mut state, mut scene, mut tweens, mut rng) = harness();
        let mut field = EnemyField::new(0);
        let mut enemy = Enemy::new(scene.create_node(0));
        enemy.angle = 0.3;
        enemy.orbit_distance = 700.0;
        let node = enemy.node();
        scene.attach(node);
        field.pool.activate(enemy);
        scene.node_mut(node).unwrap().position.z = 40.0;

        field.update(
            &mut state, &mut scene, &mut tweens, None, FAR_AWAY, false, 16.0, &mut rng,
        );
        assert_eq!(tweens.active(), 1);

        let events = tweens.advance(ENEMY_DEPTH_SETTLE_MS);
        assert!(events.iter().any(|e| matches!(
            e,
            super::super::tween::TweenEvent::Complete {
                finish: TweenFinish::SnapDepth(n),
                ..
            } if *n == node
        )));
    }

    #[test]
    fn test_depth_bounces_in_first_person() {
        let (mut state, mut scene, mut tweens, mut rng) = harness();
        let mut field = EnemyField::new(0);
        let mut enemy = Enemy::new(scene.create_node(0));
        enemy.angle = 0.3;
        enemy.orbit_distance = 700.0;
        enemy.depth_offset = 2.0;
        let node = enemy.node();
        scene.attach(node);
        field.pool.activate(enemy);
        scene.node_mut(node).unwrap().position.z = 151.0;

        field.update(
            &mut state, &mut scene, &mut tweens, None, FAR_AWAY, true, 16.0, &mut rng,
        );

        // Outside the band, the offset flips sign and pulls depth back in
        assert_eq!(field.pool.in_use()[0].depth_offset, -2.0);
        assert_eq!(scene.node(node).unwrap().position.z, 149.0);
        assert_eq!(tweens.active(), 0);
    }

    #[test]
    fn test_wave_due() {
        assert!(!wave_due(0.0, 100.0, 0.0));
        assert!(!wave_due(99.5, 100.0, 0.0));
        assert!(wave_due(100.2, 100.0, 0.0));
        assert!(!wave_due(100.9, 100.0, 100.0));
        assert!(wave_due(200.0, 100.0, 100.0));
    }
}
