//! Particle bursts
//!
//! Collisions shatter the enemy into a burst of fragments. Each fragment is a
//! pooled entity animated by three concurrent tweens: a tumble to a random
//! orientation, a shrink to 10%, and a flight to a random point near the
//! impact. The position tween is the one wired to a completion effect that
//! returns the fragment to the pool; the other two must not outlast it, so
//! all three share the same duration.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::pool::{Pool, Pooled};
use super::tween::{Tween, TweenChannel, TweenFinish, TweenScheduler};
use crate::consts::PARTICLE_BURST_MS;
use crate::scene::{NodeId, SceneGraph};

/// One decorative fragment; all of its motion lives in tweens
#[derive(Debug)]
pub struct Particle {
    node: NodeId,
}

impl Particle {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
}

impl Pooled for Particle {
    fn reset(&mut self) {}
}

/// Holder for live fragments and their recycle pool
#[derive(Debug, Default)]
pub struct ParticleField {
    pub pool: Pool<Particle>,
}

impl ParticleField {
    pub fn new() -> Self {
        Self { pool: Pool::new() }
    }

    /// Burst `count` fragments outward from `origin`
    pub fn spawn_burst(
        &mut self,
        origin: Vec3,
        count: usize,
        color: u32,
        scale: f32,
        scene: &mut SceneGraph,
        tweens: &mut TweenScheduler,
        rng: &mut Pcg32,
    ) {
        for _ in 0..count {
            let particle = self.pool.acquire(|| Particle::new(scene.create_node(color)));
            let id = particle.node();

            let rotation = if let Some(node) = scene.node_mut(id) {
                node.color = color;
                node.position = origin;
                node.scale = Vec3::splat(scale);
                node.visible = true;
                node.rotation
            } else {
                Vec3::ZERO
            };
            scene.attach(id);

            tweens.schedule(
                Tween::new(TweenChannel::NodeRotation(id), PARTICLE_BURST_MS)
                    .key("x", rotation.x, rng.random::<f32>() * 12.0)
                    .key("y", rotation.y, rng.random::<f32>() * 12.0),
            );
            tweens.schedule(
                Tween::new(TweenChannel::NodeScale(id), PARTICLE_BURST_MS)
                    .key("x", scale, 0.1)
                    .key("y", scale, 0.1)
                    .key("z", scale, 0.1),
            );
            let target = origin
                + Vec3::new(
                    rng.random_range(-1.0..1.0) * 50.0,
                    rng.random_range(-1.0..1.0) * 50.0,
                    rng.random_range(-1.0..1.0) * 50.0,
                );
            tweens.schedule(
                Tween::new(TweenChannel::NodePosition(id), PARTICLE_BURST_MS)
                    .key("x", origin.x, target.x)
                    .key("y", origin.y, target.y)
                    .key("z", origin.z, target.z)
                    .finish(TweenFinish::ReleaseParticle(id)),
            );

            self.pool.activate(particle);
        }
    }

    /// Return the fragment owning `node` to the pool; called by the driver
    /// when a fragment's position tween completes. Detaching restores the
    /// neutral transform, so the fragment is full-size again on reuse.
    pub fn release_by_node(&mut self, node: NodeId, scene: &mut SceneGraph) {
        let Some(index) = self.pool.in_use().iter().position(|p| p.node() == node) else {
            return;
        };
        if let Some(particle) = self.pool.take_at(index) {
            scene.detach(particle.node());
            self.pool.release(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tween::TweenEvent;
    use rand::SeedableRng;

    #[test]
    fn test_burst_activates_count_fragments() {
        let mut field = ParticleField::new();
        let mut scene = SceneGraph::new();
        let mut tweens = TweenScheduler::new();
        let mut rng = Pcg32::seed_from_u64(3);

        let origin = Vec3::new(100.0, -500.0, 0.0);
        field.spawn_burst(origin, 15, 0xf25346, 3.0, &mut scene, &mut tweens, &mut rng);

        assert_eq!(field.pool.in_use().len(), 15);
        // Tumble, shrink, and flight per fragment
        assert_eq!(tweens.active(), 45);
        for particle in field.pool.in_use() {
            let node = scene.node(particle.node()).unwrap();
            assert!(node.attached);
            assert!(node.visible);
            assert_eq!(node.position, origin);
            assert_eq!(node.scale, Vec3::splat(3.0));
        }
    }

    #[test]
    fn test_position_tween_completion_releases_fragment() {
        let mut field = ParticleField::new();
        let mut scene = SceneGraph::new();
        let mut tweens = TweenScheduler::new();
        let mut rng = Pcg32::seed_from_u64(3);

        field.spawn_burst(Vec3::ZERO, 1, 0xffffff, 3.0, &mut scene, &mut tweens, &mut rng);
        let node = field.pool.in_use()[0].node();

        let events = tweens.advance(PARTICLE_BURST_MS);
        let released: Vec<NodeId> = events
            .iter()
            .filter_map(|e| match e {
                TweenEvent::Complete {
                    finish: TweenFinish::ReleaseParticle(n),
                    ..
                } => Some(*n),
                _ => None,
            })
            .collect();
        // Only the flight tween carries the release effect
        assert_eq!(released, vec![node]);

        for n in released {
            field.release_by_node(n, &mut scene);
        }
        assert_eq!(field.pool.in_use().len(), 0);
        assert_eq!(field.pool.free().len(), 1);
        let parked = scene.node(node).unwrap();
        assert!(!parked.attached);
        assert_eq!(parked.scale, Vec3::ONE);
    }

    #[test]
    fn test_reused_fragment_skips_construction() {
        let mut field = ParticleField::new();
        let mut scene = SceneGraph::new();
        let mut tweens = TweenScheduler::new();
        let mut rng = Pcg32::seed_from_u64(3);

        field.spawn_burst(Vec3::ZERO, 2, 0, 3.0, &mut scene, &mut tweens, &mut rng);
        for event in tweens.advance(PARTICLE_BURST_MS) {
            if let TweenEvent::Complete {
                finish: TweenFinish::ReleaseParticle(n),
                ..
            } = event
            {
                field.release_by_node(n, &mut scene);
            }
        }
        let nodes_before = scene.node_count();

        field.spawn_burst(Vec3::ZERO, 2, 0, 3.0, &mut scene, &mut tweens, &mut rng);
        assert_eq!(scene.node_count(), nodes_before);
        assert_eq!(field.pool.in_use().len(), 2);
    }
}
