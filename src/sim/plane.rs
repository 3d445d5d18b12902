//! Player plane control
//!
//! The pointer sets a target offset; the plane eases toward it by 10% of the
//! remaining distance each frame, which gives the characteristic smoothed
//! chase instead of a snap. Collision recoil rides on top of the target and
//! decays on its own, independent of the status machine.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use super::state::GameState;
use crate::consts::*;
use crate::remap_clamped;
use crate::scene::{NodeId, SceneGraph};

/// Fraction of the remaining distance covered per frame
const APPROACH: f32 = 0.1;
/// Rotation response to the vertical gap, roll and pitch
const ROLL_SENSITIVITY: f32 = 0.0128;
const PITCH_SENSITIVITY: f32 = 0.0064;

/// Drives the plane's visual from pointer input and recoil state
#[derive(Debug, Clone, Copy)]
pub struct PlaneController {
    node: NodeId,
    propeller: NodeId,
}

impl PlaneController {
    pub fn new(node: NodeId, propeller: NodeId) -> Self {
        Self { node, propeller }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn propeller_node(&self) -> NodeId {
        self.propeller
    }

    pub fn position(&self, scene: &SceneGraph) -> Vec3 {
        scene
            .node(self.node)
            .map(|n| n.position)
            .unwrap_or(Vec3::ZERO)
    }

    /// One frame of pointer-following flight. `pointer` is normalized to
    /// [-1, 1] on both axes.
    pub fn update(
        &self,
        state: &mut GameState,
        scene: &mut SceneGraph,
        pointer: Vec2,
        fps_mode: bool,
        delta_ms: f32,
    ) {
        state.collision_displacement += state.collision_speed;
        let tuning = state.tuning.clone();

        let Some(node) = scene.node_mut(self.node) else {
            return;
        };

        if !fps_mode {
            state.plane_speed = remap_clamped(
                -pointer.x,
                -0.5,
                0.5,
                tuning.plane_min_speed,
                tuning.plane_max_speed,
            );
            let target_y = remap_clamped(pointer.y, -1.0, 1.0, 25.0, 175.0)
                + state.collision_displacement.y;
            let target_x = remap_clamped(pointer.x, -1.0, 1.0, -150.0, 150.0)
                + state.collision_displacement.x;

            node.position.x += (target_x - node.position.x) * APPROACH;
            node.position.y += (target_y - node.position.y) * APPROACH;
            node.rotation.z = (target_y - node.position.y) * ROLL_SENSITIVITY;
            node.rotation.x = (node.position.y - target_y) * PITCH_SENSITIVITY;
        } else {
            state.plane_speed = (tuning.plane_max_speed + tuning.plane_min_speed) / 2.0;
            let target_y = remap_clamped(pointer.y, -1.0, 1.0, 25.0, 150.0)
                + state.collision_displacement.y;
            let target_z = remap_clamped(pointer.x, -1.0, 1.0, -150.0, 150.0)
                + state.collision_displacement.z;

            node.position.z += (target_z - node.position.z) * APPROACH;
            node.position.y += (target_y - node.position.y) * APPROACH;
            node.rotation.z = (target_y - node.position.y) * ROLL_SENSITIVITY;
            node.rotation.x = (node.position.y - target_y) * PITCH_SENSITIVITY;
        }

        state.collision_speed +=
            -state.collision_speed * delta_ms * tuning.collision_speed_decay;
        state.collision_displacement +=
            -state.collision_displacement * delta_ms * tuning.collision_displacement_decay;
    }

    /// Spin the propeller; runs every frame regardless of status
    pub fn update_propeller(&self, scene: &mut SceneGraph, plane_speed: f32, delta_ms: f32) {
        if let Some(node) = scene.node_mut(self.propeller) {
            node.rotation.x += 0.2 + plane_speed * delta_ms * 0.005;
        }
    }

    /// One frame of the failure fall. Returns true once the plane has dropped
    /// below the replay altitude.
    pub fn update_falling(&self, state: &mut GameState, scene: &mut SceneGraph, delta_ms: f32) -> bool {
        state.speed *= 0.99;
        state.fall_speed *= 1.05;

        let Some(node) = scene.node_mut(self.node) else {
            return false;
        };
        node.position.y -= state.fall_speed * delta_ms;
        // Nose eases toward straight down
        node.rotation.z += (-FRAC_PI_2 - node.rotation.z) * 0.0002 * delta_ms;

        node.position.y < REPLAY_ALTITUDE
    }
}
