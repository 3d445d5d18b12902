//! Sky Dodge - an endless flyer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machine, entity pools, tweens)
//! - `scene`: Minimal scene graph and the renderer seam
//! - `game`: Frame driver wiring the subsystems together
//! - `theme`: Color palettes applied to scene materials

pub mod game;
pub mod scene;
pub mod sim;
pub mod theme;

pub use game::Game;
pub use scene::{Camera, NullRenderer, Renderer, SceneGraph};
pub use theme::Palette;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Starting (and target) base speed, world units per millisecond factor
    pub const INIT_SPEED: f32 = 0.00035;
    /// Distance gained per unit of speed per millisecond
    pub const RATIO_SPEED_DISTANCE: f32 = 50.0;
    /// Easing factor pulling base speed toward its target
    pub const BASE_SPEED_EASE: f32 = 0.02;

    /// Plane forward-speed range, driven by the pointer in third-person mode
    pub const PLANE_MIN_SPEED: f32 = 1.2;
    pub const PLANE_MAX_SPEED: f32 = 1.6;
    /// Cruise altitude the plane starts at
    pub const PLANE_DEFAULT_HEIGHT: f32 = 100.0;
    /// Initial fall speed when the plane starts dropping
    pub const PLANE_FALL_SPEED: f32 = 0.001;
    /// Altitude below which a falling plane is done for
    pub const REPLAY_ALTITUDE: f32 = -200.0;

    /// Enemies advance along their orbit at speed * this factor
    pub const ENEMY_SPEED_FACTOR: f32 = 0.6;
    /// Distance interval between enemy waves
    pub const ENEMY_SPAWN_INTERVAL: f32 = 50.0;
    /// Enemies per wave
    pub const ENEMY_WAVE_SIZE: usize = 15;
    /// Collision radius between plane and enemy
    pub const ENEMY_COLLISION_TOLERANCE: f32 = 10.0;
    /// First-person depth band enemies oscillate inside
    pub const ENEMY_DEPTH_BAND: f32 = 150.0;

    /// Recoil impulse magnitude imparted on collision
    pub const COLLISION_RECOIL_FORCE: f32 = 100.0;
    /// Per-millisecond decay factors for recoil speed and displacement
    pub const COLLISION_SPEED_DECAY: f32 = 0.05;
    pub const COLLISION_DISPLACEMENT_DECAY: f32 = 0.01;

    /// The sea cylinder's center sits this far below the plane's flight line
    pub const SEA_LEVEL: f32 = -600.0;

    /// Camera rest positions per mode
    pub const CAMERA_THIRD_PERSON: Vec3 = Vec3::new(0.0, 100.0, 200.0);
    pub const CAMERA_FIRST_PERSON: Vec3 = Vec3::new(-150.0, 100.0, 0.0);
    pub const FOV_MIN: f32 = 40.0;
    pub const FOV_MAX: f32 = 80.0;

    /// Ambient light intensity at rest, and the flash level on impact
    pub const AMBIENT_REST: f32 = 0.2;
    pub const AMBIENT_FLASH: f32 = 1.5;

    /// Tween durations (milliseconds)
    pub const CAMERA_TWEEN_MS: f32 = 500.0;
    pub const PLANE_RECENTER_MS: f32 = 200.0;
    pub const PARTICLE_BURST_MS: f32 = 300.0;
    pub const ENEMY_DEPTH_SETTLE_MS: f32 = 300.0;
    pub const LIGHT_FADE_MS: f32 = 500.0;
}

/// Wrap an angle into [0, 2π)
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::TAU;
    while angle >= TAU {
        angle -= TAU;
    }
    while angle < 0.0 {
        angle += TAU;
    }
    angle
}

/// Clamp `v` to [vmin, vmax], then remap linearly into [tmin, tmax]
#[inline]
pub fn remap_clamped(v: f32, vmin: f32, vmax: f32, tmin: f32, tmax: f32) -> f32 {
    let nv = v.clamp(vmin, vmax);
    let pc = (nv - vmin) / (vmax - vmin);
    tmin + pc * (tmax - tmin)
}

/// Position on an orbit of the given radius around the sea center
#[inline]
pub fn orbit_position(angle: f32, radius: f32) -> Vec3 {
    Vec3::new(
        angle.cos() * radius,
        consts::SEA_LEVEL + angle.sin() * radius,
        0.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::TAU;

    proptest! {
        #[test]
        fn wrap_angle_stays_in_range(a in -100.0f32..100.0) {
            let w = wrap_angle(a);
            prop_assert!((0.0..TAU).contains(&w));
        }

        #[test]
        fn remap_clamped_stays_in_target_range(v in -10.0f32..10.0) {
            let r = remap_clamped(v, -1.0, 1.0, 25.0, 175.0);
            prop_assert!((25.0..=175.0).contains(&r));
        }
    }

    #[test]
    fn test_remap_endpoints() {
        assert_eq!(remap_clamped(-1.0, -1.0, 1.0, 25.0, 175.0), 25.0);
        assert_eq!(remap_clamped(1.0, -1.0, 1.0, 25.0, 175.0), 175.0);
        assert_eq!(remap_clamped(0.0, -1.0, 1.0, 0.0, 100.0), 50.0);
        // Out-of-range input clamps first
        assert_eq!(remap_clamped(5.0, -1.0, 1.0, 25.0, 175.0), 175.0);
    }

    #[test]
    fn test_orbit_position_on_circle() {
        let p = orbit_position(0.0, 700.0);
        assert!((p.x - 700.0).abs() < 0.001);
        assert!((p.y - consts::SEA_LEVEL).abs() < 0.001);

        let top = orbit_position(std::f32::consts::FRAC_PI_2, 700.0);
        assert!(top.x.abs() < 0.001);
        assert!((top.y - (consts::SEA_LEVEL + 700.0)).abs() < 0.001);
    }
}
