//! Game state and the status machine
//!
//! Everything the rest of the simulation reads or writes per frame lives on
//! one mutable record, created once at startup and reinitialized on replay.

use glam::Vec3;

use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Waiting for the first confirm input
    Ready,
    /// Active flight
    Playing,
    /// Hit an enemy; the plane is falling
    Failed,
    /// The fall finished; waiting for a replay confirm
    WaitingForReplay,
}

/// Tuning knobs, split out so tests can tighten or loosen them
#[derive(Debug, Clone)]
pub struct Tuning {
    pub init_speed: f32,
    pub ratio_speed_distance: f32,
    pub base_speed_ease: f32,
    pub plane_min_speed: f32,
    pub plane_max_speed: f32,
    pub plane_fall_speed: f32,
    pub enemy_speed_factor: f32,
    pub spawn_interval: f32,
    pub collision_tolerance: f32,
    pub collision_speed_decay: f32,
    pub collision_displacement_decay: f32,
    pub recoil_force: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            init_speed: INIT_SPEED,
            ratio_speed_distance: RATIO_SPEED_DISTANCE,
            base_speed_ease: BASE_SPEED_EASE,
            plane_min_speed: PLANE_MIN_SPEED,
            plane_max_speed: PLANE_MAX_SPEED,
            plane_fall_speed: PLANE_FALL_SPEED,
            enemy_speed_factor: ENEMY_SPEED_FACTOR,
            spawn_interval: ENEMY_SPAWN_INTERVAL,
            collision_tolerance: ENEMY_COLLISION_TOLERANCE,
            collision_speed_decay: COLLISION_SPEED_DECAY,
            collision_displacement_decay: COLLISION_DISPLACEMENT_DECAY,
            recoil_force: COLLISION_RECOIL_FORCE,
        }
    }
}

/// The authoritative mutable game record
#[derive(Debug, Clone)]
pub struct GameState {
    pub status: GameStatus,
    /// Distance flown; never decreases while Playing
    pub distance: f32,
    /// Effective world speed: `base_speed * plane_speed`
    pub speed: f32,
    /// Ramps toward `target_base_speed` each frame
    pub base_speed: f32,
    pub target_base_speed: f32,
    /// Forward speed derived from pointer position
    pub plane_speed: f32,
    /// Recoil offset added to the plane's target position; decays to zero
    pub collision_displacement: Vec3,
    /// Velocity feeding the recoil offset; decays faster than the offset
    pub collision_speed: Vec3,
    /// floor(distance) at which the last enemy wave spawned
    pub enemy_last_spawn_distance: f32,
    /// Fall speed while Failed; compounds every frame
    pub fall_speed: f32,
    pub tuning: Tuning,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            status: GameStatus::Ready,
            distance: 0.0,
            speed: 0.0,
            base_speed: tuning.init_speed,
            target_base_speed: tuning.init_speed,
            plane_speed: 0.0,
            collision_displacement: Vec3::ZERO,
            collision_speed: Vec3::ZERO,
            enemy_last_spawn_distance: 0.0,
            fall_speed: tuning.plane_fall_speed,
            tuning,
        }
    }

    /// Transition the status machine, applying entry side effects
    pub fn set_status(&mut self, status: GameStatus) {
        if status == self.status {
            return;
        }
        log::info!("game status {:?} -> {:?}", self.status, status);
        if status == GameStatus::Failed {
            self.fall_speed = self.tuning.plane_fall_speed;
        }
        self.status = status;
    }

    /// Reinitialize everything except tuning, for a replay.
    ///
    /// Only valid while waiting for a replay; the caller then transitions to
    /// Playing via the confirm input. The ready -> playing transition skips
    /// this call since the initial values already hold.
    pub fn reset_game(&mut self) {
        if self.status != GameStatus::WaitingForReplay {
            debug_assert!(false, "reset_game called in {:?}", self.status);
            log::warn!("ignoring reset_game in {:?}", self.status);
            return;
        }
        let tuning = self.tuning.clone();
        *self = Self::with_tuning(tuning);
        self.status = GameStatus::WaitingForReplay;
    }

    /// Advance distance; gated on Playing by the driver
    pub fn update_distance(&mut self, delta_ms: f32) {
        self.distance += self.speed * delta_ms * self.tuning.ratio_speed_distance;
    }

    /// Ease base speed toward its target and derive the effective speed
    pub fn update_playing_speed(&mut self, delta_ms: f32) {
        self.base_speed +=
            (self.target_base_speed - self.base_speed) * delta_ms * self.tuning.base_speed_ease;
        self.speed = self.base_speed * self.plane_speed;
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
