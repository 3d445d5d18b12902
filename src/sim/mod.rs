//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One shared per-frame delta, supplied by the frame driver
//! - Seeded RNG only
//! - Stable iteration order (insertion order, retirements applied after scan)
//! - No rendering or platform dependencies

pub mod clock;
pub mod enemy;
pub mod particle;
pub mod plane;
pub mod pool;
pub mod state;
pub mod tween;

pub use clock::SimulationClock;
pub use enemy::{Enemy, EnemyField};
pub use particle::{Particle, ParticleField};
pub use plane::PlaneController;
pub use pool::{Pool, Pooled};
pub use state::{GameState, GameStatus, Tuning};
pub use tween::{Tween, TweenChannel, TweenEvent, TweenFinish, TweenScheduler, ValueBag};
