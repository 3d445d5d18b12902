//! Frame driver
//!
//! Owns the scene, camera, RNG, tween scheduler, and every registered
//! subsystem, and advances them in a fixed order once per frame:
//! clock -> status-gated updates -> decorations -> enemies -> render ->
//! tween playback. Subsystems arrive through registration calls after
//! construction, and updates that need an absent collaborator are no-ops
//! until it shows up.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::remap_clamped;
use crate::scene::{Camera, NodeId, Renderer, SceneGraph};
use crate::sim::enemy::wave_due;
use crate::sim::{
    EnemyField, GameState, GameStatus, ParticleField, PlaneController, SimulationClock, Tween,
    TweenChannel, TweenEvent, TweenFinish, TweenScheduler,
};
use crate::theme::Palette;

pub struct Game {
    pub scene: SceneGraph,
    pub camera: Camera,
    pub state: GameState,
    clock: SimulationClock,
    tweens: TweenScheduler,
    rng: Pcg32,
    palette: Palette,
    fps_mode: bool,
    running: bool,
    container: Option<(f32, f32)>,
    mouse: Vec2,
    sea: Option<NodeId>,
    sky: Option<NodeId>,
    plane: Option<PlaneController>,
    enemies: Option<EnemyField>,
    particles: Option<ParticleField>,
}

impl Game {
    pub fn new(seed: u64, palette: Palette) -> Self {
        Self::with_state(seed, palette, GameState::new())
    }

    pub fn with_state(seed: u64, palette: Palette, state: GameState) -> Self {
        let mut scene = SceneGraph::new();
        scene.fog_color = palette.fog_color();
        Self {
            scene,
            camera: Camera::default(),
            state,
            clock: SimulationClock::new(),
            tweens: TweenScheduler::new(),
            rng: Pcg32::seed_from_u64(seed),
            palette,
            fps_mode: false,
            running: false,
            container: None,
            mouse: Vec2::ZERO,
            sea: None,
            sky: None,
            plane: None,
            enemies: None,
            particles: None,
        }
    }

    pub fn fps_mode(&self) -> bool {
        self.fps_mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // --- registration ------------------------------------------------------

    pub fn add_sea(&mut self) {
        let id = self.scene.create_node(self.palette.sea_color());
        if let Some(node) = self.scene.node_mut(id) {
            node.position.y = SEA_LEVEL;
        }
        self.scene.attach(id);
        self.sea = Some(id);
    }

    pub fn add_sky(&mut self) {
        let id = self.scene.create_node(self.palette.cloud_color());
        if let Some(node) = self.scene.node_mut(id) {
            node.position.y = SEA_LEVEL;
        }
        self.scene.attach(id);
        self.sky = Some(id);
    }

    pub fn add_plane(&mut self) {
        let body = self.scene.create_node(self.palette.plane_body_color());
        if let Some(node) = self.scene.node_mut(body) {
            node.position.y = PLANE_DEFAULT_HEIGHT;
            node.scale = Vec3::splat(0.25);
        }
        let propeller = self.scene.create_node(self.palette.plane_propeller_color());
        self.scene.attach(body);
        self.scene.attach(propeller);
        self.plane = Some(PlaneController::new(body, propeller));
    }

    /// Register the enemy holder and spawn the opening wave
    pub fn add_enemy_field(&mut self) {
        let mut field = EnemyField::new(self.palette.enemy_color());
        field.spawn_wave(ENEMY_WAVE_SIZE, &mut self.scene, &mut self.rng);
        self.enemies = Some(field);
    }

    pub fn add_particle_field(&mut self) {
        self.particles = Some(ParticleField::new());
    }

    // --- input & viewport --------------------------------------------------

    pub fn update_size(&mut self, width: f32, height: f32) {
        self.container = Some((width, height));
        if height > 0.0 {
            self.camera.aspect = width / height;
        }
    }

    pub fn update_mouse_position(&mut self, x: f32, y: f32) {
        self.mouse = Vec2::new(x, y);
    }

    /// Raw pointer position mapped to [-1, 1] on both axes
    fn normalized_mouse(&self) -> Vec2 {
        match self.container {
            Some((w, h)) if w > 0.0 && h > 0.0 => Vec2::new(
                -1.0 + (self.mouse.x / w) * 2.0,
                1.0 - (self.mouse.y / h) * 2.0,
            ),
            _ => Vec2::new(-1.0, 1.0),
        }
    }

    pub fn update_camera_position(&mut self, x: f32, y: f32, z: f32) {
        self.camera.position = Vec3::new(x, y, z);
    }

    /// Scroll input nudges the field of view, animated over half a second
    pub fn update_camera_fov(&mut self, delta_scroll: f32) {
        let target = (self.camera.fov + remap_clamped(delta_scroll, -100.0, 100.0, -20.0, 20.0))
            .clamp(FOV_MIN, FOV_MAX);
        self.tweens.schedule(
            Tween::new(TweenChannel::CameraFov, CAMERA_TWEEN_MS).key(
                "fov",
                self.camera.fov,
                target,
            ),
        );
    }

    /// Swap between third-person and first-person camera and controls
    pub fn toggle_fps(&mut self) {
        self.fps_mode = !self.fps_mode;
        let (camera_target, yaw_target, recenter_axis, spawn_mark) = if self.fps_mode {
            (CAMERA_FIRST_PERSON, -FRAC_PI_2, "x", 50.0)
        } else {
            (CAMERA_THIRD_PERSON, 0.0, "z", 100.0)
        };

        self.state.enemy_last_spawn_distance = spawn_mark;

        if let Some(plane) = self.plane {
            // The axis the new mode doesn't steer eases back to center
            let current = self
                .scene
                .node(plane.node())
                .map_or(0.0, |n| match recenter_axis {
                    "x" => n.position.x,
                    _ => n.position.z,
                });
            self.tweens.schedule(
                Tween::new(TweenChannel::NodePosition(plane.node()), PLANE_RECENTER_MS)
                    .key(recenter_axis, current, 0.0),
            );
        }

        self.tweens.schedule(
            Tween::new(TweenChannel::CameraPosition, CAMERA_TWEEN_MS)
                .key("x", self.camera.position.x, camera_target.x)
                .key("y", self.camera.position.y, camera_target.y)
                .key("z", self.camera.position.z, camera_target.z),
        );
        self.tweens.schedule(
            Tween::new(TweenChannel::CameraRotation, CAMERA_TWEEN_MS).key(
                "y",
                self.camera.rotation.y,
                yaw_target,
            ),
        );

        log::info!(
            "camera mode: {}",
            if self.fps_mode {
                "first-person"
            } else {
                "third-person"
            }
        );
    }

    // --- status machine entry points ---------------------------------------

    pub fn change_game_status(&mut self, status: GameStatus) {
        use GameStatus::*;
        let valid = matches!(
            (self.state.status, status),
            (Ready, Playing) | (WaitingForReplay, Playing) | (Playing, Failed)
                | (Failed, WaitingForReplay)
        );
        if !valid {
            debug_assert!(
                false,
                "invalid status change {:?} -> {:?}",
                self.state.status, status
            );
            log::warn!(
                "ignoring status change {:?} -> {:?}",
                self.state.status,
                status
            );
            return;
        }
        self.state.set_status(status);
    }

    /// Reinitialize for a replay; valid only while waiting for one
    pub fn reset_game(&mut self) {
        self.state.reset_game();
        if let Some(plane) = self.plane {
            if let Some(node) = self.scene.node_mut(plane.node()) {
                node.position = Vec3::new(0.0, PLANE_DEFAULT_HEIGHT, 0.0);
                node.rotation = Vec3::ZERO;
            }
        }
    }

    // --- theming -----------------------------------------------------------

    pub fn apply_palette(&mut self, palette: Palette) {
        self.scene.fog_color = palette.fog_color();
        if let Some(sea) = self.sea {
            if let Some(node) = self.scene.node_mut(sea) {
                node.color = palette.sea_color();
            }
        }
        if let Some(sky) = self.sky {
            if let Some(node) = self.scene.node_mut(sky) {
                node.color = palette.cloud_color();
            }
        }
        if let Some(plane) = self.plane {
            if let Some(node) = self.scene.node_mut(plane.node()) {
                node.color = palette.plane_body_color();
            }
            if let Some(node) = self.scene.node_mut(plane.propeller_node()) {
                node.color = palette.plane_propeller_color();
            }
        }
        if let Some(enemies) = self.enemies.as_mut() {
            enemies.set_enemy_color(palette.enemy_color(), &mut self.scene);
        }
        self.palette = palette;
    }

    // --- the frame ---------------------------------------------------------

    /// Advance one frame: simulation, render submission, tween playback
    pub fn step(&mut self, now_ms: f64, renderer: &mut dyn Renderer) {
        let delta = self.clock.update(now_ms);

        // Sim updates wait until the decorative collaborators are registered;
        // initialization populates them across the first few frames.
        if let (Some(sea), Some(sky), Some(plane)) = (self.sea, self.sky, self.plane) {
            match self.state.status {
                GameStatus::Playing => {
                    if wave_due(
                        self.state.distance,
                        self.state.tuning.spawn_interval,
                        self.state.enemy_last_spawn_distance,
                    ) {
                        self.state.enemy_last_spawn_distance = self.state.distance.floor();
                        if let Some(enemies) = self.enemies.as_mut() {
                            log::info!("enemy wave at distance {:.0}", self.state.distance);
                            enemies.spawn_wave(ENEMY_WAVE_SIZE, &mut self.scene, &mut self.rng);
                        }
                    }

                    let pointer = self.normalized_mouse();
                    plane.update(
                        &mut self.state,
                        &mut self.scene,
                        pointer,
                        self.fps_mode,
                        delta,
                    );
                    self.state.update_distance(delta);
                    self.state.update_playing_speed(delta);
                }
                GameStatus::Failed => {
                    if plane.update_falling(&mut self.state, &mut self.scene, delta) {
                        self.state.set_status(GameStatus::WaitingForReplay);
                    }
                }
                GameStatus::Ready | GameStatus::WaitingForReplay => {}
            }

            // Decorations and enemies run every frame regardless of status
            if let Some(node) = self.scene.node_mut(sea) {
                node.rotation.z += self.state.speed * delta;
                if node.rotation.z > TAU {
                    node.rotation.z -= TAU;
                }
            }
            if let Some(node) = self.scene.node_mut(sky) {
                node.rotation.z += self.state.speed * delta;
            }
            plane.update_propeller(&mut self.scene, self.state.plane_speed, delta);

            let plane_position = plane.position(&self.scene);
            if let Some(enemies) = self.enemies.as_mut() {
                enemies.update(
                    &mut self.state,
                    &mut self.scene,
                    &mut self.tweens,
                    self.particles.as_mut(),
                    plane_position,
                    self.fps_mode,
                    delta,
                    &mut self.rng,
                );
            }
        }

        renderer.render(&self.scene, &self.camera);

        for event in self.tweens.advance(delta) {
            self.apply_tween_event(event);
        }
    }

    fn apply_tween_event(&mut self, event: TweenEvent) {
        match event {
            TweenEvent::Update { channel, values } => match channel {
                TweenChannel::NodePosition(id) => {
                    if let Some(node) = self.scene.node_mut(id) {
                        if let Some(x) = values.get("x") {
                            node.position.x = x;
                        }
                        if let Some(y) = values.get("y") {
                            node.position.y = y;
                        }
                        if let Some(z) = values.get("z") {
                            node.position.z = z;
                        }
                    }
                }
                TweenChannel::NodeRotation(id) => {
                    if let Some(node) = self.scene.node_mut(id) {
                        if let Some(x) = values.get("x") {
                            node.rotation.x = x;
                        }
                        if let Some(y) = values.get("y") {
                            node.rotation.y = y;
                        }
                        if let Some(z) = values.get("z") {
                            node.rotation.z = z;
                        }
                    }
                }
                TweenChannel::NodeScale(id) => {
                    if let Some(node) = self.scene.node_mut(id) {
                        if let Some(x) = values.get("x") {
                            node.scale.x = x;
                        }
                        if let Some(y) = values.get("y") {
                            node.scale.y = y;
                        }
                        if let Some(z) = values.get("z") {
                            node.scale.z = z;
                        }
                    }
                }
                TweenChannel::CameraPosition => {
                    if let Some(x) = values.get("x") {
                        self.camera.position.x = x;
                    }
                    if let Some(y) = values.get("y") {
                        self.camera.position.y = y;
                    }
                    if let Some(z) = values.get("z") {
                        self.camera.position.z = z;
                    }
                }
                TweenChannel::CameraRotation => {
                    if let Some(x) = values.get("x") {
                        self.camera.rotation.x = x;
                    }
                    if let Some(y) = values.get("y") {
                        self.camera.rotation.y = y;
                    }
                    if let Some(z) = values.get("z") {
                        self.camera.rotation.z = z;
                    }
                }
                TweenChannel::CameraFov => {
                    if let Some(fov) = values.get("fov") {
                        self.camera.fov = fov;
                    }
                }
                TweenChannel::AmbientIntensity => {
                    if let Some(intensity) = values.get("intensity") {
                        self.scene.ambient_intensity = intensity;
                    }
                }
            },
            TweenEvent::Complete { finish, .. } => match finish {
                TweenFinish::None => {}
                TweenFinish::SnapDepth(id) => {
                    if let Some(node) = self.scene.node_mut(id) {
                        node.position.z = 0.0;
                    }
                }
                TweenFinish::ReleaseParticle(id) => {
                    if let Some(particles) = self.particles.as_mut() {
                        particles.release_by_node(id, &mut self.scene);
                    }
                }
            },
        }
    }

    // --- loop control ------------------------------------------------------

    /// Drive frames until the host stops supplying timestamps or `stop` is
    /// called. The host closure is invoked once per frame and may mutate the
    /// game (inputs, status changes) before the step runs.
    pub fn run<F>(&mut self, renderer: &mut dyn Renderer, mut next_frame: F)
    where
        F: FnMut(&mut Game) -> Option<f64>,
    {
        self.running = true;
        while self.running {
            let Some(now_ms) = next_frame(self) else {
                break;
            };
            self.step(now_ms, renderer);
        }
        self.running = false;
    }

    /// Cancel the loop; no further frames are scheduled after the current one
    pub fn stop(&mut self) {
        self.running = false;
    }
}
