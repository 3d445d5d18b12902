//! Sky Dodge entry point
//!
//! The real front end drives `Game` from a display-refresh callback and a
//! GPU renderer. The native binary runs the same loop headless: a few
//! seconds of scripted flight, useful for profiling and sanity checks.

use std::time::{Duration, Instant};

use sky_dodge::sim::GameStatus;
use sky_dodge::{Game, NullRenderer, Palette};

/// Frames the headless demo flies before stopping
const DEMO_FRAMES: u32 = 600;

fn main() {
    env_logger::init();
    log::info!("Sky Dodge (headless) starting...");

    let mut game = Game::new(0xDA7E, Palette::day());
    game.update_size(1280.0, 720.0);
    game.update_mouse_position(640.0, 360.0);
    game.add_sea();
    game.add_sky();
    game.add_plane();
    game.add_enemy_field();
    game.add_particle_field();
    game.change_game_status(GameStatus::Playing);

    let mut renderer = NullRenderer::default();
    let start = Instant::now();
    let mut frame: u32 = 0;

    game.run(&mut renderer, |game| {
        frame += 1;
        if frame > DEMO_FRAMES {
            game.stop();
            return None;
        }
        // Weave the pointer so the plane actually flies around
        let t = frame as f32 * 0.02;
        game.update_mouse_position(640.0 + t.sin() * 400.0, 360.0 + (t * 0.7).cos() * 250.0);

        std::thread::sleep(Duration::from_millis(16));
        Some(start.elapsed().as_secs_f64() * 1000.0)
    });

    log::info!(
        "flew {:.0} units over {} frames, final status {:?}",
        game.state.distance,
        renderer.frames,
        game.state.status
    );
}
