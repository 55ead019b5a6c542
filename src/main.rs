/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use env_logger::Env;

use config::GameConfig;
use domain::entity::FrameInput;
use sim::event::GameEvent;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let mut world = WorldState::new(config.seed.unwrap_or_else(rand::random::<u64>));
    log::info!("session seed {}, platforms per row {:?}", world.seed, world.row_counts());

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        // Raw mode may already be on; restore before reporting.
        let _ = renderer.cleanup();
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut world, &mut renderer, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Endless Faller!");
    println!("Best Time: {:.2}", world.best_run);
}

/// Route `log` output to a file; the terminal belongs to the renderer.
/// Without a configured file (and no RUST_LOG) logging stays off.
fn init_logging(config: &GameConfig) {
    let Some(path) = &config.log_file else { return };
    let file = match File::create(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", path.display());
            return;
        }
    };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    if gp.connected {
        log::info!("gamepad detected");
    }

    let frame_budget = Duration::from_secs_f64(1.0 / f64::from(config.display.target_fps));
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(KEYS_QUIT) || gp.cancel_pressed() {
            log::info!("quit requested");
            break;
        }

        let dt = frame_dt(frame_start.duration_since(last_frame), config.display.max_frame_dt);
        last_frame = frame_start;

        let events = step::update(world, detect_input(&kb, &gp), dt);
        log_events(&events);

        renderer.render(world)?;

        if let Some(rest) = frame_budget.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    Ok(())
}

/// Seconds since the previous frame, capped so one stalled frame cannot
/// carry the player through a platform.
fn frame_dt(elapsed: Duration, max_frame_dt: f32) -> f32 {
    elapsed.as_secs_f32().min(max_frame_dt)
}

fn log_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::GameStarted => log::info!("game started"),
            GameEvent::Retried => log::info!("retry"),
            GameEvent::RunStarted => log::info!("run started"),
            GameEvent::GameOver { survival_time } => {
                log::info!("game over after {survival_time:.2}s");
            }
            GameEvent::Jumped { velocity } => log::debug!("jump, vy = {velocity:.1}"),
            GameEvent::Landed { platform, row } => {
                log::debug!("landed on platform {platform} (row {row})");
            }
            GameEvent::PlatformRecycled { platform, x } => {
                log::trace!("platform {platform} recycled to x = {x}");
            }
        }
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' ')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

/// Jump doubles as confirm on the Start and GameOver screens.
fn detect_input(kb: &InputState, gp: &GamepadState) -> FrameInput {
    FrameInput {
        jump: kb.any_pressed(KEYS_JUMP) || gp.confirm_pressed(),
        left: kb.any_held(KEYS_LEFT) || gp.left_held(),
        right: kb.any_held(KEYS_RIGHT) || gp.right_held(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_dt_is_capped() {
        assert_eq!(frame_dt(Duration::from_millis(16), 0.1), 0.016);
        assert_eq!(frame_dt(Duration::from_secs(3), 0.1), 0.1);
    }
}
