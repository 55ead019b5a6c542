/// The update function: advances the session by one frame.
///
/// `update` is the screen state machine:
///   Start    ── confirm ──▶ Playing
///   Playing  ── fall to ground line ──▶ GameOver
///   GameOver ── confirm ──▶ Playing (same layout, fresh run)
///
/// A confirm press that switches screens is consumed by the switch.
///
/// Playing-frame processing order:
///   1. Scroll + recycle + difficulty ramp (only once the run has started)
///   2. Landing resolution against the pre-update velocity
///   3. Jump
///   4. Gravity integration + loss check
///   5. Horizontal movement
///
/// Nothing here draws, sleeps, or reads the clock: `dt` and input come in,
/// events go out.

use crate::domain::entity::FrameInput;
use crate::domain::physics::{self, Contact};
use crate::domain::rules::RECYCLE_BELOW_Y;
use super::event::GameEvent;
use super::level;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn update(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    match world.phase {
        Phase::Start => {
            if !input.jump { return vec![]; }
            world.phase = Phase::Playing;
            vec![GameEvent::GameStarted]
        }
        Phase::GameOver => {
            if !input.jump { return vec![]; }
            world.reset_for_retry();
            vec![GameEvent::Retried]
        }
        Phase::Playing => step(world, input, dt),
    }
}

pub fn step(world: &mut WorldState, input: FrameInput, dt: f32) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();

    if world.started {
        scroll_platforms(world, dt, &mut events);
    }
    resolve_landing(world, dt, &mut events);
    resolve_jump(world, input, &mut events);
    resolve_fall(world, dt, &mut events);
    physics::move_horizontal(&mut world.player, input, world.difficulty.move_speed, dt);

    events
}

// ══════════════════════════════════════════════════════════════
// Scroll
// ══════════════════════════════════════════════════════════════

fn scroll_platforms(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let speed = world.difficulty.scroll_speed;
    for (i, platform) in world.platforms.iter_mut().enumerate() {
        platform.rect.y += speed * dt;
        if platform.rect.y > RECYCLE_BELOW_Y {
            level::recycle_platform(&mut world.rng, platform);
            events.push(GameEvent::PlatformRecycled { platform: i, x: platform.rect.x });
        }
    }
    world.difficulty.ramp();
    world.survival_time += dt;
}

// ══════════════════════════════════════════════════════════════
// Landing / jump / fall
// ══════════════════════════════════════════════════════════════

fn resolve_landing(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    let was_on_ground = world.player.on_ground;
    let contact = physics::find_landing(
        &world.player.rect, world.player.velocity_y, &world.platforms, dt,
    );
    physics::apply_contact(
        &mut world.player, contact, &world.platforms, world.difficulty.scroll_speed,
    );

    if let Contact::Landed(i) = contact {
        if !was_on_ground {
            events.push(GameEvent::Landed { platform: i, row: world.platforms[i].row });
        }
    }
}

fn resolve_jump(world: &mut WorldState, input: FrameInput, events: &mut Vec<GameEvent>) {
    if !input.jump { return; }
    if !physics::try_jump(&mut world.player, world.difficulty.jump_impulse) { return; }

    events.push(GameEvent::Jumped { velocity: world.player.velocity_y });
    if !world.started {
        world.started = true;
        events.push(GameEvent::RunStarted);
    }
}

fn resolve_fall(world: &mut WorldState, dt: f32, events: &mut Vec<GameEvent>) {
    if physics::integrate_fall(&mut world.player, world.difficulty.gravity, dt) {
        let survival_time = world.survival_time;
        world.end_run();
        events.push(GameEvent::GameOver { survival_time });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
