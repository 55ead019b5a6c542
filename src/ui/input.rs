/// Keyboard state tracker.
///
/// Terminals deliver key events, not key states. This module rebuilds the two
/// queries the game needs:
///   - `is_held`    : level-triggered (left/right movement)
///   - `was_pressed`: edge-triggered, true for one frame per physical press
///                  (jump / confirm)
///
/// When the terminal reports Release events (keyboard enhancement), a key is
/// held from Press until Release. Otherwise a key counts as held until
/// `HOLD_TIMEOUT` passes without a Press/Repeat event for it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
///
/// Consequence: without Release events a second press of the same key within
/// this window is indistinguishable from auto-repeat and is not a fresh press,
/// so a jump (or confirm) tapped twice inside 160 ms fires once.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from "not held" to "held" during the most recent drain.
    fresh_presses: Vec<KeyCode>,

    /// Raw key events collected during drain, for Ctrl-chord detection.
    raw_events: Vec<KeyEvent>,

    /// Honor Release events. Only true when keyboard enhancement is active.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation update.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.apply(key, Instant::now());
            }
        }

        self.expire(Instant::now());
    }

    /// Feed one key event observed at `now`.
    fn apply(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Without enhancement, releases are unreliable; timeouts handle them.
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    /// Drop keys whose hold has timed out (fallback for terminals without Release).
    fn expire(&mut self, now: Instant) {
        if self.honor_release { return; }
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now())
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        match self.last_active.get(&code) {
            Some(_) if self.honor_release => true,
            Some(t) => now.saturating_duration_since(*t) < HOLD_TIMEOUT,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    fn begin_frame(input: &mut InputState) {
        input.fresh_presses.clear();
        input.raw_events.clear();
    }

    #[test]
    fn press_is_edge_triggered_while_repeats_keep_it_held() {
        let mut input = InputState::new();
        let t0 = Instant::now();

        input.apply(key(KeyCode::Char(' '), KeyEventKind::Press), t0);
        assert!(input.was_pressed(KeyCode::Char(' ')));

        begin_frame(&mut input);
        input.apply(key(KeyCode::Char(' '), KeyEventKind::Repeat), t0 + Duration::from_millis(50));
        assert!(!input.was_pressed(KeyCode::Char(' ')));
        assert!(input.is_held_at(KeyCode::Char(' '), t0 + Duration::from_millis(100)));
    }

    #[test]
    fn hold_times_out_without_release_support() {
        let mut input = InputState::new();
        let t0 = Instant::now();
        input.apply(key(KeyCode::Left, KeyEventKind::Press), t0);
        let later = t0 + HOLD_TIMEOUT + Duration::from_millis(1);
        input.expire(later);
        assert!(!input.is_held_at(KeyCode::Left, later));

        // Ignored release does not clear the key early.
        input.apply(key(KeyCode::Right, KeyEventKind::Press), t0);
        input.apply(key(KeyCode::Right, KeyEventKind::Release), t0);
        assert!(input.is_held_at(KeyCode::Right, t0 + Duration::from_millis(10)));
    }

    #[test]
    fn quick_retap_needs_release_events_to_register() {
        let space = KeyCode::Char(' ');
        let t0 = Instant::now();
        let retap = t0 + HOLD_TIMEOUT / 2;

        // Timeout fallback: the second tap reads as auto-repeat.
        let mut input = InputState::new();
        input.apply(key(space, KeyEventKind::Press), t0);
        begin_frame(&mut input);
        input.apply(key(space, KeyEventKind::Press), retap);
        assert!(!input.was_pressed(space));

        // After the window it is a fresh press again.
        begin_frame(&mut input);
        input.expire(t0 + HOLD_TIMEOUT * 2);
        input.apply(key(space, KeyEventKind::Press), t0 + HOLD_TIMEOUT * 2);
        assert!(input.was_pressed(space));

        // With Release events the quick retap registers.
        let mut input = InputState::new();
        input.honor_release = true;
        input.apply(key(space, KeyEventKind::Press), t0);
        input.apply(key(space, KeyEventKind::Release), t0 + Duration::from_millis(30));
        begin_frame(&mut input);
        input.apply(key(space, KeyEventKind::Press), retap);
        assert!(input.was_pressed(space));
    }

    #[test]
    fn release_ends_hold_with_enhancement() {
        let mut input = InputState::new();
        input.honor_release = true;
        let t0 = Instant::now();
        input.apply(key(KeyCode::Right, KeyEventKind::Press), t0);
        input.expire(t0 + Duration::from_secs(5));
        assert!(input.is_held_at(KeyCode::Right, t0 + Duration::from_secs(5)));

        input.apply(key(KeyCode::Right, KeyEventKind::Release), t0 + Duration::from_secs(5));
        assert!(!input.is_held_at(KeyCode::Right, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn ctrl_c_is_detected() {
        let mut input = InputState::new();
        input.apply(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert!(input.ctrl_c_pressed());
    }
}
