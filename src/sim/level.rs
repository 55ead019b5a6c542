/// Platform layout generation and recycling.
///
/// ## Initial field
///
/// `LEVEL_ROWS` rows, each 200 units apart. Row `i` gets 1..=5 platforms.
/// Their horizontal slots are a random permutation of `0..count`, so two
/// platforms of one row never share a slot:
///
///   row 0 (y =  20):  [slot 2]        [slot 0] [slot 1]
///   row 1 (y = 220):  [slot 0]
///   row 2 (y = 420):  [slot 3] [slot 1] [slot 0] [slot 2]
///   ...
///
/// Slot `s` starts at `x = s × 200`. Widths are drawn independently (100..=150).
/// Rows only exist at generation time; afterwards every platform scrolls with
/// the rest and only keeps its `row` tag.
///
/// ## Recycling
///
/// A platform scrolled past the bottom pops back in near the top at a random
/// slot among `0..=5`. Recycled platforms are not checked against each other.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::entity::Platform;
use crate::domain::rules::{
    row_top, LEVEL_ROWS, MAX_PLATFORMS_PER_ROW, MAX_PLATFORM_WIDTH, MIN_PLATFORMS_PER_ROW,
    MIN_PLATFORM_WIDTH, RECYCLE_MAX_SLOT, RECYCLE_RESET_Y, SLOT_WIDTH,
};

/// Random permutation of `0..count`.
pub fn slot_permutation<R: Rng>(rng: &mut R, count: usize) -> Vec<usize> {
    let mut slots: Vec<usize> = (0..count).collect();
    slots.shuffle(rng);
    slots
}

#[inline]
fn random_width<R: Rng>(rng: &mut R) -> f32 {
    rng.random_range(MIN_PLATFORM_WIDTH..=MAX_PLATFORM_WIDTH) as f32
}

/// Emit the platforms of one row.
pub fn generate_row<R: Rng>(rng: &mut R, row: usize, count: usize) -> Vec<Platform> {
    slot_permutation(rng, count)
        .into_iter()
        .map(|slot| Platform::new(slot as f32 * SLOT_WIDTH, row_top(row), random_width(rng), row))
        .collect()
}

/// Generate the whole initial field, rows in order.
pub fn generate_field<R: Rng>(rng: &mut R) -> Vec<Platform> {
    let counts: Vec<usize> = (0..LEVEL_ROWS)
        .map(|_| rng.random_range(MIN_PLATFORMS_PER_ROW..=MAX_PLATFORMS_PER_ROW))
        .collect();

    let mut platforms = Vec::with_capacity(counts.iter().sum());
    for (row, &count) in counts.iter().enumerate() {
        platforms.extend(generate_row(rng, row, count));
    }
    log::debug!("generated {} platforms, per-row counts {:?}", platforms.len(), counts);
    platforms
}

/// Per-row platform counts, derived from the `row` tags.
pub fn row_counts(platforms: &[Platform]) -> Vec<usize> {
    let mut counts = vec![0; LEVEL_ROWS];
    for p in platforms {
        if p.row >= counts.len() { counts.resize(p.row + 1, 0); }
        counts[p.row] += 1;
    }
    counts
}

/// Send a platform back to the top at a fresh slot and width.
pub fn recycle_platform<R: Rng>(rng: &mut R, platform: &mut Platform) {
    platform.rect.y = RECYCLE_RESET_Y;
    platform.rect.x = rng.random_range(0..=RECYCLE_MAX_SLOT) as f32 * SLOT_WIDTH;
    platform.rect.w = random_width(rng);
}
