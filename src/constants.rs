pub const TICK_RATE: f32 = 20.0;
pub const FRAME_MS: u64 = 1000 / 60;
pub const MAX_CATCH_UP_TICKS: u32 = 32;

pub const DEFAULT_WIDTH: i32 = 128;
pub const DEFAULT_HEIGHT: i32 = 72;

// Frontier keys pack 16 bits per axis.
pub const MAX_GRID_SIDE: i32 = u16::MAX as i32;

pub const GROW_CELLS_PER_TICK: usize = 32;
pub const SHRINK_CELLS_PER_TICK: usize = 64;

pub const PERIMETER_FRACTION: f32 = 0.25;
pub const PERIMETER_FRACTION_MIN: f32 = 0.05;
pub const PERIMETER_FRACTION_MAX: f32 = 0.6;
pub const MIN_GROW_PER_TICK: usize = 8;
pub const MAX_GROW_PER_TICK: usize = 128;

pub const PUSH_BIAS: i32 = 0;
pub const CAPTURE_BOOST: i32 = 1;
pub const CAPTURE_BOOST_MAX: i32 = 4;
pub const CAPTURE_RANDOMNESS: f32 = 0.2;

pub const IDLE_CYCLE_TICKS: u32 = 40;
pub const MAX_GROWTH_ROWS: i32 = 20;

pub const SEED_SEARCH_LIMIT: usize = 4096;

pub const COLOR_TOLERANCE: f32 = 0.08;
pub const COLOR_TOLERANCE_MAX: f32 = 0.3;

pub fn default_rng_seed(side_id: u8) -> u32 {
    1234 + side_id as u32
}

pub fn clamp_grow_budget(perimeter: usize, fraction: f32, min: usize, max: usize) -> usize {
    let raw = (perimeter.max(1) as f32 * fraction) as usize;
    raw.clamp(min, max.max(min))
}
