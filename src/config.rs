use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    default_rng_seed, CAPTURE_BOOST, CAPTURE_BOOST_MAX, CAPTURE_RANDOMNESS, DEFAULT_HEIGHT,
    DEFAULT_WIDTH, GROW_CELLS_PER_TICK, IDLE_CYCLE_TICKS, MAX_GROWTH_ROWS, MAX_GROW_PER_TICK,
    MIN_GROW_PER_TICK, PERIMETER_FRACTION, PERIMETER_FRACTION_MAX, PERIMETER_FRACTION_MIN,
    PUSH_BIAS, SEED_SEARCH_LIMIT, SHRINK_CELLS_PER_TICK, TICK_RATE,
};
use crate::error::ConfigError;
use crate::obstacle::LevelPalette;
use crate::types::{Side, Vec2};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: Vec2,
    #[serde(rename = "rngSeed")]
    pub rng_seed: Option<u32>,
    #[serde(rename = "ticksPerSecond")]
    pub ticks_per_second: f32,
    #[serde(rename = "use8Neighbors")]
    pub use_8_neighbors: bool,
    #[serde(rename = "growCellsPerTick")]
    pub grow_cells_per_tick: usize,
    #[serde(rename = "shrinkCellsPerTick")]
    pub shrink_cells_per_tick: usize,
    #[serde(rename = "perimeterFraction")]
    pub perimeter_fraction: f32,
    #[serde(rename = "minGrowPerTick")]
    pub min_grow_per_tick: usize,
    #[serde(rename = "maxGrowPerTick")]
    pub max_grow_per_tick: usize,
    #[serde(rename = "pushBias")]
    pub push_bias: i32,
    #[serde(rename = "captureBoost")]
    pub capture_boost: i32,
    #[serde(rename = "captureRandomness")]
    pub capture_randomness: f32,
    #[serde(rename = "captureOnlyWhileGrowing")]
    pub capture_only_while_growing: bool,
    #[serde(rename = "autoRun")]
    pub auto_run: bool,
    #[serde(rename = "idleCycleTicks")]
    pub idle_cycle_ticks: u32,
    #[serde(rename = "maxGrowthRows")]
    pub max_growth_rows: i32,
    #[serde(rename = "seedSearchLimit")]
    pub seed_search_limit: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: Vec2::new(10, 10),
            rng_seed: None,
            ticks_per_second: TICK_RATE,
            use_8_neighbors: false,
            grow_cells_per_tick: GROW_CELLS_PER_TICK,
            shrink_cells_per_tick: SHRINK_CELLS_PER_TICK,
            perimeter_fraction: PERIMETER_FRACTION,
            min_grow_per_tick: MIN_GROW_PER_TICK,
            max_grow_per_tick: MAX_GROW_PER_TICK,
            push_bias: PUSH_BIAS,
            capture_boost: CAPTURE_BOOST,
            capture_randomness: CAPTURE_RANDOMNESS,
            capture_only_while_growing: true,
            auto_run: false,
            idle_cycle_ticks: IDLE_CYCLE_TICKS,
            max_growth_rows: MAX_GROWTH_ROWS,
            seed_search_limit: SEED_SEARCH_LIMIT,
        }
    }
}

impl SimulationConfig {
    pub fn sanitized(mut self) -> Self {
        if !self.ticks_per_second.is_finite() || self.ticks_per_second <= 0.0 {
            self.ticks_per_second = TICK_RATE;
        }
        self.grow_cells_per_tick = self.grow_cells_per_tick.max(1);
        self.shrink_cells_per_tick = self.shrink_cells_per_tick.max(1);
        self.perimeter_fraction = if self.perimeter_fraction.is_finite() {
            self.perimeter_fraction
                .clamp(PERIMETER_FRACTION_MIN, PERIMETER_FRACTION_MAX)
        } else {
            PERIMETER_FRACTION
        };
        self.min_grow_per_tick = self.min_grow_per_tick.max(1);
        self.max_grow_per_tick = self.max_grow_per_tick.max(self.min_grow_per_tick);
        self.capture_boost = self.capture_boost.clamp(0, CAPTURE_BOOST_MAX);
        self.capture_randomness = if self.capture_randomness.is_finite() {
            self.capture_randomness.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.idle_cycle_ticks = self.idle_cycle_ticks.max(2);
        self.max_growth_rows = self.max_growth_rows.max(1);
        self.seed_search_limit = self.seed_search_limit.max(1);
        self
    }

    pub fn rng_seed_for(&self, side: Side) -> u32 {
        self.rng_seed.unwrap_or_else(|| default_rng_seed(side.id()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: i32,
    pub height: i32,
    pub map: Option<PathBuf>,
    pub palette: LevelPalette,
    pub player: SimulationConfig,
    pub enemy: SimulationConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        let player = SimulationConfig {
            seed: Vec2::new(DEFAULT_WIDTH / 4, DEFAULT_HEIGHT / 2),
            ..SimulationConfig::default()
        };
        let enemy = SimulationConfig {
            seed: Vec2::new(DEFAULT_WIDTH * 3 / 4, DEFAULT_HEIGHT / 2),
            auto_run: true,
            ..SimulationConfig::default()
        };
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            map: None,
            palette: LevelPalette::default(),
            player,
            enemy,
        }
    }
}

impl ArenaConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ArenaConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if let (Some(map), Some(base)) = (config.map.as_ref(), path.parent()) {
            if map.is_relative() {
                config.map = Some(base.join(map));
            }
        }
        Ok(config)
    }

    pub fn side(&self, side: Side) -> &SimulationConfig {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }
}
