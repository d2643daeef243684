use crate::config::SimulationConfig;
use crate::frontier::Frontier;
use crate::grid::{neighbor_offsets, GridField};
use crate::render::RenderSink;
use crate::rng::{RandomSource, Rng};
use crate::types::{Cell, Mode, Side, SideView, SimulationStats, TickOutcome, Vec2};

mod autopilot;
mod growth;
mod seed;
mod shrink;

pub use self::autopilot::AutoPilot;

#[derive(Clone, Debug)]
pub struct TerritorySimulation<R: RandomSource = Rng> {
    side: Side,
    config: SimulationConfig,
    mode: Mode,
    seed: Vec2,
    rng: R,
    frontier: Frontier,
    waves: Vec<Vec<Vec2>>,
    current_wave: Vec<Vec2>,
    autopilot: AutoPilot,
    stats: SimulationStats,
    initialized: bool,
}

impl TerritorySimulation<Rng> {
    pub fn new(side: Side, config: SimulationConfig) -> Self {
        let rng = Rng::new(config.rng_seed_for(side));
        Self::with_rng(side, config, rng)
    }
}

impl<R: RandomSource> TerritorySimulation<R> {
    pub fn with_rng(side: Side, config: SimulationConfig, rng: R) -> Self {
        let config = config.sanitized();
        Self {
            side,
            seed: config.seed,
            mode: Mode::Idle,
            rng,
            frontier: Frontier::default(),
            waves: Vec::new(),
            current_wave: Vec::new(),
            autopilot: AutoPilot::default(),
            stats: SimulationStats::default(),
            initialized: false,
            config,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn seed(&self) -> Vec2 {
        self.seed
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn wave_depth(&self) -> usize {
        self.waves.len()
    }

    pub fn waves(&self) -> &[Vec<Vec2>] {
        &self.waves
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn me(&self) -> Cell {
        Cell::Owned(self.side)
    }

    fn other(&self) -> Cell {
        Cell::Owned(self.side.opponent())
    }

    pub fn init(&mut self, grid: &mut GridField, sink: &mut dyn RenderSink) {
        self.init_with_opponent(grid, sink, None);
    }

    pub fn init_with_opponent(
        &mut self,
        grid: &mut GridField,
        sink: &mut dyn RenderSink,
        opponent_sink: Option<&mut dyn RenderSink>,
    ) {
        let cleared = grid.clear_side(self.side);

        self.seed = self.place_seed(grid);
        let displaced = grid.cell_at(self.seed) == Some(self.other());
        grid.set(self.seed.x, self.seed.y, self.me());
        if displaced {
            if let Some(opponent_sink) = opponent_sink {
                opponent_sink.apply_delta(&[], &[self.seed]);
            }
        }

        self.frontier = Frontier::with_capacity(grid.width() as usize * grid.height() as usize / 4);
        self.waves.clear();
        self.current_wave.clear();
        self.autopilot = AutoPilot::default();
        self.initialized = true;
        self.rebuild_frontier(grid);

        sink.ensure_init(grid.width(), grid.height());
        let cleared: Vec<Vec2> = cleared.into_iter().filter(|pos| *pos != self.seed).collect();
        sink.apply_delta(&[self.seed], &cleared);

        if self.config.auto_run {
            self.set_mode(Mode::Grow, grid);
        }
    }

    pub fn set_mode(&mut self, mode: Mode, grid: &GridField) {
        self.mode = mode;
        if mode == Mode::Grow {
            self.rebuild_frontier(grid);
            self.current_wave.clear();
        }
    }

    pub fn tick(
        &mut self,
        grid: &mut GridField,
        sink: &mut dyn RenderSink,
        mut opponent_sink: Option<&mut dyn RenderSink>,
    ) -> TickOutcome {
        if !self.initialized {
            return TickOutcome::default();
        }
        let outcome = match self.mode {
            Mode::Grow => {
                let reborrowed = opponent_sink.as_mut().map(|s| &mut **s as &mut dyn RenderSink);
                self.grow_tick(grid, sink, reborrowed)
            }
            Mode::Shrink => self.shrink_tick(grid, sink),
            Mode::Idle => TickOutcome::default(),
        };
        self.reassert_seed(grid, sink, opponent_sink);
        self.stats.record(outcome);
        outcome
    }

    // The seed always ends a tick owned by this side.
    fn reassert_seed(
        &self,
        grid: &mut GridField,
        sink: &mut dyn RenderSink,
        opponent_sink: Option<&mut dyn RenderSink>,
    ) {
        let previous = grid.cell_at(self.seed);
        if previous == Some(self.me()) || !grid.set(self.seed.x, self.seed.y, self.me()) {
            return;
        }
        sink.apply_delta(&[self.seed], &[]);
        if previous == Some(self.other()) {
            if let Some(opponent_sink) = opponent_sink {
                opponent_sink.apply_delta(&[], &[self.seed]);
            }
        }
    }

    pub fn rebuild_frontier(&mut self, grid: &GridField) {
        self.frontier.clear();
        let (me, other) = (self.me(), self.other());
        let use_8 = self.config.use_8_neighbors;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let Some(cell) = grid.get(x, y) else {
                    continue;
                };
                if (cell == Cell::Empty || cell == other) && grid.count_neighbors(x, y, me, use_8) > 0 {
                    self.frontier.push(Vec2::new(x, y));
                }
            }
        }
    }

    fn enqueue(&mut self, grid: &GridField, pos: Vec2) {
        match grid.cell_at(pos) {
            None | Some(Cell::Obstacle) => {}
            Some(cell) if cell == self.me() => {}
            Some(_) => {
                self.frontier.push(pos);
            }
        }
    }

    fn enqueue_neighbors(&mut self, grid: &GridField, pos: Vec2) {
        for (dx, dy) in neighbor_offsets(self.config.use_8_neighbors) {
            self.enqueue(grid, pos.offset(dx, dy));
        }
    }

    pub fn view(&self, grid: &GridField) -> SideView {
        SideView {
            side: self.side,
            mode: self.mode,
            seed: self.seed,
            cells: grid.count(self.me()),
            wave_depth: self.waves.len(),
            frontier_size: self.frontier.len(),
            stats: self.stats,
        }
    }
}
