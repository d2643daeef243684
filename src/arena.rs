use crate::clock::TickClock;
use crate::config::ArenaConfig;
use crate::error::GridError;
use crate::grid::GridField;
use crate::obstacle::ObstacleSource;
use crate::render::{MaskBuffer, RenderSink};
use crate::simulation::TerritorySimulation;
use crate::types::{ArenaSnapshot, Cell, Mode, Side, TickOutcome};

#[derive(Clone, Debug)]
pub struct Arena<S: RenderSink = MaskBuffer> {
    grid: GridField,
    sims: [TerritorySimulation; 2],
    clocks: [TickClock; 2],
    sinks: [S; 2],
    tick_counter: u64,
    elapsed_ms: u64,
}

impl<S: RenderSink> Arena<S> {
    pub fn new(config: &ArenaConfig, source: &dyn ObstacleSource, sinks: [S; 2]) -> Result<Self, GridError> {
        let grid = GridField::build(config.width, config.height, source)?;
        let sims = Side::ALL.map(|side| TerritorySimulation::new(side, config.side(side).clone()));
        let clocks = [
            TickClock::new(sims[0].config().ticks_per_second),
            TickClock::new(sims[1].config().ticks_per_second),
        ];
        let mut arena = Self {
            grid,
            sims,
            clocks,
            sinks,
            tick_counter: 0,
            elapsed_ms: 0,
        };
        arena.init_sides();
        Ok(arena)
    }

    fn init_sides(&mut self) {
        for side in Side::ALL {
            let idx = side.index();
            let (own, opponent) = sink_pair(&mut self.sinks, side);
            self.sims[idx].init_with_opponent(&mut self.grid, own, Some(opponent as &mut dyn RenderSink));
            self.clocks[idx].reset();
        }
    }

    pub fn rebuild(&mut self, source: &dyn ObstacleSource) -> Result<(), GridError> {
        let fresh = GridField::build(self.grid.width(), self.grid.height(), source)?;
        for side in Side::ALL {
            let owned: Vec<_> = self.grid.positions_of(Cell::Owned(side)).collect();
            if !owned.is_empty() {
                self.sinks[side.index()].apply_delta(&[], &owned);
            }
        }
        self.grid = fresh;
        self.init_sides();
        Ok(())
    }

    pub fn grid(&self) -> &GridField {
        &self.grid
    }

    pub fn simulation(&self, side: Side) -> &TerritorySimulation {
        &self.sims[side.index()]
    }

    pub fn sink(&self, side: Side) -> &S {
        &self.sinks[side.index()]
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn set_mode(&mut self, side: Side, mode: Mode) {
        self.sims[side.index()].set_mode(mode, &self.grid);
    }

    pub fn step(&mut self, dt_ms: u64) -> [TickOutcome; 2] {
        self.elapsed_ms += dt_ms;
        let mut totals = [TickOutcome::default(); 2];
        for side in Side::ALL {
            let due = self.clocks[side.index()].advance(dt_ms);
            for _ in 0..due {
                let outcome = self.tick_side(side);
                let total = &mut totals[side.index()];
                total.claimed += outcome.claimed;
                total.captured += outcome.captured;
                total.released += outcome.released;
            }
        }
        totals
    }

    pub fn tick_side(&mut self, side: Side) -> TickOutcome {
        let idx = side.index();
        self.tick_counter += 1;

        let sim = &mut self.sims[idx];
        if sim.config().auto_run {
            sim.autopilot_update(&self.grid);
        }

        let (own, opponent) = sink_pair(&mut self.sinks, side);
        sim.tick(&mut self.grid, own, Some(opponent as &mut dyn RenderSink))
    }

    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            tick: self.tick_counter,
            elapsed_ms: self.elapsed_ms,
            width: self.grid.width(),
            height: self.grid.height(),
            empty_cells: self.grid.count(Cell::Empty),
            obstacle_cells: self.grid.count(Cell::Obstacle),
            sides: self.sims.iter().map(|sim| sim.view(&self.grid)).collect(),
        }
    }
}

fn sink_pair<S>(sinks: &mut [S; 2], side: Side) -> (&mut S, &mut S) {
    let [player_sink, enemy_sink] = sinks;
    match side {
        Side::Player => (player_sink, enemy_sink),
        Side::Enemy => (enemy_sink, player_sink),
    }
}
