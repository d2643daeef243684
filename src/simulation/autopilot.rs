use super::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoPilot {
    cycling: bool,
    cycle_tick: u32,
}

impl AutoPilot {
    pub fn is_cycling(&self) -> bool {
        self.cycling
    }
}

impl<R: RandomSource> TerritorySimulation<R> {
    // Park in Idle once the rows reach max_growth_rows, then alternate
    // Grow and Shrink every half cycle while growth stays below the limit.
    pub fn autopilot_update(&mut self, grid: &GridField) {
        if !self.initialized {
            return;
        }
        let beyond = self.beyond_growth_rows(grid);

        if !self.autopilot.cycling {
            if matches!(self.mode, Mode::Grow | Mode::Shrink) && beyond {
                self.autopilot.cycling = true;
                self.autopilot.cycle_tick = 0;
                self.set_mode(Mode::Idle, grid);
            }
            return;
        }

        self.autopilot.cycle_tick = self.autopilot.cycle_tick.wrapping_add(1);
        let period = self.config.idle_cycle_ticks;
        let wanted = if self.autopilot.cycle_tick % period < period / 2 {
            if beyond {
                Mode::Idle
            } else {
                Mode::Grow
            }
        } else {
            Mode::Shrink
        };
        if wanted != self.mode {
            self.set_mode(wanted, grid);
        }
    }

    pub fn autopilot(&self) -> &AutoPilot {
        &self.autopilot
    }

    fn beyond_growth_rows(&self, grid: &GridField) -> bool {
        let Some((min_row, max_row)) = grid.row_extent(self.side) else {
            return false;
        };
        let limit = self.config.max_growth_rows;
        max_row >= self.seed.y + limit || min_row <= self.seed.y - limit
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{config_at, open_grid};
    use super::*;
    use crate::render::DeltaRecorder;

    fn auto_config() -> SimulationConfig {
        SimulationConfig {
            auto_run: true,
            max_growth_rows: 3,
            idle_cycle_ticks: 10,
            ..config_at(10, 10)
        }
    }

    #[test]
    fn auto_run_starts_growing_on_init() {
        let mut grid = open_grid(21, 21);
        let mut sim = TerritorySimulation::new(Side::Enemy, auto_config());
        sim.init(&mut grid, &mut DeltaRecorder::default());
        assert_eq!(sim.mode(), Mode::Grow);
        assert!(!sim.autopilot().is_cycling());
    }

    #[test]
    fn reaching_the_row_limit_parks_in_idle() {
        let mut grid = open_grid(21, 21);
        let mut sim = TerritorySimulation::new(Side::Enemy, auto_config());
        sim.init(&mut grid, &mut DeltaRecorder::default());
        sim.autopilot_update(&grid);
        assert_eq!(sim.mode(), Mode::Grow);

        grid.set(10, 13, Cell::Owned(Side::Enemy));
        sim.autopilot_update(&grid);
        assert_eq!(sim.mode(), Mode::Idle);
        assert!(sim.autopilot().is_cycling());
    }

    #[test]
    fn upward_extent_counts_too() {
        let mut grid = open_grid(21, 21);
        let mut sim = TerritorySimulation::new(Side::Enemy, auto_config());
        sim.init(&mut grid, &mut DeltaRecorder::default());
        grid.set(4, 7, Cell::Owned(Side::Enemy));
        sim.autopilot_update(&grid);
        assert_eq!(sim.mode(), Mode::Idle);
    }

    #[test]
    fn idle_never_triggers_the_limit() {
        let mut grid = open_grid(21, 21);
        let mut sim = TerritorySimulation::new(Side::Player, config_at(10, 10));
        sim.init(&mut grid, &mut DeltaRecorder::default());
        grid.set(10, 20, Cell::Owned(Side::Player));
        sim.autopilot_update(&grid);
        assert_eq!(sim.mode(), Mode::Idle);
        assert!(!sim.autopilot().is_cycling());
    }

    #[test]
    fn cycling_oscillates_between_grow_and_shrink() {
        let mut grid = open_grid(41, 41);
        let config = SimulationConfig {
            auto_run: true,
            max_growth_rows: 4,
            idle_cycle_ticks: 8,
            min_grow_per_tick: 4,
            max_grow_per_tick: 4,
            ..config_at(20, 20)
        };
        let mut sim = TerritorySimulation::new(Side::Player, config);
        sim.init(&mut grid, &mut DeltaRecorder::default());

        let mut modes = Vec::new();
        for _ in 0..200 {
            sim.autopilot_update(&grid);
            modes.push(sim.mode());
            sim.tick(&mut grid, &mut DeltaRecorder::default(), None);
            let (min_row, max_row) = grid.row_extent(Side::Player).unwrap();
            assert!(max_row - 20 <= 6 && 20 - min_row <= 6);
        }
        assert!(sim.autopilot().is_cycling());
        let tail = &modes[100..];
        assert!(tail.contains(&Mode::Grow));
        assert!(tail.contains(&Mode::Shrink));
    }
}
