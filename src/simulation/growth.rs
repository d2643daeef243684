use super::*;
use crate::constants::clamp_grow_budget;

impl<R: RandomSource> TerritorySimulation<R> {
    pub(super) fn grow_tick(
        &mut self,
        grid: &mut GridField,
        sink: &mut dyn RenderSink,
        opponent_sink: Option<&mut dyn RenderSink>,
    ) -> TickOutcome {
        if self.frontier.is_empty() {
            self.rebuild_frontier(grid);
        }
        if self.current_wave.capacity() == 0 {
            self.current_wave.reserve(self.config.grow_cells_per_tick);
        }

        let mut budget = clamp_grow_budget(
            self.frontier.len(),
            self.config.perimeter_fraction,
            self.config.min_grow_per_tick,
            self.config.max_grow_per_tick,
        );
        let batch_count = self.frontier.len().min(budget * 2);
        if batch_count == 0 {
            self.commit_wave();
            return TickOutcome::default();
        }

        let mut batch = self.frontier.drain_batch(batch_count);
        self.rng.shuffle(&mut batch);

        let (me, other) = (self.me(), self.other());
        let mut captured = Vec::new();
        for pos in batch {
            if budget == 0 {
                break;
            }
            match grid.cell_at(pos) {
                Some(Cell::Empty) => {}
                Some(cell) if cell == other => {
                    if !self.wins_capture(grid, pos) {
                        continue;
                    }
                    captured.push(pos);
                }
                _ => continue,
            }
            grid.set(pos.x, pos.y, me);
            self.current_wave.push(pos);
            budget -= 1;
            self.enqueue_neighbors(grid, pos);
        }

        if !self.current_wave.is_empty() {
            sink.apply_delta(&self.current_wave, &[]);
        }
        if !captured.is_empty() {
            if let Some(opponent_sink) = opponent_sink {
                opponent_sink.apply_delta(&[], &captured);
            }
        }

        let outcome = TickOutcome {
            claimed: self.current_wave.len(),
            captured: captured.len(),
            released: 0,
        };
        self.commit_wave();
        outcome
    }

    // An attacker short by exactly one gets a random nudge.
    fn wins_capture(&mut self, grid: &GridField, pos: Vec2) -> bool {
        let use_8 = self.config.use_8_neighbors;
        let mine = grid.count_neighbors(pos.x, pos.y, self.me(), use_8) as i32;
        let theirs = grid.count_neighbors(pos.x, pos.y, self.other(), use_8) as i32;

        let boost_applies = self.mode == Mode::Grow || !self.config.capture_only_while_growing;
        let boost = if boost_applies { self.config.capture_boost } else { 0 };
        let effective_mine = mine + boost;
        let target = theirs + self.config.push_bias;

        if effective_mine >= target {
            return true;
        }
        self.config.capture_randomness > 0.0
            && effective_mine + 1 >= target
            && self.rng.chance(self.config.capture_randomness)
    }

    fn commit_wave(&mut self) {
        if !self.current_wave.is_empty() {
            self.waves.push(std::mem::take(&mut self.current_wave));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::super::tests::{config_at, open_grid};
    use super::*;
    use crate::render::DeltaRecorder;

    fn growing(side: Side, config: SimulationConfig, grid: &mut GridField) -> TerritorySimulation {
        let mut sim = TerritorySimulation::new(side, config);
        sim.init(grid, &mut DeltaRecorder::default());
        sim.set_mode(Mode::Grow, grid);
        sim
    }

    #[test]
    fn first_tick_claims_the_four_orthogonal_neighbors() {
        let mut grid = open_grid(5, 5);
        let config = SimulationConfig {
            grow_cells_per_tick: 4,
            min_grow_per_tick: 4,
            max_grow_per_tick: 4,
            perimeter_fraction: 0.6,
            ..config_at(2, 2)
        };
        let mut sim = growing(Side::Player, config, &mut grid);
        let mut sink = DeltaRecorder::default();
        let outcome = sim.tick(&mut grid, &mut sink, None);

        assert_eq!(outcome.claimed, 4);
        let owned: HashSet<Vec2> = grid.positions_of(Cell::Owned(Side::Player)).collect();
        let expected: HashSet<Vec2> = [(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)]
            .into_iter()
            .map(|(x, y)| Vec2::new(x, y))
            .collect();
        assert_eq!(owned, expected);

        let frontier: HashSet<Vec2> = sim.frontier().iter().copied().collect();
        let mut adjacent = HashSet::new();
        for pos in &owned {
            for (dx, dy) in neighbor_offsets(false) {
                let next = pos.offset(dx, dy);
                if grid.in_bounds(next.x, next.y) && !owned.contains(&next) {
                    adjacent.insert(next);
                }
            }
        }
        assert_eq!(frontier, adjacent);
        assert_eq!(frontier.len(), 8);
        assert_eq!(sink.deltas.len(), 1);
        assert_eq!(sim.wave_depth(), 1);
    }

    #[test]
    fn growth_only_turns_empty_or_opponent_cells_into_own() {
        for seed in 0..30u32 {
            let mut grid = open_grid(12, 9);
            for x in 0..12 {
                grid.set(x, 4, Cell::Obstacle);
            }
            grid.set(6, 4, Cell::Empty);
            let mut player = growing(
                Side::Player,
                SimulationConfig {
                    rng_seed: Some(seed),
                    ..config_at(2, 1)
                },
                &mut grid,
            );
            let mut enemy = growing(
                Side::Enemy,
                SimulationConfig {
                    rng_seed: Some(seed + 1000),
                    ..config_at(9, 7)
                },
                &mut grid,
            );
            let mut sink = DeltaRecorder::default();
            for _ in 0..25 {
                let before = grid.clone();
                player.tick(&mut grid, &mut sink, None);
                for y in 0..grid.height() {
                    for x in 0..grid.width() {
                        let (was, now) = (before.get(x, y), grid.get(x, y));
                        if was == Some(Cell::Owned(Side::Player)) {
                            assert_eq!(now, was, "own cell changed at ({x},{y})");
                        }
                        if was == Some(Cell::Obstacle) {
                            assert_eq!(now, was);
                        }
                        if now != was {
                            assert_eq!(now, Some(Cell::Owned(Side::Player)));
                        }
                    }
                }
                enemy.tick(&mut grid, &mut sink, None);
            }
        }
    }

    #[test]
    fn budget_caps_claims_per_tick() {
        let mut grid = open_grid(40, 40);
        let config = SimulationConfig {
            min_grow_per_tick: 3,
            max_grow_per_tick: 3,
            ..config_at(20, 20)
        };
        let mut sim = growing(Side::Player, config, &mut grid);
        let mut total = 0;
        for _ in 0..10 {
            let outcome = sim.tick(&mut grid, &mut DeltaRecorder::default(), None);
            assert!(outcome.claimed <= 3);
            total += outcome.claimed;
        }
        assert!(total > 10);
        assert_eq!(grid.count(Cell::Owned(Side::Player)), 1 + total);
    }

    #[test]
    fn empty_frontier_is_rebuilt_from_the_grid() {
        let mut grid = open_grid(5, 1);
        let mut sim = growing(Side::Player, config_at(0, 0), &mut grid);
        sim.frontier.clear();
        let outcome = sim.tick(&mut grid, &mut DeltaRecorder::default(), None);
        assert_eq!(outcome.claimed, 1);
        assert_eq!(grid.get(1, 0), Some(Cell::Owned(Side::Player)));
    }

    #[test]
    fn sealed_seed_does_not_grow() {
        let mut grid = open_grid(3, 3);
        for (x, y) in [(1, 0), (0, 1), (2, 1), (1, 2)] {
            grid.set(x, y, Cell::Obstacle);
        }
        let mut sim = growing(Side::Player, config_at(1, 1), &mut grid);
        let mut sink = DeltaRecorder::default();
        let outcome = sim.tick(&mut grid, &mut sink, None);
        assert_eq!(outcome, TickOutcome::default());
        assert!(sink.deltas.is_empty());
        assert_eq!(sim.wave_depth(), 0);
    }

    fn paint_front(grid: &mut GridField) {
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let side = if x < grid.width() / 2 { Side::Player } else { Side::Enemy };
                grid.set(x, y, Cell::Owned(side));
            }
        }
    }

    fn deadlocked(seed_offset: u32) -> (GridField, TerritorySimulation, TerritorySimulation) {
        let mut grid = open_grid(4, 2);
        let tied = |x: i32, rng_seed: u32| SimulationConfig {
            push_bias: 0,
            capture_boost: 0,
            capture_randomness: 0.0,
            rng_seed: Some(rng_seed),
            ..config_at(x, 0)
        };
        let mut player = TerritorySimulation::new(Side::Player, tied(0, 1 + seed_offset));
        let mut enemy = TerritorySimulation::new(Side::Enemy, tied(3, 2 + seed_offset));
        player.init(&mut grid, &mut DeltaRecorder::default());
        enemy.init(&mut grid, &mut DeltaRecorder::default());
        paint_front(&mut grid);
        player.set_mode(Mode::Grow, &grid);
        enemy.set_mode(Mode::Grow, &grid);
        (grid, player, enemy)
    }

    #[test]
    fn front_holds_without_boost_or_randomness() {
        let (mut grid, mut player, mut enemy) = deadlocked(0);
        let before = grid.render_ascii();
        let mut sink = DeltaRecorder::default();
        for _ in 0..50 {
            assert_eq!(player.tick(&mut grid, &mut sink, None).captured, 0);
            assert_eq!(enemy.tick(&mut grid, &mut sink, None).captured, 0);
        }
        assert_eq!(grid.render_ascii(), before);
        assert!(sink.deltas.is_empty());
    }

    #[test]
    fn adjacent_seeds_stall_when_the_defender_has_more_support() {
        // P's seed touches E's seed, but E's seed is backed by two more E cells.
        let mut grid = open_grid(3, 2);
        let tied = |x: i32, y: i32| SimulationConfig {
            capture_boost: 0,
            capture_randomness: 0.0,
            ..config_at(x, y)
        };
        let mut player = TerritorySimulation::new(Side::Player, tied(0, 0));
        let mut enemy = TerritorySimulation::new(Side::Enemy, tied(1, 0));
        player.init(&mut grid, &mut DeltaRecorder::default());
        enemy.init(&mut grid, &mut DeltaRecorder::default());
        for (x, y) in [(2, 0), (1, 1), (2, 1)] {
            grid.set(x, y, Cell::Owned(Side::Enemy));
        }
        grid.set(0, 1, Cell::Obstacle);
        player.set_mode(Mode::Grow, &grid);
        for _ in 0..20 {
            assert_eq!(player.tick(&mut grid, &mut DeltaRecorder::default(), None).captured, 0);
        }
        assert_eq!(grid.count(Cell::Owned(Side::Player)), 1);
    }

    #[test]
    fn bare_adjacent_seeds_capture_on_a_tie() {
        let mut grid = open_grid(2, 1);
        let neutral = |x: i32| SimulationConfig {
            push_bias: 0,
            capture_boost: 0,
            capture_randomness: 0.0,
            ..config_at(x, 0)
        };
        let mut player = TerritorySimulation::new(Side::Player, neutral(0));
        let mut enemy = TerritorySimulation::new(Side::Enemy, neutral(1));
        player.init(&mut grid, &mut DeltaRecorder::default());
        enemy.init(&mut grid, &mut DeltaRecorder::default());
        player.set_mode(Mode::Grow, &grid);

        let mut theirs = DeltaRecorder::default();
        let outcome = player.tick(&mut grid, &mut DeltaRecorder::default(), Some(&mut theirs));
        assert_eq!(outcome.captured, 1);
        assert_eq!(grid.get(1, 0), Some(Cell::Owned(Side::Player)));
        assert_eq!(theirs.total_removed(), 1);

        let mut own = DeltaRecorder::default();
        enemy.tick(&mut grid, &mut own, None);
        assert_eq!(grid.get(1, 0), Some(Cell::Owned(Side::Enemy)));
        assert_eq!(own.total_added(), 1);
    }

    #[test]
    fn randomness_breaks_a_near_tie() {
        let (mut grid, mut player, _) = deadlocked(0);
        player.config.capture_randomness = 1.0;
        let mut own = DeltaRecorder::default();
        let mut theirs = DeltaRecorder::default();
        let outcome = player.tick(&mut grid, &mut own, Some(&mut theirs));
        assert!(outcome.captured > 0);
        assert_eq!(theirs.total_removed(), outcome.captured);
        assert_eq!(theirs.total_added(), 0);
        assert_eq!(own.total_added(), outcome.claimed);
        for pos in &theirs.deltas[0].removed {
            assert_eq!(grid.cell_at(*pos), Some(Cell::Owned(Side::Player)));
        }
    }

    #[test]
    fn boost_applies_only_while_growing_unless_configured() {
        let (grid, mut player, _) = deadlocked(0);
        player.config.capture_boost = 1;
        assert!(player.wins_capture(&grid, Vec2::new(2, 0)));

        player.mode = Mode::Shrink;
        assert!(!player.wins_capture(&grid, Vec2::new(2, 0)));

        player.config.capture_only_while_growing = false;
        assert!(player.wins_capture(&grid, Vec2::new(2, 0)));
    }

    #[test]
    fn push_bias_makes_capture_harder() {
        let mut grid = open_grid(3, 1);
        grid.set(0, 0, Cell::Owned(Side::Player));
        grid.set(1, 0, Cell::Owned(Side::Enemy));
        let mut player = TerritorySimulation::new(
            Side::Player,
            SimulationConfig {
                capture_boost: 0,
                capture_randomness: 0.0,
                ..config_at(0, 0)
            },
        );
        assert!(player.wins_capture(&grid, Vec2::new(1, 0)));
        player.config.push_bias = 2;
        assert!(!player.wins_capture(&grid, Vec2::new(1, 0)));
    }
}
