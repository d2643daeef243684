use super::*;

impl<R: RandomSource> TerritorySimulation<R> {
    pub(super) fn shrink_tick(&mut self, grid: &mut GridField, sink: &mut dyn RenderSink) -> TickOutcome {
        let me = self.me();
        let mut left = self.config.shrink_cells_per_tick;
        let mut removed = Vec::with_capacity(left);

        while left > 0 {
            let Some(wave) = self.waves.last_mut() else {
                break;
            };
            while left > 0 {
                let Some(pos) = wave.pop() else {
                    break;
                };
                if pos == self.seed || grid.cell_at(pos) != Some(me) {
                    continue;
                }
                grid.set(pos.x, pos.y, Cell::Empty);
                removed.push(pos);
                left -= 1;
            }
            if wave.is_empty() {
                self.waves.pop();
            }
        }

        if !removed.is_empty() {
            sink.apply_delta(&[], &removed);
        }
        TickOutcome {
            claimed: 0,
            captured: 0,
            released: removed.len(),
        }
    }
}
