use super::*;

impl<R: RandomSource> TerritorySimulation<R> {
    // Falls back to the origin when the bounded search finds nothing.
    pub(super) fn place_seed(&self, grid: &GridField) -> Vec2 {
        let wanted = grid.clamp(self.config.seed);
        if grid.cell_at(wanted) != Some(Cell::Obstacle) {
            return wanted;
        }
        match grid.find_nearest_free(wanted, self.config.seed_search_limit) {
            Some(found) => found,
            None => {
                eprintln!(
                    "[territory] no free cell within {} of seed ({},{}) for {:?}; using origin",
                    self.config.seed_search_limit, wanted.x, wanted.y, self.side
                );
                Vec2::new(0, 0)
            }
        }
    }
}
