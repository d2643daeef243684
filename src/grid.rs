use std::collections::{HashSet, VecDeque};

use crate::constants::MAX_GRID_SIDE;
use crate::error::GridError;
use crate::obstacle::ObstacleSource;
use crate::types::{Cell, Side, Vec2};

static ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
static DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub fn neighbor_offsets(use_8: bool) -> impl Iterator<Item = (i32, i32)> {
    let diagonal: &'static [(i32, i32)] = if use_8 { &DIAGONAL } else { &[] };
    ORTHOGONAL.iter().chain(diagonal.iter()).copied()
}

#[derive(Clone, Debug)]
pub struct GridField {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl GridField {
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 || width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(GridError::InvalidDimensions {
                width,
                height,
                max: MAX_GRID_SIDE,
            });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::Empty; width as usize * height as usize],
        })
    }

    pub fn build(width: i32, height: i32, source: &dyn ObstacleSource) -> Result<Self, GridError> {
        let (width, height) = source.dimensions().unwrap_or((width, height));
        let mut grid = Self::new(width, height)?;
        grid.fill_obstacles(source);
        Ok(grid)
    }

    pub fn rebuild(&mut self, source: &dyn ObstacleSource) -> Result<(), GridError> {
        *self = Self::build(self.width, self.height, source)?;
        Ok(())
    }

    fn fill_obstacles(&mut self, source: &dyn ObstacleSource) {
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = if source.is_obstacle(x, y) {
                    Cell::Obstacle
                } else {
                    Cell::Empty
                };
                let idx = self.index(x, y);
                self.cells[idx] = cell;
            }
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.cells[self.index(x, y)])
    }

    pub fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        self.get(pos.x, pos.y)
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    pub fn count_neighbors(&self, x: i32, y: i32, target: Cell, use_8: bool) -> usize {
        neighbor_offsets(use_8)
            .filter(|(dx, dy)| self.get(x + dx, y + dy) == Some(target))
            .count()
    }

    pub fn count(&self, target: Cell) -> usize {
        self.cells.iter().filter(|cell| **cell == target).count()
    }

    pub fn positions_of(&self, target: Cell) -> impl Iterator<Item = Vec2> + '_ {
        let width = self.width as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| **cell == target)
            .map(move |(idx, _)| Vec2::new((idx % width) as i32, (idx / width) as i32))
    }

    pub fn clear_side(&mut self, side: Side) -> Vec<Vec2> {
        let cleared: Vec<Vec2> = self.positions_of(Cell::Owned(side)).collect();
        for pos in &cleared {
            self.set(pos.x, pos.y, Cell::Empty);
        }
        cleared
    }

    pub fn row_extent(&self, side: Side) -> Option<(i32, i32)> {
        let target = Cell::Owned(side);
        let row_has = |y: i32| (0..self.width).any(|x| self.get(x, y) == Some(target));
        let min = (0..self.height).find(|y| row_has(*y))?;
        let max = (0..self.height).rev().find(|y| row_has(*y))?;
        Some((min, max))
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2::new(pos.x.clamp(0, self.width - 1), pos.y.clamp(0, self.height - 1))
    }

    // 8-connected BFS, visiting at most `limit` cells.
    pub fn find_nearest_free(&self, start: Vec2, limit: usize) -> Option<Vec2> {
        if !self.in_bounds(start.x, start.y) {
            return None;
        }
        let mut queue = VecDeque::new();
        let mut seen = HashSet::new();
        seen.insert(start);
        queue.push_back(start);

        let mut visited = 0usize;
        while let Some(pos) = queue.pop_front() {
            if visited >= limit {
                return None;
            }
            visited += 1;
            if self.cell_at(pos).is_some_and(|cell| cell != Cell::Obstacle) {
                return Some(pos);
            }
            for (dx, dy) in neighbor_offsets(true) {
                let next = pos.offset(dx, dy);
                if self.in_bounds(next.x, next.y) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        None
    }

    pub fn render_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in self.cells.chunks(self.width as usize) {
            out.extend(row.iter().map(|cell| cell.glyph()));
            out.push('\n');
        }
        out
    }
}
