use crate::grid::GridField;
use crate::types::{Cell, Side, Vec2};

pub const MASK_ON: u8 = 255;
pub const MASK_OFF: u8 = 0;

pub trait RenderSink {
    fn ensure_init(&mut self, _width: i32, _height: i32) {}

    // Must tolerate empty lists and out-of-range coordinates.
    fn apply_delta(&mut self, added: &[Vec2], removed: &[Vec2]);
}

#[derive(Clone, Debug, Default)]
pub struct MaskBuffer {
    width: i32,
    height: i32,
    buffer: Vec<u8>,
    updates: u64,
}

impl MaskBuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let mut mask = Self::default();
        mask.ensure_init(width, height);
        mask
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn clear(&mut self) {
        self.buffer.fill(MASK_OFF);
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        self.index(x, y).map(|idx| self.buffer[idx])
    }

    pub fn coverage(&self) -> usize {
        self.buffer.iter().filter(|v| **v != MASK_OFF).count()
    }

    pub fn update_from_grid(&mut self, grid: &GridField, side: Side) {
        self.ensure_init(grid.width(), grid.height());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let on = grid.get(x, y) == Some(Cell::Owned(side));
                self.write(x, y, if on { MASK_ON } else { MASK_OFF });
            }
        }
        self.updates += 1;
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn write(&mut self, x: i32, y: i32, value: u8) {
        if let Some(idx) = self.index(x, y) {
            self.buffer[idx] = value;
        }
    }
}

impl RenderSink for MaskBuffer {
    fn ensure_init(&mut self, width: i32, height: i32) {
        if width <= 0 || height <= 0 {
            return;
        }
        if self.width == width && self.height == height && !self.buffer.is_empty() {
            return;
        }
        self.width = width;
        self.height = height;
        self.buffer = vec![MASK_OFF; width as usize * height as usize];
    }

    fn apply_delta(&mut self, added: &[Vec2], removed: &[Vec2]) {
        if added.is_empty() && removed.is_empty() {
            return;
        }
        for pos in added {
            self.write(pos.x, pos.y, MASK_ON);
        }
        for pos in removed {
            self.write(pos.x, pos.y, MASK_OFF);
        }
        self.updates += 1;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta {
    pub added: Vec<Vec2>,
    pub removed: Vec<Vec2>,
}

#[derive(Clone, Debug, Default)]
pub struct DeltaRecorder {
    pub deltas: Vec<Delta>,
}

impl DeltaRecorder {
    pub fn last(&self) -> Option<&Delta> {
        self.deltas.last()
    }

    pub fn total_added(&self) -> usize {
        self.deltas.iter().map(|d| d.added.len()).sum()
    }

    pub fn total_removed(&self) -> usize {
        self.deltas.iter().map(|d| d.removed.len()).sum()
    }
}

impl RenderSink for DeltaRecorder {
    fn apply_delta(&mut self, added: &[Vec2], removed: &[Vec2]) {
        self.deltas.push(Delta {
            added: added.to_vec(),
            removed: removed.to_vec(),
        });
    }
}
