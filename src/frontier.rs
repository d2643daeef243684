use std::collections::{HashSet, VecDeque};

use crate::constants::MAX_GRID_SIDE;
use crate::types::Vec2;

// Collision-free for 0..=MAX_GRID_SIDE on both axes.
pub fn pack_coord(pos: Vec2) -> u32 {
    debug_assert!((0..=MAX_GRID_SIDE).contains(&pos.x) && (0..=MAX_GRID_SIDE).contains(&pos.y));
    ((pos.x as u32 & 0xffff) << 16) | (pos.y as u32 & 0xffff)
}

pub fn unpack_coord(key: u32) -> Vec2 {
    Vec2::new((key >> 16) as i32, (key & 0xffff) as i32)
}

#[derive(Clone, Debug, Default)]
pub struct Frontier {
    queue: VecDeque<Vec2>,
    members: HashSet<u32>,
}

impl Frontier {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, pos: Vec2) -> bool {
        if !self.members.insert(pack_coord(pos)) {
            return false;
        }
        self.queue.push_back(pos);
        true
    }

    pub fn pop(&mut self) -> Option<Vec2> {
        let pos = self.queue.pop_front()?;
        self.members.remove(&pack_coord(pos));
        Some(pos)
    }

    pub fn drain_batch(&mut self, count: usize) -> Vec<Vec2> {
        let mut batch = Vec::with_capacity(count.min(self.queue.len()));
        while batch.len() < count {
            match self.pop() {
                Some(pos) => batch.push(pos),
                None => break,
            }
        }
        batch
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.members.contains(&pack_coord(pos))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
        self.members.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vec2> {
        self.queue.iter()
    }
}
