use rand::rngs::StdRng;
use rand::Rng as _;

pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    fn pick_index(&mut self, len: usize) -> usize;

    fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        let len = items.len();
        for i in 0..len {
            let j = i + self.pick_index(len - i);
            items.swap(i, j);
        }
    }
}

#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

impl RandomSource for Rng {
    fn next_f32(&mut self) -> f32 {
        // f64 -> f32 can round up to exactly 1.0
        (self.next_f64() as f32).min(1.0 - f32::EPSILON)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.next_f64() * len as f64) as usize).min(len - 1)
    }
}

impl RandomSource for StdRng {
    fn next_f32(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.random_range(0..len)
    }
}
