use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Player, Side::Enemy];

    pub fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Player => 2,
            Self::Enemy => 3,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Enemy => 1,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "player" => Some(Self::Player),
            "enemy" => Some(Self::Enemy),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Cell {
    #[default]
    Empty,
    Obstacle,
    Owned(Side),
}

impl Cell {
    pub fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Obstacle => 1,
            Self::Owned(side) => side.id(),
        }
    }

    pub fn is_owned_by(self, side: Side) -> bool {
        self == Self::Owned(side)
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Obstacle => '#',
            Self::Owned(Side::Player) => 'P',
            Self::Owned(Side::Enemy) => 'E',
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Grow,
    Shrink,
    #[default]
    Idle,
}

impl Mode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "grow" => Some(Self::Grow),
            "shrink" => Some(Self::Shrink),
            "idle" => Some(Self::Idle),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickOutcome {
    pub claimed: usize,
    pub captured: usize,
    pub released: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    pub ticks: u64,
    pub claimed: u64,
    pub captured: u64,
    pub released: u64,
}

impl SimulationStats {
    pub fn record(&mut self, outcome: TickOutcome) {
        self.ticks += 1;
        self.claimed += outcome.claimed as u64;
        self.captured += outcome.captured as u64;
        self.released += outcome.released as u64;
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SideView {
    pub side: Side,
    pub mode: Mode,
    pub seed: Vec2,
    pub cells: usize,
    #[serde(rename = "waveDepth")]
    pub wave_depth: usize,
    #[serde(rename = "frontierSize")]
    pub frontier_size: usize,
    pub stats: SimulationStats,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArenaSnapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub width: i32,
    pub height: i32,
    #[serde(rename = "emptyCells")]
    pub empty_cells: usize,
    #[serde(rename = "obstacleCells")]
    pub obstacle_cells: usize,
    pub sides: Vec<SideView>,
}

impl ArenaSnapshot {
    pub fn side(&self, side: Side) -> Option<&SideView> {
        self.sides.iter().find(|view| view.side == side)
    }
}
