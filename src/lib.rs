pub mod arena;
pub mod clock;
pub mod config;
pub mod constants;
pub mod control;
pub mod error;
pub mod frontier;
pub mod grid;
pub mod obstacle;
pub mod render;
pub mod rng;
pub mod simulation;
pub mod types;
