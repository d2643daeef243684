use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid dimensions {width}x{height} are outside 1..={max}")]
    InvalidDimensions { width: i32, height: i32, max: i32 },
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("map has no rows")]
    Empty,
    #[error("unknown tile {glyph:?} at ({x},{y})")]
    UnknownTile { glyph: char, x: i32, y: i32 },
    #[error("failed to decode level image: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
