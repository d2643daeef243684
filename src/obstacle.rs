use std::fs;
use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::constants::{COLOR_TOLERANCE, COLOR_TOLERANCE_MAX};
use crate::error::MapError;
use crate::types::Cell;

pub trait ObstacleSource {
    fn dimensions(&self) -> Option<(i32, i32)> {
        None
    }

    fn is_obstacle(&self, x: i32, y: i32) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct OpenField;

impl ObstacleSource for OpenField {
    fn is_obstacle(&self, _x: i32, _y: i32) -> bool {
        false
    }
}

#[derive(Clone, Debug)]
pub struct TileMap {
    width: i32,
    rows: Vec<Vec<bool>>,
}

impl TileMap {
    pub fn parse(text: &str) -> Result<Self, MapError> {
        let mut rows = Vec::new();
        for (y, line) in text.lines().enumerate() {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            let mut row = Vec::with_capacity(line.len());
            for (x, glyph) in line.chars().enumerate() {
                match glyph {
                    '#' => row.push(true),
                    '.' => row.push(false),
                    _ => {
                        return Err(MapError::UnknownTile {
                            glyph,
                            x: x as i32,
                            y: y as i32,
                        })
                    }
                }
            }
            rows.push(row);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as i32;
        if rows.is_empty() || width == 0 {
            return Err(MapError::Empty);
        }
        Ok(Self { width, rows })
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let text = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

impl ObstacleSource for TileMap {
    fn dimensions(&self) -> Option<(i32, i32)> {
        Some((self.width, self.rows.len() as i32))
    }

    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return true;
        }
        // short rows are padded with obstacles
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(true)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        )
    }

    pub fn close_to(self, other: Color, tolerance: f32) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelPalette {
    pub outside: Color,
    pub obstacle: Color,
    pub play: Color,
    pub tolerance: f32,
}

impl Default for LevelPalette {
    fn default() -> Self {
        Self {
            outside: Color::new(0.0, 0.0, 0.0),
            obstacle: Color::new(0.8, 0.0, 0.0),
            play: Color::new(0.0, 0.9, 0.9),
            tolerance: COLOR_TOLERANCE,
        }
    }
}

impl LevelPalette {
    // Anything unmatched blocks.
    pub fn classify(&self, color: Color) -> Cell {
        let tolerance = self.tolerance.clamp(0.0, COLOR_TOLERANCE_MAX);
        if color.close_to(self.outside, tolerance) || color.close_to(self.obstacle, tolerance) {
            return Cell::Obstacle;
        }
        if color.close_to(self.play, tolerance) {
            return Cell::Empty;
        }
        Cell::Obstacle
    }
}

#[derive(Clone, Debug)]
pub struct ImageLevel {
    width: i32,
    height: i32,
    pixels: Vec<[u8; 3]>,
    pub palette: LevelPalette,
    pub match_grid: bool,
}

impl ImageLevel {
    pub fn new(width: i32, height: i32, pixels: Vec<[u8; 3]>, palette: LevelPalette) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
            pixels,
            palette,
            match_grid: true,
        }
    }

    pub fn load(path: &Path, palette: LevelPalette) -> Result<Self, MapError> {
        let decoded = image::open(path)?;
        Self::from_rgb_image(&decoded.to_rgb8(), palette)
    }

    pub fn from_bytes(bytes: &[u8], palette: LevelPalette) -> Result<Self, MapError> {
        let decoded = image::load_from_memory(bytes)?;
        Self::from_rgb_image(&decoded.to_rgb8(), palette)
    }

    pub fn from_rgb_image(img: &RgbImage, palette: LevelPalette) -> Result<Self, MapError> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(MapError::Empty);
        }
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);
        let pixels = img.pixels().map(|px| px.0).collect();
        Ok(Self::new(width, height, pixels, palette))
    }

    fn pixel(&self, x: i32, y: i32) -> Option<[u8; 3]> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }
}

impl ObstacleSource for ImageLevel {
    fn dimensions(&self) -> Option<(i32, i32)> {
        self.match_grid.then_some((self.width, self.height))
    }

    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        match self.pixel(x, y) {
            Some(rgb) => self.palette.classify(Color::from_rgb8(rgb)) == Cell::Obstacle,
            None => true,
        }
    }
}
