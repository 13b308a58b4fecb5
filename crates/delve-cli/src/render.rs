//! Rasterize a [`Tilemap`] into an RGB image
//!
//! Each cell becomes a `tile_width`×`tile_width` square coloured by its wall
//! tile, or by its floor tile where the wall layer is empty.

use hashbrown::HashMap;

use delve_core::{EMPTY_TILE, Layer, Point, Tile, Tilemap};
use image::{Rgb, RgbImage};

/// Tile value to colour
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<Tile, Rgb<u8>>,
    /// Used for cells with no tile on either layer
    background: Rgb<u8>,
    /// Used for tiles with no entry
    fallback: Rgb<u8>,
}

impl Default for Palette {
    /// Floor tile 1 white, wall tile 2 black
    fn default() -> Self {
        let mut palette = Self::new(Rgb([0, 0, 0]), Rgb([128, 128, 128]));
        palette.insert(1, Rgb([255, 255, 255]));
        palette.insert(2, Rgb([0, 0, 0]));
        palette
    }
}

impl Palette {
    pub fn new(background: Rgb<u8>, fallback: Rgb<u8>) -> Self {
        Self {
            colors: HashMap::new(),
            background,
            fallback,
        }
    }

    pub fn insert(&mut self, tile: Tile, color: Rgb<u8>) {
        self.colors.insert(tile, color);
    }

    pub fn color(&self, tile: Tile) -> Rgb<u8> {
        if tile == EMPTY_TILE {
            return self.background;
        }
        self.colors.get(&tile).copied().unwrap_or(self.fallback)
    }

    /// Colour of a whole cell: wall over floor
    pub fn cell_color(&self, map: &Tilemap, p: Point) -> Rgb<u8> {
        match map.get(p, Layer::Wall) {
            EMPTY_TILE => self.color(map.get(p, Layer::Floor)),
            wall => self.color(wall),
        }
    }
}

/// Draw `map` with `palette`, one `tile_width` square per cell (at least one
/// pixel)
pub fn render(map: &Tilemap, palette: &Palette) -> RgbImage {
    let scale = map.tile_width().max(1);
    let width = map.width().max(0) as u32 * scale;
    let height = map.height().max(0) as u32 * scale;

    RgbImage::from_fn(width, height, |px, py| {
        let p = Point::new((px / scale) as i32, (py / scale) as i32);
        palette.cell_color(map, p)
    })
}
