//! Two-layer tile grid
//!
//! Every cell carries one tile value on the floor layer and one on the wall
//! layer. Tile 0 means "nothing here" on either layer. Block operations take a
//! `size` and act on the `size`×`size` cells anchored at the given point.

use core::fmt;
use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Point;
use crate::rng::MapRng;

/// Tile value stored in a cell
pub type Tile = u32;

/// The "unset" tile value
pub const EMPTY_TILE: Tile = 0;

/// Tile plane of a cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Layer {
    Floor = 0,
    Wall = 1,
}

impl Layer {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Called by the presentation layer when something overlaps a tile.
/// Generation never invokes it.
pub type OverlapEvent = Arc<dyn Fn(bool, Tile) + Send + Sync>;

/// Unit offsets of the four cardinal neighbors: north, east, south, west
pub const CARDINALS: [Point; 4] = [
    Point::new(0, -1),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(-1, 0),
];

/// Generated map: two same-shaped layers plus presentation metadata
#[derive(Clone)]
pub struct Tilemap {
    width: i32,
    height: i32,
    /// Cell size in pixels, only meaningful to renderers
    tile_width: u32,
    /// Row-major cells, one vector per layer
    layers: [Vec<Tile>; 2],
    /// Tile value to image key
    mapper: HashMap<Tile, String>,
    overlap_event: Option<OverlapEvent>,
    /// Tile value to every cell holding it, built after generation
    cache: OnceLock<HashMap<Tile, Vec<Point>>>,
}

impl fmt::Debug for Tilemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tilemap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_width", &self.tile_width)
            .field("mapper", &self.mapper)
            .field("overlap_event", &self.overlap_event.is_some())
            .field("cached", &self.cache.get().is_some())
            .finish()
    }
}

impl Tilemap {
    /// Create an empty map (every cell tile 0 on both layers)
    pub fn new(width: i32, height: i32, tile_width: u32) -> Self {
        Self::filled(width, height, tile_width, EMPTY_TILE, EMPTY_TILE)
    }

    /// Create a map with every cell set to `floor` / `wall`
    pub fn filled(width: i32, height: i32, tile_width: u32, floor: Tile, wall: Tile) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = (width * height) as usize;
        Self {
            width,
            height,
            tile_width,
            layers: [vec![floor; len], vec![wall; len]],
            mapper: HashMap::new(),
            overlap_event: None,
            cache: OnceLock::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn mapper(&self) -> &HashMap<Tile, String> {
        &self.mapper
    }

    pub fn set_mapper(&mut self, mapper: HashMap<Tile, String>) {
        self.mapper = mapper;
    }

    pub fn overlap_event(&self) -> Option<&OverlapEvent> {
        self.overlap_event.as_ref()
    }

    pub fn set_overlap_event(&mut self, event: Option<OverlapEvent>) {
        self.overlap_event = event;
    }

    /// Raw row-major cells of one layer
    pub fn layer(&self, layer: Layer) -> &[Tile] {
        &self.layers[layer.index()]
    }

    fn index_of(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        Some((p.y * self.width + p.x) as usize)
    }

    /// Tile at `p`, or 0 when `p` is off the map
    pub fn get(&self, p: Point, layer: Layer) -> Tile {
        self.index_of(p)
            .map_or(EMPTY_TILE, |i| self.layers[layer.index()][i])
    }

    /// Write a single cell. Returns false (and writes nothing) off the map.
    pub fn set(&mut self, p: Point, layer: Layer, tile: Tile) -> bool {
        match self.index_of(p) {
            Some(i) => {
                self.layers[layer.index()][i] = tile;
                self.invalidate_cache();
                true
            }
            None => false,
        }
    }

    /// True if the whole `size`×`size` block at `p` lies on the map.
    ///
    /// # Panics
    /// Panics if `size < 1`.
    pub fn in_bounds(&self, p: Point, size: i32) -> bool {
        assert!(size >= 1, "block size must be at least 1, got {size}");
        p.x >= 0 && p.y >= 0 && p.x + size <= self.width && p.y + size <= self.height
    }

    fn block(p: Point, size: i32) -> impl Iterator<Item = Point> {
        (0..size).flat_map(move |dy| (0..size).map(move |dx| Point::new(p.x + dx, p.y + dy)))
    }

    /// True if every cell of the block holds `tile` on `layer`.
    /// Blocks that leave the map never match.
    pub fn contains_all(&self, tile: Tile, p: Point, layer: Layer, size: i32) -> bool {
        if !self.in_bounds(p, size) {
            return false;
        }
        Self::block(p, size).all(|q| self.get(q, layer) == tile)
    }

    /// True if any on-map cell of the block holds `tile` on `layer`
    pub fn contains_any(&self, tile: Tile, p: Point, layer: Layer, size: i32) -> bool {
        assert!(size >= 1, "block size must be at least 1, got {size}");
        Self::block(p, size).any(|q| self.index_of(q).is_some() && self.get(q, layer) == tile)
    }

    /// True if the block is entirely empty on `layer`
    pub fn is_clear(&self, p: Point, layer: Layer, size: i32) -> bool {
        self.contains_all(EMPTY_TILE, p, layer, size)
    }

    /// Write `tile` over the block; returns the on-map cells that were written
    pub fn fill(&mut self, tile: Tile, p: Point, layer: Layer, size: i32) -> Vec<Point> {
        assert!(size >= 1, "block size must be at least 1, got {size}");
        let mut written = Vec::with_capacity((size * size) as usize);
        for q in Self::block(p, size) {
            if let Some(i) = self.index_of(q) {
                self.layers[layer.index()][i] = tile;
                written.push(q);
            }
        }
        if !written.is_empty() {
            self.invalidate_cache();
        }
        written
    }

    /// The up-to-four blocks one step of `size` away from `p` in each cardinal
    /// direction, keeping only blocks that lie fully on the map.
    ///
    /// # Panics
    /// Panics if `size < 1`.
    pub fn neighbors(&self, p: Point, size: i32) -> Vec<Point> {
        assert!(size >= 1, "block size must be at least 1, got {size}");
        CARDINALS
            .iter()
            .map(|&d| p + d * size)
            .filter(|&n| self.in_bounds(n, size))
            .collect()
    }

    fn invalidate_cache(&mut self) {
        if self.cache.get().is_some() {
            self.cache = OnceLock::new();
        }
    }

    fn cache(&self) -> &HashMap<Tile, Vec<Point>> {
        self.cache.get_or_init(|| {
            let mut cache: HashMap<Tile, Vec<Point>> = HashMap::new();
            for y in 0..self.height {
                for x in 0..self.width {
                    let p = Point::new(x, y);
                    let floor = self.get(p, Layer::Floor);
                    let wall = self.get(p, Layer::Wall);
                    cache.entry(floor).or_default().push(p);
                    if wall != floor {
                        cache.entry(wall).or_default().push(p);
                    }
                }
            }
            cache
        })
    }

    /// Index every cell by tile value so that [`Tilemap::random_pos`] is cheap
    pub fn build_cache(&self) {
        let cache = self.cache();
        log::debug!("tile cache built for {} distinct tiles", cache.len());
    }

    /// Uniformly chosen cell holding `tile` on at least one layer
    pub fn random_pos(&self, tile: Tile, rng: &mut MapRng) -> Option<Point> {
        self.cache()
            .get(&tile)
            .and_then(|points| rng.choose(points))
            .copied()
    }

    /// Number of cells holding `tile` on at least one layer
    pub fn count(&self, tile: Tile) -> usize {
        self.cache().get(&tile).map_or(0, Vec::len)
    }
}

/// ASCII view: `#` where the wall layer is set, `.` for bare floor, space otherwise
impl fmt::Display for Tilemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let p = Point::new(x, y);
                let glyph = if self.get(p, Layer::Wall) != EMPTY_TILE {
                    '#'
                } else if self.get(p, Layer::Floor) != EMPTY_TILE {
                    '.'
                } else {
                    ' '
                };
                write!(f, "{glyph}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Tilemap {
        // 6x6, floor 1 everywhere, wall 2 except a clear 2x2 at (2,2)
        let mut map = Tilemap::filled(6, 6, 16, 1, 2);
        map.fill(EMPTY_TILE, Point::new(2, 2), Layer::Wall, 2);
        map
    }

    #[test]
    fn test_get_out_of_bounds_is_empty() {
        let map = sample();
        assert_eq!(map.get(Point::new(0, 0), Layer::Floor), 1);
        assert_eq!(map.get(Point::new(-1, 0), Layer::Floor), EMPTY_TILE);
        assert_eq!(map.get(Point::new(0, 6), Layer::Wall), EMPTY_TILE);
    }

    #[test]
    fn test_set_reports_writes() {
        let mut map = sample();
        assert!(map.set(Point::new(5, 5), Layer::Floor, 9));
        assert_eq!(map.get(Point::new(5, 5), Layer::Floor), 9);
        assert!(!map.set(Point::new(6, 5), Layer::Floor, 9));
    }

    #[test]
    fn test_in_bounds_blocks() {
        let map = sample();
        assert!(map.in_bounds(Point::new(4, 4), 2));
        assert!(!map.in_bounds(Point::new(5, 4), 2));
        assert!(!map.in_bounds(Point::new(-1, 0), 1));
    }

    #[test]
    fn test_block_queries() {
        let map = sample();
        assert!(map.is_clear(Point::new(2, 2), Layer::Wall, 2));
        assert!(!map.is_clear(Point::new(1, 1), Layer::Wall, 2));
        assert!(map.contains_any(EMPTY_TILE, Point::new(1, 1), Layer::Wall, 2));
        assert!(map.contains_all(2, Point::new(0, 0), Layer::Wall, 2));
        assert!(!map.contains_all(2, Point::new(5, 5), Layer::Wall, 2));
    }

    #[test]
    fn test_fill_clips_to_map() {
        let mut map = sample();
        let written = map.fill(7, Point::new(5, 5), Layer::Floor, 2);
        assert_eq!(written, vec![Point::new(5, 5)]);
    }

    #[test]
    fn test_neighbors_are_scaled_and_clipped() {
        let map = sample();
        let ns = map.neighbors(Point::new(2, 2), 2);
        assert_eq!(ns.len(), 4);
        assert!(ns.contains(&Point::new(2, 0)));
        assert!(ns.contains(&Point::new(4, 2)));

        let corner = map.neighbors(Point::new(0, 0), 2);
        assert_eq!(corner, vec![Point::new(2, 0), Point::new(0, 2)]);
    }

    #[test]
    #[should_panic(expected = "block size must be at least 1")]
    fn test_neighbors_rejects_zero_size() {
        sample().neighbors(Point::new(2, 2), 0);
    }

    #[test]
    #[should_panic(expected = "block size must be at least 1")]
    fn test_in_bounds_rejects_negative_size() {
        sample().in_bounds(Point::new(2, 2), -1);
    }

    #[test]
    fn test_random_pos_finds_tile() {
        let map = sample();
        map.build_cache();
        let mut rng = MapRng::new(11);
        for _ in 0..50 {
            let p = map.random_pos(EMPTY_TILE, &mut rng).unwrap();
            assert_eq!(map.get(p, Layer::Wall), EMPTY_TILE);
        }
        assert_eq!(map.count(EMPTY_TILE), 4);
        assert_eq!(map.random_pos(42, &mut rng), None);
    }

    #[test]
    fn test_cache_tracks_mutation() {
        let mut map = sample();
        map.build_cache();
        assert_eq!(map.count(5), 0);
        map.set(Point::new(0, 0), Layer::Wall, 5);
        assert_eq!(map.count(5), 1);
        let mut rng = MapRng::new(1);
        assert_eq!(map.random_pos(5, &mut rng), Some(Point::new(0, 0)));
    }

    #[test]
    fn test_display_glyphs() {
        let mut map = Tilemap::new(3, 1, 1);
        map.set(Point::new(0, 0), Layer::Wall, 2);
        map.set(Point::new(1, 0), Layer::Floor, 1);
        assert_eq!(map.to_string(), "#. \n");
    }

    proptest! {
        #[test]
        fn fill_then_contains_all(x in 0i32..8, y in 0i32..8, size in 1i32..4, tile in 1u32..10) {
            let mut map = Tilemap::new(10, 10, 1);
            let p = Point::new(x, y);
            let written = map.fill(tile, p, Layer::Wall, size);
            prop_assert!(written.len() as i32 <= size * size);
            prop_assert_eq!(map.contains_all(tile, p, Layer::Wall, size), map.in_bounds(p, size));
            for q in written {
                prop_assert_eq!(map.get(q, Layer::Wall), tile);
            }
        }

        #[test]
        fn neighbors_stay_on_map(x in 0i32..10, y in 0i32..10, size in 1i32..4) {
            let map = Tilemap::new(10, 10, 1);
            for n in map.neighbors(Point::new(x, y), size) {
                prop_assert!(map.in_bounds(n, size));
                let d = n - Point::new(x, y);
                prop_assert_eq!(d.x.abs() + d.y.abs(), size);
            }
        }
    }
}
