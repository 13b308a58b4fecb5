//! Block backtracker maze
//!
//! Randomized depth-first carve over `k`×`k` blocks of the wall layer, followed
//! by dead-end trimming and corner smoothing once hallways are attached.

use crate::geom::Point;
use crate::rng::MapRng;
use crate::tilemap::{EMPTY_TILE, Layer, Tile, Tilemap};

use super::path::Path;

/// Recursive-backtracker maze carved at block granularity.
///
/// A block may only be carved while it still has exactly three fully walled
/// neighbors, so corridors never merge and the result is a tree.
#[derive(Debug, Clone)]
pub struct BlockBacktracker {
    /// Edge length of a maze block (corridor thickness)
    block: i32,
    floor_tile: Tile,
    wall_tile: Tile,
    /// Every carved block, recorded when the walk backs out of it
    dead_ends: Vec<Point>,
    /// Every cell cleared on the wall layer by the last flood
    carved: Vec<Point>,
}

impl BlockBacktracker {
    /// # Panics
    /// Panics if `block_width < 1`.
    pub fn new(block_width: i32, floor_tile: Tile, wall_tile: Tile) -> Self {
        assert!(block_width >= 1, "block width must be at least 1, got {block_width}");
        Self {
            block: block_width,
            floor_tile,
            wall_tile,
            dead_ends: Vec::new(),
            carved: Vec::new(),
        }
    }

    pub fn block_width(&self) -> i32 {
        self.block
    }

    /// Block origins visited by the last flood
    pub fn dead_ends(&self) -> &[Point] {
        &self.dead_ends
    }

    /// Cells cleared by the last flood
    pub fn carved(&self) -> &[Point] {
        &self.carved
    }

    fn is_solid(&self, map: &Tilemap, p: Point) -> bool {
        map.contains_all(self.wall_tile, p, Layer::Wall, self.block)
    }

    /// Uniformly chosen aligned block that is still solid wall
    fn start_block(&self, map: &Tilemap, rng: &mut MapRng) -> Option<Point> {
        let k = self.block;
        let candidates: Vec<Point> = (0..map.height() / k)
            .flat_map(|by| (0..map.width() / k).map(move |bx| Point::new(bx * k, by * k)))
            .filter(|&p| self.is_solid(map, p))
            .collect();
        rng.choose(&candidates).copied()
    }

    /// Solid neighbors of `p` that are themselves surrounded by exactly three
    /// solid blocks, i.e. touching the carved maze only through `p`
    fn valid_neighbors(&self, map: &Tilemap, p: Point) -> Vec<Point> {
        map.neighbors(p, self.block)
            .into_iter()
            .filter(|&n| self.is_solid(map, n))
            .filter(|&n| {
                map.neighbors(n, self.block)
                    .into_iter()
                    .filter(|&nn| self.is_solid(map, nn))
                    .count()
                    == 3
            })
            .collect()
    }

    /// Refill carved blocks with at most one open neighbor until nothing
    /// changes. Returns how many blocks were refilled.
    fn trim_dead_ends(&self, map: &mut Tilemap) -> usize {
        let k = self.block;
        let mut trimmed = 0;

        loop {
            let mut changed = false;

            'blocks: for &p in &self.dead_ends {
                if !map.is_clear(p, Layer::Wall, k) {
                    continue;
                }

                let mut open = 0;
                for n in map.neighbors(p, k) {
                    if map.contains_any(EMPTY_TILE, n, Layer::Wall, k) {
                        open += 1;
                        if open > 1 {
                            // junction
                            continue 'blocks;
                        }
                    }
                }

                map.fill(self.wall_tile, p, Layer::Wall, k);
                trimmed += 1;
                changed = true;
            }

            if !changed {
                return trimmed;
            }
        }
    }

    /// Single-tile pass: refill carved cells with fewer than three open
    /// neighbors and open wall cells bordering more than one open cell.
    /// All decisions are taken against the map as it was before the pass.
    fn smooth_corners(&self, map: &mut Tilemap) -> (usize, usize) {
        let mut fill = Vec::new();
        let mut clear = Vec::new();

        for &p in &self.carved {
            let mut open = 0;
            for n in map.neighbors(p, 1) {
                if map.is_clear(n, Layer::Wall, 1) {
                    open += 1;
                    continue;
                }

                let around = map
                    .neighbors(n, 1)
                    .into_iter()
                    .filter(|&nn| map.is_clear(nn, Layer::Wall, 1))
                    .count();
                if around > 1 {
                    clear.push(n);
                }
            }

            if open < 3 {
                fill.push(p);
            }
        }

        for &p in &fill {
            map.fill(self.wall_tile, p, Layer::Wall, 1);
        }
        for &p in &clear {
            map.fill(EMPTY_TILE, p, Layer::Wall, 1);
        }

        (fill.len(), clear.len())
    }
}

impl Path for BlockBacktracker {
    fn flood(&mut self, map: &mut Tilemap, rng: &mut MapRng) -> Vec<Point> {
        self.dead_ends.clear();
        self.carved.clear();

        let Some(start) = self.start_block(map, rng) else {
            log::warn!("no solid {0}x{0} block left to start the maze from", self.block);
            return Vec::new();
        };

        let mut stack = vec![start];
        while let Some(&cur) = stack.last() {
            map.fill(self.floor_tile, cur, Layer::Floor, self.block);
            let cleared = map.fill(EMPTY_TILE, cur, Layer::Wall, self.block);

            let neighbors = self.valid_neighbors(map, cur);
            match rng.choose(&neighbors) {
                Some(&next) => stack.push(next),
                None => {
                    self.dead_ends.push(cur);
                    self.carved.extend(cleared);
                    stack.pop();
                }
            }
        }

        log::debug!(
            "maze carved {} blocks ({} cells) from {:?}",
            self.dead_ends.len(),
            self.carved.len(),
            start
        );
        self.carved.clone()
    }

    fn post_process(&mut self, map: &mut Tilemap, _rng: &mut MapRng) {
        let trimmed = self.trim_dead_ends(map);
        let (filled, cleared) = self.smooth_corners(map);
        log::debug!("trimmed {trimmed} dead-end blocks, smoothing filled {filled} and cleared {cleared} cells");
    }
}
