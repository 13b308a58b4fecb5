//! Maze algorithms that fill the space between rooms

use core::fmt;

use crate::geom::Point;
use crate::rng::MapRng;
use crate::tilemap::Tilemap;

/// Carves corridors into a map around the placed rooms.
///
/// A path should normally be a perfect maze so that every carved cell can
/// reach every other.
pub trait Path: fmt::Debug + Send {
    /// Carve the map and return every cell that was cleared. The generator
    /// uses these cells to recognise where a hallway has reached the maze.
    fn flood(&mut self, map: &mut Tilemap, rng: &mut MapRng) -> Vec<Point>;

    /// Clean up the map once rooms and hallways are in place
    fn post_process(&mut self, map: &mut Tilemap, rng: &mut MapRng);
}
