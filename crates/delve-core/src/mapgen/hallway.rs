//! Hallways joining rooms to the maze

use core::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Point;
use crate::tilemap::{EMPTY_TILE, Layer, Tile};

use super::room::TileData;

/// Direction a hallway leaves its room
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Orientation {
    North,
    South,
    East,
    West,
}

impl Orientation {
    /// Unit step taken when walking away from the room
    pub const fn step(self) -> Point {
        match self {
            Orientation::North => Point::new(0, -1),
            Orientation::South => Point::new(0, 1),
            Orientation::East => Point::new(1, 0),
            Orientation::West => Point::new(-1, 0),
        }
    }
}

/// Corridor between a room and the maze, with patches for both ends.
///
/// Patch coordinates are centered on the origin; the entrance patch is
/// stamped at the room end and the exit patch at the maze end.
pub trait Hallway: fmt::Debug + Send + Sync {
    fn entrance_data(&self) -> &TileData;

    fn exit_data(&self) -> &TileData;

    /// Corridor width in tiles
    fn width(&self) -> i32;

    fn orientation(&self) -> Orientation;
}

/// Hallway whose ends are square floor patches with the wall layer cleared
#[derive(Debug, Clone, PartialEq)]
pub struct BasicHallway {
    door_width: i32,
    hall_width: i32,
    tile: Tile,
    orientation: Orientation,
    entrance: TileData,
    exit: TileData,
}

impl BasicHallway {
    pub fn new(door_width: i32, hall_width: i32, tile: Tile, orientation: Orientation) -> Self {
        let mut patch = TileData::new();
        let half = door_width / 2;
        for x in -half..=half {
            for y in -half..=half {
                let p = Point::new(x, y);
                patch.set(Layer::Floor, p, tile);
                patch.set(Layer::Wall, p, EMPTY_TILE);
            }
        }

        Self {
            door_width,
            hall_width,
            tile,
            orientation,
            entrance: patch.clone(),
            exit: patch,
        }
    }

    pub fn door_width(&self) -> i32 {
        self.door_width
    }

    pub fn tile(&self) -> Tile {
        self.tile
    }
}

impl Hallway for BasicHallway {
    fn entrance_data(&self) -> &TileData {
        &self.entrance
    }

    fn exit_data(&self) -> &TileData {
        &self.exit
    }

    fn width(&self) -> i32 {
        self.hall_width
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}
