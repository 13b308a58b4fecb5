//! Walled rectangular rooms

use crate::geom::{Point, Rect};
use crate::tilemap::{EMPTY_TILE, Layer, Tile};

use super::room::{Doorway, Room, RoomPolicy, TileData, perimeter_doorways};

/// A rectangle of floor with a one-tile wall ring.
///
/// Every cell gets the floor tile; the outer ring also gets the wall tile on
/// the wall layer, and the interior has its wall layer explicitly cleared.
#[derive(Debug, Clone)]
pub struct RectRoom {
    width: i32,
    height: i32,
    floor_tile: Tile,
    data: TileData,
    policy: RoomPolicy,
}

impl RectRoom {
    pub fn new(width: i32, height: i32, floor_tile: Tile, wall_tile: Tile, policy: RoomPolicy) -> Self {
        let mut data = TileData::new();
        for x in 0..width {
            for y in 0..height {
                let p = Point::new(x, y);
                let ring = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                data.set(Layer::Floor, p, floor_tile);
                data.set(Layer::Wall, p, if ring { wall_tile } else { EMPTY_TILE });
            }
        }

        Self {
            width,
            height,
            floor_tile,
            data,
            policy,
        }
    }

    pub fn floor_tile(&self) -> Tile {
        self.floor_tile
    }
}

impl Room for RectRoom {
    fn policy(&self) -> &RoomPolicy {
        &self.policy
    }

    fn data(&self) -> &TileData {
        &self.data
    }

    fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    fn hallways(&self) -> Vec<Doorway> {
        perimeter_doorways(self.width, self.height, self.floor_tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_room_layers() {
        let room = RectRoom::new(5, 4, 1, 2, RoomPolicy::required());
        let data = room.data();

        for y in 0..4 {
            for x in 0..5 {
                let p = Point::new(x, y);
                assert_eq!(data.get(Layer::Floor, p), 1);
                let ring = x == 0 || y == 0 || x == 4 || y == 3;
                assert_eq!(data.get(Layer::Wall, p), if ring { 2 } else { 0 }, "{p:?}");
            }
        }
        // interior zeros are explicit so they clear the map when stamped
        assert!(data.contains(Layer::Wall, Point::new(2, 2)));
        assert_eq!(room.bounds(), Rect::from_size(5, 4));
    }

    #[test]
    fn test_rect_room_hallways_use_floor_tile() {
        let room = RectRoom::new(6, 6, 3, 2, RoomPolicy::optional());
        let doorways = room.hallways();
        assert_eq!(doorways.len(), 16);
        let patch = doorways[0].hallway.entrance_data();
        assert_eq!(patch.get(Layer::Floor, Point::ZERO), 3);
    }
}
