//! Room interface, placement policy and sparse tile data

use core::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect};
use crate::tilemap::{EMPTY_TILE, Layer, Tile, Tilemap};

use super::hallway::{BasicHallway, Hallway, Orientation};

/// Sparse two-layer tile patch in local coordinates.
///
/// Points never written read back as tile 0. Explicitly written zeros are
/// kept, so stamping a patch onto a map can clear cells as well as set them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileData {
    layers: [HashMap<Point, Tile>; 2],
}

impl TileData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, layer: Layer, p: Point, tile: Tile) {
        self.layers[layer.index()].insert(p, tile);
    }

    /// Tile at `p`, 0 if never written
    pub fn get(&self, layer: Layer, p: Point) -> Tile {
        self.layers[layer.index()]
            .get(&p)
            .copied()
            .unwrap_or(EMPTY_TILE)
    }

    /// True if `p` was explicitly written on `layer`
    pub fn contains(&self, layer: Layer, p: Point) -> bool {
        self.layers[layer.index()].contains_key(&p)
    }

    /// Every written entry of one layer, in no particular order
    pub fn iter(&self, layer: Layer) -> impl Iterator<Item = (Point, Tile)> + '_ {
        self.layers[layer.index()].iter().map(|(&p, &t)| (p, t))
    }

    /// Number of written entries on `layer`
    pub fn len(&self, layer: Layer) -> usize {
        self.layers[layer.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(HashMap::is_empty)
    }

    /// Copy every written entry onto `map`, offset by `origin`.
    /// Cells that fall off the map are skipped.
    pub fn stamp(&self, map: &mut Tilemap, origin: Point) {
        for layer in [Layer::Floor, Layer::Wall] {
            for (p, tile) in self.iter(layer) {
                map.set(p + origin, layer, tile);
            }
        }
    }
}

/// Center of a room expressed as a fraction of the map size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomAlignment {
    pub x: f64,
    pub y: f64,
}

impl RoomAlignment {
    pub const CENTER: RoomAlignment = RoomAlignment { x: 0.5, y: 0.5 };
    pub const TOP_LEFT: RoomAlignment = RoomAlignment { x: 0.25, y: 0.25 };
    pub const TOP_RIGHT: RoomAlignment = RoomAlignment { x: 0.75, y: 0.25 };
    pub const BOTTOM_LEFT: RoomAlignment = RoomAlignment { x: 0.25, y: 0.75 };
    pub const BOTTOM_RIGHT: RoomAlignment = RoomAlignment { x: 0.75, y: 0.75 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the generator is allowed to place a room
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomPolicy {
    /// Generation fails if the room cannot be placed
    pub required: bool,
    /// May intersect other rooms that also allow overlap
    pub can_overlap: bool,
    /// Pin the room's center instead of placing it randomly
    pub alignment: Option<RoomAlignment>,
}

impl RoomPolicy {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn optional() -> Self {
        Self::default()
    }

    pub fn aligned(mut self, alignment: RoomAlignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn overlapping(mut self) -> Self {
        self.can_overlap = true;
        self
    }
}

/// A candidate hallway attachment on a room's perimeter
#[derive(Debug)]
pub struct Doorway {
    /// Local perimeter point the hallway starts from
    pub at: Point,
    pub hallway: Box<dyn Hallway>,
}

/// A placeable region of the generated map.
///
/// Rooms are built once and only read by the generator.
pub trait Room: fmt::Debug + Send + Sync {
    fn policy(&self) -> &RoomPolicy;

    /// Local tile data for both layers
    fn data(&self) -> &TileData;

    /// Local bounding box, anchored at the origin
    fn bounds(&self) -> Rect;

    /// Hallway attachment candidates, in a fixed order
    fn hallways(&self) -> Vec<Doorway>;
}

/// Door width and corridor width used by the stock rooms
pub const DOOR_WIDTH: i32 = 3;
pub const HALL_WIDTH: i32 = 1;

/// One [`BasicHallway`] for every non-corner perimeter point of a
/// `width`×`height` box: north and south edges first (by x), then west and
/// east edges (by y).
pub fn perimeter_doorways(width: i32, height: i32, tile: Tile) -> Vec<Doorway> {
    let mut doorways = Vec::with_capacity((2 * (width + height)).max(0) as usize);
    let mut push = |at: Point, orientation: Orientation| {
        doorways.push(Doorway {
            at,
            hallway: Box::new(BasicHallway::new(DOOR_WIDTH, HALL_WIDTH, tile, orientation)),
        });
    };

    for x in 1..width - 1 {
        push(Point::new(x, 0), Orientation::North);
        push(Point::new(x, height - 1), Orientation::South);
    }
    for y in 1..height - 1 {
        push(Point::new(0, y), Orientation::West);
        push(Point::new(width - 1, y), Orientation::East);
    }

    doorways
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_data_defaults_to_empty() {
        let mut data = TileData::new();
        data.set(Layer::Floor, Point::new(1, 1), 4);
        data.set(Layer::Wall, Point::new(1, 1), EMPTY_TILE);

        assert_eq!(data.get(Layer::Floor, Point::new(1, 1)), 4);
        assert_eq!(data.get(Layer::Floor, Point::new(2, 2)), EMPTY_TILE);
        assert!(data.contains(Layer::Wall, Point::new(1, 1)));
        assert!(!data.contains(Layer::Wall, Point::new(2, 2)));
        assert_eq!(data.len(Layer::Wall), 1);
    }

    #[test]
    fn test_stamp_writes_explicit_zeros_and_clips() {
        let mut map = Tilemap::filled(4, 4, 1, 1, 2);
        let mut data = TileData::new();
        data.set(Layer::Wall, Point::new(0, 0), EMPTY_TILE);
        data.set(Layer::Floor, Point::new(0, 0), 9);
        data.set(Layer::Floor, Point::new(5, 5), 9);

        data.stamp(&mut map, Point::new(1, 1));

        assert_eq!(map.get(Point::new(1, 1), Layer::Wall), EMPTY_TILE);
        assert_eq!(map.get(Point::new(1, 1), Layer::Floor), 9);
        assert_eq!(map.get(Point::new(0, 0), Layer::Wall), 2);
    }

    #[test]
    fn test_perimeter_doorways_skip_corners() {
        let doorways = perimeter_doorways(5, 4, 1);
        // (5-2)*2 + (4-2)*2
        assert_eq!(doorways.len(), 10);
        for d in &doorways {
            let corner = (d.at.x == 0 || d.at.x == 4) && (d.at.y == 0 || d.at.y == 3);
            assert!(!corner, "corner doorway at {:?}", d.at);
            let expected = match (d.at.x, d.at.y) {
                (_, 0) => Orientation::North,
                (_, 3) => Orientation::South,
                (0, _) => Orientation::West,
                _ => Orientation::East,
            };
            assert_eq!(d.hallway.orientation(), expected);
        }
    }

    #[test]
    fn test_policy_builders() {
        let p = RoomPolicy::required().aligned(RoomAlignment::CENTER).overlapping();
        assert!(p.required);
        assert!(p.can_overlap);
        assert_eq!(p.alignment, Some(RoomAlignment::CENTER));
        assert!(!RoomPolicy::optional().required);
    }
}
