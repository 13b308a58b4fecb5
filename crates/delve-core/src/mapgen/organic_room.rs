//! Irregular rooms grown by random accretion
//!
//! A scattered ellipse of seed cells is grown outward by repeatedly picking a
//! cell from a working list and adding its neighbors. Picks favour either the
//! newest cells (lateral growth) or the older half of the list (filling in),
//! which gives cave-like, slightly porous blobs.

use crate::geom::{Point, Rect};
use crate::rng::MapRng;
use crate::tilemap::{EMPTY_TILE, Layer, Tile};

use super::room::{Doorway, Room, RoomPolicy, TileData, perimeter_doorways};

/// Accretion steps per seed cell
const GROWTH_FACTOR: usize = 7;

/// How many of the newest cells count as "recent"
const RECENT_WINDOW: usize = 15;

/// One in this many steps also reaches diagonals and two-away cells
const WIDE_STEP_CHANCE: u32 = 20;

const NEAR_OFFSETS: [Point; 4] = [
    Point::new(-1, 0),
    Point::new(1, 0),
    Point::new(0, 1),
    Point::new(0, -1),
];

const FAR_OFFSETS: [Point; 8] = [
    Point::new(-2, 0),
    Point::new(2, 0),
    Point::new(0, 2),
    Point::new(0, -2),
    Point::new(1, 1),
    Point::new(1, -1),
    Point::new(-1, 1),
    Point::new(-1, -1),
];

/// Organic, cave-like room. No wall ring is drawn: the grown cells get the
/// floor tile with their wall layer cleared, everything else is left to the
/// map's fill.
#[derive(Debug, Clone)]
pub struct OrganicRoom {
    width: i32,
    height: i32,
    floor_tile: Tile,
    data: TileData,
    policy: RoomPolicy,
}

/// Running min/max of every cell produced so far (inclusive)
struct Extent {
    min: Point,
    max: Point,
}

impl Extent {
    fn new(p: Point) -> Self {
        Self { min: p, max: p }
    }

    fn include(&mut self, p: Point) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }
}

impl OrganicRoom {
    /// Grow a room inside a nominal `width`×`height` footprint. The final
    /// size depends on how the growth went; see [`Room::bounds`].
    pub fn new(width: i32, height: i32, floor_tile: Tile, policy: RoomPolicy, rng: &mut MapRng) -> Self {
        let mut working = seed_cells(width, height, rng);
        let mut cells = working.clone();

        let mut extent = Extent::new(working[0]);
        for &p in &working {
            extent.include(p);
        }

        rng.shuffle(&mut working);

        let steps = working.len() * GROWTH_FACTOR;
        for _ in 0..steps {
            let i = pick_index(working.len(), rng);
            let origin = working[i];

            let far: &[Point] = if rng.one_in(WIDE_STEP_CHANCE) { &FAR_OFFSETS } else { &[] };
            for &offset in NEAR_OFFSETS.iter().chain(far) {
                let p = origin + offset;
                extent.include(p);
                cells.push(p);
                working.push(p);
            }

            working.swap_remove(i);
        }

        // leave a one-tile margin on every side
        let shift = Point::new(1, 1) - extent.min;
        let mut data = TileData::new();
        for p in cells {
            let p = p + shift;
            data.set(Layer::Floor, p, floor_tile);
            data.set(Layer::Wall, p, EMPTY_TILE);
        }

        let width = extent.max.x - extent.min.x + 1 + 2;
        let height = extent.max.y - extent.min.y + 1 + 2;
        log::trace!(
            "organic room grown to {width}x{height} ({} cells)",
            data.len(Layer::Floor)
        );

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

/// Cells of the inscribed ellipse, each kept with probability 2/3.
/// Never empty: a footprint too thin for an ellipse falls back to its center.
fn seed_cells(width: i32, height: i32, rng: &mut MapRng) -> Vec<Point> {
    let rx = width / 2;
    let ry = height / 2;
    let mut cells = Vec::new();

    if rx > 0 && ry > 0 {
        let (rx2, ry2) = (f64::from(rx * rx), f64::from(ry * ry));
        for x in 0..width {
            for y in 0..height {
                let ex = f64::from((x - rx) * (x - rx)) / rx2;
                let ey = f64::from((y - ry) * (y - ry)) / ry2;
                if ex + ey <= 1.0 && !rng.one_in(3) {
                    cells.push(Point::new(x, y));
                }
            }
        }
    }

    if cells.is_empty() {
        cells.push(Point::new(rx, ry));
    }
    cells
}

/// One in three picks come from the newest cells, the rest from the older half
fn pick_index(len: usize, rng: &mut MapRng) -> usize {
    if rng.one_in(3) {
        let recent = len.min(RECENT_WINDOW);
        len - recent + rng.index(recent)
    } else if len == 1 {
        0
    } else {
        rng.index(len / 2)
    }
}

impl Room for OrganicRoom {
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

    fn floor_points(room: &OrganicRoom) -> Vec<Point> {
        room.data().iter(Layer::Floor).map(|(p, _)| p).collect()
    }

    #[test]
    fn test_cells_fit_inside_margin() {
        let mut rng = MapRng::new(42);
        let room = OrganicRoom::new(16, 12, 1, RoomPolicy::required(), &mut rng);
        let b = room.bounds();
        let pts = floor_points(&room);
        assert!(!pts.is_empty());

        for p in &pts {
            assert!(p.x >= 1 && p.x <= b.width() - 2, "{p:?} outside {b:?}");
            assert!(p.y >= 1 && p.y <= b.height() - 2, "{p:?} outside {b:?}");
        }
        // the extent is tight: some cell touches each margin
        assert!(pts.iter().any(|p| p.x == 1));
        assert!(pts.iter().any(|p| p.y == 1));
        assert!(pts.iter().any(|p| p.x == b.width() - 2));
        assert!(pts.iter().any(|p| p.y == b.height() - 2));
    }

    #[test]
    fn test_wall_layer_cleared_under_floor() {
        let mut rng = MapRng::new(5);
        let room = OrganicRoom::new(12, 12, 4, RoomPolicy::optional(), &mut rng);
        let data = room.data();
        assert_eq!(data.len(Layer::Floor), data.len(Layer::Wall));
        for (p, tile) in data.iter(Layer::Floor) {
            assert_eq!(tile, 4);
            assert!(data.contains(Layer::Wall, p));
            assert_eq!(data.get(Layer::Wall, p), EMPTY_TILE);
        }
    }

    #[test]
    fn test_same_seed_same_room() {
        let a = OrganicRoom::new(18, 18, 1, RoomPolicy::required(), &mut MapRng::new(9));
        let b = OrganicRoom::new(18, 18, 1, RoomPolicy::required(), &mut MapRng::new(9));
        assert_eq!(a.bounds(), b.bounds());
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn test_thin_footprint_still_grows() {
        let mut rng = MapRng::new(1);
        let room = OrganicRoom::new(1, 1, 1, RoomPolicy::optional(), &mut rng);
        assert!(room.data().len(Layer::Floor) > 1);
        assert!(room.bounds().width() >= 3);
    }

    #[test]
    fn test_hallways_match_final_size() {
        let mut rng = MapRng::new(77);
        let room = OrganicRoom::new(12, 18, 6, RoomPolicy::required(), &mut rng);
        let b = room.bounds();
        let doorways = room.hallways();
        assert_eq!(doorways.len() as i32, 2 * (b.width() - 2) + 2 * (b.height() - 2));
        assert!(doorways.iter().all(|d| d.at.x == 0
            || d.at.y == 0
            || d.at.x == b.width() - 1
            || d.at.y == b.height() - 1));
        assert_eq!(doorways[0].hallway.entrance_data().get(Layer::Floor, Point::ZERO), 6);
    }

    #[test]
    fn test_pick_index_in_range() {
        let mut rng = MapRng::new(3);
        for len in 1..40 {
            for _ in 0..50 {
                assert!(pick_index(len, &mut rng) < len);
            }
        }
    }
}
