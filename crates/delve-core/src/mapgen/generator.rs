//! Map generation: room placement, maze carving and hallway connection
//!
//! Rooms are placed according to their [`RoomPolicy`]. A maze fills the space
//! between them, every room is then joined to the maze through one of its
//! doorways, and finally the maze gets a chance to clean up after itself.

use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::error::GenerateError;
use crate::geom::{Point, Rect};
use crate::rng::MapRng;
use crate::tilemap::{EMPTY_TILE, Layer, OverlapEvent, Tile, Tilemap};

use super::path::Path;
use super::room::{Doorway, Room, RoomPolicy};

/// Placement tries per randomly placed room
pub const MAX_PLACEMENT_ATTEMPTS: usize = 250;

/// Configuration of a [`Generator`]
pub struct GeneratorOptions {
    pub width: i32,
    pub height: i32,
    /// Cell size in pixels, passed through to the map
    pub tile_width: u32,
    pub rooms: Vec<Box<dyn Room>>,
    /// Snap random room corners to multiples of this (ignored when <= 1)
    pub room_align: i32,
    /// Maze algorithm; without one rooms are placed but never connected
    pub path: Option<Box<dyn Path>>,
    pub floor_tile: Tile,
    pub wall_tile: Tile,
    /// Tile to image key, passed through to the map
    pub mapper: HashMap<Tile, String>,
    /// Passed through to the map
    pub overlap_event: Option<OverlapEvent>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            tile_width: 1,
            rooms: Vec::new(),
            room_align: 1,
            path: None,
            floor_tile: EMPTY_TILE,
            wall_tile: EMPTY_TILE,
            mapper: HashMap::new(),
            overlap_event: None,
        }
    }
}

impl fmt::Debug for GeneratorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorOptions")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_width", &self.tile_width)
            .field("rooms", &self.rooms.len())
            .field("room_align", &self.room_align)
            .field("path", &self.path)
            .field("floor_tile", &self.floor_tile)
            .field("wall_tile", &self.wall_tile)
            .finish_non_exhaustive()
    }
}

/// A room that made it onto the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Index into [`GeneratorOptions::rooms`]
    pub room: usize,
    /// Absolute bounding box
    pub bounds: Rect,
}

/// Builds tilemaps from a set of rooms and a maze algorithm.
///
/// A generator owns its random source, so two generators built with the same
/// seed and options produce the same maps.
#[derive(Debug)]
pub struct Generator {
    options: GeneratorOptions,
    /// Indices of required rooms, aligned rooms first
    required: Vec<usize>,
    /// Indices of optional rooms, aligned rooms first
    optional: Vec<usize>,
    /// No two entries overlap unless both rooms allow it
    placements: Vec<Placement>,
    rng: MapRng,
}

impl Generator {
    pub fn new(options: GeneratorOptions, rng: MapRng) -> Self {
        let (mut required, mut optional): (Vec<usize>, Vec<usize>) =
            (0..options.rooms.len()).partition(|&i| options.rooms[i].policy().required);

        // pinned rooms claim their space before random ones
        let pinned_last = |&i: &usize| options.rooms[i].policy().alignment.is_none();
        required.sort_by_key(pinned_last);
        optional.sort_by_key(pinned_last);

        Self {
            options,
            required,
            optional,
            placements: Vec::new(),
            rng,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn rooms(&self) -> &[Box<dyn Room>] {
        &self.options.rooms
    }

    /// Rooms placed by the last call to [`Generator::generate`]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Room indices in the order they are attempted
    pub fn placement_order(&self) -> impl Iterator<Item = usize> + '_ {
        self.required.iter().chain(&self.optional).copied()
    }

    pub fn rng_mut(&mut self) -> &mut MapRng {
        &mut self.rng
    }

    /// Random cell of `map` holding `tile`, drawn from this generator's rng
    pub fn random_pos(&mut self, map: &Tilemap, tile: Tile) -> Option<Point> {
        map.random_pos(tile, &mut self.rng)
    }

    /// Generate a new map. Fails if a required room cannot be placed or a
    /// placed room cannot be joined to the maze.
    pub fn generate(&mut self) -> Result<Tilemap, GenerateError> {
        self.placements.clear();

        for i in self.required.clone() {
            self.place_room(i)?;
        }
        for i in self.optional.clone() {
            self.place_room(i)?;
        }
        log::debug!(
            "placed {} of {} rooms on {}x{}",
            self.placements.len(),
            self.options.rooms.len(),
            self.options.width,
            self.options.height
        );

        let mut map = self.init_map();
        self.fill_room_data(&mut map);

        if let Some(mut path) = self.options.path.take() {
            let carved = self.carve(&mut map, path.as_mut());
            self.options.path = Some(path);
            carved?;
        }

        map.build_cache();
        Ok(map)
    }

    /// Place a room according to its policy. Only required rooms report
    /// failure; optional ones are silently dropped.
    fn place_room(&mut self, index: usize) -> Result<(), GenerateError> {
        let policy = *self.options.rooms[index].policy();
        let size = self.options.rooms[index].bounds();

        // a pinned room has a single candidate box
        let attempts = if policy.alignment.is_some() {
            1
        } else {
            MAX_PLACEMENT_ATTEMPTS
        };

        for attempt in 0..attempts {
            let Some(bounds) = self.candidate(size, &policy) else {
                log::trace!("room #{index} try {attempt}: no room on the map");
                continue;
            };

            if self.conflicts(&bounds, &policy) {
                log::trace!("room #{index} try {attempt}: {bounds:?} overlaps");
                continue;
            }

            self.placements.push(Placement {
                room: index,
                bounds,
            });
            return Ok(());
        }

        if policy.required {
            return Err(GenerateError::RequiredRoomPlacement {
                index,
                width: size.width(),
                height: size.height(),
                attempts,
            });
        }

        log::warn!(
            "dropping optional room #{index} ({}x{}) after {attempts} attempts",
            size.width(),
            size.height()
        );
        Ok(())
    }

    /// Absolute box for a room of local bounds `size`, or None if it cannot
    /// fit on the map
    fn candidate(&mut self, size: Rect, policy: &RoomPolicy) -> Option<Rect> {
        let (w, h) = (size.width(), size.height());
        let (map_w, map_h) = (self.options.width, self.options.height);

        let origin = match policy.alignment {
            Some(align) => Point::new(
                (f64::from(map_w) * align.x) as i32 - w / 2,
                (f64::from(map_h) * align.y) as i32 - h / 2,
            ),
            None => {
                if w > map_w || h > map_h {
                    return None;
                }
                let align = self.options.room_align;
                if align > 1 {
                    let slots_x = ((map_w - w) / align) as u32;
                    let slots_y = ((map_h - h) / align) as u32;
                    Point::new(
                        self.rng.rn2(slots_x + 1) as i32 * align,
                        self.rng.rn2(slots_y + 1) as i32 * align,
                    )
                } else {
                    Point::new(self.rng.range(0, map_w - w), self.rng.range(0, map_h - h))
                }
            }
        };

        let bounds = size.translate(origin);
        Rect::from_size(map_w, map_h)
            .contains(&bounds)
            .then_some(bounds)
    }

    /// True if `bounds` would overlap a placed room and the two rooms do not
    /// both allow it
    fn conflicts(&self, bounds: &Rect, policy: &RoomPolicy) -> bool {
        self.placements.iter().any(|placed| {
            placed.bounds.overlaps(bounds)
                && !(policy.can_overlap && self.options.rooms[placed.room].policy().can_overlap)
        })
    }

    fn init_map(&self) -> Tilemap {
        let o = &self.options;
        let mut map = if o.floor_tile == EMPTY_TILE && o.wall_tile == EMPTY_TILE {
            Tilemap::new(o.width, o.height, o.tile_width)
        } else {
            Tilemap::filled(o.width, o.height, o.tile_width, o.floor_tile, o.wall_tile)
        };
        map.set_mapper(o.mapper.clone());
        map.set_overlap_event(o.overlap_event.clone());
        map
    }

    /// Copy every placed room's tile data onto the map
    fn fill_room_data(&self, map: &mut Tilemap) {
        for placed in &self.placements {
            self.options.rooms[placed.room]
                .data()
                .stamp(map, placed.bounds.min);
        }
    }

    fn carve(&mut self, map: &mut Tilemap, path: &mut dyn Path) -> Result<(), GenerateError> {
        let exits: HashSet<Point> = path.flood(map, &mut self.rng).into_iter().collect();
        self.place_hallways(map, &exits)?;
        path.post_process(map, &mut self.rng);
        Ok(())
    }

    /// Join every placed room to the maze through one of its doorways,
    /// trying doorways in random order.
    fn place_hallways(&mut self, map: &mut Tilemap, exits: &HashSet<Point>) -> Result<(), GenerateError> {
        for placed in &self.placements {
            let mut doorways = self.options.rooms[placed.room].hallways();
            self.rng.shuffle(&mut doorways);

            let connection = doorways.iter().find_map(|doorway| {
                walk_to_maze(map, exits, placed.bounds.min, doorway).map(|path| (doorway, path))
            });

            let Some((doorway, path)) = connection else {
                return Err(GenerateError::HallwayConnection {
                    index: placed.room,
                    bounds: placed.bounds,
                });
            };

            let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
                continue;
            };
            log::trace!(
                "room #{} joined the maze through {} door at {first:?} ({} cells)",
                placed.room,
                doorway.hallway.orientation(),
                path.len()
            );

            doorway.hallway.entrance_data().stamp(map, first);
            doorway.hallway.exit_data().stamp(map, last);
            for &p in &path {
                map.set(p, Layer::Wall, EMPTY_TILE);
            }
        }

        Ok(())
    }
}

/// Walk from a doorway away from its room until reaching an open cell.
/// Returns every cell walked if that cell belongs to the maze, None if the
/// walk leaves the map or stops at open space outside the maze.
fn walk_to_maze(
    map: &Tilemap,
    exits: &HashSet<Point>,
    origin: Point,
    doorway: &Doorway,
) -> Option<Vec<Point>> {
    let step = doorway.hallway.orientation().step();
    let mut current = origin + doorway.at;
    let mut path = Vec::new();

    loop {
        if !map.in_bounds(current, 1) {
            return None;
        }
        path.push(current);

        if map.is_clear(current, Layer::Wall, 1) {
            return exits.contains(&current).then_some(path);
        }
        current = current + step;
    }
}
