//! Map generation
//!
//! Rooms, hallways, maze algorithms and the generator that ties them together.

mod backtracker;
mod generator;
mod hallway;
mod organic_room;
mod path;
mod rect_room;
mod room;

pub use backtracker::BlockBacktracker;
pub use generator::{Generator, GeneratorOptions, MAX_PLACEMENT_ATTEMPTS, Placement};
pub use hallway::{BasicHallway, Hallway, Orientation};
pub use organic_room::OrganicRoom;
pub use path::Path;
pub use rect_room::RectRoom;
pub use room::{
    DOOR_WIDTH, Doorway, HALL_WIDTH, Room, RoomAlignment, RoomPolicy, TileData, perimeter_doorways,
};
