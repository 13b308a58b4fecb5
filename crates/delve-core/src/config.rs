//! Declarative map layouts
//!
//! A [`MapConfig`] describes the grid, the maze and the rooms to place, and can
//! be loaded from JSON and turned into a ready-to-run [`Generator`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::mapgen::{
    BlockBacktracker, Generator, GeneratorOptions, OrganicRoom, RectRoom, Room, RoomAlignment,
    RoomPolicy,
};
use crate::rng::MapRng;
use crate::tilemap::Tile;

/// Whole-map layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_one")]
    pub tile_width: u32,
    /// Grid that randomly placed rooms snap to
    #[serde(default = "default_align")]
    pub room_align: i32,
    #[serde(default = "default_floor")]
    pub floor_tile: Tile,
    #[serde(default = "default_wall")]
    pub wall_tile: Tile,
    #[serde(default)]
    pub maze: Option<MazeConfig>,
    #[serde(default)]
    pub rooms: Vec<RoomSpec>,
}

/// Block backtracker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MazeConfig {
    pub block_width: i32,
    #[serde(default = "default_floor")]
    pub floor_tile: Tile,
    #[serde(default = "default_wall")]
    pub wall_tile: Tile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Rectangular,
    Organic,
}

/// A room edge length, either fixed or drawn per room as
/// `base + step * rn2(steps)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dimension {
    Fixed(i32),
    Stepped { base: i32, step: i32, steps: u32 },
}

impl Dimension {
    pub fn sample(&self, rng: &mut MapRng) -> i32 {
        match *self {
            Dimension::Fixed(n) => n,
            Dimension::Stepped { base, step, steps } => base + step * rng.rn2(steps) as i32,
        }
    }

    fn is_valid(&self) -> bool {
        match *self {
            Dimension::Fixed(n) => n > 0,
            Dimension::Stepped { base, step, steps } => base > 0 && step >= 0 && steps > 0,
        }
    }
}

/// One or more rooms of the same shape and policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub kind: RoomKind,
    pub width: Dimension,
    pub height: Dimension,
    #[serde(default = "default_floor")]
    pub floor_tile: Tile,
    /// Wall ring tile; organic rooms have no ring and ignore it
    #[serde(default = "default_wall")]
    pub wall_tile: Tile,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub policy: PolicySpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySpec {
    pub required: bool,
    pub can_overlap: bool,
    pub alignment: Option<AlignmentSpec>,
}

/// Alignment by preset name or explicit fractions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlignmentSpec {
    Preset(AlignmentPreset),
    Fraction { x: f64, y: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentPreset {
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<AlignmentSpec> for RoomAlignment {
    fn from(spec: AlignmentSpec) -> Self {
        match spec {
            AlignmentSpec::Preset(AlignmentPreset::Center) => RoomAlignment::CENTER,
            AlignmentSpec::Preset(AlignmentPreset::TopLeft) => RoomAlignment::TOP_LEFT,
            AlignmentSpec::Preset(AlignmentPreset::TopRight) => RoomAlignment::TOP_RIGHT,
            AlignmentSpec::Preset(AlignmentPreset::BottomLeft) => RoomAlignment::BOTTOM_LEFT,
            AlignmentSpec::Preset(AlignmentPreset::BottomRight) => RoomAlignment::BOTTOM_RIGHT,
            AlignmentSpec::Fraction { x, y } => RoomAlignment::new(x, y),
        }
    }
}

impl From<PolicySpec> for RoomPolicy {
    fn from(spec: PolicySpec) -> Self {
        RoomPolicy {
            required: spec.required,
            can_overlap: spec.can_overlap,
            alignment: spec.alignment.map(RoomAlignment::from),
        }
    }
}

fn default_floor() -> Tile {
    1
}

fn default_wall() -> Tile {
    2
}

fn default_count() -> usize {
    1
}

fn default_one() -> u32 {
    1
}

fn default_align() -> i32 {
    1
}

impl Default for MapConfig {
    /// 512x512 cave layout: a hundred required organic rooms between 12 and
    /// 36 tiles a side, joined by a maze of 6-wide corridors
    fn default() -> Self {
        let size = Dimension::Stepped {
            base: 12,
            step: 6,
            steps: 5,
        };
        Self {
            width: 512,
            height: 512,
            tile_width: default_one(),
            room_align: 4,
            floor_tile: default_floor(),
            wall_tile: default_wall(),
            maze: Some(MazeConfig {
                block_width: 6,
                floor_tile: default_floor(),
                wall_tile: default_wall(),
            }),
            rooms: vec![RoomSpec {
                kind: RoomKind::Organic,
                width: size,
                height: size,
                floor_tile: default_floor(),
                wall_tile: default_wall(),
                count: 100,
                policy: PolicySpec {
                    required: true,
                    ..PolicySpec::default()
                },
            }],
        }
    }
}

impl MapConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject layouts that could only fail or panic later on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        if self.width <= 0 || self.height <= 0 {
            return invalid(format!("map size {}x{} must be positive", self.width, self.height));
        }
        if let Some(maze) = &self.maze
            && maze.block_width < 1
        {
            return invalid(format!("maze block width {} must be at least 1", maze.block_width));
        }
        for (i, room) in self.rooms.iter().enumerate() {
            if !room.width.is_valid() || !room.height.is_valid() {
                return invalid(format!("room spec #{i} has an empty size"));
            }
            if let Some(AlignmentSpec::Fraction { x, y }) = room.policy.alignment
                && !((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y))
            {
                return invalid(format!("room spec #{i} alignment ({x}, {y}) is outside 0..=1"));
            }
        }
        Ok(())
    }

    /// Total number of rooms this layout asks for
    pub fn room_count(&self) -> usize {
        self.rooms.iter().map(|r| r.count).sum()
    }

    /// Build the rooms and the generator. Room construction draws from `rng`
    /// before the generator takes ownership of it.
    pub fn into_generator(self, mut rng: MapRng) -> Result<Generator, ConfigError> {
        self.validate()?;

        let mut rooms: Vec<Box<dyn Room>> = Vec::with_capacity(self.room_count());
        for spec in &self.rooms {
            let policy = RoomPolicy::from(spec.policy);
            for _ in 0..spec.count {
                let w = spec.width.sample(&mut rng);
                let h = spec.height.sample(&mut rng);
                let room: Box<dyn Room> = match spec.kind {
                    RoomKind::Rectangular => {
                        Box::new(RectRoom::new(w, h, spec.floor_tile, spec.wall_tile, policy))
                    }
                    RoomKind::Organic => {
                        Box::new(OrganicRoom::new(w, h, spec.floor_tile, policy, &mut rng))
                    }
                };
                rooms.push(room);
            }
        }

        let options = GeneratorOptions {
            width: self.width,
            height: self.height,
            tile_width: self.tile_width,
            rooms,
            room_align: self.room_align,
            path: self.maze.map(|m| {
                Box::new(BlockBacktracker::new(m.block_width, m.floor_tile, m.wall_tile))
                    as Box<dyn crate::mapgen::Path>
            }),
            floor_tile: self.floor_tile,
            wall_tile: self.wall_tile,
            ..GeneratorOptions::default()
        };

        Ok(Generator::new(options, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "width": 64,
        "height": 48,
        "room_align": 2,
        "floor_tile": 1,
        "wall_tile": 2,
        "maze": { "block_width": 2 },
        "rooms": [
            { "kind": "rectangular", "width": 10, "height": 8,
              "policy": { "required": true, "alignment": "center" } },
            { "kind": "organic", "width": { "base": 8, "step": 2, "steps": 3 },
              "height": 8, "count": 3 },
            { "kind": "rectangular", "width": 6, "height": 6,
              "policy": { "alignment": { "x": 0.25, "y": 0.75 } } }
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let config = MapConfig::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.width, 64);
        assert_eq!(config.tile_width, 1);
        assert_eq!(config.maze.as_ref().unwrap().wall_tile, 2);
        assert_eq!(config.room_count(), 5);

        let center = config.rooms[0].policy;
        assert!(center.required);
        assert_eq!(
            RoomPolicy::from(center).alignment,
            Some(RoomAlignment::CENTER)
        );

        let fraction = RoomPolicy::from(config.rooms[2].policy);
        assert_eq!(fraction.alignment, Some(RoomAlignment::BOTTOM_LEFT));
        assert!(!fraction.required);

        assert_eq!(
            config.rooms[1].width,
            Dimension::Stepped {
                base: 8,
                step: 2,
                steps: 3
            }
        );
    }

    #[test]
    fn test_json_round_trip_of_default() {
        let config = MapConfig::default();
        let json = config.to_json_pretty().unwrap();
        assert_eq!(MapConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_layouts() {
        assert!(matches!(
            MapConfig::from_json_str(r#"{ "width": 0, "height": 10 }"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            MapConfig::from_json_str(r#"{ "width": 10, "height": 10, "maze": { "block_width": 0 } }"#),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            MapConfig::from_json_str(
                r#"{ "width": 10, "height": 10,
                     "rooms": [{ "kind": "organic", "width": 0, "height": 4 }] }"#
            ),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            MapConfig::from_json_str(r#"{ "width": "wide" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MapConfig::load("/nonexistent/layout.json"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_stepped_dimension_samples() {
        let dim = Dimension::Stepped {
            base: 12,
            step: 6,
            steps: 5,
        };
        let mut rng = MapRng::new(4);
        for _ in 0..200 {
            let n = dim.sample(&mut rng);
            assert!([12, 18, 24, 30, 36].contains(&n), "{n}");
        }
        assert_eq!(Dimension::Fixed(7).sample(&mut rng), 7);
    }

    #[test]
    fn test_into_generator_builds_every_room() {
        let config = MapConfig::from_json_str(SAMPLE).unwrap();
        let generator = config.into_generator(MapRng::new(9)).unwrap();
        assert_eq!(generator.rooms().len(), 5);
        assert_eq!(generator.options().room_align, 2);
        assert!(generator.options().path.is_some());
        // the pinned required room is attempted first
        assert_eq!(generator.placement_order().next(), Some(0));
    }

    #[test]
    fn test_default_matches_stock_layout() {
        let config = MapConfig::default();
        assert_eq!((config.width, config.height), (512, 512));
        assert_eq!(config.room_count(), 100);
        assert_eq!(config.maze.unwrap().block_width, 6);
    }
}
