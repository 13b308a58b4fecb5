//! Room-and-maze tilemap generation
//!
//! This crate builds two-layer tile grids for top-down dungeon maps:
//! - Fixed-size rectangular rooms and randomly grown organic rooms
//! - A block backtracker maze carved through the space between them
//! - Straight hallways joining every room to the maze
//! - A seeded random source so any map can be regenerated
//!
//! The usual entry point is [`config::MapConfig`], which turns a declarative
//! layout into a [`mapgen::Generator`].

pub mod config;
pub mod error;
pub mod geom;
pub mod mapgen;
pub mod rng;
pub mod tilemap;

pub use config::MapConfig;
pub use error::{ConfigError, GenerateError};
pub use geom::{Point, Rect};
pub use mapgen::{Generator, GeneratorOptions};
pub use rng::MapRng;
pub use tilemap::{EMPTY_TILE, Layer, Tile, Tilemap};
