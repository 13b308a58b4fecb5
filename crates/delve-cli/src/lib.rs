//! Image rendering for generated tilemaps

pub mod render;

pub use render::{Palette, render};
