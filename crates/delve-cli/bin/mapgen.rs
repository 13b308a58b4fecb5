//! Map generator driver
//!
//! Generates a tilemap from the stock layout or a JSON layout file and writes
//! it out as a PNG image or as ASCII text.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use delve_cli::{Palette, render};
use delve_core::config::MazeConfig;
use delve_core::{MapConfig, MapRng};

/// Generate a room-and-maze tilemap
#[derive(Parser, Debug)]
#[command(name = "mapgen")]
#[command(author, version, about = "Generate a room-and-maze tilemap", long_about = None)]
struct Args {
    /// JSON layout file (defaults to the built-in 512x512 cave layout)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Map width in tiles
    #[arg(long = "width")]
    width: Option<i32>,

    /// Map height in tiles
    #[arg(long = "height")]
    height: Option<i32>,

    /// Random seed (random if omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Maze corridor width
    #[arg(short = 'b', long = "block-width")]
    block_width: Option<i32>,

    /// Grid that randomly placed rooms snap to
    #[arg(long = "room-align")]
    room_align: Option<i32>,

    /// Pixels per tile in the output image
    #[arg(long = "scale")]
    scale: Option<u32>,

    /// Output image path
    #[arg(short = 'o', long = "output", default_value = "map.png")]
    output: PathBuf,

    /// Print the map as ASCII instead of writing an image
    #[arg(long = "ascii")]
    ascii: bool,

    /// Print the effective layout as JSON and exit
    #[arg(long = "dump-config")]
    dump_config: bool,

    /// More log output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> simplelog::LevelFilter {
        use simplelog::LevelFilter;
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    /// Layout file or stock layout, with command-line overrides applied
    fn layout(&self) -> anyhow::Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::load(path)
                .with_context(|| format!("loading layout {}", path.display()))?,
            None => MapConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(align) = self.room_align {
            config.room_align = align;
        }
        if let Some(scale) = self.scale {
            config.tile_width = scale;
        }
        if let Some(block_width) = self.block_width {
            match &mut config.maze {
                Some(maze) => maze.block_width = block_width,
                None => {
                    config.maze = Some(MazeConfig {
                        block_width,
                        floor_tile: config.floor_tile,
                        wall_tile: config.wall_tile,
                    })
                }
            }
        }

        config.validate().context("invalid layout")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    simplelog::TermLogger::init(
        args.log_level(),
        simplelog::ConfigBuilder::new()
            .set_target_level(simplelog::LevelFilter::Off)
            .set_location_level(simplelog::LevelFilter::Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )?;

    let config = args.layout()?;
    if args.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    let rng = match args.seed {
        Some(seed) => MapRng::new(seed),
        None => MapRng::from_entropy(),
    };
    let seed = rng.seed();
    log::info!(
        "generating {}x{} map with {} rooms, seed {seed}",
        config.width,
        config.height,
        config.room_count()
    );

    let mut generator = config.into_generator(rng)?;
    let map = generator
        .generate()
        .with_context(|| format!("failed to generate map (seed {seed})"))?;
    log::info!("placed {} rooms", generator.placements().len());

    if args.ascii {
        print!("{map}");
        return Ok(());
    }

    render(&map, &Palette::default())
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    log::info!("{} generated", args.output.display());
    Ok(())
}
