use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use config::FileFormat;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use mcblock::settings::Settings;
use mcblock::world::{BCoords, CIndex, Column, Dimension, RCoords};

#[derive(Debug, clap::Parser)]
struct Cli {
    #[arg(long, default_value_t = false)]
    no_color: bool,
    /// Extra TOML config files, applied in order over the defaults
    #[arg(short, long)]
    config: Vec<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Print the id of the block at world coordinates
    #[command(allow_negative_numbers = true)]
    Block {
        /// Dimension directory containing region files
        dimension: PathBuf,
        x: i32,
        y: i32,
        z: i32,
        /// Include block state properties
        #[arg(long, default_value_t = false)]
        properties: bool,
    },
    /// List the region files of a dimension
    Regions { dimension: PathBuf },
    /// Count the blocks in every column of a region
    #[command(allow_negative_numbers = true)]
    Stats {
        dimension: PathBuf,
        rx: i32,
        rz: i32,
        /// Number of most common blocks to show
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(!cli.no_color)
        .init();
    log::debug!("args: {:?}", cli);

    let mut builder = Settings::config_builder();
    for config_path in cli.config {
        builder = builder.add_source(config::File::new(config_path.as_str(), FileFormat::Toml));
    }
    let config = builder.build()?;
    let settings = Settings::from_config(&config)?;
    log::debug!("settings: {:?}", settings);

    match cli.command {
        Commands::Block {
            dimension,
            x,
            y,
            z,
            properties,
        } => {
            let dimension = Dimension::new(dimension, &settings);
            match dimension.block_state(BCoords((x, z, y).into())) {
                Ok(state) if properties => println!("{}", state),
                Ok(state) => println!("{}", state.name),
                Err(err) if err.is_absent() => {
                    log::info!("{}", err);
                    println!("no data");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Commands::Regions { dimension } => {
            let dimension = Dimension::new(dimension, &settings);
            for (coords, path) in dimension.list_regions()? {
                println!("{}\t{}", coords, path.display());
            }
        }

        Commands::Stats {
            dimension,
            rx,
            rz,
            top,
        } => {
            let dimension = Dimension::new(dimension, &settings);
            let region = dimension.load_region(RCoords((rx, rz).into()))?;
            let populated: Vec<CIndex> = region.populated().collect();
            log::info!("{} populated columns in {}", populated.len(), region.coords);
            let counts = populated
                .par_iter()
                .filter_map(|index| match region.column(index.x(), index.z()) {
                    Ok(column) => Some(count_blocks(&column)),
                    Err(err) => {
                        log::warn!("skipping column {} of {}: {}", index, region.coords, err);
                        None
                    }
                })
                .reduce(HashMap::new, |mut total, counts| {
                    for (name, count) in counts {
                        *total.entry(name).or_insert(0) += count;
                    }
                    total
                });

            let mut counts: Vec<(String, u64)> = counts.into_iter().collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            for (name, count) in counts.into_iter().take(top) {
                println!("{:>12}  {}", count, name);
            }
        }
    }

    Ok(())
}

fn count_blocks(column: &Column) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for chunk in column.chunks.iter() {
        let mut chunk_counts: HashMap<&str, u64> = HashMap::new();
        for block in chunk.iter_blocks() {
            match block {
                Ok((_, state)) => *chunk_counts.entry(state.name.as_str()).or_insert(0) += 1,
                Err(err) => {
                    log::warn!("skipping chunk {} of column {}: {}", chunk.y, column.coords, err);
                    chunk_counts.clear();
                    break;
                }
            }
        }
        for (name, count) in chunk_counts {
            *counts.entry(name.to_owned()).or_insert(0) += count;
        }
    }
    counts
}
