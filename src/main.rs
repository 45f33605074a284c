mod classify;
mod config;
mod diagnostics;
mod error;
mod facility;
mod normalize;
mod pipeline;
mod sources;
mod tables;
mod validate;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::Config;
use crate::sources::osm::OsmNodeSource;

#[derive(Parser)]
#[command(
    name = "extract_osm_facilities",
    version,
    about = "Extract health and education facilities from OpenStreetMap data"
)]
struct Cli {
    /// Folder holding the OSM extract and the shapefile export.
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Folder the CSV tables are written to.
    #[arg(long, value_name = "DIR", global = true)]
    out_dir: Option<PathBuf>,

    /// OSM extract relative to the data folder (`.osm` or `.pbf`).
    #[arg(long, value_name = "FILE", global = true)]
    osm_file: Option<PathBuf>,

    /// Log progress (INFO level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log per-record decisions (DEBUG level).
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Count every element name in the OSM XML document.
    ElementCounts,
    /// Write the distinct tag keys found on nodes, one per line.
    TagKeys {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Write the places table of the amenities shapefile layer alone.
    AmenityPlaces {
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(dir) = &self.out_dir {
            config.out_dir = dir.clone();
        }
        if let Some(file) = &self.osm_file {
            config.osm_file = file.clone();
        }
        config
    }

    fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.verbose {
            Level::INFO
        } else {
            Level::WARN
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level())
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = cli.config();
    match &cli.command {
        None => {
            pipeline::run(&config).context("extraction failed")?;
        }
        Some(Command::ElementCounts) => {
            let path = config.osm_path();
            let file = File::open(&path).with_context(|| format!("failed to open {path:?}"))?;
            for (name, count) in diagnostics::count_elements(BufReader::new(file))? {
                println!("{name}\t{count}");
            }
        }
        Some(Command::TagKeys { output }) => {
            let mut source = OsmNodeSource::open(&config.osm_path())?;
            let keys = diagnostics::distinct_tag_keys(source.nodes())?;
            diagnostics::write_lines(output, &keys)?;
            info!("wrote {} tag keys to {}", keys.len(), output.display());
        }
        Some(Command::AmenityPlaces { output }) => {
            let count = pipeline::write_amenity_places(&config, output)?;
            info!("wrote {count} amenity places to {}", output.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_runs_the_default_layout() {
        let cli = Cli::parse_from(["extract_osm_facilities"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config(), Config::default());
        assert_eq!(cli.log_level(), Level::WARN);
    }

    #[test]
    fn overrides_and_subcommands_parse() {
        let cli = Cli::parse_from([
            "extract_osm_facilities",
            "--data-dir",
            "/srv/osm",
            "--osm-file",
            "nicaragua-latest.osm.pbf",
            "-v",
            "tag-keys",
            "--output",
            "keys.txt",
        ]);
        let config = cli.config();
        assert_eq!(config.osm_path(), PathBuf::from("/srv/osm/nicaragua-latest.osm.pbf"));
        assert_eq!(cli.log_level(), Level::INFO);
        assert!(matches!(cli.command, Some(Command::TagKeys { .. })));
    }
}
