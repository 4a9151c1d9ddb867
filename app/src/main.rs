use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use kappa_core::record::EpsgCode;
use kappa_extract::images::extract_image_groups;
use kappa_extract::{lidar, ExtractLayout, TrajectoryIndex};
use kappa_stac::{assembler, writer};
use kappa_wfs::{fetch_all, output, reproject, HttpFeatureSource, DEFAULT_BATCH_SIZE};

const OUTPUT_PATH: &str = "./output";

const WFS_URL: &str = "https://data.wien.gv.at/daten/geo?version=1.1.0&service=WFS";
const IMAGE_META_LAYER: &str = "ogdwien:KAPPAZUNDERIMAGEPOGD";
// The server does not reliably declare a CRS; the dataset is published in
// MGI / Austria GK East.
const WFS_SOURCE_EPSG: EpsgCode = 31256;

#[derive(Parser, Debug)]
#[command(
    name = "kappa",
    about = "Process Kappazunder 2020 mobile mapping data",
    version = "0.0.1"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a data extract downloaded from the city geodata viewer
    #[command(subcommand)]
    Extract(ExtractCommand),
    /// Build a STAC catalog from extract metadata
    #[command(subcommand)]
    Stac(StacCommand),
    /// Dump feature layers from the WFS server
    #[command(subcommand)]
    Wfs(WfsCommand),
}

#[derive(Subcommand, Debug)]
enum ExtractCommand {
    /// Merge images from a data extract into a WFS dump
    MergeImages {
        wfs_geojson: PathBuf,
        extract_path: Vec<PathBuf>,
    },
    /// Merge lidar from a data extract into a WFS dump
    MergeLidar {
        wfs_geojson: PathBuf,
        extract_path: Vec<PathBuf>,
    },
    /// Validate and rearrange lidar scan files
    PrepareLidar { data_dir: PathBuf },
    /// Rearrange image files for easier consumption
    PrepareImages { data_dir: PathBuf },
    /// Upload prepared image files to object storage
    UploadImages { prepared_dir: PathBuf },
    /// Upload prepared lidar files to object storage
    UploadLidar { prepared_dir: PathBuf },
}

#[derive(Subcommand, Debug)]
enum StacCommand {
    /// Create a STAC collection from Kappazunder images
    Images {
        input_dir: PathBuf,
        #[arg(long, default_value = "Kappazunder data extract")]
        title: String,
    },
}

#[derive(Subcommand, Debug)]
enum WfsCommand {
    /// Dump the image metadata layer
    DumpImages {
        #[arg(long, value_enum, default_value_t = FileFormat::Geojson)]
        format: FileFormat,
        #[arg(long, default_value_t = WFS_SOURCE_EPSG)]
        source_epsg: EpsgCode,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum FileFormat {
    Geojson,
    Geoparquet,
}

fn main() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();
    if let Err(e) = run(args.command) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Extract(cmd) => run_extract(cmd),
        Command::Stac(cmd) => run_stac(cmd),
        Command::Wfs(cmd) => run_wfs(cmd),
    }
}

fn run_extract(command: ExtractCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ExtractCommand::PrepareLidar { data_dir } => {
            let layout = ExtractLayout::new(data_dir);
            let out_dir = PathBuf::from(OUTPUT_PATH).join("lidar");
            let prepared = lidar::prepare_scans(&layout, &out_dir)?;
            log::info!("{} scans ready under {:?}", prepared.len(), out_dir);
            Ok(())
        }
        ExtractCommand::MergeImages { .. } => {
            log::warn!("merge-images is not implemented yet");
            Ok(())
        }
        ExtractCommand::MergeLidar { .. } => {
            log::warn!("merge-lidar is not implemented yet");
            Ok(())
        }
        ExtractCommand::PrepareImages { .. } => {
            log::warn!("prepare-images is not implemented yet");
            Ok(())
        }
        ExtractCommand::UploadImages { .. } => {
            log::warn!("upload-images is not implemented yet");
            Ok(())
        }
        ExtractCommand::UploadLidar { .. } => {
            log::warn!("upload-lidar is not implemented yet");
            Ok(())
        }
    }
}

fn run_stac(command: StacCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        StacCommand::Images { input_dir, title } => {
            let start = std::time::Instant::now();

            let layout = ExtractLayout::new(input_dir);
            log::info!("reading extract at {:?}", layout.base_dir);
            let trajectories = TrajectoryIndex::from_layout(&layout)?;
            let groups = extract_image_groups(&layout)?;

            let items = assembler::build_items(&groups, &trajectories)?;
            let mut collection = assembler::image_collection(&title);
            collection.update_extent_from_items(&items);

            let out_dir = PathBuf::from(OUTPUT_PATH).join("stac").join("images");
            writer::save_catalog(&collection, &items, &out_dir)?;

            log::info!("Elapsed: {:?}", start.elapsed());
            Ok(())
        }
    }
}

fn run_wfs(command: WfsCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        WfsCommand::DumpImages {
            format,
            source_epsg,
        } => {
            let start = std::time::Instant::now();

            let source = HttpFeatureSource::new(WFS_URL, IMAGE_META_LAYER)?;
            let mut collection = fetch_all(&source, DEFAULT_BATCH_SIZE, source_epsg)?;
            reproject::reproject_to_wgs84(&mut collection, source_epsg)?;

            match format {
                FileFormat::Geojson => {
                    let path = PathBuf::from(OUTPUT_PATH)
                        .join("json")
                        .join("images.geojson");
                    output::write_geojson(&collection, &path)?;
                }
                FileFormat::Geoparquet => {
                    let path = PathBuf::from(OUTPUT_PATH)
                        .join("parquet")
                        .join("images.geoparquet");
                    output::write_geoparquet(&collection, &path)?;
                }
            }

            log::info!("Elapsed: {:?}", start.elapsed());
            Ok(())
        }
    }
}
