use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use foundation::math::project;
use scene::query::CatalogQuery;
use scene::record::IucnStatus;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewer_native::host::{self, ImageFetcher};
use viewer_native::{GlobeConfig, GlobeView};

#[derive(Debug, Parser)]
#[command(name = "viewer_native", about = "Headless animal globe viewer")]
struct Cli {
    /// JSON file overriding scene constants.
    #[arg(long, env = "GLOBE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the sphere position of a coordinate.
    Project {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        /// Defaults to the configured marker radius.
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Report which marker sits under a screen position.
    Pick {
        #[arg(long, env = "GLOBE_ANIMALS")]
        animals: PathBuf,
        x_px: f64,
        y_px: f64,
        /// Show this animal's occurrences instead of the full set.
        #[arg(long)]
        expand: Option<String>,
    },
    /// Load both data files and drive the frame loop for a number of frames.
    Run {
        #[arg(long, env = "GLOBE_ANIMALS")]
        animals: PathBuf,
        #[arg(long, env = "GLOBE_BOUNDARIES")]
        boundaries: PathBuf,
        #[arg(long, default_value_t = 120)]
        frames: u64,
        #[arg(long)]
        search: Option<String>,
        /// IUCN status code, e.g. `endangered`.
        #[arg(long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Project { lat, lon, radius } => {
            let p = project(lat, lon, radius.unwrap_or(config.marker_radius));
            println!("{:.6} {:.6} {:.6}", p.x, p.y, p.z);
            ExitCode::SUCCESS
        }
        Command::Pick {
            animals,
            x_px,
            y_px,
            expand,
        } => pick(config, &animals, x_px, y_px, expand.as_deref()),
        Command::Run {
            animals,
            boundaries,
            frames,
            search,
            status,
        } => {
            run(config, boundaries, animals, frames, catalog_query(search, status)).await
        }
    }
}

/// A blank `--status` means no status filter.
fn catalog_query(search: Option<String>, status: Option<String>) -> Option<CatalogQuery> {
    let status = status
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(IucnStatus::from_code);
    (search.is_some() || status.is_some())
        .then(|| CatalogQuery::new(search.unwrap_or_default(), status))
}

fn load_config(path: Option<&Path>) -> Result<GlobeConfig, viewer_native::ConfigError> {
    match path {
        Some(path) => {
            let config = GlobeConfig::from_path(path)?;
            info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(GlobeConfig::default()),
    }
}

fn pick(config: GlobeConfig, animals: &Path, x_px: f64, y_px: f64, expand: Option<&str>) -> ExitCode {
    let records = match formats::load_animals(animals) {
        Ok(records) => records,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let mut view = GlobeView::enter(config);
    view.on_animals_loaded(Ok(records));
    if let Some(name) = expand
        && view.expand_occurrences(name).is_none()
    {
        error!(name, "no animal with that name");
        return ExitCode::FAILURE;
    }

    view.pointer_moved(x_px, y_px);
    match view.hover().tooltip() {
        Some(tooltip) => match &tooltip.subtitle {
            Some(location) => println!("{} ({location})", tooltip.title),
            None => println!("{}", tooltip.title),
        },
        None => println!("nothing under pointer"),
    }
    ExitCode::SUCCESS
}

async fn run(
    config: GlobeConfig,
    boundaries: PathBuf,
    animals: PathBuf,
    frames: u64,
    query: Option<CatalogQuery>,
) -> ExitCode {
    let fetcher = ImageFetcher::new(host::image_base_dir(&animals));
    let (tx, rx) = mpsc::channel(2);
    host::spawn_data_loads(boundaries, animals, tx);

    let mut view = GlobeView::enter(config);
    let summary = host::run_frame_loop(&mut view, rx, fetcher, frames, |view| {
        if let Some(query) = &query {
            view.filter(query);
        }
    })
    .await;

    let snapshot = view.snapshot();
    println!(
        "frames={} markers={} boundary_polylines={} images={}",
        summary.frames,
        snapshot.markers.len(),
        snapshot.boundary_polylines,
        summary.images_loaded
    );
    ExitCode::SUCCESS
}
