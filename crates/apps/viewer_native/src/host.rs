use std::path::{Path, PathBuf};
use std::time::Duration;

use formats::{BoundaryDocument, LoadError};
use scene::MarkerId;
use scene::marker::{ImageRequest, TextureHandle};
use scene::record::AnimalRecord;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::view::GlobeView;

#[derive(Debug)]
pub enum ImageLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Http {
        url: String,
        source: reqwest::Error,
    },
    Status {
        url: String,
        status: u16,
    },
    Empty {
        url: String,
    },
}

impl std::fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageLoadError::Io { path, source } => {
                write!(f, "failed to read image {}: {source}", path.display())
            }
            ImageLoadError::Http { url, source } => write!(f, "image request {url} failed: {source}"),
            ImageLoadError::Status { url, status } => {
                write!(f, "image request {url} returned HTTP {status}")
            }
            ImageLoadError::Empty { url } => write!(f, "image {url} is empty"),
        }
    }
}

impl std::error::Error for ImageLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageLoadError::Io { source, .. } => Some(source),
            ImageLoadError::Http { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Fetches marker images: `http(s)` URLs over the network, anything else as a
/// path relative to `base_dir`.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
    base_dir: PathBuf,
}

impl ImageFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_dir: base_dir.into(),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let bytes = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_remote(url).await?
        } else {
            let path = self.base_dir.join(url);
            tokio::fs::read(&path)
                .await
                .map_err(|source| ImageLoadError::Io { path, source })?
        };
        if bytes.is_empty() {
            return Err(ImageLoadError::Empty {
                url: url.to_string(),
            });
        }
        Ok(bytes)
    }

    async fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, ImageLoadError> {
        let http_err = |source| ImageLoadError::Http {
            url: url.to_string(),
            source,
        };
        let resp = self.http.get(url).send().await.map_err(http_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ImageLoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = resp.bytes().await.map_err(http_err)?;
        Ok(body.to_vec())
    }
}

/// Completion of one of the two startup loads.
#[derive(Debug)]
pub enum DataLoaded {
    Boundaries(Result<BoundaryDocument, LoadError>),
    Animals(Result<Vec<AnimalRecord>, LoadError>),
}

#[derive(Debug)]
pub struct ImageLoaded {
    pub marker: MarkerId,
    pub result: Result<Vec<u8>, ImageLoadError>,
}

/// Starts both data loads in parallel. Each sends its result when done, so
/// the receiver sees them in completion order.
pub fn spawn_data_loads(boundaries: PathBuf, animals: PathBuf, tx: mpsc::Sender<DataLoaded>) {
    let boundaries_tx = tx.clone();
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || formats::load_boundaries(&boundaries))
            .await
            .unwrap_or_else(|join| Err(join_failure(join)));
        let _ = boundaries_tx.send(DataLoaded::Boundaries(result)).await;
    });
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(move || formats::load_animals(&animals))
            .await
            .unwrap_or_else(|join| Err(join_failure(join)));
        let _ = tx.send(DataLoaded::Animals(result)).await;
    });
}

fn join_failure(err: tokio::task::JoinError) -> LoadError {
    LoadError::Io {
        path: PathBuf::new(),
        source: std::io::Error::other(err.to_string()),
    }
}

fn spawn_image_fetches(
    fetcher: &ImageFetcher,
    requests: Vec<ImageRequest>,
    tx: &mpsc::Sender<ImageLoaded>,
) {
    for request in requests {
        let fetcher = fetcher.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&request.url).await;
            let _ = tx
                .send(ImageLoaded {
                    marker: request.marker,
                    result,
                })
                .await;
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub data_loads: u32,
    pub images_loaded: u32,
}

/// Headless host loop.
///
/// Ticks `view` at its configured rate, applying load and image completions
/// between frames as they arrive. After `max_frames` ticks the view is hidden;
/// the following tick reports the stop and the loop ends. `on_animals` runs once
/// the animal records are in (e.g. to apply a filter); image fetches then
/// start for whatever markers it leaves displayed.
pub async fn run_frame_loop<F>(
    view: &mut GlobeView,
    mut data_rx: mpsc::Receiver<DataLoaded>,
    fetcher: ImageFetcher,
    max_frames: u64,
    mut on_animals: F,
) -> RunSummary
where
    F: FnMut(&mut GlobeView),
{
    let (image_tx, mut image_rx) = mpsc::channel::<ImageLoaded>(64);
    let period = Duration::from_secs_f64(view.config().frame_interval_s());
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut summary = RunSummary::default();
    let mut next_texture = 1u64;
    let mut data_open = true;
    let mut last_tick: Option<tokio::time::Instant> = None;

    loop {
        tokio::select! {
            now = interval.tick() => {
                let dt = last_tick.map(|t| (now - t).as_secs_f64()).unwrap_or(0.0);
                last_tick = Some(now);
                if summary.frames >= max_frames {
                    view.hide();
                }
                if !view.tick(dt).should_reschedule() {
                    break;
                }
                summary.frames += 1;
            }
            loaded = data_rx.recv(), if data_open => {
                let Some(loaded) = loaded else {
                    data_open = false;
                    continue;
                };
                summary.data_loads += 1;
                let markers_replaced = matches!(loaded, DataLoaded::Animals(_));
                match loaded {
                    DataLoaded::Boundaries(result) => view.on_boundaries_loaded(result),
                    DataLoaded::Animals(result) => view.on_animals_loaded(result),
                }
                if markers_replaced {
                    on_animals(view);
                    spawn_image_fetches(&fetcher, view.image_requests(), &image_tx);
                }
            }
            Some(image) = image_rx.recv() => {
                let result = image.result.map(|_bytes| {
                    let texture = TextureHandle(next_texture);
                    next_texture += 1;
                    texture
                });
                if result.is_ok() {
                    summary.images_loaded += 1;
                }
                view.on_image_loaded(image.marker, result);
            }
        }
    }

    info!(frames = summary.frames, data_loads = summary.data_loads, "frame loop stopped");
    summary
}

/// Directory image paths are resolved against: the animal file's directory.
pub fn image_base_dir(animals: &Path) -> PathBuf {
    let base = animals
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    debug!(base = %base.display(), "image base directory");
    base
}
