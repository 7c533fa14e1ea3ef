//! Background tile image loading for the viewer.
//!
//! A small pool of worker threads downloads tile images with a blocking
//! reqwest client and decodes them with `image`. Finished images come back
//! over a channel and are uploaded as egui textures on the UI thread. The set
//! of wanted tiles follows the map's [`TileSetDiff`]: tiles that leave the
//! view are released (their textures freed) and late downloads are ignored.

use crossbeam_channel::{Receiver, Sender};
use mapplot::prelude::*;
use reqwest::blocking::Client;
use std::{thread, time::Duration};

const WORKERS: usize = 4;
const MAX_ATTEMPTS: usize = 2;

/// Public tile servers (OpenStreetMap in particular) reject requests without one.
const USER_AGENT: &str = concat!("mapplot-app/", env!("CARGO_PKG_VERSION"));

/// Load state of one tile image
pub enum TileImage {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

struct Job {
    coord: TileCoord,
    url: String,
}

type Decoded = (TileCoord, anyhow::Result<egui::ColorImage>);

pub struct TileLoader {
    jobs: Sender<Job>,
    results: Receiver<Decoded>,
    tiles: HashMap<TileCoord, TileImage>,
}

impl TileLoader {
    /// Starts the download workers. They exit when the loader is dropped.
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()?;
        let (jobs, job_rx) = crossbeam_channel::unbounded::<Job>();
        let (result_tx, results) = crossbeam_channel::unbounded::<Decoded>();

        for worker in 0..WORKERS {
            let client = client.clone();
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            thread::Builder::new()
                .name(format!("tile-loader-{worker}"))
                .spawn(move || {
                    for job in job_rx.iter() {
                        let image = fetch(&client, &job.url).and_then(|bytes| decode(&bytes));
                        if result_tx.send((job.coord, image)).is_err() {
                            break;
                        }
                    }
                })?;
        }

        Ok(Self {
            jobs,
            results,
            tiles: HashMap::default(),
        })
    }

    /// Queues a download unless the tile is already known
    pub fn request(&mut self, coord: TileCoord, url: String) {
        if self.tiles.contains_key(&coord) {
            return;
        }
        let state = match self.jobs.send(Job { coord, url }) {
            Ok(()) => TileImage::Loading,
            Err(_) => {
                log::error!("tile workers are gone, cannot load {coord}");
                TileImage::Failed
            }
        };
        self.tiles.insert(coord, state);
    }

    /// Forgets a tile; dropping its handle frees the texture
    pub fn release(&mut self, coord: TileCoord) {
        self.tiles.remove(&coord);
    }

    /// Requests tiles that entered the view and releases those that left it
    pub fn sync(&mut self, diff: &TileSetDiff, url: impl Fn(TileCoord) -> String) {
        for coord in &diff.removed {
            self.release(*coord);
        }
        for coord in &diff.added {
            self.request(*coord, url(*coord));
        }
    }

    /// Uploads every image the workers finished since the last call
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((coord, image)) = self.results.try_recv() {
            self.finish(ctx, coord, image);
        }
    }

    fn finish(&mut self, ctx: &egui::Context, coord: TileCoord, image: anyhow::Result<egui::ColorImage>) {
        let Some(state) = self.tiles.get_mut(&coord) else {
            log::trace!("tile {coord} arrived after it left the view");
            return;
        };
        *state = match image {
            Ok(image) => {
                let texture = ctx.load_texture(format!("tile-{coord}"), image, egui::TextureOptions::LINEAR);
                TileImage::Ready(texture)
            }
            Err(e) => {
                log::warn!("giving up on tile {coord}: {e:#}");
                TileImage::Failed
            }
        };
    }

    pub fn texture(&self, coord: TileCoord) -> Option<&egui::TextureHandle> {
        match self.tiles.get(&coord) {
            Some(TileImage::Ready(texture)) => Some(texture),
            _ => None,
        }
    }

    pub fn is_failed(&self, coord: TileCoord) -> bool {
        matches!(self.tiles.get(&coord), Some(TileImage::Failed))
    }

    /// Tiles still waiting for a download
    pub fn pending(&self) -> usize {
        self.tiles
            .values()
            .filter(|state| matches!(state, TileImage::Loading))
            .count()
    }

    pub fn loaded(&self) -> usize {
        self.tiles
            .values()
            .filter(|state| matches!(state, TileImage::Ready(_)))
            .count()
    }
}

fn fetch(client: &Client, url: &str) -> anyhow::Result<Vec<u8>> {
    let mut attempt = 1;
    loop {
        log::debug!("fetch {url} attempt {attempt}");
        let response = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes());
        match response {
            Ok(bytes) => {
                log::debug!("downloaded {url} ({} bytes)", bytes.len());
                return Ok(bytes.to_vec());
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                log::warn!("{url} failed on attempt {attempt}: {e}");
                attempt += 1;
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn decode(bytes: &[u8]) -> anyhow::Result<egui::ColorImage> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
