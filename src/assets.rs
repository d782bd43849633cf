//! Background decoding of the scene's textures.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use image::DynamicImage;
use log::{error, info};
use parking_lot::Mutex;
use thiserror::Error;

use crate::asset_gate::AssetKey;
use crate::config::SceneConfig;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unable to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} contains no pixels", .path.display())]
    Empty { path: PathBuf },
}

/// Decoded RGBA8 pixels ready for GPU upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// Single-pixel texture used until the real image arrives.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }

    fn from_ldr(image: DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        }
    }

    /// Tone maps a high dynamic range panorama down to sRGB-encoded bytes.
    fn from_hdr(image: DynamicImage) -> Self {
        let rgba = image.to_rgba32f();
        let (width, height) = rgba.dimensions();
        let pixels = rgba
            .into_raw()
            .chunks_exact(4)
            .flat_map(|px| {
                [
                    encode_srgb(tone_map(px[0])),
                    encode_srgb(tone_map(px[1])),
                    encode_srgb(tone_map(px[2])),
                    255,
                ]
            })
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

fn tone_map(linear: f32) -> f32 {
    let linear = linear.max(0.0);
    linear / (1.0 + linear)
}

fn encode_srgb(linear: f32) -> u8 {
    (linear.clamp(0.0, 1.0).powf(1.0 / 2.2) * 255.0).round() as u8
}

/// Reads and decodes one asset. The environment map goes through tone mapping.
pub fn load_texture(key: AssetKey, path: &Path) -> Result<TextureData, AssetError> {
    let bytes = fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(match key {
        AssetKey::Environment => TextureData::from_hdr(image),
        AssetKey::Starfield | AssetKey::Planet(_) => TextureData::from_ldr(image),
    })
}

/// One asset to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadRequest {
    pub key: AssetKey,
    pub path: PathBuf,
}

impl LoadRequest {
    /// Every asset the scene needs, environment map first.
    pub fn for_scene(config: &SceneConfig) -> Vec<Self> {
        let mut requests = vec![
            Self {
                key: AssetKey::Environment,
                path: config.resolve(&config.environment),
            },
            Self {
                key: AssetKey::Starfield,
                path: config.resolve(&config.starfield.texture),
            },
        ];
        requests.extend(config.planets.iter().enumerate().map(|(index, planet)| Self {
            key: AssetKey::Planet(index),
            path: config.resolve(&planet.texture),
        }));
        requests
    }
}

/// Completion notice posted by a loader worker.
#[derive(Debug)]
pub struct LoadOutcome {
    pub key: AssetKey,
    pub path: PathBuf,
    pub result: Result<TextureData, AssetError>,
}

/// Decodes assets on worker threads and collects the results in an inbox
/// drained from the event loop.
#[derive(Debug, Default)]
pub struct AssetLoader {
    inbox: Arc<Mutex<Vec<LoadOutcome>>>,
    workers: Vec<JoinHandle<()>>,
}

impl AssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns one worker per request and returns how many were launched.
    pub fn start(&mut self, requests: Vec<LoadRequest>) -> usize {
        let mut launched = 0;
        for request in requests {
            let inbox = Arc::clone(&self.inbox);
            let key = request.key;
            let path = request.path.clone();
            let spawned = thread::Builder::new()
                .name(format!("asset-{key}"))
                .spawn(move || {
                    info!("loading {} from {}", request.key, request.path.display());
                    let result = load_texture(request.key, &request.path);
                    inbox.lock().push(LoadOutcome {
                        key: request.key,
                        path: request.path,
                        result,
                    });
                });
            match spawned {
                Ok(handle) => {
                    self.workers.push(handle);
                    launched += 1;
                }
                Err(err) => {
                    error!("unable to spawn loader for {key}: {err}");
                    self.inbox.lock().push(LoadOutcome {
                        key,
                        path: path.clone(),
                        result: Err(AssetError::Io { path, source: err }),
                    });
                }
            }
        }
        launched
    }

    /// Takes every outcome posted since the last call.
    pub fn drain(&self) -> Vec<LoadOutcome> {
        std::mem::take(&mut *self.inbox.lock())
    }

    /// Blocks until every worker has posted its outcome.
    pub fn wait(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("asset loader thread panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, color: [u8; 4]) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(2, 3, Rgba(color)).save(&path).unwrap();
        path
    }

    #[test]
    fn loads_png_as_rgba8() {
        let dir = TempDir::new().unwrap();
        let path = write_png(&dir, "planet.png", [255, 0, 0, 255]);
        let texture = load_texture(AssetKey::Planet(0), &path).unwrap();
        assert_eq!((texture.width, texture.height), (2, 3));
        assert_eq!(texture.pixels.len(), 2 * 3 * 4);
        assert_eq!(&texture.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_texture(AssetKey::Starfield, &dir.path().join("nope.jpg")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(err.to_string().contains("nope.jpg"));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not an image").unwrap();
        let err = load_texture(AssetKey::Planet(1), &path).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn tone_mapping_stays_in_range() {
        assert_eq!(encode_srgb(tone_map(0.0)), 0);
        assert_eq!(encode_srgb(tone_map(-3.0)), 0);
        assert!(encode_srgb(tone_map(1.0e6)) >= 254);
        assert!(encode_srgb(tone_map(1.0)) > encode_srgb(tone_map(0.25)));
    }

    #[test]
    fn requests_cover_every_asset_of_the_scene() {
        let config = SceneConfig::default();
        let requests = LoadRequest::for_scene(&config);
        assert_eq!(requests.len(), 6);
        assert_eq!(requests[0].key, AssetKey::Environment);
        assert_eq!(requests[0].path, PathBuf::from("assets/moonlit_golf_1k.hdr"));
        assert_eq!(requests[5].key, AssetKey::Planet(3));
        assert_eq!(requests[5].path, PathBuf::from("assets/volcanic/color.png"));
    }

    #[test]
    fn loader_posts_one_outcome_per_request() {
        let dir = TempDir::new().unwrap();
        let requests = vec![
            LoadRequest {
                key: AssetKey::Starfield,
                path: write_png(&dir, "stars.png", [10, 10, 10, 255]),
            },
            LoadRequest {
                key: AssetKey::Planet(0),
                path: write_png(&dir, "a.png", [1, 2, 3, 255]),
            },
            LoadRequest {
                key: AssetKey::Planet(1),
                path: dir.path().join("missing.png"),
            },
        ];
        let mut loader = AssetLoader::new();
        assert_eq!(loader.start(requests), 3);
        loader.wait();

        let mut outcomes = loader.drain();
        assert_eq!(outcomes.len(), 3);
        assert!(loader.drain().is_empty());

        outcomes.sort_by_key(|o| format!("{}", o.key));
        let failed: Vec<_> = outcomes.iter().filter(|o| o.result.is_err()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].key, AssetKey::Planet(1));
    }
}
