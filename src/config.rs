use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Fully resolved description of the orbit scene.
///
/// Every field has a default matching the stock scene, so an empty
/// `<scene/>` document (or no document at all) yields a runnable setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub asset_root: PathBuf,
    pub environment: PathBuf,
    pub camera: CameraConfig,
    pub orbit: OrbitConfig,
    pub starfield: StarfieldConfig,
    pub planets: Vec<PlanetConfig>,
    pub scroll: ScrollConfig,
    pub loading: LoadingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 25.0,
            near: 0.1,
            far: 100.0,
            distance: 9.0,
            damping: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    pub radius: f32,
    /// Tilt of the orbit group around X, in radians.
    pub tilt: f32,
    /// Vertical offset of the orbit group.
    pub height: f32,
    /// Self-rotation of every planet, radians per second.
    pub spin_rate: f32,
    pub segments: u32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            radius: 4.5,
            tilt: 0.12,
            height: -0.7,
            spin_rate: 0.01,
            segments: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarfieldConfig {
    pub texture: PathBuf,
    pub radius: f32,
    pub segments: u32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            texture: PathBuf::from("stars.jpg"),
            radius: 50.0,
            segments: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetConfig {
    pub name: String,
    pub texture: PathBuf,
    /// Tint used for the planet's heading panel.
    pub color: Vec3,
    pub radius: f32,
}

impl PlanetConfig {
    fn new(name: &str, texture: &str, color: Vec3) -> Self {
        Self {
            name: name.to_string(),
            texture: PathBuf::from(texture),
            color,
            radius: default_planet_radius(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Minimum spacing between two accepted wheel events.
    pub throttle: Duration,
    /// Duration of the rotation and heading tweens.
    pub duration: Duration,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(1200),
            duration: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadingConfig {
    pub fade: Duration,
    /// Upper bound on how long the loading overlay may stay up.
    pub timeout: Duration,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            fade: Duration::from_millis(500),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            environment: PathBuf::from("moonlit_golf_1k.hdr"),
            camera: CameraConfig::default(),
            orbit: OrbitConfig::default(),
            starfield: StarfieldConfig::default(),
            planets: default_planets(),
            scroll: ScrollConfig::default(),
            loading: LoadingConfig::default(),
        }
    }
}

fn default_planets() -> Vec<PlanetConfig> {
    vec![
        PlanetConfig::new("Csilla", "csilla/color.png", Vec3::new(1.0, 0.0, 0.0)),
        PlanetConfig::new("Earth", "earth/map.jpg", Vec3::new(0.0, 0.5, 0.0)),
        PlanetConfig::new("Venus", "venus/map.jpg", Vec3::new(0.0, 0.0, 1.0)),
        PlanetConfig::new("Volcanic", "volcanic/color.png", Vec3::new(1.0, 1.0, 0.0)),
    ]
}

fn default_planet_radius() -> f32 {
    1.3
}

impl SceneConfig {
    /// Reads and parses a scene file; relative paths resolve against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read scene file {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_xml(&xml, base)
            .with_context(|| format!("invalid scene file {}", path.display()))
    }

    /// Parses a scene document, starting from the defaults.
    pub fn from_xml(xml: &str, base_dir: &Path) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let root = document.root_element();
        if !root.has_tag_name("scene") {
            bail!("expected <scene> root element, found <{}>", root.tag_name().name());
        }

        let mut config = Self::default();

        if let Some(assets) = child(&root, "assets") {
            if let Some(root_dir) = optional_text(&assets, "root") {
                config.asset_root = PathBuf::from(root_dir);
            }
            if let Some(environment) = optional_text(&assets, "environment") {
                config.environment = PathBuf::from(environment);
            }
        }
        if config.asset_root.is_relative() {
            config.asset_root = base_dir.join(&config.asset_root);
        }

        if let Some(camera) = child(&root, "camera") {
            let c = &mut config.camera;
            c.fov = parse_f32(optional_text(&camera, "fov"), c.fov)?;
            c.near = parse_f32(optional_text(&camera, "near"), c.near)?;
            c.far = parse_f32(optional_text(&camera, "far"), c.far)?;
            c.distance = parse_f32(optional_text(&camera, "distance"), c.distance)?;
            c.damping = parse_f32(optional_text(&camera, "damping"), c.damping)?;
            if c.near <= 0.0 || c.far <= c.near {
                bail!("camera clip planes must satisfy 0 < near < far");
            }
        }

        if let Some(orbit) = child(&root, "orbit") {
            let o = &mut config.orbit;
            o.radius = parse_f32(optional_text(&orbit, "radius"), o.radius)?;
            o.tilt = parse_f32(optional_text(&orbit, "tilt"), o.tilt)?;
            o.height = parse_f32(optional_text(&orbit, "height"), o.height)?;
            o.spin_rate = parse_f32(optional_text(&orbit, "spin"), o.spin_rate)?;
            o.segments = parse_u32(optional_text(&orbit, "segments"), o.segments)?.max(3);
        }

        if let Some(starfield) = child(&root, "starfield") {
            let s = &mut config.starfield;
            if let Some(texture) = optional_text(&starfield, "texture") {
                s.texture = PathBuf::from(texture);
            }
            s.radius = parse_f32(optional_text(&starfield, "radius"), s.radius)?;
            s.segments = parse_u32(optional_text(&starfield, "segments"), s.segments)?.max(3);
        }

        if let Some(planets) = child(&root, "planets") {
            config.planets = planets
                .children()
                .filter(|n| n.has_tag_name("planet"))
                .map(|node| parse_planet(&node))
                .collect::<Result<_>>()?;
            if config.planets.is_empty() {
                bail!("<planets> must contain at least one <planet>");
            }
        }

        if let Some(scroll) = child(&root, "scroll") {
            let s = &mut config.scroll;
            s.throttle = parse_millis(optional_text(&scroll, "throttle_ms"), s.throttle)?;
            s.duration = parse_millis(optional_text(&scroll, "duration_ms"), s.duration)?;
        }

        if let Some(loading) = child(&root, "loading") {
            let l = &mut config.loading;
            l.fade = parse_millis(optional_text(&loading, "fade_ms"), l.fade)?;
            l.timeout = parse_millis(optional_text(&loading, "timeout_ms"), l.timeout)?;
        }

        Ok(config)
    }

    /// Resolves an asset path against the asset root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }

    /// Number of positions on the orbit, one per planet.
    pub fn positions(&self) -> usize {
        self.planets.len()
    }
}

fn parse_planet(node: &Node<'_, '_>) -> Result<PlanetConfig> {
    let name = required_text(node, "name")?;
    let texture = required_text(node, "texture")
        .with_context(|| format!("planet {name} has no texture"))?;
    Ok(PlanetConfig {
        color: parse_color(optional_text(node, "color"), Vec3::ONE)?,
        radius: parse_f32(optional_text(node, "radius"), default_planet_radius())?,
        texture: PathBuf::from(texture),
        name,
    })
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.has_tag_name(tag))
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    child(node, tag)
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let components = value
        .split_whitespace()
        .map(|c| c.parse::<f32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("invalid color {value:?}: {err}"))?;
    match components.as_slice() {
        [r, g, b] => Ok(Vec3::new(*r, *g, *b) / 255.0),
        _ => Err(anyhow!("color {value:?} must have three components")),
    }
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float {value:?}: {err}")),
        None => Ok(default),
    }
}

fn parse_u32(value: Option<String>, default: u32) -> Result<u32> {
    match value {
        Some(value) => value
            .parse::<u32>()
            .map_err(|err| anyhow!("failed to parse integer {value:?}: {err}")),
        None => Ok(default),
    }
}

fn parse_millis(value: Option<String>, default: Duration) -> Result<Duration> {
    match value {
        Some(value) => value
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|err| anyhow!("failed to parse milliseconds {value:?}: {err}")),
        None => Ok(default),
    }
}
