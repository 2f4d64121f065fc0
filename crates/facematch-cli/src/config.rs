use anyhow::{Context, Result};
use facematch_core::DEFAULT_THRESHOLD;
use facematch_render::{
    DEFAULT_COLOR, DEFAULT_LABEL_SCALE, DEFAULT_THICKNESS, MAX_LABEL_SCALE, MAX_THICKNESS,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI configuration: optional TOML file, then `FACEMATCH_*` environment
/// variables on top. Command-line flags are applied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Euclidean distance threshold for a positive match.
    pub threshold: f32,
    /// Directory searched when a file name is not an existing path.
    pub search_root: PathBuf,
    /// Directory holding `<stem>.faces.json` manifests (default: next to each image).
    pub manifest_dir: Option<PathBuf>,
    pub box_color: [u8; 3],
    pub box_thickness: u32,
    pub label_scale: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            search_root: default_search_root(),
            manifest_dir: None,
            box_color: DEFAULT_COLOR,
            box_thickness: DEFAULT_THICKNESS,
            label_scale: DEFAULT_LABEL_SCALE,
        }
    }
}

impl Config {
    /// Load from `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Override fields from `FACEMATCH_*` variables. Unparseable or
    /// out-of-range values are ignored with a warning.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        self.threshold = env_parse(&var, "FACEMATCH_THRESHOLD", self.threshold);
        if let Some(root) = var("FACEMATCH_SEARCH_ROOT") {
            self.search_root = PathBuf::from(root);
        }
        if let Some(dir) = var("FACEMATCH_MANIFEST_DIR") {
            self.manifest_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = var("FACEMATCH_BOX_COLOR") {
            match parse_color(&raw) {
                Some(color) => self.box_color = color,
                None => tracing::warn!(value = %raw, "ignoring FACEMATCH_BOX_COLOR; expected RRGGBB"),
            }
        }
        self.box_thickness = env_parse(&var, "FACEMATCH_BOX_THICKNESS", self.box_thickness);
        self.label_scale = env_parse(&var, "FACEMATCH_LABEL_SCALE", self.label_scale);
        self.check_ranges();
    }

    /// Reset drawing settings outside `1..=MAX` to their defaults.
    fn check_ranges(&mut self) {
        if !(1..=MAX_THICKNESS).contains(&self.box_thickness) {
            tracing::warn!(
                value = self.box_thickness,
                max = MAX_THICKNESS,
                "box_thickness out of range; using default"
            );
            self.box_thickness = DEFAULT_THICKNESS;
        }
        if !(1..=MAX_LABEL_SCALE).contains(&self.label_scale) {
            tracing::warn!(
                value = self.label_scale,
                max = MAX_LABEL_SCALE,
                "label_scale out of range; using default"
            );
            self.label_scale = DEFAULT_LABEL_SCALE;
        }
    }
}

fn default_search_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\Users\\")
    } else {
        PathBuf::from("/home/")
    }
}

fn env_parse<T: std::str::FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparseable value");
            default
        }),
        None => default,
    }
}

/// Parse `RRGGBB` or `#RRGGBB`.
fn parse_color(raw: &str) -> Option<[u8; 3]> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}
