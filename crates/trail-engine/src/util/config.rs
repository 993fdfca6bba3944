use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use trail_core::TimeRange;

use crate::graph::model::NodeMode;

/// Engine tuning knobs, persisted as TOML in the platform config dir.
/// Every field has a default so a partial (or missing) file still
/// yields a working engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub node_mode: NodeMode,
    pub default_time_range: TimeRange,

    /// Node radius bounds in world units.
    pub node_size_min: f32,
    pub node_size_max: f32,

    /// Repulsion acts within twice this distance.
    pub connection_distance: f32,
    pub repulsion: f32,
    pub spring: f32,
    pub spring_rest_length: f32,
    pub gravity: f32,
    pub damping: f32,

    pub temporal_window_ms: i64,
    pub semantic_window_ms: i64,
    pub semantic_threshold: f32,
    pub wormhole_window_ms: i64,

    pub zoom_min: f32,
    pub zoom_max: f32,
    /// World-space spiral placement for newly created nodes.
    pub spiral_angle_step: f32,
    pub spiral_base_radius: f32,
    pub spiral_radius_step: f32,
    pub placement_jitter: f32,

    /// Milliseconds between replay steps.
    pub replay_step_ms: u64,
    /// A journey summary fires every this many replay steps.
    pub summary_interval: usize,
    /// Opacity for nodes ahead of the replay cursor.
    pub dimmed_opacity: f32,

    /// Fixed seed for placement jitter and the placeholder proximity;
    /// `None` seeds from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            node_mode: NodeMode::PerDomain,
            default_time_range: TimeRange::Day,
            node_size_min: 6.0,
            node_size_max: 30.0,
            connection_distance: 150.0,
            repulsion: 200.0,
            spring: 0.05,
            spring_rest_length: 80.0,
            gravity: 0.001,
            damping: 0.9,
            temporal_window_ms: 10 * 60 * 1000,
            semantic_window_ms: 60 * 60 * 1000,
            semantic_threshold: 0.6,
            wormhole_window_ms: 5 * 60 * 1000,
            zoom_min: 0.1,
            zoom_max: 5.0,
            spiral_angle_step: 0.5,
            spiral_base_radius: 50.0,
            spiral_radius_step: 10.0,
            placement_jitter: 25.0,
            replay_step_ms: 50,
            summary_interval: 5,
            dimmed_opacity: 0.2,
            rng_seed: None,
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "trail")?;
    Some(proj.config_dir().join("engine.toml"))
}

pub fn load_or_default() -> EngineConfig {
    let Some(path) = config_file_path() else {
        return EngineConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> EngineConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return EngineConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|_| EngineConfig::default())
}

pub fn save(cfg: &EngineConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &EngineConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize engine config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write engine config {}", path.display()))?;
    Ok(())
}
