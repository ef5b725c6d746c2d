use serde::Deserialize;

use crate::limits::ResourceLimits;

/// Application configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Resource limits section
    #[serde(default)]
    pub limits: ResourceLimits,

    /// Relationship graph output section
    #[serde(default)]
    pub graph: GraphConfig,
}

/// Relationship graph output section
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Graphviz `rankdir` for generated DOT text
    #[serde(default = "default_rank_dir")]
    pub rank_dir: String,

    /// Group components into clusters by their `group` attribute
    #[serde(default = "default_true")]
    pub cluster_groups: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            rank_dir: default_rank_dir(),
            cluster_groups: true,
        }
    }
}

fn default_rank_dir() -> String {
    "LR".to_string()
}

fn default_true() -> bool {
    true
}
