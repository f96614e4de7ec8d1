use easel_scene::Detail;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "easel.config.json";

/// Engine configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Gap left between an auto-placed node and its nearest sibling
    #[serde(default = "default_placement_gap")]
    pub placement_gap: f64,

    /// Detail level used when a request does not name one
    #[serde(default)]
    pub default_detail: Detail,

    /// Hard cap on query results, applied after the caller's maxResults
    #[serde(default)]
    pub max_results_ceiling: Option<usize>,
}

fn default_placement_gap() -> f64 {
    20.0
}

impl EngineConfig {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: EngineConfig = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(EngineConfig::default())
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            placement_gap: default_placement_gap(),
            default_detail: Detail::default(),
            max_results_ceiling: None,
        }
    }
}
