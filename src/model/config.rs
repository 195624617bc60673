use serde::{Deserialize, Serialize};

/// Configuration from treetable.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

/// What an external task-list change does to selection and expansion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// Clear both sets
    #[default]
    Full,
    /// Drop only IDs that no longer exist
    Partial,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub reset_policy: ResetPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Spaces per nesting level
    #[serde(default = "default_indent")]
    pub indent: usize,
    /// Names wider than this are truncated with `…` (0 = no limit)
    #[serde(default = "default_max_name_width")]
    pub max_name_width: usize,
    /// Render every node expanded regardless of the expanded set
    #[serde(default)]
    pub expand_all: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            indent: default_indent(),
            max_name_width: default_max_name_width(),
            expand_all: false,
        }
    }
}

fn default_indent() -> usize {
    2
}

fn default_max_name_width() -> usize {
    60
}
