use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Default, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct AppConfig {
    pub templates: TemplateConfig,
}

/// Settings of the environment file templates are loaded into.
#[derive(Deserialize, Serialize, Clone, PartialEq, Debug)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory template paths are resolved against.
    pub search_path: PathBuf,
    pub trim_blocks: bool,
    pub lstrip_blocks: bool,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            search_path: PathBuf::from("."),
            trim_blocks: true,
            lstrip_blocks: false,
        }
    }
}
