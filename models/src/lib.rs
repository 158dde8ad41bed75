use derive_more::Display;
use serde::{Deserialize, Serialize};

pub mod config;

/// Mesh variant a run is generated for.
#[derive(Serialize, Deserialize, Display, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Mesh {
    #[display("static")]
    Static,
    #[display("dynamic")]
    Dynamic,
}

impl Mesh {
    /// Every variant, in sweep order.
    pub const ALL: [Mesh; 2] = [Mesh::Static, Mesh::Dynamic];
}

/// The flat mapping every template of a run is rendered against.
///
/// `name` and `config` stay out of the serialized map until they are known,
/// so a template that reads them too early fails as undefined.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunProperties {
    pub mesh: Mesh,
    pub nodes: i64,
    pub ppn: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl RunProperties {
    pub fn new(mesh: Mesh, nodes: i64, ppn: i64) -> Self {
        Self {
            mesh,
            nodes,
            ppn,
            name: None,
            config: None,
        }
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn with_config(&self, config: impl Into<String>) -> Self {
        Self {
            config: Some(config.into()),
            ..self.clone()
        }
    }
}
