//! The node-count by mesh sweep.
//!
//! Every `(nodes, mesh)` pair in `[min_nodes, max_nodes) x Mesh::ALL` gets a
//! rendered config file and a rendered PBS file named after the rendered run
//! name. The first failure aborts the whole sweep.

use std::path::{Path, PathBuf};

use models::config::TemplateConfig;
use models::{Mesh, RunProperties};
use tracing::{debug, info};

use crate::error::Result;
use crate::fsutil::{ensure_dir, write_rendered};
use crate::template::{CompiledTemplate, TemplateLoader};

pub const DEFAULT_NAME_PATTERN: &str = "m_{{ mesh }}_n_{{ nodes }}";

/// Resolved parameters of one generator invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSettings {
    pub min_nodes: i64,
    pub max_nodes: i64,
    pub ppn: i64,
    pub cfg_tmpl: String,
    pub pbs_tmpl: String,
    pub config_dir: String,
    pub pbs_dir: String,
    pub name: String,
}

impl SweepSettings {
    /// Settings with the command line defaults for everything optional.
    pub fn new(max_nodes: i64, cfg_tmpl: impl Into<String>, pbs_tmpl: impl Into<String>) -> Self {
        Self {
            min_nodes: 1,
            max_nodes,
            ppn: 12,
            cfg_tmpl: cfg_tmpl.into(),
            pbs_tmpl: pbs_tmpl.into(),
            config_dir: "config".to_string(),
            pbs_dir: "pbs".to_string(),
            name: DEFAULT_NAME_PATTERN.to_string(),
        }
    }

    /// Number of runs the sweep covers. Wide enough for any `i64` range.
    pub fn run_count(&self) -> u128 {
        let nodes = (i128::from(self.max_nodes) - i128::from(self.min_nodes)).max(0);
        nodes.unsigned_abs() * Mesh::ALL.len() as u128
    }
}

/// The files written for one `(nodes, mesh)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedRun {
    pub name: String,
    pub mesh: Mesh,
    pub nodes: i64,
    pub cfg_path: PathBuf,
    pub pbs_path: PathBuf,
}

pub struct Sweep {
    settings: SweepSettings,
    cfg_tmpl: CompiledTemplate,
    pbs_tmpl: CompiledTemplate,
    name_tmpl: CompiledTemplate,
}

impl Sweep {
    /// Loads all three templates. Nothing touches the output directories
    /// until [`Sweep::run`].
    pub fn prepare(settings: SweepSettings, templates: &TemplateConfig) -> Result<Self> {
        let loader = TemplateLoader::new(templates);
        let cfg_tmpl = loader.load(&settings.cfg_tmpl)?;
        let pbs_tmpl = loader.load(&settings.pbs_tmpl)?;
        let name_tmpl = TemplateLoader::inline(&settings.name)?;

        Ok(Self {
            settings,
            cfg_tmpl,
            pbs_tmpl,
            name_tmpl,
        })
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Runs the sweep in order: ascending node counts, static before dynamic.
    /// Each finished run is handed to `on_run`; returns how many were written.
    pub fn for_each_run<F>(&self, mut on_run: F) -> Result<u64>
    where
        F: FnMut(GeneratedRun),
    {
        let settings = &self.settings;
        info!(
            min_nodes = settings.min_nodes,
            max_nodes = settings.max_nodes,
            ppn = settings.ppn,
            runs = %settings.run_count(),
            cfg_tmpl = self.cfg_tmpl.name(),
            pbs_tmpl = self.pbs_tmpl.name(),
            "starting sweep"
        );

        let mut written = 0;
        for nodes in settings.min_nodes..settings.max_nodes {
            for mesh in Mesh::ALL {
                on_run(self.generate(mesh, nodes)?);
                written += 1;
            }
        }

        info!(runs = written, "sweep finished");
        Ok(written)
    }

    /// Runs the sweep and collects every generated run.
    pub fn run(&self) -> Result<Vec<GeneratedRun>> {
        let mut runs = Vec::new();
        self.for_each_run(|run| runs.push(run))?;
        Ok(runs)
    }

    /// Renders and writes the config and PBS file of a single run.
    pub fn generate(&self, mesh: Mesh, nodes: i64) -> Result<GeneratedRun> {
        let settings = &self.settings;

        let props = RunProperties::new(mesh, nodes, settings.ppn);
        let name = self.name_tmpl.render(&props)?;
        let props = props.with_name(name.clone());

        // Re-checked for every run.
        ensure_dir(Path::new(&settings.config_dir))?;
        ensure_dir(Path::new(&settings.pbs_dir))?;

        let cfg_filename = format!("{}/{}.cfg", settings.config_dir, name);
        let pbs_filename = format!("{}/{}.pbs", settings.pbs_dir, name);
        debug!(%mesh, nodes, name = %name, "generating run");

        let cfg_path = PathBuf::from(&cfg_filename);
        write_rendered(&cfg_path, &self.cfg_tmpl.render(&props)?)?;

        let pbs_path = PathBuf::from(&pbs_filename);
        let pbs_props = props.with_config(cfg_filename);
        write_rendered(&pbs_path, &self.pbs_tmpl.render(&pbs_props)?)?;

        Ok(GeneratedRun {
            name,
            mesh,
            nodes,
            cfg_path,
            pbs_path,
        })
    }
}

/// Loads the templates and runs the full sweep.
pub fn run_sweep(settings: SweepSettings, templates: &TemplateConfig) -> Result<Vec<GeneratedRun>> {
    Sweep::prepare(settings, templates)?.run()
}
