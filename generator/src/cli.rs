use std::path::PathBuf;

use clap::Parser;

use crate::sweep::{SweepSettings, DEFAULT_NAME_PATTERN};

// Setup the command line interface with clap.
#[derive(Parser, Debug)]
#[clap(name = "qsubgen", about = "QSUB script generator")]
pub struct Opt {
    /// set the log level
    #[clap(short = 'l', long = "log", default_value = "info")]
    pub log_level: String,

    /// yaml file tuning the template environment
    #[clap(long = "settings", default_value = "qsubgen.yml")]
    pub settings: PathBuf,

    /// first node count of the sweep
    #[clap(long = "min_nodes", default_value = "1", allow_negative_numbers = true)]
    pub min_nodes: i64,

    /// node count the sweep stops before
    #[clap(long = "max_nodes", allow_negative_numbers = true)]
    pub max_nodes: i64,

    /// processes per node
    #[clap(long = "ppn", default_value = "12", allow_negative_numbers = true)]
    pub ppn: i64,

    /// config file template
    #[clap(long = "cfg_tmpl")]
    pub cfg_tmpl: String,

    /// PBS job file template
    #[clap(long = "pbs_tmpl")]
    pub pbs_tmpl: String,

    #[clap(long = "config_dir", default_value = "config")]
    pub config_dir: String,

    #[clap(long = "pbs_dir", default_value = "pbs")]
    pub pbs_dir: String,

    /// template for the name of each run
    #[clap(long = "name", default_value = DEFAULT_NAME_PATTERN)]
    pub name: String,
}

impl Opt {
    pub fn sweep_settings(&self) -> SweepSettings {
        SweepSettings {
            min_nodes: self.min_nodes,
            max_nodes: self.max_nodes,
            ppn: self.ppn,
            cfg_tmpl: self.cfg_tmpl.clone(),
            pbs_tmpl: self.pbs_tmpl.clone(),
            config_dir: self.config_dir.clone(),
            pbs_dir: self.pbs_dir.clone(),
            name: self.name.clone(),
        }
    }
}
