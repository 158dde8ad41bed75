use clap::Parser;
use color_eyre::Result;
use figment::providers::{Format, Serialized, Yaml};
use figment::Figment;
use generator::cli::Opt;
use generator::sweep::Sweep;
use models::config::AppConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::parse();

    // RUST_LOG wins over --log
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("generator={0},qsubgen={0}", opt.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Yaml::file(&opt.settings))
        .extract()?;
    info!(settings = ?config.templates, "template environment");

    let sweep = Sweep::prepare(opt.sweep_settings(), &config.templates)?;
    log::info!(
        "writing configs to {}/ and job files to {}/",
        sweep.settings().config_dir,
        sweep.settings().pbs_dir
    );

    let written = sweep.for_each_run(|run| {
        log::debug!("{} -> {}", run.name, run.pbs_path.display());
    })?;
    info!("generated {} config/job file pairs", written);

    Ok(())
}
