use anyhow::Result;
use beacon_core::{HeadInjector, InjectReport, Plugin, Plugins};
use clap::{Arg, ArgMatches, Command};
use log::info;
use std::path::Path;

use crate::config::{BeaconConfig, load_build_config};

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("dir")
                .short('d')
                .long("dir")
                .value_name("DIR")
                .help("Generated site directory [default: ./build]"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./beacon.toml]"),
        )
}

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build"))
        .about("Inject plugin head tags into every page of a generated site")
}

/// Construct the configured plugins plus any host-provided ones and run one
/// injection pass over the site directory.
///
/// Plugin construction happens before any file is read, so a bad plugin
/// option aborts the build with the site untouched.
pub fn inject_site(config: &BeaconConfig, extra: Vec<Box<dyn Plugin>>) -> Result<InjectReport> {
    let mut plugins = Plugins::from_config(config.site_config())?;
    for plugin in extra {
        plugins.push(plugin);
    }
    info!("Plugins: {}", plugins.names().join(", "));

    let injector = HeadInjector::new(&plugins, &config.site_config().i18n);
    let report = injector.run(Path::new(&config.build_config().dir))?;

    info!(
        "{} pages updated, {} unchanged, {} skipped",
        report.updated, report.unchanged, report.skipped
    );

    Ok(report)
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = load_build_config(args)?;

    inject_site(&config, Vec::new())?;

    info!("Site updated in {}", config.build_config().dir);

    Ok(())
}
