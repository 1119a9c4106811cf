use anyhow::Result;
use beacon_core::Plugins;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::load_build_config;

pub fn make_subcommand() -> Command {
    Command::new("tags")
        .about("Print the head tags the configured plugins produce")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file [default: ./beacon.toml]"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print tag descriptors as JSON")
                .action(ArgAction::SetTrue),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let config = load_build_config(args)?;
    let plugins = Plugins::from_config(config.site_config())?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&plugins.head_tags())?);
    } else {
        println!("{}", plugins.render_head());
    }

    Ok(())
}
