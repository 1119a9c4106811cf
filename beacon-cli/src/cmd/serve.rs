use anyhow::Result;
use beacon_core::Plugin;
use beacon_dev_server::{LiveReload, LiveServer, LiveServerConfig};
use clap::{Arg, ArgMatches, Command};
use log::{debug, error, info};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};
use std::{path::PathBuf, time::Duration};

use super::build::{add_build_args, inject_site};
use crate::config::{BeaconConfig, load_serve_config};

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("serve"))
        .about("Serve the site with live reload, re-injecting head tags on change")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on [default: 3000]"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to [default: 127.0.0.1]"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

fn dev_plugins(config: &BeaconConfig) -> Vec<Box<dyn Plugin>> {
    let build = config.build_config();
    vec![Box::new(LiveReload::new(build.host.clone(), build.port))]
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = load_serve_config(args)?;
    let build_config = config.build_config();

    // Configuration errors surface here, before the server starts
    inject_site(&config, dev_plugins(&config))?;

    let server_config = LiveServerConfig {
        host: build_config.host.clone(),
        port: build_config.port,
        root: PathBuf::from(&build_config.dir),
        open: build_config.open,
        ignore: vec![".git".to_string(), ".tmp".to_string()],
    };

    let server = LiveServer::new(server_config);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!("Dev server error: {}", e);
        }
    });

    // Watch the site and config, re-run the plugins and injection on changes
    let watcher_args = args.clone();
    let watcher_handle = tokio::spawn(async move {
        if let Err(e) = watch_site(watcher_args).await {
            error!("Site watcher error: {}", e);
        }
    });

    let _ = tokio::try_join!(server_handle, watcher_handle)?;

    Ok(())
}

async fn watch_site(args: ArgMatches) -> Result<()> {
    let config = load_serve_config(&args)?;
    let site_dir = PathBuf::from(&config.build_config().dir);
    let config_file = PathBuf::from(&config.build_config().config);

    let (tx, mut rx) = tokio::sync::mpsc::channel(100);

    let mut debouncer = new_debouncer(
        Duration::from_millis(500),
        move |res: DebounceEventResult| {
            if let Ok(events) = res {
                for event in events {
                    let _ = tx.blocking_send(event.path);
                }
            }
        },
    )?;

    debouncer
        .watcher()
        .watch(&site_dir, RecursiveMode::Recursive)?;
    info!("Watching site directory: {}", site_dir.display());

    if config_file.exists() {
        debouncer
            .watcher()
            .watch(&config_file, RecursiveMode::NonRecursive)?;
        info!("Watching config file: {}", config_file.display());
    }

    let abs_config_file = config_file.canonicalize().unwrap_or(config_file.clone());

    while let Some(path) = rx.recv().await {
        let abs_path = path.canonicalize().unwrap_or(path.clone());
        if !is_relevant_change(&abs_path, &abs_config_file) {
            debug!("Skipping change: {}", path.display());
            continue;
        }
        debug!("Changed: {}", path.display());

        // Config may have changed: reload it and rebuild the plugin set
        let config = match load_serve_config(&args) {
            Ok(config) => config,
            Err(e) => {
                error!("Config error: {}", e);
                continue;
            }
        };

        // Rewrites of unchanged pages are skipped, so our own writes settle
        match inject_site(&config, dev_plugins(&config)) {
            Ok(report) if report.updated > 0 => info!("Site re-injected"),
            Ok(_) => {}
            Err(e) => error!("Injection error: {}", e),
        }
    }

    Ok(())
}

fn is_relevant_change(path: &std::path::Path, config_file: &std::path::Path) -> bool {
    path == config_file
        || path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("html"))
            .unwrap_or(false)
}
