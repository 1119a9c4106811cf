mod cmd;
mod config;

use anyhow::Result;
use clap::Command;

fn cli() -> Command {
    Command::new("beacon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inject analytics and site metadata head tags into a generated static site")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
        .subcommand(cmd::tags::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        Some(("tags", args)) => cmd::tags::execute(args),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        cli().debug_assert();
    }

    #[test]
    fn test_serve_args() {
        let matches = cli()
            .try_get_matches_from(["beacon", "serve", "-d", "./public", "-p", "4000", "--open"])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "serve");
        assert_eq!(args.get_one::<String>("dir").unwrap(), "./public");
        assert_eq!(args.get_one::<String>("port").unwrap(), "4000");
        assert!(args.get_flag("open"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(cli().try_get_matches_from(["beacon"]).is_err());
    }
}
