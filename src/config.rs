use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "movie-journal", about = "A personal movie-watching diary served as HTML fragments")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the web server
    Serve(ServeArgs),
    /// Print version and build information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "movie-journal.db")]
    pub db: PathBuf,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Insert sample entries when the diary is empty
    #[arg(long)]
    pub seed: bool,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    pub seed: bool,
}

impl Config {
    pub fn from_args(args: ServeArgs) -> anyhow::Result<Self> {
        let addr = format!("{}:{}", args.host, args.port).parse().context("HOST/PORT")?;
        Ok(Self { addr, database_path: args.db, static_dir: args.static_dir, seed: args.seed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Command::Serve(args) => args,
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn serve_flags_build_config() {
        let args = serve_args(&[
            "movie-journal",
            "serve",
            "-p",
            "9090",
            "-d",
            "/tmp/diary.db",
            "--host",
            "127.0.0.1",
            "--static-dir",
            "assets",
            "--seed",
        ]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.addr, "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.database_path, PathBuf::from("/tmp/diary.db"));
        assert_eq!(config.static_dir, PathBuf::from("assets"));
        assert!(config.seed);
    }

    #[test]
    fn bad_host_is_reported() {
        let args = serve_args(&["movie-journal", "serve", "--host", "not a host", "-p", "80"]);
        let err = Config::from_args(args).unwrap_err();
        assert!(err.to_string().contains("HOST/PORT"));
    }

    #[test]
    fn bad_port_is_rejected_by_parser() {
        assert!(Cli::try_parse_from(["movie-journal", "serve", "-p", "99999"]).is_err());
    }

    #[test]
    fn version_subcommand_parses() {
        let cli = Cli::try_parse_from(["movie-journal", "version"]).unwrap();
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["movie-journal"]).is_err());
    }
}
