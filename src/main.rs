mod config;
mod db;
mod entities;
mod error;
mod fixtures;
mod models;
mod routes;
mod server;
mod shutdown;
mod store;
mod templates;
mod version;

use clap::Parser;

use crate::config::{Cli, Command, Config};

pub struct AppState<R> {
    pub repo: R,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movie_journal=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => server::run(Config::from_args(args)?).await,
        Command::Version => {
            println!("{}", version::BuildInfo::current());
            Ok(())
        },
    }
}
