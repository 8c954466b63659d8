mod cli;

use actix_web::{web, App, HttpServer};
use clap::Parser;
use cli::{Cli, Command};
use roster::Store;
use std::sync::Mutex;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    let args = Cli::parse();
    let config = args.config();

    if let Err(e) = roster::logging::init(&config.log_filter) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // A corrupt snapshot aborts rather than starting empty and overwriting it
    let mut store = match Store::load(&config.snapshot) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error loading '{}': {}", config.snapshot.display(), e);
            std::process::exit(1);
        }
    };

    match args.command.unwrap_or(Command::Repl) {
        Command::Repl => cli::run_repl(&mut store),
        Command::Serve { bind } => {
            info!(%bind, snapshot = %config.snapshot.display(), "starting api server");
            let data = web::Data::new(Mutex::new(store));
            HttpServer::new(move || App::new().app_data(data.clone()).configure(roster::server::config))
                .bind(bind)?
                .run()
                .await?;
        }
        command => {
            if !cli::execute_command(&mut store, command) {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
