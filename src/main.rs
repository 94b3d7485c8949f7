mod api;
mod blockchain;
mod config;
mod error;
mod observer;
mod session;

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{debug, info};
use tokio::net::TcpListener;

use api::AppState;
use blockchain::{Block, ChainStore, Miner, Sleep};
use config::Config;
use error::AppError;
use observer::{ChainObserver, LogObserver};

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    let _ = dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let observer: Arc<dyn ChainObserver> = Arc::new(LogObserver);

    let genesis = Block::genesis();
    debug!("genesis block: {genesis:#?}");
    let store = Arc::new(ChainStore::new(
        genesis,
        config.difficulty,
        config.snapshot_capacity,
        Arc::clone(&observer),
    ));
    let miner = Arc::new(Miner::new(
        config.difficulty,
        Sleep(config.mine_delay),
        observer,
    ));

    let listener = TcpListener::bind((config.host.as_str(), config.tcp_port)).await?;
    info!(
        "⛓️ Accepting sessions on tcp://{}:{} (difficulty {})",
        config.host,
        config.tcp_port,
        miner.difficulty()
    );

    let state = web::Data::new(AppState::new(Arc::clone(&store)));
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.http_port))?
    .run();
    info!(
        "⛓️ Serving the chain at http://{}:{}",
        config.host, config.http_port
    );

    let outcome = tokio::select! {
        served = server => served.map_err(AppError::from),
        sessions = session::serve(listener, store, Arc::clone(&miner)) => {
            sessions.map_err(AppError::from)
        }
    };

    // let any blocked mining search return
    miner.stop();
    outcome
}
