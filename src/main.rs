#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    data::store::PostgresStudentStore,
    routes::{cors_layer, router},
    service::StudentService,
    state::RosterState,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod service;
mod state;

async fn shutdown_signal(state: RosterState) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
    state.begin_shutdown();
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("not loading .env file: {e}");
    }

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");

    let config = RuntimeConfiguration::new().expect("unable to create config");

    let options = PgPoolOptions::new().max_connections(15);
    let store = PostgresStudentStore::connect(options, &config.db_config())
        .await
        .expect("unable to open student store");
    let state = RosterState::new(StudentService::new(Arc::new(store)));

    let server_config = config.server_config();
    let app = router(state.clone()).layer(cors_layer(server_config.cors_origin.clone()));

    let listener = TcpListener::bind(&server_config.server_ip)
        .await
        .expect("unable to listen on server ip");

    info!(
        server_ip = ?server_config.server_ip,
        cors_origin = ?server_config.cors_origin,
        "Listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await
        .expect("unable to serve app");

    state.sensible_shutdown().await;
}
