#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    error::{
        BindListenerSnafu, LoadDotenvSnafu, RosterResult, ServeSnafu, SetTracingSubscriberSnafu,
    },
    routes::router,
    state::RosterState,
};
use snafu::{Report, ResultExt};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod config;
mod data;
mod error;
mod extract;
mod routes;
mod state;
mod store;

async fn shutdown_signal() {
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
}

async fn run() -> RosterResult<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context(LoadDotenvSnafu);
        }
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("roster=info,tower_http=info"));
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(env_filter)
            .finish(),
    )
    .context(SetTracingSubscriberSnafu)?;

    info!("`tracing` online");

    let config = RuntimeConfiguration::new()?;
    let state = RosterState::new(&config).await?;
    let server_config = config.server_config();

    let app = router(state.clone())
        .layer(CompressionLayer::new())
        .layer(server_config.cors_layer())
        .layer(TraceLayer::new_for_http());

    let server_ip = server_config.bind_address();
    let listener = TcpListener::bind(server_ip)
        .await
        .context(BindListenerSnafu { address: server_ip })?;

    info!(?server_ip, "Listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu)?;

    state.sensible_shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Report<error::RosterError>> {
    run().await.map_err(Report::from_error)
}
