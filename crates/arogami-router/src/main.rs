
use std::sync::Arc;

use anyhow::Context;
use metrics::gauge;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod consensus;
mod context;
mod encoder;
mod ensemble;
mod normalizer;

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await { tracing::warn!(error = %e, "ctrl-c handler failed"); }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {    let env_filter=std::env::var("RUST_LOG").unwrap_or_else(|_|"info,arogami_router=debug".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .init();
    once_cell::sync::Lazy::force(&api::PROM);

    let cfg = config::Config::from_env()?;
    tracing::info!(?cfg, "configuration");
    let ctx = Arc::new(context::AppContext::load(&cfg).context("refusing to start with incomplete artifacts")?);
    gauge!("ensemble_members", ctx.ensemble().len() as f64);

    let app = api::router(ctx);
    tracing::info!(addr = %cfg.addr, "router listening");
    let listener = tokio::net::TcpListener::bind(cfg.addr).await.with_context(|| format!("binding {}", cfg.addr))?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?; Ok(())
}
