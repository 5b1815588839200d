use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::sync::Arc;

mod api;
mod capture;
mod config;
mod db;
mod docs;
mod model;
mod reconcile;
mod routes;
mod scheduler;
mod store;
#[cfg(test)]
mod test_support;

use config::Config;
use db::init_db;

use crate::capture::AttendanceCapture;
use crate::docs::ApiDoc;
use crate::reconcile::ReconciliationEngine;
use crate::scheduler::{Scheduler, local_now};
use crate::store::AttendanceStore;
use crate::store::mysql::MySqlStore;
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[derive(Parser)]
#[command(version, about = "Reconciles teacher attendance against the published timetable")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one reconciliation pass and exit (the default)
    Reconcile {
        /// Reconcile as of this local moment instead of now, e.g. "2026-01-05 10:05:00"
        #[arg(long, value_parser = parse_moment)]
        at: Option<NaiveDateTime>,
    },
    /// Serve the HTTP API and reconcile on a fixed interval
    Serve,
    /// Apply database migrations and exit
    Migrate,
}

fn parse_moment(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Rolling daily log, mirrored to stderr
    let file_appender = rolling::daily(&config.log_dir, "reconcile.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking.and(std::io::stderr))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    let store = Arc::new(MySqlStore::new(pool.clone()));
    let engine = ReconciliationEngine::new(store.clone(), store.clone(), config.attendance);

    match cli.command.unwrap_or(Command::Reconcile { at: None }) {
        Command::Migrate => {
            db::migrate(&pool).await.context("failed to apply migrations")?;
            info!("Migrations applied");
        }
        Command::Reconcile { at } => {
            let now = at.unwrap_or_else(local_now);
            engine
                .run_bounded(now, config.reconcile_timeout)
                .await
                .context("reconciliation pass failed")?;
        }
        Command::Serve => serve(config, pool, store, engine).await?,
    }
    Ok(())
}

async fn serve(
    config: Config,
    pool: sqlx::MySqlPool,
    store: Arc<MySqlStore>,
    engine: ReconciliationEngine,
) -> anyhow::Result<()> {
    db::migrate(&pool).await.context("failed to apply migrations")?;

    let capture_limit = routes::capture_limit(config.rate_capture_per_min)
        .context("invalid RATE_CAPTURE_PER_MIN")?;
    let capture = AttendanceCapture::new(store.clone(), store.clone());
    let records: Arc<dyn AttendanceStore> = store;

    let scheduler = Scheduler::new(
        engine.clone(),
        config.reconcile_interval,
        config.reconcile_timeout,
        Arc::new(local_now),
    );
    actix_web::rt::spawn(scheduler.run());

    info!(addr = %config.server_addr, "Server starting...");

    let server_addr = config.server_addr.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(config.clone()))
            .app_data(Data::new(engine.clone()))
            .app_data(Data::new(capture.clone()))
            .app_data(Data::from(records.clone()))
            .configure(|cfg| routes::configure(cfg, &config.api_prefix, &capture_limit))
    })
    .bind(server_addr)?
    .run()
    .await?;
    Ok(())
}
