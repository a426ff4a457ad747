use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use chrono::Local;
use std::sync::Arc;

mod api;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod routes;
mod schedule;
mod store;
mod utils;

use config::Config;
use db::init_db;
use schedule::{events, service::BreakService};
use store::mysql::MySqlStore;

use crate::docs::ApiDoc;
use tracing::{debug, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Break rotation service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;
    let (service, schedule_events) =
        BreakService::new(Arc::new(MySqlStore::new(pool)), config.schedule_cache_ttl);
    let service = Arc::new(service);

    actix_web::rt::spawn(events::run_worker(service.clone(), schedule_events));

    // first tick fires immediately, so a stale marker is caught at startup
    let rotation_service = service.clone();
    let check_interval = config.rotation_check_interval;
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(check_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = rotation_service
                .rotate_monthly_break_times(Local::now().date_naive())
                .await
            {
                debug!(error = %e, "Rotation check failed, retrying on next tick");
            }
        }
    });

    let server_addr = config.server_addr.clone();
    let service_data = Data::from(service);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(service_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
