mod config;
mod error;
mod job_controller;
mod services;
mod store;

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use crate::services::data_sources::sheet::SheetClient;
use crate::store::LeadStore;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let store = LeadStore::new(&config.database_path);
    if let Err(e) = store.init() {
        error!("Could not open {}: {}", store.path().display(), e);
        return Err(std::io::Error::other(e.to_string()));
    }

    let sheets = SheetClient::new(config.fetch_timeout)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    match config.sheet_url.as_deref() {
        Some(link) => info!("Merging leads from spreadsheet {}", link),
        None => warn!("LEADSYNC_SHEET_URL is not set; only stored leads will be listed"),
    }

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        job_controller::state::start_job_updater(updater_state, rx).await;
    });

    let bind = (config.host.clone(), config.port);
    let limit = config.upload_limit_bytes;
    info!("Server running at {}", config.url());

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(limit))
            .app_data(web::Data::new(jobs_state.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(sheets.clone()))
            .service(services::leads::configure_routes())
            .service(services::data_sources::csv::configure_routes())
            .service(services::data_sources::sheet::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
