use actix_web::{web, App, HttpServer};
use certs_backend::auth::JwtIdentityVerifier;
use certs_backend::config::ServiceConfig;
use certs_backend::cors::cors;
use certs_backend::services;
use certs_backend::state::AppState;
use certs_backend::store::SqliteCertificateStore;
use env_logger::Env;
use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match ServiceConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    env_logger::init_from_env(Env::default().default_filter_or(config.log_level.as_str()));

    let store = SqliteCertificateStore::open(&config.database_path).map_err(std::io::Error::other)?;
    let verifier = JwtIdentityVerifier::from_config(&config).map_err(std::io::Error::other)?;
    info!("Certificates stored in {}", config.database_path);

    let host = config.host.clone();
    let port = config.port;
    let data = web::Data::new(AppState::new(store, verifier, config));
    let config = data.config.clone();
    match config.cors_origins() {
        origins if origins.is_empty() => info!("CORS: any origin allowed"),
        origins => info!("CORS: allowed origins {:?}", origins),
    }

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&config))
            .app_data(data.clone())
            .configure(services::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
