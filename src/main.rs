mod api;
mod database;
mod middleware;
mod models;
mod services;
mod settings;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::database::{MongoDB, UserStore};
use crate::services::PasswordHasher;
use crate::settings::Settings;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::new().map_err(io::Error::other)?;

    log::info!("🚀 Starting User Link Service...");
    log::info!("📊 Connecting to the MongoDB database ({})...", settings.mongo_database);

    let db = MongoDB::new(&settings.mongo_details, &settings.mongo_database)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to MongoDB: {}", e)))?;

    log::info!("✅ MongoDB connected successfully");

    let store: Arc<dyn UserStore> = Arc::new(db.clone());
    let store_data: web::Data<dyn UserStore> = web::Data::from(store);
    let hasher = PasswordHasher::new(settings.bcrypt_cost).map_err(io::Error::other)?;
    let hasher_data = web::Data::new(hasher);

    let bind_address = settings.bind_address();
    log::info!("🌐 Server starting on {}", bind_address);
    log::info!("📚 Swagger UI available at: http://{}/swagger-ui/", bind_address);

    let cors_origins = settings.cors_origins();

    let result = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(store_data.clone())
            .app_data(hasher_data.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi),
            )
            .configure(api::configure)
    })
    .bind(&bind_address)?
    .run()
    .await;

    db.shutdown().await;

    result
}
