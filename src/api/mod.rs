pub mod health;
pub mod swagger;
pub mod users;

use crate::utils::error::AppError;
use actix_web::web;

/// Body extraction errors (missing fields, wrong types, bad JSON) are
/// reported like validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("❌ Rejected request body: {}", err);
        AppError::Validation(err.to_string()).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health::health_check))
        .route("/register", web::post().to(users::register))
        .route("/login", web::post().to(users::login))
        .route("/link_id", web::post().to(users::link_id))
        .route("/users_with_items", web::get().to(users::users_with_items))
        .route("/delete_user/{email}", web::delete().to(users::delete_user));
}
