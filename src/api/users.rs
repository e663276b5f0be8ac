use actix_web::{web, HttpResponse, ResponseError};
use crate::{
    database::UserStore,
    models::{LinkIdRequest, LoginRequest, MessageResponse, RegisterRequest},
    services::{password::PasswordHasher, user_service},
    utils::error::AppError,
};

fn failure(action: &str, subject: &str, e: AppError) -> HttpResponse {
    match e {
        AppError::DatabaseError(_) | AppError::HashError(_) => {
            log::error!("❌ {} failed: {} - {}", action, subject, e)
        }
        _ => log::warn!("❌ {} failed: {} - {}", action, subject, e),
    }
    e.error_response()
}

#[utoipa::path(
    post,
    path = "/register",
    tag = "Users",
    description = "Register a new user",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Email already registered"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn register(
    store: web::Data<dyn UserStore>,
    hasher: web::Data<PasswordHasher>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    log::info!("📝 POST /register - email: {}", request.email);

    let submitted = request.email.clone();
    let request = match request.into_inner().validate() {
        Ok(request) => request,
        Err(e) => return failure("Registration", &submitted, e),
    };

    match user_service::register(store.get_ref(), hasher.get_ref(), &request).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("User registered successfully")),
        Err(e) => failure("Registration", &request.email, e),
    }
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Users",
    description = "Login an existing user",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = MessageResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn login(
    store: web::Data<dyn UserStore>,
    hasher: web::Data<PasswordHasher>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    log::info!("🔐 POST /login - email: {}", request.email);

    let submitted = request.email.clone();
    let request = match request.into_inner().validate() {
        Ok(request) => request,
        Err(e) => return failure("Login", &submitted, e),
    };

    match user_service::login(store.get_ref(), hasher.get_ref(), &request).await {
        Ok(()) => {
            log::info!("✅ Login successful: {}", request.email);
            HttpResponse::Ok().json(MessageResponse::new("Login successful"))
        }
        Err(e) => failure("Login", &request.email, e),
    }
}

#[utoipa::path(
    post,
    path = "/link_id",
    tag = "Users",
    description = "Link an ID to a user",
    request_body = LinkIdRequest,
    responses(
        (status = 200, description = "ID linked successfully", body = MessageResponse),
        (status = 400, description = "User not found"),
        (status = 422, description = "Invalid request body")
    )
)]
pub async fn link_id(
    store: web::Data<dyn UserStore>,
    request: web::Json<LinkIdRequest>,
) -> HttpResponse {
    log::info!("🔗 POST /link_id - email: {}", request.email);

    let submitted = request.email.clone();
    let request = match request.into_inner().validate() {
        Ok(request) => request,
        Err(e) => return failure("Link id", &submitted, e),
    };

    match user_service::link_id(store.get_ref(), &request).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("ID linked successfully")),
        Err(e) => failure("Link id", &request.email, e),
    }
}

#[utoipa::path(
    get,
    path = "/users_with_items",
    tag = "Users",
    description = "Get users with their items",
    responses(
        (status = 200, description = "Every user with a `user_items` array")
    )
)]
pub async fn users_with_items(store: web::Data<dyn UserStore>) -> HttpResponse {
    log::info!("📋 GET /users_with_items");

    match user_service::users_with_items(store.get_ref()).await {
        Ok(users) => {
            log::info!("✅ Listed {} users", users.len());
            HttpResponse::Ok().json(users)
        }
        Err(e) => failure("Listing users", "-", e),
    }
}

#[utoipa::path(
    delete,
    path = "/delete_user/{email}",
    tag = "Users",
    description = "Delete a user and associated data",
    params(
        ("email" = String, Path, description = "Email of the user to delete")
    ),
    responses(
        (status = 200, description = "User and associated data deleted successfully", body = MessageResponse),
        (status = 400, description = "User not found")
    )
)]
pub async fn delete_user(
    store: web::Data<dyn UserStore>,
    email: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /delete_user/{}", email);

    match user_service::delete_user(store.get_ref(), &email).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new(
            "User and associated data deleted successfully",
        )),
        Err(e) => failure("Delete user", &email, e),
    }
}
