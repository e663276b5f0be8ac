use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Link Service API",
        version = "1.0.0",
        description = "Register and log in users, link them to an external id and list them with the items that carry that id.\n\n**Note:** login only checks credentials; no token or session is issued."
    ),
    paths(
        crate::api::users::register,
        crate::api::users::login,
        crate::api::users::link_id,
        crate::api::users::users_with_items,
        crate::api::users::delete_user,
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::LinkIdRequest,
            crate::models::MessageResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "Account registration, login, id linking and deletion."),
        (name = "Health", description = "Liveness probe."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/register",
            "/login",
            "/link_id",
            "/users_with_items",
            "/delete_user/{email}",
            "/health",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }
    }
}
