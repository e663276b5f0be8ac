// ==================== USER ACCOUNTS ====================
// Register, login, link an external id, join users with their items and
// delete users. Handlers validate input before calling in here.

use crate::{
    database::{document_to_json, UserStore},
    models::{normalize_email, LinkIdRequest, LoginRequest, RegisterRequest, User},
    services::password::PasswordHasher,
    utils::error::AppError,
};

// bcrypt is CPU-bound; keep it off the async workers.
async fn hash_password(hasher: &PasswordHasher, plaintext: &str) -> Result<String, AppError> {
    let hasher = hasher.clone();
    let plaintext = plaintext.to_string();
    tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
        .await
        .map_err(|e| AppError::HashError(e.to_string()))?
}

/// With no stored hash the decoy is verified instead, so both failure paths
/// pay for one bcrypt round.
async fn verify_password(
    hasher: &PasswordHasher,
    plaintext: &str,
    hashed: Option<&str>,
) -> Result<bool, AppError> {
    let hasher = hasher.clone();
    let plaintext = plaintext.to_string();
    let hashed = hashed.map(str::to_string);
    tokio::task::spawn_blocking(move || match hashed {
        Some(hashed) => hasher.verify(&plaintext, &hashed),
        None => hasher.verify_decoy(&plaintext),
    })
    .await
    .map_err(|e| AppError::HashError(e.to_string()))
}

/// Lookup and insert are separate calls, so two concurrent registrations
/// for the same email can both succeed.
pub async fn register(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    request: &RegisterRequest,
) -> Result<(), AppError> {
    let hashed_password = hash_password(hasher, &request.password).await?;

    if store.find_user_by_email(&request.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user = User {
        id: None,
        username: request.username.clone(),
        email: request.email.clone(),
        hashed_password,
        linked_id: None,
    };

    store.insert_user(&user).await?;
    log::info!("✅ User registered: {}", user.email);
    Ok(())
}

/// Unknown email and wrong password fail with the same error.
pub async fn login(
    store: &dyn UserStore,
    hasher: &PasswordHasher,
    request: &LoginRequest,
) -> Result<(), AppError> {
    let user = store.find_user_by_email(&request.email).await?;
    let stored_hash = user.as_ref().map(|u| u.hashed_password.as_str());

    if !verify_password(hasher, &request.password, stored_hash).await? {
        return Err(AppError::InvalidCredentials);
    }

    Ok(())
}

pub async fn link_id(store: &dyn UserStore, request: &LinkIdRequest) -> Result<(), AppError> {
    if store.find_user_by_email(&request.email).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    store.set_linked_id(&request.email, &request.linked_id).await?;
    log::info!("🔗 Linked id {} to {}", request.linked_id, request.email);
    Ok(())
}

pub async fn users_with_items(store: &dyn UserStore) -> Result<Vec<serde_json::Value>, AppError> {
    let users = store.users_with_items().await?;
    Ok(users.into_iter().map(document_to_json).collect())
}

/// Removes the user, then its items. The second delete is a separate call:
/// a failure in between leaves the items orphaned.
pub async fn delete_user(store: &dyn UserStore, email: &str) -> Result<(), AppError> {
    let email = &normalize_email(email);
    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    store.delete_user_by_email(email).await?;
    log::info!("🗑️ User {} deleted from users collection", email);

    match &user.linked_id {
        Some(linked_id) => {
            let deleted = store.delete_items_by_user_id(linked_id).await?;
            log::info!("✅ Deleted {} items linked to {}", deleted, linked_id);
        }
        None => log::debug!("User {} had no linked id, no items to delete", email),
    }

    Ok(())
}
