use crate::utils::error::AppError;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Maximum email length (RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

// User document stored in the `users` collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    // Omitted from the document until linked, so `$lookup` treats it as missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_id: Option<String>,
}

// Request/Response structures
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LinkIdRequest {
    pub email: String,
    pub linked_id: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

// `validate` consumes the request and hands back the normalized form that
// every lookup and insert must use.
impl RegisterRequest {
    pub fn validate(self) -> Result<Self, AppError> {
        require_non_empty("username", &self.username)?;
        let email = validate_email(&self.email)?;
        require_non_empty("password", &self.password)?;
        Ok(Self { email, ..self })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<Self, AppError> {
        let email = validate_email(&self.email)?;
        require_non_empty("password", &self.password)?;
        Ok(Self { email, ..self })
    }
}

impl LinkIdRequest {
    pub fn validate(self) -> Result<Self, AppError> {
        let email = validate_email(&self.email)?;
        require_non_empty("linked_id", &self.linked_id)?;
        Ok(Self { email, ..self })
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Trims surrounding whitespace and lowercases the domain. The local part
/// is kept as written.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_ascii_lowercase()),
        None => email.to_string(),
    }
}

/// Shape check only: one `@`, a non-empty local part and a dotted domain.
/// Returns the normalized address.
pub fn validate_email(email: &str) -> Result<String, AppError> {
    let normalized = normalize_email(email);
    if is_valid_email(&normalized) {
        Ok(normalized)
    } else {
        Err(AppError::Validation(format!(
            "{:?} is not a valid email address",
            email
        )))
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.len() > EMAIL_MAX_LENGTH {
        return false;
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };

    if local.is_empty() || local.len() > 64 || domain.contains('@') {
        return false;
    }
    if local.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    if !domain.contains('.') {
        return false;
    }
    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return false;
    }

    domain
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'))
}
