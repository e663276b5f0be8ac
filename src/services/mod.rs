pub mod password;
pub mod user_service;

pub use password::PasswordHasher;
