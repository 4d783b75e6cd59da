/// Service layer modules
pub mod auth;

pub use auth::AuthService;
