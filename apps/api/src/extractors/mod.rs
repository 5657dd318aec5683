pub mod auth;
pub mod json;

pub use auth::{AuthUser, CronAuth, CronSecret, JwtKeys};
pub use json::AppJson;
