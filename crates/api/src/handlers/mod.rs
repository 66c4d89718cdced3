pub mod auth;
pub mod slot;
pub mod swap;
