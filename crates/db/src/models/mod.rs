//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` request bodies accepted by the API
//! - Validated insert/update DTOs handed to the repositories

pub mod slot;
pub mod swap_request;
pub mod user;
