//! Domain building blocks shared by the database and API crates.
//!
//! - [`error`] -- the domain error taxonomy.
//! - [`slot`] -- slot status values and the status state machine.
//! - [`swap`] -- swap request status values and the pure swap rules.
//! - [`types`] -- id and timestamp aliases.

pub mod error;
pub mod slot;
pub mod swap;
pub mod types;
