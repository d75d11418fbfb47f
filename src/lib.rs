//! Foilpress library crate.
//!
//! Exposes the API router, database layer, and ledger services so the
//! binary and the integration tests share one wiring.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
