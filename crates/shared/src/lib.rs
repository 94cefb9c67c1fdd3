//! Shared types, configuration, and JWT handling for Kakebo.
//!
//! This crate provides common types used across all other crates:
//! - The `Period` budget key (month/year)
//! - JWT claims and token service for the API layer
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::AppConfig;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{DEFAULT_CURRENCY, Period};
