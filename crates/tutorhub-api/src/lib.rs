//! # tutorhub-api
//!
//! HTTP API layer for the TutorHub materials library built on Axum.
//!
//! Provides the material endpoints, middleware (CORS, compression,
//! request logging), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Backend, build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
