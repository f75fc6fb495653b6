//! Axum-based HTTP server.
//!
//! This module contains the request handlers, the application state passed
//! to them, and the router wiring (routes, CORS, tracing, optional static
//! file serving).

pub mod handlers;
pub mod routes;

pub use handlers::{health_handler, image_handler, AppState, ErrorResponse, HealthResponse};
pub use routes::{create_router, RouterConfig};
