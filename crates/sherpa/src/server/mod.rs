//! REST API module for the insight service
//!
//! Uses axum for routing; generation and persistence sit behind traits so the
//! handlers can be exercised against in-process fakes.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routing;
pub mod services;
pub mod startup;
pub mod state;
pub mod store;
pub mod types;
