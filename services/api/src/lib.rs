//! Tutor API Library Crate
//!
//! HTTP hosting for the lesson pipeline: configuration from the environment,
//! the lesson endpoint, artifact serving and routing. The `api` binary is a
//! thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
