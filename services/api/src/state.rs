//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the lesson pipeline
//! shared by all handlers.

use std::sync::Arc;
use tutor_core::TutorPipeline;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<TutorPipeline>,
}
