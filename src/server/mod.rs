// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Local REST surface.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `POST` | `/plug/{device_id}` | `{"is_active": bool}` |
//! | `GET` | `/plug/{device_id}` | `{"is_active": bool}` |
//! | `GET` | `/plugs` | list of plug group summaries |
//! | `GET` | `/smartplug` | first plug group, or a message when there is none |
//!
//! Failures answer with `{"error": kind, "message": text}`.

mod error;
mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::dispatch::Dispatcher;

pub use error::ApiError;
pub use handlers::{PlugCommandRequest, PlugStateResponse, PlugSummary, SmartPlugInfo};

/// Shared state passed to all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The command pipeline.
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Wraps `dispatcher` for sharing across handlers.
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Builds the router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/plug/{device_id}",
            get(handlers::plug_state).post(handlers::switch_plug),
        )
        .route("/plugs", get(handlers::list_plugs))
        .route("/smartplug", get(handlers::smart_plug))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
