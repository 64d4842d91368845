// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::{Error, ValidationError};

/// Handler error carrying its HTTP status mapping.
#[derive(Debug)]
pub struct ApiError(Error);

impl ApiError {
    /// Returns the status code and error kind for this error.
    #[must_use]
    pub fn status(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            Error::Auth(_) => (StatusCode::SERVICE_UNAVAILABLE, "auth_unavailable"),
            Error::Upstream(_) => (StatusCode::SERVICE_UNAVAILABLE, "upstream_unavailable"),
            Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "state_store_error"),
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl<E: Into<Error>> From<E> for ApiError {
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status();
        let message = match &self.0 {
            Error::Validation(e) => e.to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

/// Converts a body rejection into a validation error.
pub(super) fn malformed_body(message: impl Into<String>) -> ApiError {
    ApiError(ValidationError::Body(message.into()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, AuthFailure, UpstreamError};

    #[test]
    fn status_mapping() {
        let validation = ApiError::from(ValidationError::SwitchValue);
        assert_eq!(validation.status().0, StatusCode::BAD_REQUEST);

        let auth = ApiError::from(AuthError::Exhausted {
            attempts: 3,
            last: AuthFailure::Timeout,
        });
        assert_eq!(auth.status().0, StatusCode::SERVICE_UNAVAILABLE);

        let upstream = ApiError::from(UpstreamError::Status(502));
        assert_eq!(upstream.status().0, StatusCode::SERVICE_UNAVAILABLE);

        let store = ApiError::from(crate::error::StoreError::Io {
            path: "states".into(),
            source: std::io::Error::other("disk full"),
        });
        assert_eq!(store.status().0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_body_is_bad_request() {
        let err = malformed_body("expected object");
        assert_eq!(err.status(), (StatusCode::BAD_REQUEST, "validation_error"));
    }
}
