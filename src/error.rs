// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Each concern has its own error enum: authentication against the vendor
//! cloud, validation of inbound commands, the upstream action call, the
//! local state store and configuration loading. [`Error`] aggregates them.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// No session could be obtained from the vendor cloud.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The command payload failed translation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The vendor cloud could not be reached or refused the request.
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// The local state record could not be written.
    #[error("state store error: {0}")]
    Store(#[from] StoreError),

    /// The configuration is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why a single login attempt failed.
///
/// Only used for diagnostics; every kind is retried the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// The login endpoint answered with a non-success status.
    HttpStatus(u16),
    /// The request did not complete within the auth timeout.
    Timeout,
    /// The connection could not be established (DNS, refused, TLS).
    Connect(String),
    /// The login succeeded but carried no usable session token.
    MalformedResponse,
    /// Any other transport failure.
    Other(String),
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HttpStatus(code) => write!(f, "HTTP {code}"),
            Self::Timeout => write!(f, "request timed out"),
            Self::Connect(msg) => write!(f, "connection failed: {msg}"),
            Self::MalformedResponse => write!(f, "response carried no session token"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

/// Errors raised while obtaining a vendor session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Every login attempt failed.
    #[error("login failed after {attempts} attempt(s), last failure: {last}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Classification of the final failure.
        last: AuthFailure,
    },

    /// The HTTP client used for logins could not be created.
    #[error("cannot create login client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Errors raised when a command cannot be translated into a vendor action.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A dimmer value was not an integer.
    #[error("invalid value, dimmers take an integer between 0 and 100")]
    DimmerValue,

    /// A dimmer value exceeded 100.
    #[error("dimmer level can't be above 100, found {0}")]
    DimmerAboveMaximum(i64),

    /// A curtain value was not one of up, down or stop.
    #[error("invalid value, curtains take 'Up', 'Down' or 'Stop'")]
    CurtainValue,

    /// A switch value was not a string.
    #[error("invalid value, switches take 'On' or 'Off'")]
    SwitchValue,

    /// The request body was not a command object.
    #[error("malformed command body: {0}")]
    Body(String),
}

/// Errors raised by calls to the vendor plug API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with a non-success status code.
    #[error("vendor returned HTTP {0}")]
    Status(u16),

    /// The vendor answered but did not report success.
    #[error("vendor rejected the action: {0}")]
    Rejected(String),
}

/// Errors raised by the state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable holds a value that cannot be used.
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// The variable name.
        key: String,
        /// Description of the problem.
        message: String,
    },

    /// The device route table is not a JSON object of strings.
    #[error("invalid device route table: {0}")]
    Routes(#[from] serde_json::Error),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
