// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for the feed engine API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// The activity gate failed. A normal termination condition, not a fault.
    UserInactive,
    /// The user has no stored OAuth client id/secret/refresh token.
    CredentialsMissing,
    /// Token refresh failed after the full retry budget.
    RefreshExhausted,
    Unauthorized,
    SessionNotFound,
    /// Network or non-2xx failure from an upstream endpoint.
    Upstream { status: Option<u16>, message: String },
    /// Malformed binary response from the native canvas endpoint.
    ProtocolDecode(String),
    Internal(String),
}

impl FeedError {
    pub fn upstream(err: impl fmt::Display) -> Self {
        Self::Upstream { status: None, message: err.to_string() }
    }

    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream { status: Some(status), message: message.into() }
    }

    /// Whether this is an auth-shaped upstream rejection (expired/invalid token).
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Upstream { status: Some(401 | 403), .. })
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::UserInactive => 409,
            Self::CredentialsMissing | Self::RefreshExhausted | Self::Unauthorized => 401,
            Self::SessionNotFound => 404,
            Self::Upstream { .. } => 502,
            Self::ProtocolDecode(_) | Self::Internal(_) => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserInactive => "USER_INACTIVE",
            Self::CredentialsMissing => "CREDENTIALS_MISSING",
            Self::RefreshExhausted => "REFRESH_EXHAUSTED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::Upstream { .. } => "UPSTREAM_ERROR",
            Self::ProtocolDecode(_) => "PROTOCOL_DECODE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn to_error_body(&self, message: impl Into<String>) -> ErrorBody {
        ErrorBody { code: self.as_str().to_owned(), message: message.into() }
    }

    pub fn to_http_response(
        &self,
        message: impl Into<String>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse { error: self.to_error_body(message) };
        (status, Json(body))
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upstream { status: Some(code), message } => {
                write!(f, "{} ({code}): {message}", self.as_str())
            }
            Self::Upstream { status: None, message } => {
                write!(f, "{}: {message}", self.as_str())
            }
            Self::ProtocolDecode(msg) | Self::Internal(msg) => {
                write!(f, "{}: {msg}", self.as_str())
            }
            _ => f.write_str(self.as_str()),
        }
    }
}

impl std::error::Error for FeedError {}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

/// Error body with machine-readable code and human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
