// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Binary messages for the native canvas endpoint.
//!
//! Field numbers follow the upstream service's expected message shape; the
//! serialization itself is plain protobuf via prost.

use prost::Message;

use crate::error::FeedError;

/// Request: the tracks to resolve canvases for.
#[derive(Clone, PartialEq, Message)]
pub struct CanvasRequest {
    #[prost(message, repeated, tag = "1")]
    pub entities: Vec<Entity>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Entity {
    #[prost(string, tag = "1")]
    pub entity_uri: String,
}

/// Response: zero or more canvases, one per requested entity.
#[derive(Clone, PartialEq, Message)]
pub struct CanvasResponse {
    #[prost(message, repeated, tag = "1")]
    pub canvases: Vec<Canvas>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Canvas {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub canvas_url: String,
    #[prost(string, tag = "5")]
    pub entity_uri: String,
}

/// Encode a request for a single track URI.
pub fn encode_request(track_uri: &str) -> Vec<u8> {
    let request = CanvasRequest {
        entities: vec![Entity { entity_uri: track_uri.to_owned() }],
    };
    request.encode_to_vec()
}

/// Decode a response body, surfacing malformed bytes as a protocol error.
pub fn decode_response(bytes: &[u8]) -> Result<CanvasResponse, FeedError> {
    CanvasResponse::decode(bytes).map_err(|e| FeedError::ProtocolDecode(e.to_string()))
}

/// First non-empty canvas URL in a response, if any.
pub fn first_canvas_url(response: &CanvasResponse) -> Option<String> {
    response
        .canvases
        .iter()
        .map(|c| c.canvas_url.as_str())
        .find(|url| !url.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
