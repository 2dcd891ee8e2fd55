// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport used to reach the device's HTTP interface.
//!
//! The device client only needs one capability from its transport: POST a
//! JSON document to a path and get the body back, failing on non-2xx
//! statuses. [`Transport`] describes that seam; [`HttpClient`] implements
//! it with `reqwest` when the `http` feature is enabled.
//!
//! The transport owns the connection pool. The device client never closes
//! it, so a single `reqwest::Client` can be shared between several devices
//! with [`HttpClient::from_client`].

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{HttpClient, HttpConfig};

use serde::Serialize;

use crate::error::{ParseError, ProtocolError};

/// Path of the device's query endpoint.
pub const LALA_PATH: &str = "/lala.cgi";

/// Raw response body from the device.
#[derive(Debug, Clone)]
pub struct RawResponse {
    body: String,
}

impl RawResponse {
    /// Creates a new response with the given body.
    #[must_use]
    pub fn new(body: String) -> Self {
        Self { body }
    }

    /// Returns the raw JSON response body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the response as a specific type.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON cannot be parsed into the target type.
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_str(&self.body).map_err(Into::into)
    }
}

/// Trait for transports that can POST JSON documents to the device.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Posts `body` as JSON to `path` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Status`] for non-2xx responses and another
    /// `ProtocolError` if the request cannot be made.
    async fn post_json<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RawResponse, ProtocolError>;
}
