// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP device builder.

use std::time::Duration;

use crate::capabilities::Capabilities;
use crate::device::Senec;
use crate::error::Error;
use crate::protocol::{HttpClient, HttpConfig};

/// Builder for creating HTTP-based devices.
///
/// This builder can be created in two ways:
/// - `Senec::http("host")` - Simple host string
/// - `Senec::http_config(HttpConfig::new("host").with_https())` - Advanced configuration
///
/// # Examples
///
/// ```no_run
/// use senec_lib::{CapabilitiesBuilder, Senec};
///
/// # async fn example() -> senec_lib::Result<()> {
/// // With capability discovery
/// let senec = Senec::http("192.168.1.50").build().await?;
///
/// // With manual capabilities (no network probe)
/// let senec = Senec::http("192.168.1.50")
///     .with_capabilities(CapabilitiesBuilder::new().with_wallbox().build())
///     .build_without_probe()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct HttpDeviceBuilder {
    config: HttpConfig,
    capabilities: Option<Capabilities>,
}

impl HttpDeviceBuilder {
    /// Creates a new builder with the specified HTTP configuration.
    pub(crate) fn new(config: HttpConfig) -> Self {
        Self {
            config,
            capabilities: None,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    /// Sets the device capabilities manually (skips discovery).
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Returns the currently set capabilities, if any.
    #[must_use]
    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.capabilities.as_ref()
    }

    /// Builds the device and discovers its capabilities.
    ///
    /// Capabilities set with [`with_capabilities`](Self::with_capabilities)
    /// are used as-is and no request is made.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The HTTP client cannot be created
    /// - The discovery request fails
    pub async fn build(self) -> Result<Senec<HttpClient>, Error> {
        let client = self.config.into_client()?;

        match self.capabilities {
            Some(caps) => Ok(Senec::with_capabilities(client, caps)),
            None => {
                let mut senec = Senec::new(client);
                senec.discover_capabilities().await?;
                Ok(senec)
            }
        }
    }

    /// Builds the device without probing for capabilities.
    ///
    /// Without capabilities set, the device starts uninitialized and the
    /// first [`Senec::update`] runs discovery.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn build_without_probe(self) -> Result<Senec<HttpClient>, Error> {
        let client = self.config.into_client()?;
        Ok(match self.capabilities {
            Some(caps) => Senec::with_capabilities(client, caps),
            None => Senec::new(client),
        })
    }
}
