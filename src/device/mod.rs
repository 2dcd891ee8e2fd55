// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device client for SENEC systems.
//!
//! A [`Senec`] client moves through three phases:
//!
//! 1. [`ClientPhase::Uninitialized`]: nothing is known about the device.
//! 2. [`ClientPhase::Discovered`]: capabilities were read and the query
//!    documents built.
//! 3. [`ClientPhase::Ready`]: at least one poll succeeded and a
//!    [`Snapshot`] is available.
//!
//! [`Senec::update`] goes from the first phase to the last in one call.
//! There is no way back to `Uninitialized`; call
//! [`Senec::discover_capabilities`] again to rediscover.
//!
//! # Concurrency
//!
//! Every operation takes `&mut self`, so polls on one client are
//! serialized by the borrow checker. Share a client between tasks behind a
//! mutex if needed.
//!
//! ```no_run
//! use senec_lib::Senec;
//!
//! # async fn example() -> senec_lib::Result<()> {
//! let mut senec = Senec::http("192.168.1.50").build().await?;
//!
//! let snapshot = senec.update().await?;
//! println!("state: {:?}", snapshot.system_state());
//! println!("house: {:?} W", snapshot.house_power());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "http")]
mod http_builder;

#[cfg(feature = "http")]
pub use http_builder::HttpDeviceBuilder;

use crate::capabilities::Capabilities;
use crate::error::Error;
use crate::protocol::{LALA_PATH, Transport};
#[cfg(feature = "http")]
use crate::protocol::{HttpClient, HttpConfig};
use crate::query::{QueryDocument, QueryDocuments};
use crate::snapshot::Snapshot;

/// Lifecycle phase of a [`Senec`] client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    /// No capabilities, no snapshot.
    Uninitialized,
    /// Capabilities known and documents built, no snapshot yet.
    Discovered,
    /// At least one poll succeeded.
    Ready,
}

#[derive(Debug, Clone)]
struct Configuration {
    capabilities: Capabilities,
    documents: QueryDocuments,
}

impl Configuration {
    fn new(capabilities: Capabilities) -> Self {
        let documents = QueryDocuments::build(&capabilities);
        Self {
            capabilities,
            documents,
        }
    }
}

/// A SENEC home battery system reachable over its local HTTP interface.
///
/// The type parameter `T` is the transport; [`HttpClient`] unless a custom
/// [`Transport`] is supplied through [`Senec::new`].
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct Senec<T: Transport = HttpClient> {
    transport: T,
    configuration: Option<Configuration>,
    snapshot: Option<Snapshot>,
}

/// A SENEC home battery system reachable through a [`Transport`].
#[cfg(not(feature = "http"))]
#[derive(Debug)]
pub struct Senec<T: Transport> {
    transport: T,
    configuration: Option<Configuration>,
    snapshot: Option<Snapshot>,
}

#[cfg(feature = "http")]
impl Senec<HttpClient> {
    /// Creates a builder for a device at the given host.
    #[must_use]
    pub fn http(host: impl Into<String>) -> HttpDeviceBuilder {
        HttpDeviceBuilder::new(HttpConfig::new(host))
    }

    /// Creates a builder from an advanced HTTP configuration.
    #[must_use]
    pub fn http_config(config: HttpConfig) -> HttpDeviceBuilder {
        HttpDeviceBuilder::new(config)
    }
}

impl<T: Transport> Senec<T> {
    /// Creates an uninitialized client on top of a transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            configuration: None,
            snapshot: None,
        }
    }

    /// Creates a client with known capabilities, skipping discovery.
    #[must_use]
    pub fn with_capabilities(transport: T, capabilities: Capabilities) -> Self {
        Self {
            transport,
            configuration: Some(Configuration::new(capabilities)),
            snapshot: None,
        }
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> ClientPhase {
        match (&self.configuration, &self.snapshot) {
            (_, Some(_)) => ClientPhase::Ready,
            (Some(_), None) => ClientPhase::Discovered,
            (None, None) => ClientPhase::Uninitialized,
        }
    }

    /// Returns the discovered capabilities, if any.
    #[must_use]
    pub fn capabilities(&self) -> Option<&Capabilities> {
        self.configuration.as_ref().map(|c| &c.capabilities)
    }

    /// Returns the query documents built from the capabilities, if any.
    #[must_use]
    pub fn documents(&self) -> Option<&QueryDocuments> {
        self.configuration.as_ref().map(|c| &c.documents)
    }

    /// Returns the last successfully polled snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Returns the display name of the discovered system type.
    #[must_use]
    pub fn system_type_name(&self) -> Option<&'static str> {
        self.capabilities().map(Capabilities::system_type_name)
    }

    /// Reads the device capabilities and rebuilds the query documents.
    ///
    /// Safe to call repeatedly. Missing discovery fields are logged and
    /// replaced by conservative defaults; they do not fail the call.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    pub async fn discover_capabilities(&mut self) -> Result<&Capabilities, Error> {
        let configuration = self.discover().await?;
        Ok(&self.configuration.insert(configuration).capabilities)
    }

    /// Polls the device with a query document and replaces the snapshot.
    ///
    /// On failure the previous snapshot is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response cannot be decoded.
    pub async fn poll(&mut self, document: &QueryDocument) -> Result<&Snapshot, Error> {
        let snapshot = Self::fetch(&self.transport, document).await?;
        Ok(&*self.snapshot.insert(snapshot))
    }

    /// Polls the device with the default document, discovering
    /// capabilities first if needed.
    ///
    /// # Errors
    ///
    /// Returns error if discovery or the poll fails.
    pub async fn update(&mut self) -> Result<&Snapshot, Error> {
        let (transport, configuration) = self.configured().await?;
        let snapshot = Self::fetch(transport, &configuration.documents.default).await?;
        Ok(&*self.snapshot.insert(snapshot))
    }

    /// Polls every section of the device.
    ///
    /// This puts a high load on the device and can stop it from syncing
    /// with the vendor cloud. Do not call it on a tight schedule.
    ///
    /// # Errors
    ///
    /// Returns error if discovery or the poll fails.
    pub async fn poll_all(&mut self) -> Result<&Snapshot, Error> {
        let (transport, configuration) = self.configured().await?;
        tracing::debug!(
            sections = configuration.documents.all.len(),
            "Polling all sections"
        );
        let snapshot = Self::fetch(transport, &configuration.documents.all).await?;
        Ok(&*self.snapshot.insert(snapshot))
    }

    /// Returns the transport and the configuration, discovering first if
    /// there is none.
    ///
    /// A discovered configuration is stored before any request is made with
    /// it, so a cancelled poll never loses it.
    async fn configured(&mut self) -> Result<(&T, &Configuration), Error> {
        let configuration = match self.configuration.take() {
            Some(configuration) => configuration,
            None => self.discover().await?,
        };
        let configuration = &*self.configuration.insert(configuration);
        Ok((&self.transport, configuration))
    }

    async fn discover(&self) -> Result<Configuration, Error> {
        let response = Self::fetch(&self.transport, &QueryDocument::discovery()).await?;
        Ok(Configuration::new(Capabilities::from_discovery(&response)))
    }

    async fn fetch(transport: &T, document: &QueryDocument) -> Result<Snapshot, Error> {
        let response = transport.post_json(LALA_PATH, document).await?;
        let json: serde_json::Value = response.parse()?;
        Ok(Snapshot::from_json(json)?)
    }
}
