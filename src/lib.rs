// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `senec_lib` - A Rust library to read SENEC home battery systems.
//!
//! SENEC systems expose their telemetry through a local HTTP endpoint,
//! `lala.cgi`, that answers a JSON query document with type-tagged hex
//! strings. This library builds the query, decodes the answer and exposes
//! the usual readings: house consumption, solar generation, battery and
//! grid flows, wallbox charging and temperatures.
//!
//! # Quick Start
//!
//! ```no_run
//! use senec_lib::Senec;
//!
//! #[tokio::main]
//! async fn main() -> senec_lib::Result<()> {
//!     // Discovers wallbox and metering options on build
//!     let mut senec = Senec::http("192.168.1.50").build().await?;
//!
//!     let snapshot = senec.update().await?;
//!     println!("State: {:?}", snapshot.system_state());
//!     println!("Grid export: {:?} W", snapshot.grid_exported_power());
//!     println!("Battery: {:?} %", snapshot.battery_charge_percent());
//!     Ok(())
//! }
//! ```
//!
//! # Custom Transports
//!
//! [`Senec::new`] accepts any [`protocol::Transport`]. The bundled
//! [`HttpClient`] can wrap a caller-owned `reqwest::Client` so a single
//! connection pool serves several devices.
//!
//! # Logging
//!
//! The library emits [`tracing`] events: requests at `debug`, discovered
//! capabilities at `info` and discovery fallbacks at `warn`. Install a
//! subscriber in the application to see them.

mod capabilities;
pub mod codes;
mod device;
pub mod error;
pub mod protocol;
pub mod query;
mod snapshot;
pub mod value;

pub use capabilities::{Capabilities, CapabilitiesBuilder};
#[cfg(feature = "http")]
pub use device::HttpDeviceBuilder;
pub use device::{ClientPhase, Senec};
pub use error::{Error, ParseError, ProtocolError, Result};
#[cfg(feature = "http")]
pub use protocol::{HttpClient, HttpConfig};
pub use query::{QueryDocument, QueryDocuments};
pub use snapshot::Snapshot;
pub use value::Value;
