// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities detection and configuration.
//!
//! The installed options of a SENEC system (wallbox, extra metering
//! objects, battery chemistry) decide which fields can be polled. They can
//! be discovered from the device with the query from
//! [`QueryDocument::discovery`](crate::query::QueryDocument::discovery), or
//! configured manually with [`CapabilitiesBuilder`].
//!
//! # Fallback
//!
//! Discovery never fails because of an unexpected response shape. If a
//! field is missing, a warning is logged and the conservative
//! [`Capabilities::default`] profile is used: no wallbox and no metering
//! objects.

use std::collections::BTreeSet;

use crate::codes;
use crate::error::ParseError;
use crate::query::{METERING_OBJECT_COUNT, metering_section};
use crate::snapshot::Snapshot;
use crate::value::Value;

/// Capabilities of a SENEC system.
///
/// # Examples
///
/// ```
/// use senec_lib::Capabilities;
///
/// let basic = Capabilities::default();
/// assert!(!basic.has_wallbox());
/// assert_eq!(basic.metering_objects().count(), 0);
/// assert_eq!(basic.system_type_name(), "UNKNOWN");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `FACTORY.SYS_TYPE` code, if known.
    pub system_type: Option<u64>,

    /// A wallbox is installed.
    pub wallbox: bool,

    /// The car feature is enabled.
    pub car: bool,

    /// Enabled metering objects (1-based `PM1OBJn` indices).
    pub metering_objects: BTreeSet<u8>,
}

impl Capabilities {
    /// Derives capabilities from a decoded discovery response.
    ///
    /// Logs a warning and returns [`Capabilities::default`] when the
    /// response lacks any of the expected fields.
    #[must_use]
    pub fn from_discovery(response: &Snapshot) -> Self {
        match Self::try_from_discovery(response) {
            Ok(caps) => {
                tracing::info!(
                    system_type = ?caps.system_type,
                    wallbox = caps.wallbox,
                    car = caps.car,
                    metering_objects = ?caps.metering_objects,
                    "Discovered device capabilities"
                );
                caps
            }
            Err(e) => {
                tracing::warn!(error = %e, "Capability discovery incomplete, using defaults");
                Self::default()
            }
        }
    }

    /// Derives capabilities from a decoded discovery response.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingField`] if a discovery field is absent,
    /// and [`ParseError::UnexpectedFormat`] if the system type is not an
    /// integer.
    pub fn try_from_discovery(response: &Snapshot) -> Result<Self, ParseError> {
        let system_type = required(response, "FACTORY", "SYS_TYPE")?;
        let system_type = system_type.as_u64().ok_or_else(|| {
            ParseError::UnexpectedFormat(format!("FACTORY.SYS_TYPE is {system_type:?}"))
        })?;

        // Unset wallbox slots report text such as VARIABLE_NOT_FOUND
        let wallbox = flag(required(response, "WALLBOX", "HW_TYPE")?);
        let car = flag(required(response, "FEATURES", "CAR")?);

        let mut metering_objects = BTreeSet::new();
        for index in 1..=METERING_OBJECT_COUNT {
            if flag(required(response, &metering_section(index), "ENABLED")?) {
                metering_objects.insert(index);
            }
        }

        Ok(Self {
            system_type: Some(system_type),
            wallbox,
            car,
            metering_objects,
        })
    }

    /// Returns whether a wallbox is installed.
    #[must_use]
    pub const fn has_wallbox(&self) -> bool {
        self.wallbox
    }

    /// Returns whether the car feature is enabled.
    #[must_use]
    pub const fn has_car(&self) -> bool {
        self.car
    }

    /// Returns the enabled metering object indices in ascending order.
    pub fn metering_objects(&self) -> impl Iterator<Item = u8> + '_ {
        self.metering_objects.iter().copied()
    }

    /// Returns whether the system exposes per-module `BAT1OBJn` sections.
    #[must_use]
    pub fn has_battery_objects(&self) -> bool {
        self.system_type
            .is_some_and(codes::system_type_has_battery_objects)
    }

    /// Returns the display name of the system type, or `"UNKNOWN"`.
    #[must_use]
    pub fn system_type_name(&self) -> &'static str {
        self.system_type
            .map_or(codes::UNKNOWN, codes::system_type_name)
    }
}

fn required<'a>(response: &'a Snapshot, section: &str, field: &str) -> Result<&'a Value, ParseError> {
    response
        .get(section, field)
        .ok_or_else(|| ParseError::MissingField(format!("{section}.{field}")))
}

/// A field counts as set when its first element is a non-zero integer.
fn flag(value: &Value) -> bool {
    value.first().and_then(Value::as_u64).is_some_and(|v| v > 0)
}

/// Builder for creating custom capabilities.
///
/// ```
/// use senec_lib::CapabilitiesBuilder;
///
/// let caps = CapabilitiesBuilder::new()
///     .system_type(14)
///     .with_wallbox()
///     .with_metering_object(1)
///     .build();
/// assert!(caps.has_wallbox());
/// assert!(caps.has_battery_objects());
/// ```
#[derive(Debug, Default)]
pub struct CapabilitiesBuilder {
    inner: Capabilities,
}

impl CapabilitiesBuilder {
    /// Creates a new builder with default capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the system type code.
    #[must_use]
    pub fn system_type(mut self, code: u64) -> Self {
        self.inner.system_type = Some(code);
        self
    }

    /// Enables wallbox support.
    #[must_use]
    pub fn with_wallbox(mut self) -> Self {
        self.inner.wallbox = true;
        self
    }

    /// Enables the car feature.
    #[must_use]
    pub fn with_car(mut self) -> Self {
        self.inner.car = true;
        self
    }

    /// Enables a metering object (1-based).
    ///
    /// Indices outside `1..=METERING_OBJECT_COUNT` are ignored.
    #[must_use]
    pub fn with_metering_object(mut self, index: u8) -> Self {
        if (1..=METERING_OBJECT_COUNT).contains(&index) {
            self.inner.metering_objects.insert(index);
        } else {
            tracing::warn!(index, "Ignoring unknown metering object");
        }
        self
    }

    /// Builds the capabilities.
    #[must_use]
    pub fn build(self) -> Capabilities {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovery(json: serde_json::Value) -> Snapshot {
        Snapshot::from_json(json).unwrap()
    }

    #[test]
    fn default_capabilities() {
        let caps = Capabilities::default();
        assert_eq!(caps.system_type, None);
        assert!(!caps.has_wallbox());
        assert!(!caps.has_car());
        assert!(!caps.has_battery_objects());
        assert_eq!(caps.metering_objects().count(), 0);
    }

    #[test]
    fn discovers_wallbox_and_meter() {
        let response = discovery(serde_json::json!({
            "FACTORY": { "SYS_TYPE": "u8_0E" },
            "WALLBOX": { "HW_TYPE": ["u8_01", "u8_00", "u8_00", "u8_00"] },
            "FEATURES": { "CAR": "u8_01" },
            "PM1OBJ1": { "ENABLED": "u8_01" },
            "PM1OBJ2": { "ENABLED": "u8_00" },
        }));

        let caps = Capabilities::from_discovery(&response);
        assert_eq!(caps.system_type, Some(14));
        assert_eq!(caps.system_type_name(), "SENEC.Home V3 hybrid");
        assert!(caps.has_wallbox());
        assert!(caps.has_car());
        assert!(caps.has_battery_objects());
        assert_eq!(caps.metering_objects().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn discovers_plain_system() {
        let response = discovery(serde_json::json!({
            "FACTORY": { "SYS_TYPE": "u8_00" },
            "WALLBOX": { "HW_TYPE": ["u8_00"] },
            "FEATURES": { "CAR": "u8_00" },
            "PM1OBJ1": { "ENABLED": "u8_00" },
            "PM1OBJ2": { "ENABLED": "u8_00" },
        }));

        let caps = Capabilities::try_from_discovery(&response).unwrap();
        assert_eq!(caps.system_type, Some(0));
        assert!(!caps.has_wallbox());
        assert!(!caps.has_battery_objects());
        assert_eq!(caps.metering_objects().count(), 0);
    }

    #[test]
    fn text_hw_type_means_no_wallbox() {
        let response = discovery(serde_json::json!({
            "FACTORY": { "SYS_TYPE": "u8_0C" },
            "WALLBOX": { "HW_TYPE": "VARIABLE_NOT_FOUND" },
            "FEATURES": { "CAR": "u8_00" },
            "PM1OBJ1": { "ENABLED": "u8_01" },
            "PM1OBJ2": { "ENABLED": "u8_01" },
        }));

        let caps = Capabilities::try_from_discovery(&response).unwrap();
        assert!(!caps.has_wallbox());
        assert_eq!(caps.metering_objects().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn missing_field_falls_back_to_defaults() {
        let response = discovery(serde_json::json!({
            "FACTORY": { "SYS_TYPE": "u8_0E" },
            "WALLBOX": { "HW_TYPE": ["u8_01"] },
            "PM1OBJ1": { "ENABLED": "u8_01" },
        }));

        let err = Capabilities::try_from_discovery(&response).unwrap_err();
        assert!(matches!(err, ParseError::MissingField(ref f) if f == "FEATURES.CAR"));

        assert_eq!(Capabilities::from_discovery(&response), Capabilities::default());
    }

    #[test]
    fn non_integer_system_type_is_rejected() {
        let response = discovery(serde_json::json!({
            "FACTORY": { "SYS_TYPE": "st_HOME" },
        }));
        assert!(matches!(
            Capabilities::try_from_discovery(&response),
            Err(ParseError::UnexpectedFormat(_))
        ));
    }

    #[test]
    fn builder_pattern() {
        let caps = CapabilitiesBuilder::new()
            .system_type(3)
            .with_car()
            .with_metering_object(2)
            .with_metering_object(9)
            .build();

        assert_eq!(caps.system_type_name(), "SENEC.Home 10.0 / Lead");
        assert!(caps.has_car());
        assert!(!caps.has_wallbox());
        assert_eq!(caps.metering_objects().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn out_of_range_metering_objects_are_ignored() {
        let caps = CapabilitiesBuilder::new()
            .with_metering_object(0)
            .with_metering_object(3)
            .with_metering_object(9)
            .build();
        assert_eq!(caps.metering_objects().count(), 0);

        let caps = CapabilitiesBuilder::new()
            .with_metering_object(1)
            .with_metering_object(0)
            .build();
        assert_eq!(caps.metering_objects().collect::<Vec<_>>(), vec![1]);
    }
}
