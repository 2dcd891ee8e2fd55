// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Query documents sent to the device's `lala.cgi` endpoint.
//!
//! A query document maps section names to the fields requested from that
//! section. Each requested field carries an empty-string placeholder which
//! the device replaces with a tagged value. A section with no fields asks
//! for the whole section.
//!
//! ```
//! use senec_lib::query::QueryDocument;
//!
//! let doc = QueryDocument::builder()
//!     .fields("ENERGY", &["STAT_STATE", "GUI_HOUSE_POW"])
//!     .section("BMS")
//!     .build();
//!
//! assert_eq!(
//!     serde_json::to_string(&doc).unwrap(),
//!     r#"{"BMS":{},"ENERGY":{"GUI_HOUSE_POW":"","STAT_STATE":""}}"#
//! );
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::capabilities::Capabilities;

/// Fields of the `ENERGY` section polled on every update.
pub const ENERGY_FIELDS: &[&str] = &[
    "STAT_STATE",
    "GUI_BAT_DATA_POWER",
    "GUI_INVERTER_POWER",
    "GUI_HOUSE_POW",
    "GUI_GRID_POW",
    "GUI_BAT_DATA_FUEL_CHARGE",
    "GUI_CHARGING_INFO",
    "GUI_BOOSTING_INFO",
    "GUI_BAT_DATA_VOLTAGE",
    "GUI_BAT_DATA_CURRENT",
    "GUI_BAT_DATA_OA_CHARGING",
    "STAT_LIMITED_NET_SKEW",
];

/// Fields of the `STATISTIC` section polled on every update (kWh totals).
pub const STATISTIC_FIELDS: &[&str] = &[
    "LIVE_BAT_CHARGE",
    "LIVE_BAT_DISCHARGE",
    "LIVE_GRID_EXPORT",
    "LIVE_GRID_IMPORT",
    "LIVE_HOUSE_CONS",
    "LIVE_PV_GEN",
];

/// Fields of the `TEMPMEASURE` section.
pub const TEMPMEASURE_FIELDS: &[&str] = &["BATTERY_TEMP", "CASE_TEMP", "MCU_TEMP"];

/// Fields of the `PV1` section.
pub const PV1_FIELDS: &[&str] = &["POWER_RATIO", "MPP_POWER"];

/// Fields of the `PWR_UNIT` section.
pub const PWR_UNIT_FIELDS: &[&str] = &["POWER_L1", "POWER_L2", "POWER_L3"];

/// Fields of the `WALLBOX` section, requested when a wallbox is installed.
pub const WALLBOX_FIELDS: &[&str] = &[
    "APPARENT_CHARGING_POWER",
    "L1_CHARGING_CURRENT",
    "L2_CHARGING_CURRENT",
    "L3_CHARGING_CURRENT",
    "EV_CONNECTED",
];

/// Fields of each enabled `PM1OBJn` metering object section.
pub const METER_FIELDS: &[&str] = &["FREQ", "U_AC", "I_AC", "P_AC", "P_TOTAL"];

/// Top-level sections requested unfiltered by the exhaustive document.
pub const ALL_SECTIONS: &[&str] = &[
    "STATISTIC",
    "ENERGY",
    "FEATURES",
    "LOG",
    "SYS_UPDATE",
    "WIZARD",
    "BMS",
    "BAT1",
    "PWR_UNIT",
    "PV1",
    "TEMPMEASURE",
    "FACTORY",
];

/// Number of `PM1OBJn` metering objects probed during discovery.
pub const METERING_OBJECT_COUNT: u8 = 2;

/// Number of `BAT1OBJn` battery module sections on lithium systems.
pub const BATTERY_OBJECT_COUNT: u8 = 4;

/// Returns the section name of metering object `index` (1-based).
#[must_use]
pub fn metering_section(index: u8) -> String {
    format!("PM1OBJ{index}")
}

/// A request document for the `lala.cgi` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryDocument {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl QueryDocument {
    /// Creates a builder for a query document.
    #[must_use]
    pub fn builder() -> QueryDocumentBuilder {
        QueryDocumentBuilder::default()
    }

    /// The capability discovery query.
    ///
    /// Requests the system type, the enable flag of each metering object,
    /// the wallbox hardware type and the car feature flag.
    #[must_use]
    pub fn discovery() -> Self {
        let mut builder = Self::builder()
            .fields("FACTORY", &["SYS_TYPE"])
            .fields("WALLBOX", &["HW_TYPE"])
            .fields("FEATURES", &["CAR"]);
        for index in 1..=METERING_OBJECT_COUNT {
            builder = builder.fields(metering_section(index), &["ENABLED"]);
        }
        builder.build()
    }

    /// Returns whether the document requests the given section.
    #[must_use]
    pub fn contains_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Returns the fields requested from a section.
    ///
    /// An empty iterator means either the whole section is requested or the
    /// section is absent; use [`contains_section`](Self::contains_section)
    /// to tell them apart.
    pub fn fields_of(&self, section: &str) -> impl Iterator<Item = &str> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|fields| fields.keys().map(String::as_str))
    }

    /// Returns the requested section names.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Returns the number of requested sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns whether the document requests nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Accumulates confirmed sections and fields into a [`QueryDocument`].
#[derive(Debug, Default)]
pub struct QueryDocumentBuilder {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl QueryDocumentBuilder {
    /// Requests specific fields of a section.
    ///
    /// Fields accumulate if the section was already added.
    #[must_use]
    pub fn fields(mut self, section: impl Into<String>, fields: &[&str]) -> Self {
        let entry = self.sections.entry(section.into()).or_default();
        for field in fields {
            entry.insert((*field).to_string(), String::new());
        }
        self
    }

    /// Requests a whole section.
    #[must_use]
    pub fn section(mut self, section: impl Into<String>) -> Self {
        self.sections.entry(section.into()).or_default();
        self
    }

    /// Builds the document.
    #[must_use]
    pub fn build(self) -> QueryDocument {
        QueryDocument {
            sections: self.sections,
        }
    }
}

/// The pair of documents derived from a [`Capabilities`] profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocuments {
    /// Minimal document used by regular updates.
    pub default: QueryDocument,
    /// Exhaustive document requesting every section unfiltered.
    pub all: QueryDocument,
}

impl QueryDocuments {
    /// Builds both documents from a capability profile.
    ///
    /// The default document holds the core energy, statistic, temperature
    /// and power unit fields, plus wallbox fields when a wallbox is present
    /// and meter fields for every enabled metering object.
    #[must_use]
    pub fn build(capabilities: &Capabilities) -> Self {
        Self {
            default: Self::build_default(capabilities),
            all: Self::build_all(capabilities),
        }
    }

    fn build_default(capabilities: &Capabilities) -> QueryDocument {
        let mut builder = QueryDocument::builder()
            .fields("ENERGY", ENERGY_FIELDS)
            .fields("STATISTIC", STATISTIC_FIELDS)
            .fields("TEMPMEASURE", TEMPMEASURE_FIELDS)
            .fields("PV1", PV1_FIELDS)
            .fields("PWR_UNIT", PWR_UNIT_FIELDS);

        if capabilities.has_wallbox() {
            builder = builder
                .fields("WALLBOX", WALLBOX_FIELDS)
                .fields("STATISTIC", &["LIVE_WB_ENERGY"]);
        }

        for index in capabilities.metering_objects() {
            builder = builder.fields(metering_section(index), METER_FIELDS);
        }

        builder.build()
    }

    fn build_all(capabilities: &Capabilities) -> QueryDocument {
        let mut builder = ALL_SECTIONS
            .iter()
            .fold(QueryDocument::builder(), |b, section| b.section(*section));

        if capabilities.has_battery_objects() {
            for index in 1..=BATTERY_OBJECT_COUNT {
                builder = builder.section(format!("BAT1OBJ{index}"));
            }
        }

        if capabilities.has_wallbox() {
            builder = builder.section("WALLBOX");
        }

        for index in capabilities.metering_objects() {
            builder = builder.section(metering_section(index));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn profile(wallbox: bool, meters: &[u8], system_type: Option<u64>) -> Capabilities {
        Capabilities {
            system_type,
            wallbox,
            car: false,
            metering_objects: meters.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn discovery_document_shape() {
        let json = serde_json::to_value(QueryDocument::discovery()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "FACTORY": { "SYS_TYPE": "" },
                "WALLBOX": { "HW_TYPE": "" },
                "FEATURES": { "CAR": "" },
                "PM1OBJ1": { "ENABLED": "" },
                "PM1OBJ2": { "ENABLED": "" },
            })
        );
    }

    #[test]
    fn builder_accumulates_fields() {
        let doc = QueryDocument::builder()
            .fields("STATISTIC", &["LIVE_PV_GEN"])
            .fields("STATISTIC", &["LIVE_WB_ENERGY", "LIVE_PV_GEN"])
            .build();
        assert_eq!(
            doc.fields_of("STATISTIC").collect::<Vec<_>>(),
            vec!["LIVE_PV_GEN", "LIVE_WB_ENERGY"]
        );
    }

    #[test]
    fn default_document_without_options() {
        let docs = QueryDocuments::build(&Capabilities::default());
        let doc = &docs.default;

        assert!(!doc.contains_section("WALLBOX"));
        assert!(!doc.contains_section("PM1OBJ1"));
        assert!(!doc.contains_section("PM1OBJ2"));
        assert!(doc.fields_of("ENERGY").any(|f| f == "GUI_GRID_POW"));
        assert!(!doc.fields_of("STATISTIC").any(|f| f == "LIVE_WB_ENERGY"));
        assert_eq!(
            doc.sections().collect::<Vec<_>>(),
            vec!["ENERGY", "PV1", "PWR_UNIT", "STATISTIC", "TEMPMEASURE"]
        );
    }

    #[test]
    fn default_document_with_wallbox_and_meter() {
        let docs = QueryDocuments::build(&profile(true, &[1], None));
        let doc = &docs.default;

        assert!(doc.contains_section("WALLBOX"));
        assert!(doc.contains_section("PM1OBJ1"));
        assert!(!doc.contains_section("PM1OBJ2"));
        assert!(doc.fields_of("STATISTIC").any(|f| f == "LIVE_WB_ENERGY"));
        assert_eq!(doc.fields_of("PM1OBJ1").count(), METER_FIELDS.len());
    }

    #[test]
    fn all_document_requests_whole_sections() {
        let docs = QueryDocuments::build(&Capabilities::default());
        let json = serde_json::to_value(&docs.all).unwrap();
        let map = json.as_object().unwrap();

        assert_eq!(map.len(), ALL_SECTIONS.len());
        assert!(map.values().all(|v| v == &serde_json::json!({})));
        assert!(!docs.all.contains_section("BAT1OBJ1"));
    }

    #[test]
    fn all_document_adds_battery_objects_for_lithium() {
        let docs = QueryDocuments::build(&profile(true, &[2], Some(14)));
        for index in 1..=BATTERY_OBJECT_COUNT {
            assert!(docs.all.contains_section(&format!("BAT1OBJ{index}")));
        }
        assert!(docs.all.contains_section("WALLBOX"));
        assert!(docs.all.contains_section("PM1OBJ2"));
    }

    #[test]
    fn building_is_deterministic() {
        let caps = profile(true, &[1, 2], Some(14));
        let first = serde_json::to_vec(&QueryDocuments::build(&caps).default).unwrap();
        let second = serde_json::to_vec(&QueryDocuments::build(&caps).default).unwrap();
        assert_eq!(first, second);
    }
}
